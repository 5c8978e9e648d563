//! Call codec implementation using CBOR

use std::sync::Arc;

use crate::domain::abi::{
    validate, AbiError, AbiRegistry, AbiValue, CallCodec, CallOutput, FunctionSpec, TypeExpr,
    TypeKind,
};

use super::codec;

/// CBOR call codec bound to a contract's registry
#[derive(Debug, Clone)]
pub struct CborCallCodec {
    registry: Arc<AbiRegistry>,
}

impl CborCallCodec {
    /// Create a new codec with the given registry
    pub fn new(registry: Arc<AbiRegistry>) -> Self {
        Self { registry }
    }

    /// Get the underlying registry
    pub fn registry(&self) -> &AbiRegistry {
        &self.registry
    }
}

impl CallCodec for CborCallCodec {
    fn encode_params(&self, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        codec::encode_params(args)
    }

    fn decode_response(&self, raw: Option<&str>, function: &FunctionSpec) -> Result<CallOutput, AbiError> {
        let returns = &function.returns;

        let raw = match (returns.is_empty(), raw) {
            (true, None) => return Ok(CallOutput::None),
            (true, Some(_)) => {
                return Err(AbiError::ResponseArity(
                    "some response data was not expected and received".to_string(),
                ))
            }
            (false, None) => {
                return Err(AbiError::ResponseArity(
                    "some response data was expected but not received".to_string(),
                ))
            }
            (false, Some(raw)) => raw,
        };

        let bytes = codec::decode_base64(raw)?;
        let AbiValue::Array(items) = codec::decode(&bytes)? else {
            return Err(AbiError::ResponseShape(
                "response data is not contained inside an array, and it should be".to_string(),
            ));
        };

        if items.len() != returns.len() {
            return Err(AbiError::ResponseArity(format!(
                "the response holds {} elements but the ABI declares {}",
                items.len(),
                returns.len()
            )));
        }

        let mut values = items
            .into_iter()
            .zip(returns)
            .enumerate()
            .map(|(idx, (item, spec))| {
                let path = spec
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{}.return{}", function.name, idx));
                let item = lift(item, &spec.ty, &self.registry);
                validate(&path, &spec.ty, &item, &self.registry)
            })
            .collect::<Result<Vec<_>, _>>()?;

        if values.len() == 1 {
            Ok(CallOutput::Single(values.remove(0)))
        } else {
            Ok(CallOutput::Many(values))
        }
    }
}

/// Bring a decoded value into the shape callers pass in for `ty`
///
/// CBOR does not distinguish native from wide integers, and object types
/// travel positionally. Values that do not fit the expected shape are left
/// alone so that validation reports them.
fn lift(value: AbiValue, ty: &TypeExpr, registry: &AbiRegistry) -> AbiValue {
    match (ty, value) {
        (TypeExpr::Primitive(p), AbiValue::Int(n)) if p.is_wide() => AbiValue::BigInt(i128::from(n)),
        (TypeExpr::Primitive(p), AbiValue::BigInt(n)) if !p.is_wide() => match i64::try_from(n) {
            Ok(small) => AbiValue::Int(small),
            Err(_) => AbiValue::BigInt(n),
        },
        (TypeExpr::Array(item_ty), AbiValue::Array(items)) => AbiValue::Array(
            items
                .into_iter()
                .map(|item| lift(item, item_ty, registry))
                .collect(),
        ),
        (TypeExpr::Map(key_ty, value_ty), AbiValue::Map(entries)) => AbiValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (lift(k, key_ty, registry), lift(v, value_ty, registry)))
                .collect(),
        ),
        (TypeExpr::Custom(name), AbiValue::Array(items)) => match registry.resolve_custom_type(name) {
            Some(custom) if custom.kind == TypeKind::Object && custom.fields.len() == items.len() => {
                AbiValue::Map(
                    custom
                        .fields
                        .iter()
                        .zip(items)
                        .map(|(field, item)| {
                            (AbiValue::text(field.name.clone()), lift(item, &field.ty, registry))
                        })
                        .collect(),
                )
            }
            _ => AbiValue::Array(items),
        },
        (_, value) => value,
    }
}
