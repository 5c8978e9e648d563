//! Recursive validation and coercion of values against ABI types

use super::error::AbiError;
use super::registry::{AbiRegistry, TypeKind};
use super::types::{Primitive, TypeExpr};
use super::value::AbiValue;

/// Validate `value` against `ty` and return its coerced form
///
/// `path` names the value in error messages (e.g., `data4.field4.field1`).
/// Custom object types come back as a positional array in field
/// declaration order, which is how they are encoded on the wire.
///
/// Recursion depth follows the ABI except for types that reach themselves
/// through `Array` or `Map` (e.g., a `Node` with `children: Array<Node>`).
/// Those are bounded only by how deeply the caller's value nests.
pub fn validate(
    path: &str,
    ty: &TypeExpr,
    value: &AbiValue,
    registry: &AbiRegistry,
) -> Result<AbiValue, AbiError> {
    match ty {
        TypeExpr::Primitive(primitive) => validate_primitive(path, *primitive, value),
        TypeExpr::Array(item_ty) => {
            let AbiValue::Array(items) = value else {
                return Err(AbiError::mismatch(path, "a array", value));
            };
            items
                .iter()
                .map(|item| validate(path, item_ty, item, registry))
                .collect::<Result<Vec<_>, _>>()
                .map(AbiValue::Array)
        }
        TypeExpr::Map(key_ty, value_ty) => {
            let AbiValue::Map(entries) = value else {
                return Err(AbiError::mismatch(path, "a map", value));
            };
            entries
                .iter()
                .map(|(key, entry)| {
                    let key = validate(path, key_ty, key, registry)?;
                    let entry = validate(path, value_ty, entry, registry)?;
                    Ok((key, entry))
                })
                .collect::<Result<Vec<_>, AbiError>>()
                .map(AbiValue::Map)
        }
        TypeExpr::Custom(name) => validate_custom(path, name, value, registry),
    }
}

fn validate_primitive(path: &str, primitive: Primitive, value: &AbiValue) -> Result<AbiValue, AbiError> {
    match primitive {
        Primitive::String => match value {
            AbiValue::Text(_) => Ok(value.clone()),
            _ => Err(AbiError::mismatch(path, "a string", value)),
        },
        Primitive::Bytes => match value {
            AbiValue::Bytes(_) => Ok(value.clone()),
            _ => Err(AbiError::mismatch(path, "a byte array", value)),
        },
        wide if wide.is_wide() => {
            let AbiValue::BigInt(n) = value else {
                return Err(AbiError::mismatch(path, "a BigInt", value));
            };
            check_range(path, wide, *n, value)?;
            Ok(value.clone())
        }
        narrow => {
            let n = value
                .as_integer()
                .ok_or_else(|| AbiError::mismatch(path, "a integer", value))?;
            check_range(path, narrow, n, value)?;
            // Bounded by u32::MAX, always fits
            Ok(AbiValue::Int(n as i64))
        }
    }
}

fn check_range(path: &str, primitive: Primitive, n: i128, value: &AbiValue) -> Result<(), AbiError> {
    let Some(max) = primitive.int_max() else {
        return Ok(());
    };
    let min = if primitive.is_signed() { -max } else { 0 };

    if n < min || n > max {
        return Err(AbiError::mismatch(
            path,
            format!("a {}", primitive.keyword()),
            value,
        ));
    }
    Ok(())
}

fn validate_custom(
    path: &str,
    name: &str,
    value: &AbiValue,
    registry: &AbiRegistry,
) -> Result<AbiValue, AbiError> {
    let custom = registry
        .resolve_custom_type(name)
        .ok_or_else(|| AbiError::UnsupportedType {
            path: path.to_string(),
            ty: name.to_string(),
        })?;

    match &custom.kind {
        TypeKind::Object => {}
        TypeKind::Other(kind) => {
            return Err(AbiError::UnsupportedType {
                path: path.to_string(),
                ty: format!("{} ({})", name, kind),
            })
        }
    }

    if !matches!(value, AbiValue::Map(_)) {
        return Err(AbiError::mismatch(path, format!("a {} object", name), value));
    }

    custom
        .fields
        .iter()
        .map(|field| {
            let field_path = format!("{}.{}", path, field.name);
            let field_value = value.get(&field.name).unwrap_or(&AbiValue::Null);
            validate(&field_path, &field.ty, field_value, registry)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(AbiValue::Array)
}
