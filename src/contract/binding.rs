//! Contract binding - one method-table entry per declared function

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::Context;
use crate::domain::abi::{
    validate, AbiError, AbiRegistry, AbiValue, CallCodec, CallOutput, FunctionSpec,
};
use crate::infrastructure::{Account, CborCallCodec, SubmitRequest, Transport};

use super::args::CallArgs;

/// A callable method derived from a function declaration
#[derive(Debug, Clone)]
pub struct Method {
    function: FunctionSpec,
}

impl Method {
    fn new(function: FunctionSpec) -> Self {
        Self { function }
    }

    pub fn function(&self) -> &FunctionSpec {
        &self.function
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn index(&self) -> u64 {
        self.function.method_index
    }

    /// Validate and coerce arguments in declared order
    fn coerce_args(&self, args: &CallArgs, registry: &AbiRegistry) -> Result<Vec<AbiValue>, AbiError> {
        let declared = &self.function.args;
        if declared.is_empty() {
            tracing::debug!(method = %self.function.name, "no args");
            return Ok(Vec::new());
        }

        if args.len() > declared.len() {
            tracing::warn!(
                method = %self.function.name,
                supplied = args.len(),
                declared = declared.len(),
                "ignoring extra arguments"
            );
        }
        for name in args.unknown_names(declared) {
            tracing::warn!(method = %self.function.name, arg = name, "ignoring unknown argument");
        }

        declared
            .iter()
            .enumerate()
            .map(|(position, spec)| {
                let label = spec
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("arg{}", position));
                let value = args
                    .get(position, spec.name.as_deref())
                    .ok_or_else(|| AbiError::ArgumentMissing { name: label.clone() })?;

                tracing::debug!(name = %label, ty = %spec.ty, value = %value, "arg");
                validate(&label, &spec.ty, value, registry)
            })
            .collect()
    }
}

/// A call that passed validation and is ready for submission
#[derive(Debug, Clone)]
pub struct PreparedCall<'a> {
    pub function: &'a FunctionSpec,
    /// Coerced arguments in declared order
    pub args: Vec<AbiValue>,
    /// CBOR encoding of `args`
    pub params: Vec<u8>,
}

/// Immutable pairing of an actor address with its ABI
///
/// The method table is built once here; calls only read it.
#[derive(Debug, Clone)]
pub struct ContractBinding {
    address: String,
    registry: Arc<AbiRegistry>,
    codec: CborCallCodec,
    methods: BTreeMap<String, Method>,
}

impl ContractBinding {
    pub fn new(address: impl Into<String>, registry: Arc<AbiRegistry>) -> Self {
        let address = address.into();
        let methods = registry
            .functions()
            .map(|function| (function.name.clone(), Method::new(function.clone())))
            .collect::<BTreeMap<_, _>>();

        tracing::info!(address = %address, methods = methods.len(), "bound contract");

        Self {
            address,
            codec: CborCallCodec::new(Arc::clone(&registry)),
            registry,
            methods,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn registry(&self) -> &AbiRegistry {
        &self.registry
    }

    /// Look up a method by name
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Get all methods, ordered by name
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    /// Validate and encode a call without submitting it
    pub fn prepare(&self, method: &str, args: &CallArgs) -> Result<PreparedCall<'_>, AbiError> {
        let method = self
            .method(method)
            .ok_or_else(|| AbiError::UnknownMethod(method.to_string()))?;
        let function = method.function();

        tracing::debug!(
            signature = %function.signature(),
            index = function.method_index,
            "call"
        );

        let args = method.coerce_args(args, &self.registry)?;
        let params = self.codec.encode_params(&args)?;

        Ok(PreparedCall {
            function,
            args,
            params,
        })
    }

    /// Validate, encode, submit, and decode one call
    ///
    /// Nothing reaches the transport unless every argument validates.
    /// Transport errors are returned unchanged.
    pub async fn invoke(
        &self,
        ctx: &Context,
        transport: &dyn Transport,
        method: &str,
        account: &Account,
        value: &str,
        args: &CallArgs,
    ) -> Result<CallOutput, AbiError> {
        let prepared = self.prepare(method, args)?;

        let request = SubmitRequest {
            node: &ctx.node,
            account,
            address: &self.address,
            method_index: prepared.function.method_index,
            value,
            params: &prepared.params,
        };

        tracing::debug!(
            address = %self.address,
            index = request.method_index,
            params = %hex::encode(request.params),
            "submitting call"
        );

        let raw = transport.submit(request).await.map_err(AbiError::Transport)?;
        self.codec.decode_response(raw.as_deref(), prepared.function)
    }
}
