//! Client handle bundling a context with a transport

use std::sync::Arc;

use crate::core::Context;
use crate::domain::abi::{AbiError, AbiRegistry, CallOutput};
use crate::infrastructure::{AbiCatalog, Account, Transport};

use super::args::CallArgs;
use super::binding::ContractBinding;

/// Entry point for binding contracts against one node configuration
#[derive(Clone)]
pub struct Client {
    ctx: Arc<Context>,
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(ctx: Context, transport: Arc<dyn Transport>) -> Self {
        Self {
            ctx: Arc::new(ctx),
            transport,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Bind an actor address to its ABI
    pub fn bind(&self, address: impl Into<String>, registry: Arc<AbiRegistry>) -> Contract {
        Contract {
            client: self.clone(),
            binding: ContractBinding::new(address, registry),
        }
    }

    /// Bind using an ABI from a scanned catalog
    pub fn bind_named(&self, address: impl Into<String>, catalog: &AbiCatalog, contract: &str) -> Option<Contract> {
        catalog.get(contract).map(|registry| self.bind(address, registry))
    }
}

/// A bound contract ready to be called
#[derive(Clone)]
pub struct Contract {
    client: Client,
    binding: ContractBinding,
}

impl Contract {
    pub fn binding(&self) -> &ContractBinding {
        &self.binding
    }

    pub fn address(&self) -> &str {
        self.binding.address()
    }

    /// Call a method by name
    pub async fn call(
        &self,
        method: &str,
        account: &Account,
        value: &str,
        args: CallArgs,
    ) -> Result<CallOutput, AbiError> {
        self.binding
            .invoke(
                &self.client.ctx,
                self.client.transport.as_ref(),
                method,
                account,
                value,
                &args,
            )
            .await
    }
}
