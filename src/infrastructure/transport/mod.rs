//! Transport abstraction - signed submission of calls to the execution node
//!
//! Signing and the wire protocol to the node live outside this crate. A
//! transport receives the fully encoded call and returns the node's raw
//! (base64) result.

use std::fmt;

use crate::core::NodeConfig;

/// The account a call is sent from
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub address: String,
    /// Base64 private key, handed to the transport for signing
    pub private_base64: String,
}

impl Account {
    pub fn new(address: impl Into<String>, private_base64: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            private_base64: private_base64.into(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("private_base64", &"<redacted>")
            .finish()
    }
}

/// A fully encoded call ready for submission
#[derive(Debug, Clone, Copy)]
pub struct SubmitRequest<'a> {
    /// Node endpoint and credentials from the caller's context
    pub node: &'a NodeConfig,
    pub account: &'a Account,
    /// Address of the target actor
    pub address: &'a str,
    pub method_index: u64,
    /// Token amount attached to the call
    pub value: &'a str,
    /// CBOR-encoded argument list
    pub params: &'a [u8],
}

/// Abstract submission transport
///
/// Implementations sign and send the call. Errors are returned to the
/// caller unchanged.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Submit a call, returning the base64 result or `None` for no data
    async fn submit(&self, request: SubmitRequest<'_>) -> anyhow::Result<Option<String>>;
}
