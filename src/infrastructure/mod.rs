//! Infrastructure layer - External collaborators
//!
//! This layer contains:
//! - CBOR codec and the ABI-aware call codec
//! - ABI file scanning for contract directories
//! - The transport seam for signed submission

pub mod abi;
pub mod transport;

pub use abi::{AbiCatalog, AbiScanner, CborCallCodec};
pub use transport::{Account, SubmitRequest, Transport};
