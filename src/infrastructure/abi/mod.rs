//! ABI infrastructure - CBOR codec and ABI file scanning

pub mod codec;
mod decoder;
mod scanner;

pub use decoder::CborCallCodec;
pub use scanner::{AbiCatalog, AbiScanner};
