//! Domain layer - ABI model, values, and validation rules

pub mod abi;
