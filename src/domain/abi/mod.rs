//! ABI domain models and contracts
//!
//! This module defines the ABI model, dynamic values, and the validation
//! rules, independent of the wire codec (CBOR).

mod decoder;
mod error;
mod registry;
mod types;
mod validator;
mod value;

pub use decoder::{CallCodec, CallOutput};
pub use error::{AbiError, AbiLoadError};
pub use registry::{AbiRegistry, CustomTypeSpec, FieldSpec, FunctionSpec, ParamSpec, TypeKind};
pub use types::{Primitive, TypeExpr};
pub use validator::validate;
pub use value::AbiValue;
