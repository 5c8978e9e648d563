//! Call codec trait and decoded call output

use super::error::AbiError;
use super::registry::FunctionSpec;
use super::value::AbiValue;

/// Result of a decoded contract call
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutput {
    /// The function declares no return values
    None,
    /// Exactly one declared return value, unwrapped
    Single(AbiValue),
    /// Two or more declared return values, in declaration order
    Many(Vec<AbiValue>),
}

impl CallOutput {
    pub fn is_none(&self) -> bool {
        matches!(self, CallOutput::None)
    }

    /// Take the single return value, if that is what the function declares
    pub fn into_single(self) -> Option<AbiValue> {
        match self {
            CallOutput::Single(value) => Some(value),
            _ => None,
        }
    }

    /// Flatten into the ordered list of return values
    pub fn into_values(self) -> Vec<AbiValue> {
        match self {
            CallOutput::None => Vec::new(),
            CallOutput::Single(value) => vec![value],
            CallOutput::Many(values) => values,
        }
    }
}

/// Trait for the canonical call codec
///
/// This trait abstracts over the wire encoding so that the dispatcher only
/// deals in validated values.
pub trait CallCodec: Send + Sync {
    /// Encode an ordered list of already coerced arguments
    fn encode_params(&self, args: &[AbiValue]) -> Result<Vec<u8>, AbiError>;

    /// Decode a transport result against the function's declared returns
    ///
    /// # Arguments
    /// * `raw` - The base64 result, `None` when the call returned nothing
    /// * `function` - The function whose `returns` describe the result
    fn decode_response(&self, raw: Option<&str>, function: &FunctionSpec) -> Result<CallOutput, AbiError>;
}
