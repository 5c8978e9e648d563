//! Dynamic values passed into and returned from contract calls

use std::fmt;

/// A value shaped by an ABI type
///
/// `Int` is a native-precision number. `BigInt` is the arbitrary-precision
/// integer that 64-bit types require, so large values are never silently
/// truncated on the way in.
#[derive(Debug, Clone)]
pub enum AbiValue {
    Null,
    Bool(bool),
    Int(i64),
    BigInt(i128),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Array(Vec<AbiValue>),
    /// Key/value entries in insertion order. Also used for named objects.
    Map(Vec<(AbiValue, AbiValue)>),
}

impl AbiValue {
    pub fn big(value: impl Into<i128>) -> Self {
        Self::BigInt(value.into())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Build a map keyed by text, as callers do for named objects
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AbiValue)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Self::Text(k.into()), v))
                .collect(),
        )
    }

    /// Short name of the value's shape, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::BigInt(_) => "big integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a text key in a map value
    pub fn get(&self, key: &str) -> Option<&AbiValue> {
        match self {
            Self::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Read the value as an integer if it is representable as one
    ///
    /// Accepts both numeric variants, floats without a fractional part, and
    /// text holding a decimal integer.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Int(n) => Some(i128::from(*n)),
            Self::BigInt(n) => Some(*n),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e38 => {
                Some(*f as i128)
            }
            Self::Text(s) => s.trim().parse::<i128>().ok(),
            _ => None,
        }
    }
}

/// Numeric variants compare by value, so `Int(5) == BigInt(5)`.
impl PartialEq for AbiValue {
    fn eq(&self, other: &Self) -> bool {
        use AbiValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(_) | BigInt(_), Int(_) | BigInt(_)) => self.as_integer() == other.as_integer(),
            (Float(a), Float(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::BigInt(n) => write!(f, "{}n", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Self::Array(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AbiValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AbiValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<AbiValue>> for AbiValue {
    fn from(value: Vec<AbiValue>) -> Self {
        Self::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_equality() {
        assert_eq!(AbiValue::Int(1000), AbiValue::big(1000));
        assert_ne!(AbiValue::Int(1000), AbiValue::big(1001));
        assert_ne!(AbiValue::Int(1), AbiValue::text("1"));
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(AbiValue::text(" 42 ").as_integer(), Some(42));
        assert_eq!(AbiValue::Float(7.0).as_integer(), Some(7));
        assert_eq!(AbiValue::Float(7.5).as_integer(), None);
        assert_eq!(AbiValue::text("12abc").as_integer(), None);
        assert_eq!(AbiValue::Bool(true).as_integer(), None);
    }

    #[test]
    fn test_object_lookup() {
        let obj = AbiValue::object([("a", AbiValue::text("x")), ("b", AbiValue::Int(2))]);
        assert_eq!(obj.get("b"), Some(&AbiValue::Int(2)));
        assert!(obj.get("c").is_none());
        assert_eq!(obj.to_string(), r#"{"a": "x", "b": 2}"#);
    }
}
