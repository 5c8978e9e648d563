//! Type expressions parsed from ABI type strings
//!
//! Type text like `Map<string, Array<u64>>` is parsed once when the ABI is
//! loaded. Validation then matches on the resulting tree instead of
//! re-reading strings on every call.

use std::fmt;

use super::error::AbiLoadError;

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    String,
    Bytes,
}

impl Primitive {
    /// Parse a primitive keyword. `Uint8Array` is accepted for `bytes`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let primitive = match keyword {
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "string" => Self::String,
            "bytes" | "Uint8Array" => Self::Bytes,
            _ => return None,
        };
        Some(primitive)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }

    /// Largest accepted magnitude for integer types
    ///
    /// Signed types accept `[-max, max]`; unsigned types accept `[0, max]`.
    pub fn int_max(&self) -> Option<i128> {
        match self {
            Self::U8 => Some(u8::MAX as i128),
            Self::U16 => Some(u16::MAX as i128),
            Self::U32 => Some(u32::MAX as i128),
            Self::U64 => Some(u64::MAX as i128),
            Self::I8 => Some(i8::MAX as i128),
            Self::I16 => Some(i16::MAX as i128),
            Self::I32 => Some(i32::MAX as i128),
            Self::I64 => Some(i64::MAX as i128),
            Self::String | Self::Bytes => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// 64-bit types travel as arbitrary-precision integers
    pub fn is_wide(&self) -> bool {
        matches!(self, Self::U64 | Self::I64)
    }
}

/// A parsed ABI type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Primitive(Primitive),
    Array(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// Reference to an entry in the ABI `types` table
    Custom(String),
}

impl TypeExpr {
    /// Parse ABI type text
    pub fn parse(text: &str) -> Result<Self, AbiLoadError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(invalid(text, "empty type"));
        }

        if let Some(primitive) = Primitive::from_keyword(trimmed) {
            return Ok(Self::Primitive(primitive));
        }

        if let Some(open) = trimmed.find('<') {
            let head = trimmed[..open].trim();
            let inner = trimmed[open + 1..]
                .strip_suffix('>')
                .ok_or_else(|| invalid(text, "missing closing '>'"))?;
            let params = split_params(inner).ok_or_else(|| invalid(text, "unbalanced '<' '>'"))?;

            return match (head, params.as_slice()) {
                ("Array", [item]) => Ok(Self::Array(Box::new(Self::parse(item)?))),
                ("Array", _) => Err(invalid(text, "Array takes exactly one type parameter")),
                ("Map", [key, value]) => Ok(Self::Map(
                    Box::new(Self::parse(key)?),
                    Box::new(Self::parse(value)?),
                )),
                ("Map", _) => Err(invalid(text, "Map takes exactly two type parameters")),
                _ => Err(invalid(text, "unknown generic type")),
            };
        }

        if is_identifier(trimmed) {
            Ok(Self::Custom(trimmed.to_string()))
        } else {
            Err(invalid(text, "not a primitive, generic, or type name"))
        }
    }

    /// Visit every custom type name referenced by this expression
    pub fn custom_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_custom_names(&mut names);
        names
    }

    fn collect_custom_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Primitive(_) => {}
            Self::Array(item) => item.collect_custom_names(out),
            Self::Map(key, value) => {
                key.collect_custom_names(out);
                value.collect_custom_names(out);
            }
            Self::Custom(name) => out.push(name),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.keyword()),
            Self::Array(item) => write!(f, "Array<{}>", item),
            Self::Map(key, value) => write!(f, "Map<{}, {}>", key, value),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

fn invalid(text: &str, reason: &str) -> AbiLoadError {
    AbiLoadError::InvalidType {
        ty: text.to_string(),
        reason: reason.to_string(),
    }
}

/// Split generic parameters on top-level commas
fn split_params(inner: &str) -> Option<Vec<&str>> {
    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                params.push(inner[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return None;
    }
    params.push(inner[start..].trim());
    Some(params)
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
