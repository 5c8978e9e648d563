//! CBOR wire codec for call parameters and results

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ciborium::value::{CanonicalValue, Integer, Value};

use crate::domain::abi::{AbiError, AbiValue};

/// CBOR tag for an unsigned bignum
const TAG_POS_BIGNUM: u64 = 2;
/// CBOR tag for a negative bignum
const TAG_NEG_BIGNUM: u64 = 3;

/// Encode an ordered parameter list as a CBOR array
pub fn encode_params(args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let items = args.iter().map(to_cbor).collect::<Result<Vec<_>, _>>()?;
    write(&Value::Array(items))
}

/// Encode a single value
pub fn encode(value: &AbiValue) -> Result<Vec<u8>, AbiError> {
    write(&to_cbor(value)?)
}

/// Decode exactly one CBOR value; leftover input is an error
pub fn decode(bytes: &[u8]) -> Result<AbiValue, AbiError> {
    let mut reader = bytes;
    let value: Value = ciborium::de::from_reader(&mut reader)
        .map_err(|e| AbiError::Codec(format!("invalid CBOR: {:?}", e)))?;
    if !reader.is_empty() {
        return Err(AbiError::Codec(format!(
            "trailing bytes after CBOR value ({} left)",
            reader.len()
        )));
    }
    from_cbor(value)
}

/// Unwrap a base64 transport result into raw bytes
pub fn decode_base64(raw: &str) -> Result<Vec<u8>, AbiError> {
    STANDARD
        .decode(raw.trim())
        .map_err(|e| AbiError::Codec(format!("invalid base64 response: {}", e)))
}

fn write(value: &Value) -> Result<Vec<u8>, AbiError> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf)
        .map_err(|e| AbiError::Codec(format!("failed to encode CBOR: {:?}", e)))?;
    Ok(buf)
}

fn to_cbor(value: &AbiValue) -> Result<Value, AbiError> {
    let cbor = match value {
        AbiValue::Null => Value::Null,
        AbiValue::Bool(b) => Value::Bool(*b),
        AbiValue::Int(n) => Value::Integer(Integer::from(*n)),
        AbiValue::BigInt(n) => Value::Integer(
            Integer::try_from(*n)
                .map_err(|_| AbiError::Codec(format!("integer {} exceeds 64 bits", n)))?,
        ),
        AbiValue::Float(x) => Value::Float(*x),
        AbiValue::Text(s) => Value::Text(s.clone()),
        AbiValue::Bytes(bytes) => Value::Bytes(bytes.clone()),
        AbiValue::Array(items) => {
            Value::Array(items.iter().map(to_cbor).collect::<Result<Vec<_>, _>>()?)
        }
        AbiValue::Map(entries) => {
            let mut encoded = entries
                .iter()
                .map(|(k, v)| Ok((CanonicalValue::from(to_cbor(k)?), to_cbor(v)?)))
                .collect::<Result<Vec<_>, AbiError>>()?;
            encoded.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Map(encoded.into_iter().map(|(k, v)| (Value::from(k), v)).collect())
        }
    };
    Ok(cbor)
}

fn from_cbor(value: Value) -> Result<AbiValue, AbiError> {
    let decoded = match value {
        Value::Null => AbiValue::Null,
        Value::Bool(b) => AbiValue::Bool(b),
        Value::Integer(n) => integer_value(i128::from(n)),
        Value::Float(x) => AbiValue::Float(x),
        Value::Text(s) => AbiValue::Text(s),
        Value::Bytes(bytes) => AbiValue::Bytes(bytes),
        Value::Array(items) => {
            AbiValue::Array(items.into_iter().map(from_cbor).collect::<Result<Vec<_>, _>>()?)
        }
        Value::Map(entries) => AbiValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| Ok((from_cbor(k)?, from_cbor(v)?)))
                .collect::<Result<Vec<_>, AbiError>>()?,
        ),
        Value::Tag(tag @ (TAG_POS_BIGNUM | TAG_NEG_BIGNUM), inner) => {
            let Value::Bytes(bytes) = *inner else {
                return Err(AbiError::Codec("bignum tag without byte string".to_string()));
            };
            if bytes.len() > 16 {
                return Err(AbiError::Codec(format!("bignum of {} bytes is too large", bytes.len())));
            }
            let magnitude = bytes.iter().fold(0u128, |acc, b| (acc << 8) | u128::from(*b));
            let magnitude = i128::try_from(magnitude)
                .map_err(|_| AbiError::Codec("bignum is too large".to_string()))?;
            if tag == TAG_POS_BIGNUM {
                AbiValue::BigInt(magnitude)
            } else {
                AbiValue::BigInt(-1 - magnitude)
            }
        }
        Value::Tag(tag, _) => {
            return Err(AbiError::Codec(format!("unsupported CBOR tag {}", tag)));
        }
        other => {
            return Err(AbiError::Codec(format!("unsupported CBOR value {:?}", other)));
        }
    };
    Ok(decoded)
}

/// Integers beyond native precision decode as `BigInt`
fn integer_value(n: i128) -> AbiValue {
    match i64::try_from(n) {
        Ok(small) => AbiValue::Int(small),
        Err(_) => AbiValue::BigInt(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_bytes() {
        // ["1001", 1000]
        let encoded = encode_params(&[AbiValue::text("1001"), AbiValue::big(1000)]).unwrap();
        assert_eq!(hex::encode(&encoded), "8264313030311903e8");

        // [] for a call without arguments
        assert_eq!(encode_params(&[]).unwrap(), vec![0x80]);
    }

    #[test]
    fn test_round_trip() {
        let args = vec![
            AbiValue::Int(-5),
            AbiValue::big(u64::MAX),
            AbiValue::big(-(i64::MAX as i128)),
            AbiValue::text("data"),
            AbiValue::Bytes(vec![0xde, 0xad]),
            AbiValue::Array(vec![AbiValue::big(1000), AbiValue::big(1000)]),
            AbiValue::object([("test", AbiValue::big(1000))]),
            AbiValue::Array(vec![
                AbiValue::text("x"),
                AbiValue::Array(vec![AbiValue::Int(1), AbiValue::Int(2)]),
            ]),
        ];
        let encoded = encode_params(&args).unwrap();
        assert_eq!(decode(&encoded).unwrap(), AbiValue::Array(args));
    }

    #[test]
    fn test_map_keys_sorted() {
        let a = AbiValue::object([("bb", AbiValue::Int(1)), ("a", AbiValue::Int(2))]);
        let b = AbiValue::object([("a", AbiValue::Int(2)), ("bb", AbiValue::Int(1))]);
        assert_eq!(encode(&a).unwrap(), encode(&b).unwrap());
    }

    #[test]
    fn test_u64_above_i64_decodes_as_bigint() {
        let encoded = encode(&AbiValue::big(u64::MAX)).unwrap();
        assert!(matches!(decode(&encoded).unwrap(), AbiValue::BigInt(n) if n == u64::MAX as i128));
    }

    #[test]
    fn test_bignum_tag() {
        // tag 2 over bytes 0x01 0x00 => 256
        let bytes = hex::decode("c2420100").unwrap();
        assert_eq!(decode(&bytes).unwrap(), AbiValue::big(256));
        // tag 3 over bytes 0x00 => -1
        let bytes = hex::decode("c34100").unwrap();
        assert_eq!(decode(&bytes).unwrap(), AbiValue::big(-1));
    }

    #[test]
    fn test_oversized_bigint_rejected() {
        let err = encode(&AbiValue::BigInt(u64::MAX as i128 + 1)).unwrap_err();
        assert!(matches!(err, AbiError::Codec(_)));
    }

    #[test]
    fn test_base64() {
        assert_eq!(decode_base64("gWVIZWxsbw==").unwrap(), hex::decode("816548656c6c6f").unwrap());
        assert!(decode_base64("not base64!").is_err());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode_params(&[AbiValue::text("ok")]).unwrap();
        assert_eq!(
            decode(&bytes).unwrap(),
            AbiValue::Array(vec![AbiValue::text("ok")])
        );

        bytes.extend_from_slice(&[0xff, 0x00, 0x13]);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, AbiError::Codec(ref msg) if msg.starts_with("trailing bytes")));
    }

    #[test]
    fn test_map_keys_length_first() {
        // {"a": 2, "bb": 1}: the shorter key is written first
        let value = AbiValue::object([("bb", AbiValue::Int(1)), ("a", AbiValue::Int(2))]);
        assert_eq!(hex::encode(encode(&value).unwrap()), "a261610262626201");
    }
}
