//! Value encoding/decoding for the PHP `serialize()` text format.
//!
//! ```text
//! N;                      null
//! b:1;                    bool
//! i:-42;                  integer
//! d:1.5;                  float
//! s:3:"foo";              string, length in bytes
//! a:1:{i:0;s:3:"foo";}    array of key/value pairs
//! ```

use crate::codec::primitives::{Reader, Writer};
use crate::error::DecodeError;
use crate::limits::{MAX_DEPTH, MAX_PREALLOC};
use crate::model::{Map, Value};

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a single value from `input`.
///
/// Empty input yields `Ok(None)`. Bytes following the first complete value
/// are ignored; decrypted cookies carry zero padding after the payload.
pub fn decode(input: &[u8]) -> Result<Option<Value>, DecodeError> {
    let mut reader = Reader::new(input);
    if reader.is_empty() {
        return Ok(None);
    }
    decode_value(&mut reader).map(Some)
}

/// Decodes one value at the reader's position.
pub fn decode_value(reader: &mut Reader<'_>) -> Result<Value, DecodeError> {
    decode_nested(reader, 0)
}

fn decode_nested(reader: &mut Reader<'_>, depth: usize) -> Result<Value, DecodeError> {
    let position = reader.position();
    let token = reader.read_byte()?;
    match token {
        b'N' => {
            reader.expect(b';')?;
            Ok(Value::Null)
        }
        b'b' => decode_bool(reader),
        b'i' => decode_integer(reader).map(Value::Integer),
        b'd' => decode_float(reader),
        b's' => decode_string(reader).map(|bytes| Value::Bytes(bytes.to_vec())),
        b'a' => decode_array(reader, depth, position),
        _ => Err(DecodeError::UnknownToken { token, position }),
    }
}

fn decode_bool(reader: &mut Reader<'_>) -> Result<Value, DecodeError> {
    reader.expect(b':')?;
    let position = reader.position();
    let value = match reader.read_until(b';', false)? {
        b"0" => false,
        b"1" => true,
        _ => return Err(DecodeError::BooleanFormat { position }),
    };
    reader.expect(b';')?;
    Ok(Value::Bool(value))
}

fn decode_integer(reader: &mut Reader<'_>) -> Result<i64, DecodeError> {
    reader.expect(b':')?;
    let position = reader.position();
    let field = reader.read_until(b';', false)?;
    let value = std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(DecodeError::IntegerFormat { position })?;
    reader.expect(b';')?;
    Ok(value)
}

fn decode_float(reader: &mut Reader<'_>) -> Result<Value, DecodeError> {
    reader.expect(b':')?;
    let position = reader.position();
    let field = reader.read_until(b';', false)?;
    let value = parse_float(field).ok_or(DecodeError::FloatFormat { position })?;
    reader.expect(b';')?;
    Ok(Value::Float(value))
}

/// Parses PHP's float rendering: decimal or exponent notation, `INF`, `-INF`, `NAN`.
fn parse_float(field: &[u8]) -> Option<f64> {
    match field {
        b"INF" => return Some(f64::INFINITY),
        b"-INF" => return Some(f64::NEG_INFINITY),
        b"NAN" => return Some(f64::NAN),
        _ => {}
    }
    // Rust's parser also takes "inf"/"nan" spellings PHP never writes.
    if !field
        .iter()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
    {
        return None;
    }
    std::str::from_utf8(field).ok()?.parse().ok()
}

/// Reads a `<digits>:` length or count field.
fn decode_length(reader: &mut Reader<'_>) -> Result<usize, DecodeError> {
    let position = reader.position();
    let field = reader.read_until(b':', false)?;
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return Err(DecodeError::IntegerFormat { position });
    }
    let len = std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or(DecodeError::IntegerFormat { position })?;
    reader.expect(b':')?;
    Ok(len)
}

/// Reads the body of `s:<len>:"<bytes>";` after the tag.
///
/// The content is taken by byte count, so it may itself contain quotes.
fn decode_string<'a>(reader: &mut Reader<'a>) -> Result<&'a [u8], DecodeError> {
    reader.expect(b':')?;
    let len = decode_length(reader)?;
    reader.expect(b'"')?;
    let bytes = reader.read_exact(len)?;
    reader.expect(b'"')?;
    reader.expect(b';')?;
    Ok(bytes)
}

/// Array key as it appeared on the wire.
enum Key {
    Int(i64),
    Str(Vec<u8>),
}

impl Key {
    fn into_bytes(self) -> Vec<u8> {
        match self {
            Key::Int(i) => i.to_string().into_bytes(),
            Key::Str(s) => s,
        }
    }
}

fn decode_key(reader: &mut Reader<'_>) -> Result<Key, DecodeError> {
    let position = reader.position();
    let token = reader.read_byte()?;
    match token {
        b'i' => decode_integer(reader).map(Key::Int),
        b's' => decode_string(reader).map(|bytes| Key::Str(bytes.to_vec())),
        _ => Err(DecodeError::InvalidKey { token, position }),
    }
}

fn decode_array(
    reader: &mut Reader<'_>,
    depth: usize,
    position: usize,
) -> Result<Value, DecodeError> {
    if depth >= MAX_DEPTH {
        return Err(DecodeError::DepthExceeded {
            max: MAX_DEPTH,
            position,
        });
    }
    reader.expect(b':')?;
    let count = decode_length(reader)?;
    reader.expect(b'{')?;

    let mut pairs = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        let key = decode_key(reader)?;
        let value = decode_nested(reader, depth + 1)?;
        pairs.push((key, value));
    }
    reader.expect(b'}')?;

    Ok(resolve_array(pairs))
}

/// Picks List or Map for a decoded array.
///
/// Only integer keys `0, 1, 2, ...` in exactly that order make a list. Every
/// other shape, including an empty array, becomes a map with the keys
/// stringified as they appeared.
fn resolve_array(pairs: Vec<(Key, Value)>) -> Value {
    let sequential = !pairs.is_empty()
        && pairs
            .iter()
            .enumerate()
            .all(|(i, (key, _))| matches!(key, Key::Int(k) if *k >= 0 && *k as usize == i));

    if sequential {
        Value::List(pairs.into_iter().map(|(_, v)| v).collect())
    } else {
        let mut map = Map::with_capacity(pairs.len());
        for (key, value) in pairs {
            map.insert(key.into_bytes(), value);
        }
        Value::Map(map)
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a value into its serialized form.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut writer = Writer::new();
    encode_into(&mut writer, value);
    writer.into_bytes()
}

/// Encodes a value, appending to `writer`.
pub fn encode_into(writer: &mut Writer, value: &Value) {
    match value {
        Value::Null => writer.write_bytes(b"N;"),
        Value::Bool(true) => writer.write_bytes(b"b:1;"),
        Value::Bool(false) => writer.write_bytes(b"b:0;"),
        Value::Integer(i) => encode_integer(writer, *i),
        Value::Float(f) => {
            writer.write_bytes(b"d:");
            write_float(writer, *f);
            writer.write_byte(b';');
        }
        Value::Bytes(bytes) => encode_string(writer, bytes),
        Value::List(items) => {
            encode_array_header(writer, items.len());
            for (i, item) in items.iter().enumerate() {
                encode_integer(writer, i as i64);
                encode_into(writer, item);
            }
            writer.write_byte(b'}');
        }
        Value::Map(map) => {
            encode_array_header(writer, map.len());
            for (key, item) in map.iter() {
                encode_string(writer, key);
                encode_into(writer, item);
            }
            writer.write_byte(b'}');
        }
    }
}

fn encode_integer(writer: &mut Writer, value: i64) {
    writer.write_bytes(b"i:");
    writer.write_display(value);
    writer.write_byte(b';');
}

fn encode_string(writer: &mut Writer, bytes: &[u8]) {
    writer.write_bytes(b"s:");
    writer.write_display(bytes.len());
    writer.write_bytes(b":\"");
    writer.write_bytes(bytes);
    writer.write_bytes(b"\";");
}

fn encode_array_header(writer: &mut Writer, len: usize) {
    writer.write_bytes(b"a:");
    writer.write_display(len);
    writer.write_bytes(b":{");
}

/// Shortest decimal that parses back to the same float, always with a
/// fractional part or exponent (`9.0`, `1.5`, `1e25`).
fn write_float(writer: &mut Writer, value: f64) {
    if value.is_nan() {
        writer.write_bytes(b"NAN");
    } else if value.is_infinite() {
        let text: &[u8] = if value > 0.0 { b"INF" } else { b"-INF" };
        writer.write_bytes(text);
    } else {
        writer.write_bytes(format!("{:?}", value).as_bytes());
    }
}


#[cfg(test)]
mod tests {
    use super::strategies::arb_value;
    use super::*;
    use proptest::prelude::*;

    fn decode_str(s: &str) -> Result<Option<Value>, DecodeError> {
        decode(s.as_bytes())
    }

    fn map(pairs: Vec<(&str, Value)>) -> Value {
        Value::Map(pairs.into_iter().collect())
    }

    const MIXED: &str = r#"a:7:{s:1:"a";s:3:"foo";s:1:"b";i:4;s:1:"c";d:1.5;s:1:"d";b:1;s:1:"e";N;s:1:"f";a:1:{i:0;i:1;}s:1:"g";a:1:{s:1:"x";s:3:"bar";}}"#;

    fn mixed_value() -> Value {
        map(vec![
            ("a", Value::from("foo")),
            ("b", Value::Integer(4)),
            ("c", Value::Float(1.5)),
            ("d", Value::Bool(true)),
            ("e", Value::Null),
            ("f", Value::List(vec![Value::Integer(1)])),
            ("g", map(vec![("x", Value::from("bar"))])),
        ])
    }

    #[test]
    fn test_empty_input_is_no_value() {
        assert_eq!(decode(b"").unwrap(), None);
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode_str("N;").unwrap(), Some(Value::Null));
        assert_eq!(decode_str("b:1;").unwrap(), Some(Value::Bool(true)));
        assert_eq!(decode_str("b:0;").unwrap(), Some(Value::Bool(false)));
        assert_eq!(decode_str("i:42;").unwrap(), Some(Value::Integer(42)));
        assert_eq!(decode_str("i:-7;").unwrap(), Some(Value::Integer(-7)));
        assert_eq!(decode_str("d:9.0;").unwrap(), Some(Value::Float(9.0)));
        assert_eq!(decode_str("d:5;").unwrap(), Some(Value::Float(5.0)));
        assert_eq!(decode_str("d:478.164;").unwrap(), Some(Value::Float(478.164)));
        assert_eq!(decode_str("d:-0.25;").unwrap(), Some(Value::Float(-0.25)));
        assert_eq!(decode_str("d:1.0E+25;").unwrap(), Some(Value::Float(1e25)));
        assert_eq!(decode_str("d:INF;").unwrap(), Some(Value::Float(f64::INFINITY)));
        assert_eq!(decode_str("d:-INF;").unwrap(), Some(Value::Float(f64::NEG_INFINITY)));
        assert!(matches!(decode_str("d:NAN;").unwrap(), Some(Value::Float(f)) if f.is_nan()));
    }

    #[test]
    fn test_decode_strings() {
        assert_eq!(decode_str(r#"s:3:"foo";"#).unwrap(), Some(Value::from("foo")));
        assert_eq!(decode_str(r#"s:0:"";"#).unwrap(), Some(Value::from("")));
        // Quotes inside the content are covered by the byte count.
        assert_eq!(
            decode_str(r#"s:13:"{"foo":"bar"}";"#).unwrap(),
            Some(Value::from(r#"{"foo":"bar"}"#))
        );
        // Multi-byte text is counted in bytes.
        assert_eq!(decode_str(r#"s:3:"√";"#).unwrap(), Some(Value::from("√")));
    }

    #[test]
    fn test_decode_non_utf8_string() {
        let mut input = b"s:2:\"".to_vec();
        input.extend_from_slice(&[0xff, 0x00]);
        input.extend_from_slice(b"\";");
        assert_eq!(decode(&input).unwrap(), Some(Value::Bytes(vec![0xff, 0x00])));
    }

    #[test]
    fn test_decode_list() {
        assert_eq!(
            decode_str(r#"a:2:{i:0;s:3:"foo";i:1;s:3:"bar";}"#).unwrap(),
            Some(Value::List(vec![Value::from("foo"), Value::from("bar")]))
        );
        assert_eq!(
            decode_str(r#"a:3:{i:0;s:3:"foo";i:1;i:42;i:2;d:42.5;}"#).unwrap(),
            Some(Value::List(vec![
                Value::from("foo"),
                Value::Integer(42),
                Value::Float(42.5)
            ]))
        );
        assert_eq!(
            decode_str("a:1:{i:0;a:0:{}}").unwrap(),
            Some(Value::List(vec![Value::Map(Map::new())]))
        );
    }

    #[test]
    fn test_decode_map() {
        assert_eq!(
            decode_str(r#"a:1:{s:3:"foo";s:3:"bar";}"#).unwrap(),
            Some(map(vec![("foo", Value::from("bar"))]))
        );
        assert_eq!(
            decode_str(r#"a:1:{s:3:"foo";a:1:{s:3:"bar";i:42;}}"#).unwrap(),
            Some(map(vec![("foo", map(vec![("bar", Value::Integer(42))]))]))
        );
        assert_eq!(
            decode_str(r#"a:3:{s:1:"a";s:3:"bar";s:1:"b";i:1;s:1:"c";b:0;}"#).unwrap(),
            Some(map(vec![
                ("a", Value::from("bar")),
                ("b", Value::Integer(1)),
                ("c", Value::Bool(false)),
            ]))
        );
    }

    #[test]
    fn test_empty_array_is_empty_map() {
        assert_eq!(decode_str("a:0:{}").unwrap(), Some(Value::Map(Map::new())));
    }

    #[test]
    fn test_out_of_order_integer_keys_make_a_map() {
        let decoded = decode_str(r#"a:2:{i:1;s:1:"x";i:0;s:1:"y";}"#).unwrap();
        assert_eq!(
            decoded,
            Some(map(vec![("1", Value::from("x")), ("0", Value::from("y"))]))
        );

        let decoded = decode_str(r#"a:1:{i:5;s:1:"x";}"#).unwrap();
        assert_eq!(decoded, Some(map(vec![("5", Value::from("x"))])));
    }

    #[test]
    fn test_string_digit_keys_make_a_map() {
        let decoded = decode_str(r#"a:1:{s:1:"0";N;}"#).unwrap();
        assert_eq!(decoded, Some(map(vec![("0", Value::Null)])));
    }

    #[test]
    fn test_duplicate_keys_keep_last_value() {
        let decoded = decode_str(r#"a:2:{s:1:"k";i:1;s:1:"k";i:2;}"#).unwrap();
        assert_eq!(decoded, Some(map(vec![("k", Value::Integer(2))])));
    }

    #[test]
    fn test_trailing_padding_ignored() {
        let mut input = b"s:3:\"foo\";".to_vec();
        input.extend_from_slice(&[0u8; 22]);
        assert_eq!(decode(&input).unwrap(), Some(Value::from("foo")));
    }

    #[test]
    fn test_lowercase_null_is_unknown_token() {
        assert_eq!(
            decode_str("n;").unwrap_err(),
            DecodeError::UnknownToken { token: b'n', position: 0 }
        );
    }

    #[test]
    fn test_short_string_is_rejected() {
        // Declares 3 bytes but only 2 precede the closing quote.
        let err = decode_str(r#"s:3:"fo";"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedByte { expected: b'"', .. }));

        let err = decode_str(r#"s:3:"fo""#).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedEnd { .. } | DecodeError::UnexpectedByte { actual: None, .. }
        ));

        let err = decode_str(r#"s:10:"fo";"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_format_errors() {
        assert_eq!(
            decode_str("i:abc;").unwrap_err(),
            DecodeError::IntegerFormat { position: 2 }
        );
        assert_eq!(
            decode_str("d:1.2.3;").unwrap_err(),
            DecodeError::FloatFormat { position: 2 }
        );
        assert_eq!(
            decode_str("d:inf;").unwrap_err(),
            DecodeError::FloatFormat { position: 2 }
        );
        assert_eq!(
            decode_str("b:2;").unwrap_err(),
            DecodeError::BooleanFormat { position: 2 }
        );
        assert_eq!(
            decode_str(r#"s:x:"a";"#).unwrap_err(),
            DecodeError::IntegerFormat { position: 2 }
        );
    }

    #[test]
    fn test_missing_delimiters() {
        assert_eq!(
            decode_str("N:").unwrap_err(),
            DecodeError::UnexpectedByte {
                expected: b';',
                actual: Some(b':'),
                position: 1
            }
        );
        assert!(matches!(
            decode_str("a:1:[i:0;N;}").unwrap_err(),
            DecodeError::UnexpectedByte { expected: b'{', .. }
        ));
        assert!(matches!(
            decode_str("a:1:{i:0;N;i:1;N;}").unwrap_err(),
            DecodeError::UnexpectedByte { expected: b'}', actual: Some(b'i'), .. }
        ));
        assert!(matches!(
            decode_str("i:42").unwrap_err(),
            DecodeError::DelimiterNotFound { delimiter: b';', .. }
        ));
    }

    #[test]
    fn test_truncated_array() {
        let err = decode_str(r#"a:2:{i:0;s:3:"foo";"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_invalid_key() {
        assert_eq!(
            decode_str("a:1:{d:1.5;N;}").unwrap_err(),
            DecodeError::InvalidKey { token: b'd', position: 5 }
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut input = String::new();
        for _ in 0..=MAX_DEPTH {
            input.push_str("a:1:{i:0;");
        }
        let err = decode_str(&input).unwrap_err();
        assert!(matches!(err, DecodeError::DepthExceeded { max: MAX_DEPTH, .. }));
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&Value::Null), b"N;");
        assert_eq!(encode(&Value::Bool(true)), b"b:1;");
        assert_eq!(encode(&Value::Bool(false)), b"b:0;");
        assert_eq!(encode(&Value::Integer(1)), b"i:1;");
        assert_eq!(encode(&Value::Integer(-12)), b"i:-12;");
        assert_eq!(encode(&Value::Float(1.5)), b"d:1.5;");
        assert_eq!(encode(&Value::Float(9.0)), b"d:9.0;");
        assert_eq!(encode(&Value::Float(f64::INFINITY)), b"d:INF;");
        assert_eq!(encode(&Value::Float(f64::NAN)), b"d:NAN;");
        assert_eq!(encode(&Value::from("foo")), br#"s:3:"foo";"#);
        assert_eq!(encode(&Value::from("√")), "s:3:\"√\";".as_bytes());
    }

    #[test]
    fn test_encode_containers() {
        assert_eq!(encode(&Value::List(vec![])), b"a:0:{}");
        assert_eq!(encode(&Value::Map(Map::new())), b"a:0:{}");
        assert_eq!(
            encode(&Value::List(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])),
            b"a:3:{i:0;i:1;i:1;i:2;i:2;i:3;}"
        );
        assert_eq!(
            encode(&Value::List(vec![
                Value::from("foo"),
                Value::List(vec![Value::from("bar")])
            ])),
            br#"a:2:{i:0;s:3:"foo";i:1;a:1:{i:0;s:3:"bar";}}"#
        );
        assert_eq!(
            encode(&map(vec![("a", Value::from("foo")), ("b", Value::Integer(4))])),
            br#"a:2:{s:1:"a";s:3:"foo";s:1:"b";i:4;}"#
        );
    }

    #[test]
    fn test_mixed_payload_both_directions() {
        assert_eq!(encode(&mixed_value()), MIXED.as_bytes());
        assert_eq!(decode_str(MIXED).unwrap(), Some(mixed_value()));
    }

    #[test]
    fn test_repeated_rounds_are_stable() {
        let mut bytes = MIXED.as_bytes().to_vec();
        for _ in 0..3 {
            let value = decode(&bytes).unwrap().unwrap();
            bytes = encode(&value);
        }
        assert_eq!(bytes, MIXED.as_bytes());
    }

    #[test]
    fn test_empty_list_comes_back_as_map() {
        let bytes = encode(&Value::List(vec![]));
        assert_eq!(decode(&bytes).unwrap(), Some(Value::Map(Map::new())));
    }

    proptest! {
        #[test]
        fn prop_roundtrip(value in arb_value()) {
            let bytes = encode(&value);
            prop_assert_eq!(decode(&bytes).unwrap(), Some(value));
        }

        #[test]
        fn prop_decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
            let _ = decode(&data);
        }
    }
}
