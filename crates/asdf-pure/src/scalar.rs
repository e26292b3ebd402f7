//! Scalar dispatch: turning `(bytes, tag)` pairs into typed values.
//!
//! A tagged scalar is committed to its tag's type, and failure to parse is
//! a hard error. An untagged (or application-tagged) scalar runs through the
//! ordered disambiguator instead: integer, then float, then boolean, then
//! string, first success wins. The ordering matters: `"1"` becomes the
//! integer 1, never the string `"1"`.

use alloc::string::String;
use core::str;

use crate::error::{Error, Result};
use crate::event::YamlTag;
use crate::node::{Node, Value};
use crate::tag::SchemaTag;

/// Dispatch a scalar's bytes according to its tag.
pub fn sink_scalar(bytes: &[u8], tag: &YamlTag) -> Result<Node> {
    match tag {
        YamlTag::Str => Ok(Node::untagged(Value::String(lossy_string(bytes)))),
        YamlTag::Int => match parse_int(bytes) {
            Some(n) => Ok(Node::untagged(Value::Integer(n))),
            None => Err(invalid("Int", tag, bytes)),
        },
        YamlTag::Float => match parse_float(bytes) {
            Some(f) => Ok(Node::untagged(Value::Number(f))),
            None => Err(invalid("Float", tag, bytes)),
        },
        YamlTag::Bool => match parse_bool(bytes) {
            Some(b) => Ok(Node::untagged(Value::Bool(b))),
            None => Err(invalid("Bool", tag, bytes)),
        },
        YamlTag::Null => Ok(Node::untagged(Value::Null)),
        YamlTag::Uri(uri) => Ok(Node::tagged(SchemaTag::parse(uri), untagged_value(bytes))),
        YamlTag::None => Ok(Node::untagged(untagged_value(bytes))),
        YamlTag::Other(_) => Err(Error::InvalidScalarTag {
            tag: tag.clone(),
            bytes: bytes.to_vec(),
        }),
    }
}

/// The ordered disambiguator for scalars with no committing tag.
pub fn untagged_value(bytes: &[u8]) -> Value {
    if let Some(n) = parse_int(bytes) {
        return Value::Integer(n);
    }
    if let Some(f) = parse_float(bytes) {
        return Value::Number(f);
    }
    if let Some(b) = parse_bool(bytes) {
        return Value::Bool(b);
    }
    Value::String(lossy_string(bytes))
}

fn parse_int(bytes: &[u8]) -> Option<i64> {
    str::from_utf8(bytes).ok()?.parse().ok()
}

fn parse_float(bytes: &[u8]) -> Option<f64> {
    str::from_utf8(bytes).ok()?.parse().ok()
}

fn parse_bool(bytes: &[u8]) -> Option<bool> {
    match bytes {
        b"true" => Some(true),
        b"false" => Some(false),
        _ => None,
    }
}

fn lossy_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn invalid(expected: &'static str, tag: &YamlTag, bytes: &[u8]) -> Error {
    Error::InvalidScalar {
        expected,
        tag: tag.clone(),
        bytes: bytes.to_vec(),
    }
}
