//! Conversion between JSON documents and `fixpack::Value` trees.
//!
//! JSON only knows a single number type, but the encoder needs to tell integers from floats to pick
//! the narrowest representation. Literals without fraction or exponent which fit into `u64` or `i64`
//! become integers, everything else becomes `Value::F64`. Object keys keep their document order.

use fixpack::Value;
use serde_json::{Map, Number, Value as Json};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Parses a JSON document into an owned value tree.
pub fn from_json(input: &str) -> Result<Value<'static>> {
    let json: Json = serde_json::from_str(input)?;
    Ok(from_json_value(json))
}

pub fn from_json_value(json: Json) -> Value<'static> {
    match json {
        Json::Null      => Value::Nil,
        Json::Bool(v)   => Value::Bool(v),
        Json::Number(n) => from_number(&n),
        Json::String(v) => Value::from(v),
        Json::Array(v)  => Value::Array(v.into_iter().map(from_json_value).collect()),
        Json::Object(v) => Value::Map(v.into_iter().map(|(k, v)| (Value::from(k), from_json_value(v))).collect()),
    }
}

fn from_number(n: &Number) -> Value<'static> {
    match (n.as_u64(), n.as_i64()) {
        (Some(u), _)    => Value::from(u),
        (None, Some(i)) => Value::from(i),
        // without arbitrary precision every other number is an f64
        _               => Value::F64(n.as_f64().unwrap_or_default()),
    }
}

/// Non-finite floats have no JSON representation and turn into `null`. Map keys must be strings.
/// Strings which are not Utf-8 get their invalid sequences replaced with U+FFFD.
pub fn to_json_value(value: &Value) -> Result<Json> {
    Ok(match value {
        Value::Nil        => Json::Null,
        Value::Bool(v)    => Json::Bool(*v),
        Value::UInt(_, v) => Json::Number(Number::from(*v)),
        Value::Int(_, v)  => Json::Number(Number::from(*v)),
        // go through the shortest decimal form so 3.1415927f32 does not print as 3.1415927410125732
        Value::F32(v)     => float(f64::from_str(&v.to_string()).unwrap_or(f64::from(*v))),
        Value::F64(v)     => float(*v),
        Value::Str(v)     => Json::String(String::from_utf8_lossy(v).into_owned()),
        Value::Array(v)   => Json::Array(v.iter().map(to_json_value).collect::<Result<Vec<_>>>()?),
        Value::Map(v)     => Json::Object(v.iter()
            .map(|(k, v)| match k {
                Value::Str(k) => Ok((String::from_utf8_lossy(k).into_owned(), to_json_value(v)?)),
                _             => Err(Error::KeyType),
            })
            .collect::<Result<Map<String, Json>>>()?),
    })
}

fn float(v: f64) -> Json {
    Number::from_f64(v).map_or(Json::Null, Json::Number)
}

pub fn to_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(&to_json_value(value)?)?)
}

pub fn to_json_pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json_value(value)?)?)
}
