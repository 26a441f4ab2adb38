//! The atom of a message is the `Value`.
//! Values are encoded on wire as a header and, if necessary, additional bytes which directly follow the header.
//! Integers remember the width class they were read with, so a `uint16` on wire stays distinguishable from a
//! positive fixint of the same magnitude. When encoding, the width is ignored and the narrowest fitting
//! representation gets chosen.

use crate::header::{self, Header, Width};
use crate::error::{DecodeError, DecoderError, EncodeError};
use log::{debug, trace};
use std::borrow::Cow;
use std::io::Write;
use std::mem::size_of;
use std::str::from_utf8;

/// The possible values of the supported MessagePack subset.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Nil,
    Bool(bool),
    UInt(Width, u64),
    Int(Width, i64),
    /// Only produced by the decoder. Encoding widens it to `F64`.
    F32(f32),
    F64(f64),
    /// Raw string content. The wire format does not require it to be Utf-8.
    Str(Cow<'a, [u8]>),
    Array(Vec<Value<'a>>),
    /// Keys must be `Value::Str` to be encodable.
    Map(Vec<(Value<'a>, Value<'a>)>),
}

impl<'a> Value<'a> {

    pub fn typename(&self) -> &'static str {
        match *self {
            Self::Nil        => "nil",
            Self::Bool(_)    => "bool",
            Self::UInt(_, _) => "unsigned integer",
            Self::Int(_, _)  => "integer",
            Self::F32(_)     => "f32",
            Self::F64(_)     => "f64",
            Self::Str(_)     => "string",
            Self::Array(_)   => "array",
            Self::Map(_)     => "map",
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Str(v) => Some(&**v),
            _            => None,
        }
    }

    /// The string content, if this is a string holding valid Utf-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|v| from_utf8(v).ok())
    }

    /// Looks up the value stored under `key` if this is a map.
    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        match self {
            Self::Map(entries) => entries.iter().find(|(k, _)| k.as_bytes() == Some(key.as_bytes())).map(|(_, v)| v),
            _                  => None,
        }
    }

    fn suffix(width: Width, signed: bool) -> &'static str {
        match (width, signed) {
            (Width::Fix, _)     => "",
            (Width::W8, false)  => "u8",
            (Width::W16, false) => "u16",
            (Width::W32, false) => "u32",
            (Width::W64, false) => "u64",
            (Width::W8, true)   => "i8",
            (Width::W16, true)  => "i16",
            (Width::W32, true)  => "i32",
            (Width::W64, true)  => "i64",
        }
    }

    /// Strings which are not Utf-8 are shown as escaped byte strings, e.g. `b"\xff"`.
    fn quote(v: &[u8]) -> String {
        match from_utf8(v) {
            Ok(v)  => format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")),
            Err(_) => format!("b\"{}\"", v.escape_ascii()),
        }
    }

}

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u64> for Value<'_> {
    fn from(v: u64) -> Self {
        Value::UInt(Width::fit_unsigned(v), v)
    }
}

impl From<u32> for Value<'_> {
    fn from(v: u32) -> Self {
        Value::from(u64::from(v))
    }
}

/// Non-negative values become `Value::UInt`, just like the encoder would write them.
impl From<i64> for Value<'_> {
    fn from(v: i64) -> Self {
        match Header::int(v) {
            Header::Int(w, v) => Value::Int(w, v),
            _                 => Value::from(v as u64),
        }
    }
}

impl From<i32> for Value<'_> {
    fn from(v: i32) -> Self {
        Value::from(i64::from(v))
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Str(Cow::Borrowed(v.as_bytes()))
    }
}

impl From<String> for Value<'_> {
    fn from(v: String) -> Self {
        Value::Str(Cow::Owned(v.into_bytes()))
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(v: &'a [u8]) -> Self {
        Value::Str(Cow::Borrowed(v))
    }
}

impl<'a> From<Vec<Value<'a>>> for Value<'a> {
    fn from(v: Vec<Value<'a>>) -> Self {
        Value::Array(v)
    }
}

/// A human readable form which shows the width classes of integers as suffixes, e.g. `300u16`.
impl<'a> std::fmt::Display for Value<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil           => f.write_str("null"),
            Value::Bool(true)    => f.write_str("true"),
            Value::Bool(false)   => f.write_str("false"),
            Value::UInt(w, v)    => write!(f, "{}{}", v, Self::suffix(*w, false)),
            Value::Int(w, v)     => write!(f, "{}{}", v, Self::suffix(*w, true)),
            Value::F32(v)        => write!(f, "{:?}f32", v),
            Value::F64(v)        => write!(f, "{:?}", v),
            Value::Str(v)        => f.write_str(&Self::quote(v)),
            Value::Array(v) if v.is_empty() => f.write_str("[]"),
            Value::Map(v) if v.is_empty()   => f.write_str("{}"),
            Value::Map(v)        => write!(f, "{{\n{}\n}}", v.iter()
                .flat_map(|(k, f)| format!("{}: {},", k, f).lines().map(|line| format!("  {}", line)).collect::<Vec<String>>())
                .collect::<Vec<String>>().join("\n")),
            Value::Array(v)      => write!(f, "[\n{}\n]", v.iter()
                .flat_map(|f| format!("{},", f).lines().map(|line| format!("  {}", line)).collect::<Vec<String>>())
                .collect::<Vec<String>>().join("\n")),
        }
    }
}

/// Encodes a value into a freshly allocated buffer.
pub fn to_vec(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    Encoder::encode(value, &mut buf)?;
    Ok(buf)
}

/// Used to encode values.
pub struct Encoder<'w, W: Write> {
    writer: &'w mut W,
}

impl<'w, W: Write> Encoder<'w, W> {

    /// Encode a value to the given writer. The resulting `usize` is the amount of bytes that got written.
    /// The whole tree is checked before the first byte gets written, so a failed encode leaves the writer untouched.
    pub fn encode(value: &Value, writer: &'w mut W) -> Result<usize, EncodeError> {
        trace!("encode: starting with {}", value.typename());
        if let Err(e) = Self::check(value) {
            debug!("encode: rejected input: {}", e);
            return Err(e);
        }
        let c = Self { writer }.encode_inner(value)?;
        trace!("encode: wrote {} bytes", c);
        Ok(c)
    }

    fn check(value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Str(v) if v.len() > header::MAX_FIXSTR => Err(EncodeError::OversizedString(v.len())),
            Value::Array(inner) if inner.len() > header::MAX_FIXCONTAINER => Err(EncodeError::OversizedContainer(inner.len())),
            Value::Map(inner) if inner.len() > header::MAX_FIXCONTAINER => Err(EncodeError::OversizedContainer(inner.len())),
            Value::Array(inner) => inner.iter().try_for_each(Self::check),
            Value::Map(inner) => inner.iter().try_for_each(|(key, val)| match key {
                Value::Str(_) => Self::check(key).and_then(|_| Self::check(val)),
                other         => Err(EncodeError::Unencodable(other.typename())),
            }),
            _ => Ok(()),
        }
    }

    fn encode_inner(&mut self, value: &Value) -> Result<usize, EncodeError> {
        let mut c = 0;
        match value {
            Value::Nil         => Header::Nil.encode(self.writer),
            Value::Bool(true)  => Header::True.encode(self.writer),
            Value::Bool(false) => Header::False.encode(self.writer),
            Value::UInt(_, v)  => Header::uint(*v).encode(self.writer),
            Value::Int(_, v)   => Header::int(*v).encode(self.writer),
            Value::F32(v)      => self.encode_f64(f64::from(*v)),
            Value::F64(v)      => self.encode_f64(*v),
            Value::Str(v)      => self.encode_str(v),
            Value::Array(inner) => {
                c += Header::Arr(inner.len()).encode(self.writer)?;
                for val in inner.iter() {
                    c += self.encode_inner(val)?;
                }
                Ok(c)
            },
            Value::Map(inner) => {
                c += Header::Map(inner.len()).encode(self.writer)?;
                for (key, val) in inner.iter() {
                    c += match key {
                        Value::Str(k) => self.encode_str(k)?,
                        other         => return Err(EncodeError::Unencodable(other.typename())),
                    };
                    c += self.encode_inner(val)?;
                }
                Ok(c)
            },
        }
    }

    fn encode_f64(&mut self, v: f64) -> Result<usize, EncodeError> {
        let c = Header::F64.encode(self.writer)?;
        self.writer.write_all(&v.to_be_bytes())?;
        Ok(c + size_of::<f64>())
    }

    fn encode_str(&mut self, v: &[u8]) -> Result<usize, EncodeError> {
        let c = Header::Str(v.len()).encode(self.writer)?;
        self.writer.write_all(v)?;
        Ok(c + v.len())
    }

}

/// Used to decode values. The decoder owns the cursor into a borrowed buffer.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {

    /// Decode a single value from the start of the given buffer and return it together with the number of
    /// consumed bytes. Strings will be borrowed from the buffer instead of copied.
    pub fn decode<B: ?Sized + AsRef<[u8]>>(buf: &'a B) -> Result<(Value<'a>, usize), DecoderError> {
        let mut decoder = Self { buf: buf.as_ref(), pos: 0 };
        trace!("decode: starting with {} bytes", decoder.buf.len());
        let value = decoder.decode_value().map_err(|e| {
            debug!("decode: failed at {}: {}", decoder.pos, e);
            e.at(decoder.pos)
        })?;
        trace!("decode: consumed {} bytes", decoder.pos);
        Ok((value, decoder.pos))
    }

    /// Decode a whole document: a single map which spans the entire buffer.
    pub fn decode_document<B: ?Sized + AsRef<[u8]>>(buf: &'a B) -> Result<Value<'a>, DecoderError> {
        let buf = buf.as_ref();
        let (value, c) = Self::decode(buf)?;
        match value {
            Value::Map(_) if c < buf.len() => Err(DecodeError::Trailing(buf.len() - c).at(c)),
            Value::Map(_)                  => Ok(value),
            other                          => Err(DecodeError::NotAMap(other.typename()).at(0)),
        }
    }

    fn decode_value(&mut self) -> Result<Value<'a>, DecodeError> {
        let header = self.decode_header()?;
        match header {
            Header::Nil        => Ok(Value::Nil),
            Header::True       => Ok(Value::Bool(true)),
            Header::False      => Ok(Value::Bool(false)),
            Header::F32        => Ok(Value::F32(f32::from_be_bytes(self.decode_array()?))),
            Header::F64        => Ok(Value::F64(f64::from_be_bytes(self.decode_array()?))),
            Header::UInt(w, v) => Ok(Value::UInt(w, v)),
            Header::Int(w, v)  => Ok(Value::Int(w, v)),
            Header::Str(len)   => Ok(Value::Str(Cow::Borrowed(self.decode_slice(len)?))),
            Header::Arr(len) => {
                let mut elements = Vec::with_capacity(len);
                for _ in 0..len {
                    elements.push(self.decode_value()?);
                }
                Ok(Value::Array(elements))
            },
            Header::Map(len) => {
                let mut entries: Vec<(Value<'a>, Value<'a>)> = Vec::with_capacity(len);
                for _ in 0..len {
                    let key = self.decode_key()?;
                    let val = self.decode_value()?;
                    // last write wins
                    match entries.iter_mut().find(|(k, _)| k.as_bytes() == Some(key)) {
                        Some(entry) => entry.1 = val,
                        None        => entries.push((Value::Str(Cow::Borrowed(key)), val)),
                    }
                }
                Ok(Value::Map(entries))
            },
        }
    }

    fn decode_key(&mut self) -> Result<&'a [u8], DecodeError> {
        match self.buf.get(self.pos) {
            None => Err(DecodeError::Truncated(1)),
            Some(&lead) if !header::is_fixstr(lead) => {
                Err(DecodeError::InvalidMapKey(Header::name_of(lead).unwrap_or("unsupported tag")))
            },
            Some(_) => match self.decode_header()? {
                Header::Str(len) => self.decode_slice(len),
                other            => Err(DecodeError::InvalidMapKey(other.name())),
            },
        }
    }

    fn decode_header(&mut self) -> Result<Header, DecodeError> {
        let (header, c) = Header::decode(&self.buf[self.pos..])?;
        self.pos += c;
        Ok(header)
    }

    fn decode_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut tmp = [0u8; N];
        tmp.copy_from_slice(self.decode_slice(N)?);
        Ok(tmp)
    }

    fn decode_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.buf.len() - self.pos;
        if remaining < len {
            Err(DecodeError::Truncated(len - remaining))
        } else {
            self.pos += len;
            Ok(&self.buf[self.pos - len .. self.pos])
        }
    }

}
