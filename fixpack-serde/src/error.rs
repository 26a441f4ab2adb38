use std::fmt::{self, Display};
use std::str::Utf8Error;
use serde::{de, ser};
use fixpack::{EncodeError, DecodeError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct DeserializationError {
    inner: Error,
    at: usize,
}

impl DeserializationError {
    pub fn into_inner(self) -> Error {
        self.inner
    }
}

impl std::error::Error for DeserializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}

impl Display for DeserializationError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{} at input position {}", self.inner, self.at)
    }
}

#[derive(Debug)]
pub enum Error {
    // Decode
    Decode(DecodeError),
    Trailing,
    UnexpectedHeader(&'static [&'static str], &'static str),
    Utf8(Utf8Error),
    // Encode
    Length,
    Encode(EncodeError),
    KeyType,
    Unsupported(&'static str),
    // Json
    Json(serde_json::Error),
    // Both
    Message(String),
}

impl Error {
    pub fn at(self, at: usize) -> DeserializationError {
        DeserializationError { inner: self, at }
    }
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Message(msg) => fmt.write_str(msg),
            Error::Encode(e) => write!(fmt, "Encoding error: {}", e),
            Error::Decode(e) => write!(fmt, "Decoding error: {}", e),
            Error::KeyType => fmt.write_str("Map key must be a string of at most 31 bytes"),
            Error::Length => fmt.write_str("Length required"),
            Error::Trailing => fmt.write_str("Trailing characters in input"),
            Error::UnexpectedHeader(expected, actual) => write!(fmt, "Unexpected header: expected one of ({}), found {}", expected.join(", "), actual),
            Error::Utf8(e) => write!(fmt, "Bytes aren't valid Utf-8: {}", e),
            Error::Unsupported(what) => write!(fmt, "Serializing {} is not supported", what),
            Error::Json(e) => write!(fmt, "JSON error: {}", e),
        }
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Error {
        Error::Encode(e)
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Error {
        Error::Decode(e)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(e: std::str::Utf8Error) -> Error {
        Error::Utf8(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Json(e)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Encode(e) => Some(e),
            Error::Decode(e) => Some(e),
            Error::Utf8(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}
