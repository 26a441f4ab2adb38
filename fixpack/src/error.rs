use std::fmt::{Display, Formatter, self};

/// A `DecodeError` together with the input position at which it was raised.
#[derive(Debug, PartialEq)]
pub struct DecoderError {
    inner: DecodeError,
    at: usize,
}

impl DecoderError {
    pub fn into_inner(self) -> DecodeError {
        self.inner
    }

    pub fn inner(&self) -> &DecodeError {
        &self.inner
    }

    /// Offset into the input buffer where decoding stopped.
    pub fn position(&self) -> usize {
        self.at
    }
}

impl std::error::Error for DecoderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
       Some(&self.inner)
    }
}

impl Display for DecoderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} at input position {}", self.inner, self.at)
    }
}

#[derive(Debug, PartialEq)]
pub enum DecodeError {
    /// The input ended although the given number of additional bytes were required
    Truncated(usize),
    /// The lead byte does not belong to any implemented family
    UnsupportedTag(u8),
    /// A map key was something other than a fixstr
    InvalidMapKey(&'static str),
    /// A document must have a map at its root
    NotAMap(&'static str),
    /// The document was followed by this many unread bytes
    Trailing(usize),
}

impl DecodeError {
    pub fn at(self, at: usize) -> DecoderError {
        DecoderError { inner: self, at }
    }
}

impl std::error::Error for DecodeError {}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DecodeError::Truncated(missing) => write!(f, "Unexpected end of buffer, {} more bytes required", missing),
            DecodeError::UnsupportedTag(tag) => write!(f, "Unsupported type tag 0x{:02x}", tag),
            DecodeError::InvalidMapKey(found) => write!(f, "Map key must be a fixstr, found {}", found),
            DecodeError::NotAMap(found) => write!(f, "Document root must be a map, found {}", found),
            DecodeError::Trailing(count) => write!(f, "{} trailing bytes after document", count),
        }
    }
}

#[derive(Debug)]
pub enum EncodeError {
    Io(std::io::Error),
    /// Strings are limited to 31 bytes
    OversizedString(usize),
    /// Arrays and maps are limited to 15 elements
    OversizedContainer(usize),
    /// A map key which is not a string. Carries the type of the offending key.
    Unencodable(&'static str),
}

impl From<std::io::Error> for EncodeError {
    fn from(e: std::io::Error) -> EncodeError {
        EncodeError::Io(e)
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            EncodeError::Io(e) => write!(f, "IO error {}", e),
            EncodeError::OversizedString(len) => write!(f, "String of {} bytes exceeds fixstr maximum of 31", len),
            EncodeError::OversizedContainer(len) => write!(f, "Container of {} elements exceeds maximum of 15", len),
            EncodeError::Unencodable(found) => write!(f, "Cannot encode map key of type {}, keys must be strings", found),
        }
    }
}
