//! An encoder and decoder for the subset of MessagePack whose strings and containers fit into the "fix"
//! families: strings of at most 31 bytes, arrays and maps of at most 15 elements. Scalars use the full
//! range of the format: nil, booleans, all integer widths and both float widths.
//!
//! All encoding functions take a value and a writer and return the amount of written bytes. Decoding
//! functions take a buffer and return the value, borrowing strings from the buffer.
//!
//! # Integers
//!
//! The encoder always picks the narrowest representation that holds an integer: `18` becomes the
//! single byte `0x12`, `255` becomes `0xcc 0xff` and `-129` becomes `0xd1 0xff 0x7f`. The decoder in
//! turn reports the width the integer had on wire as a [`Width`], so `0xcd 0x00 0x05` decodes to
//! `Value::UInt(Width::W16, 5)` rather than to a fixint.
//!
//! # A note on Maps
//!
//! The variant `Value::Map` uses a `Vec` of key-value pairs internally because Rust's floating point types
//! `f32` and `f64` implement neither `Ord` nor `Hash` and thus a `Value` cannot be used as a key in any of the
//! standard library maps. Only string keys can be encoded; the decoder rejects anything else and lets the
//! last occurrence of a duplicate key win.
//!
//! # Examples
//!
//! ```
//! use fixpack::*;
//!
//! let value = Value::Map(vec![(Value::from("age"), Value::from(18u64))]);
//! let mut buf = Vec::new();
//! Encoder::encode(&value, &mut buf).unwrap();
//! assert_eq!(buf, [
//!     0x81, // Map of length 1
//!     0xa3, // Str of length 3
//!     0x61, // 'a'
//!     0x67, // 'g'
//!     0x65, // 'e'
//!     0x12, // positive fixint 18
//! ]);
//! let decoded = Decoder::decode_document(&buf).unwrap();
//! assert_eq!(value, decoded);
//! ```

mod error;
pub mod header;
mod value;

pub use value::*;
pub use error::*;
pub use header::{Header, Width};
