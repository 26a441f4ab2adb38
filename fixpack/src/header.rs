//! The type-tag table. Every MessagePack value starts with a lead byte which either is an exact
//! marker (`nil`, `true`, `float64`, `uint16`, ...) or belongs to one of the "fix" families whose
//! high bits identify the family while the low bits carry a small payload: the value itself for
//! fixints, the length for fixstr, fixarray and fixmap.
//!
//! The family ranges are disjoint, but the masks are of different lengths, so classification has
//! to follow a fixed order: exact markers first, then the wide numeric tags, then the fix ranges.

use crate::error::{DecodeError, EncodeError};
use std::io::Write;

pub const FIXINT_POS: u8 = 0x00;
pub const FIXMAP: u8     = 0x80;
pub const FIXARRAY: u8   = 0x90;
pub const FIXSTR: u8     = 0xa0;
pub const NIL: u8        = 0xc0;
pub const FALSE: u8      = 0xc2;
pub const TRUE: u8       = 0xc3;
pub const FLOAT32: u8    = 0xca;
pub const FLOAT64: u8    = 0xcb;
pub const UINT8: u8      = 0xcc;
pub const UINT16: u8     = 0xcd;
pub const UINT32: u8     = 0xce;
pub const UINT64: u8     = 0xcf;
pub const INT8: u8       = 0xd0;
pub const INT16: u8      = 0xd1;
pub const INT32: u8      = 0xd2;
pub const INT64: u8      = 0xd3;
pub const FIXINT_NEG: u8 = 0xe0;

/// Longest string representable as fixstr
pub const MAX_FIXSTR: usize = 31;
/// Largest fixarray or fixmap
pub const MAX_FIXCONTAINER: usize = 15;

// high bits identifying the fix families
const MASK_FIXINT_POS: u8 = 0x80;
const MASK_FIXINT_NEG: u8 = 0xe0;
const MASK_FIXSTR: u8 = 0xe0;
const MASK_FIXCONTAINER: u8 = 0xf0;

#[inline] pub const fn is_nil(b: u8) -> bool { b == NIL }
#[inline] pub const fn is_true(b: u8) -> bool { b == TRUE }
#[inline] pub const fn is_false(b: u8) -> bool { b == FALSE }
#[inline] pub const fn is_float32(b: u8) -> bool { b == FLOAT32 }
#[inline] pub const fn is_float64(b: u8) -> bool { b == FLOAT64 }
#[inline] pub const fn is_uint8(b: u8) -> bool { b == UINT8 }
#[inline] pub const fn is_uint16(b: u8) -> bool { b == UINT16 }
#[inline] pub const fn is_uint32(b: u8) -> bool { b == UINT32 }
#[inline] pub const fn is_uint64(b: u8) -> bool { b == UINT64 }
#[inline] pub const fn is_int8(b: u8) -> bool { b == INT8 }
#[inline] pub const fn is_int16(b: u8) -> bool { b == INT16 }
#[inline] pub const fn is_int32(b: u8) -> bool { b == INT32 }
#[inline] pub const fn is_int64(b: u8) -> bool { b == INT64 }
#[inline] pub const fn is_fixstr(b: u8) -> bool { (b & MASK_FIXSTR) == FIXSTR }
#[inline] pub const fn is_fixint_pos(b: u8) -> bool { (b & MASK_FIXINT_POS) == FIXINT_POS }
#[inline] pub const fn is_fixint_neg(b: u8) -> bool { (b & MASK_FIXINT_NEG) == FIXINT_NEG }
#[inline] pub const fn is_fixarray(b: u8) -> bool { (b & MASK_FIXCONTAINER) == FIXARRAY }
#[inline] pub const fn is_fixmap(b: u8) -> bool { (b & MASK_FIXCONTAINER) == FIXMAP }

/// The width class of an integer on wire. `Fix` denotes the fixints which live entirely within the
/// lead byte: seven bits for positive and five bits for negative values.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Width { Fix, W8, W16, W32, W64 }

impl Width {

    /// The narrowest width which holds `v` in the unsigned families
    pub const fn fit_unsigned(v: u64) -> Self {
        if v <= 0x7f {
            Width::Fix
        } else if v <= u8::MAX as u64 {
            Width::W8
        } else if v <= u16::MAX as u64 {
            Width::W16
        } else if v <= u32::MAX as u64 {
            Width::W32
        } else {
            Width::W64
        }
    }

    /// The narrowest width which holds the negative value `v` in the signed families
    pub const fn fit_negative(v: i64) -> Self {
        if v >= -32 {
            Width::Fix
        } else if v >= i8::MIN as i64 {
            Width::W8
        } else if v >= i16::MIN as i64 {
            Width::W16
        } else if v >= i32::MIN as i64 {
            Width::W32
        } else {
            Width::W64
        }
    }

}

/// A decoded lead byte. Integers include their payload; for floats and strings the payload follows
/// and is the caller's to read.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Header {
    Nil,
    True,
    False,
    /// The following four bytes contain an IEEE-754 32-bit floating point number
    F32,
    /// The following eight bytes contain an IEEE-754 64-bit floating point number
    F64,
    /// Unsigned integer and the width class it was read with
    UInt(Width, u64),
    /// Signed integer and the width class it was read with
    Int(Width, i64),
    /// The value describes the length in bytes of a following string
    Str(usize),
    /// The value describes the number of elements of the array
    Arr(usize),
    /// The value describes the number of key value pairs of the map
    Map(usize),
}

impl Header {

    /// An unsigned integer header in its narrowest width
    pub const fn uint(v: u64) -> Self {
        Header::UInt(Width::fit_unsigned(v), v)
    }

    /// An integer header in its narrowest width. Non-negative values belong to the unsigned families.
    pub const fn int(v: i64) -> Self {
        if v >= 0 {
            Header::uint(v as u64)
        } else {
            Header::Int(Width::fit_negative(v), v)
        }
    }

    /// Returns the mnemonic of the header. This is useful for error messages.
    pub fn name(&self) -> &'static str {
        match *self {
            Header::Nil       => "Nil",
            Header::True      => "True",
            Header::False     => "False",
            Header::F32       => "F32",
            Header::F64       => "F64",
            Header::UInt(_,_) => "UInt",
            Header::Int(_,_)  => "Int",
            Header::Str(_)    => "Str",
            Header::Arr(_)    => "Arr",
            Header::Map(_)    => "Map",
        }
    }

    /// The mnemonic of the family a lead byte belongs to, without looking at any payload.
    /// `None` if the family is not implemented.
    pub const fn name_of(lead: u8) -> Option<&'static str> {
        match lead {
            x if is_nil(x)                                    => Some("Nil"),
            x if is_true(x)                                   => Some("True"),
            x if is_false(x)                                  => Some("False"),
            x if is_float32(x)                                => Some("F32"),
            x if is_float64(x)                                => Some("F64"),
            x if is_uint8(x) || is_uint16(x) || is_uint32(x) || is_uint64(x) => Some("UInt"),
            x if is_int8(x) || is_int16(x) || is_int32(x) || is_int64(x)     => Some("Int"),
            x if is_fixstr(x)                                 => Some("Str"),
            x if is_fixint_pos(x)                             => Some("UInt"),
            x if is_fixint_neg(x)                             => Some("Int"),
            x if is_fixarray(x)                               => Some("Arr"),
            x if is_fixmap(x)                                 => Some("Map"),
            _                                                 => None,
        }
    }

    /// Returns the number of written bytes. Integers are always written in the narrowest width
    /// that holds them, regardless of the width they carry.
    pub fn encode<W: Write>(&self, w: &mut W) -> Result<usize, EncodeError> {
        match *self {
            Header::Nil               => { w.write_all(&[NIL])?; Ok(1) },
            Header::True              => { w.write_all(&[TRUE])?; Ok(1) },
            Header::False             => { w.write_all(&[FALSE])?; Ok(1) },
            Header::F32               => { w.write_all(&[FLOAT32])?; Ok(1) },
            Header::F64               => { w.write_all(&[FLOAT64])?; Ok(1) },
            Header::UInt(_, v)        => Self::encode_unsigned(v, w),
            Header::Int(_, v) if v >= 0 => Self::encode_unsigned(v as u64, w),
            Header::Int(_, v)         => Self::encode_negative(v, w),
            Header::Str(len)          => Self::encode_fix(FIXSTR, len, MAX_FIXSTR, EncodeError::OversizedString, w),
            Header::Arr(len)          => Self::encode_fix(FIXARRAY, len, MAX_FIXCONTAINER, EncodeError::OversizedContainer, w),
            Header::Map(len)          => Self::encode_fix(FIXMAP, len, MAX_FIXCONTAINER, EncodeError::OversizedContainer, w),
        }
    }

    /// Returns the decoded header and the number of consumed bytes
    pub fn decode<B: ?Sized + AsRef<[u8]>>(buf: &B) -> Result<(Self, usize), DecodeError> {
        let buf = buf.as_ref();
        let lead = *buf.first().ok_or(DecodeError::Truncated(1))?;
        match lead {
            x if is_nil(x)        => Ok((Header::Nil, 1)),
            x if is_true(x)       => Ok((Header::True, 1)),
            x if is_false(x)      => Ok((Header::False, 1)),
            x if is_float32(x)    => Ok((Header::F32, 1)),
            x if is_float64(x)    => Ok((Header::F64, 1)),
            x if is_uint8(x)      => Ok((Header::UInt(Width::W8, u8::from_be_bytes(Self::payload(buf)?) as u64), 2)),
            x if is_uint16(x)     => Ok((Header::UInt(Width::W16, u16::from_be_bytes(Self::payload(buf)?) as u64), 3)),
            x if is_uint32(x)     => Ok((Header::UInt(Width::W32, u32::from_be_bytes(Self::payload(buf)?) as u64), 5)),
            x if is_uint64(x)     => Ok((Header::UInt(Width::W64, u64::from_be_bytes(Self::payload(buf)?)), 9)),
            x if is_int8(x)       => Ok((Header::Int(Width::W8, i8::from_be_bytes(Self::payload(buf)?) as i64), 2)),
            x if is_int16(x)      => Ok((Header::Int(Width::W16, i16::from_be_bytes(Self::payload(buf)?) as i64), 3)),
            x if is_int32(x)      => Ok((Header::Int(Width::W32, i32::from_be_bytes(Self::payload(buf)?) as i64), 5)),
            x if is_int64(x)      => Ok((Header::Int(Width::W64, i64::from_be_bytes(Self::payload(buf)?)), 9)),
            x if is_fixstr(x)     => Ok((Header::Str((x & !MASK_FIXSTR) as usize), 1)),
            x if is_fixint_pos(x) => Ok((Header::UInt(Width::Fix, x as u64), 1)),
            x if is_fixint_neg(x) => Ok((Header::Int(Width::Fix, x as i8 as i64), 1)),
            x if is_fixarray(x)   => Ok((Header::Arr((x & !MASK_FIXCONTAINER) as usize), 1)),
            x if is_fixmap(x)     => Ok((Header::Map((x & !MASK_FIXCONTAINER) as usize), 1)),
            x                     => Err(DecodeError::UnsupportedTag(x)),
        }
    }

    /// Reads the fixed size payload directly following the lead byte
    #[inline]
    fn payload<const N: usize>(buf: &[u8]) -> Result<[u8; N], DecodeError> {
        let rest = &buf[1..];
        if rest.len() < N {
            Err(DecodeError::Truncated(N - rest.len()))
        } else {
            let mut tmp = [0u8; N];
            tmp.copy_from_slice(&rest[..N]);
            Ok(tmp)
        }
    }

    #[inline]
    fn encode_unsigned<W: Write>(v: u64, w: &mut W) -> Result<usize, EncodeError> {
        match Width::fit_unsigned(v) {
            Width::Fix => { w.write_all(&[v as u8])?; Ok(1) },
            Width::W8  => Self::encode_tagged(UINT8, &(v as u8).to_be_bytes(), w),
            Width::W16 => Self::encode_tagged(UINT16, &(v as u16).to_be_bytes(), w),
            Width::W32 => Self::encode_tagged(UINT32, &(v as u32).to_be_bytes(), w),
            Width::W64 => Self::encode_tagged(UINT64, &v.to_be_bytes(), w),
        }
    }

    #[inline]
    fn encode_negative<W: Write>(v: i64, w: &mut W) -> Result<usize, EncodeError> {
        match Width::fit_negative(v) {
            Width::Fix => { w.write_all(&[v as u8])?; Ok(1) },
            Width::W8  => Self::encode_tagged(INT8, &(v as i8).to_be_bytes(), w),
            Width::W16 => Self::encode_tagged(INT16, &(v as i16).to_be_bytes(), w),
            Width::W32 => Self::encode_tagged(INT32, &(v as i32).to_be_bytes(), w),
            Width::W64 => Self::encode_tagged(INT64, &v.to_be_bytes(), w),
        }
    }

    #[inline]
    fn encode_tagged<W: Write>(tag: u8, payload: &[u8], w: &mut W) -> Result<usize, EncodeError> {
        w.write_all(&[tag])?;
        w.write_all(payload)?;
        Ok(1 + payload.len())
    }

    #[inline]
    fn encode_fix<W: Write>(base: u8, len: usize, max: usize, oversized: fn(usize) -> EncodeError, w: &mut W) -> Result<usize, EncodeError> {
        if len > max {
            Err(oversized(len))
        } else {
            w.write_all(&[base | len as u8])?;
            Ok(1)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSUPPORTED: [u8; 19] = [
        0xc1, 0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9,
        0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xdb, 0xdc, 0xdd, 0xde, 0xdf,
    ];

    fn classify(b: u8) -> Vec<&'static str> {
        let predicates: [(&'static str, fn(u8) -> bool); 18] = [
            ("nil", is_nil), ("true", is_true), ("false", is_false),
            ("float32", is_float32), ("float64", is_float64),
            ("uint8", is_uint8), ("uint16", is_uint16), ("uint32", is_uint32), ("uint64", is_uint64),
            ("int8", is_int8), ("int16", is_int16), ("int32", is_int32), ("int64", is_int64),
            ("fixstr", is_fixstr), ("fixint_pos", is_fixint_pos), ("fixint_neg", is_fixint_neg),
            ("fixarray", is_fixarray), ("fixmap", is_fixmap),
        ];
        predicates.iter().filter(|(_, p)| p(b)).map(|(n, _)| *n).collect()
    }

    #[test]
    fn families_are_disjoint() {
        for b in 0..=u8::MAX {
            let families = classify(b);
            if UNSUPPORTED.contains(&b) {
                assert!(families.is_empty(), "0x{:02x} matched {:?}", b, families);
            } else {
                assert_eq!(1, families.len(), "0x{:02x} matched {:?}", b, families);
            }
        }
    }

    #[test]
    fn lead_bytes() {
        let mut src = [0u8; 9];
        for l in 0..=u8::MAX {
            src[0] = l;
            match Header::decode(&src) {
                Ok(_) => assert!(!UNSUPPORTED.contains(&l)),
                Err(e) => assert_eq!(DecodeError::UnsupportedTag(l), e),
            }
        }
    }

    #[test]
    fn fix_ranges() {
        assert_eq!((Header::UInt(Width::Fix, 0x7f), 1), Header::decode(&[0x7f]).unwrap());
        assert_eq!((Header::Map(15), 1), Header::decode(&[0x8f]).unwrap());
        assert_eq!((Header::Arr(0), 1), Header::decode(&[0x90]).unwrap());
        assert_eq!((Header::Str(31), 1), Header::decode(&[0xbf]).unwrap());
        assert_eq!((Header::Int(Width::Fix, -32), 1), Header::decode(&[0xe0]).unwrap());
        assert_eq!((Header::Int(Width::Fix, -1), 1), Header::decode(&[0xff]).unwrap());
    }

    #[test]
    fn exact_widths() {
        assert_eq!((Header::UInt(Width::W16, 5), 3), Header::decode(&[0xcd, 0x00, 0x05]).unwrap());
        assert_eq!((Header::UInt(Width::W64, 5), 9), Header::decode(&[0xcf, 0, 0, 0, 0, 0, 0, 0, 5]).unwrap());
        assert_eq!((Header::Int(Width::W8, 5), 2), Header::decode(&[0xd0, 0x05]).unwrap());
        assert_eq!((Header::Int(Width::W32, -2), 5), Header::decode(&[0xd2, 0xff, 0xff, 0xff, 0xfe]).unwrap());
    }

    #[test]
    fn narrowest_fit() {
        assert_encodes(Header::int(18), &[0x12]);
        assert_encodes(Header::int(-18), &[0xee]);
        assert_encodes(Header::int(-32), &[0xe0]);
        assert_encodes(Header::int(-33), &[0xd0, 0xdf]);
        assert_encodes(Header::int(127), &[0x7f]);
        assert_encodes(Header::int(128), &[0xcc, 0x80]);
        assert_encodes(Header::int(255), &[0xcc, 0xff]);
        assert_encodes(Header::int(256), &[0xcd, 0x01, 0x00]);
        assert_encodes(Header::int(-129), &[0xd1, 0xff, 0x7f]);
        assert_encodes(Header::uint(u32::MAX as u64), &[0xce, 0xff, 0xff, 0xff, 0xff]);
        assert_encodes(Header::uint(u32::MAX as u64 + 1), &[0xcf, 0, 0, 0, 1, 0, 0, 0, 0]);
        assert_encodes(Header::int(i64::MIN), &[0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn width_is_ignored_when_encoding() {
        assert_encodes(Header::UInt(Width::W64, 1), &[0x01]);
        assert_encodes(Header::Int(Width::W8, 5), &[0x05]);
    }

    #[test]
    fn truncated_payload() {
        assert_eq!(Err(DecodeError::Truncated(1)), Header::decode(&[0xcd, 0x01]));
        assert_eq!(Err(DecodeError::Truncated(8)), Header::decode(&[0xd3]));
        assert_eq!(Err(DecodeError::Truncated(1)), Header::decode(&[0u8; 0]));
    }

    #[test]
    fn names_without_payload() {
        assert_eq!(Some("UInt"), Header::name_of(0xcd));
        assert_eq!(Some("Int"), Header::name_of(0xd3));
        assert_eq!(Some("Int"), Header::name_of(0xff));
        assert_eq!(Some("Str"), Header::name_of(0xbf));
        assert_eq!(Some("Map"), Header::name_of(0x8f));
        assert_eq!(None, Header::name_of(0xd9));
        assert_eq!(None, Header::name_of(0xc1));
        for lead in 0..=u8::MAX {
            if let Ok((header, _)) = Header::decode(&[lead, 0, 0, 0, 0, 0, 0, 0, 0]) {
                assert_eq!(Some(header.name()), Header::name_of(lead));
            }
        }
    }

    #[test]
    fn oversized() {
        let mut buf = Vec::new();
        assert!(matches!(Header::Str(32).encode(&mut buf), Err(EncodeError::OversizedString(32))));
        assert!(matches!(Header::Arr(16).encode(&mut buf), Err(EncodeError::OversizedContainer(16))));
        assert!(matches!(Header::Map(16).encode(&mut buf), Err(EncodeError::OversizedContainer(16))));
        assert!(buf.is_empty());
    }

    #[test]
    fn roundtrip_compact() {
        let mut buf = Vec::new();
        assert_roundtrip(Header::Nil, &mut buf);
        assert_roundtrip(Header::True, &mut buf);
        assert_roundtrip(Header::False, &mut buf);
        assert_roundtrip(Header::F32, &mut buf);
        assert_roundtrip(Header::F64, &mut buf);
        for i in 0..16 {
            assert_roundtrip(Header::Arr(i), &mut buf);
            assert_roundtrip(Header::Map(i), &mut buf);
        }
        for i in 0..32 {
            assert_roundtrip(Header::Str(i), &mut buf);
            assert_roundtrip(Header::int(-(i as i64) - 1), &mut buf);
        }
    }

    #[test]
    fn roundtrip_long() {
        let mut buf = Vec::new();
        // large prime step to cover all widths in acceptable time
        for i in (0..u64::MAX).step_by(3_203_431_780_337) {
            assert_roundtrip(Header::uint(i), &mut buf);
            assert_roundtrip(Header::int(-((i >> 1) as i64) - 1), &mut buf);
        }
    }

    fn assert_encodes(header: Header, expected: &[u8]) {
        let mut buf = Vec::new();
        let c = header.encode(&mut buf).unwrap();
        assert_eq!(expected, &buf[..]);
        assert_eq!(expected.len(), c);
    }

    fn assert_roundtrip(value: Header, buf: &mut Vec<u8>) {
        let c = value.encode(buf).unwrap();
        assert_eq!((value, c), Header::decode(buf).unwrap());
        buf.clear();
    }

}
