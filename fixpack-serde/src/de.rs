use serde::Deserialize;
use serde::de::{self, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess, Visitor};
use fixpack::{header, DecodeError, Header};
use serde::de::value::{BorrowedBytesDeserializer, BorrowedStrDeserializer};
use std::str::from_utf8;

use crate::error::{DeserializationError, Error, Result};

pub struct Deserializer<'de> {
    input: &'de [u8],
    pos: usize,
}

impl<'de> Deserializer<'de> {
    pub fn from_bytes(input: &'de [u8]) -> Self {
        Deserializer { input, pos: 0 }
    }
}

pub fn from_bytes<'a, T: Deserialize<'a>>(s: &'a [u8]) -> std::result::Result<T, DeserializationError> {
    let mut deserializer = Deserializer::from_bytes(s);
    let t = T::deserialize(&mut deserializer).map_err(|e| e.at(deserializer.pos))?;
    if deserializer.input[deserializer.pos..].is_empty() {
        Ok(t)
    } else {
        Err(Error::Trailing.at(deserializer.pos))
    }
}

impl<'de> Deserializer<'de> {

    fn decode_header(&mut self) -> Result<Header> {
        let (header, c) = Header::decode(&self.input[self.pos..])?;
        self.pos += c;
        Ok(header)
    }

    fn peek_header(&self) -> Result<Header> {
        Ok(Header::decode(&self.input[self.pos..])?.0)
    }

    #[inline]
    fn decode_slice(&mut self, len: usize) -> Result<&'de [u8]> {
        let remaining = self.input.len() - self.pos;
        if remaining < len {
            Err(Error::Decode(DecodeError::Truncated(len - remaining)))
        } else {
            self.pos += len;
            Ok(&self.input[self.pos - len..self.pos])
        }
    }

    fn decode_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut tmp = [0u8; N];
        tmp.copy_from_slice(self.decode_slice(N)?);
        Ok(tmp)
    }

    fn decode_str(&mut self, len: usize) -> Result<&'de str> {
        Ok(from_utf8(self.decode_slice(len)?)?)
    }

    /// Map keys have to be fixstr, anything else is rejected before it gets decoded
    fn decode_key(&mut self) -> Result<&'de [u8]> {
        match self.input.get(self.pos) {
            Some(&lead) if header::is_fixstr(lead) => match self.decode_header()? {
                Header::Str(len) => self.decode_slice(len),
                other            => Err(Error::Decode(DecodeError::InvalidMapKey(other.name()))),
            },
            Some(&lead) => {
                let found = Header::name_of(lead).unwrap_or("unsupported tag");
                Err(Error::Decode(DecodeError::InvalidMapKey(found)))
            },
            None => Err(Error::Decode(DecodeError::Truncated(1))),
        }
    }

}

impl<'de, 'a> de::Deserializer<'de> for &'a mut Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.decode_header()? {
            Header::Nil        => visitor.visit_unit(),
            Header::True       => visitor.visit_bool(true),
            Header::False      => visitor.visit_bool(false),
            Header::F32        => visitor.visit_f32(f32::from_be_bytes(self.decode_array()?)),
            Header::F64        => visitor.visit_f64(f64::from_be_bytes(self.decode_array()?)),
            Header::UInt(_, v) => visitor.visit_u64(v),
            Header::Int(_, v)  => visitor.visit_i64(v),
            Header::Str(len)   => {
                let bytes = self.decode_slice(len)?;
                match from_utf8(bytes) {
                    Ok(v)  => visitor.visit_borrowed_str(v),
                    Err(_) => visitor.visit_borrowed_bytes(bytes),
                }
            },
            Header::Arr(len)   => visitor.visit_seq(SeqDeserializer::new(self, len)),
            Header::Map(len)   => visitor.visit_map(MapDeserializer::new(self, len)),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.peek_header()? {
            Header::Nil => {
                self.pos += 1;
                visitor.visit_none()
            },
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(self, _name: &'static str, _variants: &'static [&'static str], visitor: V) -> Result<V::Value> {
        match self.decode_header()? {
            Header::Str(len) => {
                let s = self.decode_str(len)?;
                visitor.visit_enum(s.into_deserializer())
            },
            Header::Map(1) => {
                let variant = from_utf8(self.decode_key()?)?;
                visitor.visit_enum(EnumDeserializer::new(self, variant))
            },
            o => Err(Error::UnexpectedHeader(&["Str", "Map"], o.name())),
        }
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }

}

struct MapDeserializer<'a, 'de: 'a> {
    de: &'a mut Deserializer<'de>,
    remaining: usize,
}

impl<'a, 'de> MapDeserializer<'a, 'de> {
    fn new(de: &'a mut Deserializer<'de>, remaining: usize) -> Self {
        Self { de, remaining }
    }
}

impl<'de, 'a> MapAccess<'de> for MapDeserializer<'a, 'de> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if self.remaining == 0 {
            Ok(None)
        } else {
            self.remaining -= 1;
            let key = self.de.decode_key()?;
            match from_utf8(key) {
                Ok(key) => seed.deserialize(BorrowedStrDeserializer::<Error>::new(key)).map(Some),
                Err(_)  => seed.deserialize(BorrowedBytesDeserializer::<Error>::new(key)).map(Some),
            }
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(&mut *self.de)
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

struct EnumDeserializer<'a, 'de: 'a> {
    de: &'a mut Deserializer<'de>,
    variant: &'de str,
}

impl<'a, 'de> EnumDeserializer<'a, 'de> {
    fn new(de: &'a mut Deserializer<'de>, variant: &'de str) -> Self {
        Self { de, variant }
    }
}

impl<'de, 'a> EnumAccess<'de> for EnumDeserializer<'a, 'de> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let variant = seed.deserialize(BorrowedStrDeserializer::<Error>::new(self.variant))?;
        Ok((variant, self))
    }
}

impl<'de, 'a> VariantAccess<'de> for EnumDeserializer<'a, 'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.de.decode_header()? {
            Header::Nil => Ok(()),
            o => Err(Error::UnexpectedHeader(&["Nil"], o.name())),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(self.de, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_map(self.de, visitor)
    }

}

struct SeqDeserializer<'a, 'de: 'a> {
    de: &'a mut Deserializer<'de>,
    remaining: usize,
}

impl<'a, 'de> SeqDeserializer<'a, 'de> {
    fn new(de: &'a mut Deserializer<'de>, remaining: usize) -> Self {
        Self { de, remaining }
    }
}

impl<'de, 'a> SeqAccess<'de> for SeqDeserializer<'a, 'de> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        if self.remaining == 0 {
            Ok(None)
        } else {
            self.remaining -= 1;
            seed.deserialize(&mut *self.de).map(Some)
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}
