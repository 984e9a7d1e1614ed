// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed field values and FIT base-type decoding.

use chrono::{DateTime, Utc};

use crate::time_utils::format_utc_rfc3339;

/// A decoded field value.
///
/// Integer widths are collapsed to 64 bits; the base type only matters for
/// wire decoding. `Bytes` carries anything we cannot interpret (array
/// fields, opaque byte fields, unknown base types) so no data is dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    UInt(u64),
    SInt(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Project the value into JSON for the auxiliary mapping.
    ///
    /// Timestamps serialize to ISO 8601 with a `Z` suffix. Non-finite
    /// floats have no JSON representation and map to null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::UInt(v) => serde_json::Value::from(*v),
            FieldValue::SInt(v) => serde_json::Value::from(*v),
            FieldValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Text(s) => serde_json::Value::from(s.clone()),
            FieldValue::Timestamp(t) => serde_json::Value::from(format_utc_rfc3339(*t)),
            FieldValue::Bytes(b) => {
                serde_json::Value::Array(b.iter().map(|v| serde_json::Value::from(*v)).collect())
            }
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::UInt(v) => Some(*v as f64),
            FieldValue::SInt(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

/// One named field of a decoded message.
///
/// `value` is `None` when the wire bytes matched the base type's invalid
/// pattern (the FIT convention for "field present but not measured").
#[derive(Debug, Clone)]
pub struct FitField {
    pub name: String,
    pub value: Option<FieldValue>,
}

/// One decoded data message.
#[derive(Debug, Clone)]
pub struct FitMessage {
    /// Profile name of the message ("record", "file_id", ...), or
    /// `unknown_<n>` for globals outside the profile table.
    pub name: String,
    /// Global message number from the definition.
    pub global: u16,
    pub fields: Vec<FitField>,
}

impl FitMessage {
    /// Look up a present (non-null) field value by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .find_map(|f| f.value.as_ref())
    }
}

/// FIT base types, identified by the low five bits of the definition's
/// base-type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Enum,
    SInt8,
    UInt8,
    SInt16,
    UInt16,
    SInt32,
    UInt32,
    String,
    Float32,
    Float64,
    UInt8z,
    UInt16z,
    UInt32z,
    Byte,
    SInt64,
    UInt64,
    UInt64z,
}

impl BaseType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b & 0x1F {
            0 => Some(BaseType::Enum),
            1 => Some(BaseType::SInt8),
            2 => Some(BaseType::UInt8),
            3 => Some(BaseType::SInt16),
            4 => Some(BaseType::UInt16),
            5 => Some(BaseType::SInt32),
            6 => Some(BaseType::UInt32),
            7 => Some(BaseType::String),
            8 => Some(BaseType::Float32),
            9 => Some(BaseType::Float64),
            10 => Some(BaseType::UInt8z),
            11 => Some(BaseType::UInt16z),
            12 => Some(BaseType::UInt32z),
            13 => Some(BaseType::Byte),
            14 => Some(BaseType::SInt64),
            15 => Some(BaseType::UInt64),
            16 => Some(BaseType::UInt64z),
            _ => None,
        }
    }

    /// Wire size of one element, in bytes.
    pub fn size(&self) -> usize {
        match self {
            BaseType::Enum
            | BaseType::SInt8
            | BaseType::UInt8
            | BaseType::UInt8z
            | BaseType::String
            | BaseType::Byte => 1,
            BaseType::SInt16 | BaseType::UInt16 | BaseType::UInt16z => 2,
            BaseType::SInt32 | BaseType::UInt32 | BaseType::UInt32z | BaseType::Float32 => 4,
            BaseType::SInt64 | BaseType::UInt64 | BaseType::UInt64z | BaseType::Float64 => 8,
        }
    }

    /// Decode a single element, honoring the definition's endianness.
    ///
    /// Returns `None` when the bytes match the base type's invalid
    /// pattern. `bytes` must be exactly `self.size()` long.
    pub fn decode_scalar(&self, bytes: &[u8], big_endian: bool) -> Option<FieldValue> {
        fn u16_of(bytes: &[u8], be: bool) -> u16 {
            let b = [bytes[0], bytes[1]];
            if be {
                u16::from_be_bytes(b)
            } else {
                u16::from_le_bytes(b)
            }
        }
        fn u32_of(bytes: &[u8], be: bool) -> u32 {
            let b = [bytes[0], bytes[1], bytes[2], bytes[3]];
            if be {
                u32::from_be_bytes(b)
            } else {
                u32::from_le_bytes(b)
            }
        }
        fn u64_of(bytes: &[u8], be: bool) -> u64 {
            let mut b = [0u8; 8];
            b.copy_from_slice(bytes);
            if be {
                u64::from_be_bytes(b)
            } else {
                u64::from_le_bytes(b)
            }
        }

        match self {
            BaseType::Enum | BaseType::UInt8 => {
                let v = bytes[0];
                (v != 0xFF).then_some(FieldValue::UInt(v as u64))
            }
            BaseType::UInt8z => {
                let v = bytes[0];
                (v != 0).then_some(FieldValue::UInt(v as u64))
            }
            BaseType::SInt8 => {
                let v = bytes[0] as i8;
                (v != 0x7F).then_some(FieldValue::SInt(v as i64))
            }
            BaseType::UInt16 => {
                let v = u16_of(bytes, big_endian);
                (v != 0xFFFF).then_some(FieldValue::UInt(v as u64))
            }
            BaseType::UInt16z => {
                let v = u16_of(bytes, big_endian);
                (v != 0).then_some(FieldValue::UInt(v as u64))
            }
            BaseType::SInt16 => {
                let v = u16_of(bytes, big_endian) as i16;
                (v != 0x7FFF).then_some(FieldValue::SInt(v as i64))
            }
            BaseType::UInt32 => {
                let v = u32_of(bytes, big_endian);
                (v != 0xFFFF_FFFF).then_some(FieldValue::UInt(v as u64))
            }
            BaseType::UInt32z => {
                let v = u32_of(bytes, big_endian);
                (v != 0).then_some(FieldValue::UInt(v as u64))
            }
            BaseType::SInt32 => {
                let v = u32_of(bytes, big_endian) as i32;
                (v != 0x7FFF_FFFF).then_some(FieldValue::SInt(v as i64))
            }
            BaseType::UInt64 => {
                let v = u64_of(bytes, big_endian);
                (v != u64::MAX).then_some(FieldValue::UInt(v))
            }
            BaseType::UInt64z => {
                let v = u64_of(bytes, big_endian);
                (v != 0).then_some(FieldValue::UInt(v))
            }
            BaseType::SInt64 => {
                let v = u64_of(bytes, big_endian) as i64;
                (v != i64::MAX).then_some(FieldValue::SInt(v))
            }
            BaseType::Float32 => {
                let bits = u32_of(bytes, big_endian);
                let v = f32::from_bits(bits);
                (bits != 0xFFFF_FFFF && !v.is_nan()).then_some(FieldValue::Float(v as f64))
            }
            BaseType::Float64 => {
                let bits = u64_of(bytes, big_endian);
                let v = f64::from_bits(bits);
                (bits != u64::MAX && !v.is_nan()).then_some(FieldValue::Float(v))
            }
            BaseType::Byte => {
                let all_invalid = bytes.iter().all(|b| *b == 0xFF);
                (!all_invalid).then(|| FieldValue::Bytes(bytes.to_vec()))
            }
            // Strings are decoded over the whole field, not per element.
            BaseType::String => Self::decode_string(bytes),
        }
    }

    /// Decode a NUL-terminated string field.
    pub fn decode_string(bytes: &[u8]) -> Option<FieldValue> {
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        if end == 0 {
            return None;
        }
        Some(FieldValue::Text(
            String::from_utf8_lossy(&bytes[..end]).into_owned(),
        ))
    }
}
