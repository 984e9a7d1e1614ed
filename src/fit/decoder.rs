// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Binary FIT decoder.
//!
//! `FitDecoder` validates the file frame (header, magic, trailing CRC)
//! eagerly, then yields data messages lazily as an iterator. Any
//! structural problem surfaces as a `DecodeError`; field-level oddities
//! (unknown field numbers, unknown base types, invalid-pattern values)
//! never fail a message — they surface as synthesized names, raw bytes,
//! or absent values.

use std::collections::HashMap;
use std::path::Path;

use crate::fit::profile::{self, FIT_MIN_ABSOLUTE_TIMESTAMP, TIMESTAMP_FIELD};
use crate::fit::types::{BaseType, FieldValue, FitField, FitMessage};

/// Errors for structurally malformed activity files.
///
/// Any of these aborts the whole ingestion: messages yielded before the
/// failure must not be committed.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("file too short to hold a FIT header")]
    TooShort,

    #[error("unsupported FIT header size {0}")]
    UnsupportedHeader(u8),

    #[error("missing .FIT magic in header")]
    BadMagic,

    #[error("file truncated: header declares {declared} data bytes, {available} present")]
    Truncated { declared: usize, available: usize },

    #[error("header checksum mismatch (stored {stored:#06x}, computed {computed:#06x})")]
    HeaderChecksum { stored: u16, computed: u16 },

    #[error("file checksum mismatch (stored {stored:#06x}, computed {computed:#06x})")]
    Checksum { stored: u16, computed: u16 },

    #[error("invalid architecture byte {0} in definition message")]
    InvalidArchitecture(u8),

    #[error("data message references undefined local type {0}")]
    UndefinedLocalType(u8),

    #[error("compressed timestamp before any absolute timestamp")]
    CompressedTimestampWithoutReference,

    #[error("unexpected end of data inside a message")]
    UnexpectedEof,

    #[error("failed to read activity file: {0}")]
    Io(#[from] std::io::Error),
}

/// FIT CRC-16 lookup (4-bit, two rounds per byte).
const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

/// Compute the FIT CRC-16 of a byte slice.
pub fn crc16(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for byte in bytes {
        let mut tmp = CRC_TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc = crc ^ tmp ^ CRC_TABLE[(byte & 0xF) as usize];
        tmp = CRC_TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc = crc ^ tmp ^ CRC_TABLE[((byte >> 4) & 0xF) as usize];
    }
    crc
}

/// One field slot of a definition message.
#[derive(Debug, Clone)]
struct FieldDef {
    number: u8,
    size: usize,
    base_type: Option<BaseType>,
}

/// One developer field slot of a definition message.
#[derive(Debug, Clone)]
struct DevFieldDef {
    number: u8,
    size: usize,
    dev_data_index: u8,
}

/// Active layout for a local message type.
#[derive(Debug, Clone)]
struct Definition {
    global: u16,
    big_endian: bool,
    fields: Vec<FieldDef>,
    dev_fields: Vec<DevFieldDef>,
}

/// Developer field metadata collected from field_description messages.
#[derive(Debug, Clone)]
struct DevFieldInfo {
    name: String,
    base_type: Option<BaseType>,
}

/// Streaming FIT message decoder.
///
/// The message sequence is finite (one pass over the file) and not
/// restartable; re-open the file for another pass.
pub struct FitDecoder {
    buf: Vec<u8>,
    pos: usize,
    end: usize,
    definitions: HashMap<u8, Definition>,
    dev_fields: HashMap<(u8, u8), DevFieldInfo>,
    /// Accumulator for compressed timestamp headers (raw FIT seconds).
    last_timestamp: Option<u32>,
    done: bool,
}

impl FitDecoder {
    /// Open and validate an activity file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DecodeError> {
        let buf = std::fs::read(path.as_ref())?;
        Self::from_bytes(buf)
    }

    /// Validate the file frame and position the decoder at the first
    /// message. The trailing CRC covers header plus data and is checked
    /// here, before any message is yielded.
    pub fn from_bytes(buf: Vec<u8>) -> Result<Self, DecodeError> {
        if buf.len() < 12 {
            return Err(DecodeError::TooShort);
        }
        let header_size = buf[0] as usize;
        if header_size != 12 && header_size != 14 {
            return Err(DecodeError::UnsupportedHeader(buf[0]));
        }
        if buf.len() < header_size {
            return Err(DecodeError::TooShort);
        }
        if &buf[8..12] != b".FIT" {
            return Err(DecodeError::BadMagic);
        }

        let data_size = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
        // Data plus the trailing two-byte CRC must fit.
        if buf.len() < header_size + data_size + 2 {
            return Err(DecodeError::Truncated {
                declared: data_size,
                available: buf.len().saturating_sub(header_size + 2),
            });
        }

        // A 14-byte header carries its own CRC; zero means "not set".
        if header_size == 14 {
            let stored = u16::from_le_bytes([buf[12], buf[13]]);
            if stored != 0 {
                let computed = crc16(&buf[..12]);
                if stored != computed {
                    return Err(DecodeError::HeaderChecksum { stored, computed });
                }
            }
        }

        let end = header_size + data_size;
        let stored = u16::from_le_bytes([buf[end], buf[end + 1]]);
        let computed = crc16(&buf[..end]);
        if stored != computed {
            return Err(DecodeError::Checksum { stored, computed });
        }

        Ok(Self {
            buf,
            pos: header_size,
            end,
            definitions: HashMap::new(),
            dev_fields: HashMap::new(),
            last_timestamp: None,
            done: false,
        })
    }

    fn take(&mut self, n: usize) -> Result<&[u8], DecodeError> {
        if self.pos + n > self.end {
            return Err(DecodeError::UnexpectedEof);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn take_u16(&mut self, big_endian: bool) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        let b = [b[0], b[1]];
        Ok(if big_endian {
            u16::from_be_bytes(b)
        } else {
            u16::from_le_bytes(b)
        })
    }

    /// Parse one record. Definition messages update decoder state and
    /// return `None`; data messages return the decoded message.
    fn read_record(&mut self) -> Result<Option<FitMessage>, DecodeError> {
        let header = self.take_u8()?;

        if header & 0x80 != 0 {
            // Compressed timestamp header: 2-bit local type, 5-bit offset.
            let local = (header >> 5) & 0x03;
            let offset = (header & 0x1F) as u32;
            let last = self
                .last_timestamp
                .ok_or(DecodeError::CompressedTimestampWithoutReference)?;
            let mut rolled = (last & !0x1F) | offset;
            if rolled < last {
                rolled += 0x20;
            }
            let mut message = self.read_data_message(local)?;
            message.fields.push(FitField {
                name: "timestamp".to_string(),
                value: Some(timestamp_value(rolled)),
            });
            self.last_timestamp = Some(rolled);
            return Ok(Some(message));
        }

        if header & 0x40 != 0 {
            self.read_definition_message(header)?;
            return Ok(None);
        }

        let local = header & 0x0F;
        let message = self.read_data_message(local)?;
        Ok(Some(message))
    }

    fn read_definition_message(&mut self, header: u8) -> Result<(), DecodeError> {
        let local = header & 0x0F;
        let has_dev_data = header & 0x20 != 0;

        let _reserved = self.take_u8()?;
        let arch = self.take_u8()?;
        let big_endian = match arch {
            0 => false,
            1 => true,
            other => return Err(DecodeError::InvalidArchitecture(other)),
        };
        let global = self.take_u16(big_endian)?;

        let field_count = self.take_u8()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            let def = self.take(3)?;
            fields.push(FieldDef {
                number: def[0],
                size: def[1] as usize,
                // Unknown base types decode as raw bytes instead of failing.
                base_type: BaseType::from_byte(def[2]),
            });
        }

        let mut dev_fields = Vec::new();
        if has_dev_data {
            let dev_count = self.take_u8()? as usize;
            for _ in 0..dev_count {
                let def = self.take(3)?;
                dev_fields.push(DevFieldDef {
                    number: def[0],
                    size: def[1] as usize,
                    dev_data_index: def[2],
                });
            }
        }

        self.definitions.insert(
            local,
            Definition {
                global,
                big_endian,
                fields,
                dev_fields,
            },
        );
        Ok(())
    }

    fn read_data_message(&mut self, local: u8) -> Result<FitMessage, DecodeError> {
        let def = self
            .definitions
            .get(&local)
            .cloned()
            .ok_or(DecodeError::UndefinedLocalType(local))?;

        let mut fields = Vec::with_capacity(def.fields.len() + def.dev_fields.len());

        for field_def in &def.fields {
            let bytes = self.take(field_def.size)?.to_vec();
            fields.push(decode_field(&def, field_def, &bytes));
            if field_def.number == TIMESTAMP_FIELD {
                if let Some(raw) = raw_timestamp(field_def, &bytes, def.big_endian) {
                    self.last_timestamp = Some(raw);
                }
            }
        }

        for dev_def in &def.dev_fields {
            let bytes = self.take(dev_def.size)?.to_vec();
            fields.push(self.decode_dev_field(&def, dev_def, &bytes));
        }

        let message = FitMessage {
            name: profile::message_name(def.global)
                .map(str::to_string)
                .unwrap_or_else(|| format!("unknown_{}", def.global)),
            global: def.global,
            fields,
        };

        if def.global == profile::mesg_num::FIELD_DESCRIPTION {
            self.register_field_description(&message);
        }

        Ok(message)
    }

    fn decode_dev_field(
        &self,
        def: &Definition,
        dev_def: &DevFieldDef,
        bytes: &[u8],
    ) -> FitField {
        match self.dev_fields.get(&(dev_def.dev_data_index, dev_def.number)) {
            Some(info) => FitField {
                name: info.name.clone(),
                value: decode_field_bytes(info.base_type, bytes, def.big_endian),
            },
            None => FitField {
                // No field_description seen for this index: keep the raw
                // bytes under a synthesized name rather than dropping them.
                name: format!("dev_{}_{}", dev_def.dev_data_index, dev_def.number),
                value: raw_bytes_value(bytes),
            },
        }
    }

    /// Record developer field metadata from a field_description message.
    fn register_field_description(&mut self, message: &FitMessage) {
        let index = match message.field("developer_data_index") {
            Some(FieldValue::UInt(v)) => *v as u8,
            _ => return,
        };
        let number = match message.field("field_definition_number") {
            Some(FieldValue::UInt(v)) => *v as u8,
            _ => return,
        };
        let base_type = match message.field("fit_base_type_id") {
            Some(FieldValue::UInt(v)) => BaseType::from_byte(*v as u8),
            _ => None,
        };
        let name = match message.field("field_name") {
            Some(FieldValue::Text(s)) => s.clone(),
            _ => format!("dev_{}_{}", index, number),
        };

        tracing::debug!(index, number, name = %name, "Registered developer field");
        self.dev_fields
            .insert((index, number), DevFieldInfo { name, base_type });
    }
}

impl Iterator for FitDecoder {
    type Item = Result<FitMessage, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if self.pos >= self.end {
                self.done = true;
                return None;
            }
            match self.read_record() {
                Ok(Some(message)) => return Some(Ok(message)),
                Ok(None) => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Decode one profile field, applying names and scale/offset.
fn decode_field(def: &Definition, field_def: &FieldDef, bytes: &[u8]) -> FitField {
    let info = profile::field_info(def.global, field_def.number);

    let name = match info {
        Some(info) => info.name.to_string(),
        None => format!("unknown_{}", field_def.number),
    };

    let mut value = decode_field_bytes(field_def.base_type, bytes, def.big_endian);

    if let Some(info) = info {
        if info.is_timestamp {
            // date_time on the wire is uint32 seconds since the FIT epoch;
            // values below the threshold are relative and stay numeric.
            if let Some(FieldValue::UInt(secs)) = value {
                value = Some(timestamp_value(secs as u32));
            }
        } else if let Some(scale) = info.scale {
            if let Some(raw) = value.as_ref().and_then(FieldValue::as_f64) {
                value = Some(FieldValue::Float(raw / scale - info.offset.unwrap_or(0.0)));
            }
        }
    }

    FitField { name, value }
}

/// Decode a field's wire bytes against a base type.
fn decode_field_bytes(
    base_type: Option<BaseType>,
    bytes: &[u8],
    big_endian: bool,
) -> Option<FieldValue> {
    let Some(bt) = base_type else {
        return raw_bytes_value(bytes);
    };
    match bt {
        BaseType::String => BaseType::decode_string(bytes),
        BaseType::Byte => raw_bytes_value(bytes),
        _ if bytes.len() == bt.size() => bt.decode_scalar(bytes, big_endian),
        // Array fields (size a multiple of the element size) and
        // mis-sized fields surface raw.
        _ => raw_bytes_value(bytes),
    }
}

/// Raw passthrough; the all-0xFF pattern means "no value".
fn raw_bytes_value(bytes: &[u8]) -> Option<FieldValue> {
    if bytes.iter().all(|b| *b == 0xFF) {
        None
    } else {
        Some(FieldValue::Bytes(bytes.to_vec()))
    }
}

/// Raw seconds of a valid uint32 timestamp field, for the compressed
/// timestamp accumulator.
fn raw_timestamp(field_def: &FieldDef, bytes: &[u8], big_endian: bool) -> Option<u32> {
    if field_def.base_type != Some(BaseType::UInt32) || bytes.len() != 4 {
        return None;
    }
    match BaseType::UInt32.decode_scalar(bytes, big_endian) {
        Some(FieldValue::UInt(v)) => Some(v as u32),
        _ => None,
    }
}

/// Convert raw FIT seconds to a field value; relative (system-time)
/// values below the absolute threshold stay numeric.
fn timestamp_value(secs: u32) -> FieldValue {
    if secs >= FIT_MIN_ABSOLUTE_TIMESTAMP {
        FieldValue::Timestamp(profile::fit_timestamp(secs))
    } else {
        FieldValue::UInt(secs as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc16_known_value() {
        // CRC of the empty slice is zero; appending a valid CRC in
        // little-endian order makes the running CRC zero again.
        assert_eq!(crc16(&[]), 0);
        let data = b"123456789";
        let crc = crc16(data);
        let mut with_crc = data.to_vec();
        with_crc.extend_from_slice(&crc.to_le_bytes());
        assert_eq!(crc16(&with_crc), 0);
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            FitDecoder::from_bytes(vec![0u8; 4]),
            Err(DecodeError::TooShort)
        ));
    }

    #[test]
    fn test_bad_magic() {
        let mut buf = vec![12u8, 0x10, 0x00, 0x00, 0, 0, 0, 0];
        buf.extend_from_slice(b"FIT!");
        buf.extend_from_slice(&[0, 0]);
        assert!(matches!(
            FitDecoder::from_bytes(buf),
            Err(DecodeError::BadMagic)
        ));
    }

    #[test]
    fn test_unsupported_header_size() {
        let mut buf = vec![13u8, 0x10, 0x00, 0x00, 0, 0, 0, 0];
        buf.extend_from_slice(b".FIT");
        buf.extend_from_slice(&[0, 0, 0]);
        assert!(matches!(
            FitDecoder::from_bytes(buf),
            Err(DecodeError::UnsupportedHeader(13))
        ));
    }

    #[test]
    fn test_empty_file_with_valid_crc_yields_nothing() {
        let mut buf = vec![12u8, 0x10, 0x00, 0x00, 0, 0, 0, 0];
        buf.extend_from_slice(b".FIT");
        let crc = crc16(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());

        let decoder = FitDecoder::from_bytes(buf).expect("valid empty file");
        assert_eq!(decoder.count(), 0);
    }

    #[test]
    fn test_file_crc_mismatch() {
        let mut buf = vec![12u8, 0x10, 0x00, 0x00, 0, 0, 0, 0];
        buf.extend_from_slice(b".FIT");
        let crc = crc16(&buf) ^ 0xBEEF;
        buf.extend_from_slice(&crc.to_le_bytes());

        assert!(matches!(
            FitDecoder::from_bytes(buf),
            Err(DecodeError::Checksum { .. })
        ));
    }
}
