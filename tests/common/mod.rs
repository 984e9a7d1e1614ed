// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::io::Write;
use std::sync::Arc;

use workout_tracker::db::MemoryDb;
use workout_tracker::fit::decoder::crc16;
use workout_tracker::services::UploadService;
use workout_tracker::storage::FileStore;

/// Seconds between the Unix and FIT epochs.
pub const FIT_EPOCH_OFFSET: i64 = 631_065_600;

/// Convert a Unix timestamp to FIT seconds.
#[allow(dead_code)]
pub fn fit_secs(unix: i64) -> u32 {
    (unix - FIT_EPOCH_OFFSET) as u32
}

/// Builds syntactically valid FIT files for tests.
///
/// The builder tracks only the message body; `build` frames it with a
/// 14-byte header and the trailing CRC.
#[derive(Default)]
pub struct FitFileBuilder {
    body: Vec<u8>,
}

#[allow(dead_code)]
impl FitFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a little-endian definition message.
    /// Fields are (number, size, base_type) triples.
    pub fn definition(mut self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> Self {
        self.push_definition(local, global, false, fields, &[]);
        self
    }

    /// Append a big-endian definition message.
    pub fn definition_be(mut self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> Self {
        self.push_definition(local, global, true, fields, &[]);
        self
    }

    /// Append a definition with developer fields
    /// ((field number, size, developer data index) triples).
    pub fn definition_with_dev(
        mut self,
        local: u8,
        global: u16,
        fields: &[(u8, u8, u8)],
        dev_fields: &[(u8, u8, u8)],
    ) -> Self {
        self.push_definition(local, global, false, fields, dev_fields);
        self
    }

    fn push_definition(
        &mut self,
        local: u8,
        global: u16,
        big_endian: bool,
        fields: &[(u8, u8, u8)],
        dev_fields: &[(u8, u8, u8)],
    ) {
        let mut header = 0x40 | (local & 0x0F);
        if !dev_fields.is_empty() {
            header |= 0x20;
        }
        self.body.push(header);
        self.body.push(0); // reserved
        self.body.push(if big_endian { 1 } else { 0 });
        if big_endian {
            self.body.extend_from_slice(&global.to_be_bytes());
        } else {
            self.body.extend_from_slice(&global.to_le_bytes());
        }
        self.body.push(fields.len() as u8);
        for (number, size, base_type) in fields {
            self.body.extend_from_slice(&[*number, *size, *base_type]);
        }
        if !dev_fields.is_empty() {
            self.body.push(dev_fields.len() as u8);
            for (number, size, index) in dev_fields {
                self.body.extend_from_slice(&[*number, *size, *index]);
            }
        }
    }

    /// Append a data message for a local type.
    pub fn data(mut self, local: u8, payload: &[u8]) -> Self {
        self.body.push(local & 0x0F);
        self.body.extend_from_slice(payload);
        self
    }

    /// Append a compressed-timestamp data message (2-bit local type,
    /// 5-bit offset).
    pub fn compressed(mut self, local: u8, offset: u8, payload: &[u8]) -> Self {
        self.body.push(0x80 | ((local & 0x03) << 5) | (offset & 0x1F));
        self.body.extend_from_slice(payload);
        self
    }

    /// Append raw bytes to the body (for malformed-structure tests).
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    /// Frame the body into a complete file.
    pub fn build(self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.body.len() + 16);
        buf.push(14); // header size
        buf.push(0x20); // protocol version
        buf.extend_from_slice(&2194u16.to_le_bytes()); // profile version
        buf.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        buf.extend_from_slice(b".FIT");
        let header_crc = crc16(&buf[..12]);
        buf.extend_from_slice(&header_crc.to_le_bytes());
        buf.extend_from_slice(&self.body);
        let crc = crc16(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());
        buf
    }

    /// Frame the body but corrupt the trailing CRC.
    pub fn build_with_bad_crc(self) -> Vec<u8> {
        let mut buf = self.build();
        let last = buf.len() - 1;
        buf[last] ^= 0xA5;
        buf
    }
}

/// gzip-wrap bytes the way an uploaded `.fit.gz` would arrive.
#[allow(dead_code)]
pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder =
        flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// A full upload pipeline over a temp dir and an in-memory datastore.
#[allow(dead_code)]
pub struct TestApp {
    pub db: Arc<MemoryDb>,
    pub uploads: UploadService<MemoryDb>,
    // Held so the storage dir outlives the test.
    pub dir: tempfile::TempDir,
}

/// Create a test app with isolated storage.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db = Arc::new(MemoryDb::new());
    let store = FileStore::new(dir.path()).expect("create file store");
    let uploads = UploadService::new(store, Arc::clone(&db));
    TestApp { db, uploads, dir }
}
