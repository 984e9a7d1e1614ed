// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FIT activity file decoding.
//!
//! A FIT file is a framed binary stream: a small header, a sequence of
//! definition and data messages, and a trailing CRC. Definition messages
//! declare the field layout (and endianness) for a local message type;
//! data messages are decoded against the most recent definition for their
//! local type. The decoder yields data messages as name → value mappings,
//! resolving names through the profile tables and through any
//! `field_description` messages seen in the stream (developer fields).

pub mod decoder;
pub mod profile;
pub mod types;

pub use decoder::{DecodeError, FitDecoder};
pub use types::{FieldValue, FitField, FitMessage};
