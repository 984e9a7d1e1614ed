// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The slice of the FIT profile this application needs: global message
//! names, field names for the messages we interpret, and the scale/offset
//! pairs that turn raw wire integers into engineering units.
//!
//! Fields and globals outside these tables still decode; they surface
//! under synthesized `unknown_<n>` names.

use chrono::{DateTime, TimeZone, Utc};

/// Global message numbers we name.
pub mod mesg_num {
    pub const FILE_ID: u16 = 0;
    pub const SESSION: u16 = 18;
    pub const LAP: u16 = 19;
    pub const RECORD: u16 = 20;
    pub const EVENT: u16 = 21;
    pub const DEVICE_INFO: u16 = 23;
    pub const ACTIVITY: u16 = 34;
    pub const FILE_CREATOR: u16 = 49;
    pub const FIELD_DESCRIPTION: u16 = 206;
    pub const DEVELOPER_DATA_ID: u16 = 207;
}

/// The common timestamp field number, valid in any data message.
pub const TIMESTAMP_FIELD: u8 = 253;

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z).
pub const FIT_EPOCH_OFFSET: i64 = 631_065_600;

/// date_time values below this threshold count seconds since power-on
/// rather than since the FIT epoch and cannot be mapped to wall time.
pub const FIT_MIN_ABSOLUTE_TIMESTAMP: u32 = 0x1000_0000;

/// Convert a FIT date_time (seconds since the FIT epoch) to UTC.
pub fn fit_timestamp(secs: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(FIT_EPOCH_OFFSET + secs as i64, 0)
        .single()
        .expect("FIT timestamp range is always representable")
}

/// Profile name of a global message number.
pub fn message_name(global: u16) -> Option<&'static str> {
    Some(match global {
        mesg_num::FILE_ID => "file_id",
        mesg_num::SESSION => "session",
        mesg_num::LAP => "lap",
        mesg_num::RECORD => "record",
        mesg_num::EVENT => "event",
        mesg_num::DEVICE_INFO => "device_info",
        mesg_num::ACTIVITY => "activity",
        mesg_num::FILE_CREATOR => "file_creator",
        mesg_num::FIELD_DESCRIPTION => "field_description",
        mesg_num::DEVELOPER_DATA_ID => "developer_data_id",
        _ => return None,
    })
}

/// Static profile data for one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    pub name: &'static str,
    /// Raw value is divided by this before offset subtraction.
    pub scale: Option<f64>,
    pub offset: Option<f64>,
    /// date_time field (seconds since the FIT epoch on the wire).
    pub is_timestamp: bool,
}

impl FieldInfo {
    const fn plain(name: &'static str) -> Self {
        Self {
            name,
            scale: None,
            offset: None,
            is_timestamp: false,
        }
    }

    const fn scaled(name: &'static str, scale: f64) -> Self {
        Self {
            name,
            scale: Some(scale),
            offset: None,
            is_timestamp: false,
        }
    }

    const fn scaled_offset(name: &'static str, scale: f64, offset: f64) -> Self {
        Self {
            name,
            scale: Some(scale),
            offset: Some(offset),
            is_timestamp: false,
        }
    }

    const fn timestamp(name: &'static str) -> Self {
        Self {
            name,
            scale: None,
            offset: None,
            is_timestamp: true,
        }
    }
}

/// Look up profile data for a field of a given global message.
pub fn field_info(global: u16, field: u8) -> Option<FieldInfo> {
    // 253 is the common timestamp field regardless of message type.
    if field == TIMESTAMP_FIELD {
        return Some(FieldInfo::timestamp("timestamp"));
    }

    let info = match (global, field) {
        (mesg_num::RECORD, 0) => FieldInfo::plain("position_lat"),
        (mesg_num::RECORD, 1) => FieldInfo::plain("position_long"),
        (mesg_num::RECORD, 2) => FieldInfo::scaled_offset("altitude", 5.0, 500.0),
        (mesg_num::RECORD, 3) => FieldInfo::plain("heart_rate"),
        (mesg_num::RECORD, 4) => FieldInfo::plain("cadence"),
        (mesg_num::RECORD, 5) => FieldInfo::scaled("distance", 100.0),
        (mesg_num::RECORD, 6) => FieldInfo::scaled("speed", 1000.0),
        (mesg_num::RECORD, 7) => FieldInfo::plain("power"),
        (mesg_num::RECORD, 9) => FieldInfo::scaled("grade", 100.0),
        (mesg_num::RECORD, 10) => FieldInfo::plain("resistance"),
        (mesg_num::RECORD, 13) => FieldInfo::plain("temperature"),
        (mesg_num::RECORD, 29) => FieldInfo::plain("accumulated_power"),
        (mesg_num::RECORD, 30) => FieldInfo::plain("left_right_balance"),
        (mesg_num::RECORD, 31) => FieldInfo::plain("gps_accuracy"),
        (mesg_num::RECORD, 32) => FieldInfo::scaled("vertical_speed", 1000.0),
        (mesg_num::RECORD, 33) => FieldInfo::plain("calories"),
        (mesg_num::RECORD, 39) => FieldInfo::scaled("vertical_oscillation", 10.0),
        (mesg_num::RECORD, 40) => FieldInfo::scaled("stance_time_percent", 100.0),
        (mesg_num::RECORD, 41) => FieldInfo::scaled("stance_time", 10.0),
        (mesg_num::RECORD, 42) => FieldInfo::plain("activity_type"),
        (mesg_num::RECORD, 53) => FieldInfo::scaled("fractional_cadence", 128.0),
        (mesg_num::RECORD, 73) => FieldInfo::scaled("enhanced_speed", 1000.0),
        (mesg_num::RECORD, 78) => FieldInfo::scaled_offset("enhanced_altitude", 5.0, 500.0),
        (mesg_num::RECORD, 81) => FieldInfo::scaled("battery_soc", 2.0),

        (mesg_num::FILE_ID, 0) => FieldInfo::plain("type"),
        (mesg_num::FILE_ID, 1) => FieldInfo::plain("manufacturer"),
        (mesg_num::FILE_ID, 2) => FieldInfo::plain("product"),
        (mesg_num::FILE_ID, 3) => FieldInfo::plain("serial_number"),
        (mesg_num::FILE_ID, 4) => FieldInfo::timestamp("time_created"),
        (mesg_num::FILE_ID, 5) => FieldInfo::plain("number"),

        (mesg_num::EVENT, 0) => FieldInfo::plain("event"),
        (mesg_num::EVENT, 1) => FieldInfo::plain("event_type"),
        (mesg_num::EVENT, 3) => FieldInfo::plain("data"),
        (mesg_num::EVENT, 4) => FieldInfo::plain("event_group"),

        (mesg_num::FIELD_DESCRIPTION, 0) => FieldInfo::plain("developer_data_index"),
        (mesg_num::FIELD_DESCRIPTION, 1) => FieldInfo::plain("field_definition_number"),
        (mesg_num::FIELD_DESCRIPTION, 2) => FieldInfo::plain("fit_base_type_id"),
        (mesg_num::FIELD_DESCRIPTION, 3) => FieldInfo::plain("field_name"),
        (mesg_num::FIELD_DESCRIPTION, 8) => FieldInfo::plain("units"),
        (mesg_num::FIELD_DESCRIPTION, 14) => FieldInfo::plain("native_mesg_num"),
        (mesg_num::FIELD_DESCRIPTION, 15) => FieldInfo::plain("native_field_num"),

        (mesg_num::DEVELOPER_DATA_ID, 1) => FieldInfo::plain("application_id"),
        (mesg_num::DEVELOPER_DATA_ID, 3) => FieldInfo::plain("developer_data_index"),
        (mesg_num::DEVELOPER_DATA_ID, 4) => FieldInfo::plain("application_version"),

        _ => return None,
    };
    Some(info)
}
