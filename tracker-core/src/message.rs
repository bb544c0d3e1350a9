//! The external input record: one decoded Mode S / ADS-B message, plus the
//! back-annotations the tracker writes once it has processed one.
//!
//! Raw bit-level Mode S decoding (frame parsing, CRC, downlink-format
//! dispatch) lives upstream of this crate; a [`Message`] is what that
//! decoder hands the tracker, serialized the same way whether it arrives
//! live or is replayed from a capture.

use serde::{Deserialize, Serialize};

use crate::aircraft::{AddrType, AltitudeSource, HeadingReference, TrackOrHeading};
use crate::validity::SourceRank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltitudeKind {
    Baro,
    Geom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingType {
    MagOrTrue,
    TrackOrHeading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CprType {
    Airborne,
    Surface,
}

/// MCP/FMS-selected intent altitude, heading, and mode annunciations —
/// carried in a sub-record since they arrive together on the same BDS 4,0
/// register.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Intent {
    pub mcp_altitude: Option<i32>,
    pub fms_altitude: Option<i32>,
    pub altitude_source: Option<AltitudeSource>,
    pub heading: Option<f64>,
    pub modes: Option<u8>,
    pub alt_setting: Option<f64>,
}

/// Operational status (BDS 6,5 / DF17 TC 28-31): ADS-B version in use and
/// the heading-reference disambiguation it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OpStatus {
    pub valid: bool,
    pub version: u8,
    pub hrd: Option<HeadingReference>,
    pub tah: Option<TrackOrHeading>,
}

/// One decoded Mode S / ADS-B message. `msgtype == 32` marks a bare Mode
/// A/C reply (no ICAO address, no further fields populated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub addr: u32,
    pub addrtype: AddrType,
    pub source: SourceRank,
    pub sys_timestamp_ms: u64,
    pub signal_level: f64,
    pub msgtype: u8,

    pub squawk_raw: Option<u16>,

    pub altitude_valid: bool,
    pub altitude: i32,
    pub altitude_source: AltitudeKind,

    pub squawk_valid: bool,
    pub squawk: u16,

    pub callsign_valid: bool,
    pub callsign: [u8; 8],

    pub heading_valid: bool,
    pub heading: f64,
    pub heading_type: HeadingType,

    pub ground_speed_valid: bool,
    pub ground_speed: f64,
    pub ias_valid: bool,
    pub ias: f64,
    pub tas_valid: bool,
    pub tas: f64,
    pub mach_valid: bool,
    pub mach: f64,

    pub baro_rate_valid: bool,
    pub baro_rate: i32,
    pub geom_rate_valid: bool,
    pub geom_rate: i32,

    pub track_rate_valid: bool,
    pub track_rate: f64,
    pub roll_valid: bool,
    pub roll: f64,
    pub category_valid: bool,
    pub category: u8,
    pub airground_valid: bool,
    pub on_ground: bool,
    pub geom_delta_valid: bool,
    pub geom_delta: i32,

    pub cpr_valid: bool,
    pub cpr_odd: bool,
    pub cpr_type: CprType,
    pub cpr_lat17: u32,
    pub cpr_lon17: u32,
    pub cpr_nuc: u8,

    pub intent: Option<Intent>,
    pub op_status: Option<OpStatus>,

    /// Written by the tracker once processed.
    pub cpr_decoded: bool,
    pub cpr_relative: bool,
    pub decoded_lat: Option<f64>,
    pub decoded_lon: Option<f64>,
}

impl Message {
    /// A minimal message carrying only identity (useful as a base for
    /// tests and the replay CLI, which fill in the fields they exercise).
    pub fn new(addr: u32, addrtype: AddrType, source: SourceRank, sys_timestamp_ms: u64) -> Self {
        Message {
            addr,
            addrtype,
            source,
            sys_timestamp_ms,
            signal_level: 0.0,
            msgtype: 17,
            squawk_raw: None,
            altitude_valid: false,
            altitude: 0,
            altitude_source: AltitudeKind::Baro,
            squawk_valid: false,
            squawk: 0,
            callsign_valid: false,
            callsign: [0; 8],
            heading_valid: false,
            heading: 0.0,
            heading_type: HeadingType::TrackOrHeading,
            ground_speed_valid: false,
            ground_speed: 0.0,
            ias_valid: false,
            ias: 0.0,
            tas_valid: false,
            tas: 0.0,
            mach_valid: false,
            mach: 0.0,
            baro_rate_valid: false,
            baro_rate: 0,
            geom_rate_valid: false,
            geom_rate: 0,
            track_rate_valid: false,
            track_rate: 0.0,
            roll_valid: false,
            roll: 0.0,
            category_valid: false,
            category: 0,
            airground_valid: false,
            on_ground: false,
            geom_delta_valid: false,
            geom_delta: 0,
            cpr_valid: false,
            cpr_odd: false,
            cpr_type: CprType::Airborne,
            cpr_lat17: 0,
            cpr_lon17: 0,
            cpr_nuc: 0,
            intent: None,
            op_status: None,
            cpr_decoded: false,
            cpr_relative: false,
            decoded_lat: None,
            decoded_lon: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_has_no_fields_valid() {
        let m = Message::new(0x4CA87C, AddrType::AdsbIcao, SourceRank::AdsbValid, 1_000);
        assert!(!m.altitude_valid);
        assert!(!m.cpr_valid);
        assert!(!m.cpr_decoded);
    }

    #[test]
    fn round_trips_through_json() {
        let m = Message::new(1, AddrType::Mlat, SourceRank::Mlat, 42);
        let json = serde_json::to_string(&m).expect("serialize");
        let back: Message = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(m, back);
    }
}
