//! The per-address tracked state: one [`Aircraft`] record per ICAO address,
//! holding a [`ValidityCell`] next to every field it protects.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::validity::{FieldKind, ValidityCell};

/// Monotonically-improving directness of the source that last reported
/// this aircraft's address. Ordered worst-to-best so `narrow_addrtype` can
/// compare with `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AddrType {
    ModeAc,
    ModeSNoSquitter,
    ModeS,
    AdsbIcaoNt,
    AdsbIcao,
    AdsbOther,
    TisB,
    Adsr,
}

/// Which reference heading `adsb_hrd` resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingReference {
    Magnetic,
    True,
}

/// Which of track or heading `adsb_tah` resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackOrHeading {
    GroundTrack,
    Heading,
}

/// Baro or geometric altitude source for the intent/MCP-FMS preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltitudeSource {
    Mcp,
    Fms,
}

/// One half of a CPR position report: the raw 17-bit lat/lon words, the
/// NUC at the time of receipt, and whether it described a surface or
/// airborne position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CprHalf {
    pub lat17: u32,
    pub lon17: u32,
    pub nuc: u8,
    pub surface: bool,
}

/// The tracker's best current position estimate and its NUC.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    pub pos_nuc: u8,
}

/// Number of RSSI samples kept in the ring buffer.
pub const SIGNAL_RING_LEN: usize = 8;

/// Every field the tracker maintains for one aircraft, each paired with its
/// own [`ValidityCell`]. Field values are meaningless while their cell's
/// `source` is `Invalid` — callers must always check validity before
/// reading.
#[derive(Debug, Clone)]
pub struct Aircraft {
    pub addr: u32,
    pub addrtype: AddrType,
    pub adsb_version: i8,
    pub adsb_hrd: HeadingReference,
    pub adsb_tah: TrackOrHeading,

    pub first_message: Option<crate::message::Message>,
    pub messages: u64,
    pub seen: Millis,

    pub signal_level: [f64; SIGNAL_RING_LEN],
    pub signal_next: usize,

    pub mode_a_hit: bool,
    pub mode_c_hit: bool,

    pub callsign: [u8; 8],
    pub callsign_valid: ValidityCell,

    pub altitude_baro: i32,
    pub altitude_baro_valid: ValidityCell,
    pub altitude_geom: i32,
    pub altitude_geom_valid: ValidityCell,
    pub geom_delta: i32,
    pub geom_delta_valid: ValidityCell,

    pub ground_speed: f64,
    pub ground_speed_valid: ValidityCell,
    pub ias: f64,
    pub ias_valid: ValidityCell,
    pub tas: f64,
    pub tas_valid: ValidityCell,
    pub mach: f64,
    pub mach_valid: ValidityCell,

    pub track: f64,
    pub track_valid: ValidityCell,
    pub track_rate: f64,
    pub track_rate_valid: ValidityCell,
    pub roll: f64,
    pub roll_valid: ValidityCell,
    pub mag_heading: f64,
    pub mag_heading_valid: ValidityCell,
    pub true_heading: f64,
    pub true_heading_valid: ValidityCell,

    pub baro_rate: i32,
    pub baro_rate_valid: ValidityCell,
    pub geom_rate: i32,
    pub geom_rate_valid: ValidityCell,

    pub squawk: u16,
    pub squawk_valid: ValidityCell,
    pub category: u8,
    pub category_valid: ValidityCell,
    pub airground_on_ground: bool,
    pub airground_valid: ValidityCell,
    pub alt_setting: f64,
    pub alt_setting_valid: ValidityCell,

    pub intent_altitude: i32,
    pub intent_altitude_source: AltitudeSource,
    pub intent_altitude_valid: ValidityCell,
    pub intent_heading: f64,
    pub intent_heading_valid: ValidityCell,
    pub intent_modes: u8,
    pub intent_modes_valid: ValidityCell,

    pub cpr_even: CprHalf,
    pub cpr_even_valid: ValidityCell,
    pub cpr_odd: CprHalf,
    pub cpr_odd_valid: ValidityCell,

    pub position: Position,
    pub position_valid: ValidityCell,
}

impl Aircraft {
    /// A freshly-seen aircraft, mirroring `trackCreateAircraft`'s defaults:
    /// everything else zeroed, RSSI ring seeded to a small floor so an
    /// empty ring doesn't read as "very strong signal", `adsb_version`
    /// unset, heading references defaulted to magnetic/ground-track until
    /// an operational status message says otherwise.
    pub fn new(addr: u32, addrtype: AddrType) -> Self {
        Aircraft {
            addr,
            addrtype,
            adsb_version: -1,
            adsb_hrd: HeadingReference::Magnetic,
            adsb_tah: TrackOrHeading::GroundTrack,

            first_message: None,
            messages: 0,
            seen: 0,

            signal_level: [1e-5; SIGNAL_RING_LEN],
            signal_next: 0,

            mode_a_hit: false,
            mode_c_hit: false,

            callsign: [0; 8],
            callsign_valid: ValidityCell::new(),

            altitude_baro: 0,
            altitude_baro_valid: ValidityCell::new(),
            altitude_geom: 0,
            altitude_geom_valid: ValidityCell::new(),
            geom_delta: 0,
            geom_delta_valid: ValidityCell::new(),

            ground_speed: 0.0,
            ground_speed_valid: ValidityCell::new(),
            ias: 0.0,
            ias_valid: ValidityCell::new(),
            tas: 0.0,
            tas_valid: ValidityCell::new(),
            mach: 0.0,
            mach_valid: ValidityCell::new(),

            track: 0.0,
            track_valid: ValidityCell::new(),
            track_rate: 0.0,
            track_rate_valid: ValidityCell::new(),
            roll: 0.0,
            roll_valid: ValidityCell::new(),
            mag_heading: 0.0,
            mag_heading_valid: ValidityCell::new(),
            true_heading: 0.0,
            true_heading_valid: ValidityCell::new(),

            baro_rate: 0,
            baro_rate_valid: ValidityCell::new(),
            geom_rate: 0,
            geom_rate_valid: ValidityCell::new(),

            squawk: 0,
            squawk_valid: ValidityCell::new(),
            category: 0,
            category_valid: ValidityCell::new(),
            airground_on_ground: false,
            airground_valid: ValidityCell::new(),
            alt_setting: 0.0,
            alt_setting_valid: ValidityCell::new(),

            intent_altitude: 0,
            intent_altitude_source: AltitudeSource::Mcp,
            intent_altitude_valid: ValidityCell::new(),
            intent_heading: 0.0,
            intent_heading_valid: ValidityCell::new(),
            intent_modes: 0,
            intent_modes_valid: ValidityCell::new(),

            cpr_even: CprHalf::default(),
            cpr_even_valid: ValidityCell::new(),
            cpr_odd: CprHalf::default(),
            cpr_odd_valid: ValidityCell::new(),

            position: Position::default(),
            position_valid: ValidityCell::new(),
        }
    }

    /// Push a new RSSI sample into the ring, advancing the write cursor.
    pub fn push_signal(&mut self, level: f64) {
        self.signal_level[self.signal_next] = level;
        self.signal_next = (self.signal_next + 1) % SIGNAL_RING_LEN;
    }

    /// Narrow `addrtype` only if `candidate` is strictly more direct than
    /// the one currently recorded.
    pub fn narrow_addrtype(&mut self, candidate: AddrType) {
        if candidate > self.addrtype {
            self.addrtype = candidate;
        }
    }

    /// Whether this aircraft has ever received more than one message —
    /// used by the periodic maintainer's one-hit eviction rule.
    pub fn is_one_hit(&self) -> bool {
        self.messages <= 1
    }

    /// Expire every validity cell in place (value preserved, `source` reset
    /// to `Invalid` for cells whose `expires` has passed). Field order here
    /// doesn't matter: each cell's expiry check is independent.
    pub fn expire_all(&mut self, now: Millis) {
        for cell in self.cells_mut() {
            cell.expire(now);
        }
    }

    fn cells_mut(&mut self) -> [&mut ValidityCell; 25] {
        [
            &mut self.callsign_valid,
            &mut self.altitude_baro_valid,
            &mut self.altitude_geom_valid,
            &mut self.geom_delta_valid,
            &mut self.ground_speed_valid,
            &mut self.ias_valid,
            &mut self.tas_valid,
            &mut self.mach_valid,
            &mut self.track_valid,
            &mut self.track_rate_valid,
            &mut self.roll_valid,
            &mut self.mag_heading_valid,
            &mut self.true_heading_valid,
            &mut self.baro_rate_valid,
            &mut self.geom_rate_valid,
            &mut self.squawk_valid,
            &mut self.category_valid,
            &mut self.airground_valid,
            &mut self.alt_setting_valid,
            &mut self.intent_altitude_valid,
            &mut self.intent_heading_valid,
            &mut self.intent_modes_valid,
            &mut self.cpr_even_valid,
            &mut self.cpr_odd_valid,
            &mut self.position_valid,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validity::SourceRank;

    #[test]
    fn new_aircraft_has_invalid_cells_and_seeded_rssi_ring() {
        let a = Aircraft::new(0xABCDEF, AddrType::AdsbIcao);
        assert!(!a.position_valid.is_valid());
        assert!(!a.callsign_valid.is_valid());
        assert_eq!(a.adsb_version, -1);
        assert_eq!(a.signal_level, [1e-5; SIGNAL_RING_LEN]);
        assert_eq!(a.adsb_hrd, HeadingReference::Magnetic);
        assert_eq!(a.adsb_tah, TrackOrHeading::GroundTrack);
    }

    #[test]
    fn narrow_addrtype_only_moves_forward() {
        let mut a = Aircraft::new(1, AddrType::ModeS);
        a.narrow_addrtype(AddrType::AdsbIcao);
        assert_eq!(a.addrtype, AddrType::AdsbIcao);
        a.narrow_addrtype(AddrType::ModeAc);
        assert_eq!(a.addrtype, AddrType::AdsbIcao);
    }

    #[test]
    fn push_signal_wraps_the_ring() {
        let mut a = Aircraft::new(1, AddrType::AdsbIcao);
        for i in 0..SIGNAL_RING_LEN + 2 {
            a.push_signal(i as f64);
        }
        assert_eq!(a.signal_next, 2);
        assert_eq!(a.signal_level[0], SIGNAL_RING_LEN as f64);
        assert_eq!(a.signal_level[1], SIGNAL_RING_LEN as f64 + 1.0);
    }

    #[test]
    fn one_hit_detection() {
        let mut a = Aircraft::new(1, AddrType::AdsbIcao);
        assert!(a.is_one_hit());
        a.messages = 1;
        assert!(a.is_one_hit());
        a.messages = 2;
        assert!(!a.is_one_hit());
    }

    #[test]
    fn expire_all_invalidates_only_expired_cells() {
        let mut a = Aircraft::new(1, AddrType::AdsbIcao);
        a.squawk_valid.accept(FieldKind::Squawk, SourceRank::AdsbValid, 0);
        a.category_valid
            .accept(FieldKind::Category, SourceRank::AdsbValid, 0);
        a.expire_all(15_000); // squawk (15s stale / 70s expire) not expired yet
        assert!(a.squawk_valid.is_valid());
        a.expire_all(70_000);
        assert!(!a.squawk_valid.is_valid());
        assert!(!a.category_valid.is_valid());
    }
}
