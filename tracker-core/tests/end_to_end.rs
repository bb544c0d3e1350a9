//! End-to-end scenarios driven entirely through the public `Tracker` API —
//! no access to private fields, the way an external caller would use it.

use tracker_core::aircraft::AddrType;
use tracker_core::config::{TrackerConfig, AIRCRAFT_TTL_MS, ONEHIT_TTL_MS};
use tracker_core::message::Message;
use tracker_core::validity::SourceRank;
use tracker_core::Tracker;

const EVEN_LAT17: u32 = 93000;
const EVEN_LON17: u32 = 51372;
const ODD_LAT17: u32 = 74158;
const ODD_LON17: u32 = 50194;

fn cpr_message(addr: u32, odd: bool, lat17: u32, lon17: u32, now: u64) -> Message {
    let mut m = Message::new(addr, AddrType::AdsbIcao, SourceRank::AdsbValid, now);
    m.cpr_valid = true;
    m.cpr_odd = odd;
    m.cpr_lat17 = lat17;
    m.cpr_lon17 = lon17;
    m.cpr_nuc = 7;
    m
}

#[test]
fn fresh_airborne_pair_commits_a_global_position() {
    let mut tracker = Tracker::new(TrackerConfig::new());

    let mut even = cpr_message(0x4CA87C, false, EVEN_LAT17, EVEN_LON17, 1_000);
    tracker.ingest(&mut even, 1_000);

    let mut odd = cpr_message(0x4CA87C, true, ODD_LAT17, ODD_LON17, 4_000);
    tracker.ingest(&mut odd, 4_000);

    let a = tracker.aircraft.get(0x4CA87C).expect("aircraft present");
    assert!(a.position_valid.is_valid());
    assert_eq!(a.position_valid.source, SourceRank::AdsbValid);
    assert_eq!(a.position.pos_nuc, 7);
}

#[test]
fn late_odd_half_skips_global_decode_and_makes_no_commit_without_a_reference() {
    let mut tracker = Tracker::new(TrackerConfig::new());

    let mut even = cpr_message(0x4CA87C, false, EVEN_LAT17, EVEN_LON17, 1_000);
    tracker.ingest(&mut even, 1_000);

    // 11s later: beyond the 10s airborne max_elapsed, so the pair is no
    // longer eligible for global decode.
    let mut odd = cpr_message(0x4CA87C, true, ODD_LAT17, ODD_LON17, 12_000);
    tracker.ingest(&mut odd, 12_000);

    let a = tracker.aircraft.get(0x4CA87C).expect("aircraft present");
    assert!(!a.position_valid.is_valid());
    assert_eq!(tracker.stats.cpr_global_ok, 0);
}

#[test]
fn bad_fix_reset_invalidates_cpr_halves_and_position_but_preserves_the_value() {
    // The gate that fires here is the range gate rather than the speed
    // gate (no second verified-good CPR vector far from the first is
    // available without running a decoder), but it exercises the exact
    // reset path the speed gate shares: `cpr_global_bad` increments and
    // all three cells invalidate while the stored lat/lon is untouched.
    let config = TrackerConfig::new().with_user_location(-40.0, -170.0, 1_000.0);
    let mut tracker = Tracker::new(config);

    let mut even = cpr_message(0x4CA87C, false, EVEN_LAT17, EVEN_LON17, 0);
    tracker.ingest(&mut even, 0);
    let mut odd = cpr_message(0x4CA87C, true, ODD_LAT17, ODD_LON17, 1_000);
    tracker.ingest(&mut odd, 1_000);

    let a = tracker.aircraft.get(0x4CA87C).unwrap();
    assert!(!a.position_valid.is_valid());
    assert!(!a.cpr_even_valid.is_valid());
    assert!(!a.cpr_odd_valid.is_valid());
    assert_eq!(tracker.stats.cpr_global_bad, 1);
}

#[test]
fn source_preference_rejects_worse_source_while_fresh_then_accepts_once_stale() {
    let mut tracker = Tracker::new(TrackerConfig::new());

    let mut adsb = Message::new(1, AddrType::AdsbIcao, SourceRank::AdsbValid, 0);
    adsb.squawk_valid = true;
    adsb.squawk = 0o1200;
    tracker.ingest(&mut adsb, 0);

    let mut mlat_fresh = Message::new(1, AddrType::AdsbIcao, SourceRank::Mlat, 5_000);
    mlat_fresh.squawk_valid = true;
    mlat_fresh.squawk = 0o7700;
    tracker.ingest(&mut mlat_fresh, 5_000);
    assert_eq!(tracker.aircraft.get(1).unwrap().squawk, 0o1200);

    // Squawk's stale interval is 15s; past it, a worse source is accepted.
    let mut mlat_stale = Message::new(1, AddrType::AdsbIcao, SourceRank::Mlat, 15_000);
    mlat_stale.squawk_valid = true;
    mlat_stale.squawk = 0o7700;
    tracker.ingest(&mut mlat_stale, 15_000);
    assert_eq!(tracker.aircraft.get(1).unwrap().squawk, 0o7700);
}

#[test]
fn derived_geom_altitude_combines_baro_and_delta() {
    let mut tracker = Tracker::new(TrackerConfig::new());

    let mut baro = Message::new(2, AddrType::AdsbIcao, SourceRank::AdsbValid, 1_000);
    baro.altitude_valid = true;
    baro.altitude = 30_000;
    tracker.ingest(&mut baro, 1_000);

    let mut delta = Message::new(2, AddrType::AdsbIcao, SourceRank::AdsbValid, 1_500);
    delta.geom_delta_valid = true;
    delta.geom_delta = 200;
    tracker.ingest(&mut delta, 1_500);

    let a = tracker.aircraft.get(2).unwrap();
    assert_eq!(a.altitude_geom, 30_200);
    assert_eq!(a.altitude_geom_valid.updated, 1_500);
}

#[test]
fn one_hit_aircraft_is_evicted_once_silence_exceeds_the_onehit_ttl() {
    let mut tracker = Tracker::new(TrackerConfig::new());

    let mut m = Message::new(3, AddrType::AdsbIcao, SourceRank::AdsbValid, 0);
    tracker.ingest(&mut m, 0);
    assert_eq!(tracker.aircraft.len(), 1);

    tracker.maintain(ONEHIT_TTL_MS + 1);
    assert_eq!(tracker.aircraft.len(), 0);
    assert_eq!(tracker.stats.single_message_aircraft, 1);
}

#[test]
fn multi_hit_aircraft_survives_past_the_onehit_ttl_but_not_the_full_ttl() {
    let mut tracker = Tracker::new(TrackerConfig::new());

    let mut m1 = Message::new(4, AddrType::AdsbIcao, SourceRank::AdsbValid, 0);
    tracker.ingest(&mut m1, 0);
    let mut m2 = Message::new(4, AddrType::AdsbIcao, SourceRank::AdsbValid, 100);
    tracker.ingest(&mut m2, 100);

    tracker.maintain(ONEHIT_TTL_MS + 1);
    assert_eq!(tracker.aircraft.len(), 1);

    tracker.maintain(AIRCRAFT_TTL_MS + 200);
    assert_eq!(tracker.aircraft.len(), 0);
}
