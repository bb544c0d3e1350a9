//! Position validator (NUC selection, range/speed gates) and updater
//! (global-then-local CPR resolution) — Components E and F.

use tracing::{debug, trace, warn};

use crate::aircraft::Aircraft;
use crate::clock::{abs_diff, Millis};
use crate::config::{Stats, TrackerConfig};
use crate::cpr::{decode_cpr_airborne, decode_cpr_relative, decode_cpr_surface};
use crate::geodesy::great_circle_m;
use crate::message::{CprType, Message};
use crate::validity::{combine, SourceRank};

const KT_TO_MPS: f64 = 1852.0 / 3600.0;

/// The three non-fatal outcome kinds a CPR resolution attempt can produce.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CprOutcome {
    Ok(f64, f64, u8),
    Bad,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LocalOutcome {
    Ok(f64, f64, u8),
    GiveUp,
}

/// Whether a candidate position is within `max_range_m` of the declared
/// user location. Always passes if no user location/range is configured.
fn range_gate(lat: f64, lon: f64, config: &TrackerConfig) -> bool {
    if !config.user_latlon_valid || config.max_range_m <= 0.0 {
        return true;
    }
    great_circle_m(config.user_lat, config.user_lon, lat, lon) <= config.max_range_m
}

/// `speed_check(a, lat, lon, surface)`: accepts unconditionally if `a` has
/// no prior position; otherwise bounds the implied ground speed between
/// the prior fix and this candidate.
fn speed_check(a: &Aircraft, lat: f64, lon: f64, surface: bool, now: Millis) -> bool {
    if !a.position_valid.is_valid() {
        return true;
    }
    let elapsed = now.saturating_sub(a.position_valid.updated);

    let mut speed_kt = if a.ground_speed_valid.is_valid() {
        a.ground_speed
    } else if a.tas_valid.is_valid() {
        a.tas * 4.0 / 3.0
    } else if a.ias_valid.is_valid() {
        a.ias * 2.0
    } else if surface {
        100.0
    } else {
        600.0
    };
    speed_kt *= 4.0 / 3.0;
    speed_kt = if surface {
        speed_kt.clamp(20.0, 150.0)
    } else {
        speed_kt.max(200.0)
    };

    let base_m = if surface { 100.0 } else { 500.0 };
    let allowed = base_m + (elapsed as f64 + 1000.0) / 1000.0 * speed_kt * KT_TO_MPS;

    let dist = great_circle_m(a.position.lat, a.position.lon, lat, lon);
    dist <= allowed
}

fn do_global_cpr(
    a: &Aircraft,
    m: &Message,
    config: &TrackerConfig,
    stats: &mut Stats,
    now: Millis,
) -> CprOutcome {
    let surface = a.cpr_even.surface;
    let use_odd = a.cpr_odd_valid.updated >= a.cpr_even_valid.updated;

    let decoded = if surface {
        let (ref_lat, ref_lon) = if a.position_valid.is_valid() {
            (a.position.lat, a.position.lon)
        } else if config.user_latlon_valid {
            (config.user_lat, config.user_lon)
        } else {
            stats.cpr_global_skipped += 1;
            return CprOutcome::Skip;
        };
        decode_cpr_surface(
            ref_lat,
            ref_lon,
            (a.cpr_even.lat17, a.cpr_even.lon17),
            (a.cpr_odd.lat17, a.cpr_odd.lon17),
            use_odd,
        )
    } else {
        decode_cpr_airborne(
            a.cpr_even.lat17,
            a.cpr_even.lon17,
            a.cpr_odd.lat17,
            a.cpr_odd.lon17,
            use_odd,
        )
    };

    let (lat, lon) = match decoded {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "global CPR primitive failed");
            stats.cpr_global_skipped += 1;
            return CprOutcome::Skip;
        }
    };

    let nuc = a.cpr_even.nuc.min(a.cpr_odd.nuc);
    let nuc = if a.position_valid.is_valid() {
        nuc.min(a.position.pos_nuc)
    } else {
        nuc
    };

    stats.cpr_global_range_checks += 1;
    if !range_gate(lat, lon, config) {
        warn!(lat, lon, "global CPR fix rejected by range gate");
        stats.cpr_global_bad += 1;
        return CprOutcome::Bad;
    }

    if m.source != SourceRank::Mlat
        && a.position_valid.is_valid()
        && a.position.pos_nuc >= nuc
    {
        stats.cpr_global_speed_checks += 1;
        if !speed_check(a, lat, lon, surface, now) {
            warn!(lat, lon, "global CPR fix rejected by speed gate");
            stats.cpr_global_bad += 1;
            return CprOutcome::Bad;
        }
    }

    stats.cpr_global_ok += 1;
    if surface {
        stats.cpr_surface += 1;
    } else {
        stats.cpr_airborne += 1;
    }
    CprOutcome::Ok(lat, lon, nuc)
}

fn do_local_cpr(
    a: &Aircraft,
    m: &Message,
    config: &TrackerConfig,
    stats: &mut Stats,
    now: Millis,
) -> LocalOutcome {
    let surface = m.cpr_type == CprType::Surface;

    let mut nuc = m.cpr_nuc;
    if a.position_valid.is_valid() {
        nuc = nuc.min(a.position.pos_nuc);
    }

    let (ref_lat, ref_lon, range_limit) = if a.position_valid.is_valid() {
        (a.position.lat, a.position.lon, 50_000.0)
    } else if !surface && config.user_latlon_valid {
        let max_range = config.max_range_m;
        if max_range <= 0.0 || max_range >= 1852.0 * 360.0 {
            stats.cpr_local_skipped += 1;
            return LocalOutcome::GiveUp;
        }
        let range_limit = if max_range <= 1852.0 * 180.0 {
            max_range
        } else {
            1852.0 * 360.0 - max_range
        };
        (config.user_lat, config.user_lon, range_limit)
    } else {
        stats.cpr_local_skipped += 1;
        return LocalOutcome::GiveUp;
    };

    let (lat, lon) = match decode_cpr_relative(ref_lat, ref_lon, m.cpr_lat17, m.cpr_lon17, m.cpr_odd, surface) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "local CPR primitive failed");
            stats.cpr_local_skipped += 1;
            return LocalOutcome::GiveUp;
        }
    };

    if range_limit > 0.0 {
        stats.cpr_local_range_checks += 1;
        if great_circle_m(ref_lat, ref_lon, lat, lon) > range_limit {
            stats.cpr_local_skipped += 1;
            return LocalOutcome::GiveUp;
        }
    }

    if a.position_valid.is_valid() && a.position.pos_nuc >= nuc {
        stats.cpr_local_speed_checks += 1;
        if !speed_check(a, lat, lon, surface, now) {
            stats.cpr_local_skipped += 1;
            return LocalOutcome::GiveUp;
        }
    }

    stats.cpr_local_ok += 1;
    if surface {
        stats.cpr_surface += 1;
    } else {
        stats.cpr_airborne += 1;
    }
    LocalOutcome::Ok(lat, lon, nuc)
}

fn commit(a: &mut Aircraft, m: &mut Message, config: &TrackerConfig, stats: &mut Stats, lat: f64, lon: f64, nuc: u8) {
    a.position.lat = lat;
    a.position.lon = lon;
    a.position.pos_nuc = nuc;
    m.decoded_lat = Some(lat);
    m.decoded_lon = Some(lon);
    m.cpr_decoded = true;

    if config.stats_range_histo && config.user_latlon_valid && config.max_range_m > 0.0 {
        let range = great_circle_m(config.user_lat, config.user_lon, lat, lon);
        stats.record_range(range, config.max_range_m);
    }
}

/// Entry point for §4.F: called by the message ingester whenever a message
/// carried a CPR half-frame and the half has just been accepted onto `a`.
pub fn update_position(a: &mut Aircraft, m: &mut Message, config: &TrackerConfig, stats: &mut Stats, now: Millis) {
    let surface = m.cpr_type == CprType::Surface;
    let max_elapsed: Millis = if surface {
        if a.ground_speed_valid.is_valid() && a.ground_speed <= 25.0 {
            50_000
        } else {
            25_000
        }
    } else {
        10_000
    };

    let global_eligible = a.cpr_even_valid.is_valid()
        && a.cpr_odd_valid.is_valid()
        && a.cpr_even_valid.source == a.cpr_odd_valid.source
        && a.cpr_even.surface == a.cpr_odd.surface
        && abs_diff(a.cpr_even_valid.updated, a.cpr_odd_valid.updated) <= max_elapsed;

    let global_result = if global_eligible {
        do_global_cpr(a, m, config, stats, now)
    } else {
        CprOutcome::Skip
    };

    match global_result {
        CprOutcome::Ok(lat, lon, nuc) => {
            a.position_valid = combine(a.cpr_even_valid, a.cpr_odd_valid);
            commit(a, m, config, stats, lat, lon, nuc);
            return;
        }
        CprOutcome::Bad => {
            a.cpr_even_valid.invalidate();
            a.cpr_odd_valid.invalidate();
            a.position_valid.invalidate();
            return;
        }
        CprOutcome::Skip => {}
    }

    match do_local_cpr(a, m, config, stats, now) {
        LocalOutcome::Ok(lat, lon, nuc) => {
            m.cpr_relative = true;
            a.position_valid = if m.cpr_odd {
                a.cpr_odd_valid
            } else {
                a.cpr_even_valid
            };
            commit(a, m, config, stats, lat, lon, nuc);
        }
        LocalOutcome::GiveUp => {
            trace!(addr = a.addr, "local CPR decode gave up");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::{AddrType, CprHalf};
    use crate::validity::FieldKind;

    fn base_message(odd: bool) -> Message {
        let mut m = Message::new(0x4CA87C, AddrType::AdsbIcao, SourceRank::AdsbValid, 0);
        m.cpr_valid = true;
        m.cpr_odd = odd;
        m.cpr_type = CprType::Airborne;
        m
    }

    #[test]
    fn global_decode_succeeds_with_fresh_paired_halves() {
        let mut a = Aircraft::new(0x4CA87C, AddrType::AdsbIcao);
        a.cpr_even = CprHalf { lat17: 93000, lon17: 51372, nuc: 7, surface: false };
        a.cpr_odd = CprHalf { lat17: 74158, lon17: 50194, nuc: 7, surface: false };
        a.cpr_even_valid.accept(FieldKind::CprEven, SourceRank::AdsbValid, 0);
        a.cpr_odd_valid.accept(FieldKind::CprOdd, SourceRank::AdsbValid, 1_000);

        let config = TrackerConfig::new();
        let mut stats = Stats::new();
        let mut m = base_message(true);
        update_position(&mut a, &mut m, &config, &mut stats, 1_000);

        assert!(a.position_valid.is_valid());
        assert!((a.position.lat - 52.2572).abs() < 0.01);
        assert_eq!(stats.cpr_global_ok, 1);
        assert!(m.cpr_decoded);
    }

    #[test]
    fn global_decode_skips_without_a_fresh_pair() {
        let mut a = Aircraft::new(0x4CA87C, AddrType::AdsbIcao);
        a.cpr_even = CprHalf { lat17: 93000, lon17: 51372, nuc: 7, surface: false };
        a.cpr_even_valid.accept(FieldKind::CprEven, SourceRank::AdsbValid, 0);
        // No odd half at all: global_eligible is false, local fallback has
        // no reference and no user location either, so it gives up too.
        let config = TrackerConfig::new();
        let mut stats = Stats::new();
        let mut m = base_message(false);
        m.cpr_lat17 = 93000;
        m.cpr_lon17 = 51372;
        update_position(&mut a, &mut m, &config, &mut stats, 0);

        assert!(!a.position_valid.is_valid());
        assert_eq!(stats.cpr_global_ok, 0);
    }

    #[test]
    fn range_gate_rejects_a_fix_far_from_user() {
        let config = TrackerConfig::new().with_user_location(0.0, 0.0, 10_000.0);
        assert!(!range_gate(52.25, 3.92, &config));
        assert!(range_gate(0.0, 0.0001, &config));
    }

    #[test]
    fn speed_gate_accepts_unconditionally_with_no_prior_position() {
        let a = Aircraft::new(1, AddrType::AdsbIcao);
        assert!(speed_check(&a, 52.0, 3.0, false, 1_000));
    }

    #[test]
    fn speed_gate_rejects_an_implausible_jump() {
        let mut a = Aircraft::new(1, AddrType::AdsbIcao);
        a.position.lat = 0.0;
        a.position.lon = 0.0;
        a.position.pos_nuc = 7;
        a.position_valid.accept(FieldKind::Position, SourceRank::AdsbValid, 0);
        // 10 degrees away (>1000 km) one second later is not a plausible hop.
        assert!(!speed_check(&a, 10.0, 0.0, false, 1_000));
    }

    #[test]
    fn bad_global_fix_invalidates_cpr_halves_and_position_but_keeps_value() {
        let mut a = Aircraft::new(0x4CA87C, AddrType::AdsbIcao);
        a.cpr_even = CprHalf { lat17: 93000, lon17: 51372, nuc: 7, surface: false };
        a.cpr_odd = CprHalf { lat17: 74158, lon17: 50194, nuc: 7, surface: false };
        a.cpr_even_valid.accept(FieldKind::CprEven, SourceRank::AdsbValid, 0);
        a.cpr_odd_valid.accept(FieldKind::CprOdd, SourceRank::AdsbValid, 1_000);

        // User is declared on the other side of the planet from the true fix.
        let config = TrackerConfig::new().with_user_location(-40.0, -170.0, 1_000.0);
        let mut stats = Stats::new();
        let mut m = base_message(true);
        update_position(&mut a, &mut m, &config, &mut stats, 1_000);

        assert!(!a.cpr_even_valid.is_valid());
        assert!(!a.cpr_odd_valid.is_valid());
        assert!(!a.position_valid.is_valid());
        assert_eq!(stats.cpr_global_bad, 1);
    }
}
