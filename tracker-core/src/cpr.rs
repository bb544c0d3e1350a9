//! Compact Position Reporting bit-level decode.
//!
//! Three pure, side-effect-free entry points — global airborne, global
//! surface (reference-disambiguated), and single-frame relative — each
//! `(lat, lon)` in degrees or an error. None of these read or write
//! aircraft state, a clock, or statistics; pairing windows, reference
//! selection, and range/speed gating are the position updater's job
//! (`crate::position`), not this module's.

use thiserror::Error;

/// Number of latitude zones per hemisphere for airborne format.
const NZ: f64 = 15.0;

/// 2^17, the modulus of a 17-bit CPR coordinate.
const CPR_MAX: f64 = 131_072.0;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum CprError {
    #[error("even/odd halves disagree on longitude zone count")]
    ZoneMismatch,
    #[error("decoded latitude out of range")]
    LatitudeOutOfRange,
    #[error("decoded position more than half a cell from the reference")]
    TooFarFromReference,
}

type CprResult = Result<(f64, f64), CprError>;

fn modulo(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

/// Number of CPR longitude zones at `lat`, for the full-circle (airborne)
/// cell size. Ranges from 1 near the poles to 59 at the equator.
fn nl(lat: f64) -> i32 {
    if lat.abs() >= 87.0 {
        return 1;
    }
    let a = 1.0 - (std::f64::consts::PI / (2.0 * NZ)).cos();
    let b = (lat.to_radians()).cos().powi(2);
    ((2.0 * std::f64::consts::PI) / (1.0 - a / b).acos())
        .floor()
        .max(1.0) as i32
}

/// Global airborne decode from a paired even/odd half-frame. `use_odd`
/// selects which half's latitude becomes the reported one, matching the
/// convention that the more recently received half is authoritative — the
/// caller (the position updater) has already picked this from message
/// timestamps, since pairing-window logic does not belong in CPR math.
pub fn decode_cpr_airborne(
    even_lat17: u32,
    even_lon17: u32,
    odd_lat17: u32,
    odd_lon17: u32,
    use_odd: bool,
) -> CprResult {
    let lat_even_cpr = even_lat17 as f64 / CPR_MAX;
    let lon_even_cpr = even_lon17 as f64 / CPR_MAX;
    let lat_odd_cpr = odd_lat17 as f64 / CPR_MAX;
    let lon_odd_cpr = odd_lon17 as f64 / CPR_MAX;

    let dlat_even = 360.0 / (4.0 * NZ);
    let dlat_odd = 360.0 / (4.0 * NZ - 1.0);

    let j = (59.0 * lat_even_cpr - 60.0 * lat_odd_cpr + 0.5).floor();

    let mut lat_e = dlat_even * (modulo(j, 60.0) + lat_even_cpr);
    let mut lat_o = dlat_odd * (modulo(j, 59.0) + lat_odd_cpr);
    if lat_e >= 270.0 {
        lat_e -= 360.0;
    }
    if lat_o >= 270.0 {
        lat_o -= 360.0;
    }

    if nl(lat_e) != nl(lat_o) {
        return Err(CprError::ZoneMismatch);
    }

    let (lat, lon) = if use_odd {
        let nl_val = nl(lat_o);
        let n_lon = (nl_val - 1).max(1);
        let dlon = 360.0 / n_lon as f64;
        let m =
            (lon_even_cpr * (nl_val - 1) as f64 - lon_odd_cpr * nl_val as f64 + 0.5).floor();
        (lat_o, dlon * (modulo(m, n_lon as f64) + lon_odd_cpr))
    } else {
        let nl_val = nl(lat_e);
        let n_lon = nl_val.max(1);
        let dlon = 360.0 / n_lon as f64;
        let m =
            (lon_even_cpr * (nl_val - 1) as f64 - lon_odd_cpr * nl_val as f64 + 0.5).floor();
        (lat_e, dlon * (modulo(m, n_lon as f64) + lon_even_cpr))
    };

    if !(-90.0..=90.0).contains(&lat) {
        return Err(CprError::LatitudeOutOfRange);
    }
    let lon = if lon >= 180.0 { lon - 360.0 } else { lon };
    Ok((lat, lon))
}

/// Global surface decode. The surface format repeats every 90° of latitude
/// (four times finer than airborne), so the even/odd pair alone leaves a
/// fourfold ambiguity; `ref_lat`/`ref_lon` (accurate to within ~45 NM) pick
/// the correct quadrant.
pub fn decode_cpr_surface(
    ref_lat: f64,
    ref_lon: f64,
    even: (u32, u32),
    odd: (u32, u32),
    use_odd: bool,
) -> CprResult {
    let (even_lat17, even_lon17) = even;
    let (odd_lat17, odd_lon17) = odd;

    let lat_even_cpr = even_lat17 as f64 / CPR_MAX;
    let lon_even_cpr = even_lon17 as f64 / CPR_MAX;
    let lat_odd_cpr = odd_lat17 as f64 / CPR_MAX;
    let lon_odd_cpr = odd_lon17 as f64 / CPR_MAX;

    let dlat_even = 90.0 / 60.0;
    let dlat_odd = 90.0 / 59.0;

    let j = (59.0 * lat_even_cpr - 60.0 * lat_odd_cpr + 0.5).floor();
    let lat_e = dlat_even * (modulo(j, 60.0) + lat_even_cpr);
    let lat_o = dlat_odd * (modulo(j, 59.0) + lat_odd_cpr);

    // Surface latitude repeats every 90 degrees; shift the candidate into
    // the quadrant nearest the reference.
    let place_near_ref = |lat: f64| -> f64 {
        let mut lat = lat;
        while lat - ref_lat > 45.0 {
            lat -= 90.0;
        }
        while lat - ref_lat < -45.0 {
            lat += 90.0;
        }
        lat
    };
    let lat_e = place_near_ref(lat_e);
    let lat_o = place_near_ref(lat_o);

    if nl(lat_e) != nl(lat_o) {
        return Err(CprError::ZoneMismatch);
    }

    let (lat, lon_cpr, nl_val_for_lon) = if use_odd {
        (lat_o, lon_odd_cpr, nl(lat_o) - 1)
    } else {
        (lat_e, lon_even_cpr, nl(lat_e))
    };

    if !(-90.0..=90.0).contains(&lat) {
        return Err(CprError::LatitudeOutOfRange);
    }

    let n_lon = nl_val_for_lon.max(1);
    let dlon = 90.0 / n_lon as f64;
    let m = (ref_lon / dlon).floor() + (modulo(ref_lon, dlon) / dlon - lon_cpr + 0.5).floor();
    let mut lon = dlon * (m + lon_cpr);
    if lon >= 180.0 {
        lon -= 360.0;
    }

    Ok((lat, lon))
}

/// Single-frame decode anchored on a known reference, within half a cell of
/// it. `surface` selects the 90°-repeat cell size instead of the
/// 360°-repeat airborne one.
pub fn decode_cpr_relative(
    ref_lat: f64,
    ref_lon: f64,
    lat17: u32,
    lon17: u32,
    use_odd: bool,
    surface: bool,
) -> CprResult {
    let cpr_lat = lat17 as f64 / CPR_MAX;
    let cpr_lon = lon17 as f64 / CPR_MAX;

    let base = if surface { 90.0 } else { 360.0 };
    let dlat = base / (4.0 * NZ - if use_odd { 1.0 } else { 0.0 });

    let j = (ref_lat / dlat).floor() + (modulo(ref_lat, dlat) / dlat - cpr_lat + 0.5).floor();
    let lat = dlat * (j + cpr_lat);

    if !(-90.0..=90.0).contains(&lat) {
        return Err(CprError::LatitudeOutOfRange);
    }
    if (lat - ref_lat).abs() > dlat / 2.0 {
        return Err(CprError::TooFarFromReference);
    }

    let nl_val = nl(lat);
    let n_lon = if use_odd { nl_val - 1 } else { nl_val }.max(1);
    let dlon = base / n_lon as f64;

    let m = (ref_lon / dlon).floor() + (modulo(ref_lon, dlon) / dlon - cpr_lon + 0.5).floor();
    let mut lon = dlon * (m + cpr_lon);

    if (lon - ref_lon).abs() > dlon / 2.0 {
        return Err(CprError::TooFarFromReference);
    }
    if lon >= 180.0 {
        lon -= 360.0;
    } else if lon < -180.0 {
        lon += 360.0;
    }

    Ok((lat, lon))
}
