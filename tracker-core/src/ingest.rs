//! Message ingester — Component G, the single entry point that turns one
//! decoded [`Message`] into aircraft-table mutations.
//!
//! Per the Design Notes' table-driven redesign, the scalar fields that need
//! nothing but "accept, then copy on success" are not hand-written per-field
//! blocks: [`SCALAR_FIELDS`] is the one static table, and
//! [`apply_scalar_fields`] is the one loop that walks it. The handful of
//! fields needing real logic (baro altitude, squawk, heading routing, intent
//! altitude, derived geometric altitude) are written out as named special
//! cases below the loop.

use tracing::trace;

use crate::aircraft::{AddrType, Aircraft, AltitudeSource, CprHalf, HeadingReference, TrackOrHeading};
use crate::clock::Millis;
use crate::config::{Stats, TrackerConfig};
use crate::message::{HeadingType, Message};
use crate::position::update_position;
use crate::table::AircraftTable;
use crate::validity::{combine, compare, FieldKind, ValidityCell};

/// One entry describes how to accept-and-copy a single scalar field: the
/// tag its [`ValidityCell`] is gated on, how to read the message's valid
/// flag and the cell to gate against, and how to copy the value across once
/// accepted. The value's own type never appears in the descriptor, which is
/// what lets one table hold fields as different as `[u8; 8]` and `f64`.
struct FieldDescriptor {
    kind: FieldKind,
    valid: fn(&Message) -> bool,
    cell: fn(&mut Aircraft) -> &mut ValidityCell,
    copy: fn(&mut Aircraft, &Message),
}

const SCALAR_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        kind: FieldKind::Callsign,
        valid: |m| m.callsign_valid,
        cell: |a| &mut a.callsign_valid,
        copy: |a, m| a.callsign = m.callsign,
    },
    FieldDescriptor {
        kind: FieldKind::GroundSpeed,
        valid: |m| m.ground_speed_valid,
        cell: |a| &mut a.ground_speed_valid,
        copy: |a, m| a.ground_speed = m.ground_speed,
    },
    FieldDescriptor {
        kind: FieldKind::Ias,
        valid: |m| m.ias_valid,
        cell: |a| &mut a.ias_valid,
        copy: |a, m| a.ias = m.ias,
    },
    FieldDescriptor {
        kind: FieldKind::Tas,
        valid: |m| m.tas_valid,
        cell: |a| &mut a.tas_valid,
        copy: |a, m| a.tas = m.tas,
    },
    FieldDescriptor {
        kind: FieldKind::Mach,
        valid: |m| m.mach_valid,
        cell: |a| &mut a.mach_valid,
        copy: |a, m| a.mach = m.mach,
    },
    FieldDescriptor {
        kind: FieldKind::TrackRate,
        valid: |m| m.track_rate_valid,
        cell: |a| &mut a.track_rate_valid,
        copy: |a, m| a.track_rate = m.track_rate,
    },
    FieldDescriptor {
        kind: FieldKind::Roll,
        valid: |m| m.roll_valid,
        cell: |a| &mut a.roll_valid,
        copy: |a, m| a.roll = m.roll,
    },
    FieldDescriptor {
        kind: FieldKind::BaroRate,
        valid: |m| m.baro_rate_valid,
        cell: |a| &mut a.baro_rate_valid,
        copy: |a, m| a.baro_rate = m.baro_rate,
    },
    FieldDescriptor {
        kind: FieldKind::GeomRate,
        valid: |m| m.geom_rate_valid,
        cell: |a| &mut a.geom_rate_valid,
        copy: |a, m| a.geom_rate = m.geom_rate,
    },
    FieldDescriptor {
        kind: FieldKind::Category,
        valid: |m| m.category_valid,
        cell: |a| &mut a.category_valid,
        copy: |a, m| a.category = m.category,
    },
    FieldDescriptor {
        kind: FieldKind::GeomDelta,
        valid: |m| m.geom_delta_valid,
        cell: |a| &mut a.geom_delta_valid,
        copy: |a, m| a.geom_delta = m.geom_delta,
    },
];

/// Walk [`SCALAR_FIELDS`] once, applying the same accept-and-copy rule to
/// every entry. This is the loop the Design Notes call for in place of
/// per-field blocks: the logic lives here exactly once, and adding a field
/// to the table is the only change needed to ingest it.
fn apply_scalar_fields(a: &mut Aircraft, m: &Message, now: Millis) {
    for field in SCALAR_FIELDS {
        if (field.valid)(m) {
            if (field.cell)(a).accept(field.kind, m.source, now) {
                (field.copy)(a, m);
            } else {
                trace!(addr = a.addr, field = ?field.kind, "rejected stale update");
            }
        }
    }
}

/// Mode A/C reply handling (step 1): these carry no ICAO address and are
/// routed straight to the correlation table, never the aircraft table.
pub fn is_mode_ac_reply(m: &Message) -> bool {
    m.msgtype == 32
}

/// `update_from_message`, §4.G. `now` is the message clock — the
/// timestamp carried by `m`, not wall time; every validity decision this
/// call makes reads it, which is what keeps replay deterministic.
pub fn update_from_message(
    table: &mut AircraftTable,
    m: &mut Message,
    config: &TrackerConfig,
    stats: &mut Stats,
    now: Millis,
) {
    let (a, created) = table.find_or_create(m.addr, m.addrtype);

    if created {
        a.first_message = Some(m.clone());
    }

    if m.signal_level > 0.0 {
        a.push_signal(m.signal_level);
    }
    a.seen = now;
    a.messages += 1;

    a.narrow_addrtype(m.addrtype);
    if a.addrtype >= AddrType::AdsbIcaoNt && a.adsb_version < 0 {
        a.adsb_version = 0;
    }

    apply_scalar_fields(a, m, now);

    // Baro altitude: clear mode_c_hit if the rounded 100-ft bucket moved.
    if m.altitude_valid {
        let old_bucket = (a.altitude_baro + 49).div_euclid(100);
        if a.altitude_baro_valid.accept(FieldKind::AltitudeBaro, m.source, now) {
            let new_bucket = (m.altitude + 49).div_euclid(100);
            if a.mode_c_hit && old_bucket != new_bucket {
                a.mode_c_hit = false;
            }
            a.altitude_baro = m.altitude;
        } else {
            trace!(addr = a.addr, "rejected stale altitude update");
        }
    }

    // Squawk: clear mode_a_hit if the value changes.
    if m.squawk_valid {
        let old_squawk = a.squawk;
        if a.squawk_valid.accept(FieldKind::Squawk, m.source, now) {
            if m.squawk != old_squawk {
                a.mode_a_hit = false;
            }
            a.squawk = m.squawk;
        } else {
            trace!(addr = a.addr, "rejected stale squawk update");
        }
    }

    // Air/ground.
    if m.airground_valid {
        if a.airground_valid.accept(FieldKind::AirGround, m.source, now) {
            a.airground_on_ground = m.on_ground;
        } else {
            trace!(addr = a.addr, "rejected stale airground update");
        }
    }

    // Heading: route through adsb_hrd/adsb_tah disambiguation.
    if m.heading_valid {
        match m.heading_type {
            HeadingType::TrackOrHeading => match a.adsb_tah {
                TrackOrHeading::GroundTrack => {
                    if a.track_valid.accept(FieldKind::Track, m.source, now) {
                        a.track = m.heading;
                    }
                }
                TrackOrHeading::Heading => route_heading(a, m, now),
            },
            HeadingType::MagOrTrue => route_heading(a, m, now),
        }
    }

    // Intent altitude: MCP preferred over FMS unless the message says FMS.
    if let Some(intent) = &m.intent {
        let altitude = match intent.altitude_source {
            Some(AltitudeSource::Fms) => intent.fms_altitude.or(intent.mcp_altitude),
            _ => intent.mcp_altitude.or(intent.fms_altitude),
        };
        if let Some(altitude) = altitude {
            if a.intent_altitude_valid.accept(FieldKind::IntentAltitude, m.source, now) {
                a.intent_altitude = altitude;
                a.intent_altitude_source = intent.altitude_source.unwrap_or(AltitudeSource::Mcp);
            }
        }
        if let Some(heading) = intent.heading {
            if a.intent_heading_valid.accept(FieldKind::IntentHeading, m.source, now) {
                a.intent_heading = heading;
            }
        }
        if let Some(modes) = intent.modes {
            if a.intent_modes_valid.accept(FieldKind::IntentModes, m.source, now) {
                a.intent_modes = modes;
            }
        }
        if let Some(alt_setting) = intent.alt_setting {
            if a.alt_setting_valid.accept(FieldKind::AltSetting, m.source, now) {
                a.alt_setting = alt_setting;
            }
        }
    }

    // CPR halves.
    if m.cpr_valid {
        let half = CprHalf {
            lat17: m.cpr_lat17,
            lon17: m.cpr_lon17,
            nuc: m.cpr_nuc,
            surface: m.cpr_type == crate::message::CprType::Surface,
        };
        let accepted = if m.cpr_odd {
            a.cpr_odd_valid.accept(FieldKind::CprOdd, m.source, now)
        } else {
            a.cpr_even_valid.accept(FieldKind::CprEven, m.source, now)
        };
        if accepted {
            if m.cpr_odd {
                a.cpr_odd = half;
            } else {
                a.cpr_even = half;
            }
        }
    }

    // Operational status.
    if let Some(op_status) = &m.op_status {
        if op_status.valid {
            a.adsb_version = op_status.version as i8;
            if op_status.version >= 1 {
                if let Some(hrd) = op_status.hrd {
                    a.adsb_hrd = hrd;
                }
                if let Some(tah) = op_status.tah {
                    a.adsb_tah = tah;
                }
            }
        }
    }

    // Derived geometric altitude: only if both inputs are strictly fresher
    // than the existing altitude_geom cell.
    if compare(&a.altitude_baro_valid, &a.altitude_geom_valid, now) == std::cmp::Ordering::Greater
        && compare(&a.geom_delta_valid, &a.altitude_geom_valid, now) == std::cmp::Ordering::Greater
    {
        a.altitude_geom = a.altitude_baro + a.geom_delta;
        a.altitude_geom_valid = combine(a.altitude_baro_valid, a.geom_delta_valid);
    }

    if m.cpr_valid {
        update_position(a, m, config, stats, now);
    }
}

fn route_heading(a: &mut Aircraft, m: &Message, now: Millis) {
    match a.adsb_hrd {
        HeadingReference::Magnetic => {
            if a.mag_heading_valid.accept(FieldKind::MagHeading, m.source, now) {
                a.mag_heading = m.heading;
            }
        }
        HeadingReference::True => {
            if a.true_heading_valid.accept(FieldKind::TrueHeading, m.source, now) {
                a.true_heading = m.heading;
            }
        }
    }
}

/// Record one Mode A/C reply's contribution to the correlation table
/// (§4.G step 1).
pub fn record_mode_ac_reply(mode_ac: &mut crate::mode_ac::ModeAcTable, m: &Message) {
    if let Some(squawk_raw) = m.squawk_raw {
        let index = crate::mode_ac::encode_mode_a(squawk_raw);
        mode_ac.record(index);
    }
}
