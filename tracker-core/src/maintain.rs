//! Periodic maintainer — Component I. Driven off the wall clock at most
//! once a second, never off message traffic: eviction and Mode A/C
//! correlation both need to notice silence, which message arrival can't
//! tell them about.

use tracing::info;

use crate::aircraft::Aircraft;
use crate::clock::Millis;
use crate::config::{Stats, AIRCRAFT_TTL_MS, MODEAC_MIN_MESSAGES, ONEHIT_TTL_MS};
use crate::mode_ac::{self, ModeAcTable};
use crate::table::AircraftTable;

const MODEAC_CORRELATION_WINDOW_MS: Millis = 5_000;
const MODEAC_MAX_AGE: u32 = 15;
const MODEAC_MATCH_AGE: u32 = 10;

/// `now − seen` past either TTL evicts an aircraft. One-hit aircraft (never
/// confirmed by a second message) are swept much sooner.
fn should_evict(a: &Aircraft, now: Millis, stats: &mut Stats) -> bool {
    let silence = now.saturating_sub(a.seen);
    if a.is_one_hit() && silence > ONEHIT_TTL_MS {
        stats.single_message_aircraft += 1;
        return true;
    }
    silence > AIRCRAFT_TTL_MS
}

/// Run one maintenance tick: evict stale/one-hit aircraft, expire every
/// survivor's validity cells in place, then re-run Mode A/C correlation.
pub fn periodic_update(table: &mut AircraftTable, mode_ac: &mut ModeAcTable, stats: &mut Stats, now: Millis) {
    let mut evicted = 0u64;
    table.evict_if(
        |a, now| {
            let evict = should_evict(a, now, stats);
            if evict {
                evicted += 1;
            }
            evict
        },
        now,
    );
    if evicted > 0 {
        info!(evicted, remaining = table.len(), "aircraft eviction sweep");
    }

    for (_, a) in table.iter_mut() {
        a.expire_all(now);
    }

    correlate_mode_ac(table, mode_ac, now);
}

fn correlate_mode_ac(table: &mut AircraftTable, mode_ac: &mut ModeAcTable, now: Millis) {
    mode_ac.clear_matches();
    let mut matched = 0u64;

    for (_, a) in table.iter_mut() {
        if now.saturating_sub(a.seen) > MODEAC_CORRELATION_WINDOW_MS {
            continue;
        }

        if a.squawk_valid.is_valid() {
            let index = mode_ac::encode_mode_a(a.squawk);
            let slot = mode_ac.slot(index);
            if slot.count.saturating_sub(slot.lastcount) >= MODEAC_MIN_MESSAGES {
                a.mode_a_hit = true;
                mode_ac.mark_match(index, a.addr);
                matched += 1;
            }
        }

        if a.altitude_baro_valid.is_valid() {
            let center = (a.altitude_baro as f64 / 100.0).round() as i32;
            for alt_hundreds in [center - 1, center, center + 1] {
                if let Some(index) = mode_ac::mode_c_to_mode_a(alt_hundreds) {
                    let slot = mode_ac.slot(index);
                    if slot.count.saturating_sub(slot.lastcount) >= MODEAC_MIN_MESSAGES {
                        a.mode_c_hit = true;
                        mode_ac.mark_match(index, a.addr);
                        matched += 1;
                    }
                }
            }
        }
    }

    mode_ac.tick(MODEAC_MIN_MESSAGES, MODEAC_MAX_AGE, MODEAC_MATCH_AGE);
    info!(matched, "Mode A/C reconciliation tick");
}
