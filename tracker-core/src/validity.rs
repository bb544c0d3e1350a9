//! Per-field freshness records with source ranking.
//!
//! This is the single mechanism that arbitrates between concurrent,
//! overlapping data feeds of differing trustworthiness. Every tracked field
//! on an [`crate::aircraft::Aircraft`] is paired with one [`ValidityCell`];
//! the ~25 fields share one interval table (below) instead of each
//! hand-rolling its own stale/expire constants.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;

/// Feed trustworthiness, best to worst. Lower variants win ties; `Invalid`
/// is strictly worse than any real source and marks "no value".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceRank {
    AdsbValid,
    Mlat,
    ModeSChecked,
    AdsbWithCpr,
    ModeAc,
    Invalid,
}

impl SourceRank {
    pub fn is_valid(self) -> bool {
        self != SourceRank::Invalid
    }
}

/// Worse of two ranks (the rank with the larger ordinal).
pub fn worse_of(a: SourceRank, b: SourceRank) -> SourceRank {
    a.max(b)
}

/// Tag identifying which tracked field a [`ValidityCell`] belongs to, used
/// only to look up its `(stale_interval, expire_interval)` pair. Doesn't
/// otherwise participate in cell arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Callsign,
    AltitudeBaro,
    AltitudeGeom,
    GeomDelta,
    GroundSpeed,
    Ias,
    Tas,
    Mach,
    Track,
    TrackRate,
    Roll,
    MagHeading,
    TrueHeading,
    BaroRate,
    GeomRate,
    Squawk,
    Category,
    AirGround,
    AltSetting,
    IntentAltitude,
    IntentHeading,
    IntentModes,
    CprEven,
    CprOdd,
    Position,
}

/// `(stale_interval_ms, expire_interval_ms)` for each field tag.
///
/// Altitude, squawk, and air/ground are "fast" fields (stale at 15s) because
/// they change meaningfully in seconds; everything else stales at 60s. Every
/// field expires at 70s regardless of its stale interval.
pub fn intervals(kind: FieldKind) -> (Millis, Millis) {
    const EXPIRE: Millis = 70_000;
    let stale = match kind {
        FieldKind::AltitudeBaro | FieldKind::Squawk | FieldKind::AirGround => 15_000,
        _ => 60_000,
    };
    (stale, EXPIRE)
}

/// One freshness record: current source, and the three timestamps that
/// govern when a worse source may displace it and when it lapses outright.
///
/// Invariant: whenever `source != Invalid`, `updated <= stale <= expires`.
/// Carries no field identity of its own — the stale/expire interval pair is
/// looked up from a [`FieldKind`] at the point of [`ValidityCell::accept`],
/// not stored per-cell, so `combine`/`compare` never have to decide whose
/// interval config "wins".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityCell {
    pub source: SourceRank,
    pub updated: Millis,
    pub stale: Millis,
    pub expires: Millis,
}

impl Default for ValidityCell {
    fn default() -> Self {
        ValidityCell {
            source: SourceRank::Invalid,
            updated: 0,
            stale: 0,
            expires: 0,
        }
    }
}

impl ValidityCell {
    /// A fresh, unset cell.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.source.is_valid()
    }

    /// Gating rule for any new datum. Returns whether the update was
    /// accepted; on acceptance, `source`/`updated`/`stale`/`expires` are all
    /// rewritten from `now`, with the stale/expire intervals for `kind`.
    ///
    /// 1. A message older than what we've already accepted is rejected.
    /// 2. A worse source is rejected while the current cell is still inside
    ///    its stale window.
    /// 3. Otherwise accept.
    pub fn accept(&mut self, kind: FieldKind, source: SourceRank, now: Millis) -> bool {
        if now < self.updated {
            return false;
        }
        if source > self.source && now < self.stale {
            return false;
        }
        let (stale_interval, expire_interval) = intervals(kind);
        self.source = source;
        self.updated = now;
        self.stale = now + stale_interval;
        self.expires = now + expire_interval;
        true
    }

    /// Unilaterally expire this cell if its expiry has passed. Leaves the
    /// stored value untouched — callers must gate reads on `source`.
    pub fn expire(&mut self, now: Millis) {
        if self.source.is_valid() && now >= self.expires {
            self.source = SourceRank::Invalid;
        }
    }

    /// Force this cell to `Invalid` regardless of expiry, preserving the
    /// timestamps. Used by the CPR "bad fix" reset (the only place the
    /// tracker regresses its own state).
    pub fn invalidate(&mut self) {
        self.source = SourceRank::Invalid;
    }
}

/// Derive a compound cell from two inputs. If either is invalid, the other
/// is copied verbatim. Otherwise the result is no fresher than its weakest
/// input: worse source, latest update, earliest stale/expiry.
pub fn combine(a: ValidityCell, b: ValidityCell) -> ValidityCell {
    if !a.source.is_valid() {
        return b;
    }
    if !b.source.is_valid() {
        return a;
    }
    ValidityCell {
        source: worse_of(a.source, b.source),
        updated: a.updated.max(b.updated),
        stale: a.stale.min(b.stale),
        expires: a.expires.min(b.expires),
    }
}

/// Which of two cells currently holds the more authoritative reading.
/// Whichever is still within its stale window *and* from a strictly better
/// source wins; failing that, whichever was updated more recently wins;
/// otherwise a tie.
pub fn compare(lhs: &ValidityCell, rhs: &ValidityCell, now: Millis) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    let lhs_fresh_better = now < lhs.stale && lhs.source < rhs.source;
    let rhs_fresh_better = now < rhs.stale && rhs.source < lhs.source;

    if lhs_fresh_better && !rhs_fresh_better {
        return Ordering::Greater;
    }
    if rhs_fresh_better && !lhs_fresh_better {
        return Ordering::Less;
    }
    lhs.updated.cmp(&rhs.updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_cell(kind: FieldKind, source: SourceRank, now: Millis) -> ValidityCell {
        let mut cell = ValidityCell::new();
        assert!(cell.accept(kind, source, now));
        cell
    }

    #[test]
    fn accept_rejects_out_of_order_timestamps() {
        let mut cell = ValidityCell::new();
        assert!(cell.accept(FieldKind::AltitudeBaro, SourceRank::AdsbValid, 5_000));
        assert!(!cell.accept(FieldKind::AltitudeBaro, SourceRank::AdsbValid, 4_000));
        assert_eq!(cell.updated, 5_000);
    }

    #[test]
    fn accept_rejects_worse_source_while_fresh() {
        let mut cell = fresh_cell(FieldKind::Position, SourceRank::AdsbValid, 0);
        // stale_interval for Position is 60s, so an MLAT update at t=1000 is
        // still within the stale window and must be rejected.
        assert!(!cell.accept(FieldKind::Position, SourceRank::Mlat, 1_000));
        assert_eq!(cell.source, SourceRank::AdsbValid);
    }

    #[test]
    fn accept_allows_worse_source_once_stale() {
        let mut cell = fresh_cell(FieldKind::Position, SourceRank::AdsbValid, 0);
        assert!(cell.accept(FieldKind::Position, SourceRank::Mlat, 60_000));
        assert_eq!(cell.source, SourceRank::Mlat);
        assert_eq!(cell.updated, 60_000);
    }

    #[test]
    fn accept_is_idempotent_on_duplicate_timestamp() {
        let mut cell = fresh_cell(FieldKind::AltitudeBaro, SourceRank::AdsbValid, 1_000);
        let before = cell;
        assert!(cell.accept(FieldKind::AltitudeBaro, SourceRank::AdsbValid, 1_000));
        assert_eq!(cell, before);
    }

    #[test]
    fn accept_invariant_updated_le_stale_le_expires() {
        let cell = fresh_cell(FieldKind::Squawk, SourceRank::AdsbValid, 12_345);
        assert!(cell.updated <= cell.stale);
        assert!(cell.stale <= cell.expires);
    }

    #[test]
    fn combine_copies_the_other_when_one_invalid() {
        let valid = fresh_cell(FieldKind::CprEven, SourceRank::AdsbValid, 10);
        let invalid = ValidityCell::new();
        assert_eq!(combine(valid, invalid), valid);
        assert_eq!(combine(invalid, valid), valid);
    }

    #[test]
    fn combine_takes_worse_source_and_bounds() {
        let a = fresh_cell(FieldKind::CprEven, SourceRank::AdsbValid, 1_000);
        let b = fresh_cell(FieldKind::CprOdd, SourceRank::Mlat, 4_000);
        let c = combine(a, b);
        assert_eq!(c.source, SourceRank::Mlat);
        assert_eq!(c.updated, 4_000);
        assert_eq!(c.stale, a.stale.min(b.stale));
        assert_eq!(c.expires, a.expires.min(b.expires));
    }

    #[test]
    fn compare_prefers_fresh_better_source() {
        let better = fresh_cell(FieldKind::Position, SourceRank::AdsbValid, 0);
        let worse = fresh_cell(FieldKind::Position, SourceRank::Mlat, 5_000);
        assert_eq!(compare(&better, &worse, 1_000), std::cmp::Ordering::Greater);
    }

    #[test]
    fn compare_falls_back_to_recency() {
        let a = fresh_cell(FieldKind::Position, SourceRank::AdsbValid, 0);
        let b = fresh_cell(FieldKind::Position, SourceRank::AdsbValid, 5_000);
        // Both still "fresh" and same source, so neither wins on source —
        // falls back to most-recently-updated.
        assert_eq!(compare(&a, &b, 5_001), std::cmp::Ordering::Less);
    }

    #[test]
    fn expire_invalidates_source_but_keeps_value_readable_via_struct() {
        let mut cell = fresh_cell(FieldKind::AltitudeBaro, SourceRank::AdsbValid, 0);
        cell.expire(69_999);
        assert!(cell.is_valid());
        cell.expire(70_000);
        assert!(!cell.is_valid());
    }

    #[test]
    fn invalidate_forces_invalid_regardless_of_expiry() {
        let mut cell = fresh_cell(FieldKind::CprEven, SourceRank::AdsbValid, 0);
        cell.invalidate();
        assert!(!cell.is_valid());
        assert_eq!(cell.updated, 0);
    }
}
