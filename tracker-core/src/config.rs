//! Explicit tracker context: the process-wide knobs and statistics
//! counters §5 requires be passed as arguments rather than held in
//! process-wide mutable globals (the original C tracker's `Modes.stats_current`).

/// Number of buckets in the user-centered range histogram.
pub const RANGE_HISTOGRAM_BUCKETS: usize = 64;

pub const AIRCRAFT_TTL_MS: u64 = 300_000;
pub const ONEHIT_TTL_MS: u64 = 30_000;
pub const MODEAC_MIN_MESSAGES: u32 = 2;

/// Configuration the position validator/updater and periodic maintainer
/// read. Distinct from [`crate::station::StationConfig`] (the on-disk,
/// human-edited file): this is the narrower, already-validated slice those
/// components actually consult.
#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    pub user_lat: f64,
    pub user_lon: f64,
    pub user_latlon_valid: bool,
    pub max_range_m: f64,
    pub stats_range_histo: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            user_lat: 0.0,
            user_lon: 0.0,
            user_latlon_valid: false,
            max_range_m: 0.0,
            stats_range_histo: false,
        }
    }
}

impl TrackerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_location(mut self, lat: f64, lon: f64, max_range_m: f64) -> Self {
        self.user_lat = lat;
        self.user_lon = lon;
        self.user_latlon_valid = true;
        self.max_range_m = max_range_m;
        self
    }
}

/// Statistics accumulated by a tracker run. A private counter bag, not a
/// global: tests and the replay CLI each own one.
///
/// Distinct-address count is not duplicated here: `AircraftTable` already
/// increments one on every first sighting, so `AircraftTable::unique_aircraft`
/// is the single source of truth for it.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub cpr_global_ok: u64,
    pub cpr_global_bad: u64,
    pub cpr_global_skipped: u64,
    pub cpr_global_range_checks: u64,
    pub cpr_global_speed_checks: u64,
    pub cpr_local_ok: u64,
    pub cpr_local_skipped: u64,
    pub cpr_local_range_checks: u64,
    pub cpr_local_speed_checks: u64,
    pub cpr_surface: u64,
    pub cpr_airborne: u64,
    pub single_message_aircraft: u64,
    pub range_histogram: [u64; RANGE_HISTOGRAM_BUCKETS],
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one range sample into the user-centered histogram: bucket
    /// `round(range / max_range * BUCKETS)`, clamped into range.
    pub fn record_range(&mut self, range_m: f64, max_range_m: f64) {
        if max_range_m <= 0.0 {
            return;
        }
        let bucket = (range_m / max_range_m * RANGE_HISTOGRAM_BUCKETS as f64).round();
        let bucket = bucket.clamp(0.0, (RANGE_HISTOGRAM_BUCKETS - 1) as f64) as usize;
        self.range_histogram[bucket] += 1;
    }
}
