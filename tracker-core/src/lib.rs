//! Mode S / ADS-B aircraft state tracker.
//!
//! Turns a stream of decoded Mode S / ADS-B messages into a live table of
//! aircraft state: per-field freshness arbitration across feeds of mixed
//! trustworthiness ([`validity`]), CPR position decode and validation
//! ([`cpr`], [`position`]), and the table lifecycle that ages aircraft out
//! and correlates bare Mode A/C replies against it ([`table`], [`mode_ac`],
//! [`maintain`]).
//!
//! [`Tracker`] is the single entry point a caller needs: feed it decoded
//! messages via [`Tracker::ingest`], call [`Tracker::maintain`] once a
//! second off a wall clock, and read [`Tracker::aircraft`] for the current
//! table.

pub mod aircraft;
pub mod clock;
pub mod config;
pub mod cpr;
pub mod error;
pub mod geodesy;
pub mod ingest;
pub mod maintain;
pub mod message;
pub mod mode_ac;
pub mod position;
pub mod station;
pub mod table;
pub mod validity;

pub use aircraft::{AddrType, Aircraft};
pub use clock::Millis;
pub use config::{Stats, TrackerConfig};
pub use error::{Result, TrackerError};
pub use message::Message;
pub use mode_ac::ModeAcTable;
pub use table::AircraftTable;

/// The tracker: an aircraft table, a Mode A/C correlation table, and the
/// statistics counters they share. Owns no clock — every entry point takes
/// `now` explicitly, so replay against a scripted message clock is
/// deterministic and a caller can unit-test without real time passing.
#[derive(Debug, Default)]
pub struct Tracker {
    pub config: TrackerConfig,
    pub aircraft: AircraftTable,
    pub mode_ac: ModeAcTable,
    pub stats: Stats,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Tracker {
            config,
            aircraft: AircraftTable::new(),
            mode_ac: ModeAcTable::new(),
            stats: Stats::new(),
        }
    }

    /// Ingest one decoded message at the message clock `now`. Bare Mode
    /// A/C replies (`msgtype == 32`) are routed to the correlation table
    /// only; everything else updates the aircraft table.
    pub fn ingest(&mut self, message: &mut Message, now: Millis) {
        if ingest::is_mode_ac_reply(message) {
            ingest::record_mode_ac_reply(&mut self.mode_ac, message);
            return;
        }
        ingest::update_from_message(&mut self.aircraft, message, &self.config, &mut self.stats, now);
    }

    /// Run one maintenance tick at the wall clock `now`: eviction, cell
    /// expiry, and Mode A/C correlation.
    pub fn maintain(&mut self, now: Millis) {
        maintain::periodic_update(&mut self.aircraft, &mut self.mode_ac, &mut self.stats, now);
    }
}
