//! mode-s-tracker: replays a decoded Mode S / ADS-B message stream through
//! `tracker-core` and prints the resulting aircraft table.
//!
//! Deliberately thin: it does not decode raw Mode S bits (that producer is
//! a separate concern) or serve a network API. Input is newline-delimited
//! JSON, one `tracker_core::Message` per line, in capture order.

use std::io::{self, BufRead};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};

use tracker_core::config::TrackerConfig;
use tracker_core::station;
use tracker_core::{Message, Tracker};

#[derive(Parser)]
#[command(name = "mode-s-tracker", version, about = "Mode S / ADS-B aircraft state tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a newline-delimited JSON message capture through the tracker.
    Replay {
        /// Path to the capture file, or "-" for stdin.
        file: PathBuf,

        /// Maintenance tick interval, in milliseconds of message-clock time.
        #[arg(long, default_value = "1000")]
        maintain_interval_ms: u64,
    },

    /// Print the loaded station configuration (`~/.mode-s-tracker/config.yaml`).
    ShowConfig,
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { file, maintain_interval_ms } => cmd_replay(file, maintain_interval_ms),
        Commands::ShowConfig => cmd_show_config(),
    }
}

fn cmd_show_config() {
    let config = station::load_config();
    println!("receiver.name        = {}", config.receiver.name);
    println!("receiver.lat         = {:?}", config.receiver.lat);
    println!("receiver.lon         = {:?}", config.receiver.lon);
    println!("receiver.max_range_m = {:?}", config.receiver.max_range_m);
    println!("replay.source_path   = {:?}", config.replay.source_path);
}

fn cmd_replay(file: PathBuf, maintain_interval_ms: u64) {
    let station = station::load_config();
    let mut tracker_config = TrackerConfig::new();
    if let (Some(lat), Some(lon)) = (station.receiver.lat, station.receiver.lon) {
        tracker_config = tracker_config.with_user_location(lat, lon, station.receiver.max_range_m.unwrap_or(0.0));
    }
    let mut tracker = Tracker::new(tracker_config);

    let reader: Box<dyn BufRead> = if file.to_str() == Some("-") {
        Box::new(io::stdin().lock())
    } else {
        let f = std::fs::File::open(&file).unwrap_or_else(|e| {
            eprintln!("Error opening {}: {e}", file.display());
            std::process::exit(1);
        });
        Box::new(io::BufReader::new(f))
    };

    let mut lines_read = 0u64;
    let mut parsed = 0u64;
    let mut next_maintain = maintain_interval_ms;

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        lines_read += 1;

        let mut message: Message = match serde_json::from_str(trimmed) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("skipping malformed record on line {lines_read}: {e}");
                continue;
            }
        };

        let now = message.sys_timestamp_ms;
        tracker.ingest(&mut message, now);
        parsed += 1;

        while now >= next_maintain {
            tracker.maintain(next_maintain);
            next_maintain += maintain_interval_ms;
        }
    }

    print_summary(&tracker, lines_read, parsed);
}

fn print_summary(tracker: &Tracker, lines_read: u64, parsed: u64) {
    println!();
    println!(
        "Messages: {lines_read} read, {parsed} parsed, {} aircraft tracked",
        tracker.aircraft.len()
    );
    println!();

    if tracker.aircraft.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ICAO", "Callsign", "Squawk", "Alt (ft)", "Speed (kt)", "Track", "Lat", "Lon", "NUC", "Msgs",
    ]);

    let mut sorted: Vec<_> = tracker.aircraft.iter().collect();
    sorted.sort_by_key(|(_, a)| std::cmp::Reverse(a.messages));

    for (addr, a) in sorted {
        table.add_row(vec![
            Cell::new(format!("{addr:06X}")),
            Cell::new(callsign_string(&a.callsign)),
            Cell::new(if a.squawk_valid.is_valid() {
                format!("{:04o}", a.squawk)
            } else {
                "-".into()
            }),
            Cell::new(if a.altitude_baro_valid.is_valid() {
                a.altitude_baro.to_string()
            } else {
                "-".into()
            }),
            Cell::new(if a.ground_speed_valid.is_valid() {
                format!("{:.0}", a.ground_speed)
            } else {
                "-".into()
            }),
            Cell::new(if a.track_valid.is_valid() {
                format!("{:.0}", a.track)
            } else {
                "-".into()
            }),
            Cell::new(if a.position_valid.is_valid() {
                format!("{:.4}", a.position.lat)
            } else {
                "-".into()
            }),
            Cell::new(if a.position_valid.is_valid() {
                format!("{:.4}", a.position.lon)
            } else {
                "-".into()
            }),
            Cell::new(if a.position_valid.is_valid() {
                a.position.pos_nuc.to_string()
            } else {
                "-".into()
            }),
            Cell::new(a.messages.to_string()),
        ]);
    }

    println!("{table}");
}

fn callsign_string(raw: &[u8; 8]) -> String {
    let s: String = raw.iter().take_while(|&&b| b != 0).map(|&b| b as char).collect();
    let trimmed = s.trim();
    if trimmed.is_empty() {
        "-".into()
    } else {
        trimmed.into()
    }
}
