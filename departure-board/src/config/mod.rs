//! Board configuration loading and validation.
//!
//! Every field has a default, so an empty (or absent) file gives the stock
//! fantasy board.  The expected YAML structure is:
//! ```yaml
//! mode: fantasy
//! live:
//!   api_key: "0123-abcd"
//!   endpoint_url: "https://lite.realtime.nationalrail.co.uk/OpenLDBWS/ldb11.asmx"
//!   station_code: "WAT"
//!   destination_filter: "WNR"
//! fantasy:
//!   destinations: ["Stud City", "Brickston", "Murp Grove"]
//!   platforms: [1, 2, 3]
//!   late_train_percent: 80
//!   late_train_max_minutes: 4
//!   prevent_duplicates: true
//!   magic_percent: 2
//! polling:
//!   tick_millis: 1000
//!   fantasy_refresh_ticks: 6
//!   live_refresh_ticks: 30
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::board::{clip, DESTINATION_WIDTH};
use crate::timetable::eta::LatenessRule;

// ── Defaults ──────────────────────────────────────────────────────────────────

const DEFAULT_ENDPOINT_URL: &str = "https://lite.realtime.nationalrail.co.uk/OpenLDBWS/ldb11.asmx";

const DEFAULT_DESTINATIONS: [&str; 14] = [
    "Stud City",
    "Brickston",
    "Attic Brick City",
    "Murp Grove",
    "Brickville",
    "Bricknell",
    "Bricksburg",
    "Legollywood",
    "Legoburg",
    "Vancouver Brick City",
    "Micro:Bit City",
    "Seattle Brick City",
    "Brickstown on Sea",
    "Seahaven",
];

/// Minimum number of distinct ordinary destinations duplicate prevention
/// needs to fill a three-row board.
pub const MIN_DEDUP_POOL: usize = 3;

// ── Mode ──────────────────────────────────────────────────────────────────────

/// Where board rows come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Invented timetable, no network.
    #[default]
    Fantasy,
    /// Real departures from the rail-information service.
    Live,
}

// ── Sections ──────────────────────────────────────────────────────────────────

/// Live-mode settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub api_key: String,
    pub endpoint_url: String,
    /// CRS code of the station whose departures are shown.
    pub station_code: String,
    /// Optional CRS code; only trains to/via this station are shown.
    pub destination_filter: Option<String>,
    pub rows: u32,
    pub time_offset_minutes: i32,
    pub time_window_minutes: u32,
    /// Request timeout.  `None` keeps the historic behaviour of waiting
    /// for the service indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            station_code: "WAT".to_string(),
            destination_filter: None,
            rows: 3,
            time_offset_minutes: 2,
            time_window_minutes: 120,
            timeout_secs: None,
        }
    }
}

impl LiveConfig {
    /// The destination filter, treating a blank value as "no filter".
    pub fn destination_filter(&self) -> Option<&str> {
        self.destination_filter
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Fantasy-timetable settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FantasyConfig {
    /// Destination pool; each name should fit the 23-character column.
    pub destinations: Vec<String>,
    pub platforms: Vec<u32>,
    /// 0–100.  Read through [`lateness_rule`](Self::lateness_rule).
    pub late_train_percent: u8,
    /// Upper bound (exclusive) on simulated lateness, in minutes.  Must be ≥ 2.
    pub late_train_max_minutes: u32,
    pub lateness_rule: LatenessRule,
    pub prevent_duplicates: bool,
    /// 0–100 chance of the magic destination replacing a pool draw.
    pub magic_percent: u8,
    pub magic_destination: String,
    pub magic_platform: String,
}

impl Default for FantasyConfig {
    fn default() -> Self {
        Self {
            destinations: DEFAULT_DESTINATIONS.iter().map(|s| s.to_string()).collect(),
            platforms: (1..=9).collect(),
            late_train_percent: 80,
            late_train_max_minutes: 4,
            lateness_rule: LatenessRule::default(),
            prevent_duplicates: true,
            magic_percent: 2,
            magic_destination: "Hogwarts".to_string(),
            magic_platform: "9 3/4".to_string(),
        }
    }
}

impl FantasyConfig {
    /// Number of pool destinations duplicate prevention can always tell
    /// apart.
    ///
    /// Names are compared as shown on the board, trimmed and clipped to the
    /// destination column.  The on-board check is a substring match, so a
    /// name contained in another pool name or in the magic destination
    /// ("York" inside "New York") does not count: the longer name on the
    /// board would block it.
    pub fn distinct_ordinary_destinations(&self) -> usize {
        let shown: HashSet<String> = self
            .destinations
            .iter()
            .map(|d| clip(d.trim(), DESTINATION_WIDTH))
            .collect();
        let magic = clip(self.magic_destination.trim(), DESTINATION_WIDTH);

        shown
            .iter()
            .filter(|name| !magic.contains(name.as_str()))
            .filter(|name| {
                !shown
                    .iter()
                    .any(|other| other != *name && other.contains(name.as_str()))
            })
            .count()
    }
}

/// Polling-loop cadence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub tick_millis: u64,
    /// Fantasy mode ages and refills the board once every this many ticks.
    pub fantasy_refresh_ticks: u32,
    /// Live mode fetches once every this many ticks.
    pub live_refresh_ticks: u32,
    /// How long the startup banner stays up before the first frame.
    pub startup_pause_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            tick_millis: 1000,
            fantasy_refresh_ticks: 6,
            live_refresh_ticks: 30,
            startup_pause_secs: 10,
        }
    }
}

// ── BoardConfig ───────────────────────────────────────────────────────────────

/// Complete, read-only board configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub mode: Mode,
    pub live: LiveConfig,
    pub fantasy: FantasyConfig,
    pub polling: PollingConfig,
}

impl BoardConfig {
    /// Parses the YAML file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML does not match
    /// the expected layout.  Semantic checks are left to
    /// [`validate`](Self::validate).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading board configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let config: BoardConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        debug!(
            mode = ?config.mode,
            destinations = config.fantasy.destinations.len(),
            platforms = config.fantasy.platforms.len(),
            station = %config.live.station_code,
            "Board configuration parsed"
        );

        Ok(config)
    }

    /// Check the settings the selected mode depends on.
    ///
    /// Only the active mode's section is checked, so a fantasy board does not
    /// need an API key and a live board does not need a destination pool.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.polling;
        if p.tick_millis == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }

        match self.mode {
            Mode::Live => {
                if p.live_refresh_ticks == 0 {
                    return Err(ConfigError::ZeroRefreshPeriod {
                        field: "live_refresh_ticks",
                    });
                }
                if self.live.api_key.trim().is_empty() {
                    return Err(ConfigError::MissingApiKey);
                }
                if self.live.station_code.trim().is_empty() {
                    return Err(ConfigError::MissingStationCode);
                }
            }
            Mode::Fantasy => {
                if p.fantasy_refresh_ticks == 0 {
                    return Err(ConfigError::ZeroRefreshPeriod {
                        field: "fantasy_refresh_ticks",
                    });
                }
                self.validate_fantasy()?;
            }
        }
        Ok(())
    }

    fn validate_fantasy(&self) -> Result<(), ConfigError> {
        let f = &self.fantasy;
        if f.destinations.is_empty() {
            return Err(ConfigError::EmptyDestinationPool);
        }
        if f.platforms.is_empty() {
            return Err(ConfigError::EmptyPlatformPool);
        }
        for (field, value) in [
            ("late_train_percent", f.late_train_percent),
            ("magic_percent", f.magic_percent),
        ] {
            if value > 100 {
                return Err(ConfigError::PercentOutOfRange { field, value });
            }
        }
        if f.late_train_max_minutes < 2 {
            return Err(ConfigError::LatenessRangeTooSmall {
                max_minutes: f.late_train_max_minutes,
            });
        }
        if f.prevent_duplicates {
            let distinct = f.distinct_ordinary_destinations();
            if distinct < MIN_DEDUP_POOL {
                return Err(ConfigError::PoolTooSmallForDuplicatePrevention { distinct });
            }
        }
        Ok(())
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// A configuration the board cannot run with.  Detected before the polling
/// loop starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "in live mode an API key is required from National Rail Enquiries; \
         you require a Darwin 'OpenLDBWS' free developer key"
    )]
    MissingApiKey,

    #[error("in live mode a station (CRS) code is required")]
    MissingStationCode,

    #[error("the fantasy destination pool is empty")]
    EmptyDestinationPool,

    #[error("the fantasy platform pool is empty")]
    EmptyPlatformPool,

    #[error("{field} must be between 0 and 100, got {value}")]
    PercentOutOfRange { field: &'static str, value: u8 },

    #[error("late_train_max_minutes must be at least 2, got {max_minutes}")]
    LatenessRangeTooSmall { max_minutes: u32 },

    #[error(
        "prevent_duplicates needs at least 3 distinct destinations not contained \
         in another pool name, the pool has {distinct}"
    )]
    PoolTooSmallForDuplicatePrevention { distinct: usize },

    #[error("{field} must be at least 1")]
    ZeroRefreshPeriod { field: &'static str },

    #[error("tick_millis must be at least 1")]
    ZeroTickInterval,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
