/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Board data model and the fixed-width row text format.
//!
//! A [`DepartureRow`] keeps its times as structured [`NaiveDateTime`] values;
//! the `HH:MM` text is produced only when a row is rendered.  This lets the
//! timetable engine age rows without parsing its own output back in.
//!
//! ```text
//! 12:04 Vancouver Brick City   3     On time
//! 12:07 Brickston              9 3/4 12:09
//! └───┘ └─────── 23 ────────┘└ 6 ─┘└ status
//! ```

use std::fmt;

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Number of departures shown once the board reaches steady state.
pub const BOARD_ROWS: usize = 3;

/// Destination column width; longer names are clipped.
pub const DESTINATION_WIDTH: usize = 23;

/// Platform column width.
pub const PLATFORM_WIDTH: usize = 6;

/// Status text for a train with no delay.
pub const ON_TIME_TEXT: &str = "On time";

/// Single line shown in place of the board when the live fetch fails.
pub const LIVE_ERROR_TEXT: &str = "ERROR : Cannot get live data";

/// A displayed clock time this far in the past is taken to mean tomorrow.
const ROLLOVER_PAST_SECS: i64 = 1000;

/// A displayed clock time this far in the future is taken to mean yesterday.
const ROLLOVER_FUTURE_HOURS: i64 = 12;

// ── Status ────────────────────────────────────────────────────────────────────

/// Estimated/actual departure status of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// No delay.
    OnTime,
    /// Running late; expected to leave at this time.
    Expected(NaiveDateTime),
    /// Free text reported by the live service ("Delayed", "Cancelled", ...).
    Reported(String),
}

impl Status {
    /// The expected departure time, if the status carries one.
    pub fn expected(&self) -> Option<NaiveDateTime> {
        match self {
            Status::Expected(t) => Some(*t),
            _ => None,
        }
    }

    pub fn is_on_time(&self) -> bool {
        matches!(self, Status::OnTime)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::OnTime => f.write_str(ON_TIME_TEXT),
            Status::Expected(t) => write!(f, "{}", t.format("%H:%M")),
            Status::Reported(text) => f.write_str(text),
        }
    }
}

// ── DepartureRow ──────────────────────────────────────────────────────────────

/// One departure on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureRow {
    /// When the train is due.  `None` only for live rows whose source omitted
    /// the scheduled time; such rows render an empty time column.
    pub scheduled: Option<NaiveDateTime>,
    /// Destination name, already clipped to [`DESTINATION_WIDTH`] characters.
    pub destination: String,
    pub platform: String,
    pub status: Status,
}

impl DepartureRow {
    /// Build a row, clipping the destination to the display width.
    pub fn new(
        scheduled: Option<NaiveDateTime>,
        destination: &str,
        platform: impl Into<String>,
        status: Status,
    ) -> Self {
        Self {
            scheduled,
            destination: clip(destination.trim(), DESTINATION_WIDTH),
            platform: platform.into(),
            status,
        }
    }

    /// The time passengers read off the board: the expected time for a late
    /// train, otherwise the scheduled time, at minute precision.
    pub fn displayed_departure(&self) -> Option<NaiveDateTime> {
        self.status
            .expected()
            .or(self.scheduled)
            .map(truncate_to_minute)
    }

    /// `true` once the displayed departure time lies strictly before `now`.
    ///
    /// Rows without any time never depart on their own.
    pub fn has_departed(&self, now: NaiveDateTime) -> bool {
        self.displayed_departure().is_some_and(|t| t < now)
    }

    /// The fixed-width line written to the display.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DepartureRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(t) = self.scheduled {
            write!(f, "{}", t.format("%H:%M"))?;
        }
        write!(
            f,
            " {:<dw$}{:<pw$}{}",
            self.destination,
            self.platform,
            self.status,
            dw = DESTINATION_WIDTH,
            pw = PLATFORM_WIDTH,
        )
    }
}

// ── BoardLine ─────────────────────────────────────────────────────────────────

/// Anything the renderer can put on a board line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardLine {
    Departure(DepartureRow),
    /// A verbatim message, e.g. [`LIVE_ERROR_TEXT`].
    Message(String),
}

impl BoardLine {
    pub fn live_error() -> Self {
        BoardLine::Message(LIVE_ERROR_TEXT.to_string())
    }
}

impl From<DepartureRow> for BoardLine {
    fn from(row: DepartureRow) -> Self {
        BoardLine::Departure(row)
    }
}

impl fmt::Display for BoardLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardLine::Departure(row) => row.fmt(f),
            BoardLine::Message(text) => f.write_str(text),
        }
    }
}

// ── Clock-time helpers ────────────────────────────────────────────────────────

/// Place a bare `HH:MM` clock time on the calendar relative to `now`.
///
/// The time is first put on today's date.  If that lands more than 1000 s
/// in the past it is a train just after midnight while the clock still reads
/// late evening, so it moves to tomorrow.  If it lands more than 12 h in the
/// future it is a late-evening train seen after midnight, so it moves to
/// yesterday.
pub fn resolve_clock_time(time: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let candidate = now.date().and_time(time);
    let diff = candidate - now;
    if diff < Duration::seconds(-ROLLOVER_PAST_SECS) {
        candidate + Duration::days(1)
    } else if diff > Duration::hours(ROLLOVER_FUTURE_HOURS) {
        candidate - Duration::days(1)
    } else {
        candidate
    }
}

/// Parse `HH:MM` text and resolve it with [`resolve_clock_time`].
pub fn parse_clock_time(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .ok()
        .map(|t| resolve_clock_time(t, now))
}

/// Clip `s` to at most `width` characters.
pub fn clip(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
