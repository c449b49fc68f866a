/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Drawing the board.
//!
//! The runner only talks to [`BoardRenderer`]; [`TerminalRenderer`] is the
//! stock implementation and paints a text frame onto any `io::Write` (stdout
//! in the binary, a `Vec<u8>` in tests).

use std::io::{self, Write};

use crate::board::{BoardLine, BOARD_ROWS};
use crate::config::{BoardConfig, Mode};

/// Column header above the departures.
pub const HEADER: &str = "DEPARTURES               Plat Expt";

/// ANSI "clear screen, cursor home".
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// A surface the board can be painted on.
///
/// Implementations must not depend on being called at any particular rate
/// and never see anything but the lines they are given.
pub trait BoardRenderer {
    /// Paint up to [`BOARD_ROWS`] lines plus the clock.
    fn render(&mut self, lines: &[BoardLine], clock_text: &str) -> io::Result<()>;

    /// Paint the startup banner.
    fn banner(&mut self, lines: &[String]) -> io::Result<()>;
}

/// Text-mode board.
pub struct TerminalRenderer<W: Write> {
    out: W,
    clear_between_frames: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, clear_between_frames: bool) -> Self {
        Self {
            out,
            clear_between_frames,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn start_frame(&mut self) -> io::Result<()> {
        if self.clear_between_frames {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: Write> BoardRenderer for TerminalRenderer<W> {
    fn render(&mut self, lines: &[BoardLine], clock_text: &str) -> io::Result<()> {
        self.start_frame()?;
        writeln!(self.out, "{HEADER}")?;
        for line in lines.iter().take(BOARD_ROWS) {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out, "{:>width$}", clock_text, width = HEADER.len())?;
        self.out.flush()
    }

    fn banner(&mut self, lines: &[String]) -> io::Result<()> {
        self.start_frame()?;
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }
}

/// Text of the startup banner for `config`.
pub fn startup_banner(config: &BoardConfig) -> Vec<String> {
    let mut lines = vec![
        "The Elegant Departure Board".to_string(),
        "by www.elegantbricks.com".to_string(),
    ];
    match config.mode {
        Mode::Fantasy => {
            let f = &config.fantasy;
            lines.push(format!(
                "Running in fantasy mode with {} platforms.",
                f.platforms.len()
            ));
            lines.push(format!("{} possible destinations.", f.destinations.len()));
            lines.push(format!(
                "and {}% of trains run on time.",
                f.lateness_rule
                    .on_time_percent(u32::from(f.late_train_percent))
            ));
        }
        Mode::Live => {
            lines.push(format!(
                "Running in live mode for station \"{}\"",
                config.live.station_code
            ));
            if let Some(dst) = config.live.destination_filter() {
                lines.push(format!("Filtered for trains to/via \"{dst}\""));
            }
        }
    }
    lines
}

// ── Tests ─────────────────────────────────────────────────────────────────────
