/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Destination selection for fantasy trains.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::board::{clip, DepartureRow, DESTINATION_WIDTH};
use crate::config::FantasyConfig;

use super::error::TimetableError;

/// Retry cap for duplicate-free draws.  With three rows on the board and at
/// least three distinct names in the pool the chance of hitting it is
/// negligible.
pub const MAX_PICK_ATTEMPTS: u32 = 1_000;

/// Outcome of one [`DestinationPicker::pick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub destination: String,
    /// Set when the magic destination was chosen; replaces the pool platform.
    pub platform_override: Option<String>,
}

impl Pick {
    pub fn is_magic(&self) -> bool {
        self.platform_override.is_some()
    }
}

/// Draws destinations from the configured pool.
#[derive(Debug, Clone)]
pub struct DestinationPicker {
    pool: Vec<String>,
    prevent_duplicates: bool,
    magic_percent: u32,
    magic_destination: String,
    magic_platform: String,
}

impl DestinationPicker {
    pub fn new(config: &FantasyConfig) -> Self {
        Self {
            pool: config
                .destinations
                .iter()
                .map(|d| clip(d.trim(), DESTINATION_WIDTH))
                .collect(),
            prevent_duplicates: config.prevent_duplicates,
            magic_percent: u32::from(config.magic_percent),
            magic_destination: config.magic_destination.clone(),
            magic_platform: config.magic_platform.clone(),
        }
    }

    /// Choose the destination for the next row on `board`.
    ///
    /// With duplicate prevention on, draws repeat until the name is not
    /// already on the board.  The magic destination is exempt: it is
    /// accepted as soon as it comes up.
    ///
    /// # Errors
    /// [`TimetableError::DestinationPoolExhausted`] after
    /// [`MAX_PICK_ATTEMPTS`] rejected draws.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        board: &[DepartureRow],
        rng: &mut R,
    ) -> Result<Pick, TimetableError> {
        for attempt in 1..=MAX_PICK_ATTEMPTS {
            let pick = self.draw(rng)?;
            if !self.prevent_duplicates || pick.is_magic() || !on_board(board, &pick.destination) {
                return Ok(pick);
            }
            trace!(attempt, destination = %pick.destination, "Destination already on board");
        }

        debug!(
            attempts = MAX_PICK_ATTEMPTS,
            pool = self.pool.len(),
            "Destination pool exhausted"
        );
        Err(TimetableError::DestinationPoolExhausted {
            attempts: MAX_PICK_ATTEMPTS,
        })
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Pick, TimetableError> {
        let destination = self
            .pool
            .choose(rng)
            .ok_or(TimetableError::EmptyDestinationPool)?;

        if self.magic_fires(rng) {
            return Ok(Pick {
                destination: clip(&self.magic_destination, DESTINATION_WIDTH),
                platform_override: Some(self.magic_platform.clone()),
            });
        }

        Ok(Pick {
            destination: destination.clone(),
            platform_override: None,
        })
    }

    /// `magic_percent` out of 100: 0 never fires, 100 always does.
    ///
    /// Written as `draw + percent >= 100` rather than the older
    /// `draw > 100 - percent`.  The older form is one draw short, so at 100 it
    /// missed whenever `draw` was 0.
    fn magic_fires<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        let draw: u32 = rng.gen_range(0..100);
        draw + self.magic_percent >= 100
    }
}

fn on_board(board: &[DepartureRow], destination: &str) -> bool {
    board.iter().any(|row| row.destination.contains(destination))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
