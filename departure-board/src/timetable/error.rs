/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Failure modes of the fantasy timetable.
//!
//! A valid configuration never produces these; they surface a broken
//! precondition (empty pools, duplicate prevention on a pool that cannot
//! fill the board) instead of letting the generator spin forever.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimetableError {
    /// Duplicate prevention rejected every draw up to the retry cap.
    #[error(
        "no destination free of duplicates after {attempts} draws; \
         the destination pool is too small for duplicate prevention"
    )]
    DestinationPoolExhausted { attempts: u32 },

    #[error("the destination pool is empty")]
    EmptyDestinationPool,

    #[error("the platform pool is empty")]
    EmptyPlatformPool,
}
