/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Wall-clock abstraction.
//!
//! Everything on the board is expressed in local wall-clock time, the same
//! time a passenger reads off the station clock.  Components never call
//! `Local::now()` directly; they ask a [`Clock`] so tests (and `--seed` demo
//! runs) can pin "now" to a known instant.

use std::cell::Cell;

use chrono::{Duration, Local, NaiveDateTime};

/// Source of the current local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
///
/// Single-threaded by construction (`Cell`), matching the board's polling
/// model.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, at: NaiveDateTime) {
        self.now.set(at);
    }

    /// Move forward by `by` (negative durations move backwards).
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
