/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Late-running simulation for fantasy trains.
//!
//! Each train draws a uniform integer in `0..100` and compares it with
//! `late_train_percent`.  Under the historic [`LatenessRule::DrawAbovePercent`]
//! the train runs late when the draw is *greater than* the percentage, so a
//! setting of 80 makes roughly 80 % of trains run on time.
//! [`LatenessRule::DrawBelowPercent`] reads the setting literally as a chance
//! of lateness.  The startup banner goes through
//! [`LatenessRule::on_time_percent`] so it reports the on-time share either
//! way.

use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use serde::Deserialize;

use crate::board::Status;
use crate::config::FantasyConfig;

/// How `late_train_percent` is compared against the `0..100` draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatenessRule {
    /// Late when `draw > percent`; the percentage is effectively the on-time
    /// share.
    #[default]
    DrawAbovePercent,
    /// Late when `draw < percent`; the percentage is the late share.
    DrawBelowPercent,
}

impl LatenessRule {
    pub fn is_late(self, draw: u32, percent: u32) -> bool {
        match self {
            LatenessRule::DrawAbovePercent => draw > percent,
            LatenessRule::DrawBelowPercent => draw < percent,
        }
    }

    /// Share of trains, in percent, that run on time for a given setting.
    pub fn on_time_percent(self, percent: u32) -> u32 {
        match self {
            LatenessRule::DrawAbovePercent => percent,
            LatenessRule::DrawBelowPercent => 100u32.saturating_sub(percent),
        }
    }
}

/// Decides whether a train is on time or, if not, when it is expected.
#[derive(Debug, Clone)]
pub struct EtaSimulator {
    late_train_percent: u32,
    /// Exclusive upper bound on the delay in minutes.
    late_train_max_minutes: u32,
    rule: LatenessRule,
}

impl EtaSimulator {
    pub fn new(config: &FantasyConfig) -> Self {
        Self {
            late_train_percent: u32::from(config.late_train_percent),
            late_train_max_minutes: config.late_train_max_minutes,
            rule: config.lateness_rule,
        }
    }

    /// Status for a train scheduled at `scheduled`.
    ///
    /// A delay is always between 1 and `late_train_max_minutes - 1` whole
    /// minutes.
    pub fn compute_status<R: Rng + ?Sized>(&self, scheduled: NaiveDateTime, rng: &mut R) -> Status {
        let draw = rng.gen_range(0..100);
        if !self.rule.is_late(draw, self.late_train_percent) {
            return Status::OnTime;
        }
        // max_minutes >= 2 is a config precondition; clamp so 1..1 never panics
        let minutes = rng.gen_range(1..self.late_train_max_minutes.max(2));
        Status::Expected(scheduled + Duration::minutes(i64::from(minutes)))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
