/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The polling loop.
//!
//! One tick is: maybe refresh the data, then always draw.  Ticks are about
//! `tick_millis` apart; a tick counter decides which ticks refresh.
//!
//! ```text
//! fantasy  every tick: rebuild if the board is empty
//!          counter == 0: age_and_refill
//! live     counter == 0: fetch (failure → single error line)
//! both     render(lines, "HH:MM:SS")
//! ```
//!
//! Everything runs on one task; the board is only written by the tick and
//! only read by the renderer, so no locking is involved.  The live fetch has
//! no timeout of its own (see `LiveConfig::timeout_secs`), so a hung request
//! holds up the board until it returns.

use std::io;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{error, info};

use crate::board::BoardLine;
use crate::clock::Clock;
use crate::config::BoardConfig;
use crate::display::BoardRenderer;
use crate::live::LiveBoardClient;
use crate::timetable::{EngineState, TimetableEngine, TimetableError};

/// Why the loop stopped early.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Timetable(#[from] TimetableError),

    #[error("failed to draw the board: {0}")]
    Render(#[from] io::Error),
}

enum Feed<C, R> {
    Fantasy {
        engine: TimetableEngine<C, R>,
        state: EngineState,
    },
    Live {
        client: LiveBoardClient,
        lines: Vec<BoardLine>,
    },
}

/// Drives one board: data source, cadence and renderer.
pub struct BoardRunner<C, R, D> {
    clock: C,
    feed: Feed<C, R>,
    renderer: D,
    refresh_every: u32,
    counter: u32,
    tick_interval: Duration,
}

impl<C, R, D> BoardRunner<C, R, D>
where
    C: Clock + Clone,
    R: Rng,
    D: BoardRenderer,
{
    /// A board fed by the fantasy timetable.
    pub fn fantasy(config: &BoardConfig, clock: C, rng: R, renderer: D) -> Self {
        let engine = TimetableEngine::new(&config.fantasy, clock.clone(), rng);
        let state = engine.initial_state();
        Self {
            clock,
            feed: Feed::Fantasy { engine, state },
            renderer,
            refresh_every: config.polling.fantasy_refresh_ticks.max(1),
            counter: 0,
            tick_interval: Duration::from_millis(config.polling.tick_millis),
        }
    }

    /// A board fed by the live service.
    pub fn live(config: &BoardConfig, client: LiveBoardClient, clock: C, renderer: D) -> Self {
        Self {
            clock,
            feed: Feed::Live {
                client,
                lines: Vec::new(),
            },
            renderer,
            refresh_every: config.polling.live_refresh_ticks.max(1),
            counter: 0,
            tick_interval: Duration::from_millis(config.polling.tick_millis),
        }
    }

    pub fn renderer(&self) -> &D {
        &self.renderer
    }

    /// What the board currently shows.
    pub fn lines(&self) -> Vec<BoardLine> {
        match &self.feed {
            Feed::Fantasy { state, .. } => state.lines(),
            Feed::Live { lines, .. } => lines.clone(),
        }
    }

    /// Show the startup banner and hold it for `pause`.
    pub async fn startup(&mut self, banner: &[String], pause: Duration) -> Result<(), RunnerError> {
        for line in banner {
            info!("{line}");
        }
        self.renderer.banner(banner)?;
        tokio::time::sleep(pause).await;
        Ok(())
    }

    /// One loop iteration: refresh if due, then render.
    pub async fn tick(&mut self) -> Result<(), RunnerError> {
        let refresh_due = self.counter == 0;

        match &mut self.feed {
            Feed::Fantasy { engine, state } => {
                if state.is_empty() {
                    engine.rebuild(state)?;
                }
                if refresh_due {
                    engine.age_and_refill(state)?;
                }
            }
            Feed::Live { client, lines } => {
                if refresh_due {
                    *lines = match client.fetch(self.clock.now()).await {
                        Ok(rows) => rows.into_iter().map(BoardLine::from).collect(),
                        Err(e) => {
                            error!(error = %e, "Cannot get live data");
                            vec![BoardLine::live_error()]
                        }
                    };
                }
            }
        }

        let clock_text = self.clock.now().format("%H:%M:%S").to_string();
        let lines = self.lines();
        self.renderer.render(&lines, &clock_text)?;

        self.counter = (self.counter + 1) % self.refresh_every;
        Ok(())
    }

    /// Tick until Ctrl-C, or until `max_ticks` ticks have run.
    pub async fn run(&mut self, max_ticks: Option<u64>) -> Result<(), RunnerError> {
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let mut ticks: u64 = 0;
        loop {
            tokio::select! {
                result = self.tick() => result?,
                _ = &mut shutdown => {
                    info!(ticks, "Interrupted, stopping the board");
                    return Ok(());
                }
            }

            ticks += 1;
            if max_ticks.is_some_and(|max| ticks >= max) {
                info!(ticks, "Tick limit reached, stopping the board");
                return Ok(());
            }

            tokio::select! {
                _ = tokio::time::sleep(self.tick_interval) => {}
                _ = &mut shutdown => {
                    info!(ticks, "Interrupted, stopping the board");
                    return Ok(());
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
