//! Fantasy timetable engine.
//!
//! [`TimetableEngine`] keeps a rolling window of the next
//! [`BOARD_ROWS`](crate::board::BOARD_ROWS) invented departures in an
//! [`EngineState`] owned by the caller:
//!
//! ```text
//!  rebuild()         clear ─► anchor = now ─► fill to 3
//!  age_and_refill()  drop departed rows ─► anchor = last scheduled ─► fill to 3
//! ```
//!
//! Each new train is due 2 or 3 minutes after the previous one, so the
//! timetable carries on chronologically from wherever it left off.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | State | `EngineState` passed explicitly; no globals |
//! | Ageing | Uses each row's retained timestamp at display (minute) precision, no text round-trip |
//! | Duplicate search | Capped at [`MAX_PICK_ATTEMPTS`](destination::MAX_PICK_ATTEMPTS), then `Err` |
//! | Anchor behind clock | Clamped to `now` so refilled rows are never already departed |

pub mod destination;
pub mod error;
pub mod eta;

pub use destination::{DestinationPicker, Pick};
pub use error::TimetableError;
pub use eta::{EtaSimulator, LatenessRule};

use chrono::{Duration, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::board::{BoardLine, DepartureRow, BOARD_ROWS};
use crate::clock::Clock;
use crate::config::FantasyConfig;

/// Gap between consecutive trains, in whole minutes (inclusive range).
const MIN_GAP_MINUTES: i64 = 2;
const MAX_GAP_MINUTES: i64 = 3;

// ── EngineState ───────────────────────────────────────────────────────────────

/// The only mutable state of the fantasy board.  Lives in memory; a restart
/// starts a fresh timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    /// Scheduled time of the most recently generated train; the next train
    /// is generated after it.
    pub last_scheduled: NaiveDateTime,
    /// Rows in ascending scheduled order.
    pub board: Vec<DepartureRow>,
}

impl EngineState {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            last_scheduled: now,
            board: Vec::with_capacity(BOARD_ROWS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.board.is_empty()
    }

    /// Current rows as renderer input.
    pub fn lines(&self) -> Vec<BoardLine> {
        self.board.iter().cloned().map(BoardLine::from).collect()
    }
}

// ── TimetableEngine ───────────────────────────────────────────────────────────

/// Generates, ages and refills fantasy departures.
pub struct TimetableEngine<C, R> {
    clock: C,
    rng: R,
    eta: EtaSimulator,
    picker: DestinationPicker,
    platforms: Vec<String>,
}

impl<C: Clock, R: Rng> TimetableEngine<C, R> {
    pub fn new(config: &FantasyConfig, clock: C, rng: R) -> Self {
        Self {
            clock,
            rng,
            eta: EtaSimulator::new(config),
            picker: DestinationPicker::new(config),
            platforms: config.platforms.iter().map(u32::to_string).collect(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// A fresh, empty state anchored at the current time.
    pub fn initial_state(&self) -> EngineState {
        EngineState::new(self.clock.now())
    }

    /// Throw the board away and build a new one starting from now.
    pub fn rebuild(&mut self, state: &mut EngineState) -> Result<(), TimetableError> {
        state.board.clear();
        state.last_scheduled = self.clock.now();
        self.fill(state)?;

        info!(
            first = %state.board[0].text(),
            rows = state.board.len(),
            "Timetable rebuilt"
        );
        Ok(())
    }

    /// Remove departed trains, then top the board back up.
    ///
    /// Returns the number of rows removed.  Calling it again without the
    /// clock moving removes and adds nothing.
    pub fn age_and_refill(&mut self, state: &mut EngineState) -> Result<usize, TimetableError> {
        let now = self.clock.now();

        let before = state.board.len();
        state.board.retain(|row| !row.has_departed(now));
        let removed = before - state.board.len();
        if removed > 0 {
            debug!(removed, remaining = state.board.len(), "Departed trains removed");
        }

        if state.board.len() < BOARD_ROWS && state.last_scheduled < now {
            debug!(
                last_scheduled = %state.last_scheduled,
                now = %now,
                "Timetable anchor behind the clock, moving it to now"
            );
            state.last_scheduled = now;
        }

        self.fill(state)?;
        Ok(removed)
    }

    /// Append trains after `state.last_scheduled` until the board is full.
    fn fill(&mut self, state: &mut EngineState) -> Result<(), TimetableError> {
        while state.board.len() < BOARD_ROWS {
            let gap = self.rng.gen_range(MIN_GAP_MINUTES..=MAX_GAP_MINUTES);
            let scheduled = state.last_scheduled + Duration::minutes(gap);

            let status = self.eta.compute_status(scheduled, &mut self.rng);
            let platform = self
                .platforms
                .choose(&mut self.rng)
                .cloned()
                .ok_or(TimetableError::EmptyPlatformPool)?;
            let pick = self.picker.pick(&state.board, &mut self.rng)?;
            let platform = pick.platform_override.unwrap_or(platform);

            let row = DepartureRow::new(Some(scheduled), &pick.destination, platform, status);
            debug!(row = %row.text(), "Train added");

            state.board.push(row);
            state.last_scheduled = scheduled;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Status;
    use crate::clock::ManualClock;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    // ── Test helpers ──────────────────────────────────────────────────────────

    fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn pool_config(pool: &[&str], magic: u8) -> FantasyConfig {
        FantasyConfig {
            destinations: pool.iter().map(|s| s.to_string()).collect(),
            platforms: vec![1, 2, 3],
            magic_percent: magic,
            ..Default::default()
        }
    }

    fn engine<'a>(
        config: &FantasyConfig,
        clock: &'a ManualClock,
        seed: u64,
    ) -> TimetableEngine<&'a ManualClock, ChaCha8Rng> {
        TimetableEngine::new(config, clock, ChaCha8Rng::seed_from_u64(seed))
    }

    fn assert_statuses_valid(state: &EngineState, max_minutes: i64) {
        for row in &state.board {
            let scheduled = row.scheduled.expect("fantasy rows always have a time");
            match &row.status {
                Status::OnTime => {}
                Status::Expected(eta) => {
                    assert!(*eta > scheduled, "delay must be after schedule: {}", row);
                    assert!(*eta - scheduled <= Duration::minutes(max_minutes - 1));
                }
                other => panic!("unexpected status {other:?}"),
            }
        }
    }

    fn assert_no_duplicates(state: &EngineState, magic: &str) {
        let mut seen = HashSet::new();
        for row in state.board.iter().filter(|r| r.destination != magic) {
            assert!(seen.insert(row.destination.clone()), "duplicate {}", row.destination);
        }
    }

    // ── rebuild ───────────────────────────────────────────────────────────────

    #[test]
    fn rebuild_fills_three_rows_in_increasing_order() {
        let clock = ManualClock::new(at(1, 12, 0, 0));
        let config = FantasyConfig::default();
        let mut eng = engine(&config, &clock, 1);
        let mut state = eng.initial_state();

        eng.rebuild(&mut state).unwrap();

        assert_eq!(state.board.len(), BOARD_ROWS);
        let times: Vec<_> = state.board.iter().map(|r| r.scheduled.unwrap()).collect();
        let mut prev = at(1, 12, 0, 0);
        for t in &times {
            let gap = *t - prev;
            assert!(gap == Duration::minutes(2) || gap == Duration::minutes(3));
            prev = *t;
        }
        assert_eq!(state.last_scheduled, *times.last().unwrap());
        assert_statuses_valid(&state, 4);
        assert_no_duplicates(&state, "Hogwarts");
    }

    #[test]
    fn rebuild_discards_previous_board() {
        let clock = ManualClock::new(at(1, 12, 0, 0));
        let config = FantasyConfig::default();
        let mut eng = engine(&config, &clock, 2);
        let mut state = eng.initial_state();
        eng.rebuild(&mut state).unwrap();

        clock.advance(Duration::hours(2));
        eng.rebuild(&mut state).unwrap();

        assert_eq!(state.board.len(), BOARD_ROWS);
        assert!(state.board[0].scheduled.unwrap() > at(1, 14, 0, 0));
    }

    // ── age_and_refill ────────────────────────────────────────────────────────

    #[test]
    fn age_and_refill_removes_departed_and_continues_from_anchor() {
        let clock = ManualClock::new(at(1, 12, 0, 0));
        let config = FantasyConfig {
            late_train_percent: 100, // never late under the default rule
            ..Default::default()
        };
        let mut eng = engine(&config, &clock, 3);
        let mut state = eng.initial_state();
        eng.rebuild(&mut state).unwrap();

        let first = state.board[0].scheduled.unwrap();
        let anchor = state.last_scheduled;
        clock.set(first + Duration::seconds(61));

        let removed = eng.age_and_refill(&mut state).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(state.board.len(), BOARD_ROWS);
        let newest = state.board[2].scheduled.unwrap();
        let gap = newest - anchor;
        assert!(gap == Duration::minutes(2) || gap == Duration::minutes(3));
        assert!(state.board.iter().all(|r| !r.has_departed(clock.now())));
    }

    #[test]
    fn age_and_refill_twice_without_time_passing_is_a_no_op() {
        let clock = ManualClock::new(at(1, 12, 0, 0));
        let config = FantasyConfig::default();
        let mut eng = engine(&config, &clock, 4);
        let mut state = eng.initial_state();
        eng.rebuild(&mut state).unwrap();

        clock.advance(Duration::minutes(4));
        eng.age_and_refill(&mut state).unwrap();
        let snapshot = state.clone();

        assert_eq!(eng.age_and_refill(&mut state).unwrap(), 0);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn delayed_train_stays_until_its_expected_time() {
        let clock = ManualClock::new(at(1, 12, 0, 0));
        let config = FantasyConfig::default();
        let mut eng = engine(&config, &clock, 5);
        let mut state = EngineState::new(at(1, 12, 1, 0));
        state.board.push(DepartureRow::new(
            Some(at(1, 12, 0, 0)),
            "Stud City",
            "1",
            Status::Expected(at(1, 12, 3, 0)),
        ));

        clock.set(at(1, 12, 2, 0));
        assert_eq!(eng.age_and_refill(&mut state).unwrap(), 0);
        assert_eq!(state.board[0].destination, "Stud City");

        clock.set(at(1, 12, 3, 1));
        assert_eq!(eng.age_and_refill(&mut state).unwrap(), 1);
        assert!(state.board.iter().all(|r| r.destination != "Stud City"));
    }

    #[test]
    fn late_evening_row_departs_after_midnight() {
        let clock = ManualClock::new(at(2, 0, 5, 0));
        let config = FantasyConfig::default();
        let mut eng = engine(&config, &clock, 6);
        let mut state = EngineState::new(at(1, 23, 58, 0));
        state.board.push(DepartureRow::new(
            Some(at(1, 23, 58, 0)),
            "Brickston",
            "2",
            Status::OnTime,
        ));

        assert_eq!(eng.age_and_refill(&mut state).unwrap(), 1);
        assert_eq!(state.board.len(), BOARD_ROWS);
        assert!(state.board.iter().all(|r| r.scheduled.unwrap() > at(2, 0, 5, 0)));
    }

    #[test]
    fn just_after_midnight_row_survives_late_evening() {
        let clock = ManualClock::new(at(1, 23, 59, 0));
        let config = FantasyConfig::default();
        let mut eng = engine(&config, &clock, 7);
        let mut state = eng.initial_state();
        eng.rebuild(&mut state).unwrap();

        // every generated train lies after midnight-adjacent now
        assert!(state.board.iter().any(|r| r.scheduled.unwrap() >= at(2, 0, 0, 0)));
        assert_eq!(eng.age_and_refill(&mut state).unwrap(), 0);
    }

    #[test]
    fn anchor_behind_clock_is_moved_to_now() {
        let clock = ManualClock::new(at(1, 12, 0, 0));
        let config = FantasyConfig::default();
        let mut eng = engine(&config, &clock, 8);
        let mut state = eng.initial_state();
        eng.rebuild(&mut state).unwrap();

        clock.advance(Duration::hours(3));
        assert_eq!(eng.age_and_refill(&mut state).unwrap(), BOARD_ROWS);
        assert_eq!(state.board.len(), BOARD_ROWS);
        assert!(state.board.iter().all(|r| !r.has_departed(clock.now())));
    }

    // ── Long-running invariants ───────────────────────────────────────────────

    #[test]
    fn invariants_hold_over_a_simulated_day() {
        let clock = ManualClock::new(at(1, 0, 0, 0));
        let config = FantasyConfig::default();
        let mut eng = engine(&config, &clock, 9);
        let mut state = eng.initial_state();
        eng.rebuild(&mut state).unwrap();

        // six-second refresh cadence for 24 hours
        for _ in 0..(24 * 60 * 10) {
            clock.advance(Duration::seconds(6));
            eng.age_and_refill(&mut state).unwrap();

            assert_eq!(state.board.len(), BOARD_ROWS);
            assert!(state.board.iter().all(|r| !r.has_departed(clock.now())));
            assert!(state
                .board
                .windows(2)
                .all(|w| w[0].scheduled < w[1].scheduled));
            assert_statuses_valid(&state, 4);
            assert_no_duplicates(&state, "Hogwarts");
        }
    }

    // ── Magic destination ─────────────────────────────────────────────────────

    #[test]
    fn zero_magic_never_shows_hogwarts() {
        let clock = ManualClock::new(at(1, 12, 0, 0));
        let config = FantasyConfig {
            late_train_percent: 0,
            ..pool_config(&["A", "B", "C"], 0)
        };
        let mut eng = engine(&config, &clock, 10);
        let mut state = eng.initial_state();
        for _ in 0..200 {
            eng.rebuild(&mut state).unwrap();
            for row in &state.board {
                assert!(!row.text().contains("Hogwarts"));
                assert!(!row.text().contains("9 3/4"));
            }
            assert_no_duplicates(&state, "Hogwarts");
        }
    }

    #[test]
    fn full_magic_sends_every_train_to_hogwarts() {
        let clock = ManualClock::new(at(1, 12, 0, 0));
        let config = pool_config(&["A", "B", "C"], 100);
        let mut eng = engine(&config, &clock, 11);
        let mut state = eng.initial_state();
        eng.rebuild(&mut state).unwrap();

        for row in &state.board {
            assert_eq!(row.destination, "Hogwarts");
            assert_eq!(row.platform, "9 3/4");
        }
    }

    #[test]
    fn ordinary_rows_use_pool_platforms() {
        let clock = ManualClock::new(at(1, 12, 0, 0));
        let config = pool_config(&["A", "B", "C"], 0);
        let mut eng = engine(&config, &clock, 12);
        let mut state = eng.initial_state();
        eng.rebuild(&mut state).unwrap();

        for row in &state.board {
            assert!(["1", "2", "3"].contains(&row.platform.as_str()));
        }
    }

    // ── Errors ────────────────────────────────────────────────────────────────

    #[test]
    fn undersized_pool_with_dedup_reports_exhaustion() {
        let clock = ManualClock::new(at(1, 12, 0, 0));
        let config = pool_config(&["A", "B"], 0);
        let mut eng = engine(&config, &clock, 13);
        let mut state = eng.initial_state();

        let err = eng.rebuild(&mut state).unwrap_err();
        assert!(matches!(err, TimetableError::DestinationPoolExhausted { .. }));
    }

    #[test]
    fn empty_platform_pool_is_an_error() {
        let clock = ManualClock::new(at(1, 12, 0, 0));
        let config = FantasyConfig {
            platforms: vec![],
            ..Default::default()
        };
        let mut eng = engine(&config, &clock, 14);
        let mut state = eng.initial_state();
        assert_eq!(
            eng.rebuild(&mut state).unwrap_err(),
            TimetableError::EmptyPlatformPool
        );
    }
}
