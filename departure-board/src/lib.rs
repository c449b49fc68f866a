/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Departure board – a rolling list of the next three trains.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── clock         – wall-clock source (system / manual)
//! ├── board         – DepartureRow, Status, fixed-width row text
//! ├── config/       – YAML configuration and validation
//! ├── timetable/    – fantasy timetable engine (ETA, destinations, ageing)
//! ├── live/         – OpenLDBWS SOAP client and response parser
//! ├── display       – renderer trait, terminal renderer, startup banner
//! └── runner        – tick-driven polling loop
//! ```

pub mod board;
pub mod clock;
pub mod config;
pub mod display;
pub mod live;
pub mod runner;
pub mod timetable;
