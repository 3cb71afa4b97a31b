//! Elevator dispatch logic for LiftDuel.
//!
//! This crate contains the decision core of a controller that competes
//! with a rival fleet in the same building. It is independent of any game
//! engine or transport: each tick takes a plain [`model::TickSnapshot`]
//! and returns [`dispatch::TickDecisions`], making every rule
//! unit-testable and replayable from the headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Thresholds, opening schedule, per-shaft lane table |
//! | [`constants`] | Simulation timing, building and scoring constants |
//! | [`dispatch`] | Per-tick controller, claim eligibility, decision write-back |
//! | [`evaluator`] | Floor scoring against contesting elevators |
//! | [`model`] | Passenger, elevator and tick snapshot records |
//! | [`predictor`] | Expected passenger arrivals from observed transitions |
//! | [`replay`] | Versioned bincode recording of tick snapshots |
//! | [`routes`] | Per-passenger destination history and twin prediction |
//! | [`value`] | Passenger worth and elevator travel time |

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod evaluator;
pub mod model;
pub mod predictor;
pub mod replay;
pub mod routes;
pub mod value;
