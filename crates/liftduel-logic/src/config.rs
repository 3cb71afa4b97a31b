//! Controller configuration: thresholds, opening schedule, lane table.
//!
//! The lane table describes the building's fixed shaft topology: where each
//! elevator sits laterally and which trips it accepts from the ground floor
//! during the early game. Everything here has a `Default` matching the
//! standard building, and the whole struct round-trips through serde so the
//! harness can load it from JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{building, timing};
use crate::model::{ElevatorId, Floor, Tick};

/// Early-game role of a shaft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneRole {
    /// Inner shafts reserved for the longest trips.
    LongHaul,
    Standard,
    /// Outer shafts that may also take shorter hops.
    Express,
}

/// One shaft of the building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub elevator_id: ElevatorId,
    /// Lateral position; the building center is 0.
    pub x: i32,
    pub role: LaneRole,
    /// Lowest destination accepted from the ground floor in the early game.
    pub early_min_destination: Floor,
}

impl Lane {
    /// Lane derived from the standard shaft arithmetic: pairs of shafts
    /// spread outwards from the center, odd ids on the left.
    pub fn standard(elevator_id: ElevatorId) -> Self {
        let pair = elevator_id.saturating_sub(1) as i32 / 2;
        let offset = building::FIRST_ELEVATOR_OFFSET + pair * building::ELEVATOR_SPACING;
        let x = if elevator_id % 2 == 1 {
            -offset
        } else {
            offset
        };
        Self {
            elevator_id,
            x,
            role: LaneRole::Standard,
            early_min_destination: 5,
        }
    }

    fn with_role(elevator_id: ElevatorId, role: LaneRole, early_min_destination: Floor) -> Self {
        Self {
            role,
            early_min_destination,
            ..Self::standard(elevator_id)
        }
    }

    pub fn distance_from_center(&self) -> i32 {
        self.x.abs()
    }
}

/// Opening stream of ground-floor arrivals known in advance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningSchedule {
    /// One pair of passengers appears every `interval` ticks...
    pub interval: Tick,
    /// ...starting at tick 1 and stopping before this tick.
    pub until: Tick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub lowest_floor: Floor,
    pub highest_floor: Floor,
    pub match_length: Tick,
    /// Below this tick, ground-floor boarding is restricted per lane.
    pub early_game_until: Tick,
    /// A floor whose waiting passengers are worth less than this is left.
    pub low_floor_value: f64,
    /// Predicted arrivals worth at least this keep the doors open.
    pub expected_value_threshold: f64,
    /// Predictions due within this many ticks count as imminent.
    pub imminent_window: Tick,
    /// Seed for provisional departure floors.
    pub rng_seed: u64,
    pub opening_schedule: OpeningSchedule,
    pub lanes: Vec<Lane>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            lowest_floor: building::FIRST_FLOOR,
            highest_floor: building::TOP_FLOOR,
            match_length: timing::MATCH_LENGTH,
            early_game_until: 2000,
            low_floor_value: 100.0,
            expected_value_threshold: 150.0,
            imminent_window: 200,
            rng_seed: 123,
            opening_schedule: OpeningSchedule {
                interval: 20,
                until: 2000,
            },
            lanes: vec![
                Lane::with_role(1, LaneRole::LongHaul, 8),
                Lane::with_role(2, LaneRole::LongHaul, 8),
                Lane::with_role(3, LaneRole::LongHaul, 7),
                Lane::with_role(4, LaneRole::LongHaul, 7),
                Lane::with_role(5, LaneRole::Standard, 5),
                Lane::with_role(6, LaneRole::Standard, 5),
                Lane::with_role(7, LaneRole::Express, 4),
                Lane::with_role(8, LaneRole::Express, 4),
            ],
        }
    }
}

impl ControllerConfig {
    /// Lane for an elevator; unknown ids get the standard derivation.
    pub fn lane(&self, elevator_id: ElevatorId) -> Lane {
        self.lanes
            .iter()
            .find(|l| l.elevator_id == elevator_id)
            .cloned()
            .unwrap_or_else(|| Lane::standard(elevator_id))
    }

    pub fn elevator_x(&self, elevator_id: ElevatorId) -> i32 {
        self.lane(elevator_id).x
    }

    pub fn distance_from_center(&self, elevator_id: ElevatorId) -> i32 {
        self.lane(elevator_id).distance_from_center()
    }

    /// All floors, lowest first.
    pub fn floors(&self) -> impl Iterator<Item = Floor> {
        self.lowest_floor..=self.highest_floor
    }

    pub fn contains_floor(&self, floor: Floor) -> bool {
        (self.lowest_floor..=self.highest_floor).contains(&floor)
    }

    /// Last tick at which a plan still pays off.
    pub fn planning_horizon(&self) -> Tick {
        self.match_length - timing::END_MARGIN
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lowest_floor >= self.highest_floor {
            return Err(ConfigError::FloorRange {
                lowest: self.lowest_floor,
                highest: self.highest_floor,
            });
        }
        if self.opening_schedule.interval <= 0 {
            return Err(ConfigError::ScheduleInterval(self.opening_schedule.interval));
        }
        for (i, lane) in self.lanes.iter().enumerate() {
            if self.lanes[..i]
                .iter()
                .any(|other| other.elevator_id == lane.elevator_id)
            {
                return Err(ConfigError::DuplicateLane(lane.elevator_id));
            }
            if !self.contains_floor(lane.early_min_destination) {
                return Err(ConfigError::LaneFloor {
                    elevator_id: lane.elevator_id,
                    floor: lane.early_min_destination,
                });
            }
        }
        Ok(())
    }
}

/// Errors found when validating a [`ControllerConfig`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    FloorRange { lowest: Floor, highest: Floor },
    ScheduleInterval(Tick),
    DuplicateLane(ElevatorId),
    LaneFloor {
        elevator_id: ElevatorId,
        floor: Floor,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FloorRange { lowest, highest } => {
                write!(f, "Invalid floor range {}..={}", lowest, highest)
            }
            ConfigError::ScheduleInterval(i) => {
                write!(f, "Opening schedule interval must be positive, got {}", i)
            }
            ConfigError::DuplicateLane(id) => write!(f, "Lane for elevator {} listed twice", id),
            ConfigError::LaneFloor { elevator_id, floor } => write!(
                f,
                "Lane {} early minimum floor {} is outside the building",
                elevator_id, floor
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
