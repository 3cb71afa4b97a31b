//! Game constants: timing, building geometry, value weights.
//!
//! All timings are in simulation ticks. These mirror the rules of the
//! external game engine and are not meant to be tuned per match; tunable
//! thresholds live in [`crate::config::ControllerConfig`].

/// Tick counts for door, walking and travel phases.
pub mod timing {
    use crate::model::Tick;

    /// Doors take this long to open, and again to close.
    pub const DOORS_TIME: Tick = 100;
    /// A rider needs this long to step out once the doors are open.
    pub const TICKS_TO_EXIT: Tick = 40;
    /// Extra grace before a passenger walking to a rival elevator may be called away.
    pub const TICKS_TO_CALL_ENEMY: Tick = 40;
    /// Minimum dwell with doors open before an elevator may leave.
    pub const TICKS_TO_STAY_OPEN: Tick = 40;
    /// Time a passenger spends away from the shafts between two legs.
    pub const WALKING_TIME: Tick = 500;
    /// Patience of a freshly appeared passenger.
    pub const TIME_TO_AWAY: Tick = 500;
    /// Vertical speed of an empty elevator.
    pub const TICKS_PER_FLOOR: Tick = 50;
    /// Stairs, per floor climbed.
    pub const STAIRS_UP_PER_FLOOR: Tick = 200;
    /// Stairs, per floor descended.
    pub const STAIRS_DOWN_PER_FLOOR: Tick = 100;
    /// Lateral walking speed, in x units per tick.
    pub const HORIZONTAL_SPEED: i32 = 2;
    /// Length of a match.
    pub const MATCH_LENGTH: Tick = 7200;
    /// Plans finishing this close to the end of the match are worthless.
    pub const END_MARGIN: Tick = 10;
    /// Predictions older than this are discarded.
    pub const STALE_PREDICTION_TICKS: Tick = 5;
    /// A passenger must still be around this long after we arrive.
    pub const PATIENCE_MARGIN: Tick = 100;
}

/// Building layout and elevator limits.
pub mod building {
    use crate::model::Floor;

    pub const FIRST_FLOOR: Floor = 1;
    pub const TOP_FLOOR: Floor = 9;
    /// Hard rider limit per elevator.
    pub const CAPACITY: usize = 20;
    /// Above this many riders ascent slows down further.
    pub const HEAVY_LOAD: usize = 10;
    pub const HEAVY_LOAD_PENALTY: f64 = 1.1;
    /// Lateral offset of the innermost shaft pair from the building center.
    pub const FIRST_ELEVATOR_OFFSET: i32 = 60;
    /// Lateral spacing between neighbouring shaft pairs.
    pub const ELEVATOR_SPACING: i32 = 80;
    /// After this many legs a passenger's next trip is home to the ground floor.
    pub const TERMINAL_LEG: u32 = 5;
}

/// Weights used by the value model and floor scoring.
pub mod scoring {
    /// Value per floor for a passenger spawned by our own fleet.
    pub const OWN_WEIGHT: f64 = 10.0;
    /// Value per floor for a rival passenger.
    pub const RIVAL_WEIGHT: f64 = 20.0;
    /// Multiplier on riders that would get off at the candidate floor.
    pub const EXIT_BONUS: f64 = 2.0;
    /// Per-floor linear decay of a floor's score.
    pub const DISTANCE_DECAY: f64 = 0.07;
    /// Weight on the ride time in the end-of-match feasibility check.
    /// Tuned from match results; keep at 1.2.
    pub const TRIP_TIME_WEIGHT: f64 = 1.2;
    /// Divisor of the summed trip lengths in the average trip estimate.
    /// Tuned from match results; intentionally not the number of floors summed.
    pub const AVERAGE_TRAVEL_DIVISOR: f64 = 9.0;
}
