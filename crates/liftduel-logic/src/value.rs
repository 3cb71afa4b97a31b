//! Value model: what a passenger is worth and how long a trip takes.
//!
//! A delivered passenger scores by floors travelled. Rival passengers are
//! weighted double: carrying them both scores for us and denies the rival.

use crate::constants::{building, scoring, timing};
use crate::model::{Elevator, Fleet, Floor, Passenger, Tick};
use crate::predictor::ExpectedPassenger;
use crate::routes::RouteTracker;

/// Value per floor travelled for a passenger of `fleet`.
pub fn fleet_weight(fleet: Fleet, own: Fleet) -> f64 {
    if fleet == own {
        scoring::OWN_WEIGHT
    } else {
        scoring::RIVAL_WEIGHT
    }
}

/// Worth of a passenger whose trip is known.
pub fn passenger_value(passenger: &Passenger, own: Fleet) -> f64 {
    fleet_weight(passenger.fleet, own) * (passenger.dest_floor - passenger.from_floor).abs() as f64
}

/// Worth of a predicted passenger, using the route history when it
/// knows the next floor and a blended estimate otherwise.
pub fn expected_passenger_value(
    expected: &ExpectedPassenger,
    own: Fleet,
    routes: &RouteTracker,
) -> f64 {
    let travel = match routes.predict_next_floor(expected.id) {
        Some(dest) => (dest - expected.floor).abs() as f64,
        None => {
            let home = first_floor_probability(routes.visited(expected.id));
            let to_ground = (expected.floor - building::FIRST_FLOOR) as f64;
            home * to_ground + (1.0 - home) * average_travel(expected.floor)
        }
    };
    fleet_weight(expected.fleet, own) * travel
}

/// Chance that a passenger with `visited` legs behind it heads home next.
pub fn first_floor_probability(visited: u32) -> f64 {
    if visited >= building::TERMINAL_LEG {
        return 1.0;
    }
    1.0 / (building::TERMINAL_LEG + 1 - visited) as f64
}

/// Typical trip length from `floor` to an upper floor.
pub fn average_travel(floor: Floor) -> f64 {
    let total: Floor = (building::FIRST_FLOOR + 1..=building::TOP_FLOOR)
        .filter(|&dest| dest != floor)
        .map(|dest| (dest - floor).abs())
        .sum();
    total as f64 / scoring::AVERAGE_TRAVEL_DIVISOR
}

/// Ticks for `elevator` to reach `target` from where it is now.
///
/// Descent runs at the empty-car rate. Ascent slows by every rider's
/// weight factor, and by a further 10% once more than ten are aboard.
pub fn travel_ticks(elevator: &Elevator, target: Floor) -> Tick {
    let per_floor = timing::TICKS_PER_FLOOR as f64;
    if elevator.floor > target {
        return (per_floor * (elevator.y - target as f64)).ceil().max(0.0) as Tick;
    }
    let mut loaded = per_floor;
    for rider in &elevator.passengers {
        loaded *= rider.weight;
    }
    if elevator.passengers.len() > building::HEAVY_LOAD {
        loaded *= building::HEAVY_LOAD_PENALTY;
    }
    (loaded * (target as f64 - elevator.y)).max(0.0) as Tick
}
