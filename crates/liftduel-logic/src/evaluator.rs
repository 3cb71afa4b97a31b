//! Floor Evaluator: how attractive is sending an elevator to a floor.
//!
//! For a candidate floor we estimate when the elevator would open its
//! doors there, find the other elevators (either fleet) that will already
//! be at that floor, gather the real and predicted passengers we could
//! still pick up, and score:
//!
//! ```text
//! (best pool values up to free seats + 2 × riders exiting there)
//!     × (1 − 0.07 × floors travelled)
//! ```

use std::collections::HashMap;

use crate::config::ControllerConfig;
use crate::constants::{building, scoring, timing};
use crate::model::{Elevator, ElevatorId, ElevatorState, Fleet, Floor, Passenger, Tick};
use crate::predictor::{ArrivalPredictor, ExpectedPassenger};
use crate::routes::RouteTracker;
use crate::value::{expected_passenger_value, passenger_value, travel_ticks};

/// Passengers standing on each floor, reachable by an elevator.
pub type PassengersByFloor = HashMap<Floor, Vec<Passenger>>;

pub fn bucket_by_floor(passengers: &[Passenger]) -> PassengersByFloor {
    let mut by_floor = PassengersByFloor::new();
    for p in passengers.iter().filter(|p| p.is_at_floor()) {
        by_floor.entry(p.floor).or_default().push(p.clone());
    }
    by_floor
}

/// Read-only view of one tick, shared by every evaluation in it.
pub struct EvalContext<'a> {
    pub tick: Tick,
    pub own: Fleet,
    pub config: &'a ControllerConfig,
    pub routes: &'a RouteTracker,
    pub predictor: &'a ArrivalPredictor,
    pub by_floor: &'a PassengersByFloor,
    /// Both fleets' elevators.
    pub elevators: &'a [Elevator],
}

impl<'a> EvalContext<'a> {
    pub fn waiting_at(&self, floor: Floor) -> &'a [Passenger] {
        self.by_floor.get(&floor).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn elevator(&self, id: ElevatorId) -> Option<&'a Elevator> {
        self.elevators.iter().find(|e| e.id == id)
    }

    pub fn passenger_value(&self, passenger: &Passenger) -> f64 {
        passenger_value(passenger, self.own)
    }

    pub fn expected_value(&self, expected: &ExpectedPassenger) -> f64 {
        expected_passenger_value(expected, self.own, self.routes)
    }
}

/// Another elevator that will be at the candidate floor.
#[derive(Debug, Clone)]
pub struct Contender<'a> {
    pub elevator: &'a Elevator,
    /// When its doors are (or were) open there.
    pub arrive_at: Tick,
    pub free_seats: usize,
}

/// Someone we could pick up at the candidate floor.
#[derive(Debug, Clone, Copy)]
pub enum PoolMember<'a> {
    Waiting(&'a Passenger),
    Expected(&'a ExpectedPassenger),
}

impl PoolMember<'_> {
    /// Tick the passenger is (or will be) on the floor.
    pub fn appears_at(&self, now: Tick) -> Tick {
        match self {
            PoolMember::Waiting(_) => now,
            PoolMember::Expected(e) => e.tick,
        }
    }

    /// Where the passenger will want to go, if known.
    pub fn next_floor(&self, routes: &RouteTracker) -> Option<Floor> {
        match self {
            PoolMember::Waiting(p) => Some(p.dest_floor),
            PoolMember::Expected(e) => routes.predict_next_floor(e.id),
        }
    }

    pub fn value(&self, ctx: &EvalContext) -> f64 {
        match self {
            PoolMember::Waiting(p) => ctx.passenger_value(p),
            PoolMember::Expected(e) => ctx.expected_value(e),
        }
    }
}

/// Breakdown of a floor evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorScore {
    pub floor: Floor,
    pub score: f64,
    pub arrive_at: Tick,
    pub pool_size: usize,
    pub outside_value: f64,
    /// Outside value limited to the seats we actually have.
    pub capped_outside_value: f64,
    pub exiting: usize,
    pub inside_value: f64,
}

/// Tick at which `elevator` would have its doors open at `floor`.
pub fn arrival_tick(elevator: &Elevator, floor: Floor, tick: Tick) -> Tick {
    let boarding = matches!(
        elevator.state,
        ElevatorState::Opening | ElevatorState::Filling
    );
    let dwell = if boarding {
        (timing::TICKS_TO_STAY_OPEN - elevator.time_on_floor).max(0)
    } else {
        0
    };
    let closing = if elevator.state == ElevatorState::Filling {
        timing::DOORS_TIME
    } else {
        0
    };
    tick + dwell + closing + travel_ticks(elevator, floor) + timing::DOORS_TIME
}

/// Other elevators already boarding at `floor` or heading there.
pub fn contesting_elevators<'a>(
    ctx: &EvalContext<'a>,
    elevator: &Elevator,
    floor: Floor,
) -> Vec<Contender<'a>> {
    ctx.elevators
        .iter()
        .filter(|other| other.id != elevator.id)
        .filter_map(|other| {
            let arrive_at = if other.is_boarding_at(floor) {
                ctx.tick - other.time_on_floor + timing::DOORS_TIME
            } else if other.state == ElevatorState::Moving && other.next_floor == floor {
                ctx.tick + travel_ticks(other, floor) + timing::DOORS_TIME
            } else {
                return None;
            };
            let free_seats = building::CAPACITY.saturating_sub(other.staying_past(floor));
            Some(Contender {
                elevator: other,
                arrive_at,
                free_seats,
            })
        })
        .filter(|c| c.arrive_at < ctx.config.match_length && c.free_seats > 0)
        .collect()
}

/// Passengers `elevator` can still collect at `floor` if it gets there
/// at `arrive_at`.
pub fn candidate_pool<'a>(
    ctx: &EvalContext<'a>,
    elevator: &Elevator,
    floor: Floor,
    arrive_at: Tick,
    contenders: &[Contender],
) -> Vec<PoolMember<'a>> {
    let window_end = arrive_at + timing::PATIENCE_MARGIN;
    let own_distance = ctx.config.distance_from_center(elevator.id);
    let boarding = (own_distance / timing::HORIZONTAL_SPEED).max(timing::TICKS_TO_STAY_OPEN);
    let horizon = ctx.config.planning_horizon() as f64;

    let waiting = ctx
        .waiting_at(floor)
        .iter()
        .filter(|p| ctx.tick + p.time_to_away > window_end)
        .map(PoolMember::Waiting);
    let expected = ctx
        .predictor
        .expected_at(floor)
        .filter(|e| e.tick < window_end && e.tick + timing::TIME_TO_AWAY > window_end)
        .map(PoolMember::Expected);

    waiting
        .chain(expected)
        .filter(|m| {
            let ride = m.next_floor(ctx.routes).map_or(0.0, |next| {
                (next - floor).abs() as f64
                    * timing::TICKS_PER_FLOOR as f64
                    * scoring::TRIP_TIME_WEIGHT
            });
            let done =
                (arrive_at + boarding + timing::DOORS_TIME + timing::DOORS_TIME) as f64 + ride;
            done < horizon
        })
        .filter(|m| {
            // Someone gets there first and takes them.
            let appears = m.appears_at(ctx.tick);
            !contenders
                .iter()
                .any(|c| c.arrive_at < arrive_at && appears < arrive_at)
        })
        .filter(|m| {
            // Someone closer to the center gets there before they appear.
            let appears = m.appears_at(ctx.tick);
            !contenders.iter().any(|c| {
                c.arrive_at >= arrive_at
                    && c.arrive_at < appears
                    && ctx.config.distance_from_center(c.elevator.id) < own_distance
            })
        })
        .collect()
}

/// Score sending `elevator` to `floor`.
pub fn evaluate_floor(ctx: &EvalContext, elevator: &Elevator, floor: Floor) -> FloorScore {
    let arrive_at = arrival_tick(elevator, floor, ctx.tick);
    let mut result = FloorScore {
        floor,
        arrive_at,
        ..FloorScore::default()
    };
    if arrive_at >= ctx.config.planning_horizon() {
        return result;
    }

    let contenders = contesting_elevators(ctx, elevator, floor);
    let pool = candidate_pool(ctx, elevator, floor, arrive_at, &contenders);

    let mut values: Vec<f64> = pool.iter().map(|m| m.value(ctx)).collect();
    values.sort_by(|a, b| b.total_cmp(a));
    let free_seats = building::CAPACITY.saturating_sub(elevator.staying_past(floor));

    result.pool_size = pool.len();
    result.outside_value = values.iter().sum();
    result.capped_outside_value = values.iter().take(free_seats).sum();
    result.exiting = elevator.exiting_at(floor).count();
    result.inside_value = elevator
        .exiting_at(floor)
        .map(|p| ctx.passenger_value(p))
        .sum();

    let decay = 1.0 - scoring::DISTANCE_DECAY * (floor - elevator.floor).abs() as f64;
    result.score =
        (result.capped_outside_value + scoring::EXIT_BONUS * result.inside_value) * decay;

    log::debug!(
        "evFl e{}>{} o{}!{:.0}!{:.0} i{}!{:.0} r{:.0} ar{}",
        elevator.id,
        floor,
        result.pool_size,
        result.outside_value,
        result.capped_outside_value,
        result.exiting,
        result.inside_value,
        result.score,
        result.arrive_at
    );
    result
}

/// Best floor other than the current one; ties go to the lowest floor.
pub fn choose_next_floor(ctx: &EvalContext, elevator: &Elevator) -> Option<FloorScore> {
    let mut best: Option<FloorScore> = None;
    for floor in ctx.config.floors().filter(|&f| f != elevator.floor) {
        let candidate = evaluate_floor(ctx, elevator, floor);
        if best.as_ref().map_or(true, |b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }
    best
}
