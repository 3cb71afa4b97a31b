//! Arrival Predictor: passengers we expect to appear before they do.
//!
//! Passengers vanish between legs: they ride to a floor and walk off, or
//! take the stairs. Both transitions are visible a tick before the
//! passenger disappears, and the walking times are fixed, so we can
//! register an [`ExpectedPassenger`] at the floor and tick where the
//! passenger will show up again. Predictions are reconciled against real
//! passengers as they appear and pruned once stale.
//!
//! Transition detection compares the previous tick's [`Observation`] with
//! the current snapshot ([`Transitions::detect`]).

use std::collections::HashSet;
use std::fmt;

use crate::config::OpeningSchedule;
use crate::constants::{building, timing};
use crate::model::{
    Elevator, ElevatorId, ElevatorState, Fleet, Floor, Passenger, PassengerId, PassengerState,
    Tick,
};
use crate::routes::RouteTracker;
use crate::value::travel_ticks;

/// Why a passenger is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalOrigin {
    /// Rode an elevator and is walking off at its destination.
    ElevatorExit,
    /// Took the stairs.
    StairWalk,
    /// Part of the known ground-floor opening stream.
    OpeningSchedule,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedPassenger {
    pub id: PassengerId,
    pub fleet: Fleet,
    pub floor: Floor,
    pub tick: Tick,
    pub origin: ArrivalOrigin,
}

impl ExpectedPassenger {
    fn same_slot(&self, other: &ExpectedPassenger) -> bool {
        self.id == other.id
            && self.tick == other.tick
            && self.floor == other.floor
            && self.fleet == other.fleet
    }
}

impl fmt::Display for ExpectedPassenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.origin {
            ArrivalOrigin::ElevatorExit => 'e',
            ArrivalOrigin::StairWalk => 's',
            ArrivalOrigin::OpeningSchedule => 'i',
        };
        write!(
            f,
            "id={}, t={}, f={}, {:?}, k={}",
            self.id, self.tick, self.floor, self.fleet, kind
        )
    }
}

/// What one tick looked like, kept for comparison with the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    /// Every passenger id present, riders included.
    pub seen: HashSet<PassengerId>,
    /// Passengers that were not walking the stairs.
    pub not_walking: HashSet<PassengerId>,
    /// Elevators standing in the waiting state.
    pub waiting_elevators: HashSet<ElevatorId>,
}

impl Observation {
    pub fn capture(passengers: &[&Passenger], elevators: &[Elevator]) -> Self {
        Self {
            seen: passengers.iter().map(|p| p.id).collect(),
            not_walking: passengers
                .iter()
                .filter(|p| p.state != PassengerState::MovingToFloor)
                .map(|p| p.id)
                .collect(),
            waiting_elevators: elevators
                .iter()
                .filter(|e| e.state == ElevatorState::Waiting)
                .map(|e| e.id)
                .collect(),
        }
    }

    pub fn is_new_passenger(&self, passenger: &Passenger) -> bool {
        !self.seen.contains(&passenger.id)
    }

    /// Passenger took to the stairs since this observation.
    pub fn started_walking(&self, passenger: &Passenger) -> bool {
        self.not_walking.contains(&passenger.id) && passenger.state == PassengerState::MovingToFloor
    }

    /// Elevator was waiting for a destination at this observation.
    pub fn was_waiting(&self, elevator: &Elevator) -> bool {
        self.waiting_elevators.contains(&elevator.id)
    }
}

/// Changes between the previous observation and the current tick.
#[derive(Debug, Default)]
pub struct Transitions<'a> {
    /// Elevators that were waiting and have now committed to a floor.
    pub departing: Vec<&'a Elevator>,
    pub started_walking: Vec<&'a Passenger>,
    pub appeared: Vec<&'a Passenger>,
}

impl<'a> Transitions<'a> {
    pub fn detect(
        previous: &Observation,
        passengers: &[&'a Passenger],
        elevators: &'a [Elevator],
    ) -> Self {
        Self {
            departing: elevators.iter().filter(|e| previous.was_waiting(e)).collect(),
            started_walking: passengers
                .iter()
                .copied()
                .filter(|p| previous.started_walking(p))
                .collect(),
            appeared: passengers
                .iter()
                .copied()
                .filter(|p| previous.is_new_passenger(p))
                .collect(),
        }
    }
}

/// Every passenger in the snapshot once: the fleet lists first, then any
/// rider not also listed there.
pub fn roster<'a>(passengers: &'a [Passenger], elevators: &'a [Elevator]) -> Vec<&'a Passenger> {
    let mut ids: HashSet<PassengerId> = passengers.iter().map(|p| p.id).collect();
    let mut roster: Vec<&Passenger> = passengers.iter().collect();
    for rider in elevators.iter().flat_map(|e| e.passengers.iter()) {
        if ids.insert(rider.id) {
            roster.push(rider);
        }
    }
    roster
}

/// Ticks to walk the stairs from `from` to `to`; climbing is slower.
pub fn stair_ticks(from: Floor, to: Floor) -> Tick {
    let per_floor = if to > from {
        timing::STAIRS_UP_PER_FLOOR
    } else {
        timing::STAIRS_DOWN_PER_FLOOR
    };
    per_floor * (to - from).abs()
}

#[derive(Debug, Clone, Default)]
pub struct ArrivalPredictor {
    expected: Vec<ExpectedPassenger>,
    previous: Observation,
}

impl ArrivalPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expected(&self) -> &[ExpectedPassenger] {
        &self.expected
    }

    pub fn expected_at(&self, floor: Floor) -> impl Iterator<Item = &ExpectedPassenger> {
        self.expected.iter().filter(move |e| e.floor == floor)
    }

    pub fn len(&self) -> usize {
        self.expected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    pub fn previous(&self) -> &Observation {
        &self.previous
    }

    /// Register a prediction. Returns `false` for a duplicate of a live one.
    pub fn expect(&mut self, expected: ExpectedPassenger) -> bool {
        if self.expected.iter().any(|e| e.same_slot(&expected)) {
            return false;
        }
        log::trace!("expect {}", expected);
        self.expected.push(expected);
        true
    }

    /// Register the opening stream: every `interval` ticks one passenger
    /// per fleet appears on the ground floor, ids handed out pairwise.
    pub fn schedule_opening(
        &mut self,
        schedule: &OpeningSchedule,
        own: Fleet,
        routes: &mut RouteTracker,
    ) {
        if schedule.interval <= 0 {
            log::warn!("opening schedule disabled: interval {}", schedule.interval);
            return;
        }
        let ticks = (1..schedule.until).step_by(schedule.interval as usize);
        for (k, tick) in ticks.enumerate() {
            let base = k as PassengerId * 2;
            for fleet in [own, own.rival()] {
                self.expect(ExpectedPassenger {
                    id: base + fleet.id_offset(),
                    fleet,
                    floor: building::FIRST_FLOOR,
                    tick,
                    origin: ArrivalOrigin::OpeningSchedule,
                });
            }
            routes.seed(base + 1);
            routes.seed(base + 2);
        }
        log::debug!(
            "opening schedule: {} expected arrivals",
            self.expected.len()
        );
    }

    /// Fold one tick of observations into the prediction set.
    pub fn update(
        &mut self,
        tick: Tick,
        passengers: &[Passenger],
        elevators: &[Elevator],
        routes: &mut RouteTracker,
    ) {
        let roster = roster(passengers, elevators);
        let transitions = Transitions::detect(&self.previous, &roster, elevators);

        for elevator in &transitions.departing {
            let target = elevator.next_floor;
            for rider in elevator.passengers.iter().filter(|p| p.dest_floor == target) {
                routes.mark_visited(rider.id);
                if rider.dest_floor != building::FIRST_FLOOR {
                    let arrive = tick
                        + travel_ticks(elevator, target)
                        + timing::DOORS_TIME
                        + timing::TICKS_TO_EXIT
                        + timing::WALKING_TIME
                        + 1;
                    self.expect(ExpectedPassenger {
                        id: rider.id,
                        fleet: rider.fleet,
                        floor: target,
                        tick: arrive,
                        origin: ArrivalOrigin::ElevatorExit,
                    });
                }
            }
        }

        for walker in &transitions.started_walking {
            routes.mark_visited(walker.id);
            if walker.dest_floor != building::FIRST_FLOOR {
                let arrive = tick
                    + stair_ticks(walker.from_floor, walker.dest_floor)
                    + timing::WALKING_TIME
                    + 1;
                self.expect(ExpectedPassenger {
                    id: walker.id,
                    fleet: walker.fleet,
                    floor: walker.dest_floor,
                    tick: arrive,
                    origin: ArrivalOrigin::StairWalk,
                });
            }
        }

        for passenger in &transitions.appeared {
            // Only predictions already due; an early arrival leaves later ones.
            self.expected.retain(|e| {
                !(e.id == passenger.id
                    && e.fleet == passenger.fleet
                    && e.floor == passenger.floor
                    && e.tick <= tick)
            });
            routes.record_leg(passenger.id, passenger.dest_floor);
        }

        self.expected
            .retain(|e| e.tick + timing::STALE_PREDICTION_TICKS > tick);
        self.previous = Observation::capture(&roster, elevators);
        log::trace!("tick {}: {} expected passengers", tick, self.expected.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fleet::{First, Second};

    fn predictor_with_schedule() -> (ArrivalPredictor, RouteTracker) {
        let mut predictor = ArrivalPredictor::new();
        let mut routes = RouteTracker::new();
        let schedule = OpeningSchedule {
            interval: 20,
            until: 2000,
        };
        predictor.schedule_opening(&schedule, First, &mut routes);
        (predictor, routes)
    }

    #[test]
    fn opening_schedule_pairs_fleets() {
        let (predictor, routes) = predictor_with_schedule();
        assert_eq!(predictor.len(), 200);
        assert_eq!(routes.len(), 200);
        let first: Vec<_> = predictor.expected().iter().take(2).collect();
        assert_eq!((first[0].id, first[0].fleet, first[0].tick), (1, First, 1));
        assert_eq!((first[1].id, first[1].fleet, first[1].tick), (2, Second, 1));
        assert!(predictor.expected().iter().all(|e| e.floor == 1));
    }

    #[test]
    fn opening_schedule_ids_follow_fleet_parity() {
        let mut predictor = ArrivalPredictor::new();
        let mut routes = RouteTracker::new();
        let schedule = OpeningSchedule {
            interval: 20,
            until: 50,
        };
        predictor.schedule_opening(&schedule, Second, &mut routes);
        let own: Vec<_> = predictor
            .expected()
            .iter()
            .filter(|e| e.fleet == Second)
            .map(|e| (e.id, e.tick))
            .collect();
        assert_eq!(own, vec![(2, 1), (4, 21), (6, 41)]);
    }

    #[test]
    fn duplicate_prediction_rejected() {
        let mut predictor = ArrivalPredictor::new();
        let e = ExpectedPassenger {
            id: 4,
            fleet: Second,
            floor: 6,
            tick: 900,
            origin: ArrivalOrigin::StairWalk,
        };
        assert!(predictor.expect(e.clone()));
        assert!(!predictor.expect(ExpectedPassenger {
            origin: ArrivalOrigin::ElevatorExit,
            ..e.clone()
        }));
        assert!(predictor.expect(ExpectedPassenger { tick: 901, ..e }));
        assert_eq!(predictor.len(), 2);
    }

    #[test]
    fn transitions_detect_each_kind() {
        let waiting = Elevator::new(1, First, 1);
        let mut previous = Observation::capture(&[], std::slice::from_ref(&waiting));
        let mut walker = Passenger::new(3, First, 2, 6);
        previous.seen.insert(3);
        previous.not_walking.insert(3);
        walker.state = PassengerState::MovingToFloor;
        let newcomer = Passenger::new(5, Second, 4, 1);

        let passengers = [&walker, &newcomer];
        let elevators = vec![waiting.clone()];
        let t = Transitions::detect(&previous, &passengers, &elevators);
        assert_eq!(t.departing.len(), 1);
        assert_eq!(t.started_walking.len(), 1);
        assert_eq!(t.started_walking[0].id, 3);
        assert_eq!(t.appeared.len(), 1);
        assert_eq!(t.appeared[0].id, 5);
    }

    #[test]
    fn stair_walk_predicts_reappearance() {
        let mut predictor = ArrivalPredictor::new();
        let mut routes = RouteTracker::new();
        let mut p = Passenger::new(7, First, 2, 5);
        predictor.update(10, std::slice::from_ref(&p), &[], &mut routes);

        p.state = PassengerState::MovingToFloor;
        predictor.update(11, std::slice::from_ref(&p), &[], &mut routes);

        assert_eq!(routes.visited(7), 1);
        let e = &predictor.expected()[0];
        assert_eq!(e.origin, ArrivalOrigin::StairWalk);
        assert_eq!(e.floor, 5);
        // 3 floors up at 200 per floor, then away for 500.
        assert_eq!(e.tick, 11 + 600 + 500 + 1);
    }

    #[test]
    fn walking_home_is_not_predicted() {
        let mut predictor = ArrivalPredictor::new();
        let mut routes = RouteTracker::new();
        let mut p = Passenger::new(7, First, 4, 1);
        predictor.update(10, std::slice::from_ref(&p), &[], &mut routes);
        p.state = PassengerState::MovingToFloor;
        predictor.update(11, std::slice::from_ref(&p), &[], &mut routes);
        assert_eq!(routes.visited(7), 1);
        assert!(predictor.is_empty());
    }

    #[test]
    fn departing_elevator_predicts_exits() {
        let mut predictor = ArrivalPredictor::new();
        let mut routes = RouteTracker::new();
        let rider = Passenger {
            state: PassengerState::UsingElevator,
            ..Passenger::new(9, Second, 1, 4)
        };
        let mut elevator = Elevator::new(2, First, 1);
        elevator.passengers.push(rider);
        predictor.update(100, &[], std::slice::from_ref(&elevator), &mut routes);
        assert_eq!(routes.route(9).unwrap().destinations, vec![4]);

        elevator.state = ElevatorState::Moving;
        elevator.next_floor = 4;
        predictor.update(101, &[], std::slice::from_ref(&elevator), &mut routes);

        assert_eq!(routes.visited(9), 1);
        let e = &predictor.expected()[0];
        assert_eq!(e.origin, ArrivalOrigin::ElevatorExit);
        assert_eq!(e.fleet, Second);
        // Empty car climbing 3 floors at 50 per floor.
        assert_eq!(e.tick, 101 + 150 + 100 + 40 + 500 + 1);
    }

    #[test]
    fn appearing_passenger_reconciles_prediction() {
        let (mut predictor, mut routes) = predictor_with_schedule();
        let before = predictor.len();
        let p = Passenger::new(1, First, 1, 6);
        predictor.update(1, std::slice::from_ref(&p), &[], &mut routes);
        assert_eq!(predictor.len(), before - 1);
        assert!(!predictor.expected().iter().any(|e| e.id == 1));
        assert_eq!(routes.route(1).unwrap().destinations, vec![6]);
    }

    #[test]
    fn early_appearance_keeps_future_prediction() {
        let mut predictor = ArrivalPredictor::new();
        let mut routes = RouteTracker::new();
        predictor.expect(ExpectedPassenger {
            id: 7,
            fleet: First,
            floor: 4,
            tick: 1000,
            origin: ArrivalOrigin::StairWalk,
        });
        let p = Passenger::new(7, First, 4, 2);
        predictor.update(900, std::slice::from_ref(&p), &[], &mut routes);
        assert_eq!(predictor.len(), 1);
        assert_eq!(predictor.expected()[0].tick, 1000);
        assert_eq!(routes.route(7).unwrap().destinations, vec![2]);
    }

    #[test]
    fn late_appearance_clears_due_prediction() {
        let mut predictor = ArrivalPredictor::new();
        let mut routes = RouteTracker::new();
        predictor.expect(ExpectedPassenger {
            id: 7,
            fleet: First,
            floor: 4,
            tick: 1000,
            origin: ArrivalOrigin::StairWalk,
        });
        let p = Passenger::new(7, First, 4, 2);
        predictor.update(1003, std::slice::from_ref(&p), &[], &mut routes);
        assert!(predictor.is_empty());
    }

    #[test]
    fn stale_predictions_are_pruned() {
        let mut predictor = ArrivalPredictor::new();
        let mut routes = RouteTracker::new();
        for tick in [90, 95, 96, 120] {
            predictor.expect(ExpectedPassenger {
                id: tick as PassengerId,
                fleet: First,
                floor: 3,
                tick,
                origin: ArrivalOrigin::StairWalk,
            });
        }
        predictor.update(100, &[], &[], &mut routes);
        let ticks: Vec<Tick> = predictor.expected().iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![96, 120]);
    }

    #[test]
    fn roster_adds_unlisted_riders_once() {
        let listed = Passenger::new(1, First, 1, 5);
        let mut elevator = Elevator::new(1, First, 1);
        elevator.passengers.push(listed.clone());
        elevator.passengers.push(Passenger::new(3, First, 1, 7));
        let passengers = vec![listed];
        let elevators = vec![elevator];
        let ids: Vec<PassengerId> = roster(&passengers, &elevators).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
