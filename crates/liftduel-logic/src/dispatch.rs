//! Dispatch Controller: the per-tick driver.
//!
//! Each tick the controller folds the snapshot into the route tracker and
//! arrival predictor, then walks its own elevators innermost first:
//!
//! | State   | Action                                                   |
//! |---------|----------------------------------------------------------|
//! | WAITING | commit the best floor from the evaluator                 |
//! | FILLING | claim passengers, or close up and head off provisionally |
//! | others  | nothing; the engine advances them                        |
//!
//! Decisions are returned as a [`TickDecisions`] value and only written
//! back to the snapshot by [`TickDecisions::apply_to`].

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::constants::{building, timing};
use crate::evaluator::{bucket_by_floor, choose_next_floor, EvalContext};
use crate::model::{
    Elevator, ElevatorId, ElevatorState, Fleet, Floor, Passenger, PassengerId, PassengerState,
    Tick, TickSnapshot,
};
use crate::predictor::ArrivalPredictor;
use crate::routes::RouteTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    /// Chosen by the floor evaluator while waiting.
    Committed,
    /// Placeholder issued while closing the doors; replaced once the
    /// elevator is waiting again.
    Provisional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorCommand {
    pub elevator: ElevatorId,
    pub floor: Floor,
    pub kind: CommandKind,
}

/// A passenger called to one of our elevators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub passenger: PassengerId,
    pub elevator: ElevatorId,
}

/// Everything decided in one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickDecisions {
    pub tick: Tick,
    pub commands: Vec<FloorCommand>,
    pub claims: Vec<Claim>,
}

impl TickDecisions {
    pub fn new(tick: Tick) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    pub fn command_for(&self, elevator: ElevatorId) -> Option<&FloorCommand> {
        self.commands.iter().find(|c| c.elevator == elevator)
    }

    pub fn claims_for(&self, elevator: ElevatorId) -> impl Iterator<Item = &Claim> {
        self.claims.iter().filter(move |c| c.elevator == elevator)
    }

    pub fn is_claimed(&self, passenger: PassengerId) -> bool {
        self.claims.iter().any(|c| c.passenger == passenger)
    }

    /// Write claims to the passengers and commands to our elevators.
    /// Re-applying the same decisions changes nothing.
    pub fn apply_to(&self, snapshot: &mut TickSnapshot) {
        for claim in &self.claims {
            let passenger = snapshot
                .my_passengers
                .iter_mut()
                .chain(snapshot.enemy_passengers.iter_mut())
                .find(|p| p.id == claim.passenger);
            match passenger {
                Some(p) => p.elevator = Some(claim.elevator),
                None => log::warn!("claim for unknown passenger {}", claim.passenger),
            }
        }
        for command in &self.commands {
            match snapshot
                .my_elevators
                .iter_mut()
                .find(|e| e.id == command.elevator)
            {
                Some(e) => e.next_floor = command.floor,
                None => log::warn!("command for unknown elevator {}", command.elevator),
            }
        }
    }
}

/// Whether `elevator` may call `passenger` this tick.
///
/// A passenger walking to a rival elevator can be poached only if it is
/// ours, or the rival has been parked long enough; in both cases we must
/// also be laterally closer to it than any stationary rival on the floor.
pub fn can_claim(ctx: &EvalContext, elevator: &Elevator, passenger: &Passenger) -> bool {
    if passenger.elevator == Some(elevator.id) {
        return false;
    }
    match passenger.state {
        PassengerState::WaitingForElevator | PassengerState::Returning => true,
        PassengerState::MovingToElevator => {
            let Some(target) = passenger.elevator.and_then(|id| ctx.elevator(id)) else {
                return false;
            };
            if target.fleet == ctx.own {
                return false;
            }
            let parked = target.time_on_floor > timing::DOORS_TIME + timing::TICKS_TO_CALL_ENEMY;
            if passenger.fleet != ctx.own && !parked {
                return false;
            }
            let ours = (passenger.x - ctx.config.elevator_x(elevator.id) as f64).abs();
            let nearest_rival = ctx
                .elevators
                .iter()
                .filter(|e| {
                    e.fleet != ctx.own
                        && e.state != ElevatorState::Moving
                        && e.floor == elevator.floor
                })
                .map(|e| (passenger.x - ctx.config.elevator_x(e.id) as f64).abs())
                .fold(f64::INFINITY, f64::min);
            ours < nearest_rival
        }
        _ => false,
    }
}

/// Owns all cross-tick state for one fleet.
pub struct Controller {
    own: Fleet,
    config: ControllerConfig,
    tick: Tick,
    started: bool,
    routes: RouteTracker,
    predictor: ArrivalPredictor,
    rng: StdRng,
}

impl Controller {
    pub fn new(own: Fleet, config: ControllerConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.rng_seed);
        Self {
            own,
            config,
            tick: 0,
            started: false,
            routes: RouteTracker::new(),
            predictor: ArrivalPredictor::new(),
            rng,
        }
    }

    pub fn own(&self) -> Fleet {
        self.own
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Tick of the last processed snapshot.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn routes(&self) -> &RouteTracker {
        &self.routes
    }

    pub fn predictor(&self) -> &ArrivalPredictor {
        &self.predictor
    }

    /// Decide one tick.
    pub fn on_tick(&mut self, snapshot: &TickSnapshot) -> TickDecisions {
        self.tick = snapshot.tick;
        log::trace!("tick: {}", self.tick);

        if !self.started {
            self.started = true;
            self.predictor
                .schedule_opening(&self.config.opening_schedule, self.own, &mut self.routes);
            log::info!(
                "controller for {:?} started at tick {} with {} elevators",
                self.own,
                self.tick,
                snapshot.my_elevators.len()
            );
        }

        let passengers = snapshot.merged_passengers();
        let elevators = snapshot.merged_elevators();
        self.predictor
            .update(self.tick, &passengers, &elevators, &mut self.routes);
        let by_floor = bucket_by_floor(&passengers);

        let ctx = EvalContext {
            tick: self.tick,
            own: self.own,
            config: &self.config,
            routes: &self.routes,
            predictor: &self.predictor,
            by_floor: &by_floor,
            elevators: &elevators,
        };

        let mut owned: Vec<&Elevator> = snapshot.my_elevators.iter().collect();
        owned.sort_by_key(|e| (ctx.config.distance_from_center(e.id), e.id));

        let mut planner = TickPlanner {
            ctx,
            rng: &mut self.rng,
            claimed: HashSet::new(),
            decisions: TickDecisions::new(self.tick),
        };
        for elevator in owned {
            planner.plan(elevator);
        }
        planner.decisions
    }
}

/// Working state for a single tick.
struct TickPlanner<'a, 'r> {
    ctx: EvalContext<'a>,
    rng: &'r mut StdRng,
    /// Passengers claimed so far this tick.
    claimed: HashSet<PassengerId>,
    decisions: TickDecisions,
}

impl TickPlanner<'_, '_> {
    fn plan(&mut self, elevator: &Elevator) {
        match elevator.state {
            ElevatorState::Waiting => self.commit(elevator),
            ElevatorState::Filling => self.fill(elevator),
            ElevatorState::Moving | ElevatorState::Opening | ElevatorState::Closing => {}
        }
    }

    fn commit(&mut self, elevator: &Elevator) {
        let Some(best) = choose_next_floor(&self.ctx, elevator) else {
            log::warn!("e{} has no floor to go to", elevator.id);
            return;
        };
        log::debug!(
            "e{} go {} (score {:.1}, arrive {})",
            elevator.id,
            best.floor,
            best.score,
            best.arrive_at
        );
        self.decisions.commands.push(FloorCommand {
            elevator: elevator.id,
            floor: best.floor,
            kind: CommandKind::Committed,
        });
    }

    /// Close up and leave. The real target is chosen once waiting.
    fn depart(&mut self, elevator: &Elevator) {
        if elevator.time_on_floor < timing::DOORS_TIME + timing::TICKS_TO_STAY_OPEN {
            return;
        }
        let floors: Vec<Floor> = self
            .ctx
            .config
            .floors()
            .filter(|&f| f != elevator.floor)
            .collect();
        if let Some(&floor) = floors.choose(&mut *self.rng) {
            log::debug!(
                "e{} leaves {} (provisional {})",
                elevator.id,
                elevator.floor,
                floor
            );
            self.decisions.commands.push(FloorCommand {
                elevator: elevator.id,
                floor,
                kind: CommandKind::Provisional,
            });
        }
    }

    fn fill(&mut self, elevator: &Elevator) {
        let floor = elevator.floor;
        if elevator.staying_past(floor) >= building::CAPACITY {
            self.depart(elevator);
            return;
        }

        let waiting = self.ctx.waiting_at(floor);
        if floor == building::FIRST_FLOOR && self.ctx.tick < self.ctx.config.early_game_until {
            let min_dest = self.ctx.config.lane(elevator.id).early_min_destination;
            let eligible: Vec<&Passenger> =
                waiting.iter().filter(|p| p.dest_floor >= min_dest).collect();
            self.claim_best(elevator, eligible);
            return;
        }

        let own_distance = self.ctx.config.distance_from_center(elevator.id);
        let closer_boarding = self.ctx.elevators.iter().any(|other| {
            other.id != elevator.id
                && other.floor == floor
                && other.state == ElevatorState::Filling
                && other.passengers.len() < building::CAPACITY
                && self.ctx.config.distance_from_center(other.id) < own_distance
        });
        let window_end = self.ctx.tick + self.ctx.config.imminent_window;
        let mut imminent = self
            .ctx
            .predictor
            .expected_at(floor)
            .filter(|e| e.tick < window_end)
            .peekable();
        let any_imminent = imminent.peek().is_some();
        let expected_value: f64 = imminent.map(|e| self.ctx.expected_value(e)).sum();
        let worth_waiting = any_imminent
            && !closer_boarding
            && expected_value >= self.ctx.config.expected_value_threshold;

        let present_value: f64 = waiting.iter().map(|p| self.ctx.passenger_value(p)).sum();
        if present_value < self.ctx.config.low_floor_value && !worth_waiting {
            self.depart(elevator);
            return;
        }

        let entering = self.entering(elevator);
        let claimed = self.claim_best(elevator, waiting.iter().collect());
        if entering == 0 && claimed == 0 && !worth_waiting {
            self.depart(elevator);
        }
    }

    /// Passengers at the elevator's floor already called to it.
    fn entering(&self, elevator: &Elevator) -> usize {
        self.ctx
            .waiting_at(elevator.floor)
            .iter()
            .filter(|p| p.elevator == Some(elevator.id))
            .count()
    }

    fn free_seats(&self, elevator: &Elevator) -> usize {
        building::CAPACITY
            .saturating_sub(elevator.staying_past(elevator.floor) + self.entering(elevator))
    }

    /// Claim the most valuable eligible candidates that fit. Returns the
    /// number claimed.
    fn claim_best(&mut self, elevator: &Elevator, candidates: Vec<&Passenger>) -> usize {
        let free = self.free_seats(elevator);
        let mut eligible: Vec<(&Passenger, f64)> = candidates
            .into_iter()
            .filter(|p| !self.claimed.contains(&p.id))
            .filter(|p| can_claim(&self.ctx, elevator, p))
            .map(|p| (p, self.ctx.passenger_value(p)))
            .collect();
        eligible.sort_by(|a, b| b.1.total_cmp(&a.1));
        eligible.truncate(free);

        if !eligible.is_empty() {
            log::debug!(
                "assign e{}: {}",
                elevator.id,
                eligible
                    .iter()
                    .map(|(p, _)| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        for (p, _) in &eligible {
            self.claimed.insert(p.id);
            self.decisions.claims.push(Claim {
                passenger: p.id,
                elevator: elevator.id,
            });
        }
        eligible.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::PassengersByFloor;
    use crate::model::Fleet::{First, Second};
    use crate::model::PassengerState;
    use crate::predictor::{ArrivalOrigin, ExpectedPassenger};

    fn filling(id: ElevatorId, fleet: Fleet, floor: Floor, time_on_floor: Tick) -> Elevator {
        Elevator {
            state: ElevatorState::Filling,
            time_on_floor,
            ..Elevator::new(id, fleet, floor)
        }
    }

    fn snapshot(tick: Tick, passengers: Vec<Passenger>, my: Vec<Elevator>) -> TickSnapshot {
        let (my_passengers, enemy_passengers): (Vec<_>, Vec<_>) =
            passengers.into_iter().partition(|p| p.fleet == First);
        TickSnapshot {
            tick,
            my_passengers,
            my_elevators: my,
            enemy_passengers,
            enemy_elevators: Vec::new(),
        }
    }

    fn claimed_ids(decisions: &TickDecisions) -> Vec<PassengerId> {
        let mut ids: Vec<_> = decisions.claims.iter().map(|c| c.passenger).collect();
        ids.sort();
        ids
    }

    #[test]
    fn early_game_skips_short_trips() {
        let mut controller = Controller::new(First, ControllerConfig::default());
        let snap = snapshot(
            50,
            vec![
                Passenger::new(1, First, 1, 3),
                Passenger::new(3, First, 1, 6),
            ],
            vec![filling(5, First, 1, 10)],
        );
        let d = controller.on_tick(&snap);
        assert_eq!(
            d.claims,
            vec![Claim {
                passenger: 3,
                elevator: 5
            }]
        );
    }

    #[test]
    fn express_lane_accepts_floor_four_early() {
        let passengers = vec![Passenger::new(1, First, 1, 4)];

        let mut express = Controller::new(First, ControllerConfig::default());
        let d = express.on_tick(&snapshot(50, passengers.clone(), vec![filling(7, First, 1, 10)]));
        assert_eq!(claimed_ids(&d), vec![1]);

        let mut standard = Controller::new(First, ControllerConfig::default());
        let d = standard.on_tick(&snapshot(50, passengers, vec![filling(5, First, 1, 10)]));
        assert!(d.claims.is_empty());
    }

    #[test]
    fn long_haul_lane_wants_top_floors() {
        let passengers = vec![
            Passenger::new(1, First, 1, 6),
            Passenger::new(3, First, 1, 8),
        ];
        let mut controller = Controller::new(First, ControllerConfig::default());
        let d = controller.on_tick(&snapshot(50, passengers, vec![filling(1, First, 1, 10)]));
        assert_eq!(claimed_ids(&d), vec![3]);
    }

    #[test]
    fn claims_fill_only_free_seats() {
        let mut elevator = filling(5, First, 4, 50);
        elevator.passengers = (100..118).map(|i| Passenger::new(i, First, 1, 9)).collect();
        let passengers = vec![
            Passenger::new(20, Second, 4, 9),
            Passenger::new(22, Second, 4, 8),
            Passenger::new(24, Second, 4, 5),
            Passenger::new(21, First, 4, 5),
        ];
        let mut controller = Controller::new(First, ControllerConfig::default());
        let d = controller.on_tick(&snapshot(3000, passengers, vec![elevator]));
        assert_eq!(claimed_ids(&d), vec![20, 22]);
    }

    #[test]
    fn closer_elevator_claims_first() {
        let passengers = vec![Passenger::new(10, Second, 3, 8)];
        let outer = filling(3, First, 3, 200);
        let inner = filling(1, First, 3, 200);
        let mut controller = Controller::new(First, ControllerConfig::default());
        let d = controller.on_tick(&snapshot(3000, passengers, vec![outer, inner]));

        assert_eq!(
            d.claims,
            vec![Claim {
                passenger: 10,
                elevator: 1
            }]
        );
        assert!(d.command_for(1).is_none());
        let leaving = d.command_for(3).unwrap();
        assert_eq!(leaving.kind, CommandKind::Provisional);
        assert_ne!(leaving.floor, 3);
    }

    #[test]
    fn waiting_elevator_always_commits() {
        let mut controller = Controller::new(First, ControllerConfig::default());
        let d = controller.on_tick(&snapshot(3000, Vec::new(), vec![Elevator::new(1, First, 5)]));
        let cmd = d.command_for(1).unwrap();
        assert_eq!(cmd.kind, CommandKind::Committed);
        assert_ne!(cmd.floor, 5);
        assert!((1..=9).contains(&cmd.floor));
    }

    #[test]
    fn empty_floor_departure_waits_for_dwell() {
        let mut controller = Controller::new(First, ControllerConfig::default());
        let d = controller.on_tick(&snapshot(3000, Vec::new(), vec![filling(2, First, 4, 50)]));
        assert!(d.commands.is_empty());

        let d = controller.on_tick(&snapshot(3001, Vec::new(), vec![filling(2, First, 4, 140)]));
        let cmd = d.command_for(2).unwrap();
        assert_eq!(cmd.kind, CommandKind::Provisional);
        assert_ne!(cmd.floor, 4);
    }

    /// Register a rival passenger due at `floor` whose next leg is known.
    fn expect_rival(
        controller: &mut Controller,
        id: PassengerId,
        floor: Floor,
        tick: Tick,
        next: Floor,
    ) {
        controller.routes.record_leg(id, next);
        controller.predictor.expect(ExpectedPassenger {
            id,
            fleet: Second,
            floor,
            tick,
            origin: ArrivalOrigin::StairWalk,
        });
    }

    #[test]
    fn valuable_arrivals_hold_the_doors() {
        let mut controller = Controller::new(First, ControllerConfig::default());
        // Two rivals riding 4 -> 9 are worth 100 each.
        expect_rival(&mut controller, 502, 4, 3100, 9);
        expect_rival(&mut controller, 504, 4, 3150, 9);
        let d = controller.on_tick(&snapshot(3000, Vec::new(), vec![filling(5, First, 4, 200)]));
        assert!(d.commands.is_empty());
        assert!(d.claims.is_empty());
    }

    #[test]
    fn closer_competitor_releases_the_hold() {
        let mut controller = Controller::new(First, ControllerConfig::default());
        expect_rival(&mut controller, 502, 4, 3100, 9);
        expect_rival(&mut controller, 504, 4, 3150, 9);
        let elevators = vec![filling(5, First, 4, 200), filling(1, First, 4, 200)];
        let d = controller.on_tick(&snapshot(3000, Vec::new(), elevators));
        assert!(d.command_for(1).is_none());
        assert_eq!(
            d.command_for(5).map(|c| c.kind),
            Some(CommandKind::Provisional)
        );
    }

    #[test]
    fn cheap_or_distant_arrivals_do_not_hold() {
        let mut controller = Controller::new(First, ControllerConfig::default());
        // 4 -> 6 for a rival is worth 40.
        expect_rival(&mut controller, 502, 4, 3100, 6);
        let d = controller.on_tick(&snapshot(3000, Vec::new(), vec![filling(5, First, 4, 200)]));
        assert_eq!(
            d.command_for(5).map(|c| c.kind),
            Some(CommandKind::Provisional)
        );

        let mut controller = Controller::new(First, ControllerConfig::default());
        // Valuable, but outside the imminent window.
        expect_rival(&mut controller, 502, 4, 3300, 9);
        expect_rival(&mut controller, 504, 4, 3350, 9);
        let d = controller.on_tick(&snapshot(3000, Vec::new(), vec![filling(5, First, 4, 200)]));
        assert_eq!(
            d.command_for(5).map(|c| c.kind),
            Some(CommandKind::Provisional)
        );
    }

    fn full_car(floor: Floor, time_on_floor: Tick) -> Elevator {
        let mut car = filling(5, First, floor, time_on_floor);
        car.passengers = (200..220)
            .map(|i| Passenger {
                state: PassengerState::UsingElevator,
                ..Passenger::new(i, First, floor, 9)
            })
            .collect();
        car
    }

    #[test]
    fn full_car_skips_boarding_and_leaves() {
        let mut controller = Controller::new(First, ControllerConfig::default());
        let waiting = vec![Passenger::new(30, Second, 4, 9)];
        let d = controller.on_tick(&snapshot(3000, waiting, vec![full_car(4, 200)]));
        assert!(d.claims.is_empty());
        let cmd = d.command_for(5).unwrap();
        assert_eq!(cmd.kind, CommandKind::Provisional);
        assert_ne!(cmd.floor, 4);
    }

    #[test]
    fn full_car_leaves_ground_floor_early_game() {
        let mut controller = Controller::new(First, ControllerConfig::default());
        let waiting = vec![
            Passenger::new(30, Second, 1, 9),
            Passenger::new(31, First, 1, 8),
        ];
        let d = controller.on_tick(&snapshot(500, waiting, vec![full_car(1, 200)]));
        assert!(d.claims.is_empty());
        let cmd = d.command_for(5).unwrap();
        assert_eq!(cmd.kind, CommandKind::Provisional);
        assert_ne!(cmd.floor, 1);
    }

    #[test]
    fn provisional_floors_are_reproducible() {
        let run = || {
            let mut controller = Controller::new(First, ControllerConfig::default());
            (0..5)
                .map(|i| {
                    let snap = snapshot(3000 + i, Vec::new(), vec![filling(2, First, 4, 200 + i)]);
                    controller.on_tick(&snap).commands[0].floor
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn apply_writes_back_claims_and_commands() {
        let mut snap = snapshot(
            3000,
            vec![Passenger::new(4, Second, 2, 7)],
            vec![Elevator::new(1, First, 2)],
        );
        let d = TickDecisions {
            tick: 3000,
            commands: vec![FloorCommand {
                elevator: 1,
                floor: 7,
                kind: CommandKind::Committed,
            }],
            claims: vec![Claim {
                passenger: 4,
                elevator: 1,
            }],
        };
        d.apply_to(&mut snap);
        d.apply_to(&mut snap);
        assert_eq!(snap.enemy_passengers[0].elevator, Some(1));
        assert_eq!(snap.my_elevators[0].next_floor, 7);
    }

    struct ClaimWorld {
        config: ControllerConfig,
        routes: RouteTracker,
        predictor: ArrivalPredictor,
        by_floor: PassengersByFloor,
        elevators: Vec<Elevator>,
    }

    impl ClaimWorld {
        fn new(elevators: Vec<Elevator>) -> Self {
            Self {
                config: ControllerConfig::default(),
                routes: RouteTracker::new(),
                predictor: ArrivalPredictor::new(),
                by_floor: PassengersByFloor::new(),
                elevators,
            }
        }

        fn ctx(&self) -> EvalContext<'_> {
            EvalContext {
                tick: 3000,
                own: First,
                config: &self.config,
                routes: &self.routes,
                predictor: &self.predictor,
                by_floor: &self.by_floor,
                elevators: &self.elevators,
            }
        }
    }

    fn walking_to(id: PassengerId, fleet: Fleet, elevator: ElevatorId, x: f64) -> Passenger {
        Passenger {
            state: PassengerState::MovingToElevator,
            elevator: Some(elevator),
            x,
            ..Passenger::new(id, fleet, 3, 7)
        }
    }

    #[test]
    fn poach_from_parked_rival_when_closer() {
        // Ours sits at x = -60, the rival at x = 60.
        let world = ClaimWorld::new(vec![filling(1, First, 3, 200), filling(2, Second, 3, 200)]);
        let ctx = world.ctx();
        let ours = &world.elevators[0];
        assert!(can_claim(&ctx, ours, &walking_to(4, Second, 2, -50.0)));
        assert!(!can_claim(&ctx, ours, &walking_to(4, Second, 2, 40.0)));
    }

    #[test]
    fn rival_passenger_kept_while_rival_is_fresh() {
        let world = ClaimWorld::new(vec![filling(1, First, 3, 200), filling(2, Second, 3, 100)]);
        let ctx = world.ctx();
        let ours = &world.elevators[0];
        assert!(!can_claim(&ctx, ours, &walking_to(4, Second, 2, -50.0)));
        // Our own passenger may be pulled back regardless.
        assert!(can_claim(&ctx, ours, &walking_to(5, First, 2, -50.0)));
    }

    #[test]
    fn never_steal_from_ourselves() {
        let world = ClaimWorld::new(vec![filling(1, First, 3, 200), filling(3, First, 3, 200)]);
        let ctx = world.ctx();
        let ours = &world.elevators[0];
        assert!(!can_claim(&ctx, ours, &walking_to(5, First, 3, -60.0)));
        assert!(!can_claim(&ctx, ours, &walking_to(5, First, 1, -60.0)));
        assert!(can_claim(&ctx, ours, &Passenger::new(7, Second, 3, 9)));
    }
}
