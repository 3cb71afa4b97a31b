//! Toy building used to drive controllers end to end.
//!
//! Implements just enough of the game rules to play a full match between
//! two controllers: passenger pairs spawn on the ground floor and follow a
//! shared route template, ride or take the stairs between floors, and
//! score for whichever fleet's elevator delivers them. Timings come from
//! `liftduel_logic::constants`.

use std::collections::{HashMap, HashSet};

use liftduel_logic::config::ControllerConfig;
use liftduel_logic::constants::{building, timing};
use liftduel_logic::dispatch::TickDecisions;
use liftduel_logic::model::{
    Elevator, ElevatorId, ElevatorState, Fleet, Floor, Passenger, PassengerId, PassengerState,
    Tick, TickSnapshot,
};
use liftduel_logic::predictor::stair_ticks;
use liftduel_logic::routes::pair_slot;
use liftduel_logic::value::passenger_value;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const OPENING_INTERVAL: Tick = 20;
const OPENING_UNTIL: Tick = 2000;
const LATE_INTERVAL: Tick = 60;
const LATE_UNTIL: Tick = 5000;
const ELEVATORS_PER_FLEET: u32 = 4;

/// Passenger off screen between legs.
struct Away {
    passenger: Passenger,
    until: Tick,
}

pub struct Building {
    pub tick: Tick,
    /// Passengers on floors or on the stairs; riders live in their elevator.
    pub passengers: Vec<Passenger>,
    pub elevators: Vec<Elevator>,
    away: Vec<Away>,
    /// Tick each stair walker reaches its floor.
    walking: HashMap<PassengerId, Tick>,
    /// Tick each closing elevator finishes closing.
    closing: HashMap<ElevatorId, Tick>,
    templates: HashMap<u32, Vec<Floor>>,
    legs: HashMap<PassengerId, usize>,
    config: ControllerConfig,
    rng: StdRng,
    next_pair: u32,
    pub score: [f64; 2],
    pub delivered: usize,
    pub spawned: usize,
}

fn fleet_index(fleet: Fleet) -> usize {
    match fleet {
        Fleet::First => 0,
        Fleet::Second => 1,
    }
}

impl Building {
    pub fn new(config: ControllerConfig, seed: u64) -> Self {
        let elevators = (1..=ELEVATORS_PER_FLEET * 2)
            .map(|id| {
                let fleet = if id % 2 == 1 {
                    Fleet::First
                } else {
                    Fleet::Second
                };
                Elevator {
                    state: ElevatorState::Filling,
                    time_on_floor: timing::DOORS_TIME,
                    ..Elevator::new(id, fleet, building::FIRST_FLOOR)
                }
            })
            .collect();
        Self {
            tick: 0,
            passengers: Vec::new(),
            elevators,
            away: Vec::new(),
            walking: HashMap::new(),
            closing: HashMap::new(),
            templates: HashMap::new(),
            legs: HashMap::new(),
            config,
            rng: StdRng::seed_from_u64(seed),
            next_pair: 0,
            score: [0.0; 2],
            delivered: 0,
            spawned: 0,
        }
    }

    pub fn score(&self, fleet: Fleet) -> f64 {
        self.score[fleet_index(fleet)]
    }

    /// What one controller sees this tick.
    pub fn snapshot(&self, own: Fleet) -> TickSnapshot {
        let (my_passengers, enemy_passengers): (Vec<_>, Vec<_>) =
            self.passengers.iter().cloned().partition(|p| p.fleet == own);
        let (my_elevators, enemy_elevators): (Vec<_>, Vec<_>) =
            self.elevators.iter().cloned().partition(|e| e.fleet == own);
        TickSnapshot {
            tick: self.tick,
            my_passengers,
            my_elevators,
            enemy_passengers,
            enemy_elevators,
        }
    }

    /// Apply a controller's decisions. Claims only stick for passengers
    /// still on a floor; commands only for elevators that can take one.
    pub fn apply(&mut self, decisions: &TickDecisions) {
        for claim in &decisions.claims {
            let Some(elevator) = self.elevators.iter().find(|e| e.id == claim.elevator) else {
                continue;
            };
            let open = elevator.state == ElevatorState::Filling;
            let floor = elevator.floor;
            if let Some(p) = self
                .passengers
                .iter_mut()
                .find(|p| p.id == claim.passenger && p.is_at_floor())
            {
                p.elevator = Some(claim.elevator);
                if open && p.floor == floor {
                    p.state = PassengerState::MovingToElevator;
                }
            }
        }
        for command in &decisions.commands {
            if let Some(e) = self.elevators.iter_mut().find(|e| e.id == command.elevator) {
                if matches!(e.state, ElevatorState::Waiting | ElevatorState::Filling) {
                    e.next_floor = command.floor;
                }
            }
        }
    }

    /// Advance one tick.
    pub fn step(&mut self) {
        self.tick += 1;
        self.spawn();
        self.return_from_away();
        self.update_passengers();
        self.update_elevators();
    }

    fn spawn(&mut self) {
        let t = self.tick - 1;
        let due = if self.tick < OPENING_UNTIL {
            t % OPENING_INTERVAL == 0
        } else {
            self.tick < LATE_UNTIL && t % LATE_INTERVAL == 0
        };
        if due {
            self.spawn_pair();
        }
    }

    fn spawn_pair(&mut self) {
        let pair = self.next_pair;
        self.next_pair += 1;

        let legs = building::TERMINAL_LEG as usize;
        let mut template = Vec::with_capacity(legs);
        let mut previous = building::FIRST_FLOOR;
        while template.len() < legs {
            let floor = self.rng.gen_range(building::FIRST_FLOOR + 1..=building::TOP_FLOOR);
            if floor != previous {
                template.push(floor);
                previous = floor;
            }
        }

        let weight = self.rng.gen_range(1.0..1.02);
        for fleet in [Fleet::First, Fleet::Second] {
            let id = pair * 2 + fleet.id_offset();
            let passenger = Passenger {
                x: self.rng.gen_range(-20.0..20.0),
                weight,
                ..Passenger::new(id, fleet, building::FIRST_FLOOR, template[0])
            };
            self.legs.insert(id, 0);
            self.passengers.push(passenger);
            self.spawned += 1;
        }
        self.templates.insert(pair, template);
    }

    fn next_destination(&self, id: PassengerId) -> Floor {
        let done = self.legs.get(&id).copied().unwrap_or(0);
        let (pair, _) = pair_slot(id);
        self.templates
            .get(&pair)
            .and_then(|t| t.get(done))
            .copied()
            .unwrap_or(building::FIRST_FLOOR)
    }

    fn return_from_away(&mut self) {
        let tick = self.tick;
        let (due, waiting): (Vec<Away>, Vec<Away>) =
            self.away.drain(..).partition(|a| a.until <= tick);
        self.away = waiting;
        for a in due {
            let floor = a.passenger.floor;
            if floor == building::FIRST_FLOOR {
                // Home; the journey is over.
                continue;
            }
            let dest = self.next_destination(a.passenger.id);
            let passenger = Passenger {
                x: self.rng.gen_range(-20.0..20.0),
                weight: a.passenger.weight,
                ..Passenger::new(a.passenger.id, a.passenger.fleet, floor, dest)
            };
            self.passengers.push(passenger);
        }
    }

    fn finish_leg(&mut self, mut passenger: Passenger, until: Tick) {
        *self.legs.entry(passenger.id).or_insert(0) += 1;
        passenger.floor = passenger.dest_floor;
        passenger.elevator = None;
        self.away.push(Away { passenger, until });
    }

    fn update_passengers(&mut self) {
        let tick = self.tick;
        let mut arrived_by_stairs = Vec::new();
        let mut at_door = Vec::new();

        for p in self.passengers.iter_mut() {
            match p.state {
                PassengerState::MovingToFloor => {
                    if self.walking.get(&p.id).map_or(true, |&t| tick >= t) {
                        arrived_by_stairs.push(p.id);
                    }
                }
                PassengerState::WaitingForElevator | PassengerState::Returning => {
                    p.time_to_away -= 1;
                    if p.time_to_away <= 0 {
                        p.state = PassengerState::MovingToFloor;
                        p.elevator = None;
                        self.walking
                            .insert(p.id, tick + stair_ticks(p.floor, p.dest_floor));
                    }
                }
                PassengerState::MovingToElevator => {
                    let target = p
                        .elevator
                        .and_then(|id| self.elevators.iter().find(|e| e.id == id));
                    match target {
                        Some(e) if e.state == ElevatorState::Filling && e.floor == p.floor => {
                            let door = self.config.elevator_x(e.id) as f64;
                            let step = timing::HORIZONTAL_SPEED as f64;
                            if (door - p.x).abs() <= step {
                                p.x = door;
                                at_door.push((p.id, e.id));
                            } else {
                                p.x += step * (door - p.x).signum();
                            }
                        }
                        _ => {
                            p.state = PassengerState::Returning;
                            p.elevator = None;
                        }
                    }
                }
                PassengerState::UsingElevator | PassengerState::Exiting => {}
            }
        }

        let mut removed: HashSet<PassengerId> = HashSet::new();
        for (id, elevator_id) in at_door {
            let Some(e) = self.elevators.iter_mut().find(|e| e.id == elevator_id) else {
                continue;
            };
            let Some(p) = self.passengers.iter_mut().find(|p| p.id == id) else {
                continue;
            };
            if e.passengers.len() < building::CAPACITY {
                let mut rider = p.clone();
                rider.state = PassengerState::UsingElevator;
                e.passengers.push(rider);
                removed.insert(id);
            } else {
                p.state = PassengerState::Returning;
                p.elevator = None;
            }
        }

        for id in arrived_by_stairs {
            self.walking.remove(&id);
            if let Some(pos) = self.passengers.iter().position(|p| p.id == id) {
                let p = self.passengers.swap_remove(pos);
                self.finish_leg(p, tick + timing::WALKING_TIME);
            }
        }
        self.passengers.retain(|p| !removed.contains(&p.id));
    }

    fn update_elevators(&mut self) {
        let tick = self.tick;
        let mut exits = Vec::new();

        for e in self.elevators.iter_mut() {
            match e.state {
                ElevatorState::Waiting => {
                    if e.next_floor != e.floor && self.config.contains_floor(e.next_floor) {
                        e.state = ElevatorState::Moving;
                        e.time_on_floor = 0;
                    }
                }
                ElevatorState::Moving => {
                    let target = e.next_floor as f64;
                    let per_floor = if target < e.y {
                        timing::TICKS_PER_FLOOR as f64
                    } else {
                        let mut loaded = timing::TICKS_PER_FLOOR as f64;
                        for rider in &e.passengers {
                            loaded *= rider.weight;
                        }
                        if e.passengers.len() > building::HEAVY_LOAD {
                            loaded *= building::HEAVY_LOAD_PENALTY;
                        }
                        loaded
                    };
                    let step = 1.0 / per_floor;
                    if (target - e.y).abs() <= step {
                        e.y = target;
                        e.floor = e.next_floor;
                        e.state = ElevatorState::Opening;
                        e.time_on_floor = 0;
                    } else {
                        e.y += step * (target - e.y).signum();
                    }
                }
                ElevatorState::Opening => {
                    e.time_on_floor += 1;
                    if e.time_on_floor >= timing::DOORS_TIME {
                        e.state = ElevatorState::Filling;
                        let floor = e.floor;
                        let (leaving, staying): (Vec<_>, Vec<_>) =
                            e.passengers.drain(..).partition(|p| p.dest_floor == floor);
                        e.passengers = staying;
                        exits.extend(leaving.into_iter().map(|p| (e.fleet, p)));
                    }
                }
                ElevatorState::Filling => {
                    e.time_on_floor += 1;
                    if e.next_floor != e.floor
                        && e.time_on_floor >= timing::DOORS_TIME + timing::TICKS_TO_STAY_OPEN
                    {
                        e.state = ElevatorState::Closing;
                        self.closing.insert(e.id, tick + timing::DOORS_TIME);
                    }
                }
                ElevatorState::Closing => {
                    e.time_on_floor += 1;
                    if self.closing.get(&e.id).map_or(true, |&t| tick >= t) {
                        self.closing.remove(&e.id);
                        e.state = ElevatorState::Waiting;
                    }
                }
            }
        }

        for (carrier, p) in exits {
            log::trace!("t{} {:?} delivered {}", tick, carrier, p);
            self.score[fleet_index(carrier)] += passenger_value(&p, carrier);
            self.delivered += 1;
            self.finish_leg(p, tick + timing::TICKS_TO_EXIT + timing::WALKING_TIME);
        }
    }
}
