//! Per-tick data delivered by the game engine.
//!
//! These are plain containers: the controller reads them as-is and only
//! ever writes back a passenger's claimed elevator and an elevator's next
//! floor (see [`crate::dispatch::TickDecisions::apply_to`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::timing;

/// Simulation time step.
pub type Tick = i32;
/// Floor number, 1-based.
pub type Floor = i32;
pub type PassengerId = u32;
pub type ElevatorId = u32;

/// Which of the two competing controllers owns a passenger or elevator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fleet {
    First,
    Second,
}

impl Fleet {
    pub fn rival(self) -> Fleet {
        match self {
            Fleet::First => Fleet::Second,
            Fleet::Second => Fleet::First,
        }
    }

    /// Passenger ids spawned for this fleet by the opening stream are odd
    /// for the first fleet and even for the second.
    pub fn id_offset(self) -> PassengerId {
        match self {
            Fleet::First => 1,
            Fleet::Second => 2,
        }
    }

    fn initial(self) -> char {
        match self {
            Fleet::First => 'F',
            Fleet::Second => 'S',
        }
    }
}

/// Elevator state, serialized as the engine's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ElevatorState {
    Waiting = 0,
    Moving = 1,
    Opening = 2,
    Filling = 3,
    Closing = 4,
}

impl ElevatorState {
    /// Convert from the engine's numeric state code.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Waiting),
            1 => Some(Self::Moving),
            2 => Some(Self::Opening),
            3 => Some(Self::Filling),
            4 => Some(Self::Closing),
            _ => None,
        }
    }
}

/// Passenger state, serialized as the engine's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PassengerState {
    WaitingForElevator = 1,
    MovingToElevator = 2,
    Returning = 3,
    MovingToFloor = 4,
    UsingElevator = 5,
    Exiting = 6,
}

impl PassengerState {
    /// Convert from the engine's numeric state code.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::WaitingForElevator),
            2 => Some(Self::MovingToElevator),
            3 => Some(Self::Returning),
            4 => Some(Self::MovingToFloor),
            5 => Some(Self::UsingElevator),
            6 => Some(Self::Exiting),
            _ => None,
        }
    }
}

/// A state code the engine does not define.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownStateCode(pub u8);

impl fmt::Display for UnknownStateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown state code {}", self.0)
    }
}

impl std::error::Error for UnknownStateCode {}

impl TryFrom<u8> for ElevatorState {
    type Error = UnknownStateCode;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Self::from_u8(v).ok_or(UnknownStateCode(v))
    }
}

impl From<ElevatorState> for u8 {
    fn from(state: ElevatorState) -> u8 {
        state as u8
    }
}

impl TryFrom<u8> for PassengerState {
    type Error = UnknownStateCode;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Self::from_u8(v).ok_or(UnknownStateCode(v))
    }
}

impl From<PassengerState> for u8 {
    fn from(state: PassengerState) -> u8 {
        state as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    pub id: PassengerId,
    /// Fleet that spawned this passenger.
    pub fleet: Fleet,
    pub state: PassengerState,
    pub floor: Floor,
    pub from_floor: Floor,
    pub dest_floor: Floor,
    /// Lateral position.
    pub x: f64,
    /// Multiplies an elevator's ascent time while aboard.
    pub weight: f64,
    /// Elevator this passenger is called to, if any.
    pub elevator: Option<ElevatorId>,
    /// Ticks left before the passenger gives up and takes the stairs.
    pub time_to_away: Tick,
}

impl Passenger {
    /// A freshly appeared passenger waiting at `floor` for a trip to `dest_floor`.
    pub fn new(id: PassengerId, fleet: Fleet, floor: Floor, dest_floor: Floor) -> Self {
        Self {
            id,
            fleet,
            state: PassengerState::WaitingForElevator,
            floor,
            from_floor: floor,
            dest_floor,
            x: 0.0,
            weight: 1.0,
            elevator: None,
            time_to_away: timing::TIME_TO_AWAY,
        }
    }

    /// Still standing on a floor, reachable by an elevator
    /// (waiting, walking to a car, or returning to the queue).
    pub fn is_at_floor(&self) -> bool {
        matches!(
            self.state,
            PassengerState::WaitingForElevator
                | PassengerState::MovingToElevator
                | PassengerState::Returning
        )
    }
}

impl fmt::Display for Passenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}>{}", self.fleet.initial(), self.id, self.dest_floor)?;
        if let Some(e) = self.elevator {
            write!(f, "e{}", e)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elevator {
    pub id: ElevatorId,
    pub fleet: Fleet,
    /// Continuous vertical position in floors.
    pub y: f64,
    pub state: ElevatorState,
    /// Current floor; meaningful while stationary.
    pub floor: Floor,
    /// Declared next stop; meaningful while moving.
    pub next_floor: Floor,
    /// Ticks since the doors started opening at the current floor.
    pub time_on_floor: Tick,
    pub passengers: Vec<Passenger>,
}

impl Elevator {
    /// An empty elevator standing idle at `floor`.
    pub fn new(id: ElevatorId, fleet: Fleet, floor: Floor) -> Self {
        Self {
            id,
            fleet,
            y: floor as f64,
            state: ElevatorState::Waiting,
            floor,
            next_floor: floor,
            time_on_floor: 0,
            passengers: Vec::new(),
        }
    }

    /// Riders that get off at `floor`.
    pub fn exiting_at(&self, floor: Floor) -> impl Iterator<Item = &Passenger> {
        self.passengers.iter().filter(move |p| p.dest_floor == floor)
    }

    /// Riders staying aboard past `floor`.
    pub fn staying_past(&self, floor: Floor) -> usize {
        self.passengers.len() - self.exiting_at(floor).count()
    }

    /// Doors open (or opening) at `floor`.
    pub fn is_boarding_at(&self, floor: Floor) -> bool {
        self.floor == floor
            && matches!(self.state, ElevatorState::Opening | ElevatorState::Filling)
    }
}

/// Everything the engine reports for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub tick: Tick,
    pub my_passengers: Vec<Passenger>,
    pub my_elevators: Vec<Elevator>,
    pub enemy_passengers: Vec<Passenger>,
    pub enemy_elevators: Vec<Elevator>,
}

impl TickSnapshot {
    /// Both fleets' passengers, own first.
    pub fn passengers(&self) -> impl Iterator<Item = &Passenger> {
        self.my_passengers.iter().chain(self.enemy_passengers.iter())
    }

    /// Both fleets' elevators, own first.
    pub fn elevators(&self) -> impl Iterator<Item = &Elevator> {
        self.my_elevators.iter().chain(self.enemy_elevators.iter())
    }

    pub fn merged_passengers(&self) -> Vec<Passenger> {
        self.passengers().cloned().collect()
    }

    pub fn merged_elevators(&self) -> Vec<Elevator> {
        self.elevators().cloned().collect()
    }
}
