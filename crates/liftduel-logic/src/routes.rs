//! Route Tracker: per-passenger history of requested floors.
//!
//! The two fleets receive mirrored passenger streams: ids are handed out
//! in pairs, one to each fleet, and both members of a pair follow the same
//! hidden route template. Whichever twin is further along its journey
//! therefore predicts the other's next leg.
//!
//! Routes are stored in a two-slot registry keyed by pair index, so the
//! pairing rule lives in exactly one place ([`pair_slot`]).

use std::collections::HashMap;

use crate::constants::building;
use crate::model::{Floor, PassengerId};

/// Pair index and slot (0 for odd ids, 1 for even ids) of a passenger id.
/// Ids are 1-based; id 0 shares the slot of id 1.
pub fn pair_slot(id: PassengerId) -> (u32, usize) {
    let k = id.saturating_sub(1);
    (k / 2, (k % 2) as usize)
}

/// The other member of `id`'s pair: odd `n` pairs with `n + 1`.
pub fn twin_id(id: PassengerId) -> PassengerId {
    let (pair, slot) = pair_slot(id);
    pair * 2 + (1 - slot as u32) + 1
}

/// Destination history of one passenger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    pub destinations: Vec<Floor>,
    /// Legs completed so far.
    pub visited: u32,
    /// `visited` at the time the last leg was recorded; one instance of a
    /// passenger records exactly one leg.
    recorded_at: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTracker {
    pairs: HashMap<u32, [Option<Route>; 2]>,
}

impl RouteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, id: PassengerId) -> Option<&Route> {
        let (pair, slot) = pair_slot(id);
        self.pairs.get(&pair).and_then(|slots| slots[slot].as_ref())
    }

    fn route_mut(&mut self, id: PassengerId) -> Option<&mut Route> {
        let (pair, slot) = pair_slot(id);
        self.pairs
            .get_mut(&pair)
            .and_then(|slots| slots[slot].as_mut())
    }

    fn entry(&mut self, id: PassengerId) -> &mut Route {
        let (pair, slot) = pair_slot(id);
        self.pairs.entry(pair).or_default()[slot].get_or_insert_with(Route::default)
    }

    /// Register an empty route ahead of the passenger's first appearance.
    pub fn seed(&mut self, id: PassengerId) {
        self.entry(id);
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.pairs
            .values()
            .map(|slots| slots.iter().filter(|s| s.is_some()).count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append the destination requested by a newly appeared passenger.
    /// Returns `false` if this instance already recorded its leg.
    pub fn record_leg(&mut self, id: PassengerId, destination: Floor) -> bool {
        let route = self.entry(id);
        if route.recorded_at == Some(route.visited) {
            return false;
        }
        route.destinations.push(destination);
        route.recorded_at = Some(route.visited);
        true
    }

    /// Longest known route length for `id`'s pair.
    fn pair_length(&self, id: PassengerId) -> usize {
        let own = self.route(id).map_or(0, |r| r.destinations.len());
        let twin = self.route(twin_id(id)).map_or(0, |r| r.destinations.len());
        own.max(twin)
    }

    /// Count a completed leg. Never raises `visited` past the longer of
    /// the passenger's and its twin's routes.
    pub fn mark_visited(&mut self, id: PassengerId) {
        let bound = self.pair_length(id) as u32;
        let Some(route) = self.route_mut(id) else {
            log::error!("mark_visited: no route registered for passenger {}", id);
            debug_assert!(false, "no route registered for passenger {}", id);
            return;
        };
        if route.visited >= bound {
            log::warn!(
                "passenger {} completed more legs than recorded ({})",
                id,
                bound
            );
            return;
        }
        route.visited += 1;
    }

    /// Legs completed by `id`. A missing route is an invariant violation
    /// and reads as zero legs.
    pub fn visited(&self, id: PassengerId) -> u32 {
        match self.route(id) {
            Some(route) => route.visited,
            None => {
                log::error!("visited: no route registered for passenger {}", id);
                debug_assert!(false, "no route registered for passenger {}", id);
                0
            }
        }
    }

    /// Floor the passenger will ask for on its next appearance, if known.
    pub fn predict_next_floor(&self, id: PassengerId) -> Option<Floor> {
        let visited = self.visited(id);
        if visited >= building::TERMINAL_LEG {
            return Some(building::FIRST_FLOOR);
        }
        let empty = Vec::new();
        let own = self.route(id).map_or(&empty, |r| &r.destinations);
        let twin = self.route(twin_id(id)).map_or(&empty, |r| &r.destinations);
        let path = if own.len() > twin.len() { own } else { twin };
        path.get(visited as usize).copied()
    }
}
