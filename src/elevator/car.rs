/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::CarConfig;
use crate::elevator::scheduler;
use crate::layout::FloorLayout;
use crate::shared::{CarId, CarState, Direction, PassengerId, ShaftId};

/**
 * A single elevator cabin confined to its shaft's floor range.
 *
 * The car is advanced one tick at a time by its shaft. It moves continuously
 * between walk levels, stops at every floor in its stop set (including floors
 * it drives by while heading somewhere farther), holds its doors open for a
 * fixed dwell and then picks the next stop with a SCAN sweep.
 *
 * # Fields
 * - `id`:                  Stable handle handed out to passenger agents.
 * - `shaft_id`:            The shaft owning this car.
 * - `bottom_floor`:        Lowest floor the car may visit.
 * - `top_floor`:           Highest floor the car may visit.
 * - `current_floor`:       Last floor the car stood at or passed.
 * - `target_floor`:        Floor the car is travelling to.
 * - `position`:            Continuous height of the car in world units.
 * - `state`:               Idle, moving or door phase.
 * - `direction`:           Last committed direction of travel, the sweep tie-break.
 * - `pickup_stops`:        Floors requested through `add_stop` that have not been visited yet.
 * - `passengers`:          Everyone on board, in boarding order.
 * - `destinations`:        Passengers on board grouped by drop-off floor.
 * - `door_timer`:          Seconds left before the doors start closing.
 * - `speed`:               World units travelled per second.
 * - `capacity`:            Maximum number of passengers on board.
 * - `door_open_duration`:  Dwell time for open doors, in seconds.
 */
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    id: CarId,
    shaft_id: ShaftId,
    bottom_floor: i32,
    top_floor: i32,
    current_floor: i32,
    target_floor: i32,
    position: f64,
    state: CarState,
    direction: Direction,
    pickup_stops: BTreeSet<i32>,
    passengers: Vec<PassengerId>,
    destinations: BTreeMap<i32, Vec<PassengerId>>,
    door_timer: f64,
    #[serde(skip)]
    speed: f64,
    capacity: usize,
    #[serde(skip)]
    door_open_duration: f64,
}

impl Car {
    pub fn new(
        id: CarId,
        shaft_id: ShaftId,
        bottom_floor: i32,
        top_floor: i32,
        config: &CarConfig,
        layout: &dyn FloorLayout,
    ) -> Car {
        Car {
            id,
            shaft_id,
            bottom_floor,
            top_floor,
            current_floor: bottom_floor,
            target_floor: bottom_floor,
            position: layout.walk_level(bottom_floor),
            state: CarState::Idle,
            direction: Direction::Stop,
            pickup_stops: BTreeSet::new(),
            passengers: Vec::new(),
            destinations: BTreeMap::new(),
            door_timer: 0.0,
            speed: config.speed,
            capacity: config.capacity,
            door_open_duration: config.door_open_duration,
        }
    }

    /***************************************/
    /*              Queries                */
    /***************************************/
    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn shaft_id(&self) -> ShaftId {
        self.shaft_id
    }

    pub fn current_floor(&self) -> i32 {
        self.current_floor
    }

    pub fn target_floor(&self) -> i32 {
        self.target_floor
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn state(&self) -> CarState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn door_timer(&self) -> f64 {
        self.door_timer
    }

    pub fn passengers(&self) -> &[PassengerId] {
        &self.passengers
    }

    pub fn destinations(&self) -> &BTreeMap<i32, Vec<PassengerId>> {
        &self.destinations
    }

    pub fn is_full(&self) -> bool {
        self.passengers.len() >= self.capacity
    }

    pub fn serves_floor(&self, floor: i32) -> bool {
        floor >= self.bottom_floor && floor <= self.top_floor
    }

    /// Every floor this car is committed to visit: pending pickups plus the
    /// drop-off floor of everyone on board.
    pub fn stops(&self) -> BTreeSet<i32> {
        self.pickup_stops
            .iter()
            .chain(self.destinations.keys())
            .copied()
            .collect()
    }

    pub fn has_stop(&self, floor: i32) -> bool {
        self.pickup_stops.contains(&floor) || self.destinations.contains_key(&floor)
    }

    fn has_stops(&self) -> bool {
        !self.pickup_stops.is_empty() || !self.destinations.is_empty()
    }

    /***************************************/
    /*          Stop scheduling            */
    /***************************************/

    /// Commits the car to visit `floor`. Floors outside the shaft are ignored.
    pub fn add_stop(&mut self, floor: i32) -> bool {
        if !self.serves_floor(floor) {
            warn!(
                "{} ignoring stop at floor {} outside [{}, {}]",
                self.id, floor, self.bottom_floor, self.top_floor
            );
            return false;
        }

        // Already standing there with the doors open
        if self.state == CarState::DoorsOpen && self.current_floor == floor {
            return true;
        }

        if self.pickup_stops.insert(floor) {
            debug!("{} stop added at floor {}", self.id, floor);
        }
        true
    }

    /// Raises the top of the serving range when the shaft is extended.
    pub(crate) fn set_top_floor(&mut self, top_floor: i32) {
        self.top_floor = top_floor;
    }

    /***************************************/
    /*             Passengers              */
    /***************************************/
    pub fn board(&mut self, passenger: PassengerId, destination: i32) -> bool {
        if !self.state.is_boardable() {
            debug!("{} refused {}: doors are not open", self.id, passenger);
            return false;
        }
        if self.is_full() {
            debug!("{} refused {}: car is full", self.id, passenger);
            return false;
        }
        if !self.serves_floor(destination) {
            warn!(
                "{} refused {}: destination {} is outside [{}, {}]",
                self.id, passenger, destination, self.bottom_floor, self.top_floor
            );
            return false;
        }
        if destination == self.current_floor {
            debug!("{} refused {}: already at floor {}", self.id, passenger, destination);
            return false;
        }
        if self.passengers.contains(&passenger) {
            return false;
        }

        self.passengers.push(passenger);
        self.destinations.entry(destination).or_default().push(passenger);
        info!(
            "{} boarded {} at floor {} heading to {}",
            passenger, self.id, self.current_floor, destination
        );
        true
    }

    pub fn should_exit(&self, passenger: PassengerId) -> bool {
        self.destinations
            .get(&self.current_floor)
            .map_or(false, |bucket| bucket.contains(&passenger))
    }

    /// Lets `passenger` off at the current floor. Returns false, changing
    /// nothing, when they are not headed here.
    pub fn exit(&mut self, passenger: PassengerId) -> bool {
        let floor = self.current_floor;
        let bucket = match self.destinations.get_mut(&floor) {
            Some(bucket) => bucket,
            None => return false,
        };
        let index = match bucket.iter().position(|p| *p == passenger) {
            Some(index) => index,
            None => return false,
        };

        bucket.remove(index);
        if bucket.is_empty() {
            // Drops the drop-off stop; a pending pickup here stays scheduled
            self.destinations.remove(&floor);
        }
        self.passengers.retain(|p| *p != passenger);
        info!("{} left {} at floor {}", passenger, self.id, floor);
        true
    }

    /***************************************/
    /*           State machine             */
    /***************************************/

    /// Forces the doors open and restarts the dwell timer. Only meant to be
    /// called while the car stands at a floor.
    pub fn open_doors(&mut self) {
        self.state = CarState::DoorsOpen;
        self.door_timer = self.door_open_duration;
    }

    pub fn tick(&mut self, dt: f64, layout: &dyn FloorLayout) {
        match self.state {
            CarState::Idle => {
                if self.has_stops() {
                    self.process_next_stop();
                }
            }
            CarState::MovingUp | CarState::MovingDown => self.advance(dt, layout),
            CarState::DoorsOpen => {
                self.door_timer -= dt;
                if self.door_timer <= 0.0 {
                    self.door_timer = 0.0;
                    self.state = CarState::DoorsClosing;
                    debug!("{} closing doors at floor {}", self.id, self.current_floor);
                }
            }
            CarState::DoorsClosing => self.process_next_stop(),
        }
    }

    fn advance(&mut self, dt: f64, layout: &dyn FloorLayout) {
        let next_floor = if self.state == CarState::MovingUp {
            self.current_floor + 1
        } else {
            self.current_floor - 1
        };
        // At most one floor per tick, so no stop on the way is jumped over
        let floor_gap = (layout.walk_level(next_floor) - layout.walk_level(self.current_floor)).abs();
        let step = (self.speed * dt).min(floor_gap);
        let target_level = layout.walk_level(self.target_floor);

        // Target arrival
        if (target_level - self.position).abs() <= step {
            self.position = target_level;
            self.current_floor = self.target_floor;
            if self.has_stop(self.target_floor) {
                self.arrive(self.target_floor);
            } else {
                debug!(
                    "{} reached floor {} which is no longer a stop",
                    self.id, self.target_floor
                );
                self.process_next_stop();
            }
            return;
        }

        if self.state == CarState::MovingUp {
            self.position += step;
        } else {
            self.position -= step;
        }
        trace!("{} at height {:.2}", self.id, self.position);

        // Drive-by interception
        let passing = layout.floor_from_position(self.position);
        if passing == self.current_floor {
            return;
        }
        let passing_level = layout.walk_level(passing);
        if (passing_level - self.position).abs() > step {
            return;
        }

        if self.has_stop(passing) {
            debug!(
                "{} intercepting stop at floor {} on the way to {}",
                self.id, passing, self.target_floor
            );
            self.position = passing_level;
            self.current_floor = passing;
            self.arrive(passing);
        } else {
            self.current_floor = passing;
        }
    }

    fn arrive(&mut self, floor: i32) {
        self.pickup_stops.remove(&floor);
        self.target_floor = floor;
        self.open_doors();
        info!("{} doors open at floor {}", self.id, floor);
    }

    fn process_next_stop(&mut self) {
        // Riders who stayed on past their floor do not reopen the doors here,
        // only a pickup does
        let mut stops = self.stops();
        if !self.pickup_stops.contains(&self.current_floor) {
            stops.remove(&self.current_floor);
        }

        match scheduler::next_stop(&stops, self.current_floor, self.direction) {
            None => {
                self.state = CarState::Idle;
                self.target_floor = self.current_floor;
            }
            Some(floor) if floor == self.current_floor => self.arrive(floor),
            Some(floor) => {
                self.target_floor = floor;
                self.direction = Direction::between(self.current_floor, floor);
                self.state = match self.direction {
                    Direction::Up => CarState::MovingUp,
                    _ => CarState::MovingDown,
                };
                debug!(
                    "{} heading {} from floor {} to floor {}",
                    self.id, self.direction, self.current_floor, floor
                );
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn test_set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    #[cfg(test)]
    pub(crate) fn test_place_at(&mut self, floor: i32, layout: &dyn FloorLayout) {
        self.current_floor = floor;
        self.target_floor = floor;
        self.position = layout.walk_level(floor);
    }
}
