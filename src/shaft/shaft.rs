/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info, warn};
use serde::Serialize;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{CarConfig, ShaftConfig};
use crate::elevator::Car;
use crate::events::{EventSender, SimEvent};
use crate::layout::FloorLayout;
use crate::shared::{CarId, CarState, Direction, PassengerId, Position, ShaftId, SimError, TowerId};

/***************************************/
/*       Public data structures        */
/***************************************/

/// An outstanding request for a car at `floor`, keyed by `(floor, direction)`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub floor: i32,
    pub direction: Direction,
    pub accumulated_wait_time: f64,
    pub waiting_passengers: Vec<PassengerId>,
    #[serde(skip)]
    since_dispatch: f64,
}

impl CallRequest {
    fn new(floor: i32, direction: Direction, passenger: PassengerId) -> CallRequest {
        CallRequest {
            floor,
            direction,
            accumulated_wait_time: 0.0,
            waiting_passengers: vec![passenger],
            since_dispatch: 0.0,
        }
    }

    fn matches(&self, floor: i32, direction: Direction) -> bool {
        self.floor == floor && self.direction == direction
    }
}

/**
 * A vertical channel hosting one or more cars over a floor range.
 *
 * The shaft turns call requests into car stops, advances its cars every tick
 * and retires calls once a car stands at the called floor. Cars are only ever
 * touched through their public methods.
 *
 * # Fields
 * - `id`:              Registry handle.
 * - `tower`:           Tower the shaft belongs to.
 * - `bottom_floor`:    Lowest served floor.
 * - `top_floor`:       Highest served floor.
 * - `x`:               Horizontal position of the shaft, used for wait/exit spots.
 * - `cars`:            Cars running in this shaft.
 * - `pending_calls`:   Unsatisfied call requests in FIFO order.
 * - `config`:          Offsets and timing for calls.
 * - `car_config`:      Settings for cars added to this shaft.
 * - `events_tx`:       Arrival notifications go out through here.
 */
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Shaft {
    id: ShaftId,
    tower: TowerId,
    bottom_floor: i32,
    top_floor: i32,
    x: f64,
    cars: Vec<Car>,
    pending_calls: Vec<CallRequest>,
    #[serde(skip)]
    config: ShaftConfig,
    #[serde(skip)]
    car_config: CarConfig,
    #[serde(skip)]
    events_tx: EventSender,
}

impl Shaft {
    pub fn new(
        id: ShaftId,
        tower: TowerId,
        bottom_floor: i32,
        top_floor: i32,
        x: f64,
        config: &ShaftConfig,
        car_config: &CarConfig,
        events_tx: EventSender,
    ) -> Result<Shaft, SimError> {
        if bottom_floor > top_floor {
            return Err(SimError::InvalidFloorRange {
                bottom: bottom_floor,
                top: top_floor,
            });
        }

        Ok(Shaft {
            id,
            tower,
            bottom_floor,
            top_floor,
            x,
            cars: Vec::new(),
            pending_calls: Vec::new(),
            config: config.clone(),
            car_config: car_config.clone(),
            events_tx,
        })
    }

    /***************************************/
    /*              Queries                */
    /***************************************/
    pub fn id(&self) -> ShaftId {
        self.id
    }

    pub fn tower(&self) -> TowerId {
        self.tower
    }

    pub fn bottom_floor(&self) -> i32 {
        self.bottom_floor
    }

    pub fn top_floor(&self) -> i32 {
        self.top_floor
    }

    pub fn serves_floor(&self, floor: i32) -> bool {
        floor >= self.bottom_floor && floor <= self.top_floor
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn car(&self, id: CarId) -> Option<&Car> {
        self.cars.iter().find(|car| car.id() == id)
    }

    pub fn car_mut(&mut self, id: CarId) -> Option<&mut Car> {
        self.cars.iter_mut().find(|car| car.id() == id)
    }

    pub fn pending_calls(&self) -> &[CallRequest] {
        &self.pending_calls
    }

    /// A car standing at `floor` that passengers can step into right now.
    pub fn get_available_car_at_floor(&self, floor: i32) -> Option<&Car> {
        self.cars
            .iter()
            .find(|car| car.current_floor() == floor && car.state().is_boardable())
    }

    /// Rough wait for a car at `floor`, one time unit per floor of distance.
    pub fn estimate_wait_time(&self, floor: i32) -> f64 {
        if self
            .cars
            .iter()
            .any(|car| car.current_floor() == floor && car.state() == CarState::DoorsOpen)
        {
            return 0.0;
        }

        self.cars
            .iter()
            .map(|car| (car.current_floor() - floor).abs())
            .min()
            .map_or(self.config.fallback_wait_estimate, |floors| floors as f64)
    }

    /// Where a passenger waits for a car on `floor`.
    pub fn get_wait_position(&self, floor: i32, layout: &dyn FloorLayout) -> Position {
        Position {
            x: self.x + self.config.wait_offset,
            y: layout.walk_level(floor),
        }
    }

    /// Where a passenger steps out to on `floor`.
    pub fn get_exit_position(&self, floor: i32, layout: &dyn FloorLayout) -> Position {
        Position {
            x: self.x + self.config.exit_offset,
            y: layout.walk_level(floor),
        }
    }

    /***************************************/
    /*           Administration            */
    /***************************************/

    /// Adds a car parked idle at the bottom floor.
    pub fn add_car(&mut self, id: CarId, layout: &dyn FloorLayout) {
        self.cars.push(Car::new(
            id,
            self.id,
            self.bottom_floor,
            self.top_floor,
            &self.car_config,
            layout,
        ));
        info!("{} added to {} ({} cars)", id, self.id, self.cars.len());
    }

    pub fn extend_to_floor(&mut self, new_top: i32) -> bool {
        if new_top <= self.top_floor {
            return false;
        }

        self.top_floor = new_top;
        for car in self.cars.iter_mut() {
            car.set_top_floor(new_top);
        }
        info!("{} now serves floors {} to {}", self.id, self.bottom_floor, new_top);
        true
    }

    /// Everyone still waiting on a call, in call order.
    pub(crate) fn waiting_passengers(&self) -> Vec<PassengerId> {
        self.pending_calls
            .iter()
            .flat_map(|call| call.waiting_passengers.iter().copied())
            .collect()
    }

    /***************************************/
    /*         Calls and dispatch          */
    /***************************************/
    pub fn call(&mut self, floor: i32, direction: Direction, passenger: PassengerId) -> bool {
        if !self.serves_floor(floor) {
            warn!(
                "{} ignoring call at floor {} outside [{}, {}]",
                self.id, floor, self.bottom_floor, self.top_floor
            );
            return false;
        }
        if direction == Direction::Stop {
            warn!("{} ignoring call at floor {} without a direction", self.id, floor);
            return false;
        }

        if let Some(call) = self
            .pending_calls
            .iter_mut()
            .find(|call| call.matches(floor, direction))
        {
            if !call.waiting_passengers.contains(&passenger) {
                call.waiting_passengers.push(passenger);
            }
            debug!(
                "{} joined pending call at floor {} going {} on {}",
                passenger, floor, direction, self.id
            );
            return true;
        }

        self.pending_calls
            .push(CallRequest::new(floor, direction, passenger));
        self.events_tx.send(SimEvent::CallPlaced {
            shaft: self.id,
            floor,
            direction,
        });
        self.dispatch(floor);
        true
    }

    /// Gives `floor` to the closest idle car, or to the closest car at all
    /// when none is idle.
    fn dispatch(&mut self, floor: i32) -> Option<CarId> {
        let distance = |car: &&mut Car| (car.current_floor() - floor).abs();

        let has_idle = self.cars.iter().any(|car| car.state() == CarState::Idle);
        let car = if has_idle {
            self.cars
                .iter_mut()
                .filter(|car| car.state() == CarState::Idle)
                .min_by_key(distance)
        } else {
            self.cars.iter_mut().min_by_key(distance)
        };

        match car {
            Some(car) => {
                car.add_stop(floor);
                debug!("{} dispatched {} to floor {}", self.id, car.id(), floor);
                Some(car.id())
            }
            None => {
                warn!("{} has no cars to serve floor {}", self.id, floor);
                None
            }
        }
    }

    /***************************************/
    /*             Tick phases             */
    /***************************************/
    pub fn advance_cars(&mut self, dt: f64, layout: &dyn FloorLayout) {
        for car in self.cars.iter_mut() {
            car.tick(dt, layout);
        }
    }

    /// Retires every call that has a boardable car at its floor and ages the
    /// rest. A call nobody is heading for after `redispatch_after` seconds is
    /// dispatched again.
    pub fn reconcile_calls(&mut self, dt: f64) {
        let mut redispatch = Vec::new();
        let calls = std::mem::take(&mut self.pending_calls);

        for mut call in calls {
            if let Some(car) = self.get_available_car_at_floor(call.floor) {
                info!(
                    "{} served call at floor {} going {} after {:.1}s",
                    car.id(),
                    call.floor,
                    call.direction,
                    call.accumulated_wait_time
                );
                self.events_tx.send(SimEvent::CarArrived {
                    shaft: self.id,
                    car: car.id(),
                    floor: call.floor,
                    direction: call.direction,
                    waiting: call.waiting_passengers,
                });
                continue;
            }

            call.accumulated_wait_time += dt;
            call.since_dispatch += dt;
            if call.since_dispatch >= self.config.redispatch_after
                && !self.cars.iter().any(|car| car.has_stop(call.floor))
            {
                call.since_dispatch = 0.0;
                redispatch.push(call.floor);
            }
            self.pending_calls.push(call);
        }

        for floor in redispatch {
            warn!("{} call at floor {} is stuck, dispatching again", self.id, floor);
            self.dispatch(floor);
        }
    }

    pub fn tick(&mut self, dt: f64, layout: &dyn FloorLayout) {
        self.advance_cars(dt, layout);
        self.reconcile_calls(dt);
    }
}
