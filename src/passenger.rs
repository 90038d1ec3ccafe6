/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info, warn};
use serde::Serialize;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::PassengerSpec;
use crate::dispatcher::Dispatcher;
use crate::shaft::Shaft;
use crate::shared::{CarId, Direction, PassengerId, ShaftId, TowerId};

/***************************************/
/*               Enums                 */
/***************************************/
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum TripState {
    Requesting,
    Waiting { shaft: ShaftId, waited: f64 },
    Riding { car: CarId },
    Arrived,
    GaveUp,
}

/***************************************/
/*             Public API              */
/***************************************/

/**
 * A simple commuter taking one elevator trip.
 *
 * The agent owns its own patience: the core never times a call out, so a
 * passenger that has waited longer than `patience` seconds simply stops
 * polling and gives up.
 *
 * # Fields
 * - `id`:          Passenger handle used in calls and boarding.
 * - `tower`:       Tower the trip happens in.
 * - `origin`:      Floor the passenger starts on.
 * - `destination`: Floor the passenger wants to reach.
 * - `patience`:    Seconds the passenger is willing to wait for a car.
 * - `state`:       Progress of the trip.
 */
#[derive(Serialize, Debug, Clone)]
pub struct PassengerAgent {
    id: PassengerId,
    tower: TowerId,
    origin: i32,
    destination: i32,
    patience: f64,
    state: TripState,
}

impl PassengerAgent {
    pub fn new(
        id: PassengerId,
        tower: TowerId,
        origin: i32,
        destination: i32,
        patience: f64,
    ) -> PassengerAgent {
        PassengerAgent {
            id,
            tower,
            origin,
            destination,
            patience,
            state: TripState::Requesting,
        }
    }

    pub fn from_spec(spec: &PassengerSpec) -> PassengerAgent {
        PassengerAgent::new(
            spec.id,
            spec.tower,
            spec.origin,
            spec.destination,
            spec.patience,
        )
    }

    pub fn id(&self) -> PassengerId {
        self.id
    }

    pub fn state(&self) -> TripState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, TripState::Arrived | TripState::GaveUp)
    }

    /// Advances the trip by one tick against the dispatcher.
    pub fn step(&mut self, dispatcher: &mut Dispatcher, dt: f64) {
        self.state = match self.state {
            TripState::Requesting => self.request(dispatcher),
            TripState::Waiting { shaft, waited } => self.wait(dispatcher, shaft, waited + dt),
            TripState::Riding { car } => self.ride(dispatcher, car),
            done => done,
        };
    }

    fn request(&self, dispatcher: &mut Dispatcher) -> TripState {
        if self.origin == self.destination {
            return TripState::Arrived;
        }

        match dispatcher.request_travel(self.origin, self.destination, self.tower, self.id) {
            Some(shaft) => {
                debug!("{} waiting at {} floor {}", self.id, shaft, self.origin);
                TripState::Waiting { shaft, waited: 0.0 }
            }
            None => {
                warn!(
                    "{} found no elevator from floor {} to {}",
                    self.id, self.origin, self.destination
                );
                TripState::GaveUp
            }
        }
    }

    fn wait(&self, dispatcher: &mut Dispatcher, shaft: ShaftId, waited: f64) -> TripState {
        if let Some(car) = dispatcher.get_available_car_at_floor(shaft, self.origin) {
            if dispatcher.board(car, self.id, self.destination) {
                return TripState::Riding { car };
            }
        }

        let needs_new_call = match dispatcher.shaft(shaft) {
            Some(current) => !self.is_served_by(current),
            None => {
                warn!("{} lost {} while waiting", self.id, shaft);
                return TripState::GaveUp;
            }
        };
        if waited > self.patience {
            warn!("{} gave up after waiting {:.1}s", self.id, waited);
            return TripState::GaveUp;
        }

        if needs_new_call {
            // The call was retired by a car we could not get on
            debug!("{} calling again at floor {}", self.id, self.origin);
            return match dispatcher.request_travel(self.origin, self.destination, self.tower, self.id) {
                Some(shaft) => TripState::Waiting { shaft, waited },
                None => TripState::GaveUp,
            };
        }
        TripState::Waiting { shaft, waited }
    }

    /// True while a call for this trip is pending or a car is still standing
    /// at the origin floor.
    fn is_served_by(&self, shaft: &Shaft) -> bool {
        let direction = Direction::between(self.origin, self.destination);
        let called = shaft
            .pending_calls()
            .iter()
            .any(|call| call.floor == self.origin && call.direction == direction);
        let car_here = shaft
            .cars()
            .iter()
            .any(|car| car.current_floor() == self.origin && !car.state().is_moving());
        called || car_here
    }

    fn ride(&self, dispatcher: &mut Dispatcher, car: CarId) -> TripState {
        if dispatcher.car(car).is_none() {
            // The car is gone, count the trip as done
            info!("{} lost {} mid-ride, assuming arrival", self.id, car);
            return TripState::Arrived;
        }

        if dispatcher.should_exit(car, self.id) && dispatcher.exit(car, self.id) {
            info!("{} arrived at floor {}", self.id, self.destination);
            return TripState::Arrived;
        }
        TripState::Riding { car }
    }
}
