/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{CarConfig, Config, ShaftConfig};
use crate::elevator::Car;
use crate::events::{EventQueue, SimEvent};
use crate::layout::FloorLayout;
use crate::shaft::Shaft;
use crate::shared::{CarId, Direction, PassengerId, Position, ShaftId, SimError, TowerId};

/***************************************/
/*       Public data structures        */
/***************************************/

/// Serializable view of every shaft, car and pending call.
#[derive(Serialize, Debug)]
pub struct Snapshot<'a> {
    pub towers: BTreeMap<TowerId, Vec<&'a Shaft>>,
}

/***************************************/
/*             Public API              */
/***************************************/

/**
 * Registry of every shaft, grouped by tower, and the entry point for
 * passenger agents.
 *
 * The dispatcher is built once when the simulation starts and handed by
 * reference to whoever needs it. It routes calls to the right shaft, hands
 * out car handles and drives the per-tick update of all shafts.
 *
 * # Fields
 * - `shafts_by_tower`:     Shafts per tower, in registration order.
 * - `layout`:              Floor geometry shared by every car.
 * - `shaft_config`:        Settings for new shafts.
 * - `car_config`:          Settings for new cars.
 * - `events`:              Queue shafts report to, drained by the simulation driver.
 * - `next_shaft_id`:       Next free shaft handle.
 * - `next_car_id`:         Next free car handle.
 */
pub struct Dispatcher {
    shafts_by_tower: BTreeMap<TowerId, Vec<Shaft>>,
    layout: Box<dyn FloorLayout>,
    shaft_config: ShaftConfig,
    car_config: CarConfig,
    events: EventQueue,
    next_shaft_id: u32,
    next_car_id: u32,
}

impl Dispatcher {
    pub fn new(
        shaft_config: &ShaftConfig,
        car_config: &CarConfig,
        layout: Box<dyn FloorLayout>,
    ) -> Dispatcher {
        Dispatcher {
            shafts_by_tower: BTreeMap::new(),
            layout,
            shaft_config: shaft_config.clone(),
            car_config: car_config.clone(),
            events: EventQueue::new(),
            next_shaft_id: 0,
            next_car_id: 0,
        }
    }

    /// Builds a dispatcher with every shaft listed in the scenario.
    pub fn from_config(config: &Config) -> Result<Dispatcher, SimError> {
        let mut dispatcher = Dispatcher::new(
            &config.shaft,
            &config.car,
            Box::new(config.layout),
        );
        for spec in config.shafts.iter() {
            dispatcher.create_shaft(
                spec.tower,
                spec.bottom_floor,
                spec.top_floor,
                spec.cars,
                spec.x,
            )?;
        }
        Ok(dispatcher)
    }

    pub fn layout(&self) -> &dyn FloorLayout {
        self.layout.as_ref()
    }

    /***************************************/
    /*           Administration            */
    /***************************************/
    pub fn create_shaft(
        &mut self,
        tower: TowerId,
        bottom_floor: i32,
        top_floor: i32,
        cars: usize,
        x: f64,
    ) -> Result<ShaftId, SimError> {
        let id = ShaftId(self.next_shaft_id);
        let mut shaft = Shaft::new(
            id,
            tower,
            bottom_floor,
            top_floor,
            x,
            &self.shaft_config,
            &self.car_config,
            self.events.sender(),
        )?;
        self.next_shaft_id += 1;

        for _ in 0..cars {
            let car_id = CarId(self.next_car_id);
            self.next_car_id += 1;
            shaft.add_car(car_id, self.layout.as_ref());
        }

        info!(
            "Created {} in {} serving floors {} to {}",
            id, tower, bottom_floor, top_floor
        );
        self.shafts_by_tower.entry(tower).or_default().push(shaft);
        Ok(id)
    }

    /// Demolishes a shaft together with its cars and pending calls.
    pub fn remove_shaft(&mut self, id: ShaftId) -> bool {
        for (tower, shafts) in self.shafts_by_tower.iter_mut() {
            if let Some(index) = shafts.iter().position(|shaft| shaft.id() == id) {
                let shaft = shafts.remove(index);
                let mut stranded = shaft.waiting_passengers();
                for car in shaft.cars() {
                    stranded.extend(car.passengers().iter().copied());
                }

                info!("Removed {} from {} ({} stranded)", id, tower, stranded.len());
                self.events.sender().send(SimEvent::ShaftRemoved {
                    tower: *tower,
                    shaft: id,
                    stranded,
                });
                return true;
            }
        }
        warn!("Cannot remove unknown {}", id);
        false
    }

    pub fn extend_shaft(&mut self, id: ShaftId, new_top: i32) -> Result<bool, SimError> {
        let shaft = self.shaft_mut(id).ok_or(SimError::UnknownShaft(id))?;
        Ok(shaft.extend_to_floor(new_top))
    }

    pub fn add_car(&mut self, id: ShaftId) -> Result<CarId, SimError> {
        let car_id = CarId(self.next_car_id);
        let layout = self.layout.as_ref();
        let shaft = self
            .shafts_by_tower
            .values_mut()
            .flat_map(|shafts| shafts.iter_mut())
            .find(|shaft| shaft.id() == id)
            .ok_or(SimError::UnknownShaft(id))?;

        shaft.add_car(car_id, layout);
        self.next_car_id += 1;
        Ok(car_id)
    }

    /***************************************/
    /*              Lookups                */
    /***************************************/
    pub fn shafts_in_tower(&self, tower: TowerId) -> &[Shaft] {
        self.shafts_by_tower
            .get(&tower)
            .map(|shafts| shafts.as_slice())
            .unwrap_or(&[])
    }

    pub fn shafts(&self) -> impl Iterator<Item = &Shaft> {
        self.shafts_by_tower.values().flat_map(|shafts| shafts.iter())
    }

    pub fn shaft(&self, id: ShaftId) -> Option<&Shaft> {
        self.shafts().find(|shaft| shaft.id() == id)
    }

    fn shaft_mut(&mut self, id: ShaftId) -> Option<&mut Shaft> {
        self.shafts_by_tower
            .values_mut()
            .flat_map(|shafts| shafts.iter_mut())
            .find(|shaft| shaft.id() == id)
    }

    pub fn car(&self, id: CarId) -> Option<&Car> {
        self.shafts().find_map(|shaft| shaft.car(id))
    }

    fn car_mut(&mut self, id: CarId) -> Option<&mut Car> {
        self.shafts_by_tower
            .values_mut()
            .flat_map(|shafts| shafts.iter_mut())
            .find_map(|shaft| shaft.car_mut(id))
    }

    /***************************************/
    /*              Routing                */
    /***************************************/

    /// First shaft in `tower`, in registration order, that reaches `floor`.
    pub fn find_shaft_serving_floor(&self, floor: i32, tower: TowerId) -> Option<&Shaft> {
        self.shafts_in_tower(tower)
            .iter()
            .find(|shaft| shaft.serves_floor(floor))
    }

    /// The shaft covering both ends of the trip with the shortest estimated
    /// wait at `from`. Earlier shafts win ties.
    pub fn find_best_shaft(&self, from: i32, to: i32, tower: TowerId) -> Option<&Shaft> {
        self.shafts_in_tower(tower)
            .iter()
            .filter(|shaft| shaft.serves_floor(from) && shaft.serves_floor(to))
            .min_by(|a, b| {
                a.estimate_wait_time(from)
                    .total_cmp(&b.estimate_wait_time(from))
            })
    }

    pub fn call_elevator(
        &mut self,
        floor: i32,
        direction: Direction,
        tower: TowerId,
        passenger: PassengerId,
    ) -> bool {
        let id = match self.find_shaft_serving_floor(floor, tower) {
            Some(shaft) => shaft.id(),
            None => {
                warn!("No shaft in {} serves floor {}", tower, floor);
                return false;
            }
        };

        match self.shaft_mut(id) {
            Some(shaft) => shaft.call(floor, direction, passenger),
            None => false,
        }
    }

    /// Calls a car for a trip from `from` to `to` on the best shaft covering
    /// both floors. Returns the shaft the passenger should wait at.
    pub fn request_travel(
        &mut self,
        from: i32,
        to: i32,
        tower: TowerId,
        passenger: PassengerId,
    ) -> Option<ShaftId> {
        let direction = Direction::between(from, to);
        if direction == Direction::Stop {
            debug!("{} is already at floor {}", passenger, to);
            return None;
        }

        let id = match self.find_best_shaft(from, to, tower) {
            Some(shaft) => shaft.id(),
            None => {
                warn!("No shaft in {} connects floors {} and {}", tower, from, to);
                return None;
            }
        };

        let shaft = self.shaft_mut(id)?;
        if shaft.call(from, direction, passenger) {
            Some(id)
        } else {
            None
        }
    }

    /***************************************/
    /*          Car interaction            */
    /***************************************/
    pub fn get_available_car_at_floor(&self, shaft: ShaftId, floor: i32) -> Option<CarId> {
        self.shaft(shaft)?
            .get_available_car_at_floor(floor)
            .map(|car| car.id())
    }

    pub fn board(&mut self, car: CarId, passenger: PassengerId, destination: i32) -> bool {
        match self.car_mut(car) {
            Some(car) => car.board(passenger, destination),
            None => false,
        }
    }

    pub fn should_exit(&self, car: CarId, passenger: PassengerId) -> bool {
        self.car(car)
            .map_or(false, |car| car.should_exit(passenger))
    }

    pub fn exit(&mut self, car: CarId, passenger: PassengerId) -> bool {
        match self.car_mut(car) {
            Some(car) => car.exit(passenger),
            None => false,
        }
    }

    pub fn get_wait_position(&self, shaft: ShaftId, floor: i32) -> Option<Position> {
        self.shaft(shaft)
            .map(|shaft| shaft.get_wait_position(floor, self.layout.as_ref()))
    }

    pub fn get_exit_position(&self, shaft: ShaftId, floor: i32) -> Option<Position> {
        self.shaft(shaft)
            .map(|shaft| shaft.get_exit_position(floor, self.layout.as_ref()))
    }

    /***************************************/
    /*             Tick driver             */
    /***************************************/

    /// Advances every car, then lets every shaft reconcile its calls.
    pub fn tick(&mut self, dt: f64) {
        let layout = self.layout.as_ref();
        for shafts in self.shafts_by_tower.values_mut() {
            for shaft in shafts.iter_mut() {
                shaft.advance_cars(dt, layout);
            }
        }
        for shafts in self.shafts_by_tower.values_mut() {
            for shaft in shafts.iter_mut() {
                shaft.reconcile_calls(dt);
            }
        }
    }

    pub fn drain_events(&self) -> Vec<SimEvent> {
        self.events.drain()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            towers: self
                .shafts_by_tower
                .iter()
                .map(|(tower, shafts)| (*tower, shafts.iter().collect()))
                .collect(),
        }
    }
}
