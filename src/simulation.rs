/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info};
use serde::Serialize;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{Config, PassengerSpec};
use crate::dispatcher::Dispatcher;
use crate::events::SimEvent;
use crate::passenger::{PassengerAgent, TripState};
use crate::shared::SimError;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub ticks: u64,
    pub elapsed: f64,
    pub delivered: usize,
    pub gave_up: usize,
    pub in_transit: usize,
    pub calls_placed: usize,
    pub arrivals: usize,
    pub stranded: usize,
}

/***************************************/
/*             Public API              */
/***************************************/

/**
 * Single-threaded tick driver.
 *
 * Every tick runs the same phases in the same order: spawn due passengers,
 * advance all cars, reconcile all calls, let every passenger act, then
 * drain the event queue.
 *
 * # Fields
 * - `dispatcher`:      The elevator core.
 * - `scheduled`:       Trips that have not started yet, by spawn tick.
 * - `agents`:          Passengers that have started their trip.
 * - `tick_duration`:   Simulated seconds per tick.
 * - `tick`:            Number of ticks run so far.
 * - `counters`:        Event totals collected while draining.
 */
pub struct Simulation {
    dispatcher: Dispatcher,
    scheduled: Vec<PassengerSpec>,
    agents: Vec<PassengerAgent>,
    tick_duration: f64,
    tick: u64,
    counters: SimulationReport,
}

impl Simulation {
    pub fn new(dispatcher: Dispatcher, tick_duration: f64) -> Simulation {
        Simulation {
            dispatcher,
            scheduled: Vec::new(),
            agents: Vec::new(),
            tick_duration,
            tick: 0,
            counters: SimulationReport::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Simulation, SimError> {
        let dispatcher = Dispatcher::from_config(config)?;
        let mut simulation = Simulation::new(dispatcher, config.simulation.tick_duration);
        for spec in config.passengers.iter() {
            simulation.schedule(spec.clone());
        }
        Ok(simulation)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn agents(&self) -> &[PassengerAgent] {
        &self.agents
    }

    /// Queues a trip to start once the simulation reaches its spawn tick.
    pub fn schedule(&mut self, spec: PassengerSpec) {
        let index = self
            .scheduled
            .partition_point(|other| other.spawn_tick <= spec.spawn_tick);
        self.scheduled.insert(index, spec);
    }

    pub fn is_finished(&self) -> bool {
        self.scheduled.is_empty() && self.agents.iter().all(|agent| agent.is_done())
    }

    pub fn step(&mut self) {
        let due = self
            .scheduled
            .partition_point(|spec| spec.spawn_tick <= self.tick);
        for spec in self.scheduled.drain(..due) {
            debug!("Spawning {} at tick {}", spec.id, self.tick);
            self.agents.push(PassengerAgent::from_spec(&spec));
        }

        self.dispatcher.tick(self.tick_duration);
        for agent in self.agents.iter_mut() {
            agent.step(&mut self.dispatcher, self.tick_duration);
        }

        for event in self.dispatcher.drain_events() {
            self.record(&event);
        }
        self.tick += 1;
    }

    /// Runs up to `ticks` ticks, stopping early once every trip is over.
    pub fn run(&mut self, ticks: u64) -> SimulationReport {
        for _ in 0..ticks {
            if self.is_finished() {
                break;
            }
            self.step();
        }

        let report = self.report();
        info!(
            "Simulation stopped after {} ticks: {} delivered, {} gave up, {} in transit",
            report.ticks, report.delivered, report.gave_up, report.in_transit
        );
        report
    }

    pub fn report(&self) -> SimulationReport {
        let count = |wanted: fn(&TripState) -> bool| {
            self.agents
                .iter()
                .filter(|agent| wanted(&agent.state()))
                .count()
        };

        SimulationReport {
            ticks: self.tick,
            elapsed: self.tick as f64 * self.tick_duration,
            delivered: count(|state| *state == TripState::Arrived),
            gave_up: count(|state| *state == TripState::GaveUp),
            in_transit: self.scheduled.len()
                + count(|state| {
                    !matches!(state, TripState::Arrived | TripState::GaveUp)
                }),
            ..self.counters.clone()
        }
    }

    fn record(&mut self, event: &SimEvent) {
        match event {
            SimEvent::CallPlaced { .. } => self.counters.calls_placed += 1,
            SimEvent::CarArrived {
                car, floor, waiting, ..
            } => {
                debug!("{} arrived at floor {} for {} waiting", car, floor, waiting.len());
                self.counters.arrivals += 1;
            }
            SimEvent::ShaftRemoved {
                shaft, stranded, ..
            } => {
                info!("{} removed, {} passengers stranded", shaft, stranded.len());
                self.counters.stranded += stranded.len();
            }
        }
    }
}
