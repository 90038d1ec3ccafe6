/***************************************/
/*              Modules                */
/***************************************/
pub mod config;
pub mod dispatcher;
pub mod elevator;
pub mod events;
pub mod layout;
pub mod passenger;
pub mod shaft;
pub mod shared;
pub mod simulation;

/***************************************/
/*             Re-exports              */
/***************************************/
pub use config::{load_config, parse_config, Config};
pub use dispatcher::{Dispatcher, Snapshot};
pub use elevator::Car;
pub use events::SimEvent;
pub use layout::{FloorLayout, UniformLayout};
pub use passenger::{PassengerAgent, TripState};
pub use shaft::{CallRequest, Shaft};
pub use shared::{CarId, CarState, Direction, PassengerId, Position, ShaftId, SimError, TowerId};
pub use simulation::{Simulation, SimulationReport};
