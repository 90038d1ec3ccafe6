pub mod error;
pub mod macros;
pub mod structs;

pub use error::SimError;
pub use structs::CarId;
pub use structs::CarState;
pub use structs::Direction;
pub use structs::PassengerId;
pub use structs::Position;
pub use structs::ShaftId;
pub use structs::TowerId;
