pub mod car;
pub mod scheduler;

pub use car::Car;
pub use scheduler::next_stop;
