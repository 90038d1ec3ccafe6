pub mod dispatcher;
pub mod dispatcher_tests;

pub use dispatcher::Dispatcher;
pub use dispatcher::Snapshot;
