pub mod shaft;

pub use shaft::CallRequest;
pub use shaft::Shaft;
