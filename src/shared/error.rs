use std::fmt;
use std::io;

use crate::shared::ShaftId;

/// Errors raised by the administrative and I/O paths. Scheduling operations
/// never return these; they report success with a `bool` instead.
#[derive(Debug)]
pub enum SimError {
    Io(io::Error),
    ConfigParse(toml::de::Error),
    InvalidFloorRange { bottom: i32, top: i32 },
    UnknownShaft(ShaftId),
    InvalidSetting { key: &'static str, value: f64 },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Io(e) => write!(f, "failed to read configuration file: {}", e),
            SimError::ConfigParse(e) => write!(f, "failed to parse configuration file: {}", e),
            SimError::InvalidFloorRange { bottom, top } => {
                write!(f, "invalid floor range: bottom {} is above top {}", bottom, top)
            }
            SimError::UnknownShaft(id) => write!(f, "no such shaft: {}", id),
            SimError::InvalidSetting { key, value } => {
                write!(f, "invalid setting: {} = {}", key, value)
            }
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Io(e) => Some(e),
            SimError::ConfigParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SimError {
    fn from(e: io::Error) -> Self {
        SimError::Io(e)
    }
}

impl From<toml::de::Error> for SimError {
    fn from(e: toml::de::Error) -> Self {
        SimError::ConfigParse(e)
    }
}
