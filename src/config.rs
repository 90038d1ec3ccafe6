/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::layout::UniformLayout;
use crate::shared::{PassengerId, SimError, TowerId};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub car: CarConfig,
    pub shaft: ShaftConfig,
    pub layout: UniformLayout,
    pub shafts: Vec<ShaftSpec>,
    pub passengers: Vec<PassengerSpec>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_duration: f64,
    pub ticks: u64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CarConfig {
    pub speed: f64,
    pub capacity: usize,
    pub door_open_duration: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ShaftConfig {
    pub wait_offset: f64,
    pub exit_offset: f64,
    pub fallback_wait_estimate: f64,
    pub redispatch_after: f64,
}

/// A shaft to build when the scenario starts.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ShaftSpec {
    pub tower: TowerId,
    pub bottom_floor: i32,
    pub top_floor: i32,
    #[serde(default = "default_cars")]
    pub cars: usize,
    #[serde(default)]
    pub x: f64,
}

/// A trip some passenger starts at `spawn_tick`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PassengerSpec {
    pub id: PassengerId,
    pub tower: TowerId,
    pub origin: i32,
    pub destination: i32,
    #[serde(default)]
    pub spawn_tick: u64,
    #[serde(default = "default_patience")]
    pub patience: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tick_duration: 0.1,
            ticks: 1200,
        }
    }
}

impl Default for CarConfig {
    fn default() -> Self {
        CarConfig {
            speed: 2.0,
            capacity: 8,
            door_open_duration: 3.0,
        }
    }
}

impl Default for ShaftConfig {
    fn default() -> Self {
        ShaftConfig {
            wait_offset: -1.0,
            exit_offset: 1.0,
            fallback_wait_estimate: 100.0,
            redispatch_after: 30.0,
        }
    }
}

fn default_cars() -> usize {
    1
}

fn default_patience() -> f64 {
    60.0
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, SimError> {
    let config_str = fs::read_to_string(path)?;
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> Result<Config, SimError> {
    let config: Config = toml::from_str(config_str)?;
    validate_settings(&config)?;
    for shaft in config.shafts.iter() {
        if shaft.bottom_floor > shaft.top_floor {
            return Err(SimError::InvalidFloorRange {
                bottom: shaft.bottom_floor,
                top: shaft.top_floor,
            });
        }
    }
    Ok(config)
}

/// Rejects settings that would stall every car or keep everyone off them.
fn validate_settings(config: &Config) -> Result<(), SimError> {
    let positive = [
        ("simulation.tick_duration", config.simulation.tick_duration),
        ("car.speed", config.car.speed),
        ("layout.floor_height", config.layout.floor_height),
    ];
    for (key, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(SimError::InvalidSetting { key, value });
        }
    }

    let door_open_duration = config.car.door_open_duration;
    if !(door_open_duration.is_finite() && door_open_duration >= 0.0) {
        return Err(SimError::InvalidSetting {
            key: "car.door_open_duration",
            value: door_open_duration,
        });
    }
    if config.car.capacity == 0 {
        return Err(SimError::InvalidSetting {
            key: "car.capacity",
            value: 0.0,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();

        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.car, CarConfig::default());
        assert_eq!(config.shaft, ShaftConfig::default());
        assert!(config.shafts.is_empty());
        assert!(config.passengers.is_empty());
    }

    #[test]
    fn test_scenario_config() {
        // Arrange
        let config_str = r#"
            [simulation]
            tick_duration = 0.05

            [car]
            capacity = 4

            [layout]
            floor_height = 4.0

            [[shafts]]
            tower = 1
            bottom_floor = 0
            top_floor = 9
            cars = 2

            [[passengers]]
            id = 7
            tower = 1
            origin = 0
            destination = 5
        "#;

        // Act
        let config = parse_config(config_str).unwrap();

        // Assert
        assert_eq!(config.simulation.tick_duration, 0.05);
        assert_eq!(config.simulation.ticks, 1200);
        assert_eq!(config.car.capacity, 4);
        assert_eq!(config.car.speed, 2.0);
        assert_eq!(config.layout.floor_height, 4.0);
        assert_eq!(config.shafts[0].tower, TowerId(1));
        assert_eq!(config.shafts[0].cars, 2);
        assert_eq!(config.passengers[0].id, PassengerId(7));
        assert_eq!(config.passengers[0].patience, 60.0);
    }

    #[test]
    fn test_inverted_shaft_range_is_rejected() {
        let config_str = r#"
            [[shafts]]
            tower = 0
            bottom_floor = 5
            top_floor = 1
        "#;

        match parse_config(config_str) {
            Err(SimError::InvalidFloorRange { bottom, top }) => {
                assert_eq!(bottom, 5);
                assert_eq!(top, 1);
            }
            other => panic!("Expected InvalidFloorRange, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        assert!(matches!(
            parse_config("[car]\nspeed = \"fast\""),
            Err(SimError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_stalling_settings_are_rejected() {
        let cases = [
            ("[car]\nspeed = 0.0", "car.speed"),
            ("[car]\nspeed = -1.5", "car.speed"),
            ("[simulation]\ntick_duration = 0.0", "simulation.tick_duration"),
            ("[car]\ncapacity = 0", "car.capacity"),
            ("[layout]\nfloor_height = 0.0", "layout.floor_height"),
            ("[car]\ndoor_open_duration = -1.0", "car.door_open_duration"),
        ];

        for (config_str, expected) in cases {
            match parse_config(config_str) {
                Err(SimError::InvalidSetting { key, .. }) => assert_eq!(key, expected),
                other => panic!("Expected InvalidSetting for {}, got {:?}", expected, other),
            }
        }
    }
}
