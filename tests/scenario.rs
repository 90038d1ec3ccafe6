/*
 * Integration tests running whole scenarios through the public API
 *
 * Tests:
 *  - test_bundled_scenario_finishes
 *  - test_unreachable_trip_gives_up
 *  - test_snapshot_after_run
 */

use liftsim::{parse_config, CarState, Simulation};

const BUNDLED: &str = include_str!("../config.toml");

#[test]
fn test_bundled_scenario_finishes() {
    // Arrange
    let config = parse_config(BUNDLED).unwrap();
    let mut simulation = Simulation::from_config(&config).unwrap();

    // Act
    let report = simulation.run(config.simulation.ticks);

    // Assert
    assert!(simulation.is_finished());
    assert_eq!(report.delivered, config.passengers.len());
    assert_eq!(report.gave_up, 0);
    assert_eq!(report.in_transit, 0);
    assert_eq!(report.stranded, 0);
    assert!(report.arrivals >= 1);
}

#[test]
fn test_unreachable_trip_gives_up() {
    // Arrange
    let config = parse_config(
        r#"
        [[shafts]]
        tower = 0
        bottom_floor = 0
        top_floor = 4

        [[passengers]]
        id = 1
        tower = 0
        origin = 0
        destination = 9

        [[passengers]]
        id = 2
        tower = 3
        origin = 0
        destination = 2
        "#,
    )
    .unwrap();
    let mut simulation = Simulation::from_config(&config).unwrap();

    // Act
    let report = simulation.run(10);

    // Assert
    assert_eq!(report.gave_up, 2);
    assert_eq!(report.delivered, 0);
    assert_eq!(report.calls_placed, 0);
}

#[test]
fn test_snapshot_after_run() {
    // Arrange
    let config = parse_config(BUNDLED).unwrap();
    let mut simulation = Simulation::from_config(&config).unwrap();
    simulation.run(config.simulation.ticks);

    // Act
    let json = serde_json::to_value(simulation.dispatcher().snapshot()).unwrap();

    // Assert
    assert_eq!(json["towers"]["0"].as_array().unwrap().len(), 2);
    assert_eq!(json["towers"]["1"][0]["bottomFloor"], -2);
    for shaft in simulation.dispatcher().shafts() {
        assert!(shaft.pending_calls().is_empty());
        for car in shaft.cars() {
            assert!(car.passengers().is_empty());
            assert_ne!(car.state(), CarState::MovingUp);
            assert_ne!(car.state(), CarState::MovingDown);
        }
    }
}
