/*
 * Unit tests for the dispatcher module
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 *  - test_dispatcher_init
 *  - test_find_shaft_serving_floor
 *  - test_find_best_shaft
 *  - test_call_elevator_without_shaft
 *  - test_request_travel_derives_direction
 *  - test_end_to_end_trip
 *  - test_remove_shaft_cascades
 *  - test_extend_and_add_car
 *  - test_snapshot_serializes
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod dispatcher_tests {
    use crate::config::{CarConfig, ShaftConfig};
    use crate::dispatcher::Dispatcher;
    use crate::events::SimEvent;
    use crate::layout::UniformLayout;
    use crate::shared::CarState::{DoorsClosing, DoorsOpen, MovingUp};
    use crate::shared::Direction::{Down, Up};
    use crate::shared::{CarId, PassengerId, Position, ShaftId, SimError, TowerId};

    const DT: f64 = 0.1;
    const TOWER: TowerId = TowerId(1);

    fn setup_dispatcher() -> Dispatcher {
        let shaft_config = ShaftConfig {
            wait_offset: -1.0,
            exit_offset: 1.0,
            fallback_wait_estimate: 100.0,
            redispatch_after: 30.0,
        };
        let car_config = CarConfig {
            speed: 3.0,
            capacity: 4,
            door_open_duration: 1.0,
        };
        Dispatcher::new(
            &shaft_config,
            &car_config,
            Box::new(UniformLayout::new(3.0, 0.0)),
        )
    }

    #[test]
    fn test_dispatcher_init() {
        // Arrange
        let dispatcher = setup_dispatcher();

        // Assert
        assert!(dispatcher.shafts_in_tower(TOWER).is_empty());
        assert!(dispatcher.shaft(ShaftId(0)).is_none());
        assert!(dispatcher.car(CarId(0)).is_none());
        assert!(dispatcher.drain_events().is_empty());
    }

    #[test]
    fn test_find_shaft_serving_floor() {
        // Arrange
        let mut dispatcher = setup_dispatcher();
        let low = dispatcher.create_shaft(TOWER, 0, 5, 1, 0.0).unwrap();
        let high = dispatcher.create_shaft(TOWER, 3, 10, 1, 4.0).unwrap();
        dispatcher.create_shaft(TowerId(2), 0, 20, 1, 0.0).unwrap();

        // Act
        let at_four = dispatcher.find_shaft_serving_floor(4, TOWER).map(|s| s.id());
        let at_eight = dispatcher.find_shaft_serving_floor(8, TOWER).map(|s| s.id());
        let at_fifteen = dispatcher.find_shaft_serving_floor(15, TOWER).map(|s| s.id());

        // Assert
        // Both shafts reach floor 4, the first registered one wins
        assert_eq!(at_four, Some(low));
        assert_eq!(at_eight, Some(high));
        assert_eq!(at_fifteen, None);
    }

    #[test]
    fn test_find_best_shaft() {
        // Arrange
        let mut dispatcher = setup_dispatcher();
        let express = dispatcher.create_shaft(TOWER, 0, 10, 1, 0.0).unwrap();
        let local = dispatcher.create_shaft(TOWER, 4, 8, 1, 4.0).unwrap();
        let short = dispatcher.create_shaft(TOWER, 0, 3, 1, 8.0).unwrap();

        // Act
        // The local car idles at 4, the express car at 0
        let from_five = dispatcher.find_best_shaft(5, 7, TOWER).map(|s| s.id());
        let from_one = dispatcher.find_best_shaft(1, 9, TOWER).map(|s| s.id());
        let from_one_short = dispatcher.find_best_shaft(1, 2, TOWER).map(|s| s.id());
        let nowhere = dispatcher.find_best_shaft(1, 12, TOWER);

        // Assert
        assert_eq!(from_five, Some(local));
        assert_eq!(from_one, Some(express));
        assert_eq!(from_one_short, Some(express));
        assert!(nowhere.is_none());
        assert_ne!(short, express);
    }

    #[test]
    fn test_call_elevator_without_shaft() {
        // Arrange
        let mut dispatcher = setup_dispatcher();
        dispatcher.create_shaft(TOWER, 0, 5, 1, 0.0).unwrap();

        // Act
        let other_tower = dispatcher.call_elevator(2, Up, TowerId(9), PassengerId(1));
        let too_high = dispatcher.call_elevator(6, Down, TOWER, PassengerId(1));
        let served = dispatcher.call_elevator(2, Up, TOWER, PassengerId(1));

        // Assert
        assert!(!other_tower);
        assert!(!too_high);
        assert!(served);
        assert_eq!(dispatcher.shafts_in_tower(TOWER)[0].pending_calls().len(), 1);
    }

    #[test]
    fn test_request_travel_derives_direction() {
        // Arrange
        let mut dispatcher = setup_dispatcher();
        let shaft = dispatcher.create_shaft(TOWER, 0, 9, 1, 0.0).unwrap();

        // Act
        let down = dispatcher.request_travel(6, 2, TOWER, PassengerId(1));
        let same_floor = dispatcher.request_travel(3, 3, TOWER, PassengerId(2));
        let out_of_reach = dispatcher.request_travel(3, 12, TOWER, PassengerId(3));

        // Assert
        assert_eq!(down, Some(shaft));
        assert_eq!(same_floor, None);
        assert_eq!(out_of_reach, None);
        let calls = dispatcher.shaft(shaft).unwrap().pending_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].floor, 6);
        assert_eq!(calls[0].direction, Down);
    }

    #[test]
    fn test_end_to_end_trip() {
        // Arrange
        // Shaft spans 0-5, its single car idles at 0
        let mut dispatcher = setup_dispatcher();
        let shaft = dispatcher.create_shaft(TOWER, 0, 5, 1, 0.0).unwrap();
        let passenger = PassengerId(42);

        // Act
        assert!(dispatcher.call_elevator(0, Up, TOWER, passenger));
        assert_eq!(dispatcher.shaft(shaft).unwrap().estimate_wait_time(0), 0.0);
        dispatcher.tick(DT);

        let car = dispatcher.get_available_car_at_floor(shaft, 0).unwrap();
        assert_eq!(dispatcher.car(car).unwrap().state(), DoorsOpen);
        assert!(dispatcher.board(car, passenger, 4));
        assert!(dispatcher.car(car).unwrap().stops().contains(&4));

        let mut ticks = 0;
        while dispatcher.car(car).unwrap().state() != DoorsClosing {
            dispatcher.tick(DT);
            ticks += 1;
            assert!(ticks < 100);
        }
        dispatcher.tick(DT);
        assert_eq!(dispatcher.car(car).unwrap().state(), MovingUp);
        assert_eq!(dispatcher.car(car).unwrap().target_floor(), 4);

        while dispatcher.get_available_car_at_floor(shaft, 4).is_none() {
            dispatcher.tick(DT);
            ticks += 1;
            assert!(ticks < 200);
        }

        // Assert
        assert!(dispatcher.should_exit(car, passenger));
        assert!(dispatcher.exit(car, passenger));
        let car_state = dispatcher.car(car).unwrap();
        assert!(car_state.destinations().get(&4).is_none());
        assert!(!car_state.stops().contains(&4));
        assert!(car_state.passengers().is_empty());
        assert!(dispatcher
            .drain_events()
            .iter()
            .any(|e| matches!(e, SimEvent::CarArrived { floor: 0, .. })));
    }

    #[test]
    fn test_remove_shaft_cascades() {
        // Arrange
        let mut dispatcher = setup_dispatcher();
        let shaft = dispatcher.create_shaft(TOWER, 0, 5, 1, 0.0).unwrap();
        let car = dispatcher.shaft(shaft).unwrap().cars()[0].id();
        dispatcher.board(car, PassengerId(1), 3);
        dispatcher.call_elevator(4, Down, TOWER, PassengerId(2));
        dispatcher.drain_events();

        // Act
        let removed = dispatcher.remove_shaft(shaft);
        let removed_again = dispatcher.remove_shaft(shaft);

        // Assert
        assert!(removed);
        assert!(!removed_again);
        assert!(dispatcher.car(car).is_none());
        assert!(!dispatcher.should_exit(car, PassengerId(1)));
        assert!(!dispatcher.board(car, PassengerId(3), 2));
        assert!(!dispatcher.call_elevator(4, Down, TOWER, PassengerId(2)));
        assert_eq!(
            dispatcher.drain_events(),
            vec![SimEvent::ShaftRemoved {
                tower: TOWER,
                shaft,
                stranded: vec![PassengerId(2), PassengerId(1)],
            }]
        );
    }

    #[test]
    fn test_extend_and_add_car() {
        // Arrange
        let mut dispatcher = setup_dispatcher();
        let shaft = dispatcher.create_shaft(TOWER, 0, 5, 1, 0.0).unwrap();

        // Act
        let extended = dispatcher.extend_shaft(shaft, 9).unwrap();
        let unknown = dispatcher.extend_shaft(ShaftId(7), 9);
        let car = dispatcher.add_car(shaft).unwrap();
        let bad_range = dispatcher.create_shaft(TOWER, 3, 1, 1, 0.0);

        // Assert
        assert!(extended);
        assert!(matches!(unknown, Err(SimError::UnknownShaft(ShaftId(7)))));
        assert!(matches!(bad_range, Err(SimError::InvalidFloorRange { .. })));
        assert_eq!(car, CarId(1));
        assert_eq!(dispatcher.shaft(shaft).unwrap().cars().len(), 2);
        assert_eq!(dispatcher.find_shaft_serving_floor(9, TOWER).map(|s| s.id()), Some(shaft));
        assert_eq!(
            dispatcher.get_wait_position(shaft, 9),
            Some(Position { x: -1.0, y: 27.0 })
        );
        assert_eq!(
            dispatcher.get_exit_position(shaft, 0),
            Some(Position { x: 1.0, y: 0.0 })
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        // Arrange
        let mut dispatcher = setup_dispatcher();
        dispatcher.create_shaft(TOWER, 0, 5, 1, 0.0).unwrap();
        dispatcher.call_elevator(3, Up, TOWER, PassengerId(5));

        // Act
        let json = serde_json::to_value(dispatcher.snapshot()).unwrap();

        // Assert
        let shaft = &json["towers"]["1"][0];
        assert_eq!(shaft["topFloor"], 5);
        assert_eq!(shaft["pendingCalls"][0]["floor"], 3);
        assert_eq!(shaft["pendingCalls"][0]["direction"], "up");
        assert_eq!(shaft["cars"][0]["state"], "idle");
        assert_eq!(shaft["cars"][0]["pickupStops"][0], 3);
    }
}
