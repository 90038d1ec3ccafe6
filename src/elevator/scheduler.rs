/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::collections::BTreeSet;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::Direction;

/***************************************/
/*             Public API              */
/***************************************/

/// Picks the next floor a car should visit from `stops`.
///
/// Keeps sweeping in `direction` while there are stops at or beyond
/// `current_floor` that way. Otherwise falls back to the closest stop,
/// preferring the lower floor on a tie.
pub fn next_stop(stops: &BTreeSet<i32>, current_floor: i32, direction: Direction) -> Option<i32> {
    let onward = match direction {
        Direction::Up => stops.range(current_floor..).next().copied(),
        Direction::Down => stops.range(..=current_floor).next_back().copied(),
        Direction::Stop => None,
    };

    onward.or_else(|| closest_stop(stops, current_floor))
}

fn closest_stop(stops: &BTreeSet<i32>, current_floor: i32) -> Option<i32> {
    stops
        .iter()
        .copied()
        .min_by_key(|floor| ((floor - current_floor).abs(), *floor))
}
