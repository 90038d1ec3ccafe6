/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;

/***************************************/
/*             Public API              */
/***************************************/

/**
 * Maps floor indices to world heights and back.
 *
 * The building/grid subsystem owns the real geometry; the elevator core only
 * needs these two pure conversions to drive continuous car movement and
 * drive-by interception.
 *
 * # Methods
 * - `walk_level`:          The height a passenger stands at on `floor`, which is also where a car stops.
 * - `floor_from_position`: The floor whose walk level is nearest to height `y`.
 */
pub trait FloorLayout {
    fn walk_level(&self, floor: i32) -> f64;
    fn floor_from_position(&self, y: f64) -> i32;
}

/// Evenly stacked floors, floor 0 at `ground_level`.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct UniformLayout {
    pub floor_height: f64,
    pub ground_level: f64,
}

impl UniformLayout {
    pub fn new(floor_height: f64, ground_level: f64) -> UniformLayout {
        UniformLayout {
            floor_height,
            ground_level,
        }
    }
}

impl Default for UniformLayout {
    fn default() -> Self {
        UniformLayout::new(3.0, 0.0)
    }
}

impl FloorLayout for UniformLayout {
    fn walk_level(&self, floor: i32) -> f64 {
        self.ground_level + floor as f64 * self.floor_height
    }

    fn floor_from_position(&self, y: f64) -> i32 {
        ((y - self.ground_level) / self.floor_height).round() as i32
    }
}
