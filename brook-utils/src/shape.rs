//! Precomputed neighbourhood shapes.

use crate::math::Vector2;

/// Every horizontal offset in the square `[-half, half]²` except the origin,
/// ordered by Manhattan distance from the origin.
///
/// The sort is stable, so offsets at equal distance keep row-major order
/// (x outer, z inner).
#[must_use]
pub fn square_points_sorted_by_manhattan(half: i32) -> Vec<Vector2<i32>> {
    let mut points = Vec::with_capacity(((2 * half + 1) * (2 * half + 1)) as usize);
    for x in -half..=half {
        for z in -half..=half {
            if x != 0 || z != 0 {
                points.push(Vector2::new(x, z));
            }
        }
    }
    points.sort_by_key(|p| p.x.abs() + p.y.abs());
    points
}
