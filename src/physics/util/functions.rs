use bevy::math::{Rect, Vec2};
use itertools::Itertools;

/// Crossing-number point in polygon test
/// Takes the polygon as its vertex loop; the caller decides how the loop is closed,
/// so the first and last vertex should be the same point for a closed polygon.
/// For every edge whose y span straddles the query's y, we toggle if the query
/// lies to the right of the edge at that y.
pub fn crossing_number_contains<I>(vertices: I, point: Vec2) -> bool
where
    I: IntoIterator<Item = Vec2>,
{
    let mut result = false;
    for (prev, curr) in vertices.into_iter().tuple_windows() {
        let straddles =
            (curr.y < point.y && prev.y >= point.y) || (curr.y >= point.y && prev.y < point.y);
        if straddles
            && (point.y - curr.y) / (prev.y - curr.y) * (prev.x - curr.x) < (point.x - curr.x)
        {
            result = !result;
        }
    }
    result
}

/// Snaps a value down to the nearest multiple of `cell`
/// A zero sized cell leaves the value alone, otherwise the division would produce NaN
pub fn snap_floor(value: f32, cell: f32) -> f32 {
    if cell.abs() <= f32::EPSILON {
        return value;
    }
    (value / cell).floor() * cell
}

/// Snaps a value up to the nearest multiple of `cell`
/// A zero sized cell leaves the value alone
pub fn snap_ceil(value: f32, cell: f32) -> f32 {
    if cell.abs() <= f32::EPSILON {
        return value;
    }
    (value / cell).ceil() * cell
}

/// Does the circle at `center` with `radius` touch the rect?
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect: Rect) -> bool {
    rect.min.x < center.x + radius
        && rect.max.x > center.x - radius
        && rect.min.y < center.y + radius
        && rect.max.y > center.y - radius
}
