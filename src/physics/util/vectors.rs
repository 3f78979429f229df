use std::fmt::Display;

use bevy::math::Vec2;
use derive_more::{Add, From, Into, Sub};

/// A world coord vector that is relative to some anchor position
/// Positional lights keep their ray endpoints in this space so moving the
/// anchor does not require recomputing any trig
#[derive(Debug, Copy, Clone, PartialEq, Default, Add, Sub, From, Into)]
pub struct RelXyPoint(pub Vec2);

impl RelXyPoint {
    /// Builds the point at `radius` along the given angle in radians
    pub fn from_polar(radius: f32, angle: f32) -> Self {
        RelXyPoint(Vec2::new(radius * angle.cos(), radius * angle.sin()))
    }

    /// Translates this point into world space using the anchor it is relative to
    pub fn to_world(self, anchor: Vec2) -> Vec2 {
        anchor + self.0
    }
}

impl Display for RelXyPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(RelXyPoint: ({}, {}))", self.0.x, self.0.y)
    }
}
