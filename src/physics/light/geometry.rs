//! The geometry query port lights raycast against.
//!
//! Lights do not know anything about the rigid body simulation they live in.
//! All they need is a nearest-hit raycast and the bounds of the world, which
//! whatever physics engine is in use provides by implementing [`GeometryQuery`].
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use bevy::math::{Rect, Vec2};
use derive_more::{From, Into};

/// Identifies the body an obstruction belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From, Into)]
pub struct ObstructionId(pub u32);

/// One possible intersection reported by the world during a raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCandidate {
    /// The body that was hit
    pub obstruction: ObstructionId,
    /// Where the ray hit it, in world space
    pub point: Vec2,
    /// Surface normal at the hit point
    pub normal: Vec2,
    /// Fraction of the way from the ray origin to its target
    pub fraction: f32,
}

/// Where a ray ended up after raycasting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The clipped endpoint, or the requested target if nothing was in the way
    pub point: Vec2,
    /// Fraction of the full ray length, 1.0 when unobstructed
    pub fraction: f32,
    /// The body that stopped the ray, if any
    pub obstruction: Option<ObstructionId>,
}

impl RayHit {
    /// The result of a ray that reached its target
    pub fn unobstructed(target: Vec2) -> Self {
        Self {
            point: target,
            fraction: 1.0,
            obstruction: None,
        }
    }
}

/// The capability a physics world must provide for lights to raycast against it.
///
/// `cast_ray` follows the usual physics engine callback convention: the world calls
/// `callback` once per candidate intersection along the segment from `origin` to
/// `target`, in any order, and the callback answers with the fraction to clip the
/// ray to. A negative answer filters the candidate out, zero terminates the query,
/// and a positive answer clips the ray so only nearer candidates are reported from
/// then on.
pub trait GeometryQuery {
    /// Cast a ray from `origin` to `target`
    fn cast_ray(
        &self,
        origin: Vec2,
        target: Vec2,
        callback: &mut dyn FnMut(&RayCandidate) -> f32,
    );

    /// The rectangle covering the whole world
    fn bounds(&self) -> Rect;
}

/// Finds the nearest obstruction between `origin` and `target`.
///
/// Candidates belonging to `ignore` are filtered out, which is how a light avoids
/// shadowing itself with the body it is attached to.
/// Returns the target and a fraction of 1.0 when nothing is hit.
/// Every answer clips the ray to the nearest hit so far, so the world can skip
/// anything behind it.
pub fn nearest_hit<W>(
    world: &W,
    origin: Vec2,
    target: Vec2,
    ignore: Option<ObstructionId>,
) -> RayHit
where
    W: GeometryQuery + ?Sized,
{
    let mut best = RayHit::unobstructed(target);
    world.cast_ray(origin, target, &mut |candidate| {
        if Some(candidate.obstruction) == ignore {
            return -1.0;
        }
        if candidate.fraction < best.fraction {
            best = RayHit {
                point: candidate.point,
                fraction: candidate.fraction,
                obstruction: Some(candidate.obstruction),
            };
        }
        best.fraction
    });
    best
}
