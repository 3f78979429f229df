//! 2D lights that raycast against the world to find their shadows.
//!
//! Each [`light_source::LightSource`] casts rays outward and clips them against a
//! [`geometry::GeometryQuery`], then turns the clipped rays into a mesh. The
//! [`ray_handler::RayHandler`] owns the lights and packs their meshes into one pair
//! of buffers for drawing.

use std::marker::PhantomData;

use bevy::app::{App, Plugin, Update};
use bevy::ecs::system::{Res, ResMut, Resource};
use bevy::log::error;
use bevy::time::Time;

use self::geometry::GeometryQuery;
use self::ray_handler::RayHandler;

/// Settings shared by every kind of light, and the `build_*` methods that pick the kind.
pub mod builder;

/// Directional lights, which cover the whole world with parallel rays.
pub mod directional;

/// Errors raised by lights and the ray handler.
pub mod errors;

/// The raycast capability lights need from the physics world.
pub mod geometry;

/// A single light, its shape specific state, and its per frame recompute.
pub mod light_source;

/// A static occluder world implementing the geometry query.
pub mod occluders;

/// Point and cone lights, which are anchored at a position.
pub mod positional;

/// Packs every light's mesh into shared buffers and draws them.
pub mod ray_handler;

#[warn(missing_docs)]
#[warn(clippy::missing_docs_in_private_items)]
pub mod types;

/// The plugin for the light physics.
/// Adds a [`RayHandler`] resource and updates it every frame against the world resource `W`.
pub struct LightPlugin<W> {
    _world: PhantomData<W>,
}

impl<W> Default for LightPlugin<W> {
    fn default() -> Self {
        Self {
            _world: PhantomData,
        }
    }
}

/// Implement the bevy plugin trait for the light plugin.
impl<W> Plugin for LightPlugin<W>
where
    W: GeometryQuery + Resource,
{
    /// Build the light plugin.
    fn build(&self, app: &mut App) {
        app.init_resource::<RayHandler>();
        app.add_systems(Update, update_lights::<W>);
    }
}

/// Recomputes and repacks every light once per frame
fn update_lights<W>(time: Res<Time>, world: Res<W>, mut handler: ResMut<RayHandler>)
where
    W: GeometryQuery + Resource,
{
    if let Err(err) = handler.update(time.delta_seconds(), &*world) {
        error!("Failed to update lights: {}", err);
    }
}
