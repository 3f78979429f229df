//! Errors raised by lights and the ray handler

use std::fmt;

use super::ray_handler::LightId;
use super::types::LightKindTag;

/// A light's mesh did not fit in what is left of the ray handler's buffers.
/// Packing stops at that light rather than truncating its mesh, since a partial
/// mesh would shift the index offsets of every light after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferOverflowError {
    pub light: LightId,
    /// Vertices in use once this light is packed
    pub required_vertices: usize,
    pub vertex_capacity: usize,
    /// Indices in use once this light is packed
    pub required_indices: usize,
    pub index_capacity: usize,
}
impl fmt::Display for BufferOverflowError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:?} needs {} of {} vertices and {} of {} indices in the light buffers",
            self.light,
            self.required_vertices,
            self.vertex_capacity,
            self.required_indices,
            self.index_capacity
        )
    }
}
impl std::error::Error for BufferOverflowError {}

/// No light was ever registered under this id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightNotFoundError(pub LightId);
impl fmt::Display for LightNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} is not registered with the ray handler", self.0)
    }
}
impl std::error::Error for LightNotFoundError {}

/// A kind specific setter was called on a light of another kind,
/// like setting the radius of a directional light
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrongLightKindError {
    pub operation: &'static str,
    pub found: LightKindTag,
}
impl fmt::Display for WrongLightKindError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} is not supported by {} lights",
            self.operation, self.found
        )
    }
}
impl std::error::Error for WrongLightKindError {}
