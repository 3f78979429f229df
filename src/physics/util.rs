//! Small 2D helpers shared by the light code.

/// Point in polygon tests, grid snapping and overlap checks.
pub mod functions;

/// Light meshes and their conversion to triangle lists.
pub mod mesh;

/// Vectors relative to an anchor.
pub mod vectors;
