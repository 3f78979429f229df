//! Raycast 2D lights.
//!
//! Lights cast rays against a physics world, clip them at the first obstruction,
//! and turn the result into fan or strip meshes that are batched into one pair of
//! vertex and index buffers per frame.

pub mod physics;
