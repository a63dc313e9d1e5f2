//! Mesh generation for point cloud rendering primitives.
//!
//! Points are drawn as camera-facing quads. The mesh stores the point centre
//! on every corner vertex and the vertex shader expands it.

/// Quad-per-point mesh built from a synthesised tile.
pub mod point_quad_mesh;
