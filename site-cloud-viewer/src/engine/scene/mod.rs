//! Static scene furniture and group ownership.
//!
//! Provides the ground grid, the section plane indicator, the heat map
//! colour ramp used by height diagnostics and the registry that tracks which
//! entities belong to the reconstruction and to each measurement.

/// Flat ground grid with separately coloured centre lines.
pub mod grid;

/// Four-tier heat map over vertical position.
pub mod heightmap;

/// Ownership tags and root entity registry for rebuildable groups.
pub mod registry;

/// Section plane indicator that follows the clipping settings.
pub mod section_plane;
