//! Shared constants for the site cloud viewer.
//!
//! Kept in a separate crate so scene layout and render sizes have a single
//! source of truth across the workspace.

/// Sizes, colours and pick tolerances for rendered scene elements.
pub mod render_settings;

/// World-space placement of the grid, section plane and camera.
pub mod scene_layout;

/// Working resolution and tile geometry for luminance point synthesis.
pub mod synthesis;
