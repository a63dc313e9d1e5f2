//! Viewport camera for site navigation.
//!
//! Orbit controls around a focus point with damped motion. Navigation is
//! suspended while a measurement handle is dragged.

/// Orbit camera resource, controller system and resize handling.
pub mod viewport_camera;
