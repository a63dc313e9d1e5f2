//! Runtime diagnostics and overlay text.

/// FPS tracking and notification systems for performance monitoring.
///
/// Sends frame rate updates to the host via RPC and updates the native overlay.
pub mod fps_tracking;

/// Native overlay showing cursor coordinate, measure prompt and scale.
pub mod hud;
