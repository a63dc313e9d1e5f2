//! App construction and the viewer lifecycle.
//!
//! Builds the Bevy app for native and WASM targets, owns the loading to
//! running transition and the window setup.

/// Plugin registration and system scheduling.
///
/// Wires the point material, session and RPC plugins together and orders
/// tool input ahead of the session reducers.
pub mod app_setup;

/// Viewer state machine: session loading, then running.
pub mod app_state;

/// Window settings per target. WASM builds attach to the `#bevy` canvas.
pub mod window_config;
