//! Site cloud viewer.
//!
//! Synthesises a point cloud reconstruction of a site from up to four photos
//! and lets the user take calibrated distance measurements inside the scene.
//!
//! - `engine` owns the scene: synthesis, reconstruction rebuilds, camera, grid
//!   and section plane.
//! - `tools` owns interaction: the measure tool state machine, picking,
//!   measurement rendering and labels.
//! - `session` holds the host-side state the viewer reads from and reports into.
//! - `rpc` bridges the host page when running as wasm.

pub mod engine;
pub mod rpc;
pub mod session;
pub mod tools;
