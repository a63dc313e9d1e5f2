//! Measurement tools and the pointer interaction behind them.
//!
//! ## Tool Manager Architecture
//!
//! The `ToolManager` resource keeps exclusive tool activation state:
//! - Only one tool can be active at a time
//! - Tools are activated via keyboard shortcuts (native) or RPC events (WASM)
//! - Leaving the measure tool drops any half-finished measurement
//!
//! ### Measurement Flow
//!
//! ```text
//! Left click (measure tool active)
//!   ├─> handle under cursor?  ──> drag starts, orbit disabled
//!   │     └─> pointer moves    ──> MeasurementUpdated
//!   └─> cloud hit
//!         ├─> no pending point ──> point queued
//!         └─> pending point    ──> MeasurementAdded
//! ```
//!
//! Handles can be dragged with any tool active. The session folds both
//! events into `MeasurementList`, and `rebuild_measurement_render` redraws
//! every group from that list.
//!
//! ## Available Tools
//!
//! ### Measure Tool (`ToolType::Measure`)
//! - **Activation**: `M` key (native) or `tool_selection` RPC with `"measure"`
//! - **Purpose**: Two-click distance measurement on the reconstructed cloud
//!
//! ### Calibrate Tool (`ToolType::Calibrate`)
//! - **Activation**: `tool_selection` RPC with `"calibrate"`
//! - **Purpose**: Host-side calibration workflow; the viewer only tracks the
//!   active state and applies the resulting `calibrate` request

/// Pointer press, move and release state machine for picks and drags.
pub mod interaction;

/// Rounded label textures drawn with an 8x8 bitmap font.
pub mod label;

/// Measurement values and their scene rendering.
pub mod measure;

/// Ray picking against handles and tile point sets.
pub mod picking;

/// Exclusive tool activation with keyboard and RPC sources.
pub mod tool_manager;
