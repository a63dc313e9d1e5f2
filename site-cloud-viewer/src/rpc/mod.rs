//! JSON-RPC 2.0 communication layer for host page integration.
//!
//! Implements bidirectional messaging between the Bevy viewer and the host
//! page via iframe postMessage, supporting both request-response and
//! notification patterns.
//!
//! ## Message Flow
//!
//! ```text
//! Host (Parent Window)  <──postMessage──>  Bevy (iframe)
//!        │                                       │
//!        ├─ Request (with ID) ─────────────────> │
//!        │                                       ├─ Process request
//!        │ <──────────────── Response (with ID) ─┤
//!        │                                       │
//!        ├─ Notification (no ID) ──────────────> ├─ Process, no reply
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! ## Existing Methods
//!
//! ### Tool Management
//! - `tool_selection`: Activate the measure or calibrate tool
//! - `clear_tool`: Deactivate current tool
//!
//! ### Session
//! - `set_source_images`: Replace image URIs (first four are placed)
//! - `set_diagnostic_mode`: `rgb`, `height` or `structure`
//! - `set_view_settings`: Partial update of point size, section height, clipping
//! - `set_calibration_scale`: Set millimetres per scene unit directly
//! - `calibrate`: Derive the scale from a reference length in millimetres
//! - `clear_measurements`, `reset_session`
//! - `get_measurements`: Current measurement list
//!
//! ### Diagnostics
//! - `get_fps`: Retrieve current frame rate
//!
//! ## Notifications Sent
//!
//! - `measurement_added`, `measurement_updated`, `measurements_cleared`
//! - `tool_state_changed`, `hover_coordinate`
//! - `reconstruction_ready`, `fps_update`

/// JSON-RPC 2.0 bidirectional communication system for host integration.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
