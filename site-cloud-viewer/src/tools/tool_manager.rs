use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::interaction::PointerInteraction;
use crate::rpc::web_rpc::WebRpcInterface;

/// Enumeration of available tools in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    Measure,
    Calibrate,
}

impl ToolType {
    /// Convert string identifier to tool type for RPC compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "measure" => Some(Self::Measure),
            "calibrate" => Some(Self::Calibrate),
            _ => None,
        }
    }

    /// Convert tool type to string identifier for frontend communication.
    pub fn to_string(&self) -> &'static str {
        match self {
            Self::Measure => "measure",
            Self::Calibrate => "calibrate",
        }
    }
}

/// Resource tracking the currently active tool.
#[derive(Resource, Default)]
pub struct ToolManager {
    active_tool: Option<ToolType>,
}

impl ToolManager {
    /// Activate specified tool. Returns false if it was already active.
    pub fn activate_tool(&mut self, tool_type: ToolType) -> bool {
        if self.active_tool == Some(tool_type) {
            return false;
        }
        self.active_tool = Some(tool_type);
        info!("Tool manager activated: {}", tool_type.to_string());
        true
    }

    pub fn deactivate_current_tool(&mut self) -> Option<ToolType> {
        let previous = self.active_tool.take();
        if let Some(tool) = previous {
            info!("Tool manager deactivated: {}", tool.to_string());
        }
        previous
    }

    pub fn active_tool(&self) -> Option<ToolType> {
        self.active_tool
    }

    pub fn is_tool_active(&self, tool_type: ToolType) -> bool {
        self.active_tool == Some(tool_type)
    }
}

/// Event fired when tool selection changes via RPC or keyboard shortcuts.
#[derive(Event)]
pub struct ToolSelectionEvent {
    pub tool_type: ToolType,
    pub source: ToolSelectionSource,
}

/// Deactivate whatever tool is active.
#[derive(Event)]
pub struct ClearToolEvent {
    pub source: ToolSelectionSource,
}

/// Source of tool selection for debugging and conditional logic.
#[derive(Debug, Clone, Copy)]
pub enum ToolSelectionSource {
    Rpc,
    Keyboard,
}

/// Apply tool selection. Leaving the measure tool drops a pending first point.
pub fn handle_tool_selection_events(
    mut events: EventReader<ToolSelectionEvent>,
    mut tool_manager: ResMut<ToolManager>,
    mut interaction: ResMut<PointerInteraction>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        let was_measuring = tool_manager.is_tool_active(ToolType::Measure);
        if !tool_manager.activate_tool(event.tool_type) {
            continue;
        }

        if was_measuring {
            interaction.cancel_pending();
        }

        info!(
            "{} tool activated via {:?}",
            event.tool_type.to_string(),
            event.source
        );
        rpc_interface.send_notification(
            "tool_state_changed",
            serde_json::json!({
                "tool": event.tool_type.to_string(),
                "active": true
            }),
        );
    }
}

pub fn handle_clear_tool_events(
    mut events: EventReader<ClearToolEvent>,
    mut tool_manager: ResMut<ToolManager>,
    mut interaction: ResMut<PointerInteraction>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        let Some(previous) = tool_manager.deactivate_current_tool() else {
            continue;
        };
        interaction.cancel_pending();

        debug!("Tool cleared via {:?}", event.source);
        rpc_interface.send_notification(
            "tool_state_changed",
            serde_json::json!({
                "tool": previous.to_string(),
                "active": false
            }),
        );
    }
}

/// Keyboard shortcuts for tools and view settings (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_tool_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut tool_events: EventWriter<ToolSelectionEvent>,
    mut clear_tool_events: EventWriter<ClearToolEvent>,
    mut clear_measurements: EventWriter<crate::session::host::ClearMeasurementsEvent>,
    mut reset_session: EventWriter<crate::session::host::ResetSessionEvent>,
    mut mode: ResMut<crate::session::state::DiagnosticMode>,
    mut settings: ResMut<crate::session::state::ViewSettings>,
) {
    use crate::session::state::DiagnosticMode;

    if keyboard.just_pressed(KeyCode::KeyM) {
        tool_events.write(ToolSelectionEvent {
            tool_type: ToolType::Measure,
            source: ToolSelectionSource::Keyboard,
        });
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        clear_tool_events.write(ClearToolEvent {
            source: ToolSelectionSource::Keyboard,
        });
    }

    for (key, target) in [
        (KeyCode::KeyZ, DiagnosticMode::Rgb),
        (KeyCode::KeyX, DiagnosticMode::Height),
        (KeyCode::KeyC, DiagnosticMode::Structure),
    ] {
        if keyboard.just_pressed(key) && mode.set_if_neq(target) {
            info!("Diagnostic mode: {}", target.to_string());
        }
    }

    if keyboard.just_pressed(KeyCode::KeyK) {
        settings.is_clipping_active = !settings.is_clipping_active;
    }
    if keyboard.just_pressed(KeyCode::BracketLeft) {
        settings.section_height -= 0.5;
    }
    if keyboard.just_pressed(KeyCode::BracketRight) {
        settings.section_height += 0.5;
    }
    if keyboard.just_pressed(KeyCode::Minus) {
        settings.point_size = (settings.point_size - 0.01).max(0.01);
    }
    if keyboard.just_pressed(KeyCode::Equal) {
        settings.point_size += 0.01;
    }

    if keyboard.just_pressed(KeyCode::Delete) {
        clear_measurements.write(crate::session::host::ClearMeasurementsEvent);
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        reset_session.write(crate::session::host::ResetSessionEvent);
    }
}

/// Tools are driven over RPC in wasm builds.
#[cfg(target_arch = "wasm32")]
pub fn handle_tool_keyboard_shortcuts() {}
