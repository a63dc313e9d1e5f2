use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::session::host::{
    CalibrationRequest, ClearMeasurementsEvent, ResetSessionEvent, measurement_json,
};
use crate::session::state::{
    CalibrationScale, DiagnosticMode, MeasurementList, SourceImages, ViewSettings,
};
use crate::tools::tool_manager::{
    ClearToolEvent, ToolSelectionEvent, ToolSelectionSource, ToolType,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure. A missing `id` marks a notification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// One-way message to the host page.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Outgoing message queues, flushed to the host page once per frame.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    /// Notification methods queued but not yet flushed.
    pub fn pending_notifications(&self) -> impl Iterator<Item = &str> {
        self.outgoing_notifications.iter().map(|n| n.method.as_str())
    }
}

pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages).chain(),
            )
            .add_systems(Last, send_outgoing_messages);

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    match window() {
        Some(window) => {
            if let Err(e) = window
                .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            {
                error!("Failed to register message listener: {:?}", e);
            }
        }
        None => error!("Window object not available"),
    }

    // Ownership moves to JS; the listener lives as long as the page.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Messages posted by the host page, filled from the JS listener.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Everything an RPC method may read or write.
#[derive(SystemParam)]
pub struct RpcTargets<'w> {
    diagnostics: Res<'w, DiagnosticsStore>,
    images: ResMut<'w, SourceImages>,
    mode: ResMut<'w, DiagnosticMode>,
    settings: ResMut<'w, ViewSettings>,
    scale: ResMut<'w, CalibrationScale>,
    measurements: Res<'w, MeasurementList>,
    tool_events: EventWriter<'w, ToolSelectionEvent>,
    clear_tool_events: EventWriter<'w, ClearToolEvent>,
    calibration: EventWriter<'w, CalibrationRequest>,
    clear_measurements: EventWriter<'w, ClearMeasurementsEvent>,
    reset_session: EventWriter<'w, ResetSessionEvent>,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut targets: RpcTargets,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                if let Some(response) = handle_rpc_request(&request, &mut targets) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => warn!("Dropping malformed RPC message: {parse_error}"),
        }
    }
}

/// Run the method and build a response when the request carries an id.
fn handle_rpc_request(request: &RpcRequest, targets: &mut RpcTargets) -> Option<RpcResponse> {
    let params = &request.params;
    let result = match request.method.as_str() {
        "tool_selection" => handle_tool_selection(params, targets),
        "clear_tool" => {
            targets.clear_tool_events.write(ClearToolEvent {
                source: ToolSelectionSource::Rpc,
            });
            Ok(serde_json::json!({ "success": true }))
        }
        "set_source_images" => handle_set_source_images(params, targets),
        "set_diagnostic_mode" => handle_set_diagnostic_mode(params, targets),
        "set_view_settings" => handle_set_view_settings(params, targets),
        "set_calibration_scale" => handle_set_calibration_scale(params, targets),
        "calibrate" => handle_calibrate(params, targets),
        "clear_measurements" => {
            targets.clear_measurements.write(ClearMeasurementsEvent);
            Ok(serde_json::json!({ "success": true }))
        }
        "reset_session" => {
            targets.reset_session.write(ResetSessionEvent);
            Ok(serde_json::json!({ "success": true }))
        }
        "get_measurements" => Ok(serde_json::json!({
            "measurements": targets
                .measurements
                .iter()
                .map(measurement_json)
                .collect::<Vec<_>>()
        })),
        "get_fps" => Ok(handle_get_fps(&targets.diagnostics)),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError::method_not_found(&request.method))
        }
    };

    if let Err(error) = &result {
        warn!("RPC {} failed: {}", request.method, error.message);
    }

    let id = request.id.clone()?;
    Some(match result {
        Ok(value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(value),
            error: None,
            id: Some(id),
        },
        Err(error) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        },
    })
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: &serde_json::Value,
    expected: &str,
) -> Result<T, RpcError> {
    serde_json::from_value::<T>(params.clone()).map_err(|_| RpcError::invalid_params(expected))
}

fn handle_tool_selection(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ToolSelectionParams {
        tool: String,
    }

    let tool_params: ToolSelectionParams = parse_params(params, "Expected 'tool' parameter")?;
    let tool_type = ToolType::from_string(&tool_params.tool)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown tool: {}", tool_params.tool)))?;

    targets.tool_events.write(ToolSelectionEvent {
        tool_type,
        source: ToolSelectionSource::Rpc,
    });

    Ok(serde_json::json!({
        "success": true,
        "active_tool": tool_type.to_string()
    }))
}

fn handle_set_source_images(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SourceImageParams {
        uris: Vec<String>,
    }

    let parsed: SourceImageParams = parse_params(params, "Expected 'uris' string array")?;
    let placed = targets.images.set_if_neq(SourceImages::new(parsed.uris));
    info!("Source images set ({} placed)", targets.images.placed().len());

    Ok(serde_json::json!({
        "success": true,
        "changed": placed,
        "placed": targets.images.placed().len()
    }))
}

fn handle_set_diagnostic_mode(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ModeParams {
        mode: String,
    }

    let parsed: ModeParams = parse_params(params, "Expected 'mode' parameter")?;
    let mode = DiagnosticMode::from_string(&parsed.mode)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown mode: {}", parsed.mode)))?;
    targets.mode.set_if_neq(mode);

    Ok(serde_json::json!({ "success": true, "mode": mode.to_string() }))
}

/// Partial update: absent fields keep their current value.
fn handle_set_view_settings(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ViewSettingsParams {
        point_size: Option<f32>,
        section_height: Option<f32>,
        is_clipping_active: Option<bool>,
    }

    let parsed: ViewSettingsParams = parse_params(params, "Expected view settings object")?;
    let mut next = *targets.settings;
    if let Some(point_size) = parsed.point_size {
        next.point_size = point_size;
    }
    if let Some(section_height) = parsed.section_height {
        next.section_height = section_height;
    }
    if let Some(clipping) = parsed.is_clipping_active {
        next.is_clipping_active = clipping;
    }
    targets.settings.set_if_neq(next);

    serde_json::to_value(next).map_err(|e| RpcError::internal_error(&e.to_string()))
}

fn handle_set_calibration_scale(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ScaleParams {
        scale: f32,
    }

    let parsed: ScaleParams = parse_params(params, "Expected numeric 'scale' parameter")?;
    if !parsed.scale.is_finite() || parsed.scale <= 0.0 {
        return Err(RpcError::invalid_params("Scale must be a positive number"));
    }
    targets.scale.set_if_neq(CalibrationScale(parsed.scale));

    Ok(serde_json::json!({ "success": true, "scale": parsed.scale }))
}

fn handle_calibrate(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct CalibrateParams {
        reference_mm: f32,
    }

    let parsed: CalibrateParams = parse_params(params, "Expected numeric 'reference_mm'")?;
    let scale = CalibrationScale::from_reference_mm(parsed.reference_mm)
        .map_err(|e| RpcError::invalid_params(&e.to_string()))?;
    targets.calibration.write(CalibrationRequest {
        reference_mm: parsed.reference_mm,
    });

    Ok(serde_json::json!({ "success": true, "scale": scale.0 }))
}

fn handle_get_fps(diagnostics: &DiagnosticsStore) -> serde_json::Value {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    serde_json::json!({ "fps": fps })
}

/// Flush notifications first, then responses.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => error!("Failed to serialize message: {}", e),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}
