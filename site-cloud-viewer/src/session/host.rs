use bevy::prelude::*;

use super::state::{CalibrationScale, MeasurementList, SourceImages};
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::interaction::PointerInteraction;
use crate::tools::measure::{Measurement, MeasurementId};
use crate::tools::tool_manager::ToolManager;

/// Viewer callback: a new measurement was completed by two picks.
#[derive(Event, Debug, Clone)]
pub struct MeasurementAdded(pub Measurement);

/// Viewer callback: one endpoint of `id` was dragged.
#[derive(Event, Debug, Clone)]
pub struct MeasurementUpdated {
    pub id: MeasurementId,
    pub start: Vec3,
    pub end: Vec3,
    pub distance: f32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ClearMeasurementsEvent;

#[derive(Event, Debug, Clone, Copy)]
pub struct ResetSessionEvent;

/// Calibrate so one scene unit reads as `reference_mm` millimetres.
#[derive(Event, Debug, Clone, Copy)]
pub struct CalibrationRequest {
    pub reference_mm: f32,
}

/// Apply viewer callbacks to the session's measurement list.
pub fn apply_measurement_events(
    mut added: EventReader<MeasurementAdded>,
    mut updated: EventReader<MeasurementUpdated>,
    mut measurements: ResMut<MeasurementList>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for MeasurementAdded(measurement) in added.read() {
        info!(
            "Measurement {} added: {:.3} units",
            measurement.id.0, measurement.distance
        );
        rpc_interface.send_notification("measurement_added", measurement_json(measurement));
        measurements.add(measurement.clone());
    }

    for update in updated.read() {
        if !measurements.update(update.id, update.start, update.end, update.distance) {
            warn!("Update for unknown measurement {}", update.id.0);
            continue;
        }
        if let Some(stored) = measurements.get(update.id) {
            rpc_interface.send_notification("measurement_updated", measurement_json(stored));
        }
    }
}

pub fn handle_clear_measurements(
    mut events: EventReader<ClearMeasurementsEvent>,
    mut measurements: ResMut<MeasurementList>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if events.read().count() == 0 {
        return;
    }
    info!("Clearing {} measurements", measurements.len());
    measurements.clear();
    rpc_interface.send_notification("measurements_cleared", serde_json::json!({}));
}

/// Return the session to its initial state: no images, no measurements,
/// unit calibration and no active tool.
pub fn handle_reset_session(
    mut events: EventReader<ResetSessionEvent>,
    mut measurements: ResMut<MeasurementList>,
    mut scale: ResMut<CalibrationScale>,
    mut images: ResMut<SourceImages>,
    mut tool_manager: ResMut<ToolManager>,
    mut interaction: ResMut<PointerInteraction>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if events.read().count() == 0 {
        return;
    }

    measurements.clear();
    *scale = CalibrationScale::default();
    images.uris.clear();
    tool_manager.deactivate_current_tool();
    interaction.reset();

    info!("Session reset");
    rpc_interface.send_notification("measurements_cleared", serde_json::json!({}));
    rpc_interface.send_notification(
        "tool_state_changed",
        serde_json::json!({ "tool": "none", "active": false }),
    );
}

pub fn handle_calibration_requests(
    mut events: EventReader<CalibrationRequest>,
    mut scale: ResMut<CalibrationScale>,
) {
    for request in events.read() {
        match CalibrationScale::from_reference_mm(request.reference_mm) {
            Ok(calibrated) => {
                info!("Calibration scale set to {}", calibrated.0);
                *scale = calibrated;
            }
            Err(e) => warn!("Calibration rejected: {e}"),
        }
    }
}

pub fn measurement_json(measurement: &Measurement) -> serde_json::Value {
    serde_json::json!({
        "id": measurement.id.0,
        "start": [measurement.start.x, measurement.start.y, measurement.start.z],
        "end": [measurement.end.x, measurement.end.y, measurement.end.z],
        "distance": measurement.distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_app() -> App {
        let mut app = App::new();
        app.init_resource::<MeasurementList>()
            .init_resource::<CalibrationScale>()
            .init_resource::<SourceImages>()
            .init_resource::<ToolManager>()
            .init_resource::<PointerInteraction>()
            .init_resource::<WebRpcInterface>()
            .add_event::<MeasurementAdded>()
            .add_event::<MeasurementUpdated>()
            .add_event::<ClearMeasurementsEvent>()
            .add_event::<ResetSessionEvent>()
            .add_event::<CalibrationRequest>()
            .add_systems(
                Update,
                (
                    apply_measurement_events,
                    handle_clear_measurements,
                    handle_reset_session,
                    handle_calibration_requests,
                )
                    .chain(),
            );
        app
    }

    #[test]
    fn added_then_updated_measurement_lands_in_list() {
        let mut app = host_app();
        let m = Measurement::new(MeasurementId(1), Vec3::X, Vec3::new(4.0, 0.0, 0.0));
        app.world_mut().send_event(MeasurementAdded(m));
        app.update();

        app.world_mut().send_event(MeasurementUpdated {
            id: MeasurementId(1),
            start: Vec3::X,
            end: Vec3::new(1.0, 2.0, 0.0),
            distance: 2.0,
        });
        app.update();

        let list = app.world().resource::<MeasurementList>();
        let stored = list.get(MeasurementId(1)).unwrap();
        assert_eq!(stored.start, Vec3::X);
        assert_eq!(stored.end, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(stored.distance, 2.0);

        let sent: Vec<&str> = app
            .world()
            .resource::<WebRpcInterface>()
            .pending_notifications()
            .collect();
        assert_eq!(sent, vec!["measurement_added", "measurement_updated"]);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut app = host_app();
        app.world_mut()
            .resource_mut::<SourceImages>()
            .uris
            .push("scan.png".into());
        app.world_mut().insert_resource(CalibrationScale(3.0));
        app.world_mut().send_event(MeasurementAdded(Measurement::new(
            MeasurementId(1),
            Vec3::ZERO,
            Vec3::Y,
        )));
        app.update();

        app.world_mut().send_event(ResetSessionEvent);
        app.update();

        let world = app.world();
        assert!(world.resource::<MeasurementList>().is_empty());
        assert!(world.resource::<SourceImages>().is_empty());
        assert_eq!(*world.resource::<CalibrationScale>(), CalibrationScale(1.0));
        assert_eq!(world.resource::<ToolManager>().active_tool(), None);
    }

    #[test]
    fn invalid_calibration_keeps_previous_scale() {
        let mut app = host_app();
        app.world_mut().send_event(CalibrationRequest { reference_mm: 500.0 });
        app.update();
        app.world_mut().send_event(CalibrationRequest { reference_mm: -1.0 });
        app.update();

        assert_eq!(*app.world().resource::<CalibrationScale>(), CalibrationScale(0.5));
    }
}
