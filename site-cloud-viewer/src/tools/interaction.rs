use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::measure::{EndpointRole, MeasureHandle, Measurement, MeasurementId};
use super::picking::{PickScene, ScenePicker, TileView};
use super::tool_manager::{ToolManager, ToolType};
use crate::engine::camera::viewport_camera::OrbitCamera;
use crate::engine::point_cloud::ScanTile;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::session::host::{MeasurementAdded, MeasurementUpdated};
use crate::session::state::{MeasurementList, ViewSettings};

/// Handle currently being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragTarget {
    pub id: MeasurementId,
    pub role: EndpointRole,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    Ignored,
    DragStarted(DragTarget),
    PointQueued(Vec3),
    MeasurementCompleted(Measurement),
}

/// Pointer state machine: idle or dragging, plus a buffer holding at most
/// one pending measurement point.
#[derive(Resource, Debug, Default)]
pub struct PointerInteraction {
    drag: Option<DragTarget>,
    pending: Option<Vec3>,
    hover: Option<Vec3>,
    last_id: u32,
}

impl PointerInteraction {
    pub fn pointer_down(
        &mut self,
        ray: &Ray3d,
        picker: &impl ScenePicker,
        measuring: bool,
    ) -> PointerOutcome {
        if let Some(hit) = picker.pick_handle(ray) {
            let target = DragTarget {
                id: hit.id,
                role: hit.role,
            };
            if self.pending.take().is_some() {
                debug!("Pending measurement point abandoned by handle drag");
            }
            self.drag = Some(target);
            return PointerOutcome::DragStarted(target);
        }

        if !measuring {
            return PointerOutcome::Ignored;
        }
        let Some(point) = picker.pick_cloud(ray) else {
            return PointerOutcome::Ignored;
        };

        match self.pending.take() {
            None => {
                self.pending = Some(point);
                PointerOutcome::PointQueued(point)
            }
            Some(start) => {
                self.last_id += 1;
                PointerOutcome::MeasurementCompleted(Measurement::new(
                    MeasurementId(self.last_id),
                    start,
                    point,
                ))
            }
        }
    }

    /// While dragging, move the dragged endpoint onto the cloud. Otherwise
    /// refresh the hover readout.
    pub fn pointer_move(
        &mut self,
        ray: &Ray3d,
        picker: &impl ScenePicker,
        measurements: &MeasurementList,
    ) -> Option<MeasurementUpdated> {
        let Some(drag) = self.drag else {
            self.hover = picker.pick_cloud(ray);
            return None;
        };

        let hit = picker.pick_cloud(ray)?;
        let moved = measurements.get(drag.id)?.with_endpoint(drag.role, hit);
        Some(MeasurementUpdated {
            id: moved.id,
            start: moved.start,
            end: moved.end,
            distance: moved.distance,
        })
    }

    /// End any drag. Returns whether one was in progress.
    pub fn pointer_up(&mut self) -> bool {
        self.drag.take().is_some()
    }

    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    pub fn set_pending(&mut self, point: Vec3) {
        self.pending = Some(point);
    }

    pub fn reset(&mut self) {
        self.drag = None;
        self.pending = None;
        self.hover = None;
    }

    pub fn pending(&self) -> Option<Vec3> {
        self.pending
    }

    pub fn hover(&self) -> Option<Vec3> {
        self.hover
    }

    pub fn dragging(&self) -> Option<DragTarget> {
        self.drag
    }
}

/// Feed primary window pointer input through [`PointerInteraction`].
pub fn pointer_input_system(
    mouse: Res<ButtonInput<MouseButton>>,
    mut cursor_moved: EventReader<CursorMoved>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    handles: Query<(&MeasureHandle, &GlobalTransform)>,
    tiles: Query<(&ScanTile, &GlobalTransform)>,
    tool_manager: Res<ToolManager>,
    settings: Res<ViewSettings>,
    measurements: Res<MeasurementList>,
    mut interaction: ResMut<PointerInteraction>,
    mut orbit: ResMut<OrbitCamera>,
    mut added: EventWriter<MeasurementAdded>,
    mut updated: EventWriter<MeasurementUpdated>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let moved = cursor_moved.read().count() > 0;

    // Release restores navigation whether or not a drag survived.
    if mouse.just_released(MouseButton::Left) {
        interaction.pointer_up();
        orbit.enabled = true;
    }

    let pressed = mouse.just_pressed(MouseButton::Left);
    if !pressed && !moved {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };

    let scene = PickScene {
        handles: handles
            .iter()
            .map(|(handle, transform)| (*handle, transform.translation()))
            .collect(),
        tiles: tiles
            .iter()
            .map(|(tile, transform)| TileView {
                points: &tile.positions,
                local_min: tile.local_min,
                local_max: tile.local_max,
                world_from_local: transform.affine(),
            })
            .collect(),
        clip: settings.clip_plane(),
    };

    if pressed {
        let measuring = tool_manager.is_tool_active(ToolType::Measure);
        match interaction.pointer_down(&ray, &scene, measuring) {
            PointerOutcome::DragStarted(target) => {
                orbit.enabled = false;
                debug!("Dragging {:?} of measurement {}", target.role, target.id.0);
            }
            PointerOutcome::PointQueued(point) => {
                debug!("Measurement start queued at {point}");
            }
            PointerOutcome::MeasurementCompleted(measurement) => {
                added.write(MeasurementAdded(measurement));
            }
            PointerOutcome::Ignored => {}
        }
    }

    if moved {
        let previous_hover = interaction.hover();
        if let Some(update) = interaction.pointer_move(&ray, &scene, &measurements) {
            updated.write(update);
        }
        let hover = interaction.hover();
        if hover != previous_hover {
            rpc_interface.send_notification(
                "hover_coordinate",
                serde_json::json!({ "position": hover.map(|p| [p.x, p.y, p.z]) }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::picking::HandleHit;

    #[derive(Default)]
    struct FakePicker {
        handle: Option<HandleHit>,
        cloud: Option<Vec3>,
    }

    impl ScenePicker for FakePicker {
        fn pick_handle(&self, _ray: &Ray3d) -> Option<HandleHit> {
            self.handle
        }

        fn pick_cloud(&self, _ray: &Ray3d) -> Option<Vec3> {
            self.cloud
        }
    }

    fn any_ray() -> Ray3d {
        Ray3d::new(Vec3::new(0.0, 5.0, 10.0), Dir3::NEG_Z)
    }

    fn cloud_at(point: Vec3) -> FakePicker {
        FakePicker {
            cloud: Some(point),
            ..default()
        }
    }

    fn handle_of(id: u32, role: EndpointRole) -> FakePicker {
        FakePicker {
            handle: Some(HandleHit {
                id: MeasurementId(id),
                role,
                distance: 1.0,
            }),
            cloud: Some(Vec3::splat(9.0)),
        }
    }

    #[test]
    fn two_picks_emit_a_measurement() {
        let mut interaction = PointerInteraction::default();
        let ray = any_ray();

        let first = interaction.pointer_down(&ray, &cloud_at(Vec3::new(1.0, 0.0, 0.0)), true);
        assert_eq!(first, PointerOutcome::PointQueued(Vec3::new(1.0, 0.0, 0.0)));

        let second = interaction.pointer_down(&ray, &cloud_at(Vec3::new(4.0, 0.0, 0.0)), true);
        let PointerOutcome::MeasurementCompleted(m) = second else {
            panic!("expected a completed measurement, got {second:?}");
        };
        assert_eq!(m.start, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(m.end, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(m.distance, 3.0);
        assert_eq!(interaction.pending(), None);
    }

    #[test]
    fn ids_are_unique_across_measurements() {
        let mut interaction = PointerInteraction::default();
        let ray = any_ray();
        let mut ids = Vec::new();
        for _ in 0..3 {
            interaction.pointer_down(&ray, &cloud_at(Vec3::ZERO), true);
            if let PointerOutcome::MeasurementCompleted(m) =
                interaction.pointer_down(&ray, &cloud_at(Vec3::X), true)
            {
                ids.push(m.id);
            }
        }
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn handle_takes_priority_over_cloud() {
        let mut interaction = PointerInteraction::default();
        let outcome = interaction.pointer_down(&any_ray(), &handle_of(3, EndpointRole::End), true);

        assert_eq!(
            outcome,
            PointerOutcome::DragStarted(DragTarget {
                id: MeasurementId(3),
                role: EndpointRole::End,
            })
        );
        assert_eq!(interaction.pending(), None);
    }

    #[test]
    fn picks_ignored_without_measure_tool() {
        let mut interaction = PointerInteraction::default();
        let outcome = interaction.pointer_down(&any_ray(), &cloud_at(Vec3::ONE), false);
        assert_eq!(outcome, PointerOutcome::Ignored);
        assert_eq!(interaction.pending(), None);
    }

    #[test]
    fn miss_is_a_no_op() {
        let mut interaction = PointerInteraction::default();
        interaction.set_pending(Vec3::ONE);

        let outcome = interaction.pointer_down(&any_ray(), &FakePicker::default(), true);
        assert_eq!(outcome, PointerOutcome::Ignored);
        assert_eq!(interaction.pending(), Some(Vec3::ONE));
    }

    #[test]
    fn dragging_moves_only_the_grabbed_endpoint() {
        let mut list = MeasurementList::default();
        list.add(Measurement::new(MeasurementId(5), Vec3::ZERO, Vec3::X));

        let mut interaction = PointerInteraction::default();
        interaction.pointer_down(&any_ray(), &handle_of(5, EndpointRole::Start), true);

        let update = interaction
            .pointer_move(&any_ray(), &cloud_at(Vec3::new(1.0, 3.0, 4.0)), &list)
            .unwrap();
        assert_eq!(update.id, MeasurementId(5));
        assert_eq!(update.start, Vec3::new(1.0, 3.0, 4.0));
        assert_eq!(update.end, Vec3::X);
        assert_eq!(update.distance, update.start.distance(update.end));
        assert_eq!(update.distance, 5.0);
    }

    #[test]
    fn drag_start_abandons_pending_point() {
        let mut interaction = PointerInteraction::default();
        interaction.pointer_down(&any_ray(), &cloud_at(Vec3::ONE), true);
        assert!(interaction.pending().is_some());

        interaction.pointer_down(&any_ray(), &handle_of(1, EndpointRole::Start), true);
        interaction.pointer_up();

        let next = interaction.pointer_down(&any_ray(), &cloud_at(Vec3::Y), true);
        assert_eq!(next, PointerOutcome::PointQueued(Vec3::Y));
    }

    #[test]
    fn drag_miss_emits_nothing_and_pointer_up_is_idempotent() {
        let mut list = MeasurementList::default();
        list.add(Measurement::new(MeasurementId(1), Vec3::ZERO, Vec3::X));

        let mut interaction = PointerInteraction::default();
        interaction.pointer_down(&any_ray(), &handle_of(1, EndpointRole::End), true);
        assert!(interaction
            .pointer_move(&any_ray(), &FakePicker::default(), &list)
            .is_none());

        assert!(interaction.pointer_up());
        assert!(!interaction.pointer_up());
        assert_eq!(interaction.dragging(), None);
    }

    #[test]
    fn hover_follows_cloud_when_idle() {
        let mut interaction = PointerInteraction::default();
        let list = MeasurementList::default();

        interaction.pointer_move(&any_ray(), &cloud_at(Vec3::new(1.0, 2.0, 3.0)), &list);
        assert_eq!(interaction.hover(), Some(Vec3::new(1.0, 2.0, 3.0)));

        interaction.pointer_move(&any_ray(), &FakePicker::default(), &list);
        assert_eq!(interaction.hover(), None);
    }

    #[test]
    fn release_after_reset_mid_drag_restores_navigation() {
        use crate::session::host::{ResetSessionEvent, handle_reset_session};
        use crate::session::state::{CalibrationScale, SourceImages};

        let mut app = App::new();
        app.init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<ToolManager>()
            .init_resource::<ViewSettings>()
            .init_resource::<MeasurementList>()
            .init_resource::<CalibrationScale>()
            .init_resource::<SourceImages>()
            .init_resource::<PointerInteraction>()
            .init_resource::<OrbitCamera>()
            .init_resource::<WebRpcInterface>()
            .add_event::<CursorMoved>()
            .add_event::<MeasurementAdded>()
            .add_event::<MeasurementUpdated>()
            .add_event::<ResetSessionEvent>()
            .add_systems(Update, (handle_reset_session, pointer_input_system).chain());

        app.world_mut()
            .resource_mut::<PointerInteraction>()
            .pointer_down(&any_ray(), &handle_of(1, EndpointRole::Start), true);
        app.world_mut().resource_mut::<OrbitCamera>().enabled = false;

        app.world_mut().send_event(ResetSessionEvent);
        app.update();
        assert_eq!(app.world().resource::<PointerInteraction>().dragging(), None);
        assert!(!app.world().resource::<OrbitCamera>().enabled);

        {
            let mut mouse = app.world_mut().resource_mut::<ButtonInput<MouseButton>>();
            mouse.press(MouseButton::Left);
            mouse.clear_just_pressed(MouseButton::Left);
            mouse.release(MouseButton::Left);
        }
        app.update();
        assert!(app.world().resource::<OrbitCamera>().enabled);
    }
}
