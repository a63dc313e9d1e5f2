use bevy::prelude::*;
use constants::render_settings::{
    DRAW_LINE_WIDTH, HANDLE_RADIUS, LABEL_OFFSET, LABEL_WORLD_SIZE, MEASURE_COLOUR,
    MIN_LINE_LENGTH,
};
use serde::{Deserialize, Serialize};

use super::label::label_image;
use crate::engine::scene::registry::{SceneOwner, SceneRegistry};
use crate::session::state::{CalibrationScale, MeasurementList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementId(pub u32);

/// Which end of a measurement a handle controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointRole {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: MeasurementId,
    pub start: Vec3,
    pub end: Vec3,
    /// Cached `|end - start|` in scene units.
    pub distance: f32,
}

impl Measurement {
    pub fn new(id: MeasurementId, start: Vec3, end: Vec3) -> Self {
        Self {
            id,
            start,
            end,
            distance: start.distance(end),
        }
    }

    pub fn endpoint(&self, role: EndpointRole) -> Vec3 {
        match role {
            EndpointRole::Start => self.start,
            EndpointRole::End => self.end,
        }
    }

    /// Copy with one endpoint moved and the distance recomputed. The id and
    /// the other endpoint are untouched.
    pub fn with_endpoint(&self, role: EndpointRole, point: Vec3) -> Self {
        let (start, end) = match role {
            EndpointRole::Start => (point, self.end),
            EndpointRole::End => (self.start, point),
        };
        Self::new(self.id, start, end)
    }

    pub fn midpoint(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    pub fn label_text(&self, scale: CalibrationScale) -> String {
        format_distance_label(self.start.distance(self.end), scale)
    }
}

pub fn format_distance_label(scene_units: f32, scale: CalibrationScale) -> String {
    format!("{:.1}mm", scale.to_millimetres(scene_units))
}

/// Draggable endpoint marker.
#[derive(Component, Debug, Clone, Copy)]
pub struct MeasureHandle {
    pub id: MeasurementId,
    pub role: EndpointRole,
}

#[derive(Component)]
pub struct MeasurementLabel;

#[derive(Component)]
pub struct MeasurementLine;

/// Rebuild every measurement group from the session list. Runs only when the
/// list or the calibration scale changed.
pub fn rebuild_measurement_render(
    mut commands: Commands,
    measurements: Res<MeasurementList>,
    scale: Res<CalibrationScale>,
    mut registry: ResMut<SceneRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
) {
    for entity in registry.take_measurements() {
        if let Ok(mut entity_commands) = commands.get_entity(entity) {
            entity_commands.despawn();
        }
    }

    if measurements.is_empty() {
        return;
    }

    let marker_material = materials.add(StandardMaterial {
        base_color: MEASURE_COLOUR,
        unlit: true,
        ..default()
    });
    let handle_mesh = meshes.add(Sphere::new(HANDLE_RADIUS));
    let label_mesh = meshes.add(Rectangle::new(1.0, 1.0));

    for m in measurements.iter() {
        let label_material = materials.add(StandardMaterial {
            base_color_texture: Some(images.add(label_image(&m.label_text(*scale)))),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            ..default()
        });

        let group = commands
            .spawn((
                Transform::IDENTITY,
                Visibility::Visible,
                SceneOwner::Measurement(m.id),
                Name::new(format!("measurement_{}", m.id.0)),
            ))
            .with_children(|parent| {
                for role in [EndpointRole::Start, EndpointRole::End] {
                    parent.spawn((
                        Mesh3d(handle_mesh.clone()),
                        MeshMaterial3d(marker_material.clone()),
                        Transform::from_translation(m.endpoint(role)),
                        MeasureHandle { id: m.id, role },
                        SceneOwner::Measurement(m.id),
                    ));
                }

                let dir = m.end - m.start;
                let length = dir.length();
                let rotation = if length > MIN_LINE_LENGTH {
                    Quat::from_rotation_arc(Vec3::X, dir / length)
                } else {
                    Quat::IDENTITY
                };
                parent.spawn((
                    Mesh3d(meshes.add(Cuboid::new(length, DRAW_LINE_WIDTH, DRAW_LINE_WIDTH))),
                    MeshMaterial3d(marker_material.clone()),
                    Transform::from_translation(m.midpoint()).with_rotation(rotation),
                    MeasurementLine,
                    SceneOwner::Measurement(m.id),
                ));

                parent.spawn((
                    Mesh3d(label_mesh.clone()),
                    MeshMaterial3d(label_material),
                    Transform::from_translation(m.midpoint() + LABEL_OFFSET)
                        .with_scale(LABEL_WORLD_SIZE.extend(1.0)),
                    MeasurementLabel,
                    SceneOwner::Measurement(m.id),
                ));
            })
            .id();

        registry.register_measurement(m.id, group);
    }

    debug!("Rebuilt {} measurement groups", measurements.len());
}

/// Keep labels facing the camera.
pub fn billboard_labels(
    cameras: Query<&GlobalTransform, With<Camera3d>>,
    mut labels: Query<&mut Transform, With<MeasurementLabel>>,
) {
    let Ok(camera) = cameras.single() else {
        return;
    };
    let rotation = camera.compute_transform().rotation;
    for mut transform in &mut labels {
        transform.rotation = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_app() -> App {
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<Assets<Image>>()
            .init_resource::<MeasurementList>()
            .init_resource::<CalibrationScale>()
            .init_resource::<SceneRegistry>()
            .add_systems(
                Update,
                rebuild_measurement_render.run_if(
                    resource_changed::<MeasurementList>.or(resource_changed::<CalibrationScale>),
                ),
            );
        app
    }

    fn owners(app: &mut App) -> Vec<SceneOwner> {
        let world = app.world_mut();
        world.query::<&SceneOwner>().iter(world).copied().collect()
    }

    #[test]
    fn picks_three_units_apart_read_three_metres() {
        let m = Measurement::new(MeasurementId(1), Vec3::new(1.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(m.distance, 3.0);
        assert_eq!(m.label_text(CalibrationScale(1.0)), "3000.0mm");
        assert_eq!(m.label_text(CalibrationScale(0.5)), "1500.0mm");
    }

    #[test]
    fn with_endpoint_keeps_id_and_other_end() {
        let m = Measurement::new(MeasurementId(4), Vec3::ZERO, Vec3::X);
        let moved = m.with_endpoint(EndpointRole::End, Vec3::new(0.0, 3.0, 4.0));

        assert_eq!(moved.id, m.id);
        assert_eq!(moved.start, m.start);
        assert_eq!(moved.distance, 5.0);
        assert_eq!(moved.distance, moved.start.distance(moved.end));
    }

    #[test]
    fn each_measurement_spawns_two_handles_and_a_label() {
        let mut app = render_app();
        app.world_mut()
            .resource_mut::<MeasurementList>()
            .add(Measurement::new(MeasurementId(1), Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)));
        app.update();

        let world = app.world_mut();
        let handles: Vec<MeasureHandle> = world.query::<&MeasureHandle>().iter(world).copied().collect();
        assert_eq!(handles.len(), 2);
        assert!(handles.iter().any(|h| h.role == EndpointRole::Start));
        assert!(handles.iter().any(|h| h.role == EndpointRole::End));

        let labels = world
            .query_filtered::<&Transform, With<MeasurementLabel>>()
            .iter(world)
            .map(|t| t.translation)
            .collect::<Vec<_>>();
        assert_eq!(labels, vec![Vec3::new(1.0, 0.6, 0.0)]);
    }

    #[test]
    fn zero_length_measurement_still_gets_a_line() {
        let mut app = render_app();
        {
            let mut list = app.world_mut().resource_mut::<MeasurementList>();
            list.add(Measurement::new(MeasurementId(1), Vec3::ONE, Vec3::ONE));
            list.add(Measurement::new(MeasurementId(2), Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0)));
        }
        app.update();

        let world = app.world_mut();
        let mut lines: Vec<(SceneOwner, Transform)> = world
            .query_filtered::<(&SceneOwner, &Transform), With<MeasurementLine>>()
            .iter(world)
            .map(|(owner, transform)| (*owner, *transform))
            .collect();
        assert_eq!(lines.len(), 2);
        lines.sort_by_key(|(owner, _)| match owner {
            SceneOwner::Measurement(id) => id.0,
            SceneOwner::Reconstruction => 0,
        });

        let (_, degenerate) = lines[0];
        assert_eq!(degenerate.translation, Vec3::ONE);
        assert_eq!(degenerate.rotation, Quat::IDENTITY);

        let (_, along_z) = lines[1];
        assert_eq!(along_z.translation, Vec3::new(0.0, 0.0, 1.0));
        assert!((along_z.rotation * Vec3::X).distance(Vec3::Z) < 1e-5);
    }

    #[test]
    fn clearing_measurements_leaves_reconstruction() {
        let mut app = render_app();
        let reconstruction = app.world_mut().spawn(SceneOwner::Reconstruction).id();
        app.world_mut()
            .resource_mut::<SceneRegistry>()
            .replace_reconstruction(reconstruction);

        {
            let mut list = app.world_mut().resource_mut::<MeasurementList>();
            list.add(Measurement::new(MeasurementId(1), Vec3::ZERO, Vec3::X));
            list.add(Measurement::new(MeasurementId(2), Vec3::Y, Vec3::Z));
        }
        app.update();
        assert!(owners(&mut app).iter().any(|o| matches!(o, SceneOwner::Measurement(_))));

        app.world_mut().resource_mut::<MeasurementList>().clear();
        app.update();

        let remaining = owners(&mut app);
        assert_eq!(remaining, vec![SceneOwner::Reconstruction]);
        assert!(app.world().get_entity(reconstruction).is_ok());
        assert!(app.world().resource::<SceneRegistry>().measurement_count() == 0);
    }
}
