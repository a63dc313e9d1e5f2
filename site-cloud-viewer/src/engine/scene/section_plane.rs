use bevy::prelude::*;
use constants::render_settings::{MEASURE_COLOUR, SECTION_PLANE_OPACITY};
use constants::scene_layout::SECTION_PLANE_SIZE;

use crate::session::state::ViewSettings;

/// Translucent marker showing where the section cut sits.
#[derive(Component)]
pub struct SectionPlaneIndicator;

pub fn spawn_section_plane(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<ViewSettings>,
) {
    let material = materials.add(StandardMaterial {
        base_color: MEASURE_COLOUR.with_alpha(SECTION_PLANE_OPACITY),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(SECTION_PLANE_SIZE, SECTION_PLANE_SIZE))),
        MeshMaterial3d(material),
        Transform::from_xyz(0.0, settings.section_plane_y(), 0.0),
        indicator_visibility(&settings),
        SectionPlaneIndicator,
    ));
}

/// Only the indicator follows settings here; point materials are rebuilt
/// with the reconstruction.
pub fn update_section_plane(
    settings: Res<ViewSettings>,
    mut indicator: Query<(&mut Transform, &mut Visibility), With<SectionPlaneIndicator>>,
) {
    for (mut transform, mut visibility) in &mut indicator {
        transform.translation.y = settings.section_plane_y();
        *visibility = indicator_visibility(&settings);
    }
}

fn indicator_visibility(settings: &ViewSettings) -> Visibility {
    if settings.is_clipping_active {
        Visibility::Visible
    } else {
        Visibility::Hidden
    }
}
