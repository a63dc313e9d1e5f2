/// Flat ground grid with highlighted centre lines
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::view::NoFrustumCulling;
use constants::render_settings::{GRID_CENTRE_COLOUR, GRID_LINE_COLOUR};
use constants::scene_layout::{GRID_DIVISIONS, GRID_SIZE, GROUND_LEVEL};

#[derive(Component)]
pub struct GroundGrid;

/// Spawn the ground grid: regular lines and the two centre lines as
/// separate meshes so each gets its own colour.
pub fn create_ground_grid(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let (centre_lines, other_lines) = grid_line_segments(GRID_SIZE, GRID_DIVISIONS);

    for (segments, colour) in [
        (other_lines, GRID_LINE_COLOUR),
        (centre_lines, GRID_CENTRE_COLOUR),
    ] {
        let material = materials.add(StandardMaterial {
            base_color: colour,
            unlit: true,
            ..default()
        });
        commands.spawn((
            Mesh3d(meshes.add(create_line_list_mesh(&segments))),
            MeshMaterial3d(material),
            Transform::from_xyz(0.0, GROUND_LEVEL, 0.0),
            NoFrustumCulling,
            GroundGrid,
        ));
    }
}

/// Line segments in the XZ plane, split into (centre lines, other lines).
pub fn grid_line_segments(size: f32, divisions: u32) -> (Vec<[Vec3; 2]>, Vec<[Vec3; 2]>) {
    let half = size / 2.0;
    let step = size / divisions as f32;
    let centre = divisions / 2;
    let mut centre_lines = Vec::new();
    let mut other_lines = Vec::new();

    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let along_z = [Vec3::new(k, 0.0, -half), Vec3::new(k, 0.0, half)];
        let along_x = [Vec3::new(-half, 0.0, k), Vec3::new(half, 0.0, k)];
        let target = if divisions % 2 == 0 && i == centre {
            &mut centre_lines
        } else {
            &mut other_lines
        };
        target.push(along_z);
        target.push(along_x);
    }

    (centre_lines, other_lines)
}

fn create_line_list_mesh(segments: &[[Vec3; 2]]) -> Mesh {
    let vertices: Vec<[f32; 3]> = segments
        .iter()
        .flat_map(|[a, b]| [a.to_array(), b.to_array()])
        .collect();
    let indices: Vec<u32> = (0..vertices.len() as u32).collect();

    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_divisions_plus_one_lines_per_axis() {
        let (centre, other) = grid_line_segments(50.0, 100);
        assert_eq!(centre.len() + other.len(), 2 * 101);
        assert_eq!(centre.len(), 2);
    }

    #[test]
    fn centre_lines_pass_through_origin() {
        let (centre, _) = grid_line_segments(50.0, 100);
        for [a, b] in centre {
            let mid = (a + b) / 2.0;
            assert!(mid.length() < 1e-4);
            assert!((a.distance(b) - 50.0).abs() < 1e-4);
        }
    }
}
