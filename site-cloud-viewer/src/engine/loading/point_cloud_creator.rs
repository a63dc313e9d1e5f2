use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;
use image::RgbaImage;

use crate::engine::error::ScanError;
use crate::engine::mesh::point_quad_mesh::create_point_quad_mesh;
use crate::engine::point_cloud::{
    ScanTile, TileCloud, rasterize_source, synthesize_tile, tile_rng, tile_transform,
};
use crate::engine::scene::registry::SceneOwner;
use crate::engine::shaders::{ScanPointMaterial, ScanPointParams};
use crate::session::state::{DiagnosticMode, ViewSettings};

/// Terminal load result of one source image.
pub enum SourceState<'a> {
    Loaded(&'a Image),
    Failed,
}

/// Rasterise every source that loaded. Failures are logged and skipped.
pub fn rasterize_sources<'a>(
    sources: impl IntoIterator<Item = (usize, &'a str, SourceState<'a>)>,
) -> Vec<(usize, RgbaImage)> {
    sources
        .into_iter()
        .filter_map(|(slot, uri, state)| {
            let result = match state {
                SourceState::Loaded(image) => rasterize_source(uri, image),
                SourceState::Failed => Err(ScanError::Decode {
                    uri: uri.to_string(),
                }),
            };
            match result {
                Ok(pixels) => Some((slot, pixels)),
                Err(e) => {
                    warn!("Skipping tile {slot}: {e}");
                    None
                }
            }
        })
        .collect()
}

pub fn synthesize_tiles(rasters: &[(usize, RgbaImage)], mode: DiagnosticMode) -> Vec<(usize, TileCloud)> {
    rasters
        .iter()
        .map(|(slot, pixels)| (*slot, synthesize_tile(pixels, mode, &mut tile_rng(*slot))))
        .collect()
}

/// Spawn a reconstruction group holding one child per tile. Returns the root.
pub fn spawn_reconstruction(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ScanPointMaterial>,
    tiles: Vec<(usize, TileCloud)>,
    settings: &ViewSettings,
    generation: u64,
) -> Entity {
    let material = materials.add(ScanPointMaterial {
        params: ScanPointParams::from_settings(settings),
    });

    commands
        .spawn((
            Transform::IDENTITY,
            Visibility::Visible,
            SceneOwner::Reconstruction,
            Name::new(format!("reconstruction_{generation}")),
        ))
        .with_children(|parent| {
            for (slot, cloud) in tiles {
                let mesh = meshes.add(create_point_quad_mesh(&cloud));
                parent.spawn((
                    Mesh3d(mesh),
                    MeshMaterial3d(material.clone()),
                    tile_transform(slot),
                    NoFrustumCulling,
                    ScanTile {
                        slot,
                        positions: cloud.positions,
                        local_min: cloud.local_min,
                        local_max: cloud.local_max,
                    },
                    SceneOwner::Reconstruction,
                ));
            }
        })
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::RenderAssetUsages;
    use bevy::ecs::system::RunSystemOnce;
    use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

    fn solid_image(rgba: [u8; 4]) -> Image {
        Image::new_fill(
            Extent3d {
                width: 16,
                height: 16,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            &rgba,
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::MAIN_WORLD,
        )
    }

    #[test]
    fn one_failed_image_of_four_still_yields_three_tiles() {
        let loaded = [
            solid_image([200, 10, 10, 255]),
            solid_image([10, 200, 10, 255]),
            solid_image([10, 10, 200, 255]),
        ];
        let sources = vec![
            (0, "north.png", SourceState::Loaded(&loaded[0])),
            (1, "east.png", SourceState::Failed),
            (2, "south.png", SourceState::Loaded(&loaded[1])),
            (3, "west.png", SourceState::Loaded(&loaded[2])),
        ];

        let rasters = rasterize_sources(sources);
        assert_eq!(rasters.iter().map(|(slot, _)| *slot).collect::<Vec<_>>(), vec![0, 2, 3]);
        assert!(rasters.iter().all(|(_, p)| p.dimensions() == (140, 140)));

        let mut tiles = synthesize_tiles(&rasters, DiagnosticMode::Rgb);
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<ScanPointMaterial>>();
        app.world_mut()
            .run_system_once(
                move |mut commands: Commands,
                      mut meshes: ResMut<Assets<Mesh>>,
                      mut materials: ResMut<Assets<ScanPointMaterial>>| {
                    spawn_reconstruction(
                        &mut commands,
                        &mut meshes,
                        &mut materials,
                        std::mem::take(&mut tiles),
                        &ViewSettings::default(),
                        1,
                    );
                },
            )
            .unwrap();

        let world = app.world_mut();
        let tiles: Vec<usize> = world.query::<&ScanTile>().iter(world).map(|t| t.slot).collect();
        assert_eq!(tiles.len(), 3);
        assert!(!tiles.contains(&1));
        assert_eq!(world.resource::<Assets<Mesh>>().len(), 3);
    }
}
