//! Luminance driven point synthesis.
//!
//! Each source image is resampled to a square working grid. Every pixel
//! becomes a point on a 14 x 12 tile with its luminance as depth, and the
//! grid is replayed a further 1.2 times with squashed depth to thicken the
//! surface. Tiles sit on a ring facing the origin.

use bevy::prelude::*;
use constants::synthesis::{
    DEPTH_SCALE, POINT_MULTIPLIER_DENOMINATOR, POINT_MULTIPLIER_NUMERATOR, PRIMARY_DEPTH_JITTER,
    STRUCTURE_EDGE_HIGH, STRUCTURE_EDGE_LOW, STRUCTURE_EDGE_STRENGTH, STRUCTURE_FLAT_STRENGTH,
    SYNTHESIS_RESOLUTION, TILE_ELEVATION, TILE_HEIGHT, TILE_NOISE_SEED, TILE_RING_RADIUS,
    TILE_WIDTH,
};
use image::imageops::FilterType;
use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::ScanError;
use super::scene::heightmap::heightmap_color;
use crate::session::state::DiagnosticMode;

/// Synthesised points for one tile, in tile-local space.
#[derive(Debug, Clone, Default)]
pub struct TileCloud {
    pub positions: Vec<Vec3>,
    /// Linear RGBA.
    pub colors: Vec<[f32; 4]>,
    pub local_min: Vec3,
    pub local_max: Vec3,
}

impl TileCloud {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Pickable tile of the current reconstruction. Positions are local to the
/// entity's transform.
#[derive(Component, Debug)]
pub struct ScanTile {
    pub slot: usize,
    pub positions: Vec<Vec3>,
    pub local_min: Vec3,
    pub local_max: Vec3,
}

/// Resample a loaded image to the working grid.
pub fn rasterize_source(uri: &str, image: &Image) -> Result<RgbaImage, ScanError> {
    let dynamic = image
        .clone()
        .try_into_dynamic()
        .map_err(|e| ScanError::Raster {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
    Ok(dynamic
        .resize_exact(SYNTHESIS_RESOLUTION, SYNTHESIS_RESOLUTION, FilterType::Triangle)
        .to_rgba8())
}

/// Noise source for a tile slot. Same slot, same sequence.
pub fn tile_rng(slot: usize) -> StdRng {
    StdRng::seed_from_u64(TILE_NOISE_SEED ^ slot as u64)
}

/// Placement of tile `slot` on the ring, rotated to face the centre.
pub fn tile_transform(slot: usize) -> Transform {
    let angle = (slot as f32 * 90.0).to_radians();
    Transform::from_xyz(
        angle.cos() * TILE_RING_RADIUS,
        TILE_ELEVATION,
        angle.sin() * TILE_RING_RADIUS,
    )
    .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2 - angle))
}

/// Build the tile cloud for one rasterised image. Positions depend only on
/// the pixels and the RNG, so changing `mode` recolours without moving points.
pub fn synthesize_tile(pixels: &RgbaImage, mode: DiagnosticMode, rng: &mut impl Rng) -> TileCloud {
    let res = pixels.width() as usize;
    let count = res * pixels.height() as usize;
    if count == 0 {
        return TileCloud::default();
    }
    let total = count * POINT_MULTIPLIER_NUMERATOR / POINT_MULTIPLIER_DENOMINATOR;
    let raw = pixels.as_raw();

    let mut cloud = TileCloud {
        positions: Vec::with_capacity(total),
        colors: Vec::with_capacity(total),
        local_min: Vec3::splat(f32::INFINITY),
        local_max: Vec3::splat(f32::NEG_INFINITY),
    };

    for i in 0..total {
        let idx = i % count;
        let [r, g, b] = [raw[idx * 4], raw[idx * 4 + 1], raw[idx * 4 + 2]].map(|c| c as f32 / 255.0);
        let lum = (r + g + b) / 3.0;

        let lx = ((idx % res) as f32 / res as f32 - 0.5) * TILE_WIDTH;
        let ly = (0.5 - (idx / res) as f32 / res as f32) * TILE_HEIGHT;
        let mut lz = lum * DEPTH_SCALE;
        if i >= count {
            lz *= rng.gen_range(0.0..1.0_f32);
        } else {
            lz += (rng.gen_range(0.0..1.0_f32) - 0.5) * PRIMARY_DEPTH_JITTER;
        }

        let position = Vec3::new(lx, ly, lz);
        cloud.local_min = cloud.local_min.min(position);
        cloud.local_max = cloud.local_max.max(position);
        cloud.positions.push(position);
        cloud.colors.push(point_color(mode, [r, g, b], lum, ly));
    }

    cloud
}

fn point_color(mode: DiagnosticMode, rgb: [f32; 3], lum: f32, ly: f32) -> [f32; 4] {
    let color = match mode {
        DiagnosticMode::Rgb => Color::srgb(rgb[0], rgb[1], rgb[2]),
        DiagnosticMode::Height => heightmap_color(ly),
        DiagnosticMode::Structure => {
            let edge = if lum > STRUCTURE_EDGE_HIGH || lum < STRUCTURE_EDGE_LOW {
                STRUCTURE_EDGE_STRENGTH
            } else {
                STRUCTURE_FLAT_STRENGTH
            };
            Color::srgb(0.0, edge * 0.8, edge)
        }
    };
    color.to_linear().to_f32_array()
}
