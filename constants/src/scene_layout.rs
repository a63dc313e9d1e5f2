use bevy::prelude::*;

/// Height of the ground grid. Section heights are measured from here.
pub const GROUND_LEVEL: f32 = -2.0;

pub const GRID_SIZE: f32 = 50.0;
pub const GRID_DIVISIONS: u32 = 100;

/// Edge length of the square section plane indicator.
pub const SECTION_PLANE_SIZE: f32 = 30.0;

/// Clipping plane normal. Geometry above the section height is hidden.
pub const CLIP_PLANE_NORMAL: Vec3 = Vec3::new(0.0, -1.0, 0.0);

pub const CAMERA_START_POSITION: Vec3 = Vec3::new(15.0, 12.0, 18.0);
pub const CAMERA_FOV_DEGREES: f32 = 50.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Heat map input mapping: `normalised = (y + OFFSET) / SPAN`.
pub const HEIGHT_COLOUR_OFFSET: f32 = 1.0;
pub const HEIGHT_COLOUR_SPAN: f32 = 6.0;
