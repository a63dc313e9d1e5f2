use bevy::prelude::*;

/// Highlight colour shared by handles, measurement lines and label borders (#3b82f6).
pub const MEASURE_COLOUR: Color = Color::srgb(59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0);

/// Viewport clear colour (#070b14).
pub const CLEAR_COLOUR: Color = Color::srgb(7.0 / 255.0, 11.0 / 255.0, 20.0 / 255.0);

/// Grid centre line colour (#1e293b).
pub const GRID_CENTRE_COLOUR: Color = Color::srgb(30.0 / 255.0, 41.0 / 255.0, 59.0 / 255.0);

/// Grid line colour (#0a101f).
pub const GRID_LINE_COLOUR: Color = Color::srgb(10.0 / 255.0, 16.0 / 255.0, 31.0 / 255.0);

pub const SECTION_PLANE_OPACITY: f32 = 0.1;

pub const POINT_OPACITY: f32 = 0.85;

/// Drawn radius of a measurement endpoint handle.
pub const HANDLE_RADIUS: f32 = 0.18;

/// Radius used when ray testing handles. Larger than the drawn radius so the
/// small spheres stay easy to grab over a dense cloud.
pub const HANDLE_PICK_RADIUS: f32 = 0.3;

/// Maximum ray-to-point distance for a point cloud hit.
pub const POINT_PICK_THRESHOLD: f32 = 0.35;

pub const DRAW_LINE_WIDTH: f32 = 0.03;

/// Segments shorter than this are drawn unrotated. Their box collapses to
/// the line width around the midpoint.
pub const MIN_LINE_LENGTH: f32 = 0.02;

pub const LABEL_TEXTURE_WIDTH: u32 = 256;
pub const LABEL_TEXTURE_HEIGHT: u32 = 64;
pub const LABEL_CORNER_RADIUS: u32 = 4;
pub const LABEL_BORDER_WIDTH: u32 = 4;

/// World size of the label quad (width, height).
pub const LABEL_WORLD_SIZE: Vec2 = Vec2::new(0.7, 0.18);

/// Label anchor offset above the measurement midpoint.
pub const LABEL_OFFSET: Vec3 = Vec3::new(0.0, 0.6, 0.0);

/// rgba(15, 23, 42, 0.95)
pub const LABEL_BACKGROUND_RGBA: [u8; 4] = [15, 23, 42, 242];
pub const LABEL_BORDER_RGBA: [u8; 4] = [59, 130, 246, 255];
pub const LABEL_TEXT_RGBA: [u8; 4] = [255, 255, 255, 255];

/// Integer scale applied to the 8x8 glyphs when it fits the label width.
pub const LABEL_GLYPH_SCALE: u32 = 3;
