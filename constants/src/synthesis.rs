/// Side length of the square working grid every source image is resampled to.
pub const SYNTHESIS_RESOLUTION: u32 = 140;

/// Only the first images of a session are placed on the tile ring.
pub const MAX_SOURCE_IMAGES: usize = 4;

/// Local tile rectangle the pixel grid is stretched over.
pub const TILE_WIDTH: f32 = 14.0;
pub const TILE_HEIGHT: f32 = 12.0;

/// Luminance in [0, 1] maps to depth in [0, DEPTH_SCALE].
pub const DEPTH_SCALE: f32 = 5.0;

/// Points per tile are `pixels * NUMERATOR / DENOMINATOR` (2.2x).
pub const POINT_MULTIPLIER_NUMERATOR: usize = 11;
pub const POINT_MULTIPLIER_DENOMINATOR: usize = 5;

/// Full width of the uniform depth jitter on primary points.
pub const PRIMARY_DEPTH_JITTER: f32 = 0.08;

/// Structure mode treats luminance outside (LOW, HIGH) as an edge.
pub const STRUCTURE_EDGE_HIGH: f32 = 0.7;
pub const STRUCTURE_EDGE_LOW: f32 = 0.2;
pub const STRUCTURE_EDGE_STRENGTH: f32 = 1.0;
pub const STRUCTURE_FLAT_STRENGTH: f32 = 0.2;

/// Tile ring geometry.
pub const TILE_RING_RADIUS: f32 = 7.0;
pub const TILE_ELEVATION: f32 = 3.0;

/// Base seed for per-tile noise. Tile slots xor their index in.
pub const TILE_NOISE_SEED: u64 = 0x5174_e0c1_0d00_0001;
