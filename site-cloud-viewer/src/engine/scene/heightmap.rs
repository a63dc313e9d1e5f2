use bevy::prelude::*;
use constants::scene_layout::{HEIGHT_COLOUR_OFFSET, HEIGHT_COLOUR_SPAN};

/// Heat map colour for a vertical coordinate, in four hard tiers from blue
/// (low) to red (high).
pub fn heightmap_color(y: f32) -> Color {
    let normalised = ((y + HEIGHT_COLOUR_OFFSET) / HEIGHT_COLOUR_SPAN).clamp(0.0, 1.0);
    // Hue in degrees.
    let (hue, saturation, lightness) = if normalised < 0.25 {
        (216.0, 1.0, 0.4)
    } else if normalised < 0.5 {
        (108.0, 1.0, 0.4)
    } else if normalised < 0.75 {
        (36.0, 1.0, 0.5)
    } else {
        (0.0, 1.0, 0.5)
    };
    Color::hsl(hue, saturation, lightness)
}
