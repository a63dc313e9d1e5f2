use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use constants::render_settings::{
    LABEL_BACKGROUND_RGBA, LABEL_BORDER_RGBA, LABEL_BORDER_WIDTH, LABEL_CORNER_RADIUS,
    LABEL_GLYPH_SCALE, LABEL_TEXTURE_HEIGHT, LABEL_TEXTURE_WIDTH, LABEL_TEXT_RGBA,
};
use font8x8::legacy::BASIC_LEGACY;
use image::{Rgba, RgbaImage};

const GLYPH_SIZE: u32 = 8;

/// Rasterise a distance string onto the label card: rounded background,
/// border, centred bold glyphs.
pub fn rasterize_label(text: &str) -> RgbaImage {
    let (w, h) = (LABEL_TEXTURE_WIDTH, LABEL_TEXTURE_HEIGHT);
    let radius = LABEL_CORNER_RADIUS as f32;
    let border = LABEL_BORDER_WIDTH as f32;
    let inner_radius = (radius - border).max(0.0);

    let mut canvas = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]));
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
        if !in_rounded_rect(px, py, 0.0, 0.0, w as f32, h as f32, radius) {
            continue;
        }
        let inner = in_rounded_rect(
            px,
            py,
            border,
            border,
            w as f32 - border,
            h as f32 - border,
            inner_radius,
        );
        *pixel = Rgba(if inner { LABEL_BACKGROUND_RGBA } else { LABEL_BORDER_RGBA });
    }

    draw_text_centred(&mut canvas, text);
    canvas
}

/// Label bitmap as a Bevy texture.
pub fn label_image(text: &str) -> Image {
    let canvas = rasterize_label(text);
    let (width, height) = canvas.dimensions();
    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        canvas.into_raw(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

fn in_rounded_rect(px: f32, py: f32, x0: f32, y0: f32, x1: f32, y1: f32, r: f32) -> bool {
    if px < x0 || px > x1 || py < y0 || py > y1 {
        return false;
    }
    let cx = px.clamp(x0 + r, x1 - r);
    let cy = py.clamp(y0 + r, y1 - r);
    (px - cx).powi(2) + (py - cy).powi(2) <= r * r
}

/// Largest glyph scale up to the configured one that fits inside the border.
fn glyph_scale_for(chars: u32) -> u32 {
    let available = LABEL_TEXTURE_WIDTH - 4 * LABEL_BORDER_WIDTH;
    (1..=LABEL_GLYPH_SCALE)
        .rev()
        .find(|s| chars * GLYPH_SIZE * s + 1 <= available)
        .unwrap_or(1)
}

fn draw_text_centred(canvas: &mut RgbaImage, text: &str) {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return;
    }
    let scale = glyph_scale_for(chars);
    let text_w = chars * GLYPH_SIZE * scale + 1;
    let text_h = GLYPH_SIZE * scale;
    let origin_x = canvas.width().saturating_sub(text_w) / 2;
    let origin_y = canvas.height().saturating_sub(text_h) / 2;

    for (col, ch) in text.chars().enumerate() {
        let glyph = glyph_for_char(ch);
        let glyph_x = origin_x + col as u32 * GLYPH_SIZE * scale;
        for (row, bits) in glyph.iter().enumerate() {
            for bit in 0..GLYPH_SIZE {
                if (bits >> bit) & 0x01 == 0 {
                    continue;
                }
                let x = glyph_x + bit * scale;
                let y = origin_y + row as u32 * scale;
                // Double strike one pixel right for a bold face.
                fill_block(canvas, x, y, scale + 1, scale);
            }
        }
    }
}

fn fill_block(canvas: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32) {
    for yy in y..(y + h).min(canvas.height()) {
        for xx in x..(x + w).min(canvas.width()) {
            canvas.put_pixel(xx, yy, Rgba(LABEL_TEXT_RGBA));
        }
    }
}

fn glyph_for_char(ch: char) -> [u8; 8] {
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_has_transparent_corners_border_and_fill() {
        let card = rasterize_label("");

        assert_eq!(card.dimensions(), (256, 64));
        assert_eq!(card.get_pixel(0, 0).0[3], 0);
        assert_eq!(card.get_pixel(128, 1).0, LABEL_BORDER_RGBA);
        assert_eq!(card.get_pixel(1, 32).0, LABEL_BORDER_RGBA);
        assert_eq!(card.get_pixel(128, 32).0, LABEL_BACKGROUND_RGBA);
    }

    #[test]
    fn text_pixels_stay_inside_the_border() {
        let card = rasterize_label("3000.0mm");
        let border = LABEL_BORDER_WIDTH;

        let text_pixels: Vec<(u32, u32)> = card
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 == LABEL_TEXT_RGBA)
            .map(|(x, y, _)| (x, y))
            .collect();

        assert!(!text_pixels.is_empty());
        assert!(text_pixels.iter().all(|&(x, y)| {
            x >= border && x < 256 - border && y >= border && y < 64 - border
        }));
    }

    #[test]
    fn long_labels_shrink_to_fit() {
        assert_eq!(glyph_scale_for(8), LABEL_GLYPH_SCALE);
        assert!(glyph_scale_for(14) < LABEL_GLYPH_SCALE);
    }

    #[test]
    fn label_image_matches_card_size() {
        let image = label_image("12.5mm");
        assert_eq!(image.width(), 256);
        assert_eq!(image.height(), 64);
        assert_eq!(image.texture_descriptor.format, TextureFormat::Rgba8UnormSrgb);
    }
}
