//! Content-to-texture sync.
//!
//! Renders a card's text content onto a fixed-size RGBA buffer and hands
//! it to the matched plane's first material slot, marking the slot dirty
//! for the next render. The sync re-runs in full on every content or
//! plane change; there is no incremental diffing. When the drawing
//! surface cannot be acquired (no font asset on disk) the operation
//! aborts silently and the plane keeps its previous texture.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use once_cell::sync::Lazy;

use super::{MaterialSlots, TextureImage};

pub const TEXTURE_WIDTH: usize = 1024;
pub const TEXTURE_HEIGHT: usize = 512;

const FONT_PX: f32 = 32.0;
const MARGIN_X: f32 = 40.0;
const FIRST_BASELINE: f32 = 256.0;

static CONTENT_FONT: Lazy<Option<FontArc>> = Lazy::new(|| {
    const CANDIDATES: [&str; 2] = [
        "assets/fonts/NotoSans-Regular.ttf",
        "assets/fonts/NotoSansMono-Regular.ttf",
    ];
    for path in CANDIDATES {
        if let Ok(bytes) = std::fs::read(path) {
            match FontArc::try_from_vec(bytes) {
                Ok(font) => return Some(font),
                Err(e) => log::warn!("invalid font {}: {}", path, e),
            }
        }
    }
    log::debug!("no content font found, plane texture sync disabled");
    None
});

/// Rasterise `content` as white text on a transparent 1024×512 buffer.
/// Returns `None` when no drawing surface is available.
pub fn rasterize_content(content: &str) -> Option<TextureImage> {
    let font = CONTENT_FONT.as_ref()?;
    Some(rasterize_with(font, content))
}

fn rasterize_with(font: &FontArc, content: &str) -> TextureImage {
    let (w, h) = (TEXTURE_WIDTH, TEXTURE_HEIGHT);
    let mut rgba = vec![0u8; w * h * 4];

    let scale = PxScale::from(FONT_PX);
    let scaled = font.as_scaled(scale);
    let line_height = (scaled.ascent() - scaled.descent() + scaled.line_gap()).ceil();

    let mut caret = MARGIN_X;
    let mut baseline = FIRST_BASELINE;

    for ch in content.chars() {
        if ch == '\n' {
            caret = MARGIN_X;
            baseline += line_height;
            continue;
        }
        let glyph_id = font.glyph_id(ch);
        let advance = scaled.h_advance(glyph_id);
        if caret + advance > w as f32 - MARGIN_X {
            caret = MARGIN_X;
            baseline += line_height;
        }
        if baseline >= h as f32 {
            break;
        }

        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(caret, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                if x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
                    return;
                }
                let idx = (y as usize * w + x as usize) * 4;
                let alpha = (coverage * 255.0) as u8;
                rgba[idx] = 255;
                rgba[idx + 1] = 255;
                rgba[idx + 2] = 255;
                rgba[idx + 3] = rgba[idx + 3].max(alpha);
            });
        }
        caret += advance;
    }

    TextureImage {
        width: w,
        height: h,
        rgba,
    }
}

/// Assign `image` to the first material slot (or the sole slot) and mark
/// it for re-upload. Returns false when the node has no material slot.
pub fn apply_content_texture(slots: &mut MaterialSlots, image: TextureImage) -> bool {
    let Some(material) = slots.first_mut() else {
        return false;
    };
    material.content_texture = Some(image);
    material.needs_update = true;
    true
}

/// Full sync pass: rasterise and apply. A missing drawing surface makes
/// this a silent no-op.
pub fn sync_content(slots: &mut MaterialSlots, content: &str) {
    if let Some(image) = rasterize_content(content) {
        apply_content_texture(slots, image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Material;

    fn blank_image() -> TextureImage {
        TextureImage {
            width: TEXTURE_WIDTH,
            height: TEXTURE_HEIGHT,
            rgba: vec![0; TEXTURE_WIDTH * TEXTURE_HEIGHT * 4],
        }
    }

    #[test]
    fn apply_targets_first_slot_and_marks_dirty() {
        let mut slots =
            MaterialSlots::List(vec![Material::default(), Material::default()]);
        assert!(apply_content_texture(&mut slots, blank_image()));

        match slots {
            MaterialSlots::List(l) => {
                assert!(l[0].needs_update);
                assert!(l[0].content_texture.is_some());
                assert!(!l[1].needs_update);
                assert!(l[1].content_texture.is_none());
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn apply_targets_sole_slot() {
        let mut slots = MaterialSlots::Single(Material::default());
        assert!(apply_content_texture(&mut slots, blank_image()));
        assert!(slots.first().unwrap().needs_update);
    }

    #[test]
    fn apply_without_slots_reports_failure() {
        let mut slots = MaterialSlots::List(Vec::new());
        assert!(!apply_content_texture(&mut slots, blank_image()));
    }

    #[test]
    fn sync_without_font_is_silent() {
        // No font asset ships with the repo, so the surface is unavailable
        // and the sync must leave the slot untouched.
        let mut slots = MaterialSlots::Single(Material::default());
        sync_content(&mut slots, "kick, snare");
        let material = slots.first().unwrap();
        assert!(!material.needs_update);
        assert!(material.content_texture.is_none());
    }
}
