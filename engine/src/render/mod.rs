mod animation;
mod sprite;
mod wgpu_backend;

pub use animation::{Animation, AnimationClip, Repeat};
pub use sprite::{Sprite, SpriteAnchor, TextureHandle};
pub use wgpu_backend::{Frame, Renderer, MAX_SPRITES_PER_FRAME};

/// Convert a packed `0xRRGGBBAA` colour to normalized RGBA.
pub fn color_from_hex(rgba: u32) -> [f32; 4] {
    [
        ((rgba >> 24) & 0xff) as f32 / 255.0,
        ((rgba >> 16) & 0xff) as f32 / 255.0,
        ((rgba >> 8) & 0xff) as f32 / 255.0,
        (rgba & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colour_unpacks_channels() {
        assert_eq!(color_from_hex(0xff0000ff), [1.0, 0.0, 0.0, 1.0]);
        let sky = color_from_hex(0x045678ff);
        assert!((sky[1] - 0x56 as f32 / 255.0).abs() < f32::EPSILON);
        assert_eq!(sky[3], 1.0);
    }
}
