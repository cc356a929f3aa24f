//! Regions of the sprite atlas, in atlas pixels with the origin at the top-left.

use flappy_engine::{Rect, Sprite, TextureHandle};

pub const ATLAS_SIZE: u32 = 1024;

pub const BACKGROUND: Rect = Rect::new(0.0, 0.0, 288.0, 512.0);
pub const GROUND: Rect = Rect::new(584.0, 0.0, 336.0, 112.0);
pub const PIPE_UPPER: Rect = Rect::new(112.0, 646.0, 52.0, 320.0);
pub const PIPE_LOWER: Rect = Rect::new(168.0, 646.0, 52.0, 320.0);
pub const BIRD_FRAMES: [Rect; 3] = [
    Rect::new(6.0, 982.0, 34.0, 24.0),
    Rect::new(62.0, 982.0, 34.0, 24.0),
    Rect::new(118.0, 982.0, 34.0, 24.0),
];
pub const MENU_TITLE: Rect = Rect::new(584.0, 116.0, 196.0, 62.0);
pub const TAP_HINT: Rect = Rect::new(584.0, 182.0, 114.0, 98.0);
pub const GAME_OVER: Rect = Rect::new(784.0, 116.0, 204.0, 54.0);
pub const PLAY_BUTTON: Rect = Rect::new(702.0, 234.0, 116.0, 70.0);

pub const PIPE_WIDTH: f32 = 52.0;
pub const PIPE_HEIGHT: f32 = 320.0;

/// Flat colours painted into the stand-in atlas when the real one cannot be loaded.
pub fn placeholder_regions() -> Vec<(Rect, [u8; 4])> {
    let mut regions = vec![
        (BACKGROUND, [78, 192, 202, 255]),
        (GROUND, [222, 216, 149, 255]),
        (PIPE_UPPER, [115, 191, 46, 255]),
        (PIPE_LOWER, [115, 191, 46, 255]),
        (MENU_TITLE, [252, 160, 72, 255]),
        (TAP_HINT, [255, 255, 255, 200]),
        (GAME_OVER, [252, 120, 88, 255]),
        (PLAY_BUTTON, [232, 97, 1, 255]),
    ];
    let bird = [[250, 200, 40, 255], [245, 180, 30, 255], [250, 200, 40, 255]];
    regions.extend(BIRD_FRAMES.iter().copied().zip(bird));
    regions
}

pub fn bird(texture: TextureHandle) -> Sprite {
    let [first, ..] = BIRD_FRAMES;
    let mut sprite = Sprite::with_frames(
        texture,
        first.width,
        first.height,
        BIRD_FRAMES.len(),
        first,
    );
    for (index, frame) in BIRD_FRAMES.iter().enumerate() {
        sprite.set_frame_source(index, *frame);
    }
    sprite
}

pub fn pipe_upper(texture: TextureHandle) -> Sprite {
    Sprite::new(texture, PIPE_UPPER)
}

pub fn pipe_lower(texture: TextureHandle) -> Sprite {
    Sprite::new(texture, PIPE_LOWER)
}
