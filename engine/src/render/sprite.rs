use crate::math::{Rect, Vec2};

/// Opaque handle used to reference textures owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    /// Build a handle from a raw id. Useful when no renderer exists (headless tests).
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// Where a sprite quad sits relative to its node origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpriteAnchor {
    #[default]
    Center,
    BottomLeft,
    TopLeft,
    BottomCenter,
}

/// A drawable cut out of an atlas texture.
///
/// Every frame has the same size; `frames` holds the source rect of each one in atlas
/// pixels. Animations drive `current_frame`.
#[derive(Clone, Debug)]
pub struct Sprite {
    pub texture: TextureHandle,
    pub width: f32,
    pub height: f32,
    pub anchor: SpriteAnchor,
    /// Multiplicative tint applied to the sampled texture color.
    pub tint: [f32; 4],
    frames: Vec<Rect>,
    current_frame: usize,
}

impl Sprite {
    /// Single-frame sprite showing `source` from the atlas at its natural size.
    pub fn new(texture: TextureHandle, source: Rect) -> Self {
        Self::with_frames(texture, source.width, source.height, 1, source)
    }

    /// Sprite with `frame_count` frames, all initialised to `source`.
    pub fn with_frames(
        texture: TextureHandle,
        width: f32,
        height: f32,
        frame_count: usize,
        source: Rect,
    ) -> Self {
        Self {
            texture,
            width,
            height,
            anchor: SpriteAnchor::Center,
            tint: [1.0, 1.0, 1.0, 1.0],
            frames: vec![source; frame_count.max(1)],
            current_frame: 0,
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: SpriteAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set the atlas rect for frame `index`. Out-of-range indices are ignored.
    pub fn set_frame_source(&mut self, index: usize, source: Rect) {
        if let Some(frame) = self.frames.get_mut(index) {
            *frame = source;
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Select the frame to draw; clamped to the last frame.
    pub fn set_current_frame(&mut self, index: usize) {
        self.current_frame = index.min(self.frames.len() - 1);
    }

    pub fn frame_source(&self) -> Rect {
        self.frames[self.current_frame]
    }

    /// Normalized `[u, v, w, h]` of the current frame for a texture of the given size.
    pub fn uv_rect(&self, texture_size: (u32, u32)) -> [f32; 4] {
        self.frame_source().normalized(texture_size.0, texture_size.1)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// World-space centre of the quad when the node origin is at `origin`.
    pub fn quad_center(&self, origin: Vec2) -> Vec2 {
        let half = self.size() * 0.5;
        let offset = match self.anchor {
            SpriteAnchor::Center => Vec2::ZERO,
            SpriteAnchor::BottomLeft => half,
            SpriteAnchor::TopLeft => Vec2::new(half.x, -half.y),
            SpriteAnchor::BottomCenter => Vec2::new(0.0, half.y),
        };
        origin + offset
    }
}
