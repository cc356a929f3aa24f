use std::collections::HashMap;

use image::{Rgba, RgbaImage};

use crate::math::Rect;
use crate::render::{Renderer, TextureHandle};

/// Caches texture handles by path or key so each image is uploaded once.
#[derive(Debug, Default)]
pub struct AssetManager {
    textures: HashMap<String, TextureHandle>,
}

impl AssetManager {
    /// Create a new asset manager with no cached assets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a texture from a file path, caching it if already loaded.
    pub fn load_texture(&mut self, renderer: &mut Renderer, path: &str) -> anyhow::Result<TextureHandle> {
        if let Some(handle) = self.textures.get(path) {
            return Ok(*handle);
        }

        let handle = renderer.load_texture_from_file(path)?;
        log::debug!("Loaded texture '{path}' as {handle:?}");
        self.textures.insert(path.to_string(), handle);
        Ok(handle)
    }

    /// Load a texture from encoded bytes, caching it by a given key.
    pub fn load_texture_from_bytes(
        &mut self,
        renderer: &mut Renderer,
        key: &str,
        bytes: &[u8],
    ) -> anyhow::Result<TextureHandle> {
        if let Some(handle) = self.textures.get(key) {
            return Ok(*handle);
        }

        let handle = renderer.load_texture_from_bytes(bytes)?;
        self.textures.insert(key.to_string(), handle);
        Ok(handle)
    }

    /// Register a texture created elsewhere under `key`, replacing any previous entry.
    pub fn insert_texture(&mut self, key: &str, handle: TextureHandle) {
        self.textures.insert(key.to_string(), handle);
    }

    /// Get a cached texture handle by key, if it exists.
    pub fn get_texture(&self, key: &str) -> Option<TextureHandle> {
        self.textures.get(key).copied()
    }

    /// Check if a texture is already cached.
    pub fn has_texture(&self, key: &str) -> bool {
        self.textures.contains_key(key)
    }
}

/// Build a stand-in atlas where every region is a flat colour.
///
/// Pixels outside the regions are transparent. Later regions paint over earlier ones.
pub fn placeholder_atlas(width: u32, height: u32, regions: &[(Rect, [u8; 4])]) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    for (rect, color) in regions {
        let x0 = (rect.x.max(0.0) as u32).min(width);
        let y0 = (rect.y.max(0.0) as u32).min(height);
        let x1 = ((rect.x + rect.width).max(0.0) as u32).min(width);
        let y1 = ((rect.y + rect.height).max(0.0) as u32).min(height);
        for y in y0..y1 {
            for x in x0..x1 {
                image.put_pixel(x, y, Rgba(*color));
            }
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_paints_regions() {
        let image = placeholder_atlas(
            16,
            16,
            &[(Rect::new(2.0, 2.0, 4.0, 4.0), [255, 0, 0, 255])],
        );
        assert_eq!(image.get_pixel(3, 3).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(6, 6).0, [0, 0, 0, 0]);
    }

    #[test]
    fn placeholder_clips_to_bounds() {
        let image = placeholder_atlas(
            8,
            8,
            &[(Rect::new(6.0, 6.0, 10.0, 10.0), [0, 255, 0, 255])],
        );
        assert_eq!(image.get_pixel(7, 7).0, [0, 255, 0, 255]);
        assert_eq!(image.dimensions(), (8, 8));
    }

    #[test]
    fn inserted_textures_are_cached() {
        let mut assets = AssetManager::new();
        assert!(!assets.has_texture("atlas"));
        assets.insert_texture("atlas", TextureHandle::from_raw(3));
        assert_eq!(assets.get_texture("atlas"), Some(TextureHandle::from_raw(3)));
    }
}
