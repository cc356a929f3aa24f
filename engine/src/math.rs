use glam::{Mat4, Vec3};

/// 2D vector type used throughout the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Returns the squared length of the vector (faster than `length()`).
    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Computes the squared distance between two points.
    pub fn distance_squared(self, rhs: Self) -> f32 {
        (self - rhs).length_squared()
    }

    /// Component-wise clamp of `self` into `[min, max]`.
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Self::new(self.x.clamp(min.x, max.x), self.y.clamp(min.y, max.y))
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from(value: (f32, f32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Div<f32> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle in pixels, origin at the top-left of an image.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalize against an image size, producing `[u, v, w, h]` in 0..1.
    pub fn normalized(&self, image_width: u32, image_height: u32) -> [f32; 4] {
        let iw = image_width.max(1) as f32;
        let ih = image_height.max(1) as f32;
        [self.x / iw, self.y / ih, self.width / iw, self.height / ih]
    }
}

/// Transform describing 2D position, scale, and rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    pub scale: Vec2,
    /// Rotation in radians around the Z axis.
    pub rotation: f32,
}

impl Transform2D {
    pub fn new(position: Vec2, scale: Vec2, rotation: f32) -> Self {
        Self {
            position,
            scale,
            rotation,
        }
    }

    pub fn identity() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }

    pub fn to_matrix(&self, base_size: Vec2) -> Mat4 {
        let translation = Mat4::from_translation(Vec3::new(self.position.x, self.position.y, 0.0));
        let rotation = Mat4::from_rotation_z(self.rotation);
        let scale = Mat4::from_scale(Vec3::new(
            self.scale.x * base_size.x,
            self.scale.y * base_size.y,
            1.0,
        ));

        translation * rotation * scale
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Orthographic camera with the origin at the centre of the view and +Y pointing up.
///
/// `viewport` is the size of the visible area in world units. It is stretched over the
/// whole surface, so the game keeps its design resolution when the window is resized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub viewport: Vec2,
    pub near: f32,
    pub far: f32,
}

impl Camera2D {
    pub fn orthographic(width: f32, height: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport: Vec2::new(width, height),
            near: -100.0,
            far: 100.0,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        let half = self.viewport * 0.5;
        let projection = Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, self.near, self.far);
        let translation =
            Mat4::from_translation(Vec3::new(-self.position.x, -self.position.y, 0.0));

        projection * translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_normalizes_against_atlas() {
        let rect = Rect::new(512.0, 256.0, 128.0, 64.0);
        assert_eq!(rect.normalized(1024, 1024), [0.5, 0.25, 0.125, 0.0625]);
    }

    #[test]
    fn camera_maps_viewport_corners_to_clip_space() {
        let camera = Camera2D::orthographic(288.0, 512.0);
        let vp = camera.view_projection();
        let top_right = vp.project_point3(Vec3::new(144.0, 256.0, 0.0));
        let bottom_left = vp.project_point3(Vec3::new(-144.0, -256.0, 0.0));
        assert!((top_right.x - 1.0).abs() < 1e-5 && (top_right.y - 1.0).abs() < 1e-5);
        assert!((bottom_left.x + 1.0).abs() < 1e-5 && (bottom_left.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn clamp_is_component_wise() {
        let v = Vec2::new(10.0, -10.0).clamp(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        assert_eq!(v, Vec2::new(1.0, -1.0));
    }
}
