//! Flappy engine: a small 2D host for sprite games.
//!
//! The engine owns the window, the main loop, the renderer and input. Games plug in via
//! [`Game`] and build their world out of a [`Scene`], sprites, and ghost collision objects.

pub mod assets;
pub mod collision;
pub mod engine;
pub mod input;
pub mod math;
pub mod render;
pub mod scene;

pub use crate::assets::{placeholder_atlas, AssetManager};
pub use crate::collision::{
    CollisionEvent, CollisionEventKind, CollisionObjectId, CollisionShape, CollisionWorld,
};
pub use crate::engine::{Engine, EngineConfig, EngineContext, Game};
pub use crate::input::InputState;
pub use crate::math::{Camera2D, Rect, Transform2D, Vec2};
pub use crate::render::{
    color_from_hex, Animation, AnimationClip, Frame, Renderer, Repeat, Sprite, SpriteAnchor,
    TextureHandle,
};
pub use crate::scene::{Node, NodeId, Scene, SceneError};
pub use winit::keyboard::KeyCode;
