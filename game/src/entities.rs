use flappy_engine::{
    Animation, CollisionObjectId, CollisionShape, CollisionWorld, NodeId, Repeat, Scene,
    SceneError, TextureHandle, Vec2,
};

use crate::atlas;
use crate::settings::GameSettings;

/// What a scene node belongs to, stored in the node's user tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    None,
    Bird,
    Pipe,
}

impl EntityKind {
    pub fn as_tag(self) -> Option<u32> {
        match self {
            EntityKind::None => None,
            EntityKind::Bird => Some(1),
            EntityKind::Pipe => Some(2),
        }
    }

    pub fn from_tag(tag: Option<u32>) -> Self {
        match tag {
            Some(1) => EntityKind::Bird,
            Some(2) => EntityKind::Pipe,
            _ => EntityKind::None,
        }
    }
}

const FLY_CLIP: &str = "fly";
/// Keys sit 1 ms apart in clip time; this plays twelve of them a second.
const FLY_SPEED: f32 = 12.0 / 1000.0;

pub struct Bird {
    node: NodeId,
    collider: CollisionObjectId,
    velocity: f32,
    position: f32,
    alive: bool,
    animation: Animation,
    start_x: f32,
    gravity: f32,
    jump_velocity: f32,
    ground: f32,
}

impl Bird {
    /// Create the bird under `parent` and register it as a collision listener.
    pub fn spawn(
        scene: &mut Scene,
        collisions: &mut CollisionWorld,
        parent: NodeId,
        texture: TextureHandle,
        settings: &GameSettings,
    ) -> Result<Self, SceneError> {
        let node = scene.add_node("bird", Some(parent))?;
        {
            let bird = scene.node_mut(node)?;
            bird.set_drawable(atlas::bird(texture));
            bird.set_translation(Vec2::new(settings.bird_start_x, 0.0));
            bird.set_user_tag(EntityKind::Bird.as_tag());
        }

        let collider = collisions.add_object(node, CollisionShape::sphere(settings.bird_radius));
        collisions.add_listener(collider);

        let mut animation = Animation::keyframes(&[0, 1, 2], &[0.0, 1.0, 2.0]);
        animation
            .create_clip(FLY_CLIP, 0, 2)
            .set_repeat(Repeat::Indefinite)
            .set_speed(FLY_SPEED);
        animation.play(FLY_CLIP);

        Ok(Self {
            node,
            collider,
            velocity: 0.0,
            position: 0.0,
            alive: true,
            animation,
            start_x: settings.bird_start_x,
            gravity: settings.gravity,
            jump_velocity: settings.jump_velocity,
            ground: settings.ground_pos,
        })
    }

    pub fn restart(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        self.alive = true;
        self.animation.play(FLY_CLIP);
        scene
            .node_mut(self.node)?
            .set_translation(Vec2::new(self.start_x, 0.0));
        self.velocity = 0.0;
        self.position = 0.0;
        Ok(())
    }

    pub fn jump(&mut self) {
        if self.alive {
            self.velocity = self.jump_velocity;
        }
    }

    pub fn update(&mut self, scene: &mut Scene, dt: f32) -> Result<(), SceneError> {
        self.velocity += self.gravity * dt;
        self.position += self.velocity * dt;
        if self.position < self.ground {
            self.position = self.ground;
        }
        scene.node_mut(self.node)?.set_translation_y(self.position);
        self.animate(scene, dt)
    }

    /// Advance the flap animation without moving the bird.
    pub fn animate(&mut self, scene: &mut Scene, dt: f32) -> Result<(), SceneError> {
        self.animation.update(dt);
        if let Some(sprite) = scene.node_mut(self.node)?.drawable_mut() {
            sprite.set_current_frame(self.animation.current_frame());
        }
        Ok(())
    }

    /// One last hop for show, then the bird stops flapping.
    pub fn kill(&mut self) {
        self.jump();
        self.alive = false;
        self.animation.stop(FLY_CLIP);
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn collider(&self) -> CollisionObjectId {
        self.collider
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_flapping(&self) -> bool {
        self.animation.is_playing(FLY_CLIP)
    }
}

/// An upper and a lower pipe around a gap, scrolling right to left as one node.
pub struct Pipe {
    node: NodeId,
    upper: NodeId,
    lower: NodeId,
    colliders: [CollisionObjectId; 2],
    speed: f32,
    x_end: f32,
    scored: bool,
}

impl Pipe {
    /// Spawn a pipe at the right edge with its gap centred on `gap_y`.
    pub fn spawn(
        scene: &mut Scene,
        collisions: &mut CollisionWorld,
        parent: NodeId,
        texture: TextureHandle,
        settings: &GameSettings,
        gap_y: f32,
    ) -> Result<Self, SceneError> {
        let offset = atlas::PIPE_HEIGHT / 2.0 + settings.pipe_hole_height;

        let node = scene.add_node("pipe", Some(parent))?;
        scene
            .node_mut(node)?
            .set_translation(Vec2::new(settings.pipe_scroll_x_start, gap_y));

        let upper = Self::add_half(scene, node, "pipeUp", atlas::pipe_upper(texture), offset)?;
        let lower = Self::add_half(scene, node, "pipeDown", atlas::pipe_lower(texture), -offset)?;

        let shape = CollisionShape::box_shape(atlas::PIPE_WIDTH, atlas::PIPE_HEIGHT);
        let colliders = [
            collisions.add_object(upper, shape),
            collisions.add_object(lower, shape),
        ];

        Ok(Self {
            node,
            upper,
            lower,
            colliders,
            speed: settings.pipe_scroll_speed,
            x_end: settings.pipe_scroll_x_end,
            scored: false,
        })
    }

    fn add_half(
        scene: &mut Scene,
        parent: NodeId,
        name: &str,
        sprite: flappy_engine::Sprite,
        y: f32,
    ) -> Result<NodeId, SceneError> {
        let id = scene.add_node(name, Some(parent))?;
        let node = scene.node_mut(id)?;
        node.set_translation(Vec2::new(0.0, y));
        node.set_drawable(sprite);
        node.set_user_tag(EntityKind::Pipe.as_tag());
        Ok(id)
    }

    pub fn update(&self, scene: &mut Scene, dt: f32) -> Result<(), SceneError> {
        scene.node_mut(self.node)?.translate_x(-self.speed * dt);
        Ok(())
    }

    pub fn is_off_screen(&self, scene: &Scene) -> Result<bool, SceneError> {
        Ok(scene.node(self.node)?.translation().x < self.x_end)
    }

    /// True exactly once: the first time the pipe's trailing edge is behind `bird_x`.
    pub fn passed(&mut self, scene: &Scene, bird_x: f32) -> Result<bool, SceneError> {
        if self.scored {
            return Ok(false);
        }
        let trailing_edge = scene.node(self.node)?.translation().x + atlas::PIPE_WIDTH / 2.0;
        self.scored = trailing_edge < bird_x;
        Ok(self.scored)
    }

    /// Remove the pipe's nodes from the scene and its colliders from the world.
    pub fn despawn(self, scene: &mut Scene, collisions: &mut CollisionWorld) -> Result<(), SceneError> {
        for collider in self.colliders {
            collisions.remove_object(collider);
        }
        let removed = scene.remove_node(self.node)?;
        log::trace!("Despawned pipe {:?} ({} nodes)", self.node, removed.len());
        Ok(())
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn upper(&self) -> NodeId {
        self.upper
    }

    pub fn lower(&self) -> NodeId {
        self.lower
    }

    pub fn colliders(&self) -> [CollisionObjectId; 2] {
        self.colliders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATLAS: TextureHandle = TextureHandle::from_raw(1);

    fn world() -> (Scene, CollisionWorld, NodeId) {
        let mut scene = Scene::new();
        let layer = scene.add_node("layer", None).unwrap();
        (scene, CollisionWorld::new(), layer)
    }

    #[test]
    fn tags_round_trip_through_nodes() {
        assert_eq!(EntityKind::from_tag(EntityKind::Pipe.as_tag()), EntityKind::Pipe);
        assert_eq!(EntityKind::from_tag(None), EntityKind::None);
        assert_eq!(EntityKind::from_tag(Some(99)), EntityKind::None);
    }

    #[test]
    fn bird_integrates_and_clamps_to_ground() {
        let (mut scene, mut collisions, layer) = world();
        let settings = GameSettings::default();
        let mut bird = Bird::spawn(&mut scene, &mut collisions, layer, ATLAS, &settings).unwrap();

        bird.update(&mut scene, 0.1).unwrap();
        assert!((bird.velocity() + 70.0).abs() < 1e-4);
        assert!((bird.position() + 7.0).abs() < 1e-4);

        for _ in 0..50 {
            bird.update(&mut scene, 0.1).unwrap();
        }
        assert_eq!(bird.position(), settings.ground_pos);
        let node = scene.node(bird.node()).unwrap();
        assert_eq!(node.translation(), Vec2::new(settings.bird_start_x, settings.ground_pos));
    }

    #[test]
    fn dead_birds_cannot_jump() {
        let (mut scene, mut collisions, layer) = world();
        let settings = GameSettings::default();
        let mut bird = Bird::spawn(&mut scene, &mut collisions, layer, ATLAS, &settings).unwrap();

        bird.jump();
        assert_eq!(bird.velocity(), settings.jump_velocity);

        bird.kill();
        assert!(!bird.is_alive());
        assert!(!bird.is_flapping());
        bird.update(&mut scene, 0.5).unwrap();
        bird.jump();
        assert!(bird.velocity() < settings.jump_velocity);

        bird.restart(&mut scene).unwrap();
        assert!(bird.is_alive());
        assert!(bird.is_flapping());
        assert_eq!(bird.position(), 0.0);
        assert_eq!(scene.node(bird.node()).unwrap().translation().y, 0.0);
    }

    #[test]
    fn bird_flaps_through_frames() {
        let (mut scene, mut collisions, layer) = world();
        let settings = GameSettings::default();
        let mut bird = Bird::spawn(&mut scene, &mut collisions, layer, ATLAS, &settings).unwrap();
        assert!(collisions.object(bird.collider()).unwrap().is_listening());

        // 1/12 s moves the clip forward by one key.
        bird.update(&mut scene, 1.0 / 12.0).unwrap();
        let sprite = scene.node(bird.node()).unwrap().drawable().unwrap();
        assert_eq!(sprite.current_frame(), 1);
    }

    #[test]
    fn pipe_halves_frame_the_gap() {
        let (mut scene, mut collisions, layer) = world();
        let settings = GameSettings::default();
        let pipe = Pipe::spawn(&mut scene, &mut collisions, layer, ATLAS, &settings, 30.0).unwrap();

        let upper = scene.world_translation(pipe.upper()).unwrap();
        let lower = scene.world_translation(pipe.lower()).unwrap();
        assert_eq!(upper, Vec2::new(200.0, 30.0 + 202.0));
        assert_eq!(lower, Vec2::new(200.0, 30.0 - 202.0));
        assert_eq!(
            EntityKind::from_tag(scene.node(pipe.lower()).unwrap().user_tag()),
            EntityKind::Pipe
        );
        assert_eq!(collisions.len(), 2);
    }

    #[test]
    fn pipe_scrolls_off_screen_and_despawns() {
        let (mut scene, mut collisions, layer) = world();
        let settings = GameSettings::default();
        let pipe = Pipe::spawn(&mut scene, &mut collisions, layer, ATLAS, &settings, 0.0).unwrap();

        pipe.update(&mut scene, 4.0).unwrap();
        assert!(!pipe.is_off_screen(&scene).unwrap());
        pipe.update(&mut scene, 0.25).unwrap();
        assert!(pipe.is_off_screen(&scene).unwrap());

        let node = pipe.node();
        pipe.despawn(&mut scene, &mut collisions).unwrap();
        assert!(!scene.contains(node));
        assert!(collisions.is_empty());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn pipe_scores_once() {
        let (mut scene, mut collisions, layer) = world();
        let settings = GameSettings::default();
        let mut pipe = Pipe::spawn(&mut scene, &mut collisions, layer, ATLAS, &settings, 0.0).unwrap();

        assert!(!pipe.passed(&scene, -50.0).unwrap());
        pipe.update(&mut scene, 3.0).unwrap();
        assert!(pipe.passed(&scene, -50.0).unwrap());
        assert!(!pipe.passed(&scene, -50.0).unwrap());
    }
}
