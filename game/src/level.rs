use flappy_engine::{
    CollisionEventKind, CollisionShape, CollisionWorld, NodeId, Scene, SceneError, Sprite,
    TextureHandle, Vec2,
};

use crate::atlas;
use crate::entities::{Bird, EntityKind, Pipe};
use crate::settings::GameSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Running,
    Over,
}

/// Draw layers, back to front.
struct Layers {
    back: NodeId,
    pipes: NodeId,
    hero: NodeId,
    menu: NodeId,
}

/// The whole game world: scene, colliders, entities and the state machine driving them.
///
/// Nothing here touches the GPU, so a level can be stepped headlessly.
pub struct Level {
    settings: GameSettings,
    atlas: TextureHandle,
    scene: Scene,
    collisions: CollisionWorld,
    rng: fastrand::Rng,
    layers: Layers,
    bird: Bird,
    pipes: Vec<Pipe>,
    menu: NodeId,
    game_over: NodeId,
    play_button: NodeId,
    state: GameState,
    timer: f32,
    score: u32,
    best_score: u32,
    show_physics_debug: bool,
}

impl Level {
    pub fn new(settings: GameSettings, atlas: TextureHandle, seed: u64) -> Result<Self, SceneError> {
        let mut scene = Scene::new();
        let mut collisions = CollisionWorld::new();

        let layers = Layers {
            back: scene.add_node("layer_back", None)?,
            pipes: scene.add_node("layer_pipes", None)?,
            hero: scene.add_node("layer_hero", None)?,
            menu: scene.add_node("layer_menu", None)?,
        };

        add_sprite(&mut scene, layers.back, "background", atlas, atlas::BACKGROUND, Vec2::ZERO)?;
        add_sprite(&mut scene, layers.hero, "ground", atlas, atlas::GROUND, Vec2::new(0.0, -250.0))?;

        let bird = Bird::spawn(&mut scene, &mut collisions, layers.hero, atlas, &settings)?;

        let menu = scene.add_node("menu", Some(layers.menu))?;
        add_sprite(&mut scene, menu, "start", atlas, atlas::MENU_TITLE, Vec2::new(0.0, 100.0))?;
        add_sprite(&mut scene, menu, "tap", atlas, atlas::TAP_HINT, Vec2::ZERO)?;
        scene.node_mut(menu)?.set_enabled(false);

        let game_over = add_sprite(
            &mut scene,
            layers.menu,
            "gameover",
            atlas,
            atlas::GAME_OVER,
            Vec2::new(0.0, 100.0),
        )?;
        let play_button = add_sprite(
            &mut scene,
            game_over,
            "play",
            atlas,
            atlas::PLAY_BUTTON,
            Vec2::new(0.0, -100.0),
        )?;
        scene.node_mut(game_over)?.set_enabled(false);

        log::debug!("Level built with {} nodes and {} colliders", scene.len(), collisions.len());

        Ok(Self {
            settings,
            atlas,
            scene,
            collisions,
            rng: fastrand::Rng::with_seed(seed),
            layers,
            bird,
            pipes: Vec::new(),
            menu,
            game_over,
            play_button,
            state: GameState::Menu,
            timer: 0.0,
            score: 0,
            best_score: 0,
            show_physics_debug: false,
        })
    }

    /// Advance the level by `dt` seconds. `tap` is true on the frame a tap went down.
    pub fn update(&mut self, dt: f32, tap: bool) -> Result<(), SceneError> {
        match self.state {
            GameState::Menu => self.run_menu(dt, tap),
            GameState::Running => self.run_level(dt, tap),
            GameState::Over => self.run_game_over(dt, tap),
        }
    }

    fn run_menu(&mut self, dt: f32, tap: bool) -> Result<(), SceneError> {
        self.bird.animate(&mut self.scene, dt)?;
        self.scene.node_mut(self.menu)?.set_enabled(true);
        if tap {
            self.new_game()?;
        }
        Ok(())
    }

    fn run_level(&mut self, dt: f32, tap: bool) -> Result<(), SceneError> {
        self.bird.update(&mut self.scene, dt)?;

        self.timer += dt;
        if self.timer > self.settings.pipe_spawn_delay {
            self.add_pipe()?;
            self.timer = 0.0;
        }

        let bird_x = self.scene.node(self.bird.node())?.translation().x;
        let mut kept = Vec::with_capacity(self.pipes.len());
        for mut pipe in std::mem::take(&mut self.pipes) {
            pipe.update(&mut self.scene, dt)?;
            if pipe.is_off_screen(&self.scene)? {
                pipe.despawn(&mut self.scene, &mut self.collisions)?;
                continue;
            }
            if pipe.passed(&self.scene, bird_x)? {
                self.score += 1;
                log::debug!("Score: {}", self.score);
            }
            kept.push(pipe);
        }
        self.pipes = kept;

        if tap {
            self.bird.jump();
        }

        let hit_pipe = self.collisions.step(&self.scene).iter().any(|event| {
            event.kind == CollisionEventKind::Colliding
                && event.object_a == self.bird.collider()
                && self
                    .scene
                    .node(event.node_b)
                    .is_ok_and(|node| EntityKind::from_tag(node.user_tag()) == EntityKind::Pipe)
        });
        if hit_pipe {
            self.game_over();
            return Ok(());
        }

        if self.scene.node(self.bird.node())?.translation().y <= self.settings.ground_pos {
            self.game_over();
        }
        Ok(())
    }

    fn run_game_over(&mut self, dt: f32, tap: bool) -> Result<(), SceneError> {
        // The bird keeps falling until it lands.
        self.bird.update(&mut self.scene, dt)?;
        self.scene.node_mut(self.game_over)?.set_enabled(true);
        self.scene.node_mut(self.play_button)?.set_enabled(false);

        self.timer += dt;
        if self.timer < self.settings.restart_delay {
            return Ok(());
        }

        self.scene.node_mut(self.play_button)?.set_enabled(true);
        if tap {
            self.new_game()?;
        }
        Ok(())
    }

    pub fn new_game(&mut self) -> Result<(), SceneError> {
        self.remove_all_pipes()?;
        self.scene.node_mut(self.menu)?.set_enabled(false);
        self.scene.node_mut(self.game_over)?.set_enabled(false);
        self.timer = 0.0;
        self.score = 0;
        self.bird.restart(&mut self.scene)?;
        self.state = GameState::Running;

        // The first pipe does not wait for the spawn timer.
        self.add_pipe()
    }

    pub fn game_over(&mut self) {
        self.bird.kill();
        self.state = GameState::Over;
        self.timer = 0.0;
        self.best_score = self.best_score.max(self.score);
        log::info!("Game over: score {} (best {})", self.score, self.best_score);
    }

    fn add_pipe(&mut self) -> Result<(), SceneError> {
        let gap_y = (self.rng.f32() * 2.0 - 1.0) * self.settings.pipe_hole_random_y_offset;
        let pipe = Pipe::spawn(
            &mut self.scene,
            &mut self.collisions,
            self.layers.pipes,
            self.atlas,
            &self.settings,
            gap_y,
        )?;
        self.pipes.push(pipe);
        Ok(())
    }

    fn remove_all_pipes(&mut self) -> Result<(), SceneError> {
        for pipe in self.pipes.drain(..) {
            pipe.despawn(&mut self.scene, &mut self.collisions)?;
        }
        Ok(())
    }

    pub fn toggle_physics_debug(&mut self) {
        self.show_physics_debug = !self.show_physics_debug;
        log::debug!("Physics debug drawing: {}", self.show_physics_debug);
    }

    pub fn show_physics_debug(&self) -> bool {
        self.show_physics_debug
    }

    /// Shapes and world positions of every collider on an enabled node.
    pub fn collider_outlines(&self) -> Vec<(CollisionShape, Vec2)> {
        self.collisions
            .objects()
            .filter(|(_, object)| self.scene.is_effectively_enabled(object.node))
            .filter_map(|(_, object)| {
                self.scene
                    .world_translation(object.node)
                    .ok()
                    .map(|position| (object.shape, position))
            })
            .collect()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }
}

fn add_sprite(
    scene: &mut Scene,
    parent: NodeId,
    name: &str,
    texture: TextureHandle,
    source: flappy_engine::Rect,
    translation: Vec2,
) -> Result<NodeId, SceneError> {
    let id = scene.add_node(name, Some(parent))?;
    let node = scene.node_mut(id)?;
    node.set_drawable(Sprite::new(texture, source));
    node.set_translation(translation);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATLAS: TextureHandle = TextureHandle::from_raw(1);

    fn level(settings: GameSettings) -> Level {
        Level::new(settings, ATLAS, 7).unwrap()
    }

    /// No gravity and centred gaps: the bird hovers through every pipe.
    fn hovering() -> GameSettings {
        GameSettings {
            gravity: 0.0,
            pipe_hole_random_y_offset: 0.0,
            ..GameSettings::default()
        }
    }

    fn run(level: &mut Level, steps: usize, dt: f32) {
        for _ in 0..steps {
            level.update(dt, false).unwrap();
        }
    }

    fn enabled(level: &Level, name: &str) -> bool {
        let id = level.scene().find_by_name(name).unwrap();
        level.scene().is_effectively_enabled(id)
    }

    #[test]
    fn builds_layers_in_draw_order() {
        let level = level(GameSettings::default());
        let names: Vec<_> = level
            .scene()
            .roots()
            .iter()
            .map(|id| level.scene().node(*id).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["layer_back", "layer_pipes", "layer_hero", "layer_menu"]);
        assert_eq!(level.state(), GameState::Menu);
        assert!(!enabled(&level, "menu"));
        assert!(!enabled(&level, "gameover"));
    }

    #[test]
    fn menu_shows_then_tap_starts() {
        let mut level = level(GameSettings::default());
        level.update(0.016, false).unwrap();
        assert!(enabled(&level, "menu"));
        assert_eq!(level.state(), GameState::Menu);

        level.update(0.016, true).unwrap();
        assert_eq!(level.state(), GameState::Running);
        assert!(!enabled(&level, "menu"));
        assert_eq!(level.pipes().len(), 1);
        assert!(level.bird().is_alive());
    }

    #[test]
    fn bird_flaps_on_the_menu() {
        let mut level = level(GameSettings::default());
        let bird = level.bird().node();
        let start = level.scene().node(bird).unwrap().translation();

        let mut frames = std::collections::BTreeSet::new();
        for _ in 0..60 {
            level.update(1.0 / 60.0, false).unwrap();
            let node = level.scene().node(bird).unwrap();
            frames.insert(node.drawable().unwrap().current_frame());
        }
        assert!(frames.len() > 1);
        assert_eq!(level.state(), GameState::Menu);
        assert_eq!(level.scene().node(bird).unwrap().translation(), start);
    }

    #[test]
    fn pipes_spawn_on_timer_and_leave_off_screen() {
        let mut level = level(hovering());
        level.new_game().unwrap();

        // 0.25 s steps: the timer passes 1.6 s on every 7th step.
        run(&mut level, 7, 0.25);
        assert_eq!(level.pipes().len(), 2);

        // The first pipe crosses x = -200 on step 17.
        let first = level.pipes()[0].node();
        run(&mut level, 13, 0.25);
        assert_eq!(level.state(), GameState::Running);
        assert!(!level.scene().contains(first));
        assert_eq!(level.pipes().len(), 2);
        // Bird sphere plus two boxes per pipe.
        assert_eq!(level.collider_outlines().len(), 5);
    }

    #[test]
    fn passing_a_pipe_scores() {
        let mut level = level(hovering());
        level.new_game().unwrap();
        run(&mut level, 12, 0.25);
        assert_eq!(level.state(), GameState::Running);
        assert_eq!(level.score(), 1);
    }

    #[test]
    fn hitting_the_ground_ends_the_game() {
        let mut level = level(GameSettings::default());
        level.update(0.016, true).unwrap();
        run(&mut level, 20, 0.05);
        assert_eq!(level.state(), GameState::Over);
        assert!(!level.bird().is_alive());

        // The death hop goes up first, then the bird settles back on the ground.
        run(&mut level, 40, 0.05);
        assert_eq!(level.state(), GameState::Over);
        assert_eq!(level.bird().position(), level.settings().ground_pos);
    }

    #[test]
    fn hitting_a_pipe_ends_the_game() {
        let settings = GameSettings {
            pipe_hole_height: 0.0,
            ..hovering()
        };
        let mut level = level(settings);
        level.new_game().unwrap();
        // The pipe reaches the bird on step 9.
        run(&mut level, 8, 0.25);
        assert_eq!(level.state(), GameState::Running);
        run(&mut level, 1, 0.25);
        assert_eq!(level.state(), GameState::Over);
    }

    #[test]
    fn jumping_keeps_the_bird_up() {
        let mut level = level(GameSettings::default());
        level.new_game().unwrap();
        level.update(0.05, true).unwrap();
        assert!(level.bird().velocity() > 0.0);
        level.update(0.05, false).unwrap();
        assert!(level.bird().position() > 0.0);
    }

    #[test]
    fn restart_waits_for_delay() {
        let mut level = level(hovering());
        level.new_game().unwrap();
        level.game_over();
        assert_eq!(level.state(), GameState::Over);

        level.update(0.25, true).unwrap();
        assert_eq!(level.state(), GameState::Over);
        assert!(enabled(&level, "gameover"));
        assert!(!enabled(&level, "play"));

        run(&mut level, 7, 0.25);
        assert!(enabled(&level, "play"));

        level.update(0.25, true).unwrap();
        assert_eq!(level.state(), GameState::Running);
        assert!(!enabled(&level, "gameover"));
        assert_eq!(level.pipes().len(), 1);
        assert!(level.bird().is_alive());
    }

    #[test]
    fn game_over_restarts_the_delay() {
        let settings = GameSettings {
            restart_delay: 1.0,
            ..hovering()
        };
        let mut level = level(settings);
        level.new_game().unwrap();
        // The spawn timer is already past the restart delay.
        run(&mut level, 5, 0.25);
        assert_eq!(level.state(), GameState::Running);

        level.game_over();
        level.update(0.25, true).unwrap();
        assert_eq!(level.state(), GameState::Over);
        assert!(!enabled(&level, "play"));
    }

    #[test]
    fn best_score_survives_new_game() {
        let mut level = level(hovering());
        level.new_game().unwrap();
        run(&mut level, 12, 0.25);
        level.game_over();
        assert_eq!(level.best_score(), 1);

        level.new_game().unwrap();
        assert_eq!(level.score(), 0);
        assert_eq!(level.best_score(), 1);
        assert_eq!(level.pipes().len(), 1);
    }

    #[test]
    fn physics_debug_toggles() {
        let mut level = level(GameSettings::default());
        assert!(!level.show_physics_debug());
        level.toggle_physics_debug();
        assert!(level.show_physics_debug());
    }

    #[test]
    fn same_seed_same_pipes() {
        let mut a = level(GameSettings::default());
        let mut b = level(GameSettings::default());
        a.new_game().unwrap();
        b.new_game().unwrap();
        let gap = |level: &Level| {
            let node = level.pipes()[0].node();
            level.scene().node(node).unwrap().translation().y
        };
        assert_eq!(gap(&a), gap(&b));
        assert!(gap(&a).abs() <= 90.0);
    }
}
