/// WorldState: the complete snapshot of a running game.
///
/// ## Ownership
///
/// The step function is the only writer during play. Entities are owned in
/// a flat `Vec` and referred to elsewhere by `EntityId`; the dead sweep at
/// the end of each tick is the only place entities leave the vec.
///
/// ## Session vs level
///
/// Score, coins and lives belong to the run and survive level transitions.
/// Tiles, entities, particles, the countdown, camera and player are rebuilt
/// by `load_level`.
///
/// ## Camera
///
/// Horizontal only. `x` is the world pixel at the left edge of the view and
/// is never negative. The presentation layer sets `view_width` from the
/// terminal size.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::{GameConfig, PhysicsConfig, SessionConfig};
use crate::domain::entity::{Entity, EntityId, Kind, Player, Spawn, Tier};
use crate::domain::particle::Particle;
use crate::domain::tile::TileGrid;
use crate::sim::event::{Cue, GameEvent};
use crate::sim::level::{self, LevelDef};

/// Ticks the damage flash stays visible.
pub const FLASH_TICKS: u32 = 12;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Start,
    Playing,
    /// Death fall in progress; the player is not simulated normally.
    Dying,
    Paused,
    LevelComplete,
    GameOver,
    Win,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub x: f32,
    pub view_width: f32,
}

impl Camera {
    pub fn new(view_width: f32) -> Self {
        Camera { x: 0.0, view_width }
    }

    /// Where the camera wants to be for a player at `player_x`.
    #[inline]
    pub fn target(&self, player_x: f32) -> f32 {
        (player_x - self.view_width / 3.0).max(0.0)
    }

    /// Ease 10% of the way toward the target.
    pub fn follow(&mut self, player_x: f32) {
        self.x += (self.target(player_x) - self.x) * 0.1;
        if self.x < 0.0 {
            self.x = 0.0;
        }
    }

    pub fn snap(&mut self, player_x: f32) {
        self.x = self.target(player_x);
    }
}

/// Read-only session snapshot for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub coins: u32,
    pub lives: u32,
    pub time_left: u32,
    pub camera_x: f32,
    pub mode: Mode,
    pub level: usize,
    pub level_count: usize,
    pub level_name: String,
    pub tier: Tier,
    pub ammo: u32,
    pub star: u32,
    /// `(health, max)` of the first live boss.
    pub boss: Option<(f32, f32)>,
}

pub struct WorldState {
    // ── Terrain ──
    pub grid: TileGrid,

    // ── Actors ──
    pub player: Player,
    pub entities: Vec<Entity>,
    pub particles: Vec<Particle>,
    next_id: u32,

    // ── Level ──
    pub levels: Vec<LevelDef>,
    pub level_idx: usize,
    pub level_name: String,
    pub underwater: bool,
    pub spawn_point: Vec2,

    // ── Session ──
    pub mode: Mode,
    pub score: u32,
    pub coins: u32,
    pub lives: u32,
    pub time_left: u32,
    /// Ticks since the last countdown decrement.
    pub countdown: u32,
    pub clock: u64,
    pub camera: Camera,
    pub shake: f32,
    pub flash: u32,

    // ── Tuning and randomness ──
    pub phys: PhysicsConfig,
    pub session: SessionConfig,
    pub rng: SmallRng,
}

// ── Construction ──

impl WorldState {
    /// A world in `Start` mode with the first level loaded behind the title.
    pub fn new(config: &GameConfig, levels: Vec<LevelDef>) -> Self {
        let rng = match config.session.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let levels = if levels.is_empty() { level::embedded_levels() } else { levels };
        let mut world = WorldState {
            grid: TileGrid::default(),
            player: Player::new(Vec2::ZERO, config.session.starting_ammo),
            entities: Vec::new(),
            particles: Vec::new(),
            next_id: 0,
            levels,
            level_idx: 0,
            level_name: String::new(),
            underwater: false,
            spawn_point: Vec2::ZERO,
            mode: Mode::Start,
            score: 0,
            coins: 0,
            lives: config.session.starting_lives,
            time_left: config.session.time_limit,
            countdown: 0,
            clock: 0,
            camera: Camera::new(config.session.view_width),
            shake: 0.0,
            flash: 0,
            phys: config.physics.clone(),
            session: config.session.clone(),
            rng,
        };
        level::load_level(&mut world, 0);
        world.mode = Mode::Start;
        world
    }

    /// World from a single in-memory map, already playing. Used by tests and tools.
    pub fn from_rows(config: &GameConfig, name: &str, rows: &[&str], underwater: bool) -> Self {
        let def = LevelDef {
            name: name.to_string(),
            underwater,
            rows: rows.iter().map(|r| r.to_string()).collect(),
        };
        let mut world = WorldState::new(config, vec![def]);
        world.mode = Mode::Playing;
        world
    }

    pub fn world_height(&self) -> f32 {
        self.grid.height() as f32 * self.phys.tile_size
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

// ── Entities ──

impl WorldState {
    /// Register a new entity and return its id.
    pub fn add_entity(&mut self, spawn: Spawn) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity::new(id, spawn));
        id
    }

    pub fn clear_entities(&mut self) {
        self.entities.clear();
        self.next_id = 0;
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Drop every entity marked dead.
    pub fn sweep_dead(&mut self) {
        self.entities.retain(|e| !e.is_dead());
    }
}

// ── Session operations ──

impl WorldState {
    /// Fresh run: score and coins cleared, lives restored, first level.
    pub fn new_game(&mut self) {
        self.new_game_at(0);
    }

    /// Fresh run starting at `level_idx`.
    pub fn new_game_at(&mut self, level_idx: usize) {
        self.score = 0;
        self.coins = 0;
        self.lives = self.session.starting_lives;
        log::info!("new game at level {}", level_idx);
        self.load_level(level_idx);
    }

    /// Load a level, keeping score, coins and lives.
    pub fn load_level(&mut self, level_idx: usize) {
        level::load_level(self, level_idx);
    }

    pub fn restart_level(&mut self) {
        self.load_level(self.level_idx);
    }

    /// Leave `LevelComplete`: next level, or `Win` after the last one.
    pub fn advance_level(&mut self) -> Vec<GameEvent> {
        if self.mode != Mode::LevelComplete {
            return Vec::new();
        }
        let next = self.level_idx + 1;
        if next < self.levels.len() {
            log::info!("advancing to level {}", next);
            self.load_level(next);
            Vec::new()
        } else {
            log::info!("final level cleared, score {}", self.score);
            self.mode = Mode::Win;
            vec![GameEvent::Cue(Cue::Win), GameEvent::Won]
        }
    }

    /// Swap `Playing` and `Paused`. Inert in every other mode.
    pub fn toggle_pause(&mut self) {
        self.mode = match self.mode {
            Mode::Playing => Mode::Paused,
            Mode::Paused => Mode::Playing,
            other => other,
        };
    }

    /// Player back at the respawn point with default tier and ammo.
    pub fn respawn_player(&mut self) {
        self.player = Player::new(self.spawn_point, self.session.starting_ammo);
        self.camera.snap(self.player.body.pos.x);
    }

    pub fn hud(&self) -> Hud {
        let boss = self.entities.iter().find_map(|e| match e.kind {
            Kind::Boss(b) if !e.is_dead() => Some((b.health.max(0.0), b.max_health)),
            _ => None,
        });
        Hud {
            score: self.score,
            coins: self.coins,
            lives: self.lives,
            time_left: self.time_left,
            camera_x: self.camera.x,
            mode: self.mode,
            level: self.level_idx,
            level_count: self.levels.len(),
            level_name: self.level_name.clone(),
            tier: self.player.tier,
            ammo: self.player.ammo,
            star: self.player.star,
            boss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> GameConfig {
        let mut c = GameConfig::default();
        c.session.seed = Some(1);
        c
    }

    const TWO_ROWS: [&str; 3] = [
        "S.......F",
        ".........",
        "#########",
    ];

    #[test]
    fn camera_eases_and_clamps() {
        let mut cam = Camera::new(300.0);
        cam.follow(50.0);
        assert_eq!(cam.x, 0.0);
        cam.follow(1100.0);
        assert!((cam.x - 100.0).abs() < 1e-4);
        cam.snap(1100.0);
        assert_eq!(cam.x, 1000.0);
    }

    #[test]
    fn pause_only_toggles_play() {
        let mut w = WorldState::from_rows(&cfg(), "t", &TWO_ROWS, false);
        w.toggle_pause();
        assert_eq!(w.mode, Mode::Paused);
        w.toggle_pause();
        assert_eq!(w.mode, Mode::Playing);
        w.mode = Mode::Dying;
        w.toggle_pause();
        assert_eq!(w.mode, Mode::Dying);
        w.mode = Mode::GameOver;
        w.toggle_pause();
        assert_eq!(w.mode, Mode::GameOver);
    }

    #[test]
    fn session_survives_level_load() {
        let mut w = WorldState::from_rows(&cfg(), "t", &TWO_ROWS, false);
        w.score = 1200;
        w.coins = 7;
        w.lives = 2;
        w.load_level(0);
        assert_eq!((w.score, w.coins, w.lives), (1200, 7, 2));
        w.new_game();
        assert_eq!((w.score, w.coins, w.lives), (0, 0, 3));
        assert_eq!(w.mode, Mode::Playing);
    }

    #[test]
    fn last_level_advances_to_win() {
        let mut w = WorldState::from_rows(&cfg(), "t", &TWO_ROWS, false);
        w.mode = Mode::LevelComplete;
        let events = w.advance_level();
        assert_eq!(w.mode, Mode::Win);
        assert!(events.contains(&GameEvent::Cue(Cue::Win)));
    }

    #[test]
    fn advance_is_inert_while_playing() {
        let mut w = WorldState::from_rows(&cfg(), "t", &TWO_ROWS, false);
        assert!(w.advance_level().is_empty());
        assert_eq!(w.mode, Mode::Playing);
    }

    #[test]
    fn ids_are_unique() {
        let mut w = WorldState::from_rows(&cfg(), "t", &TWO_ROWS, false);
        let a = w.add_entity(Spawn::new(Kind::Mushroom, Vec2::ZERO, Vec2::ZERO, 40.0));
        let b = w.add_entity(Spawn::new(Kind::Star, Vec2::ZERO, Vec2::ZERO, 40.0));
        assert_ne!(a, b);
        assert_eq!(w.entity(b).map(|e| e.kind), Some(Kind::Star));
    }

    #[test]
    fn hud_reports_boss() {
        let rows = ["S...K...F", ".........", "#########"];
        let w = WorldState::from_rows(&cfg(), "boss", &rows, false);
        assert_eq!(w.hud().boss, Some((3.0, 3.0)));
        assert_eq!(w.hud().level_name, "boss");
    }
}
