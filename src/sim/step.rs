/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Clock, screen shake, damage flash, player timers
///   2. Death fall (dying sub-state only; ends the tick early)
///   3. Player movement input and gravity
///   4. Shooting
///   5. Player/tile collision and block strikes
///   6. Landing dust, underwater bubbles
///   7. Entity behaviour pass, then flush of entities it spawned
///   8. Combat (player contacts, fireball hits)
///   9. Flag / fall / countdown checks
///  10. Particles, camera, dead sweep
///
/// Entities spawned by behaviour (eggs, boss shots) join after the pass and
/// are not seen by combat until the next tick. Items released by blocks and
/// the player's fireballs join immediately.

use glam::Vec2;

use crate::domain::ai::{self, Ctx, Out};
use crate::domain::entity::{Facing, Kind, Life, Spawn};
use crate::domain::particle;
use crate::domain::physics::{self, TilePolicy};
use crate::domain::rules::{self, BlockOutcome, ContactOutcome, Damage, FireballStrike};
use super::event::{Cue, GameEvent};
use super::world::{Mode, WorldState, FLASH_TICKS};

/// Minimum ticks between two shots.
const SHOT_COOLDOWN: u64 = 30;
const DEATH_FALL_TICKS: u32 = 60;
const DEATH_HOP: f32 = -10.0;
const BUBBLE_INTERVAL: u64 = 40;
const SHAKE_ON_HIT: f32 = 20.0;

const COIN_SCORE: u32 = 100;
const BUMP_KILL_SCORE: u32 = 100;
const KILL_SCORE: u32 = 200;
const POWER_UP_SCORE: u32 = 1000;
const BOSS_SCORE: u32 = 5000;

/// Held intents for one tick. Pause is edge-triggered and handled by the
/// caller through `WorldState::toggle_pause`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub run: bool,
    pub fire: bool,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if !matches!(world.mode, Mode::Playing | Mode::Dying) {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    advance_timers(world);

    if world.mode == Mode::Dying {
        resolve_death_fall(world, &mut events);
        return events;
    }

    resolve_player_movement(world, input, &mut events);
    resolve_shooting(world, input, &mut events);
    resolve_player_tiles(world, &mut events);
    resolve_player_effects(world);
    let settled = resolve_entities(world);
    resolve_combat(world, settled, &mut events);
    resolve_level_checks(world, &mut events);

    particle::step_particles(&mut world.particles, world.phys.gravity);
    world.camera.follow(world.player.body.pos.x);
    world.sweep_dead();

    events
}

/// Start the death sequence. Ignored while already dying.
pub fn kill_player(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.mode == Mode::Dying {
        return;
    }
    world.mode = Mode::Dying;
    world.player.dying_timer = DEATH_FALL_TICKS;
    world.player.body.vel.y = DEATH_HOP;
    events.push(Cue::Damage.into());
    events.push(GameEvent::PlayerKilled);
}

// ══════════════════════════════════════════════════════════════
// Timers and the death fall
// ══════════════════════════════════════════════════════════════

fn advance_timers(world: &mut WorldState) {
    world.clock += 1;
    world.shake = (world.shake - 1.0).max(0.0);
    world.flash = world.flash.saturating_sub(1);
    let p = &mut world.player;
    p.invulnerable = p.invulnerable.saturating_sub(1);
    p.star = p.star.saturating_sub(1);
}

/// Fall without collision, then respawn or end the run.
fn resolve_death_fall(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let p = &mut world.player;
    p.dying_timer = p.dying_timer.saturating_sub(1);
    p.body.pos.y += p.body.vel.y;
    p.body.vel.y += world.phys.gravity;
    if p.dying_timer > 0 {
        return;
    }

    if world.lives > 1 {
        world.lives -= 1;
        world.respawn_player();
        world.mode = Mode::Playing;
        log::debug!("respawned at {:?}, {} lives left", world.spawn_point, world.lives);
        events.push(GameEvent::Respawned);
    } else {
        world.lives = 0;
        world.mode = Mode::GameOver;
        log::info!("game over with score {}", world.score);
        events.push(GameEvent::GameOver);
    }
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(world: &mut WorldState, input: FrameInput, events: &mut Vec<GameEvent>) {
    let phys = &world.phys;
    let water = world.underwater;
    let body = &mut world.player.body;

    let (accel, friction) = if water {
        (phys.water_acceleration, phys.water_friction)
    } else if body.grounded {
        (phys.acceleration, phys.friction)
    } else {
        (phys.air_acceleration, phys.air_friction)
    };
    let (gravity, terminal) = if water {
        (phys.underwater_gravity, phys.terminal_velocity_water)
    } else {
        (phys.gravity, phys.terminal_velocity)
    };

    if input.left {
        body.vel.x -= accel;
        body.facing = Facing::Left;
    } else if input.right {
        body.vel.x += accel;
        body.facing = Facing::Right;
    } else {
        body.vel.x *= friction;
    }
    body.vel.x = body.vel.x.clamp(-phys.move_speed, phys.move_speed);
    if body.vel.x.abs() < 0.1 {
        body.vel.x = 0.0;
    }

    if input.up {
        if water {
            body.vel.y = (body.vel.y + phys.swim_force * 0.2).max(phys.swim_force);
        } else if body.grounded {
            body.vel.y = phys.jump_force;
            body.grounded = false;
            events.push(Cue::Jump.into());
        }
    }
    // Short hop when the jump is released early.
    if !water && !input.up && body.vel.y < -5.0 {
        body.vel.y *= 0.5;
    }

    physics::fall(body, gravity, terminal);

    if water && body.pos.y < phys.tile_size {
        body.pos.y = phys.tile_size;
        body.vel.y = body.vel.y.max(0.0);
    }
}

fn resolve_shooting(world: &mut WorldState, input: FrameInput, events: &mut Vec<GameEvent>) {
    if !(input.run || input.fire) {
        return;
    }
    if world.clock.saturating_sub(world.player.last_shot) <= SHOT_COOLDOWN || world.player.ammo == 0 {
        return;
    }

    let p = &mut world.player;
    p.last_shot = world.clock;
    p.ammo -= 1;

    let facing = p.body.facing;
    let x = match facing {
        Facing::Right => p.body.pos.x + p.body.size.x,
        Facing::Left => p.body.pos.x - 10.0,
    };
    let at = Vec2::new(x, p.body.pos.y + 10.0);
    let vy = if world.underwater { 0.0 } else { 2.0 };
    let vel = Vec2::new(facing.sign() * world.phys.fireball_speed, vy);

    particle::emit_sparks(&mut world.particles, at, facing, &mut world.rng);
    let spawn = Spawn::new(Kind::Fireball, at, vel, world.phys.tile_size).facing(facing);
    world.add_entity(spawn);
    events.push(Cue::Shoot.into());
}

/// Resolve the player against the grid and strike every block hit from below.
fn resolve_player_tiles(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let t = world.phys.tile_size;
    let contacts = physics::resolve_map_collision(&mut world.player.body, &TilePolicy::PLAYER, &world.grid, t);

    for (x, y) in contacts.head_hits {
        let block_center = Vec2::new(x as f32 * t + t / 2.0, y as f32 * t + t / 2.0);
        match rules::strike_block(&mut world.grid, x, y, world.player.tier) {
            BlockOutcome::Coin => {
                particle::emit_coin(&mut world.particles, block_center);
                world.coins += 1;
                world.score += COIN_SCORE;
                events.push(Cue::Coin.into());
            }
            BlockOutcome::Released(content) => {
                if let Some(item) = rules::released_item(content, x, y, &world.phys) {
                    world.add_entity(item);
                }
                events.push(Cue::PowerUpAppears.into());
            }
            BlockOutcome::Broken => {
                particle::emit_debris(&mut world.particles, block_center, &mut world.rng);
                events.push(Cue::BlockBreak.into());
            }
            BlockOutcome::Bumped => events.push(Cue::BlockBump.into()),
        }

        for e in world.entities.iter_mut() {
            if rules::bumped_off(e, x, y, t) {
                e.kill();
                particle::emit_flip(&mut world.particles, &e.body);
                world.score += BUMP_KILL_SCORE;
                events.push(Cue::Stomp.into());
            }
        }
    }
}

fn resolve_player_effects(world: &mut WorldState) {
    let body = &mut world.player.body;
    if !body.was_grounded && body.grounded {
        particle::emit_dust(&mut world.particles, body, &mut world.rng);
    }
    body.was_grounded = body.grounded;

    if world.underwater && world.clock % BUBBLE_INTERVAL == 0 {
        particle::emit_bubble(&mut world.particles, &world.player.body, &mut world.rng);
    }
}

// ══════════════════════════════════════════════════════════════
// Entities
// ══════════════════════════════════════════════════════════════

/// Run behaviour for every entity, then join the ones it spawned.
/// Returns the entity count before the join.
fn resolve_entities(world: &mut WorldState) -> usize {
    let ctx = Ctx {
        grid: &world.grid,
        phys: &world.phys,
        player_pos: world.player.body.pos,
        player_vel: world.player.body.vel,
        player_facing: world.player.body.facing,
        player_alive: world.mode == Mode::Playing,
        clock: world.clock,
        camera_x: world.camera.x,
        view_width: world.camera.view_width,
        world_height: world.grid.height() as f32 * world.phys.tile_size,
    };
    let mut spawns: Vec<Spawn> = Vec::new();

    for e in world.entities.iter_mut() {
        match e.life {
            Life::Dead => continue,
            Life::Dying(ticks) => {
                e.life = if ticks <= 1 { Life::Dead } else { Life::Dying(ticks - 1) };
                continue;
            }
            Life::Alive => {}
        }
        e.invulnerable = e.invulnerable.saturating_sub(1);
        let mut out = Out { spawns: &mut spawns, particles: &mut world.particles };
        ai::update_entity(e, &ctx, &mut world.rng, &mut out);
    }

    let settled = world.entities.len();
    for spawn in spawns {
        world.add_entity(spawn);
    }
    settled
}

// ══════════════════════════════════════════════════════════════
// Combat
// ══════════════════════════════════════════════════════════════

fn resolve_combat(world: &mut WorldState, settled: usize, events: &mut Vec<GameEvent>) {
    for i in 0..settled {
        if world.mode == Mode::Playing {
            resolve_player_contact(world, i, events);
        }
        if world.entities[i].kind == Kind::Fireball && world.entities[i].is_alive() {
            resolve_fireball(world, i, settled, events);
        }
    }
}

fn resolve_player_contact(world: &mut WorldState, i: usize, events: &mut Vec<GameEvent>) {
    match rules::player_contact(&world.player, &world.entities[i]) {
        ContactOutcome::None => {}
        ContactOutcome::PowerUp(power) => {
            world.entities[i].kill();
            rules::apply_power_up(&mut world.player, power);
            world.score += POWER_UP_SCORE;
            events.push(Cue::PowerUp.into());
        }
        ContactOutcome::Checkpoint => {
            let e = &mut world.entities[i];
            e.kind = Kind::Checkpoint { activated: true };
            world.spawn_point = e.body.pos;
            log::debug!("checkpoint at {:?}", world.spawn_point);
            events.push(Cue::PowerUpAppears.into());
        }
        ContactOutcome::StarKill => {
            world.entities[i].kill();
            world.score += KILL_SCORE;
            events.push(Cue::Stomp.into());
        }
        ContactOutcome::Stomp => {
            let victim = &mut world.entities[i];
            rules::apply_stomp(&mut world.player, victim, &world.phys);
            particle::emit_squash(&mut world.particles, &victim.body, &mut world.rng);
            world.score += KILL_SCORE;
            events.push(Cue::Stomp.into());
        }
        ContactOutcome::Hurt => match rules::damage_player(&mut world.player) {
            Damage::Demoted(_) => {
                world.shake = SHAKE_ON_HIT;
                world.flash = FLASH_TICKS;
                events.push(Cue::Damage.into());
                events.push(GameEvent::ScreenShake(SHAKE_ON_HIT));
                events.push(GameEvent::DamageFlash);
            }
            Damage::Fatal => kill_player(world, events),
        },
    }
}

/// A fireball strikes the first eligible target it overlaps, then dies.
fn resolve_fireball(world: &mut WorldState, i: usize, settled: usize, events: &mut Vec<GameEvent>) {
    let target = (0..settled).find(|&j| rules::fireball_touches(&world.entities[i], &world.entities[j]));
    let Some(j) = target else { return };
    world.entities[i].kill();

    let victim = &mut world.entities[j];
    match rules::strike_with_fireball(victim) {
        FireballStrike::Wounded => events.push(Cue::Stomp.into()),
        FireballStrike::BossDefeated => {
            log::debug!("boss {} defeated", victim.kind.name());
            particle::emit_boss_burst(&mut world.particles, &victim.body, &mut world.rng);
            world.score += BOSS_SCORE;
            world.shake = SHAKE_ON_HIT;
            events.push(Cue::BlockBreak.into());
            events.push(GameEvent::ScreenShake(SHAKE_ON_HIT));
        }
        FireballStrike::Killed => {
            particle::emit_hit(&mut world.particles, &victim.body);
            world.score += KILL_SCORE;
            events.push(Cue::Stomp.into());
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Flag, fall and countdown
// ══════════════════════════════════════════════════════════════

fn resolve_level_checks(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.mode != Mode::Playing {
        return;
    }

    let t = world.phys.tile_size;
    let center = world.player.body.center();
    let (cx, cy) = ((center.x / t).floor() as i32, (center.y / t).floor() as i32);
    if world.grid.get(cx, cy).is_flag() {
        world.mode = Mode::LevelComplete;
        log::info!("level {} \"{}\" cleared", world.level_idx, world.level_name);
        events.push(Cue::LevelClear.into());
        events.push(GameEvent::LevelCleared);
        return;
    }

    if world.player.body.pos.y > world.world_height() {
        kill_player(world, events);
        return;
    }

    world.countdown += 1;
    if world.countdown >= world.session.ticks_per_second {
        world.countdown = 0;
        world.time_left = world.time_left.saturating_sub(1);
        if world.time_left == 0 {
            kill_player(world, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::{Boss, BossKind, GoombaMode, Tier};
    use crate::domain::particle::ParticleTag;
    use crate::domain::tile::Tile;

    const T: f32 = 40.0;

    fn world(rows: &[&str]) -> WorldState {
        let mut c = GameConfig::default();
        c.session.seed = Some(5);
        WorldState::from_rows(&c, "test", rows, false)
    }

    fn run(w: &mut WorldState, input: FrameInput, ticks: usize) -> Vec<GameEvent> {
        let mut all = Vec::new();
        for _ in 0..ticks {
            all.extend(step(w, input));
        }
        all
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn count(events: &[GameEvent], wanted: &GameEvent) -> usize {
        events.iter().filter(|e| *e == wanted).count()
    }

    fn spawn_at(w: &mut WorldState, kind: Kind, x: f32, y: f32) {
        w.add_entity(Spawn::new(kind, Vec2::new(x, y), Vec2::ZERO, T));
    }

    fn goomba() -> Kind {
        Kind::Goomba { mode: GoombaMode::Patrol }
    }

    const FLOOR_3: [&str; 3] = [
        "..........",
        "..S.......",
        "##########",
    ];

    #[test]
    fn player_lands_and_raises_dust_once() {
        let mut w = world(&FLOOR_3);
        run(&mut w, idle(), 10);
        assert!(w.player.body.grounded);
        assert_eq!(w.player.body.pos.y, 50.0);
        let dust = w.particles.iter().filter(|p| p.tag == ParticleTag::Dust).count();
        assert!(dust <= 3);
    }

    #[test]
    fn coin_block_scenario() {
        let mut w = world(&[
            "..........",
            "..?.......",
            "..........",
            "..S.......",
            "##########",
        ]);
        run(&mut w, idle(), 10);
        let up = FrameInput { up: true, ..idle() };
        let events = run(&mut w, up, 8);

        assert_eq!(w.grid.get(2, 1), Tile::QuestionSpent);
        assert_eq!(w.coins, 1);
        assert_eq!(w.score, 100);
        assert_eq!(count(&events, &GameEvent::Cue(Cue::Coin)), 1);
        assert_eq!(w.particles.iter().filter(|p| p.tag == ParticleTag::Coin).count(), 1);
    }

    #[test]
    fn star_kills_anything_then_expires() {
        let mut w = world(&["..........", "..S.......", "..........", "##########"]);
        w.player.set_tier(Tier::Big);
        run(&mut w, idle(), 15);
        let ground_y = w.player.body.pos.y;
        assert!(w.player.body.grounded);

        w.player.star = 50;
        spawn_at(&mut w, goomba(), 80.0, 80.0);
        spawn_at(&mut w, Kind::Boss(Boss::new(BossKind::Demon)), 40.0, ground_y - 20.0);
        let events = step(&mut w, idle());
        assert!(w.entities.is_empty());
        assert_eq!(w.score, 400);
        assert_eq!(count(&events, &GameEvent::Cue(Cue::Stomp)), 2);
        assert_eq!(w.player.tier, Tier::Big);

        // The star runs out at the start of this tick; damage applies at once.
        w.player.star = 1;
        spawn_at(&mut w, goomba(), 80.0, 80.0);
        let events = step(&mut w, idle());
        assert_eq!(w.player.tier, Tier::Small);
        assert_eq!(w.player.invulnerable, rules::PLAYER_HURT_INVULNERABILITY);
        assert!(events.contains(&GameEvent::Cue(Cue::Damage)));
        assert!(events.contains(&GameEvent::DamageFlash));
        assert_eq!(w.flash, FLASH_TICKS);
        assert_eq!(w.entities.len(), 1);
    }

    #[test]
    fn level_completes_exactly_once() {
        let mut w = world(&[
            "..........",
            "....S.F...",
            "..........",
            "##########",
        ]);
        let right = FrameInput { right: true, ..idle() };
        let events = run(&mut w, right, 60);
        assert_eq!(w.mode, Mode::LevelComplete);
        assert_eq!(count(&events, &GameEvent::LevelCleared), 1);
        assert_eq!(count(&events, &GameEvent::Cue(Cue::LevelClear)), 1);

        let frozen = w.player.body.pos;
        assert!(step(&mut w, right).is_empty());
        assert_eq!(w.player.body.pos, frozen);
    }

    #[test]
    fn fall_death_triggers_once_then_respawns() {
        let mut w = world(&["S.........", "..........", ".........."]);
        let mut events = Vec::new();
        for _ in 0..300 {
            let tick = step(&mut w, idle());
            let done = tick.contains(&GameEvent::Respawned);
            events.extend(tick);
            if done {
                break;
            }
        }
        assert_eq!(count(&events, &GameEvent::PlayerKilled), 1);
        assert_eq!(count(&events, &GameEvent::Respawned), 1);
        assert_eq!(w.lives, 2);
        assert_eq!(w.mode, Mode::Playing);
        assert_eq!(w.player.body.pos, w.spawn_point);
        assert_eq!(w.player.tier, Tier::Small);
        assert_eq!(w.player.ammo, 50);
    }

    #[test]
    fn last_life_fall_ends_the_run() {
        let mut w = world(&["S.........", "..........", ".........."]);
        w.lives = 1;
        let events = run(&mut w, idle(), 200);
        assert_eq!(count(&events, &GameEvent::PlayerKilled), 1);
        assert_eq!(count(&events, &GameEvent::GameOver), 1);
        assert_eq!(w.lives, 0);
        assert_eq!(w.mode, Mode::GameOver);
        assert!(step(&mut w, idle()).is_empty());
    }

    #[test]
    fn falling_onto_goomba_stomps_it() {
        let mut w = world(&["..........", "..........", "..........", "##########"]);
        w.clear_entities();
        spawn_at(&mut w, goomba(), 200.0, 80.0);
        w.player.body.pos = Vec2::new(205.0, 55.0);
        w.player.body.vel = Vec2::new(0.0, 5.0);

        let events = step(&mut w, idle());
        assert_eq!(w.entities[0].life, Life::Dying(rules::SQUASH_TICKS));
        assert_eq!(w.score, 200);
        assert_eq!(w.player.body.vel.y, w.phys.jump_force / 2.0);
        assert_eq!(w.player.tier, Tier::Small);
        assert!(!events.contains(&GameEvent::PlayerKilled));
        assert!(w.particles.iter().any(|p| p.tag == ParticleTag::Squash));

        // Squashed hostiles are inert and leave after the countdown.
        run(&mut w, idle(), rules::SQUASH_TICKS as usize);
        assert!(w.entities.is_empty());
    }

    #[test]
    fn side_contact_hurts() {
        let mut w = world(&FLOOR_3);
        w.player.set_tier(Tier::Big);
        run(&mut w, idle(), 10);
        assert!(w.player.body.grounded);
        spawn_at(&mut w, goomba(), 90.0, 40.0);

        step(&mut w, idle());
        assert_eq!(w.player.tier, Tier::Small);
        assert!(w.entities[0].is_alive());
        assert_eq!(w.score, 0);
    }

    #[test]
    fn pickup_is_consumed_once() {
        let mut w = world(&FLOOR_3);
        run(&mut w, idle(), 10);
        let (x, y) = (w.player.body.pos.x, 40.0);
        spawn_at(&mut w, Kind::FireFlower, x, y);

        let events = run(&mut w, idle(), 3);
        assert_eq!(count(&events, &GameEvent::Cue(Cue::PowerUp)), 1);
        assert_eq!(w.score, 1000);
        assert_eq!(w.player.tier, Tier::Fire);
        assert_eq!(w.player.ammo, 70);
        assert!(w.entities.is_empty());
    }

    #[test]
    fn countdown_expiry_kills() {
        let mut w = world(&FLOOR_3);
        w.session.ticks_per_second = 2;
        w.time_left = 2;
        let events = run(&mut w, idle(), 3);
        assert_eq!(w.time_left, 1);
        assert!(!events.contains(&GameEvent::PlayerKilled));
        let events = run(&mut w, idle(), 1);
        assert_eq!(w.time_left, 0);
        assert_eq!(count(&events, &GameEvent::PlayerKilled), 1);
        assert_eq!(w.mode, Mode::Dying);
    }

    #[test]
    fn thrown_egg_waits_a_tick_before_combat() {
        let mut w = world(&FLOOR_3);
        run(&mut w, idle(), 10);
        assert_eq!(w.player.body.pos, Vec2::new(80.0, 50.0));

        let id = w.add_entity(Spawn::new(Kind::Lakitu, Vec2::new(80.0, 0.0), Vec2::ZERO, T));
        if let Some(lakitu) = w.entities.iter_mut().find(|e| e.id == id) {
            lakitu.timer = 180;
        }

        let first = step(&mut w, idle());
        assert!(w.entities.iter().any(|e| e.kind == Kind::SpinyEgg));
        assert!(!first.contains(&GameEvent::PlayerKilled));
        assert_eq!(w.mode, Mode::Playing);

        let second = step(&mut w, idle());
        assert!(second.contains(&GameEvent::PlayerKilled));
    }

    #[test]
    fn fireball_kills_goomba_ahead() {
        let mut w = world(&FLOOR_3);
        run(&mut w, idle(), 40);
        spawn_at(&mut w, goomba(), 240.0, 40.0);

        let fire = FrameInput { fire: true, ..idle() };
        let events = step(&mut w, fire);
        assert!(events.contains(&GameEvent::Cue(Cue::Shoot)));
        assert_eq!(w.player.ammo, 49);
        assert!(w.entities.iter().any(|e| e.kind == Kind::Fireball));

        let events = run(&mut w, idle(), 20);
        assert!(!w.entities.iter().any(|e| matches!(e.kind, Kind::Goomba { .. })));
        assert_eq!(w.score, 200);
        assert!(events.contains(&GameEvent::Cue(Cue::Stomp)));
    }

    #[test]
    fn shooting_respects_cooldown() {
        let mut w = world(&FLOOR_3);
        run(&mut w, idle(), 40);
        let fire = FrameInput { fire: true, ..idle() };
        let events = run(&mut w, fire, 30);
        assert_eq!(count(&events, &GameEvent::Cue(Cue::Shoot)), 1);
        assert_eq!(w.player.ammo, 49);

        w.player.ammo = 0;
        let events = run(&mut w, fire, 40);
        assert_eq!(count(&events, &GameEvent::Cue(Cue::Shoot)), 0);
    }

    #[test]
    fn checkpoint_moves_respawn_point() {
        let mut w = world(&FLOOR_3);
        run(&mut w, idle(), 10);
        w.add_entity(
            Spawn::new(Kind::Checkpoint { activated: false }, Vec2::new(80.0, 40.0), Vec2::ZERO, T).grounded(),
        );
        let events = step(&mut w, idle());
        assert_eq!(w.spawn_point, Vec2::new(80.0, 40.0));
        assert!(events.contains(&GameEvent::Cue(Cue::PowerUpAppears)));
        assert!(w.entities.iter().any(|e| e.kind == Kind::Checkpoint { activated: true }));

        let events = step(&mut w, idle());
        assert!(!events.contains(&GameEvent::Cue(Cue::PowerUpAppears)));
    }

    #[test]
    fn underwater_ceiling_clamp() {
        let mut c = GameConfig::default();
        c.session.seed = Some(5);
        let mut w = WorldState::from_rows(&c, "sea", &["S.........", "..........", "..........", "##########"], true);
        let up = FrameInput { up: true, ..idle() };
        run(&mut w, up, 20);
        assert!(w.player.body.pos.y > T - 1.0);
        assert!(w.player.body.vel.y >= w.phys.swim_force);
    }

    #[test]
    fn paused_world_does_not_move() {
        let mut w = world(&FLOOR_3);
        w.toggle_pause();
        let before = w.player.body.pos;
        assert!(run(&mut w, FrameInput { right: true, ..idle() }, 5).is_empty());
        assert_eq!(w.player.body.pos, before);
        assert_eq!(w.clock, 0);
    }

    #[test]
    fn struck_block_flips_goomba_standing_on_it() {
        let mut w = world(&[
            "..........",
            "..?.......",
            "..........",
            "..S.......",
            "##########",
        ]);
        run(&mut w, idle(), 10);
        w.clear_entities();
        w.add_entity(Spawn::new(goomba(), Vec2::new(85.0, 0.0), Vec2::ZERO, T).grounded());
        w.player.body.pos.y = 82.0;
        w.player.body.vel.y = -4.0;

        let events = step(&mut w, idle());
        assert_eq!(w.grid.get(2, 1), Tile::QuestionSpent);
        assert!(w.entities.is_empty());
        assert_eq!(w.score, COIN_SCORE + BUMP_KILL_SCORE);
        assert_eq!(count(&events, &GameEvent::Cue(Cue::Stomp)), 1);
        assert_eq!(w.particles.iter().filter(|p| p.tag == ParticleTag::Flip).count(), 1);
    }

    #[test]
    fn fireball_finishes_boss_once() {
        let mut w = world(&FLOOR_3);
        run(&mut w, idle(), 40);
        w.clear_entities();
        let mut boss = Boss::new(BossKind::Goomba);
        boss.health = 0.5;
        spawn_at(&mut w, Kind::Boss(boss), 200.0, 0.0);

        let fire = FrameInput { fire: true, ..idle() };
        let mut events = step(&mut w, fire);
        events.extend(run(&mut w, idle(), 20));

        assert!(!w.entities.iter().any(|e| matches!(e.kind, Kind::Boss(_))));
        assert_eq!(w.score, BOSS_SCORE);
        assert_eq!(count(&events, &GameEvent::ScreenShake(SHAKE_ON_HIT)), 1);
        assert_eq!(count(&events, &GameEvent::Cue(Cue::BlockBreak)), 1);
        assert!(w.shake > 0.0);
        let bursts = w.particles.iter().filter(|p| p.tag == ParticleTag::Burst).count();
        assert_eq!(bursts, 20);
        assert_eq!(w.mode, Mode::Playing);
    }

    #[test]
    fn respawned_player_can_shoot_at_once() {
        let mut w = world(&FLOOR_3);
        w.clock = 500;
        w.respawn_player();
        let events = step(&mut w, FrameInput { fire: true, ..idle() });
        assert_eq!(count(&events, &GameEvent::Cue(Cue::Shoot)), 1);
        assert_eq!(w.player.ammo, 49);
    }
}
