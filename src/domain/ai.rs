/// Creature behaviour: one update per live entity per tick.
///
/// Each kind owns a small state machine driven by its `timer`, the player's
/// position and the injected random source. Movement goes through the tile
/// resolver except for the fliers (Boo, Lakitu, demon boss) which ignore
/// terrain.
///
/// New entities created here (eggs, projectiles) are queued in `spawns` and
/// joined to the world after the whole pass.

use glam::Vec2;
use rand::Rng;

use super::entity::{BossKind, BossPhase, Entity, Facing, GoombaMode, Kind, Spawn};
use super::particle::{self, Particle};
use super::physics::{resolve_map_collision, TilePolicy};
use super::tile::TileGrid;
use crate::config::PhysicsConfig;

// ── Tuning ──

const GOOMBA_SIGHT: Vec2 = Vec2::new(250.0, 120.0);
const SPINY_SIGHT: Vec2 = Vec2::new(300.0, 150.0);
const CHASE_BOOST: f32 = 1.5;
const LAKITU_THROW_TICKS: u32 = 180;
const LAKITU_LEAD_TICKS: f32 = 30.0;
const BLOOPER_RANGE: f32 = 300.0;
const DEMON_DASH_RANGE: f32 = 300.0;
const DEMON_DASH_SPEED: f32 = 12.0;
const PROJECTILE_LIFETIME: u32 = 300;
const PROJECTILE_MAX_SPEED: f32 = 6.0;

/// Read-only view of the world a behaviour update may consult.
pub struct Ctx<'a> {
    pub grid: &'a TileGrid,
    pub phys: &'a PhysicsConfig,
    pub player_pos: Vec2,
    pub player_vel: Vec2,
    pub player_facing: Facing,
    pub player_alive: bool,
    pub clock: u64,
    pub camera_x: f32,
    pub view_width: f32,
    pub world_height: f32,
}

/// Mutable outputs of a behaviour update.
pub struct Out<'a> {
    pub spawns: &'a mut Vec<Spawn>,
    pub particles: &'a mut Vec<Particle>,
}

/// Run one tick of behaviour for a live entity.
pub fn update_entity<R: Rng>(e: &mut Entity, ctx: &Ctx, rng: &mut R, out: &mut Out) {
    match e.kind {
        Kind::Goomba { .. } => goomba(e, ctx, rng),
        Kind::Spiny => spiny(e, ctx, rng),
        Kind::Boo { .. } => boo(e, ctx),
        Kind::Lakitu => lakitu(e, ctx, out),
        Kind::CheepCheep { .. } => cheep_cheep(e, ctx),
        Kind::Blooper => blooper(e, ctx, rng),
        Kind::Boss(boss) => match boss.variant {
            BossKind::Goomba => boss_goomba(e, ctx),
            BossKind::Mecha => boss_mecha(e, ctx, out),
            BossKind::Demon => boss_demon(e, ctx, rng, out),
        },
        Kind::Projectile => projectile(e, ctx, out),
        Kind::Fireball => fireball(e, ctx),
        Kind::SpinyEgg | Kind::Mushroom | Kind::FireFlower | Kind::Star | Kind::Checkpoint { .. } => {
            e.body.vel.y += ctx.phys.gravity;
            collide(e, ctx);
        }
    }
}

/// Resolve against tiles with the entity's own policy; despawn on a fatal wall hit.
fn collide(e: &mut Entity, ctx: &Ctx) {
    let policy = TilePolicy::of(&e.kind);
    let contacts = resolve_map_collision(&mut e.body, &policy, ctx.grid, ctx.phys.tile_size);
    if contacts.despawns(&policy) {
        e.kill();
    }
}

#[inline]
fn within(delta: Vec2, sight: Vec2) -> bool {
    delta.x.abs() < sight.x && delta.y.abs() < sight.y
}

// ══════════════════════════════════════════════════════════════
// Walkers
// ══════════════════════════════════════════════════════════════

fn goomba<R: Rng>(e: &mut Entity, ctx: &Ctx, rng: &mut R) {
    let Kind::Goomba { mut mode } = e.kind else { return };
    e.timer += 1;
    let delta = ctx.player_pos - e.body.pos;
    let close = within(delta, GOOMBA_SIGHT);
    let mut speed = ctx.phys.goomba_speed;

    if close {
        mode = GoombaMode::Chase;
        e.body.facing = Facing::toward(delta.x);
        speed *= CHASE_BOOST;
        if e.body.grounded && rng.gen::<f32>() < 0.01 {
            e.body.vel.y = -5.0;
        }
    } else {
        let dwell = 150.0 + rng.gen::<f32>() * 100.0;
        if e.timer as f32 > dwell {
            let roll = rng.gen::<f32>();
            mode = if roll < 0.3 {
                GoombaMode::Pause
            } else {
                if roll < 0.6 {
                    e.body.facing = e.body.facing.flipped();
                }
                GoombaMode::Patrol
            };
            e.timer = 0;
        }
        if mode == GoombaMode::Pause {
            speed = 0.0;
        }
    }

    e.body.vel.x = e.body.facing.sign() * speed;

    // Ledge check: one cell ahead of the leading foot, just below the floor.
    if e.body.grounded && speed > 0.0 {
        let ahead = match e.body.facing {
            Facing::Right => e.body.pos.x + e.body.size.x + 5.0,
            Facing::Left => e.body.pos.x - 5.0,
        };
        let t = ctx.phys.tile_size;
        let tx = (ahead / t).floor() as i32;
        let ty = ((e.body.bottom() + 2.0) / t).floor() as i32;
        if ty >= 0 && (ty as usize) < ctx.grid.height() && !ctx.grid.is_solid(tx, ty) {
            if close {
                e.body.vel.y = -4.0;
                e.body.vel.x = e.body.facing.sign() * (speed + 2.0);
            } else {
                e.body.facing = e.body.facing.flipped();
                e.body.vel.x = e.body.facing.sign() * speed;
            }
        }
    }

    e.kind = Kind::Goomba { mode };
    e.body.vel.y += ctx.phys.gravity;
    collide(e, ctx);
}

fn spiny<R: Rng>(e: &mut Entity, ctx: &Ctx, rng: &mut R) {
    e.body.vel.y += ctx.phys.gravity;
    let delta = ctx.player_pos - e.body.pos;
    if within(delta, SPINY_SIGHT) {
        e.body.facing = Facing::toward(delta.x);
        e.body.vel.x = e.body.facing.sign() * ctx.phys.spiny_speed * CHASE_BOOST;
    } else {
        e.timer += 1;
        if e.timer > 100 {
            if rng.gen_bool(0.5) {
                e.body.facing = e.body.facing.flipped();
            }
            e.timer = 0;
        }
        e.body.vel.x = e.body.facing.sign() * ctx.phys.spiny_speed;
    }
    collide(e, ctx);
}

// ══════════════════════════════════════════════════════════════
// Fliers and swimmers
// ══════════════════════════════════════════════════════════════

/// Freezes while the player faces it, otherwise drifts straight at the player.
fn boo(e: &mut Entity, ctx: &Ctx) {
    let delta = ctx.player_pos - e.body.pos;
    let shy = delta.x != 0.0 && Facing::toward(delta.x) != ctx.player_facing;
    if shy {
        e.body.vel = Vec2::ZERO;
    } else {
        e.body.vel = delta.normalize_or_zero() * ctx.phys.boo_speed;
        e.body.facing = Facing::toward(delta.x);
    }
    e.kind = Kind::Boo { shy };
    e.body.pos += e.body.vel;
}

fn lakitu(e: &mut Entity, ctx: &Ctx, out: &mut Out) {
    let dx = ctx.player_pos.x - e.body.pos.x;
    e.body.vel.x = (dx * 0.03).clamp(-4.0, 4.0);
    e.body.pos.x += e.body.vel.x;
    e.body.facing = Facing::toward(dx);

    e.timer += 1;
    if e.timer > LAKITU_THROW_TICKS {
        e.timer = 0;
        let predicted = ctx.player_pos.x + ctx.player_vel.x * LAKITU_LEAD_TICKS;
        let vx = ((predicted - e.body.pos.x) * 0.05).clamp(-5.0, 5.0);
        out.spawns.push(Spawn::new(
            Kind::SpinyEgg,
            e.body.pos + Vec2::new(0.0, 20.0),
            Vec2::new(vx, -4.0),
            ctx.phys.tile_size,
        ));
    }
}

fn cheep_cheep(e: &mut Entity, ctx: &Ctx) {
    e.body.vel.y = (ctx.clock as f32 / 15.0).cos() * 1.5;
    if e.body.vel.x.abs() > 0.1 {
        e.body.facing = Facing::toward(e.body.vel.x);
    }
    collide(e, ctx);
    if e.body.pos.x < ctx.camera_x - 200.0 || e.body.pos.y > ctx.world_height + 200.0 {
        e.kill();
    }
}

fn blooper<R: Rng>(e: &mut Entity, ctx: &Ctx, rng: &mut R) {
    let delta = ctx.player_pos - e.body.pos;
    e.timer += 1;
    if e.timer > 60 {
        if delta.length() < BLOOPER_RANGE {
            e.body.vel = delta.normalize_or_zero() * 5.0;
            e.body.facing = Facing::toward(delta.x);
        } else if rng.gen::<f32>() < 0.05 {
            e.body.vel = Vec2::new(rng.gen_range(-1.0..1.0), -2.0);
        }
        e.timer = 0;
    }
    e.body.vel *= 0.95;
    e.body.vel.y += 0.05;
    collide(e, ctx);
}

// ══════════════════════════════════════════════════════════════
// Bosses
// ══════════════════════════════════════════════════════════════

/// Heavy hopper: waits on the ground, then leaps toward the player.
fn boss_goomba(e: &mut Entity, ctx: &Ctx) {
    e.body.vel.y += ctx.phys.gravity * 2.0;
    collide(e, ctx);
    e.timer += 1;
    if e.body.grounded && e.timer > 40 {
        let dir = Facing::toward(ctx.player_pos.x - e.body.pos.x);
        e.body.facing = dir;
        e.body.vel = Vec2::new(dir.sign() * 3.0, -15.0);
        e.timer = 0;
    }
}

fn boss_mecha(e: &mut Entity, ctx: &Ctx, out: &mut Out) {
    e.timer += 1;
    let dx = ctx.player_pos.x - e.body.pos.x;
    e.body.vel.y = (ctx.clock as f32 / 40.0).sin();
    e.body.facing = Facing::toward(dx);
    e.body.vel.x = if dx.abs() > 100.0 { e.body.facing.sign() * 0.5 } else { 0.0 };

    if e.timer % 200 == 0 {
        out.spawns.push(
            Spawn::new(
                Kind::Projectile,
                e.body.center(),
                Vec2::new(e.body.facing.sign() * 4.0, 0.0),
                ctx.phys.tile_size,
            )
            .facing(e.body.facing),
        );
    }
    collide(e, ctx);
}

/// Floats and fires aimed shots; charges the player when close.
fn boss_demon<R: Rng>(e: &mut Entity, ctx: &Ctx, rng: &mut R, out: &mut Out) {
    let Kind::Boss(mut boss) = e.kind else { return };
    e.timer += 1;
    let delta = ctx.player_pos - e.body.pos;
    let dist = delta.length();
    let aim = delta.normalize_or_zero();

    if boss.phase == BossPhase::Idle {
        e.body.vel.y = (ctx.clock as f32 / 20.0).sin() * 1.5;
        e.body.vel.x *= 0.95;
        e.body.facing = Facing::toward(delta.x);

        if e.timer % 150 == 0 {
            out.spawns.push(Spawn::new(
                Kind::Projectile,
                e.body.center() - Vec2::splat(8.0),
                aim * 5.0,
                ctx.phys.tile_size,
            ));
        }

        if dist < DEMON_DASH_RANGE && e.timer > 120 {
            boss.phase = BossPhase::Dash;
            e.timer = 0;
            e.body.vel = aim * DEMON_DASH_SPEED;
            particle::emit_telegraph(out.particles, e.body.pos, rng);
        }
    }

    if boss.phase == BossPhase::Dash && e.timer > 30 {
        boss.phase = BossPhase::Idle;
        e.body.vel *= 0.1;
        e.timer = 60;
    }

    e.kind = Kind::Boss(boss);
    e.body.pos += e.body.vel;
    let floor = ctx.world_height - e.body.size.y;
    if e.body.pos.y > floor {
        e.body.pos.y = floor;
    }
}

// ══════════════════════════════════════════════════════════════
// Projectiles
// ══════════════════════════════════════════════════════════════

/// Homing shot: steers toward the player, no gravity, limited lifetime.
fn projectile(e: &mut Entity, ctx: &Ctx, out: &mut Out) {
    e.timer += 1;
    if e.timer > PROJECTILE_LIFETIME {
        e.kill();
        return;
    }
    if ctx.player_alive {
        let steer = (ctx.player_pos - e.body.pos).normalize_or_zero() * 0.2;
        e.body.vel = (e.body.vel + steer).clamp_length_max(PROJECTILE_MAX_SPEED);
    }
    collide(e, ctx);
    if ctx.clock % 5 == 0 {
        particle::emit_trail(out.particles, &e.body);
    }
}

/// Player fireball: falls at double weight so it skips along the floor.
fn fireball(e: &mut Entity, ctx: &Ctx) {
    e.body.vel.y += ctx.phys.gravity * 2.0;
    collide(e, ctx);
    let x = e.body.pos.x;
    if x < ctx.camera_x || x > ctx.camera_x + ctx.view_width {
        e.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Boss, EntityId, Life};
    use crate::domain::tile::Tile;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const T: f32 = 40.0;

    fn tiles_from(rows: &[&str]) -> TileGrid {
        let mut g = TileGrid::new(rows[0].len(), rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    g.set(x as i32, y as i32, Tile::Ground);
                }
            }
        }
        g
    }

    fn ctx<'a>(grid: &'a TileGrid, phys: &'a PhysicsConfig, player: Vec2) -> Ctx<'a> {
        Ctx {
            grid,
            phys,
            player_pos: player,
            player_vel: Vec2::ZERO,
            player_facing: Facing::Right,
            player_alive: true,
            clock: 1,
            camera_x: 0.0,
            view_width: 1280.0,
            world_height: grid.height() as f32 * T,
        }
    }

    fn entity(kind: Kind, x: f32, y: f32) -> Entity {
        Entity::new(EntityId(1), Spawn::new(kind, Vec2::new(x, y), Vec2::ZERO, T))
    }

    fn run(e: &mut Entity, c: &Ctx, ticks: usize) -> (Vec<Spawn>, Vec<Particle>) {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut spawns = Vec::new();
        let mut particles = Vec::new();
        for _ in 0..ticks {
            if !e.is_alive() {
                break;
            }
            let mut out = Out { spawns: &mut spawns, particles: &mut particles };
            update_entity(e, c, &mut rng, &mut out);
        }
        (spawns, particles)
    }

    #[test]
    fn goomba_chases_nearby_player() {
        let g = tiles_from(&["..........", "..........", "##########"]);
        let phys = PhysicsConfig::default();
        let c = ctx(&g, &phys, Vec2::new(300.0, 40.0));
        let mut e = entity(Kind::Goomba { mode: GoombaMode::Patrol }, 160.0, 40.0);
        run(&mut e, &c, 3);
        assert_eq!(e.kind, Kind::Goomba { mode: GoombaMode::Chase });
        assert_eq!(e.body.facing, Facing::Right);
        assert!(e.body.vel.x > 0.0);
    }

    #[test]
    fn patrolling_goomba_turns_at_ledge() {
        // Floor ends at column 3; player far away.
        let g = tiles_from(&["..........", "..........", "####......"]);
        let phys = PhysicsConfig::default();
        let c = ctx(&g, &phys, Vec2::new(5000.0, 0.0));
        let mut e = entity(Kind::Goomba { mode: GoombaMode::Patrol }, 75.0, 40.0);
        e.body.facing = Facing::Right;
        run(&mut e, &c, 40);
        assert!(e.body.pos.x + e.body.size.x <= 160.0 + 5.0, "walked off: {:?}", e.body.pos);
        assert!(e.body.grounded);
    }

    #[test]
    fn boo_freezes_when_watched() {
        let g = TileGrid::new(20, 10);
        let phys = PhysicsConfig::default();
        // Player at x=100 facing right, Boo to the right: watched.
        let c = ctx(&g, &phys, Vec2::new(100.0, 100.0));
        let mut e = entity(Kind::Boo { shy: false }, 300.0, 100.0);
        run(&mut e, &c, 5);
        assert_eq!(e.body.pos, Vec2::new(300.0, 100.0));
        assert_eq!(e.kind, Kind::Boo { shy: true });

        let mut c = ctx(&g, &phys, Vec2::new(100.0, 100.0));
        c.player_facing = Facing::Left;
        run(&mut e, &c, 5);
        assert!(e.body.pos.x < 300.0);
        assert_eq!(e.kind, Kind::Boo { shy: false });
    }

    #[test]
    fn lakitu_throws_egg_on_schedule() {
        let g = TileGrid::new(20, 10);
        let phys = PhysicsConfig::default();
        let c = ctx(&g, &phys, Vec2::new(200.0, 300.0));
        let mut e = entity(Kind::Lakitu, 200.0, 40.0);
        let (spawns, _) = run(&mut e, &c, LAKITU_THROW_TICKS as usize);
        assert!(spawns.is_empty());
        let (spawns, _) = run(&mut e, &c, 1);
        assert_eq!(spawns.len(), 1);
        assert_eq!(spawns[0].kind, Kind::SpinyEgg);
        assert_eq!(spawns[0].body.vel.y, -4.0);
    }

    #[test]
    fn projectile_expires_and_trails() {
        let g = TileGrid::new(100, 100);
        let phys = PhysicsConfig::default();
        let mut c = ctx(&g, &phys, Vec2::new(2000.0, 2000.0));
        c.clock = 5;
        let mut e = entity(Kind::Projectile, 200.0, 200.0);
        let (_, particles) = run(&mut e, &c, 1);
        assert_eq!(particles.len(), 1);
        assert!(e.body.vel.length() <= PROJECTILE_MAX_SPEED + 1e-4);
        run(&mut e, &c, PROJECTILE_LIFETIME as usize + 1);
        assert_eq!(e.life, Life::Dead);
    }

    #[test]
    fn projectile_dies_on_wall() {
        let g = tiles_from(&["....#", "....#", "....#"]);
        let phys = PhysicsConfig::default();
        let c = ctx(&g, &phys, Vec2::new(400.0, 40.0));
        let mut e = entity(Kind::Projectile, 130.0, 50.0);
        e.body.vel = Vec2::new(6.0, 0.0);
        run(&mut e, &c, 10);
        assert!(e.is_dead());
    }

    #[test]
    fn fireball_leaves_view() {
        let g = TileGrid::new(100, 10);
        let phys = PhysicsConfig::default();
        let mut c = ctx(&g, &phys, Vec2::ZERO);
        c.view_width = 200.0;
        let mut e = entity(Kind::Fireball, 190.0, 10.0);
        e.body.vel.x = 9.0;
        run(&mut e, &c, 2);
        assert!(e.is_dead());
    }

    #[test]
    fn demon_dashes_when_close() {
        let g = TileGrid::new(40, 15);
        let phys = PhysicsConfig::default();
        let c = ctx(&g, &phys, Vec2::new(350.0, 300.0));
        let mut e = entity(Kind::Boss(Boss::new(BossKind::Demon)), 200.0, 300.0);
        let (_, particles) = run(&mut e, &c, 121);
        let Kind::Boss(b) = e.kind else { panic!("not a boss") };
        assert_eq!(b.phase, BossPhase::Dash);
        assert_eq!(particles.len(), 5);
        run(&mut e, &c, 31);
        let Kind::Boss(b) = e.kind else { panic!("not a boss") };
        assert_eq!(b.phase, BossPhase::Idle);
        assert_eq!(e.timer, 60);
    }

    #[test]
    fn boss_goomba_leaps_after_dwell() {
        let g = tiles_from(&["..........", "..........", "..........", "##########"]);
        let phys = PhysicsConfig::default();
        let c = ctx(&g, &phys, Vec2::new(0.0, 0.0));
        let mut e = entity(Kind::Boss(Boss::new(BossKind::Goomba)), 200.0, 40.0);
        run(&mut e, &c, 41);
        assert!(e.body.vel.y < 0.0 || !e.body.grounded);
        assert_eq!(e.body.facing, Facing::Left);
    }

    #[test]
    fn paused_goomba_holds_still_while_player_is_far() {
        let g = tiles_from(&["..........", "..........", "##########"]);
        let phys = PhysicsConfig::default();
        let c = ctx(&g, &phys, Vec2::new(2000.0, 40.0));
        let mut e = entity(Kind::Goomba { mode: GoombaMode::Pause }, 160.0, 40.0);
        run(&mut e, &c, 5);
        assert_eq!(e.kind, Kind::Goomba { mode: GoombaMode::Pause });
        assert_eq!(e.body.vel.x, 0.0);
        assert_eq!(e.body.pos.x, 160.0);
        assert!(e.body.grounded);
    }

    #[test]
    fn cheep_cheep_bobs_then_leaves_behind_camera() {
        let g = tiles_from(&[".........."; 6]);
        let phys = PhysicsConfig::default();
        let mut c = ctx(&g, &phys, Vec2::ZERO);
        c.camera_x = 1000.0;

        let mut ahead = entity(Kind::CheepCheep { origin_y: 80.0 }, 900.0, 80.0);
        run(&mut ahead, &c, 1);
        assert!(ahead.is_alive());
        assert!((ahead.body.vel.y - (1.0f32 / 15.0).cos() * 1.5).abs() < 1e-4);

        let mut behind = entity(Kind::CheepCheep { origin_y: 80.0 }, 500.0, 80.0);
        run(&mut behind, &c, 1);
        assert!(!behind.is_alive());
    }

    #[test]
    fn cheep_cheep_dies_below_the_world() {
        let g = tiles_from(&[".........."; 4]);
        let phys = PhysicsConfig::default();
        let c = ctx(&g, &phys, Vec2::ZERO);
        let mut e = entity(Kind::CheepCheep { origin_y: 0.0 }, 200.0, 4.0 * T + 250.0);
        run(&mut e, &c, 1);
        assert!(!e.is_alive());
    }

    #[test]
    fn blooper_lunges_at_player_in_range() {
        let g = tiles_from(&[".........."; 8]);
        let phys = PhysicsConfig::default();
        let c = ctx(&g, &phys, Vec2::new(300.0, 100.0));
        let mut e = entity(Kind::Blooper, 100.0, 100.0);
        run(&mut e, &c, 60);
        assert!(e.body.vel.x.abs() < 0.1);

        run(&mut e, &c, 1);
        assert_eq!(e.timer, 0);
        assert_eq!(e.body.facing, Facing::Right);
        assert!(e.body.vel.x > 4.0);
    }

    #[test]
    fn mecha_drifts_toward_player_and_fires_on_schedule() {
        let g = tiles_from(&[".........."; 6]);
        let phys = PhysicsConfig::default();
        let c = ctx(&g, &phys, Vec2::new(0.0, 40.0));
        let mut e = entity(Kind::Boss(Boss::new(BossKind::Mecha)), 300.0, 40.0);

        let (spawns, _) = run(&mut e, &c, 1);
        assert!(spawns.is_empty());
        assert_eq!(e.body.facing, Facing::Left);
        assert_eq!(e.body.vel.x, -0.5);

        e.timer = 199;
        let (spawns, _) = run(&mut e, &c, 1);
        assert_eq!(spawns.len(), 1);
        assert_eq!(spawns[0].kind, Kind::Projectile);
        assert_eq!(spawns[0].body.vel, Vec2::new(-4.0, 0.0));
    }
}
