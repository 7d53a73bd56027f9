/// Cosmetic particles: ballistic, short-lived, never collide.
///
/// Emitters take the world's random source so a seeded run reproduces the
/// same sparks. The tag is opaque to the simulation; the renderer maps it
/// to a glyph and colour.

use glam::Vec2;
use rand::Rng;

use super::entity::{Body, Facing};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParticleTag {
    Coin,
    Debris,
    Dust,
    Bubble,
    Spark,
    Squash,
    /// Creature knocked out by a block bump, drawn upside down.
    Flip,
    Trail,
    Telegraph,
    Burst,
    Hit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub tag: ParticleTag,
    /// Degrees.
    pub rotation: f32,
    pub rot_vel: f32,
}

impl Particle {
    pub fn new(tag: ParticleTag, pos: Vec2, vel: Vec2, size: Vec2, life: u32) -> Self {
        Particle { pos, vel, size, life, max_life: life, tag, rotation: 0.0, rot_vel: 0.0 }
    }

    fn spinning(mut self, rotation: f32, rot_vel: f32) -> Self {
        self.rotation = rotation;
        self.rot_vel = rot_vel;
        self
    }

    /// Remaining life as a fraction in `0.0 ..= 1.0`.
    pub fn fade(&self) -> f32 {
        if self.max_life == 0 { 0.0 } else { self.life as f32 / self.max_life as f32 }
    }
}

/// Advance every particle by one tick and drop the expired ones.
pub fn step_particles(particles: &mut Vec<Particle>, gravity: f32) {
    for p in particles.iter_mut() {
        p.life = p.life.saturating_sub(1);
        p.pos += p.vel;
        p.vel.y += gravity;
        p.rotation += p.rot_vel;
    }
    particles.retain(|p| p.life > 0);
}

/// Uniform sample in `-half .. half`.
#[inline]
fn jitter<R: Rng>(rng: &mut R, half: f32) -> f32 {
    rng.gen_range(-half..half)
}

// ── Emitters ──

pub fn emit_coin(out: &mut Vec<Particle>, block_center: Vec2) {
    out.push(Particle::new(
        ParticleTag::Coin,
        block_center - Vec2::new(10.0, 20.0),
        Vec2::new(0.0, -8.0),
        Vec2::splat(20.0),
        30,
    ));
}

pub fn emit_debris<R: Rng>(out: &mut Vec<Particle>, block_center: Vec2, rng: &mut R) {
    for _ in 0..4 {
        let vel = Vec2::new(jitter(rng, 5.0), rng.gen_range(-12.0..0.0));
        let p = Particle::new(ParticleTag::Debris, block_center, vel, Vec2::splat(10.0), 60)
            .spinning(rng.gen_range(0.0..360.0), jitter(rng, 10.0));
        out.push(p);
    }
}

/// Landing puff at the player's feet.
pub fn emit_dust<R: Rng>(out: &mut Vec<Particle>, body: &Body, rng: &mut R) {
    let pos = Vec2::new(body.pos.x + body.size.x / 2.0 - 2.0, body.bottom() - 2.0);
    for _ in 0..3 {
        let vel = Vec2::new(jitter(rng, 1.0), -0.5 - rng.gen_range(0.0..1.0));
        out.push(Particle::new(ParticleTag::Dust, pos, vel, Vec2::splat(4.0), 15));
    }
}

pub fn emit_bubble<R: Rng>(out: &mut Vec<Particle>, body: &Body, rng: &mut R) {
    let x = body.pos.x + if body.facing == Facing::Right { body.size.x } else { 0.0 };
    let vel = Vec2::new(jitter(rng, 0.5), -1.0 - rng.gen_range(0.0..1.0));
    out.push(Particle::new(ParticleTag::Bubble, Vec2::new(x, body.pos.y + 10.0), vel, Vec2::splat(4.0), 60));
}

/// Muzzle flash when the player shoots.
pub fn emit_sparks<R: Rng>(out: &mut Vec<Particle>, at: Vec2, facing: Facing, rng: &mut R) {
    for _ in 0..4 {
        let vel = Vec2::new(jitter(rng, 2.0) + facing.sign() * 2.0, jitter(rng, 2.0));
        out.push(Particle::new(ParticleTag::Spark, at, vel, Vec2::splat(4.0), 10));
    }
}

pub fn emit_squash<R: Rng>(out: &mut Vec<Particle>, victim: &Body, rng: &mut R) {
    let at = Vec2::new(victim.pos.x + victim.size.x / 2.0, victim.pos.y);
    for _ in 0..5 {
        let vel = Vec2::new(jitter(rng, 2.5), rng.gen_range(-3.0..0.0));
        out.push(Particle::new(ParticleTag::Squash, at, vel, Vec2::splat(4.0), 15));
    }
}

pub fn emit_flip(out: &mut Vec<Particle>, victim: &Body) {
    let p = Particle::new(ParticleTag::Flip, victim.pos, Vec2::new(0.0, -5.0), victim.size, 20)
        .spinning(180.0, 0.0);
    out.push(p);
}

pub fn emit_trail(out: &mut Vec<Particle>, source: &Body) {
    out.push(Particle::new(ParticleTag::Trail, source.pos + Vec2::splat(4.0), Vec2::ZERO, Vec2::splat(8.0), 10));
}

/// Warning flare as the demon boss begins a dash.
pub fn emit_telegraph<R: Rng>(out: &mut Vec<Particle>, at: Vec2, rng: &mut R) {
    for _ in 0..5 {
        let vel = Vec2::new(jitter(rng, 2.5), jitter(rng, 2.5));
        out.push(Particle::new(ParticleTag::Telegraph, at, vel, Vec2::splat(5.0), 20));
    }
}

pub fn emit_boss_burst<R: Rng>(out: &mut Vec<Particle>, boss: &Body, rng: &mut R) {
    let at = boss.center();
    for _ in 0..20 {
        let vel = Vec2::new(jitter(rng, 7.5), jitter(rng, 7.5));
        out.push(Particle::new(ParticleTag::Burst, at, vel, Vec2::splat(20.0), 60));
    }
}

pub fn emit_hit(out: &mut Vec<Particle>, target: &Body) {
    out.push(Particle::new(ParticleTag::Hit, target.pos, Vec2::new(0.0, -4.0), Vec2::splat(20.0), 15));
}
