/// Combat and interaction rules: decision tables over player, entity and
/// tile state.
///
/// These functions decide *what* a contact means and apply the local state
/// change to the bodies involved. Score, cues, particles and mode
/// transitions are the step function's job.
///
/// ## Player contact table
///
/// ┌──────────────────────────────┬──────────────────────────────┐
/// │ Condition (priority order)    │ Outcome                      │
/// ├──────────────────────────────┼──────────────────────────────┤
/// │ entity dying/dead, no overlap │ nothing                      │
/// │ mushroom / flower / star      │ PowerUp                      │
/// │ checkpoint, first touch       │ Checkpoint                   │
/// │ hostile, player starred       │ StarKill (bosses included)   │
/// │ hostile stompable, falling,   │ Stomp                        │
/// │   feet within the top band    │                              │
/// │ hostile, player vulnerable    │ Hurt                         │
/// │ otherwise                     │ nothing                      │
/// └──────────────────────────────┴──────────────────────────────┘
///
/// ## Block strike table (head hit from below)
///
/// ┌──────────────────────────────┬──────────────────────────────┐
/// │ Tile                          │ Outcome                      │
/// ├──────────────────────────────┼──────────────────────────────┤
/// │ `?`                           │ spent, Coin                  │
/// │ `Q` / `W` / `*`               │ spent, Released(content)     │
/// │ brick, player tier ≥ Big      │ emptied, Broken              │
/// │ anything else solid           │ Bumped                       │
/// └──────────────────────────────┴──────────────────────────────┘

use glam::Vec2;

use super::entity::{Contact, Entity, Kind, Life, Player, PowerUp, Spawn, Tier};
use super::tile::{BlockContent, Tile, TileGrid};
use crate::config::PhysicsConfig;

/// Feet must be within this many pixels of the hostile's top to stomp.
pub const STOMP_BAND: f32 = 30.0;
/// Ticks a stomped hostile stays squashed before removal.
pub const SQUASH_TICKS: u32 = 15;
pub const PLAYER_HURT_INVULNERABILITY: u32 = 120;
pub const STAR_TICKS: u32 = 600;
pub const FLOWER_AMMO: u32 = 20;
pub const BOSS_FIREBALL_DAMAGE: f32 = 0.5;
pub const BOSS_HIT_INVULNERABILITY: u32 = 20;
/// Height gained when a small player grows, so the new hitbox clears the floor.
const GROW_LIFT: f32 = 20.0;

// ── Player vs entity ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ContactOutcome {
    None,
    PowerUp(PowerUp),
    Checkpoint,
    StarKill,
    Stomp,
    Hurt,
}

/// Decide what touching `e` means for `player`. Pure.
pub fn player_contact(player: &Player, e: &Entity) -> ContactOutcome {
    if !e.is_alive() || !player.body.overlaps(&e.body) {
        return ContactOutcome::None;
    }
    match e.kind.contact() {
        Contact::PowerUp(p) => ContactOutcome::PowerUp(p),
        Contact::Checkpoint => match e.kind {
            Kind::Checkpoint { activated: false } => ContactOutcome::Checkpoint,
            _ => ContactOutcome::None,
        },
        Contact::Hostile { stompable } => {
            if player.is_starred() {
                return ContactOutcome::StarKill;
            }
            let falling = player.body.vel.y > 0.0;
            let on_top = player.body.bottom() - e.body.pos.y < STOMP_BAND;
            if stompable && falling && on_top {
                ContactOutcome::Stomp
            } else if player.invulnerable == 0 {
                ContactOutcome::Hurt
            } else {
                ContactOutcome::None
            }
        }
        Contact::Harmless => ContactOutcome::None,
    }
}

/// Grant a power-up. Re-collecting a fire flower at full tier still adds ammo.
pub fn apply_power_up(player: &mut Player, power: PowerUp) {
    match power {
        PowerUp::Mushroom => {
            if player.tier < Tier::Big {
                player.set_tier(Tier::Big);
                player.body.pos.y -= GROW_LIFT;
            }
        }
        PowerUp::FireFlower => {
            if player.tier == Tier::Small {
                player.body.pos.y -= GROW_LIFT;
            }
            player.set_tier(Tier::Fire);
            player.ammo += FLOWER_AMMO;
        }
        PowerUp::Star => player.star = STAR_TICKS,
    }
}

/// Put the stomped hostile into its squash countdown and bounce the player.
pub fn apply_stomp(player: &mut Player, victim: &mut Entity, phys: &PhysicsConfig) {
    victim.life = Life::Dying(SQUASH_TICKS);
    player.body.vel.y = phys.jump_force / 2.0;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Damage {
    /// Dropped one tier; ammo is kept.
    Demoted(Tier),
    Fatal,
}

/// Hit the player once. Tier-1 hits are fatal and leave the player untouched.
pub fn damage_player(player: &mut Player) -> Damage {
    match player.tier.damaged() {
        Some(tier) => {
            player.set_tier(tier);
            player.invulnerable = PLAYER_HURT_INVULNERABILITY;
            player.body.vel.y = -5.0;
            Damage::Demoted(tier)
        }
        None => Damage::Fatal,
    }
}

// ── Fireball vs entity ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FireballStrike {
    Wounded,
    BossDefeated,
    Killed,
}

/// Can `fireball` strike `target` this tick?
pub fn fireball_touches(fireball: &Entity, target: &Entity) -> bool {
    fireball.id != target.id
        && target.is_alive()
        && target.kind.is_fireball_target()
        && fireball.body.overlaps(&target.body)
}

/// Apply a fireball hit to `target`. The fireball itself is the caller's to kill.
///
/// Every hit wounds a boss; `invulnerable` only drives the hurt blink.
pub fn strike_with_fireball(target: &mut Entity) -> FireballStrike {
    match &mut target.kind {
        Kind::Boss(boss) => {
            boss.health -= BOSS_FIREBALL_DAMAGE;
            target.invulnerable = BOSS_HIT_INVULNERABILITY;
            if boss.health <= 0.0 {
                target.kill();
                FireballStrike::BossDefeated
            } else {
                FireballStrike::Wounded
            }
        }
        _ => {
            target.kill();
            FireballStrike::Killed
        }
    }
}

// ── Blocks ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockOutcome {
    Coin,
    Released(BlockContent),
    Broken,
    Bumped,
}

/// Resolve a head hit on cell `(x, y)`, mutating the grid.
pub fn strike_block(grid: &mut TileGrid, x: i32, y: i32, tier: Tier) -> BlockOutcome {
    let tile = grid.get(x, y);
    if let Some(content) = tile.question_content() {
        grid.set(x, y, Tile::QuestionSpent);
        return match content {
            BlockContent::Coin => BlockOutcome::Coin,
            other => BlockOutcome::Released(other),
        };
    }
    if tile == Tile::Brick && tier >= Tier::Big {
        grid.set(x, y, Tile::Empty);
        return BlockOutcome::Broken;
    }
    BlockOutcome::Bumped
}

/// The item a question block releases, placed one cell above it.
pub fn released_item(content: BlockContent, x: i32, y: i32, phys: &PhysicsConfig) -> Option<Spawn> {
    let t = phys.tile_size;
    let pos = Vec2::new(x as f32 * t, (y - 1) as f32 * t);
    let spawn = match content {
        BlockContent::Coin => return None,
        BlockContent::Mushroom => Spawn::new(Kind::Mushroom, pos, Vec2::new(phys.mushroom_speed, 0.0), t),
        BlockContent::FireFlower => Spawn::new(Kind::FireFlower, pos, Vec2::ZERO, t).grounded(),
        BlockContent::Star => Spawn::new(Kind::Star, pos, Vec2::new(phys.star_speed, -5.0), t),
    };
    Some(spawn)
}

/// Is `e` standing on block `(x, y)` so a strike from below knocks it out?
pub fn bumped_off(e: &Entity, x: i32, y: i32, tile: f32) -> bool {
    if !e.is_alive() || !e.body.grounded || !e.kind.is_bump_killable() {
        return false;
    }
    let block_center = x as f32 * tile + tile / 2.0;
    let block_top = y as f32 * tile;
    (e.body.center().x - block_center).abs() < tile && (e.body.bottom() - block_top).abs() < 5.0
}
