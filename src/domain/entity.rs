/// Entities: the player, every creature, item, projectile and checkpoint.
///
/// All dynamic objects share one kinematic base (`Body`). What an object *is*
/// lives in the closed `Kind` enum together with its per-variant state, and
/// the per-kind policies (wall response, floor rebound, player contact) are
/// answered by `Kind` methods rather than scattered type checks.

use glam::Vec2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1.0 for left, +1.0 for right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing of a signed quantity; zero keeps `Right`.
    #[inline]
    pub fn toward(dx: f32) -> Facing {
        if dx < 0.0 { Facing::Left } else { Facing::Right }
    }

    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Kinematic state shared by every dynamic object.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    pub grounded: bool,
    pub was_grounded: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Body {
            pos,
            vel: Vec2::ZERO,
            size,
            facing: Facing::Left,
            grounded: false,
            was_grounded: false,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Open-interval rectangle overlap: touching edges do not count.
    #[inline]
    pub fn overlaps(&self, other: &Body) -> bool {
        self.pos.x < other.pos.x + other.size.x
            && self.pos.x + self.size.x > other.pos.x
            && self.pos.y < other.pos.y + other.size.y
            && self.pos.y + self.size.y > other.pos.y
    }
}

/// Stable entity identity. Assigned when an entity joins the world.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Lifecycle of a non-player entity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Life {
    Alive,
    /// Squash animation; removed when the countdown reaches zero.
    Dying(u32),
    Dead,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GoombaMode {
    Patrol,
    Chase,
    Pause,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BossKind {
    Goomba,
    Mecha,
    Demon,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BossPhase {
    Idle,
    Dash,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Boss {
    pub variant: BossKind,
    pub health: f32,
    pub max_health: f32,
    pub phase: BossPhase,
}

impl Boss {
    pub fn new(variant: BossKind) -> Self {
        let health = match variant {
            BossKind::Goomba => 3.0,
            BossKind::Mecha => 4.0,
            BossKind::Demon => 5.0,
        };
        Boss { variant, health, max_health: health, phase: BossPhase::Idle }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Kind {
    Goomba { mode: GoombaMode },
    Spiny,
    Lakitu,
    SpinyEgg,
    Boo { shy: bool },
    Blooper,
    CheepCheep { origin_y: f32 },
    Boss(Boss),
    Mushroom,
    FireFlower,
    Star,
    Fireball,
    Projectile,
    Checkpoint { activated: bool },
}

/// How a body reacts to a horizontal tile hit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WallResponse {
    /// Velocity zeroed.
    Stop,
    /// Velocity zeroed and the entity dies.
    Despawn,
    /// Velocity sign-flipped, facing untouched.
    Bounce,
    /// Velocity sign-flipped and facing follows it.
    TurnAround,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PowerUp {
    Mushroom,
    FireFlower,
    Star,
}

/// What happens when the player touches an entity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    PowerUp(PowerUp),
    Checkpoint,
    Hostile { stompable: bool },
    Harmless,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Goomba { .. } => "goomba",
            Kind::Spiny => "spiny",
            Kind::Lakitu => "lakitu",
            Kind::SpinyEgg => "spiny-egg",
            Kind::Boo { .. } => "boo",
            Kind::Blooper => "blooper",
            Kind::CheepCheep { .. } => "cheep-cheep",
            Kind::Boss(b) => match b.variant {
                BossKind::Goomba => "boss-goomba",
                BossKind::Mecha => "boss-mecha",
                BossKind::Demon => "boss-demon",
            },
            Kind::Mushroom => "mushroom",
            Kind::FireFlower => "fire-flower",
            Kind::Star => "star",
            Kind::Fireball => "fireball",
            Kind::Projectile => "projectile",
            Kind::Checkpoint { .. } => "checkpoint",
        }
    }

    /// Hitbox size for a freshly created entity of this kind.
    pub fn size(&self, tile: f32) -> Vec2 {
        match self {
            Kind::Blooper => Vec2::new(tile, tile * 1.5),
            Kind::Boss(b) if b.variant == BossKind::Demon => Vec2::splat(tile * 2.5),
            Kind::Boss(_) => Vec2::splat(tile * 2.0),
            Kind::Fireball => Vec2::splat(12.0),
            Kind::Projectile => Vec2::splat(16.0),
            _ => Vec2::splat(tile),
        }
    }

    pub fn wall_response(&self) -> WallResponse {
        match self {
            Kind::Fireball | Kind::Projectile => WallResponse::Despawn,
            Kind::Star => WallResponse::Bounce,
            Kind::Goomba { .. }
            | Kind::Spiny
            | Kind::Mushroom
            | Kind::Boss(_)
            | Kind::Blooper
            | Kind::CheepCheep { .. } => WallResponse::TurnAround,
            _ => WallResponse::Stop,
        }
    }

    /// Upward speed applied after landing, for kinds that bounce off floors.
    pub fn floor_rebound(&self) -> Option<f32> {
        match self {
            Kind::Fireball => Some(-6.0),
            Kind::Star => Some(-8.0),
            _ => None,
        }
    }

    pub fn contact(&self) -> Contact {
        match self {
            Kind::Mushroom => Contact::PowerUp(PowerUp::Mushroom),
            Kind::FireFlower => Contact::PowerUp(PowerUp::FireFlower),
            Kind::Star => Contact::PowerUp(PowerUp::Star),
            Kind::Checkpoint { .. } => Contact::Checkpoint,
            Kind::Goomba { .. } | Kind::Lakitu | Kind::Blooper | Kind::CheepCheep { .. } => {
                Contact::Hostile { stompable: true }
            }
            Kind::Spiny | Kind::Boo { .. } | Kind::SpinyEgg | Kind::Projectile | Kind::Boss(_) => {
                Contact::Hostile { stompable: false }
            }
            Kind::Fireball => Contact::Harmless,
        }
    }

    /// Can a player fireball destroy (or damage) this entity?
    pub fn is_fireball_target(&self) -> bool {
        !matches!(
            self,
            Kind::Fireball
                | Kind::Projectile
                | Kind::Mushroom
                | Kind::FireFlower
                | Kind::Star
                | Kind::Checkpoint { .. }
        )
    }

    /// Dies when the block it stands on is struck from below.
    pub fn is_bump_killable(&self) -> bool {
        matches!(self, Kind::Goomba { .. } | Kind::Spiny | Kind::Lakitu | Kind::Boo { .. })
    }
}

/// A not-yet-registered entity, queued during a tick and flushed afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Spawn {
    pub kind: Kind,
    pub body: Body,
}

impl Spawn {
    pub fn new(kind: Kind, pos: Vec2, vel: Vec2, tile: f32) -> Self {
        let mut body = Body::new(pos, kind.size(tile));
        body.vel = vel;
        body.facing = if vel.x > 0.0 { Facing::Right } else { Facing::Left };
        Spawn { kind, body }
    }

    pub fn facing(mut self, facing: Facing) -> Self {
        self.body.facing = facing;
        self
    }

    pub fn grounded(mut self) -> Self {
        self.body.grounded = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: Kind,
    pub body: Body,
    pub life: Life,
    /// Type-dependent counter: AI cooldown, projectile age, boss phase time.
    pub timer: u32,
    pub invulnerable: u32,
}

impl Entity {
    pub fn new(id: EntityId, spawn: Spawn) -> Self {
        Entity {
            id,
            kind: spawn.kind,
            body: spawn.body,
            life: Life::Alive,
            timer: 0,
            invulnerable: 0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life == Life::Alive
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.life == Life::Dead
    }

    pub fn kill(&mut self) {
        self.life = Life::Dead;
    }
}

/// Player power level. Each tier has a fixed hitbox.
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub enum Tier {
    Small = 1,
    Big = 2,
    Fire = 3,
}

impl Tier {
    pub fn hitbox(self) -> Vec2 {
        match self {
            Tier::Small => Vec2::new(30.0, 30.0),
            Tier::Big | Tier::Fire => Vec2::new(32.0, 48.0),
        }
    }

    /// One tier lower, or `None` when a hit would be fatal.
    pub fn damaged(self) -> Option<Tier> {
        match self {
            Tier::Fire => Some(Tier::Big),
            Tier::Big => Some(Tier::Small),
            Tier::Small => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub body: Body,
    pub tier: Tier,
    pub invulnerable: u32,
    pub star: u32,
    pub ammo: u32,
    /// Clock value of the last shot.
    pub last_shot: u64,
    /// Remaining ticks of the death fall; only meaningful while dying.
    pub dying_timer: u32,
}

impl Player {
    pub fn new(spawn: Vec2, ammo: u32) -> Self {
        let mut body = Body::new(spawn, Tier::Small.hitbox());
        body.facing = Facing::Right;
        Player {
            body,
            tier: Tier::Small,
            invulnerable: 0,
            star: 0,
            ammo,
            last_shot: 0,
            dying_timer: 0,
        }
    }

    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
        self.body.size = tier.hitbox();
    }

    #[inline]
    pub fn is_starred(&self) -> bool {
        self.star > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_open_interval() {
        let a = Body::new(Vec2::new(0.0, 0.0), Vec2::splat(10.0));
        let touching = Body::new(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        let inside = Body::new(Vec2::new(9.5, 9.5), Vec2::splat(10.0));
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn wall_policies() {
        assert_eq!(Kind::Fireball.wall_response(), WallResponse::Despawn);
        assert_eq!(Kind::Projectile.wall_response(), WallResponse::Despawn);
        assert_eq!(Kind::Star.wall_response(), WallResponse::Bounce);
        assert_eq!(Kind::Mushroom.wall_response(), WallResponse::TurnAround);
        assert_eq!(Kind::Boss(Boss::new(BossKind::Mecha)).wall_response(), WallResponse::TurnAround);
        assert_eq!(Kind::SpinyEgg.wall_response(), WallResponse::Stop);
        assert_eq!(Kind::Lakitu.wall_response(), WallResponse::Stop);
    }

    #[test]
    fn stompable_subset() {
        let stompable = |k: Kind| matches!(k.contact(), Contact::Hostile { stompable: true });
        assert!(stompable(Kind::Goomba { mode: GoombaMode::Patrol }));
        assert!(stompable(Kind::CheepCheep { origin_y: 0.0 }));
        assert!(!stompable(Kind::Spiny));
        assert!(!stompable(Kind::Boo { shy: false }));
        assert!(!stompable(Kind::SpinyEgg));
        assert!(!stompable(Kind::Projectile));
        assert!(!stompable(Kind::Boss(Boss::new(BossKind::Goomba))));
    }

    #[test]
    fn tier_ladder() {
        assert_eq!(Tier::Fire.damaged(), Some(Tier::Big));
        assert_eq!(Tier::Big.damaged(), Some(Tier::Small));
        assert_eq!(Tier::Small.damaged(), None);
        assert_eq!(Tier::Fire.hitbox(), Tier::Big.hitbox());
    }

    #[test]
    fn boss_health_by_variant() {
        assert_eq!(Boss::new(BossKind::Goomba).health, 3.0);
        assert_eq!(Boss::new(BossKind::Mecha).health, 4.0);
        assert_eq!(Boss::new(BossKind::Demon).max_health, 5.0);
    }
}
