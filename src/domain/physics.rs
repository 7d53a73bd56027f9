/// Tile collision: the single resolver shared by the player and every
/// dynamic entity.
///
/// ## Axis separation
///
/// One call resolves one tick of motion. The horizontal pass moves the body
/// by `vel.x` and pushes it out of every solid tile it entered before the
/// vertical pass begins, so a diagonal approach into an inside corner stops
/// flush against both faces.
///
/// ## Tile span
///
/// The cells a rectangle occupies are `floor(pos / T) ..= floor((pos + size - 0.1) / T)`
/// on each axis. The small inset keeps a body resting exactly on a tile
/// boundary from counting the neighbouring cell.
///
/// ## Push-back
///
/// The direction of motion is captured before scanning, and the body is
/// pushed to the nearest boundary among all solid cells in the span. The
/// velocity policy is applied once per axis, not once per tile.

use glam::Vec2;

use super::entity::{Body, Facing, Kind, WallResponse};
use super::tile::TileGrid;

const EDGE_INSET: f32 = 0.1;

/// How a body reacts to tile contact.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TilePolicy {
    pub wall: WallResponse,
    /// Upward speed applied after landing (fireball, star).
    pub rebound: Option<f32>,
    /// Report cells struck from below in `Contacts::head_hits`.
    pub head_hits: bool,
}

impl TilePolicy {
    pub const PLAYER: TilePolicy = TilePolicy { wall: WallResponse::Stop, rebound: None, head_hits: true };

    pub fn of(kind: &Kind) -> TilePolicy {
        TilePolicy { wall: kind.wall_response(), rebound: kind.floor_rebound(), head_hits: false }
    }
}

/// What the body touched during one resolution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contacts {
    pub wall: bool,
    pub floor: bool,
    pub ceiling: bool,
    /// Cells struck from below, in scan order.
    pub head_hits: Vec<(i32, i32)>,
}

impl Contacts {
    /// The body hit a wall and its policy says it should vanish.
    pub fn despawns(&self, policy: &TilePolicy) -> bool {
        self.wall && policy.wall == WallResponse::Despawn
    }
}

// ══════════════════════════════════════════════════════════════
// Integration helpers
// ══════════════════════════════════════════════════════════════

/// Add gravity to the vertical velocity, capped at `terminal`.
#[inline]
pub fn fall(body: &mut Body, gravity: f32, terminal: f32) {
    body.vel.y = (body.vel.y + gravity).min(terminal);
}

/// Axis-aligned rectangle overlap with open intervals.
#[inline]
pub fn rects_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    a_pos.x < b_pos.x + b_size.x
        && a_pos.x + a_size.x > b_pos.x
        && a_pos.y < b_pos.y + b_size.y
        && a_pos.y + a_size.y > b_pos.y
}

/// Inclusive cell range covered by `[start, start + len)` along one axis,
/// clamped to `0 ..= limit - 1`. Empty when the range lies outside.
#[inline]
fn cell_span(start: f32, len: f32, tile: f32, limit: usize) -> (i32, i32) {
    let first = (start / tile).floor() as i32;
    let last = ((start + len - EDGE_INSET) / tile).floor() as i32;
    (first.max(0), last.min(limit as i32 - 1))
}

// ══════════════════════════════════════════════════════════════
// Resolver
// ══════════════════════════════════════════════════════════════

/// Move `body` by its velocity for one tick and resolve it against `grid`.
///
/// Resets `grounded` at the start of the vertical pass; only a downward
/// collision sets it again.
pub fn resolve_map_collision(body: &mut Body, policy: &TilePolicy, grid: &TileGrid, tile: f32) -> Contacts {
    let mut contacts = Contacts::default();

    // ── Horizontal ──
    body.pos.x += body.vel.x;
    let dir = body.vel.x;
    if dir != 0.0 {
        let (x0, x1) = cell_span(body.pos.x, body.size.x, tile, grid.width());
        let (y0, y1) = cell_span(body.pos.y, body.size.y, tile, grid.height());
        let mut target = body.pos.x;
        for y in y0..=y1 {
            for x in x0..=x1 {
                if !grid.is_solid(x, y) {
                    continue;
                }
                contacts.wall = true;
                if dir > 0.0 {
                    target = target.min(x as f32 * tile - body.size.x);
                } else {
                    target = target.max((x + 1) as f32 * tile);
                }
            }
        }
        if contacts.wall {
            body.pos.x = target;
            match policy.wall {
                WallResponse::Stop | WallResponse::Despawn => body.vel.x = 0.0,
                WallResponse::Bounce => body.vel.x = -body.vel.x,
                WallResponse::TurnAround => {
                    body.vel.x = -body.vel.x;
                    body.facing = Facing::toward(body.vel.x);
                }
            }
        }
    }

    // ── Vertical ──
    body.pos.y += body.vel.y;
    body.grounded = false;
    let dir = body.vel.y;
    if dir != 0.0 {
        let (x0, x1) = cell_span(body.pos.x, body.size.x, tile, grid.width());
        let (y0, y1) = cell_span(body.pos.y, body.size.y, tile, grid.height());
        let mut target = body.pos.y;
        let mut hit = false;
        for y in y0..=y1 {
            for x in x0..=x1 {
                if !grid.is_solid(x, y) {
                    continue;
                }
                hit = true;
                if dir > 0.0 {
                    target = target.min(y as f32 * tile - body.size.y);
                } else {
                    target = target.max((y + 1) as f32 * tile);
                    if policy.head_hits {
                        contacts.head_hits.push((x, y));
                    }
                }
            }
        }
        if hit {
            body.pos.y = target;
            body.vel.y = 0.0;
            if dir > 0.0 {
                contacts.floor = true;
                body.grounded = true;
                if let Some(up) = policy.rebound {
                    body.vel.y = up;
                }
            } else {
                contacts.ceiling = true;
            }
        }
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;
    use proptest::prelude::*;

    const T: f32 = 40.0;

    /// Build a grid from ASCII rows: `#` solid ground, anything else empty.
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

    fn body(x: f32, y: f32, w: f32, h: f32, vx: f32, vy: f32) -> Body {
        let mut b = Body::new(Vec2::new(x, y), Vec2::new(w, h));
        b.vel = Vec2::new(vx, vy);
        b
    }

    fn overlaps_solid(b: &Body, g: &TileGrid, slack: f32) -> bool {
        let pos = b.pos + Vec2::splat(slack);
        let size = b.size - Vec2::splat(2.0 * slack);
        g.occupied().any(|(x, y, t)| {
            t.is_solid() && rects_overlap(pos, size, Vec2::new(x as f32 * T, y as f32 * T), Vec2::splat(T))
        })
    }

    #[test]
    fn lands_on_floor() {
        let g = tiles_from(&["....", "....", "####"]);
        let mut b = body(40.0, 45.0, 30.0, 30.0, 0.0, 8.0);
        let c = resolve_map_collision(&mut b, &TilePolicy::PLAYER, &g, T);
        assert!(c.floor);
        assert!(b.grounded);
        assert_eq!(b.pos.y, 80.0 - 30.0);
        assert_eq!(b.vel.y, 0.0);
    }

    #[test]
    fn inside_corner_diagonal() {
        // Wall on the right, floor below: moving down-right stops flush with both.
        let g = tiles_from(&["...#", "...#", "####"]);
        let mut b = body(85.0, 45.0, 30.0, 30.0, 6.0, 8.0);
        resolve_map_collision(&mut b, &TilePolicy::PLAYER, &g, T);
        assert_eq!(b.pos.x, 120.0 - 30.0);
        assert_eq!(b.pos.y, 80.0 - 30.0);
        assert_eq!(b.vel, Vec2::ZERO);
        assert!(!overlaps_solid(&b, &g, 0.0));
    }

    #[test]
    fn head_hit_reports_cells() {
        let g = tiles_from(&["####", "....", "...."]);
        let mut b = body(30.0, 42.0, 30.0, 30.0, 0.0, -5.0);
        let c = resolve_map_collision(&mut b, &TilePolicy::PLAYER, &g, T);
        assert!(c.ceiling);
        assert_eq!(b.pos.y, 40.0);
        assert_eq!(c.head_hits, vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn entities_do_not_report_head_hits() {
        let g = tiles_from(&["####", "....", "...."]);
        let mut b = body(50.0, 42.0, 30.0, 30.0, 0.0, -5.0);
        let c = resolve_map_collision(&mut b, &TilePolicy::of(&Kind::Spiny), &g, T);
        assert!(c.ceiling);
        assert!(c.head_hits.is_empty());
    }

    #[test]
    fn star_bounces_and_rebounds() {
        let g = tiles_from(&["...#", "...#", "####"]);
        let policy = TilePolicy::of(&Kind::Star);
        let mut b = body(87.0, 45.0, 30.0, 30.0, 6.0, 6.0);
        resolve_map_collision(&mut b, &policy, &g, T);
        assert_eq!(b.vel.x, -6.0);
        assert_eq!(b.vel.y, -8.0);
        assert!(b.grounded);
    }

    #[test]
    fn walker_turns_around() {
        let g = tiles_from(&["#...", "#...", "####"]);
        let policy = TilePolicy::of(&Kind::Mushroom);
        let mut b = body(41.0, 50.0, 30.0, 30.0, -3.0, 0.0);
        resolve_map_collision(&mut b, &policy, &g, T);
        assert_eq!(b.pos.x, 40.0);
        assert_eq!(b.vel.x, 3.0);
        assert_eq!(b.facing, Facing::Right);
    }

    #[test]
    fn fireball_despawns_on_wall() {
        let g = tiles_from(&["...#", "...#", "####"]);
        let policy = TilePolicy::of(&Kind::Fireball);
        let mut b = body(100.0, 40.0, 12.0, 12.0, 9.0, 0.0);
        let c = resolve_map_collision(&mut b, &policy, &g, T);
        assert!(c.despawns(&policy));
        assert_eq!(b.vel.x, 0.0);
    }

    #[test]
    fn fireball_rebounds_off_floor() {
        let g = tiles_from(&["....", "....", "####"]);
        let policy = TilePolicy::of(&Kind::Fireball);
        let mut b = body(40.0, 66.0, 12.0, 12.0, 9.0, 4.0);
        let c = resolve_map_collision(&mut b, &policy, &g, T);
        assert!(!c.despawns(&policy));
        assert_eq!(b.vel.y, -6.0);
        assert_eq!(b.pos.y, 80.0 - 12.0);
    }

    #[test]
    fn free_fall_is_ungrounded() {
        let g = tiles_from(&["....", "....", "####"]);
        let mut b = body(40.0, 0.0, 30.0, 30.0, 0.0, 1.0);
        b.grounded = true;
        resolve_map_collision(&mut b, &TilePolicy::PLAYER, &g, T);
        assert!(!b.grounded);
    }

    #[test]
    fn off_grid_is_open() {
        let g = tiles_from(&["....", "####"]);
        let mut b = body(-100.0, 200.0, 30.0, 30.0, -5.0, 10.0);
        let c = resolve_map_collision(&mut b, &TilePolicy::PLAYER, &g, T);
        assert_eq!(c, Contacts::default());
        assert_eq!(b.pos, Vec2::new(-105.0, 210.0));
    }

    // ── Properties ──

    fn grid_strategy() -> impl Strategy<Value = TileGrid> {
        proptest::collection::vec(proptest::bool::weighted(0.3), 8 * 8).prop_map(|cells| {
            let mut g = TileGrid::new(8, 8);
            for (i, solid) in cells.into_iter().enumerate() {
                if solid {
                    g.set((i % 8) as i32, (i / 8) as i32, Tile::Brick);
                }
            }
            g
        })
    }

    fn size_strategy() -> impl Strategy<Value = Vec2> {
        prop_oneof![
            Just(Vec2::new(30.0, 30.0)),
            Just(Vec2::new(32.0, 48.0)),
            Just(Vec2::new(40.0, 40.0)),
            Just(Vec2::new(12.0, 12.0)),
        ]
    }

    proptest! {
        #[test]
        fn never_ends_inside_solid(
            g in grid_strategy(),
            size in size_strategy(),
            x in 0i32..280,
            y in 0i32..260,
            vx in -12.0f32..12.0,
            vy in -12.0f32..12.0,
        ) {
            let mut b = body(x as f32, y as f32, size.x, size.y, vx, vy);
            prop_assume!(!overlaps_solid(&b, &g, 0.0));
            resolve_map_collision(&mut b, &TilePolicy::PLAYER, &g, T);
            prop_assert!(!overlaps_solid(&b, &g, 0.11), "ended at {:?}", b.pos);
        }

        #[test]
        fn resting_body_stays_grounded(
            col in 0i32..8,
            offset in 0.0f32..10.0,
            size in size_strategy(),
            ticks in 1usize..120,
        ) {
            let mut g = TileGrid::new(10, 6);
            for x in 0..10 {
                g.set(x, 5, Tile::Ground);
            }
            let floor = 5.0 * T;
            let mut b = body(col as f32 * T + offset, floor - size.y, size.x, size.y, 0.0, 0.0);
            for _ in 0..ticks {
                fall(&mut b, 0.6, 12.0);
                resolve_map_collision(&mut b, &TilePolicy::PLAYER, &g, T);
                prop_assert!(b.grounded);
                prop_assert_eq!(b.pos.y, floor - size.y);
            }
        }
    }
}
