/// Level loading: map decoding, the built-in roster and level files.
///
/// ## Sources
///   1. Built-in embedded levels (always present, played first)
///   2. `levels/` directory (individual `.txt` files, sorted by file name)
///
/// ## Single-level format (`.txt`):
///   Line 1: `# Level Name`
///   Optional: `@ underwater` (swim physics, bubbles, ceiling clamp)
///   Lines: map rows
///
/// ## Tile legend:
///   '#' = Ground          '=' = Hard block       'B' = Brick
///   '?' = Coin block      'Q' = Mushroom block   'W' = Flower block
///   '*' = Star block      'V' = Coral (passable) 'T' = Pipe body (2 wide)
///   'P' = Pipe top (2 wide)                      'F' = Flag top, pole runs down to ground
///   'G' = Goomba          'Y' = Spiny            'L' = Lakitu
///   'Z' = Blooper         'E' = Cheep-cheep      'O' = Boo
///   'K' = Goomba boss     'M' = Mecha boss       'X' = Demon boss
///   'C' = Checkpoint      'S' = Player spawn     anything else = empty

use std::path::Path;

use glam::Vec2;

use crate::config::{GameConfig, PhysicsConfig};
use crate::domain::entity::{Boss, BossKind, Facing, GoombaMode, Kind, Player, Spawn};
use crate::domain::tile::{Tile, TileGrid};
use crate::sim::world::{Mode, WorldState};

/// Player start used when a map has no `S`.
pub const FALLBACK_SPAWN: Vec2 = Vec2::new(100.0, 100.0);

/// Runtime level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug, PartialEq)]
pub struct LevelDef {
    pub name: String,
    pub underwater: bool,
    pub rows: Vec<String>,
}

/// A decoded map, ready to become world state.
#[derive(Debug)]
pub struct ParsedLevel {
    pub grid: TileGrid,
    pub spawns: Vec<Spawn>,
    pub player_start: Vec2,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load level `level_idx` (wrapping) into the world. Preserves score, coins and lives.
pub fn load_level(world: &mut WorldState, level_idx: usize) {
    if world.levels.is_empty() {
        world.levels = embedded_levels();
    }
    let idx = level_idx % world.levels.len();
    let def = world.levels[idx].clone();
    let parsed = parse_map(&def.rows, &world.phys);

    world.level_idx = idx;
    world.level_name = def.name.clone();
    world.underwater = def.underwater;
    world.grid = parsed.grid;
    world.clear_entities();
    for spawn in parsed.spawns {
        world.add_entity(spawn);
    }
    world.particles.clear();
    world.spawn_point = parsed.player_start;
    world.player = Player::new(parsed.player_start, world.session.starting_ammo);
    world.time_left = world.session.time_limit;
    world.countdown = 0;
    world.clock = 0;
    world.shake = 0.0;
    world.flash = 0;
    world.camera.x = 0.0;
    world.mode = Mode::Playing;

    log::info!(
        "loaded level {} \"{}\" ({}x{}, {} entities)",
        idx,
        def.name,
        world.grid.width(),
        world.grid.height(),
        world.entities.len()
    );
}

/// Built-in levels followed by any level files from the configured directory.
pub fn level_roster(config: &GameConfig) -> Vec<LevelDef> {
    let mut levels = embedded_levels();
    let dir = &config.levels_dir;
    if dir.is_dir() {
        let mut extra = load_from_directory(dir);
        extra.sort_by(|a, b| a.0.cmp(&b.0));
        log::info!("{} level file(s) from {}", extra.len(), dir.display());
        levels.extend(extra.into_iter().map(|(_, def)| def));
    }
    levels
}

/// Decode map rows into tiles, entity spawns and the player start.
///
/// Width comes from row 0. Multi-cell structures are written in one pass and
/// a cell that already holds a tile is never revisited.
pub fn parse_map<S: AsRef<str>>(rows: &[S], phys: &PhysicsConfig) -> ParsedLevel {
    let chars: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
    let height = chars.len();
    let width = chars.first().map_or(0, |r| r.len());
    let t = phys.tile_size;

    let mut grid = TileGrid::new(width, height);
    let mut spawns = Vec::new();
    let mut player_start = FALLBACK_SPAWN;

    for (y, row) in chars.iter().enumerate() {
        for (x, &ch) in row.iter().enumerate().take(width) {
            let (xi, yi) = (x as i32, y as i32);
            if grid.get(xi, yi) != Tile::Empty {
                continue;
            }
            let pos = Vec2::new(x as f32 * t, y as f32 * t);
            let raised = pos - Vec2::new(0.0, t);

            match ch {
                '#' => grid.set(xi, yi, Tile::Ground),
                '=' => grid.set(xi, yi, Tile::HardBlock),
                'B' => grid.set(xi, yi, Tile::Brick),
                '?' => grid.set(xi, yi, Tile::Question),
                'Q' => grid.set(xi, yi, Tile::QuestionMushroom),
                'W' => grid.set(xi, yi, Tile::QuestionFlower),
                '*' => grid.set(xi, yi, Tile::QuestionStar),
                'V' => grid.set(xi, yi, Tile::Coral),
                'T' => {
                    grid.set(xi, yi, Tile::PipeLeft);
                    grid.set(xi + 1, yi, Tile::PipeRight);
                }
                'P' => {
                    grid.set(xi, yi, Tile::PipeTopLeft);
                    grid.set(xi + 1, yi, Tile::PipeTopRight);
                }
                'F' => {
                    grid.set(xi, yi, Tile::FlagTop);
                    for fy in y + 1..height {
                        if chars[fy].get(x) == Some(&'#') {
                            break;
                        }
                        grid.set(xi, fy as i32, Tile::FlagPole);
                    }
                }
                'G' => spawns.push(Spawn::new(
                    Kind::Goomba { mode: GoombaMode::Patrol },
                    pos,
                    Vec2::new(-phys.goomba_speed, 0.0),
                    t,
                )),
                'Y' => spawns.push(Spawn::new(Kind::Spiny, pos, Vec2::new(-phys.spiny_speed, 0.0), t)),
                'L' => spawns.push(Spawn::new(Kind::Lakitu, pos, Vec2::ZERO, t)),
                'Z' => spawns.push(Spawn::new(Kind::Blooper, pos, Vec2::ZERO, t)),
                'E' => spawns.push(Spawn::new(
                    Kind::CheepCheep { origin_y: pos.y },
                    pos,
                    Vec2::new(-2.0, 0.0),
                    t,
                )),
                'O' => spawns.push(Spawn::new(Kind::Boo { shy: false }, pos, Vec2::ZERO, t)),
                'K' => spawns.push(Spawn::new(Kind::Boss(Boss::new(BossKind::Goomba)), raised, Vec2::ZERO, t)),
                'M' => spawns.push(Spawn::new(Kind::Boss(Boss::new(BossKind::Mecha)), raised, Vec2::ZERO, t)),
                'X' => spawns.push(Spawn::new(Kind::Boss(Boss::new(BossKind::Demon)), raised, Vec2::ZERO, t)),
                'C' => spawns.push(
                    Spawn::new(Kind::Checkpoint { activated: false }, pos, Vec2::ZERO, t)
                        .facing(Facing::Right)
                        .grounded(),
                ),
                'S' => player_start = pos,
                _ => {}
            }
        }
    }

    ParsedLevel { grid, spawns, player_start }
}

// ══════════════════════════════════════════════════════════════
// Single-level file parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content.
pub fn parse_level_file(content: &str) -> Option<LevelDef> {
    let mut name = String::new();
    let mut underwater = false;
    let mut rows = vec![];

    for line in content.lines() {
        if line.starts_with('#') && name.is_empty() && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else if let Some(directive) = line.strip_prefix("@ ") {
            match directive.trim() {
                "underwater" => underwater = true,
                other => log::warn!("unknown level directive `{}`", other),
            }
        } else {
            rows.push(line.to_string());
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    if rows.is_empty() {
        return None;
    }

    let max_width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    for row in &mut rows {
        let len = row.chars().count();
        if len < max_width {
            row.extend(std::iter::repeat(' ').take(max_width - len));
        }
    }

    if name.is_empty() {
        name = "Unnamed World".to_string();
    }

    Some(LevelDef { name, underwater, rows })
}

/// Distinguish `# World Name` from `####G###` (level data).
/// Map symbols are all uppercase, so a name line needs a lowercase letter.
fn is_name_line(line: &str) -> bool {
    line[1..].chars().any(|c| c.is_lowercase())
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<(String, LevelDef)> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            log::warn!("cannot read level directory {}: {}", dir.display(), e);
            return results;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            match std::fs::read_to_string(&path) {
                Ok(content) => match parse_level_file(&content) {
                    Some(def) => {
                        let filename = path.file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                            .to_string();
                        results.push((filename, def));
                    }
                    None => log::warn!("{} has no map rows, skipped", path.display()),
                },
                Err(e) => log::warn!("cannot read {}: {}", path.display(), e),
            }
        }
    }

    results
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("1-1 Green Hills", false, &[
            "                                                                        ",
            "                                                                        ",
            "                                                                        ",
            "                                                                   F    ",
            "                ?                           *                           ",
            "                                                                        ",
            "                                                                        ",
            "                                                              =         ",
            "          ?   B?BQB                       BBW?B              ==         ",
            "                                                            ===         ",
            "                           P                               ====         ",
            "                      P    T                              =====         ",
            "  S          G        T    T   G G   C     G         G Y ======         ",
            "#######################################  #######  ######################",
            "#######################################  #######  ######################",
        ]),
        make_embedded("2-1 Coral Deep", true, &[
            "========================================================================",
            "                                                                        ",
            "                                                                   F    ",
            "                                                                        ",
            "                        E     =====                                     ",
            "                                                  E                     ",
            "                      ?Q?               Z                               ",
            "            E                                                           ",
            "                                                              ==        ",
            "                  Z                 E                  M      ==        ",
            "              ====                          =W=               ==        ",
            "                            P                                 ==        ",
            "   S    VV         V        T    V         C  V               ==        ",
            "########################################################################",
            "########################################################################",
        ]),
        make_embedded("3-1 Lava Keep", false, &[
            "========================================================================",
            "========================================================================",
            "                                                                     F  ",
            "                                                                        ",
            "                                                                        ",
            "                                                                        ",
            "                        O                   O                           ",
            "                                                                        ",
            "        BB?BB                                 B*B                       ",
            "                  ===            BQB                                    ",
            "                                                                        ",
            "                                                  =               =     ",
            "  S         Y              Y  G    C              =       K       =     ",
            "==================   ================   =============================#==",
            "==================   ================   =============================#==",
        ]),
        make_embedded("4-1 Demon Skies", false, &[
            "                                                                        ",
            "                                                                        ",
            "                                                                        ",
            "      L                                 L                           F   ",
            "                                                                        ",
            "                          W                                             ",
            "                                                                        ",
            "                                                                        ",
            "                        =====                             X             ",
            "          ?B?                                ===                        ",
            "                 ===                  BB*BB                             ",
            "                                                                        ",
            "  S                 G G           C      Y                              ",
            "############    ###########    #############    ########################",
            "############    ###########    #############    ########################",
        ]),
    ]
}

fn make_embedded(name: &str, underwater: bool, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        underwater,
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}
