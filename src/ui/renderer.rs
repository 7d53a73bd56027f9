/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// One tile is two terminal columns by one row. World pixels map to
/// half-tile columns, so scrolling moves one column every half tile.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use glam::Vec2;

use pipeland::domain::entity::{BossKind, Entity, Facing, GoombaMode, Kind, Life, Tier};
use pipeland::domain::particle::{Particle, ParticleTag};
use pipeland::domain::tile::Tile;
use pipeland::sim::world::{Mode, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the same RGB for `Clear(ClearType::All)` and every cell keeps
    /// the inter-row gap on VTE terminals the same colour as the cells.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// `Color::Reset` → BASE_BG, so no cell uses the terminal default.
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    /// Signed variant for world-projected positions that may be off screen.
    fn set_at(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 {
            self.set(x as usize, y as usize, cell);
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Background colour already composed at (x, y).
    fn bg_at(&self, x: i32, y: i32) -> Color {
        if x < 0 || y < 0 {
            return Cell::BASE_BG;
        }
        self.get(x as usize, y as usize).bg
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ── Projection: world pixels → terminal cells ──

/// Each tile = 2 terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const WATER_BG: Color = Color::Rgb { r: 12, g: 32, b: 72 };
const FLASH_BG: Color = Color::Rgb { r: 90, g: 20, b: 20 };
const OVERLAY_BG: Color = Color::Rgb { r: 40, g: 40, b: 40 };

#[derive(Clone, Copy, Debug)]
struct View {
    cam_x: f32,
    tile: f32,
    /// Horizontal jitter in columns while the screen shakes.
    jitter: i32,
}

impl View {
    fn col(&self, px: f32) -> i32 {
        ((px - self.cam_x) / self.tile * CELL_W as f32).floor() as i32 + self.jitter
    }

    fn row(&self, py: f32) -> i32 {
        (py / self.tile).floor() as i32 + MAP_ROW as i32
    }

    /// Cell rectangle covered by a body: (col, row, cols, rows).
    fn rect(&self, pos: Vec2, size: Vec2) -> (i32, i32, i32, i32) {
        let col = self.col(pos.x);
        let row = self.row(pos.y);
        let cols = ((size.x / self.tile * CELL_W as f32).round() as i32).max(1);
        let bottom = self.row(pos.y + size.y - 1.0);
        (col, row, cols, (bottom - row + 1).max(1))
    }
}

/// Shake alternates direction every tick, one or two columns wide.
fn jitter(shake: f32, clock: u64) -> i32 {
    if shake <= 0.0 {
        return 0;
    }
    let amp = if shake > 10.0 { 2 } else { 1 };
    if clock % 2 == 0 { amp } else { -amp }
}

fn bar(filled: f32, max: f32, width: usize) -> String {
    let n = if max > 0.0 { ((filled / max) * width as f32).ceil() as usize } else { 0 };
    let n = n.min(width);
    format!("{}{}", "█".repeat(n), "░".repeat(width - n))
}

fn tile_glyph(tile: Tile) -> Option<([char; 2], Color, Color)> {
    let g = match tile {
        Tile::Empty => return None,
        Tile::Ground => (['▓', '▓'], Color::Rgb { r: 200, g: 120, b: 60 }, Color::Rgb { r: 110, g: 60, b: 25 }),
        Tile::HardBlock => (['█', '█'], Color::Rgb { r: 150, g: 150, b: 150 }, Color::Rgb { r: 80, g: 80, b: 80 }),
        Tile::Brick => (['▙', '▟'], Color::Rgb { r: 230, g: 120, b: 70 }, Color::Rgb { r: 140, g: 50, b: 20 }),
        Tile::Question | Tile::QuestionMushroom | Tile::QuestionFlower | Tile::QuestionStar => {
            (['?', '?'], Color::Rgb { r: 255, g: 255, b: 255 }, Color::Rgb { r: 220, g: 160, b: 20 })
        }
        Tile::QuestionSpent => (['▪', '▪'], Color::Rgb { r: 90, g: 60, b: 30 }, Color::Rgb { r: 140, g: 100, b: 50 }),
        Tile::PipeLeft => (['▌', ' '], Color::Rgb { r: 20, g: 90, b: 20 }, Color::Rgb { r: 40, g: 170, b: 40 }),
        Tile::PipeRight => ([' ', '▐'], Color::Rgb { r: 20, g: 90, b: 20 }, Color::Rgb { r: 40, g: 170, b: 40 }),
        Tile::PipeTopLeft => (['▛', '▀'], Color::Rgb { r: 20, g: 90, b: 20 }, Color::Rgb { r: 70, g: 210, b: 70 }),
        Tile::PipeTopRight => (['▀', '▜'], Color::Rgb { r: 20, g: 90, b: 20 }, Color::Rgb { r: 70, g: 210, b: 70 }),
        Tile::FlagPole => (['│', ' '], Color::Rgb { r: 220, g: 220, b: 220 }, Color::Reset),
        Tile::FlagTop => (['●', '▶'], Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset),
        Tile::Coral => (['ψ', 'ψ'], Color::Rgb { r: 255, g: 110, b: 150 }, Color::Reset),
    };
    Some(g)
}

fn entity_glyph(e: &Entity, clock: u64) -> ([char; 2], Color) {
    if let Life::Dying(_) = e.life {
        return (['▁', '▁'], Color::Rgb { r: 140, g: 90, b: 50 });
    }
    match e.kind {
        Kind::Goomba { mode } => {
            let fg = match mode {
                GoombaMode::Chase => Color::Rgb { r: 230, g: 80, b: 50 },
                GoombaMode::Patrol | GoombaMode::Pause => Color::Rgb { r: 170, g: 110, b: 60 },
            };
            (['◖', '◗'], fg)
        }
        Kind::Spiny => (['▲', '▲'], Color::Rgb { r: 230, g: 40, b: 40 }),
        Kind::Lakitu => (['◎', '◎'], Color::Rgb { r: 150, g: 230, b: 150 }),
        Kind::SpinyEgg => (['•', '•'], Color::Rgb { r: 230, g: 60, b: 60 }),
        Kind::Boo { shy: true } => (['◌', '◌'], Color::Rgb { r: 150, g: 150, b: 170 }),
        Kind::Boo { shy: false } => (['◍', '◍'], Color::White),
        Kind::Blooper => (['Ψ', 'Ψ'], Color::Rgb { r: 240, g: 240, b: 255 }),
        Kind::CheepCheep { .. } => {
            let g = match e.body.facing {
                Facing::Left => ['◀', '◆'],
                Facing::Right => ['◆', '▶'],
            };
            (g, Color::Rgb { r: 255, g: 90, b: 70 })
        }
        Kind::Boss(b) => {
            let (g, fg) = match b.variant {
                BossKind::Goomba => (['▓', '▓'], Color::Rgb { r: 150, g: 80, b: 40 }),
                BossKind::Mecha => (['▣', '▣'], Color::Rgb { r: 170, g: 180, b: 200 }),
                BossKind::Demon => (['▩', '▩'], Color::Rgb { r: 180, g: 60, b: 220 }),
            };
            if e.invulnerable > 0 && (clock / 3) % 2 == 0 { (g, Color::White) } else { (g, fg) }
        }
        Kind::Mushroom => (['◓', '◓'], Color::Rgb { r: 255, g: 60, b: 60 }),
        Kind::FireFlower => (['✿', '✿'], Color::Rgb { r: 255, g: 150, b: 30 }),
        Kind::Star => (['★', '★'], Color::Rgb { r: 255, g: 230, b: 40 }),
        Kind::Fireball => (['●', ' '], Color::Rgb { r: 255, g: 140, b: 20 }),
        Kind::Projectile => (['◆', ' '], Color::Rgb { r: 255, g: 50, b: 120 }),
        Kind::Checkpoint { activated } => {
            let fg = if activated { Color::Rgb { r: 80, g: 255, b: 80 } } else { Color::DarkGrey };
            (['┃', '▶'], fg)
        }
    }
}

fn particle_glyph(p: &Particle) -> (char, Color) {
    let fade = p.fade();
    let shade = |r: u8, g: u8, b: u8| Color::Rgb {
        r: (r as f32 * (0.4 + 0.6 * fade)) as u8,
        g: (g as f32 * (0.4 + 0.6 * fade)) as u8,
        b: (b as f32 * (0.4 + 0.6 * fade)) as u8,
    };
    match p.tag {
        ParticleTag::Coin => ('$', shade(255, 220, 40)),
        ParticleTag::Debris => ('▪', shade(200, 100, 50)),
        ParticleTag::Dust => ('·', shade(200, 200, 200)),
        ParticleTag::Bubble => ('∘', shade(150, 200, 255)),
        ParticleTag::Spark => ('*', shade(255, 180, 40)),
        ParticleTag::Squash => ('▁', shade(170, 110, 60)),
        ParticleTag::Flip => ('◡', shade(170, 110, 60)),
        ParticleTag::Trail => ('░', shade(255, 100, 40)),
        ParticleTag::Telegraph => ('!', shade(255, 60, 60)),
        ParticleTag::Burst => ('✦', shade(255, 240, 120)),
        ParticleTag::Hit => ('×', shade(255, 255, 255)),
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_mode: Option<Mode>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_mode: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &mut WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // The camera targets a third of whatever the terminal shows.
        world.camera.view_width = (self.term_w / CELL_W) as f32 * world.phys.tile_size;

        // Mode change → clear for clean transition
        if self.last_mode != Some(world.mode) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_mode = Some(world.mode);
        }

        self.front.clear();
        self.compose_hud(world);
        self.compose_world(world);
        self.compose_help(world);

        match world.mode {
            Mode::Start => self.compose_title(world),
            Mode::Paused => self.compose_pause_overlay(world),
            Mode::LevelComplete => self.compose_level_complete(world),
            Mode::GameOver => self.compose_game_over(world),
            Mode::Win => self.compose_win(world),
            Mode::Playing | Mode::Dying => {}
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colours; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, w: &WorldState) {
        let hud = w.hud();
        let tier = match hud.tier {
            Tier::Small => "",
            Tier::Big => " BIG",
            Tier::Fire => " FIRE",
        };
        let mut line = format!(
            " {}-{} {}  SCORE {:06}  ${:<3} ♥×{}  TIME {:<3}  AMMO {}{}",
            hud.level + 1,
            hud.level_count,
            hud.level_name,
            hud.score,
            hud.coins,
            hud.lives,
            hud.time_left,
            hud.ammo,
            tier,
        );
        if hud.star > 0 {
            line.push_str("  ★");
        }
        if let Some((health, max)) = hud.boss {
            line.push_str(&format!("  BOSS {}", bar(health, max, 10)));
        }

        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &line, Color::White, HUD_BG);
    }

    fn compose_world(&mut self, w: &WorldState) {
        let view = View {
            cam_x: w.camera.x,
            tile: w.phys.tile_size,
            jitter: jitter(w.shake, w.clock),
        };
        let sky = if w.flash > 0 {
            FLASH_BG
        } else if w.underwater {
            WATER_BG
        } else {
            Cell::BASE_BG
        };

        // Sky and terrain
        for ty in 0..w.grid.height() {
            let row = MAP_ROW + ty;
            for col in 0..self.front.width {
                self.front.set(col, row, Cell::from_char(' ', Color::White, sky));
            }
            for tx in 0..w.grid.width() {
                let Some((chars, fg, bg)) = tile_glyph(w.grid.get(tx as i32, ty as i32)) else { continue };
                let col = view.col(tx as f32 * view.tile);
                let bg = if bg == Color::Reset { sky } else { bg };
                for (i, &c) in chars.iter().enumerate() {
                    self.front.set_at(col + i as i32, row as i32, Cell::from_char(c, fg, bg));
                }
            }
        }

        for e in w.entities.iter().filter(|e| !e.is_dead()) {
            let (chars, fg) = entity_glyph(e, w.clock);
            self.put_body(&view, e.body.pos, e.body.size, chars, fg);
        }

        for p in &w.particles {
            let (c, fg) = particle_glyph(p);
            let (col, row) = (view.col(p.pos.x), view.row(p.pos.y));
            let bg = self.front.bg_at(col, row);
            self.front.set_at(col, row, Cell::from_char(c, fg, bg));
        }

        self.compose_player(w, &view);
    }

    fn compose_player(&mut self, w: &WorldState, view: &View) {
        let p = &w.player;
        // Blink while invulnerable.
        if p.invulnerable > 0 && !p.is_starred() && (w.clock / 4) % 2 == 0 {
            return;
        }
        let fg = if p.is_starred() {
            const RAINBOW: [Color; 4] = [
                Color::Rgb { r: 255, g: 80, b: 80 },
                Color::Rgb { r: 255, g: 230, b: 60 },
                Color::Rgb { r: 80, g: 255, b: 120 },
                Color::Rgb { r: 100, g: 160, b: 255 },
            ];
            RAINBOW[((w.clock / 3) % 4) as usize]
        } else {
            match p.tier {
                Tier::Small => Color::Rgb { r: 230, g: 50, b: 50 },
                Tier::Big => Color::Rgb { r: 255, g: 90, b: 90 },
                Tier::Fire => Color::Rgb { r: 255, g: 240, b: 240 },
            }
        };
        let chars = match p.body.facing {
            Facing::Right => ['█', '▶'],
            Facing::Left => ['◀', '█'],
        };
        self.put_body(view, p.body.pos, p.body.size, chars, fg);
    }

    /// Fill the cells a body covers with its two-column glyph pattern.
    fn put_body(&mut self, view: &View, pos: Vec2, size: Vec2, chars: [char; 2], fg: Color) {
        let (col, row, cols, rows) = view.rect(pos, size);
        for dy in 0..rows {
            for dx in 0..cols {
                let c = chars[(dx % 2) as usize];
                if c == ' ' { continue; }
                let (x, y) = (col + dx, row + dy);
                let bg = self.front.bg_at(x, y);
                self.front.set_at(x, y, Cell::from_char(c, fg, bg));
            }
        }
    }

    fn compose_help(&mut self, w: &WorldState) {
        let row = MAP_ROW + w.grid.height() + 1;
        let help = " ←→ Move  ↑/Space Jump  X Run  F Fire  P Pause  Q Quit";
        self.front.put_str(0, row, help, Color::DarkGrey, Color::Reset);
    }

    // ── Overlays ──

    /// Dark box centred on the map, returning its top-left corner.
    fn overlay_box(&mut self, w: &WorldState, box_w: usize, box_h: usize) -> (usize, usize) {
        let map_h = w.grid.height();
        let box_w = box_w.min(self.front.width);
        let x0 = self.front.width.saturating_sub(box_w) / 2;
        let y0 = MAP_ROW + map_h.saturating_sub(box_h) / 2;
        for y in y0..y0 + box_h {
            for x in x0..x0 + box_w {
                self.front.set(x, y, Cell::from_char(' ', Color::White, OVERLAY_BG));
            }
        }
        (x0, y0)
    }

    fn overlay_lines(&mut self, w: &WorldState, lines: &[(&str, Color)]) {
        let box_w = lines.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0) + 6;
        let (x0, y0) = self.overlay_box(w, box_w, lines.len() + 2);
        for (i, (line, fg)) in lines.iter().enumerate() {
            let x = x0 + box_w.saturating_sub(line.chars().count()) / 2;
            self.front.put_str(x, y0 + 1 + i, line, *fg, OVERLAY_BG);
        }
    }

    fn compose_title(&mut self, w: &WorldState) {
        let gold = Color::Rgb { r: 255, g: 200, b: 50 };
        let hi = Color::Rgb { r: 80, g: 255, b: 80 };
        let levels = format!("{} courses", w.level_count());
        self.overlay_lines(w, &[
            ("╔═══════════════════╗", gold),
            ("║   P I P E L A N D ║", gold),
            ("╚═══════════════════╝", gold),
            ("", Color::White),
            (levels.as_str(), Color::DarkGrey),
            ("", Color::White),
            ("ENTER  Start", hi),
            ("Q      Quit", Color::White),
        ]);
    }

    fn compose_pause_overlay(&mut self, w: &WorldState) {
        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
        let key = Color::Rgb { r: 100, g: 200, b: 255 };
        self.overlay_lines(w, &[
            ("▶  PAUSED  ◀", hdr),
            ("", Color::White),
            ("P    Resume", key),
            ("R    Restart course", key),
            ("1-9  Jump to course", key),
            ("Q    Quit", key),
        ]);
    }

    fn compose_level_complete(&mut self, w: &WorldState) {
        let score = format!("Score {:06}", w.score);
        self.overlay_lines(w, &[
            ("★ COURSE CLEAR! ★", Color::Rgb { r: 255, g: 220, b: 50 }),
            ("", Color::White),
            (score.as_str(), Color::White),
            ("ENTER  Next course", Color::Rgb { r: 80, g: 255, b: 80 }),
        ]);
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        let score = format!("Final score {:06}", w.score);
        self.overlay_lines(w, &[
            ("✕ GAME OVER ✕", Color::Rgb { r: 255, g: 60, b: 60 }),
            ("", Color::White),
            (score.as_str(), Color::White),
            ("ENTER  Try again", Color::Rgb { r: 80, g: 255, b: 80 }),
        ]);
    }

    fn compose_win(&mut self, w: &WorldState) {
        let score = format!("Final score {:06}", w.score);
        let courses = format!("All {} courses cleared", w.level_count());
        self.overlay_lines(w, &[
            ("★ YOU WIN! ★", Color::Rgb { r: 255, g: 220, b: 50 }),
            ("", Color::White),
            (score.as_str(), Color::White),
            (courses.as_str(), Color::Rgb { r: 80, g: 255, b: 80 }),
            ("ENTER  Title", Color::DarkGrey),
        ]);
    }
}
