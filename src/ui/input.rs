/// Keyboard state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous intents while a key is held (walk, jump height, shooting)
///   - Edge-triggered menu actions (pause, confirm, quit, restart, level jump)
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.
///
/// ## Key map
///   ←/A  left        →/D  right       ↑/W/Space  jump / swim
///   ↓/S  down        X/K  run+shoot   F          shoot
///   P/Esc pause      Enter confirm    Q          quit
///   R    restart (paused)             1–9        jump to level (paused)

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use pipeland::sim::step::FrameInput;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

const LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char(' ')];
const DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const RUN: &[KeyCode] = &[KeyCode::Char('x'), KeyCode::Char('X'), KeyCode::Char('k'), KeyCode::Char('K')];
const FIRE: &[KeyCode] = &[KeyCode::Char('f'), KeyCode::Char('F')];
const PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P'), KeyCode::Esc];
const CONFIRM: &[KeyCode] = &[KeyCode::Enter];
const QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];

/// One-shot actions gathered during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuActions {
    pub pause: bool,
    pub confirm: bool,
    pub quit: bool,
    pub restart: bool,
    /// Zero-based level index from a digit key.
    pub level: Option<usize>,
}

impl MenuActions {
    /// Merge another source (e.g. a gamepad) into this one.
    pub fn merge(self, other: MenuActions) -> MenuActions {
        MenuActions {
            pause: self.pause || other.pause,
            confirm: self.confirm || other.confirm,
            quit: self.quit || other.quit,
            restart: self.restart || other.restart,
            level: self.level.or(other.level),
        }
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl+C detection.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else { continue };
            self.raw_events.push(key);
            match key.kind {
                KeyEventKind::Release if self.honor_release => {
                    self.last_active.remove(&key.code);
                }
                // Without enhancement, releases are inferred from the timeout.
                KeyEventKind::Release => {}
                _ => {
                    let was_held = self.is_held(key.code);
                    self.last_active.insert(key.code, Instant::now());
                    if !was_held {
                        self.fresh_presses.push(key.code);
                    }
                }
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map_or(false, |t| t.elapsed() < HOLD_TIMEOUT)
    }

    fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    /// Held intents for the next tick.
    pub fn frame_input(&self) -> FrameInput {
        intents(|codes| self.any_held(codes))
    }

    /// Edge-triggered actions from this frame's fresh presses.
    pub fn menu_actions(&self) -> MenuActions {
        let mut actions = MenuActions {
            pause: self.any_pressed(PAUSE),
            confirm: self.any_pressed(CONFIRM),
            quit: self.any_pressed(QUIT) || self.ctrl_c_pressed(),
            restart: self.any_pressed(RESTART),
            level: None,
        };
        actions.level = self.fresh_presses.iter().find_map(|&c| level_digit(c));
        actions
    }

    fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

/// Build intents from a held-key query. Left wins over right.
fn intents(held: impl Fn(&[KeyCode]) -> bool) -> FrameInput {
    let left = held(LEFT);
    FrameInput {
        left,
        right: !left && held(RIGHT),
        up: held(UP),
        down: held(DOWN),
        run: held(RUN),
        fire: held(FIRE),
    }
}

/// `1`–`9` select levels 0–8.
fn level_digit(code: KeyCode) -> Option<usize> {
    match code {
        KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|d| d as usize - 1),
        _ => None,
    }
}
