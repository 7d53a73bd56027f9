/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Walk, swim up, duck
///   A                     →  Jump
///   B                     →  Run (shoots while held)
///   X / R1                →  Shoot
///   Start                 →  Pause / Confirm
///   Select                →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use pipeland::config::GamepadConfig;
use pipeland::sim::step::FrameInput;

use super::input::MenuActions;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq)]
struct ActionMap {
    jump: Vec<Btn>,
    fire: Vec<Btn>,
    run: Vec<Btn>,
    pause: Vec<Btn>,
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump:    vec![Btn::A],
            fire:    vec![Btn::X, Btn::R1],
            run:     vec![Btn::B],
            pause:   vec![Btn::Start],
            confirm: vec![Btn::Start, Btn::A],
            cancel:  vec![Btn::Select],
        }
    }
}

impl ActionMap {
    /// Replace each action's buttons with the configured ones.
    /// Lists with no recognised button names keep their defaults.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn pick(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() {
                if !names.is_empty() {
                    log::warn!("no known gamepad buttons in {:?}; keeping defaults", names);
                }
                fallback
            } else {
                parsed
            }
        }
        let d = ActionMap::default();
        ActionMap {
            jump: pick(&cfg.jump, d.jump),
            fire: pick(&cfg.fire, d.fire),
            run: pick(&cfg.run, d.run),
            pause: pick(&cfg.pause, d.pause),
            confirm: pick(&cfg.confirm, d.confirm),
            cancel: pick(&cfg.cancel, d.cancel),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; 10],

    // D-pad
    dpad_up: BtnState,
    dpad_down: BtnState,
    dpad_left: BtnState,
    dpad_right: BtnState,

    // Stick
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); 10],
            dpad_up: BtnState::default(),
            dpad_down: BtnState::default(),
            dpad_left: BtnState::default(),
            dpad_right: BtnState::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let state = match gilrs_btn {
            Button::DPadUp    => &mut self.dpad_up,
            Button::DPadDown  => &mut self.dpad_down,
            Button::DPadLeft  => &mut self.dpad_left,
            Button::DPadRight => &mut self.dpad_right,
            other => match Btn::from_gilrs(other) {
                Some(btn) => &mut self.buttons[btn_index(btn)],
                None => return,
            },
        };
        state.held = held;
        if held {
            state.just_pressed = true;
        }
    }

    // ── Action queries (config-driven) ──

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].held)
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    /// Held intents. Stick and d-pad share the directions.
    pub fn frame_input(&self) -> FrameInput {
        let left = self.dpad_left.held || self.stick_x < -STICK_DEADZONE;
        let right = !left && (self.dpad_right.held || self.stick_x > STICK_DEADZONE);
        FrameInput {
            left,
            right,
            up: self.dpad_up.held || self.stick_y > STICK_DEADZONE || self.any_held(&self.action_map.jump),
            down: self.dpad_down.held || self.stick_y < -STICK_DEADZONE,
            run: self.any_held(&self.action_map.run),
            fire: self.any_held(&self.action_map.fire),
        }
    }

    pub fn menu_actions(&self) -> MenuActions {
        MenuActions {
            pause: self.any_just_pressed(&self.action_map.pause),
            confirm: self.any_just_pressed(&self.action_map.confirm),
            quit: self.any_just_pressed(&self.action_map.cancel),
            restart: false,
            level: None,
        }
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        self.dpad_up.just_pressed = false;
        self.dpad_down.just_pressed = false;
        self.dpad_left.just_pressed = false;
        self.dpad_right.just_pressed = false;
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in &mut self.buttons { *b = BtnState::default(); }
        self.dpad_up = BtnState::default();
        self.dpad_down = BtnState::default();
        self.dpad_left = BtnState::default();
        self.dpad_right = BtnState::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
