/// Entry point and game loop.

mod ui;

use std::error::Error;
use std::time::{Duration, Instant};

use pipeland::config::GameConfig;
use pipeland::sim::event::GameEvent;
use pipeland::sim::level::level_roster;
use pipeland::sim::step::{self, FrameInput};
use pipeland::sim::world::{Mode, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{InputState, MenuActions};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = GameConfig::load();
    let mut world = WorldState::new(&config, level_roster(&config));

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Pipeland!");
    println!("Final Score: {}", world.score);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let tick_rate = Duration::from_millis(config.session.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        let actions = kb.menu_actions().merge(gp.menu_actions());
        if actions.quit {
            break;
        }
        let events = handle_menu(world, actions);
        play_cues(sound, &events);

        if last_tick.elapsed() >= tick_rate {
            let input = merge_input(kb.frame_input(), gp.frame_input());
            let events = step::step(world, input);
            play_cues(sound, &events);
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Keyboard and gamepad intents are OR-ed; left still beats right.
fn merge_input(a: FrameInput, b: FrameInput) -> FrameInput {
    let left = a.left || b.left;
    FrameInput {
        left,
        right: !left && (a.right || b.right),
        up: a.up || b.up,
        down: a.down || b.down,
        run: a.run || b.run,
        fire: a.fire || b.fire,
    }
}

/// Mode transitions driven by edge-triggered actions.
fn handle_menu(world: &mut WorldState, actions: MenuActions) -> Vec<GameEvent> {
    match world.mode {
        Mode::Start => {
            if let Some(idx) = actions.level {
                world.new_game_at(idx);
            } else if actions.confirm {
                world.new_game();
            }
        }
        Mode::Playing => {
            if actions.pause {
                world.toggle_pause();
            }
        }
        Mode::Paused => {
            if actions.pause {
                world.toggle_pause();
            } else if actions.restart {
                log::info!("restarting level {}", world.level_idx);
                world.restart_level();
            } else if let Some(idx) = actions.level {
                world.load_level(idx);
            }
        }
        Mode::LevelComplete => {
            if actions.confirm {
                return world.advance_level();
            }
        }
        Mode::GameOver => {
            if actions.confirm {
                world.new_game();
            }
        }
        Mode::Win => {
            if actions.confirm {
                world.mode = Mode::Start;
            }
        }
        Mode::Dying => {}
    }
    Vec::new()
}

fn play_cues(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    for event in events {
        if let GameEvent::Cue(cue) = event {
            sfx.play(*cue);
        }
    }
}
