/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use config::GameConfig;
use sim::event::GameEvent;
use sim::step::{self, FrameInput};
use sim::world::{Outcome, RoundPhase, World};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

fn main() {
    let config = GameConfig::load();
    init_logging(&config);
    log::info!(
        "config: {}x{} screen, {} players, {:.0}s rounds, scroll {} px/s",
        config.screen.width, config.screen.height, config.skins.len(),
        config.round.duration_secs, config.physics.scroll_speed,
    );

    let mut world = World::new(&config);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new(config.skins.len());

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Jumpatron!");
    for id in world.in_slot_order() {
        let c = &world.characters[id];
        println!("  {:<12} {}", c.skin, c.score);
    }
}

/// The terminal belongs to the game while it runs, so log lines only go
/// to a file, and only when one is configured.
fn init_logging(config: &GameConfig) {
    let Some(path) = &config.log_file else { return };
    match File::create(path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("Warning: could not open log file {}: {e}", path.display()),
    }
}

fn game_loop(
    world: &mut World,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new(&config.input.keys);
    kb.enable_release_events();
    let mut gp = GamepadState::new(&config.input.buttons);
    let frame = Duration::from_millis(config.frame_ms);
    let mut last_frame = Instant::now();

    let result = loop {
        let frame_start = Instant::now();
        kb.drain_events();
        gp.update();

        if kb.quit_pressed() || gp.quit_pressed() {
            break Ok(());
        }
        if world.round == RoundPhase::Finished && (kb.restart_pressed() || gp.restart_pressed()) {
            world.restart(config);
            last_frame = Instant::now();
        }

        let dt = last_frame.elapsed().as_secs_f32().min(config.max_frame_dt);
        last_frame = Instant::now();

        let mut activations = kb.activations();
        activations.extend(gp.activations());
        let events = step::step(world, &FrameInput { activations }, dt);
        process_sound_events(sound, &events);

        if let Err(e) = renderer.render(world) {
            break Err(e.into());
        }

        if let Some(rest) = frame.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    };

    kb.restore();
    result
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::Jumped { who } => sfx.play_jump(*who),
            GameEvent::Spun { who } => {
                sfx.play_jump(*who);
                sfx.play_spin();
            }
            GameEvent::Hit { .. } => sfx.play_hurt(),
            GameEvent::Collected { .. } => sfx.play_pickup(),
            GameEvent::RoundFinished { outcome: Outcome::Winner(_) } => sfx.play_fanfare(),
            GameEvent::RoundFinished { outcome: Outcome::Tie } => sfx.play_tie(),
            _ => {}
        }
    }
}
