// main.rs - Entry point for the bridge builder.
//
// Hold to grow a bridge from the edge of your platform, let go to drop it, and
// cross if it reaches the next one. Landing dead on the marker at the far edge
// of the next platform is worth extra points.
//
// =============================================================================
// HOW THE PIECES FIT
// =============================================================================
// The gameplay rules live in plain Rust with no Bevy systems in them:
//
//   run_state.rs  platforms, bridge geometry, score       (RunState)
//   bridge.rs     press/grow/drop/cross state machine     (BridgeController)
//   session.rs    score, best score, music guard          (RunSession)
//
// Everything else is a Bevy plugin that feeds input, timers and finished
// animations into the state machine (BridgeSignal), and acts on what it asks
// for in return (EngineEffect).

use bevy::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .insert_resource(ClearColor(Color::srgb(0.45, 0.7, 0.9)))
        // Config comes first: GameplayPlugin builds the run from it at Startup.
        .add_plugins((
            config::ConfigPlugin,
            screens::ScreensPlugin,
            audio::SoundPlugin,
            tween::TweenPlugin,
            camera::CameraPlugin,
        ))
        .add_plugins((
            hud::HudPlugin,
            gameplay::GameplayPlugin,
            game_over::GameOverPlugin,
            menu::MenuPlugin,
        ))
        .run();
}

mod audio;
mod bridge;
mod camera;
mod components;
mod config;
mod game_over;
mod gameplay;
mod hud;
mod menu;
mod run_state;
mod screens;
mod session;
mod stage;
mod tween;
