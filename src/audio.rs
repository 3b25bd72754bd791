use bevy::prelude::*;

use crate::bridge::{Effect, Sound};
use crate::components::EngineEffect;
use crate::session::RunSession;

pub struct SoundPlugin;

impl Plugin for SoundPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_audio)
            .add_observer(on_sound_effect);
    }
}

#[derive(Resource)]
pub struct GameAudio {
    /// Handle<T> is Bevy's way of referencing assets.
    pub background_music: Handle<AudioSource>,
    pub bridge_fall: Handle<AudioSource>,
    pub game_over: Handle<AudioSource>,
}

impl GameAudio {
    fn clip(&self, sound: Sound) -> Handle<AudioSource> {
        match sound {
            Sound::BridgeFall => self.bridge_fall.clone(),
            Sound::GameOver => self.game_over.clone(),
        }
    }
}

/// The entity playing the looping background track. At most one exists.
#[derive(Component)]
pub struct BackgroundMusic;

pub fn setup_audio(mut commands: Commands, asset_server: Res<AssetServer>) {
    // The actual loading happens in the background - asset_server.load()
    // returns immediately with a Handle that will be valid once loading completes.
    // A missing file only means silence; the asset server logs the failure.
    commands.insert_resource(GameAudio {
        background_music: asset_server.load("audio/background.mp3"),
        bridge_fall: asset_server.load("audio/bridge_fall.wav"),
        game_over: asset_server.load("audio/game_over.wav"),
    });
}

/// Starts the looping track unless the session says it is already playing.
pub fn start_background_music(
    commands: &mut Commands,
    audio: Option<&GameAudio>,
    session: &mut RunSession,
) {
    let Some(audio) = audio else {
        debug!("No audio loaded; skipping background music");
        return;
    };
    if !session.claim_music() {
        return;
    }
    commands.spawn((
        BackgroundMusic,
        AudioPlayer::new(audio.background_music.clone()),
        PlaybackSettings::LOOP,
    ));
    info!("Background music started");
}

/// Stops the looping track (if any) and clears the session guard.
pub fn stop_background_music(
    commands: &mut Commands,
    music: &Query<Entity, With<BackgroundMusic>>,
    session: &mut RunSession,
) {
    if session.release_music() {
        info!("Background music stopped");
    }
    for entity in music.iter() {
        commands.entity(entity).despawn();
    }
}

/// One-shot sound effects requested by the bridge state machine.
fn on_sound_effect(
    effect: On<EngineEffect>,
    mut commands: Commands,
    audio: Option<Res<GameAudio>>,
) {
    let Effect::PlaySound(sound) = &effect.0 else {
        return;
    };
    let Some(audio) = audio else {
        return;
    };
    // DESPAWN cleans the player entity up once the clip has finished.
    commands.spawn((AudioPlayer::new(audio.clip(*sound)), PlaybackSettings::DESPAWN));
}
