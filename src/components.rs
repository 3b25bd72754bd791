// components.rs - Shared component, resource and event definitions.
// Anything more than one plugin needs to name lives here.

use bevy::prelude::*;

use crate::bridge::{BridgeController, BridgeEvent, Effect};
use crate::run_state::RunState;

// =============================================================================
// MARKERS
// =============================================================================

/// A ground segment the player stands on. Spawned and despawned by RunState
/// through the Stage, never directly by a system.
#[derive(Component)]
pub struct Platform;

/// The precision marker on a platform's far edge (a child of the platform).
#[derive(Component)]
pub struct Indicator;

#[derive(Component)]
pub struct Player;

/// The bridge's pivot. Its Transform sits at the bridge base and carries the
/// rotation; the visible sprite is a child offset upwards by half its length.
/// Rotating the pivot is how the bridge "falls" around its base without
/// needing a custom sprite anchor.
#[derive(Component)]
pub struct BridgePivot;

#[derive(Component)]
pub struct BridgeSprite;

/// HUD text showing the running score.
#[derive(Component)]
pub struct ScoreLabel;

/// Marks everything spawned for the gameplay screen (other than platforms,
/// which RunState tears down itself) so it can be cleaned up on exit.
#[derive(Component)]
pub struct GameSceneEntity;

// =============================================================================
// RESOURCES
// =============================================================================

/// The gameplay core, wrapped so Bevy can store it.
///
/// RunState is generic over its handle type so tests can drive it with plain
/// integers; in the running game the handles are Entities.
#[derive(Resource, Deref, DerefMut)]
pub struct Run(pub RunState<Entity>);

#[derive(Resource, Default, Deref, DerefMut)]
pub struct Controller(pub BridgeController);

/// Entities the gameplay systems talk to, looked up once when the scene is
/// built instead of searched for by name every time.
///
/// Every field is an Option on purpose: a missing score label means no score
/// on screen, not a crash. Player and bridge are the two the game cannot work
/// without; when those are None the systems log a warning and carry on.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct SceneWiring {
    pub player: Option<Entity>,
    pub bridge: Option<Entity>,
    pub bridge_sprite: Option<Entity>,
    pub score_label: Option<Entity>,
    pub game_over_panel: Option<Entity>,
    pub current_score_label: Option<Entity>,
    pub best_score_label: Option<Entity>,
}

// =============================================================================
// TWEENS
// =============================================================================
// A tween is a temporary component: insert it to start an animation, and the
// tween system removes it when the timer finishes and fires `on_complete`
// back into the state machine. `from` is None until the first tick, when the
// system reads the entity's current Transform, so whoever starts a tween does
// not need to know where the entity is right now.

#[derive(Component)]
pub struct MoveTween {
    pub from: Option<Vec2>,
    pub to: Vec2,
    pub timer: Timer,
    pub on_complete: BridgeEvent,
}

impl MoveTween {
    pub fn new(to: Vec2, duration: std::time::Duration, on_complete: BridgeEvent) -> Self {
        MoveTween {
            from: None,
            to,
            timer: Timer::new(duration, TimerMode::Once),
            on_complete,
        }
    }
}

/// Rotation around z, in degrees.
#[derive(Component)]
pub struct RotateTween {
    pub from: Option<f32>,
    pub to: f32,
    pub timer: Timer,
    pub on_complete: BridgeEvent,
}

impl RotateTween {
    pub fn new(to: f32, duration: std::time::Duration, on_complete: BridgeEvent) -> Self {
        RotateTween {
            from: None,
            to,
            timer: Timer::new(duration, TimerMode::Once),
            on_complete,
        }
    }
}

// =============================================================================
// EVENTS
// =============================================================================
// Two observer events connect the engine to the gameplay core:
//
//   BridgeSignal  engine -> core   "the player pressed", "the timer fired",
//                                  "the tween finished"
//   EngineEffect  core -> engine   "start a timer", "play a sound",
//                                  "show the game over panel"
//
// The gameplay observer is the only thing that reacts to BridgeSignal. Several
// plugins (audio, tweens, HUD, game over) each observe EngineEffect and pick
// out the effects they care about.

#[derive(Event, Debug, Clone, Copy)]
pub struct BridgeSignal(pub BridgeEvent);

#[derive(Event, Debug, Clone)]
pub struct EngineEffect(pub Effect);
