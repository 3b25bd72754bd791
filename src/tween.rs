use bevy::prelude::*;

use crate::bridge::{BridgeEvent, Effect};
use crate::components::{BridgeSignal, EngineEffect, MoveTween, RotateTween, SceneWiring};

pub struct TweenPlugin;

impl Plugin for TweenPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(start_tweens)
            .add_systems(Update, (move_tween_system, rotate_tween_system));
    }
}

/// Turns the state machine's animation requests into tween components.
///
/// The player and the bridge are required for a crossing. If either is missing
/// we warn and report the animation as finished straight away, so the state
/// machine still reaches its verdict instead of hanging in mid-air.
fn start_tweens(
    effect: On<EngineEffect>,
    mut commands: Commands,
    wiring: Option<Res<SceneWiring>>,
) {
    let wiring = wiring.map(|w| *w).unwrap_or_default();

    match effect.0 {
        Effect::RotateBridge { angle, duration } => match wiring.bridge {
            Some(bridge) => {
                commands.entity(bridge).insert(RotateTween::new(
                    angle,
                    duration,
                    BridgeEvent::RotationComplete,
                ));
            }
            None => {
                warn!("No bridge in the scene; skipping the drop animation");
                commands.trigger(BridgeSignal(BridgeEvent::RotationComplete));
            }
        },
        Effect::MovePlayer { target, duration } => match wiring.player {
            Some(player) => {
                commands.entity(player).insert(MoveTween::new(
                    target,
                    duration,
                    BridgeEvent::MoveComplete,
                ));
            }
            None => {
                warn!("No player in the scene; skipping the move animation");
                commands.trigger(BridgeSignal(BridgeEvent::MoveComplete));
            }
        },
        _ => {}
    }
}

/// Straight-line move at constant speed, like a plain "move to" action.
fn move_tween_system(
    mut commands: Commands,
    mut query: Query<(Entity, &mut Transform, &mut MoveTween)>,
    time: Res<Time>,
) {
    for (entity, mut transform, mut tween) in query.iter_mut() {
        let from = *tween.from.get_or_insert(transform.translation.truncate());
        tween.timer.tick(time.delta());

        if tween.timer.is_finished() {
            // Snap to the exact target so rounding never leaves us a pixel short
            transform.translation.x = tween.to.x;
            transform.translation.y = tween.to.y;
            commands.entity(entity).remove::<MoveTween>();
            commands.trigger(BridgeSignal(tween.on_complete));
        } else {
            let position = from.lerp(tween.to, tween.timer.fraction());
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
    }
}

/// Rotation around the entity's own origin, at constant angular speed.
fn rotate_tween_system(
    mut commands: Commands,
    mut query: Query<(Entity, &mut Transform, &mut RotateTween)>,
    time: Res<Time>,
) {
    for (entity, mut transform, mut tween) in query.iter_mut() {
        let from = *tween
            .from
            .get_or_insert_with(|| z_angle_degrees(&transform));
        tween.timer.tick(time.delta());

        if tween.timer.is_finished() {
            transform.rotation = Quat::from_rotation_z(tween.to.to_radians());
            commands.entity(entity).remove::<RotateTween>();
            commands.trigger(BridgeSignal(tween.on_complete));
        } else {
            let angle = from + (tween.to - from) * tween.timer.fraction();
            transform.rotation = Quat::from_rotation_z(angle.to_radians());
        }
    }
}

fn z_angle_degrees(transform: &Transform) -> f32 {
    let (_, _, z) = transform.rotation.to_euler(EulerRot::XYZ);
    z.to_degrees()
}
