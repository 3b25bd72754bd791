use bevy::prelude::*;

use crate::components::Run;
use crate::screens::Screen;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(Update, follow_run_system.run_if(in_state(Screen::Game)))
            .add_systems(OnExit(Screen::Game), reset_camera);
    }
}

/// How far right of the current platform's center the camera looks, so the
/// gap and the next platform stay on screen.
const LOOK_AHEAD: f32 = 150.0;

/// Higher is snappier. At 4.0 the camera covers ~98% of the distance in a second.
const FOLLOW_RATE: f32 = 4.0;

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Exponential approach towards `target`, independent of frame rate.
pub fn follow_step(current: f32, target: f32, delta_secs: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= 0.01 {
        return target;
    }
    current + diff * (1.0 - (-FOLLOW_RATE * delta_secs).exp())
}

/// Pans horizontally to keep the current platform in view. Without a camera
/// this does nothing.
fn follow_run_system(
    run: Option<Res<Run>>,
    mut cameras: Query<&mut Transform, With<Camera2d>>,
    time: Res<Time>,
) {
    let Some(current) = run.and_then(|run| run.current) else {
        return;
    };
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };
    let target = current.center.x + LOOK_AHEAD;
    transform.translation.x = follow_step(transform.translation.x, target, time.delta_secs());
}

/// Snaps the camera back to the origin; used on restart and when leaving the game.
pub fn reset_camera(mut cameras: Query<&mut Transform, With<Camera2d>>) {
    if let Ok(mut transform) = cameras.single_mut() {
        transform.translation.x = 0.0;
        transform.translation.y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_moves_towards_target() {
        let next = follow_step(0.0, 100.0, 1.0 / 60.0);
        assert!(next > 0.0 && next < 100.0);
    }

    #[test]
    fn test_follow_snaps_when_close() {
        assert_eq!(follow_step(99.995, 100.0, 1.0 / 60.0), 100.0);
    }

    #[test]
    fn test_follow_never_overshoots() {
        let mut x = 0.0;
        for _ in 0..600 {
            x = follow_step(x, 250.0, 1.0 / 60.0);
            assert!(x <= 250.0);
        }
        assert_eq!(x, 250.0);
    }
}
