use bevy::prelude::*;

use crate::bridge::Effect;
use crate::components::{EngineEffect, GameSceneEntity, SceneWiring, ScoreLabel};

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(on_score_effect);
    }
}

/// Spawns the score label at the top of the screen and records it in the wiring.
/// Runs as part of the gameplay scene setup chain.
pub fn spawn_hud(mut commands: Commands, mut wiring: ResMut<SceneWiring>) {
    let label = commands
        .spawn((
            GameSceneEntity,
            ScoreLabel,
            Text::new("0"),
            TextFont {
                font_size: 64.0,
                ..default()
            },
            TextColor(Color::WHITE),
            TextLayout::new_with_justify(Justify::Center),
            Visibility::Inherited,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(40.0),
                width: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
        ))
        .id();
    wiring.score_label = Some(label);
}

/// Keeps the label in step with the score; hides it while the game over
/// panel is up. No label in the scene just means no score on screen.
fn on_score_effect(
    effect: On<EngineEffect>,
    wiring: Option<Res<SceneWiring>>,
    mut labels: Query<(&mut Text, &mut Visibility), With<ScoreLabel>>,
) {
    let Some(label) = wiring.and_then(|w| w.score_label) else {
        return;
    };
    let Ok((mut text, mut visibility)) = labels.get_mut(label) else {
        return;
    };

    match &effect.0 {
        Effect::ScoreChanged(score) => {
            text.0 = score.to_string();
            *visibility = Visibility::Inherited;
        }
        Effect::ShowGameOver { .. } => *visibility = Visibility::Hidden,
        _ => {}
    }
}
