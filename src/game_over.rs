use bevy::prelude::*;

use crate::audio::{stop_background_music, BackgroundMusic};
use crate::bridge::Effect;
use crate::camera::reset_camera;
use crate::components::{Controller, EngineEffect, GameSceneEntity, Platform, Run, SceneWiring};
use crate::screens::{load_scene, Screen};
use crate::stage::CommandStage;

pub struct GameOverPlugin;

impl Plugin for GameOverPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(on_show_game_over).add_systems(
            Update,
            game_over_button_system.run_if(in_state(Screen::Game)),
        );
    }
}

/// Which button of the game over panel this is.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverAction {
    Restart,
    MainMenu,
}

#[derive(Component)]
pub struct CurrentScoreLabel;

#[derive(Component)]
pub struct BestScoreLabel;

pub fn current_score_text(score: u32) -> String {
    format!("Current Score: {}", score)
}

pub fn best_score_text(best: u32) -> String {
    format!("Best Score: {}", best)
}

/// Spawns the (hidden) game over panel and records its parts in the wiring.
/// Runs as part of the gameplay scene setup chain.
pub fn spawn_game_over_panel(mut commands: Commands, mut wiring: ResMut<SceneWiring>) {
    let mut current_label = None;
    let mut best_label = None;

    let panel = commands
        .spawn((
            GameSceneEntity,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(16.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("GAME OVER"),
                TextFont {
                    font_size: 72.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            current_label = Some(
                parent
                    .spawn((CurrentScoreLabel, Text::new(current_score_text(0)), score_font()))
                    .id(),
            );
            best_label = Some(
                parent
                    .spawn((BestScoreLabel, Text::new(best_score_text(0)), score_font()))
                    .id(),
            );
            spawn_button(parent, GameOverAction::Restart, "Restart");
            spawn_button(parent, GameOverAction::MainMenu, "Main Menu");
        })
        .id();

    wiring.game_over_panel = Some(panel);
    wiring.current_score_label = current_label;
    wiring.best_score_label = best_label;
}

fn score_font() -> (TextFont, TextColor) {
    (
        TextFont {
            font_size: 36.0,
            ..default()
        },
        TextColor(Color::WHITE),
    )
}

fn spawn_button(parent: &mut ChildSpawnerCommands, action: GameOverAction, label: &str) {
    parent
        .spawn((
            Button,
            action,
            Node {
                width: Val::Px(240.0),
                height: Val::Px(64.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(3.0)),
                ..default()
            },
            BackgroundColor(Color::srgb(0.2, 0.25, 0.35)),
            BorderColor::all(Color::srgb(0.5, 0.6, 0.8)),
        ))
        .with_children(|button| {
            button.spawn((
                Text::new(label),
                TextFont {
                    font_size: 32.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

/// Fills in the scores and brings the panel up. The player and platforms are
/// hidden behind it, as is the bridge (RunState already marked it inactive).
fn on_show_game_over(
    effect: On<EngineEffect>,
    wiring: Option<Res<SceneWiring>>,
    mut texts: Query<&mut Text>,
    mut visibilities: Query<&mut Visibility, Without<Platform>>,
    mut platforms: Query<&mut Visibility, With<Platform>>,
) {
    let Effect::ShowGameOver { score, best } = effect.0 else {
        return;
    };
    let Some(wiring) = wiring else {
        return;
    };

    if let Some(label) = wiring.current_score_label {
        if let Ok(mut text) = texts.get_mut(label) {
            text.0 = current_score_text(score);
        }
    }
    if let Some(label) = wiring.best_score_label {
        if let Ok(mut text) = texts.get_mut(label) {
            text.0 = best_score_text(best);
        }
    }

    match wiring.game_over_panel {
        Some(panel) => {
            if let Ok(mut visibility) = visibilities.get_mut(panel) {
                *visibility = Visibility::Inherited;
            }
        }
        None => debug!("No game over panel; final score {} (best {})", score, best),
    }
    if let Some(player) = wiring.player {
        if let Ok(mut visibility) = visibilities.get_mut(player) {
            *visibility = Visibility::Hidden;
        }
    }
    for mut visibility in platforms.iter_mut() {
        *visibility = Visibility::Hidden;
    }
}

/// Restart and Main Menu. Both are inert unless the run has actually ended,
/// which also covers clicks on the panel while it is hidden.
fn game_over_button_system(
    mut commands: Commands,
    interactions: Query<(&Interaction, &GameOverAction), Changed<Interaction>>,
    mut run: ResMut<Run>,
    mut controller: ResMut<Controller>,
    wiring: Res<SceneWiring>,
    music: Query<Entity, With<BackgroundMusic>>,
    mut next_screen: ResMut<NextState<Screen>>,
    cameras: Query<&mut Transform, With<Camera2d>>,
) {
    let Some(action) = interactions
        .iter()
        .find(|(interaction, _)| **interaction == Interaction::Pressed)
        .map(|(_, action)| *action)
    else {
        return;
    };
    if !controller.is_ended() {
        return;
    }

    match action {
        GameOverAction::Restart => {
            info!("Restarting run (best score {})", run.session.best_score);
            let mut rng = rand::thread_rng();
            {
                let mut stage = CommandStage::new(&mut commands, &wiring);
                run.initialize(&mut stage, &mut rng);
            }
            for effect in controller.reset() {
                commands.trigger(EngineEffect(effect));
            }
            commands.trigger(EngineEffect(Effect::ScoreChanged(run.session.score)));
            reset_camera(cameras);
        }
        GameOverAction::MainMenu => {
            stop_background_music(&mut commands, &music, &mut run.session);
            load_scene(&mut next_screen, Screen::MAIN_MENU);
        }
    }
}
