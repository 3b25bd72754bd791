// menu.rs - The main menu: a title and a "Play" button.
//
// Spawned on OnEnter(MainMenu) and despawned on OnExit(MainMenu), the same
// spawn/cleanup pairing every scene in the game follows.

use bevy::prelude::*;

use crate::audio::{start_background_music, GameAudio};
use crate::components::Run;
use crate::screens::{load_scene, Screen};

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Screen::MainMenu), spawn_menu_ui)
            .add_systems(Update, handle_play_button.run_if(in_state(Screen::MainMenu)))
            .add_systems(OnExit(Screen::MainMenu), cleanup_menu_ui);
    }
}

/// Root of the menu UI; despawning it takes the whole menu with it.
#[derive(Component)]
pub struct MenuUi;

#[derive(Component)]
pub struct PlayButton;

fn spawn_menu_ui(mut commands: Commands) {
    commands
        .spawn((
            MenuUi,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(40.0),
                ..default()
            },
            BackgroundColor(Color::NONE),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Bridge Builder"),
                TextFont {
                    font_size: 80.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));

            parent
                .spawn((
                    Button,
                    PlayButton,
                    Node {
                        width: Val::Px(200.0),
                        height: Val::Px(80.0),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        border: UiRect::all(Val::Px(3.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.15, 0.4, 0.2)),
                    BorderColor::all(Color::srgb(0.4, 0.8, 0.5)),
                ))
                .with_children(|button| {
                    button.spawn((
                        Text::new("Play"),
                        TextFont {
                            font_size: 40.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                });
        });
}

/// "Play": start the background track if this session has not yet, then
/// switch to the game scene.
fn handle_play_button(
    mut commands: Commands,
    query: Query<&Interaction, (Changed<Interaction>, With<PlayButton>)>,
    mut next_screen: ResMut<NextState<Screen>>,
    mut run: ResMut<Run>,
    audio: Option<Res<GameAudio>>,
) {
    if !query.iter().any(|interaction| *interaction == Interaction::Pressed) {
        return;
    }
    start_background_music(&mut commands, audio.as_deref(), &mut run.session);
    load_scene(&mut next_screen, Screen::GAME);
}

fn cleanup_menu_ui(mut commands: Commands, query: Query<Entity, With<MenuUi>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}
