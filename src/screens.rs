// screens.rs - The two scenes of the game and how to switch between them.

use bevy::prelude::*;

pub struct ScreensPlugin;

impl Plugin for ScreensPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<Screen>()
            .add_systems(OnEnter(Screen::MainMenu), log_scene_loaded)
            .add_systems(OnEnter(Screen::Game), log_scene_loaded);
    }
}

/// Top-level scenes. The game starts on the main menu.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Screen {
    #[default]
    MainMenu,
    Game,
}

impl Screen {
    pub const MAIN_MENU: &'static str = "MainMenu";
    pub const GAME: &'static str = "GameScene";

    /// Scene identifiers as the menus refer to them.
    pub fn from_scene_name(name: &str) -> Option<Screen> {
        match name {
            Self::MAIN_MENU => Some(Screen::MainMenu),
            Self::GAME => Some(Screen::Game),
            _ => None,
        }
    }

    pub fn scene_name(self) -> &'static str {
        match self {
            Screen::MainMenu => Self::MAIN_MENU,
            Screen::Game => Self::GAME,
        }
    }
}

/// Requests a scene by name. The switch happens at the end of the frame,
/// like every NextState change. Unknown names do nothing.
pub fn load_scene(next: &mut NextState<Screen>, name: &str) {
    match Screen::from_scene_name(name) {
        Some(screen) => {
            info!("Loading scene {}", name);
            next.set(screen);
        }
        None => warn!("Unknown scene {:?}; ignoring", name),
    }
}

fn log_scene_loaded(screen: Res<State<Screen>>) {
    debug!("Entered scene {}", screen.get().scene_name());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_names_round_trip() {
        for screen in [Screen::MainMenu, Screen::Game] {
            assert_eq!(Screen::from_scene_name(screen.scene_name()), Some(screen));
        }
    }

    #[test]
    fn test_unknown_scene_is_none() {
        assert_eq!(Screen::from_scene_name("Credits"), None);
        assert_eq!(Screen::from_scene_name("gamescene"), None);
    }
}
