use bevy::prelude::*;

use crate::audio::{start_background_music, GameAudio};
use crate::bridge::{BridgeEvent, Effect};
use crate::components::{
    BridgePivot, BridgeSignal, BridgeSprite, Controller, EngineEffect, GameSceneEntity, Player,
    RotateTween, Run, SceneWiring,
};
use crate::config::GameConfig;
use crate::run_state::RunState;
use crate::screens::Screen;
use crate::stage::CommandStage;
use crate::{game_over, hud};

pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneWiring>()
            .init_resource::<Controller>()
            .init_resource::<BridgeTimers>()
            .add_systems(Startup, insert_run)
            // Scene setup is chained: every step fills in part of SceneWiring,
            // and start_run needs all of it to place the player and hide the panel.
            .add_systems(
                OnEnter(Screen::Game),
                (
                    hud::spawn_hud,
                    game_over::spawn_game_over_panel,
                    spawn_actors,
                    start_run,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (tick_bridge_timers, pointer_input_system, sync_bridge_visual)
                    .chain()
                    .run_if(in_state(Screen::Game)),
            )
            .add_systems(OnExit(Screen::Game), teardown_game_scene)
            .add_observer(on_bridge_signal)
            .add_observer(on_timer_effect);
    }
}

const PLAYER_COLOR: Color = Color::srgb(0.95, 0.75, 0.2);
const BRIDGE_COLOR: Color = Color::srgb(0.55, 0.35, 0.2);

// ── Timer service ───────────────────────────────────────────────────────────

/// The two timers the bridge needs: the repeating growth tick while the
/// press is held, and the one-shot delay between release and the drop.
///
/// None means "not scheduled". Both timers only run in the game scene.
#[derive(Resource, Default)]
pub struct BridgeTimers {
    pub growth: Option<Timer>,
    pub drop: Option<Timer>,
}

impl BridgeTimers {
    pub fn start_growth(&mut self, interval: std::time::Duration) {
        self.growth = Some(Timer::new(interval, TimerMode::Repeating));
    }

    /// Stops the growth tick. Calling it when nothing is scheduled is fine.
    pub fn cancel_growth(&mut self) {
        self.growth = None;
    }

    pub fn schedule_drop(&mut self, delay: std::time::Duration) {
        self.drop = Some(Timer::new(delay, TimerMode::Once));
    }

    pub fn clear(&mut self) {
        self.growth = None;
        self.drop = None;
    }

    /// Advances both timers and returns the events they produced, in order:
    /// one GrowthTick per elapsed growth period, then DropDue if the delay ran out.
    pub fn tick(&mut self, delta: std::time::Duration) -> Vec<BridgeEvent> {
        let mut events = Vec::new();

        if let Some(growth) = self.growth.as_mut() {
            growth.tick(delta);
            for _ in 0..growth.times_finished_this_tick() {
                events.push(BridgeEvent::GrowthTick);
            }
        }

        if let Some(drop) = self.drop.as_mut() {
            drop.tick(delta);
            if drop.just_finished() {
                self.drop = None;
                events.push(BridgeEvent::DropDue);
            }
        }

        events
    }
}

fn tick_bridge_timers(mut commands: Commands, mut timers: ResMut<BridgeTimers>, time: Res<Time>) {
    for event in timers.tick(time.delta()) {
        commands.trigger(BridgeSignal(event));
    }
}

fn on_timer_effect(effect: On<EngineEffect>, mut timers: ResMut<BridgeTimers>) {
    match effect.0 {
        Effect::StartGrowth { interval } => timers.start_growth(interval),
        Effect::StopGrowth => timers.cancel_growth(),
        Effect::ScheduleDrop { delay } => timers.schedule_drop(delay),
        _ => {}
    }
}

// ── Scene setup ─────────────────────────────────────────────────────────────

fn insert_run(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(Run(RunState::new(config.clone())));
}

/// Spawns the player and the bridge. Both are placed properly by start_run.
fn spawn_actors(mut commands: Commands, mut wiring: ResMut<SceneWiring>, config: Res<GameConfig>) {
    let player = commands
        .spawn((
            GameSceneEntity,
            Player,
            Sprite::from_color(PLAYER_COLOR, config.player_size()),
            Transform::default(),
        ))
        .id();

    let mut bridge_sprite = None;
    let bridge = commands
        .spawn((
            GameSceneEntity,
            BridgePivot,
            Transform::default(),
            Visibility::Hidden,
        ))
        .with_children(|pivot| {
            bridge_sprite = Some(
                pivot
                    .spawn((
                        BridgeSprite,
                        Sprite::from_color(BRIDGE_COLOR, Vec2::new(config.bridge_width, 0.0)),
                        Transform::default(),
                    ))
                    .id(),
            );
        })
        .id();

    wiring.player = Some(player);
    wiring.bridge = Some(bridge);
    wiring.bridge_sprite = bridge_sprite;
}

/// Starts the first attempt of the scene.
fn start_run(
    mut commands: Commands,
    mut run: ResMut<Run>,
    mut controller: ResMut<Controller>,
    mut timers: ResMut<BridgeTimers>,
    wiring: Res<SceneWiring>,
) {
    if wiring.player.is_none() || wiring.bridge.is_none() {
        warn!("Game scene is missing its player or bridge; playing on regardless");
    }

    let mut rng = rand::thread_rng();
    let mut stage = CommandStage::new(&mut commands, &wiring);
    run.initialize(&mut stage, &mut rng);
    controller.reset();
    timers.clear();

    info!(
        "Run started: gap {:?}, best score {}",
        run.gap(),
        run.session.best_score
    );
}

/// Leaves nothing behind when the scene is left. Platforms belong to RunState
/// so they go through clear_all; everything else carries GameSceneEntity.
fn teardown_game_scene(
    mut commands: Commands,
    mut run: ResMut<Run>,
    mut controller: ResMut<Controller>,
    mut timers: ResMut<BridgeTimers>,
    mut wiring: ResMut<SceneWiring>,
    scene_entities: Query<Entity, With<GameSceneEntity>>,
) {
    let mut stage = CommandStage::new(&mut commands, &wiring);
    run.clear_all(&mut stage);
    run.reset_bridge();
    controller.reset();
    timers.clear();

    for entity in scene_entities.iter() {
        commands.entity(entity).despawn();
    }
    *wiring = SceneWiring::default();
}

// ── Input ───────────────────────────────────────────────────────────────────

/// Maps mouse, touch and the space bar onto Press/Release.
///
/// Presses that land on a UI button are left to the button; otherwise clicking
/// "Restart" would also start growing the next bridge.
fn pointer_input_system(
    mut commands: Commands,
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    touches: Res<Touches>,
    buttons: Query<&Interaction, With<Button>>,
    mut run: ResMut<Run>,
    audio: Option<Res<GameAudio>>,
) {
    let pressed = mouse.just_pressed(MouseButton::Left)
        || keys.just_pressed(KeyCode::Space)
        || touches.any_just_pressed();
    let released = mouse.just_released(MouseButton::Left)
        || keys.just_released(KeyCode::Space)
        || touches.any_just_released();

    if pressed {
        let over_button = buttons.iter().any(|i| *i != Interaction::None);
        if !over_button {
            // The menu normally starts the music; this covers launching
            // straight into the game scene or coming back after it stopped.
            start_background_music(&mut commands, audio.as_deref(), &mut run.session);
            commands.trigger(BridgeSignal(BridgeEvent::Press));
        }
    }
    if released {
        commands.trigger(BridgeSignal(BridgeEvent::Release));
    }
}

// ── State machine ───────────────────────────────────────────────────────────

/// Feeds engine signals into the bridge state machine and broadcasts the
/// resulting effects to whichever plugin handles them.
fn on_bridge_signal(
    signal: On<BridgeSignal>,
    mut commands: Commands,
    mut run: ResMut<Run>,
    mut controller: ResMut<Controller>,
    wiring: Option<Res<SceneWiring>>,
) {
    let wiring = wiring.map(|w| *w).unwrap_or_default();
    let mut rng = rand::thread_rng();
    let before = controller.phase();

    let effects = {
        let mut stage = CommandStage::new(&mut commands, &wiring);
        controller.handle(signal.0, &mut run.0, &mut stage, &mut rng)
    };

    let after = controller.phase();
    if after != before {
        debug!("Bridge {:?} --{:?}--> {:?}", before, signal.0, after);
    }
    for effect in &effects {
        match effect {
            Effect::Award(points) => info!("Crossed! +{} (score {})", points, run.session.score),
            Effect::EndRun => info!(
                "Run over: score {}, best {}",
                run.session.score, run.session.best_score
            ),
            _ => {}
        }
    }

    for effect in effects {
        commands.trigger(EngineEffect(effect));
    }
}

// ── Visuals ─────────────────────────────────────────────────────────────────

/// Mirrors the bridge geometry from RunState onto the pivot and its sprite.
///
/// Rotation is left alone while a RotateTween is animating the pivot.
fn sync_bridge_visual(
    run: Res<Run>,
    config: Res<GameConfig>,
    mut pivots: Query<
        (&mut Transform, &mut Visibility, Has<RotateTween>),
        (With<BridgePivot>, Without<BridgeSprite>),
    >,
    mut sprites: Query<(&mut Transform, &mut Sprite), (With<BridgeSprite>, Without<BridgePivot>)>,
) {
    let bridge = run.bridge;

    if let Ok((mut transform, mut visibility, rotating)) = pivots.single_mut() {
        transform.translation = bridge.position.extend(1.5);
        if !rotating {
            transform.rotation = Quat::from_rotation_z(bridge.angle.to_radians());
        }
        *visibility = if bridge.active {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    if let Ok((mut transform, mut sprite)) = sprites.single_mut() {
        sprite.custom_size = Some(Vec2::new(config.bridge_width, bridge.height));
        // Offset by half the length so the sprite's bottom sits on the pivot
        transform.translation.y = bridge.height / 2.0;
    }
}


/// The gameplay scene run headless: real plugins, real observers, keyboard
/// input pushed straight into `ButtonInput` and a fixed 20 ms frame.
#[cfg(test)]
mod scene_tests {
    use super::*;
    use crate::bridge::BridgePhase;
    use crate::camera::CameraPlugin;
    use crate::components::{Indicator, Platform};
    use crate::game_over::{GameOverAction, GameOverPlugin};
    use crate::hud::HudPlugin;
    use crate::screens::ScreensPlugin;
    use crate::tween::TweenPlugin;
    use bevy::ecs::query::QueryFilter;
    use bevy::state::app::StatesPlugin;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    /// Frames to wait for any one phase before giving up.
    const FRAME_CAP: usize = 500;

    /// Gap range collapsed to 300, so every gap is exactly 100 edge to edge.
    fn fixed_gap_config() -> GameConfig {
        GameConfig {
            min_gap: 300.0,
            max_gap: 300.0,
            ..GameConfig::default()
        }
    }

    fn game_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(20)))
            .insert_resource(fixed_gap_config())
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<Touches>()
            .add_plugins((
                ScreensPlugin,
                TweenPlugin,
                CameraPlugin,
                HudPlugin,
                GameplayPlugin,
                GameOverPlugin,
            ));
        app.update();
        app.world_mut()
            .resource_mut::<NextState<Screen>>()
            .set(Screen::Game);
        app.update();
        app
    }

    fn count<F: QueryFilter>(app: &mut App) -> usize {
        app.world_mut()
            .query_filtered::<Entity, F>()
            .iter(app.world())
            .count()
    }

    fn phase(app: &App) -> BridgePhase {
        app.world().resource::<Controller>().phase()
    }

    fn wiring(app: &App) -> SceneWiring {
        *app.world().resource::<SceneWiring>()
    }

    fn press_space(app: &mut App) {
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Space);
        app.update();
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
    }

    fn release_space(app: &mut App) {
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .release(KeyCode::Space);
        app.update();
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
    }

    /// Holds space until the bridge is at least `height` long, lets go, and
    /// runs frames until the crossing has been resolved one way or the other.
    fn build_bridge(app: &mut App, height: f32) {
        press_space(app);
        let mut frames = 0;
        while app.world().resource::<Run>().bridge.height < height {
            app.update();
            frames += 1;
            assert!(frames < FRAME_CAP, "bridge never reached {height}");
        }
        release_space(app);

        let mut frames = 0;
        while !matches!(phase(app), BridgePhase::Idle | BridgePhase::Ended) {
            app.update();
            frames += 1;
            assert!(frames < FRAME_CAP, "stuck in {:?}", phase(app));
        }
    }

    fn click(app: &mut App, action: GameOverAction) -> Entity {
        let button = app
            .world_mut()
            .query::<(Entity, &GameOverAction)>()
            .iter(app.world())
            .find(|(_, a)| **a == action)
            .map(|(entity, _)| entity)
            .unwrap();
        app.world_mut()
            .entity_mut(button)
            .insert(Interaction::Pressed);
        app.update();
        button
    }

    fn text(app: &App, entity: Option<Entity>) -> String {
        app.world().get::<Text>(entity.unwrap()).unwrap().0.clone()
    }

    fn visibility(app: &App, entity: Option<Entity>) -> Visibility {
        *app.world().get::<Visibility>(entity.unwrap()).unwrap()
    }

    #[test]
    fn test_scene_starts_with_two_platforms_and_hidden_panel() {
        let mut app = game_app();
        let wiring = wiring(&app);

        assert_eq!(count::<With<Platform>>(&mut app), 2);
        assert_eq!(phase(&app), BridgePhase::Idle);
        assert_eq!(visibility(&app, wiring.game_over_panel), Visibility::Hidden);

        let run = &app.world().resource::<Run>().0;
        let current = run.current.unwrap();
        let indicator_parent = app
            .world()
            .get::<ChildOf>(current.indicator)
            .map(|child_of| child_of.parent());
        assert_eq!(indicator_parent, Some(current.handle));
        assert!(app.world().get::<Indicator>(current.indicator).is_some());
    }

    #[test]
    fn test_crossing_through_the_engine_scores_and_advances() {
        let mut app = game_app();
        let wiring = wiring(&app);

        build_bridge(&mut app, 150.0);

        let run = &app.world().resource::<Run>().0;
        assert_eq!(phase(&app), BridgePhase::Idle);
        assert_eq!(run.session.score, 1);
        assert!(!run.bridge.active);
        assert_eq!(run.current.unwrap().center.x, 300.0);
        let player = app.world().get::<Transform>(wiring.player.unwrap()).unwrap();
        assert_eq!(player.translation.x, 215.0);
        assert_eq!(text(&app, wiring.score_label), "1");
        assert_eq!(count::<With<Platform>>(&mut app), 3);
    }

    #[test]
    fn test_short_bridge_shows_game_over() {
        let mut app = game_app();
        let wiring = wiring(&app);
        build_bridge(&mut app, 150.0);

        build_bridge(&mut app, 0.0);

        assert_eq!(phase(&app), BridgePhase::Ended);
        assert_eq!(text(&app, wiring.current_score_label), "Current Score: 1");
        assert_eq!(text(&app, wiring.best_score_label), "Best Score: 1");
        assert_eq!(visibility(&app, wiring.game_over_panel), Visibility::Inherited);
        assert_eq!(visibility(&app, wiring.player), Visibility::Hidden);
        assert_eq!(visibility(&app, wiring.score_label), Visibility::Hidden);

        // presses are dead while the panel is up
        press_space(&mut app);
        release_space(&mut app);
        assert_eq!(phase(&app), BridgePhase::Ended);
    }

    #[test]
    fn test_restart_rebuilds_the_run() {
        let mut app = game_app();
        let wiring = wiring(&app);
        build_bridge(&mut app, 150.0);
        build_bridge(&mut app, 0.0);

        let button = click(&mut app, GameOverAction::Restart);
        app.world_mut().entity_mut(button).insert(Interaction::None);
        app.update();

        let run = &app.world().resource::<Run>().0;
        assert_eq!(phase(&app), BridgePhase::Idle);
        assert_eq!(run.session.score, 0);
        assert_eq!(run.session.best_score, 1);
        assert_eq!(run.current.unwrap().center, Vec2::new(0.0, -100.0));
        assert_eq!(count::<With<Platform>>(&mut app), 2);
        assert_eq!(visibility(&app, wiring.game_over_panel), Visibility::Hidden);
        assert_eq!(visibility(&app, wiring.player), Visibility::Inherited);
        assert_eq!(visibility(&app, wiring.score_label), Visibility::Inherited);
        assert_eq!(text(&app, wiring.score_label), "0");
        let player = app.world().get::<Transform>(wiring.player.unwrap()).unwrap();
        assert_eq!(player.translation.truncate(), Vec2::new(0.0, -65.0));

        // the camera snapped home and has only just started following again
        let camera_x = app
            .world_mut()
            .query_filtered::<&Transform, With<Camera2d>>()
            .single(app.world())
            .unwrap()
            .translation
            .x;
        assert!(camera_x < 50.0, "camera at {camera_x}");

        build_bridge(&mut app, 150.0);
        assert_eq!(app.world().resource::<Run>().session.score, 1);
    }

    #[test]
    fn test_buttons_are_inert_mid_run_and_swallow_presses() {
        let mut app = game_app();
        build_bridge(&mut app, 150.0);

        click(&mut app, GameOverAction::Restart);
        assert_eq!(app.world().resource::<Run>().session.score, 1);
        assert_eq!(count::<With<Platform>>(&mut app), 3);

        // the button is still held down, so this press belongs to the UI
        press_space(&mut app);
        assert_eq!(phase(&app), BridgePhase::Idle);
        assert!(!app.world().resource::<Run>().bridge.active);

        click(&mut app, GameOverAction::MainMenu);
        app.update();
        assert_eq!(*app.world().resource::<State<Screen>>().get(), Screen::Game);
    }

    #[test]
    fn test_main_menu_button_tears_the_scene_down() {
        let mut app = game_app();
        build_bridge(&mut app, 0.0);
        assert_eq!(phase(&app), BridgePhase::Ended);

        click(&mut app, GameOverAction::MainMenu);
        app.update();

        assert_eq!(
            *app.world().resource::<State<Screen>>().get(),
            Screen::MainMenu
        );
        assert_eq!(count::<With<Platform>>(&mut app), 0);
        assert_eq!(count::<With<GameSceneEntity>>(&mut app), 0);
        assert!(!app.world().resource::<Run>().session.background_music_played);
    }
}
