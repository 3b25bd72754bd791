// run_state.rs - Platforms, bridge geometry, player position and score for one run.

use bevy::math::Vec2;
use rand::Rng;

use crate::config::GameConfig;
use crate::session::RunSession;
use crate::stage::Stage;

/// A platform the core has asked the stage to create, plus the geometry the
/// rules need so we never have to read it back from the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedPlatform<H> {
    pub handle: H,
    pub indicator: H,
    pub center: Vec2,
    pub size: Vec2,
}

impl<H> PlacedPlatform<H> {
    pub fn left(&self) -> f32 {
        self.center.x - self.size.x / 2.0
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.size.x / 2.0
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.size.y / 2.0
    }

    /// World x of the indicator, which always sits on the far edge.
    pub fn indicator_x(&self) -> f32 {
        self.center.x + self.size.x / 2.0
    }
}

/// The one bridge of the session.
///
/// `position` is the base of the bridge (the pivot it rotates around) and
/// `height` is its length. An upright bridge has angle 0; a fallen one -90.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bridge {
    pub position: Vec2,
    pub height: f32,
    pub angle: f32,
    pub active: bool,
}

impl Default for Bridge {
    fn default() -> Self {
        Bridge {
            position: Vec2::ZERO,
            height: 0.0,
            angle: 0.0,
            active: false,
        }
    }
}

impl Bridge {
    /// x coordinate of the bridge's free end once it lies flat.
    pub fn tip_x(&self) -> f32 {
        self.position.x + self.height
    }
}

/// Gameplay state for the current run.
///
/// `current` and `next` are None only before the first `initialize`.
/// `platforms` and `indicators` keep every spawned handle in spawn order so a
/// restart can tear them all down.
#[derive(Debug)]
pub struct RunState<H> {
    pub config: GameConfig,
    pub session: RunSession,
    pub current: Option<PlacedPlatform<H>>,
    pub next: Option<PlacedPlatform<H>>,
    pub platforms: Vec<H>,
    pub indicators: Vec<H>,
    pub bridge: Bridge,
    pub player: Vec2,
}

impl<H: Copy + PartialEq + std::fmt::Debug> RunState<H> {
    pub fn new(config: GameConfig) -> Self {
        RunState {
            config,
            session: RunSession::default(),
            current: None,
            next: None,
            platforms: Vec::new(),
            indicators: Vec::new(),
            bridge: Bridge::default(),
            player: Vec2::ZERO,
        }
    }

    /// Starts a fresh attempt: zero score, a new pair of platforms, the player
    /// standing on the first one and a folded-away bridge.
    ///
    /// Startup and restart both come through here.
    pub fn initialize<S, R>(&mut self, stage: &mut S, rng: &mut R)
    where
        S: Stage<Handle = H>,
        R: Rng,
    {
        self.place_first_platform(stage);
        self.spawn_next(stage, rng);
        self.finish_setup(stage);
    }

    /// `initialize` with the first gap chosen by the caller.
    pub fn initialize_with_gap<S: Stage<Handle = H>>(&mut self, stage: &mut S, gap: f32) {
        self.place_first_platform(stage);
        self.spawn_next_at_gap(stage, gap);
        self.finish_setup(stage);
    }

    fn place_first_platform<S: Stage<Handle = H>>(&mut self, stage: &mut S) {
        self.session.begin_attempt();
        self.clear_all(stage);

        let first = self.spawn_platform(stage, self.config.first_platform());
        self.current = Some(first);

        let player_size = self.config.player_size();
        self.player = Vec2::new(first.center.x, first.top() + player_size.y / 2.0);
        stage.place_player(self.player);
    }

    fn finish_setup<S: Stage<Handle = H>>(&mut self, stage: &mut S) {
        self.reset_bridge();
        stage.hide_game_over();
    }

    /// Creates a platform and its indicator and starts tracking both.
    pub fn spawn_platform<S: Stage<Handle = H>>(
        &mut self,
        stage: &mut S,
        center: Vec2,
    ) -> PlacedPlatform<H> {
        let size = self.config.platform_size();
        let indicator_size = self.config.indicator_size();

        let handle = stage.spawn_platform(center, size);
        self.platforms.push(handle);

        let offset = Vec2::new(size.x / 2.0, size.y / 2.0 + indicator_size.y / 2.0);
        let indicator = stage.spawn_indicator(handle, offset, indicator_size);
        self.indicators.push(indicator);

        PlacedPlatform {
            handle,
            indicator,
            center,
            size,
        }
    }

    /// Spawns the next platform a random distance to the right of the current one.
    pub fn spawn_next<S, R>(&mut self, stage: &mut S, rng: &mut R)
    where
        S: Stage<Handle = H>,
        R: Rng,
    {
        let gap = self.config.sample_gap(rng);
        self.spawn_next_at_gap(stage, gap);
    }

    /// Spawns the next platform exactly `distance` (center to center) to the
    /// right of the current one. Does nothing before `initialize`.
    pub fn spawn_next_at_gap<S: Stage<Handle = H>>(&mut self, stage: &mut S, distance: f32) {
        let Some(current) = self.current else {
            return;
        };
        let center = Vec2::new(current.center.x + distance, current.center.y);
        self.next = Some(self.spawn_platform(stage, center));
    }

    /// Moves on after a successful crossing.
    pub fn advance<S, R>(&mut self, stage: &mut S, rng: &mut R)
    where
        S: Stage<Handle = H>,
        R: Rng,
    {
        if self.promote_next() {
            self.spawn_next(stage, rng);
        }
    }

    pub fn advance_with_gap<S: Stage<Handle = H>>(&mut self, stage: &mut S, distance: f32) {
        if self.promote_next() {
            self.spawn_next_at_gap(stage, distance);
        }
    }

    /// Next becomes current and the bridge is folded away. False (and no
    /// change) when there is no next platform yet.
    fn promote_next(&mut self) -> bool {
        if self.next.is_none() {
            return false;
        }
        self.current = self.next.take();
        self.reset_bridge();
        true
    }

    /// Despawns every tracked indicator and platform.
    /// Indicators go first so no handle outlives the parent that owns it.
    pub fn clear_all<S: Stage<Handle = H>>(&mut self, stage: &mut S) {
        for indicator in self.indicators.drain(..) {
            stage.despawn(indicator);
        }
        for platform in self.platforms.drain(..) {
            stage.despawn(platform);
        }
        self.current = None;
        self.next = None;
    }

    pub fn reset_bridge(&mut self) {
        self.bridge = Bridge::default();
    }

    /// Stands the bridge up, zero length, flush with the current platform's right edge.
    pub fn arm_bridge(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        self.bridge = Bridge {
            position: Vec2::new(current.right(), current.top()),
            height: 0.0,
            angle: 0.0,
            active: true,
        };
    }

    pub fn grow_bridge(&mut self, amount: f32) {
        self.bridge.height += amount;
    }

    /// Horizontal distance between the current platform's right edge and the
    /// next platform's left edge.
    pub fn gap(&self) -> Option<f32> {
        let current = self.current?;
        let next = self.next?;
        Some(next.left() - current.right())
    }

    /// True when the bridge reaches the next platform without overshooting it.
    /// A bridge up to `length_tolerance` short still counts.
    pub fn bridge_spans_gap(&self) -> bool {
        let (Some(gap), Some(next)) = (self.gap(), self.next) else {
            return false;
        };
        let length = self.bridge.height;
        length + self.config.length_tolerance >= gap && length <= gap + next.size.x
    }

    /// True when the bridge tip landed within `bonus_radius` of the next indicator.
    pub fn precise_landing(&self) -> bool {
        let Some(next) = self.next else {
            return false;
        };
        (self.bridge.tip_x() - next.indicator_x()).abs() <= self.config.bonus_radius
    }

    /// Where the player walks to on a good bridge: just onto the next platform.
    pub fn landing_target(&self) -> Vec2 {
        match self.next {
            Some(next) => Vec2::new(
                next.left() + self.config.player_size().x / 2.0,
                self.player.y,
            ),
            None => self.player,
        }
    }

    /// Where the player ends up on a bad bridge.
    pub fn fall_target(&self) -> Vec2 {
        Vec2::new(self.player.x, self.player.y - self.config.fall_depth)
    }
}
