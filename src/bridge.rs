// bridge.rs - The bridge state machine.
//
// The whole crossing is a straight line of phases driven by a handful of
// events: a press, a release, timer ticks and "animation finished" callbacks.
//
//   Idle --Press--> Growing --Release--> Falling --RotationComplete--> Resolving
//     ^                                                                  |
//     +------------------------ MoveComplete (landed) -------------------+
//                               MoveComplete (fell)   ---> Ended
//
// `transition` is a pure function from (phase, event) to (phase, effects). It
// never touches the world. `BridgeController::handle` runs it, applies the
// effects that only concern gameplay state, and hands every effect back so
// the engine side can start timers, tweens and sounds.

use std::time::Duration;

use bevy::math::Vec2;
use rand::Rng;

use crate::run_state::RunState;
use crate::stage::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The bridge spans the gap; the player walks across.
    Landed,
    /// Too short or too long; the player drops.
    Fell,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BridgePhase {
    /// Bridge folded away, waiting for a press.
    #[default]
    Idle,
    /// Press held; the growth timer is running.
    Growing,
    /// Released; waiting for the drop delay and then the rotation.
    Falling,
    /// Bridge is flat; the player is moving towards `target`.
    Resolving { verdict: Verdict, target: Vec2 },
    /// The run is over until something calls reset.
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeEvent {
    Press,
    Release,
    GrowthTick,
    /// The post-release delay elapsed.
    DropDue,
    RotationComplete,
    MoveComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    BridgeFall,
    GameOver,
}

/// Everything a transition can ask for.
///
/// Effects in the first group change gameplay state and are applied by
/// `BridgeController::handle`. The rest are requests to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    // ── gameplay state ─────────────────────────────────────────────────────
    ArmBridge,
    Grow(f32),
    SettleBridge { angle: f32 },
    PlacePlayer(Vec2),
    Award(u32),
    Advance,
    EndRun,

    // ── engine requests ────────────────────────────────────────────────────
    StartGrowth { interval: Duration },
    StopGrowth,
    ScheduleDrop { delay: Duration },
    PlaySound(Sound),
    RotateBridge { angle: f32, duration: Duration },
    MovePlayer { target: Vec2, duration: Duration },
    ScoreChanged(u32),
    ShowGameOver { score: u32, best: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub phase: BridgePhase,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(phase: BridgePhase) -> Self {
        Transition {
            phase,
            effects: Vec::new(),
        }
    }

    fn to(phase: BridgePhase, effects: Vec<Effect>) -> Self {
        Transition { phase, effects }
    }
}

/// Works out the next phase and the effects of `event`, reading but never
/// mutating the run.
///
/// Events that make no sense in the current phase (a release while idle, a
/// stray tick after the timer was cancelled, a press after game over) leave
/// the phase unchanged and produce no effects.
pub fn transition<H>(phase: BridgePhase, event: BridgeEvent, run: &RunState<H>) -> Transition
where
    H: Copy + PartialEq + std::fmt::Debug,
{
    let config = &run.config;

    match (phase, event) {
        (BridgePhase::Idle, BridgeEvent::Press) if !run.bridge.active => Transition::to(
            BridgePhase::Growing,
            vec![
                Effect::ArmBridge,
                Effect::StartGrowth {
                    interval: config.growth_interval(),
                },
            ],
        ),

        (BridgePhase::Growing, BridgeEvent::GrowthTick) => {
            Transition::to(BridgePhase::Growing, vec![Effect::Grow(config.growth_step)])
        }

        (BridgePhase::Growing, BridgeEvent::Release) if run.bridge.active => Transition::to(
            BridgePhase::Falling,
            vec![
                Effect::StopGrowth,
                Effect::ScheduleDrop {
                    delay: config.drop_delay(),
                },
            ],
        ),

        (BridgePhase::Falling, BridgeEvent::DropDue) => Transition::to(
            BridgePhase::Falling,
            vec![
                Effect::PlaySound(Sound::BridgeFall),
                Effect::RotateBridge {
                    angle: config.fallen_angle,
                    duration: config.rotation_duration(),
                },
            ],
        ),

        (BridgePhase::Falling, BridgeEvent::RotationComplete) => {
            let (verdict, target) = if run.bridge_spans_gap() {
                (Verdict::Landed, run.landing_target())
            } else {
                (Verdict::Fell, run.fall_target())
            };
            Transition::to(
                BridgePhase::Resolving { verdict, target },
                vec![
                    Effect::SettleBridge {
                        angle: config.fallen_angle,
                    },
                    Effect::MovePlayer {
                        target,
                        duration: config.move_duration(),
                    },
                ],
            )
        }

        (
            BridgePhase::Resolving {
                verdict: Verdict::Landed,
                target,
            },
            BridgeEvent::MoveComplete,
        ) => {
            let points = if run.precise_landing() {
                config.bonus_points
            } else {
                config.base_points
            };
            let score = run.session.score.saturating_add(points);
            Transition::to(
                BridgePhase::Idle,
                vec![
                    Effect::PlacePlayer(target),
                    Effect::Award(points),
                    Effect::ScoreChanged(score),
                    Effect::Advance,
                ],
            )
        }

        (
            BridgePhase::Resolving {
                verdict: Verdict::Fell,
                target,
            },
            BridgeEvent::MoveComplete,
        ) => {
            let score = run.session.score;
            let best = run.session.best_score.max(score);
            Transition::to(
                BridgePhase::Ended,
                vec![
                    Effect::PlacePlayer(target),
                    Effect::EndRun,
                    Effect::PlaySound(Sound::GameOver),
                    Effect::ShowGameOver { score, best },
                ],
            )
        }

        (phase, _) => Transition::stay(phase),
    }
}

/// Owns the current phase and applies transitions to a run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BridgeController {
    phase: BridgePhase,
}

impl BridgeController {
    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase == BridgePhase::Ended
    }

    /// Feeds one event through the state machine.
    ///
    /// Gameplay effects are applied to `run` (growing the bridge, scoring,
    /// advancing to the next platform). The returned list contains every
    /// effect, in order, for the engine layer to act on.
    pub fn handle<H, S, R>(
        &mut self,
        event: BridgeEvent,
        run: &mut RunState<H>,
        stage: &mut S,
        rng: &mut R,
    ) -> Vec<Effect>
    where
        H: Copy + PartialEq + std::fmt::Debug,
        S: Stage<Handle = H>,
        R: Rng,
    {
        let Transition { phase, effects } = transition(self.phase, event, run);
        self.phase = phase;

        for effect in &effects {
            match *effect {
                Effect::ArmBridge => run.arm_bridge(),
                Effect::Grow(amount) => run.grow_bridge(amount),
                Effect::SettleBridge { angle } => run.bridge.angle = angle,
                Effect::PlacePlayer(position) => run.player = position,
                Effect::Award(points) => run.session.award(points),
                Effect::Advance => run.advance(stage, rng),
                Effect::EndRun => {
                    run.session.record_best();
                    run.bridge.active = false;
                }
                _ => {}
            }
        }

        effects
    }

    /// Back to Idle after the run was re-initialised from outside.
    pub fn reset(&mut self) -> Vec<Effect> {
        self.phase = BridgePhase::Idle;
        vec![Effect::StopGrowth]
    }
}
