// stage.rs - The scene-graph capability the gameplay core is written against.
//
// RunState never spawns sprites itself. It asks a Stage to do it and keeps
// whatever handle comes back. In the game the Stage is backed by Bevy
// Commands and the handles are Entities; in tests it is an in-memory fake
// and the handles are plain integers.

use bevy::prelude::*;

use crate::components::{Indicator, MoveTween, Platform, SceneWiring};

/// What the core needs from the world it lives in.
pub trait Stage {
    /// Opaque reference to something the stage created.
    type Handle: Copy + PartialEq + std::fmt::Debug;

    fn spawn_platform(&mut self, center: Vec2, size: Vec2) -> Self::Handle;

    /// Attaches an indicator to `platform`; `offset` is relative to the platform center.
    fn spawn_indicator(&mut self, platform: Self::Handle, offset: Vec2, size: Vec2) -> Self::Handle;

    fn despawn(&mut self, handle: Self::Handle);

    /// Teleports the player and makes it visible again.
    fn place_player(&mut self, position: Vec2);

    fn hide_game_over(&mut self);
}

const PLATFORM_COLOR: Color = Color::srgb(0.15, 0.15, 0.18);
const INDICATOR_COLOR: Color = Color::srgb(0.9, 0.2, 0.2);

/// Stage backed by deferred Bevy commands.
///
/// Spawning through Commands hands back a valid Entity id straight away even
/// though the entity only materialises when the command queue is applied, so
/// the core can store handles immediately.
pub struct CommandStage<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub wiring: &'a SceneWiring,
}

impl<'a, 'w, 's> CommandStage<'a, 'w, 's> {
    pub fn new(commands: &'a mut Commands<'w, 's>, wiring: &'a SceneWiring) -> Self {
        Self { commands, wiring }
    }
}

impl Stage for CommandStage<'_, '_, '_> {
    type Handle = Entity;

    fn spawn_platform(&mut self, center: Vec2, size: Vec2) -> Entity {
        self.commands
            .spawn((
                Platform,
                Sprite::from_color(PLATFORM_COLOR, size),
                Transform::from_translation(center.extend(0.0)),
            ))
            .id()
    }

    fn spawn_indicator(&mut self, platform: Entity, offset: Vec2, size: Vec2) -> Entity {
        let indicator = self
            .commands
            .spawn((
                Indicator,
                Sprite::from_color(INDICATOR_COLOR, size),
                // z = 1 keeps the marker drawn above its platform
                Transform::from_translation(offset.extend(1.0)),
            ))
            .id();
        self.commands.entity(platform).add_child(indicator);
        indicator
    }

    fn despawn(&mut self, handle: Entity) {
        // Platforms can already be gone if the whole scene was torn down.
        if let Ok(mut entity) = self.commands.get_entity(handle) {
            entity.despawn();
        }
    }

    fn place_player(&mut self, position: Vec2) {
        let Some(player) = self.wiring.player else {
            warn!("No player in the scene; cannot place it at {:?}", position);
            return;
        };
        if let Ok(mut entity) = self.commands.get_entity(player) {
            entity.remove::<MoveTween>().insert((
                Transform::from_translation(position.extend(2.0)),
                Visibility::Inherited,
            ));
        }
    }

    fn hide_game_over(&mut self) {
        match self.wiring.game_over_panel {
            Some(panel) => {
                if let Ok(mut entity) = self.commands.get_entity(panel) {
                    entity.insert(Visibility::Hidden);
                }
            }
            None => debug!("No game over panel to hide"),
        }
    }
}

/// In-memory stage for tests. Handles are sequential integers; every call is
/// recorded so tests can assert on what the core asked for.
#[cfg(test)]
pub mod fake {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq)]
    pub struct FakeNode {
        pub parent: Option<u32>,
        pub position: Vec2,
        pub size: Vec2,
    }

    #[derive(Debug, Default)]
    pub struct FakeStage {
        next_handle: u32,
        pub nodes: BTreeMap<u32, FakeNode>,
        pub player: Option<Vec2>,
        pub game_over_hidden: u32,
    }

    impl FakeStage {
        fn alloc(&mut self, node: FakeNode) -> u32 {
            let handle = self.next_handle;
            self.next_handle += 1;
            self.nodes.insert(handle, node);
            handle
        }

        pub fn live(&self) -> usize {
            self.nodes.len()
        }
    }

    impl Stage for FakeStage {
        type Handle = u32;

        fn spawn_platform(&mut self, center: Vec2, size: Vec2) -> u32 {
            self.alloc(FakeNode {
                parent: None,
                position: center,
                size,
            })
        }

        fn spawn_indicator(&mut self, platform: u32, offset: Vec2, size: Vec2) -> u32 {
            self.alloc(FakeNode {
                parent: Some(platform),
                position: offset,
                size,
            })
        }

        fn despawn(&mut self, handle: u32) {
            self.nodes.remove(&handle);
            self.nodes.retain(|_, node| node.parent != Some(handle));
        }

        fn place_player(&mut self, position: Vec2) {
            self.player = Some(position);
        }

        fn hide_game_over(&mut self) {
            self.game_over_hidden += 1;
        }
    }
}
