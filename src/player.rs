//! Player locomotion and the per-tick proximity detector.

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;

use crate::agent::{ARENA_HALF_EXTENT, Agent};
use crate::dialogue::DialogueSession;
use crate::effects::FloatingCue;

/// Agents closer than this to the player can be interacted with.
pub const INTERACT_RADIUS: f32 = 3.0;

const LOOK_SENSITIVITY: f32 = 0.002;
/// Arrow keys turn by a fixed step per tick, expressed as a synthetic mouse
/// delta so both paths share one sensitivity.
const ARROW_LOOK_DELTA: f32 = 0.05 / LOOK_SENSITIVITY;

/// Normalized per-tick input, collected from the keyboard/mouse when those
/// resources exist. Headless tests write this directly.
#[derive(Resource, Debug, Clone, Default)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    /// Accumulated look delta for this tick, in pixels.
    pub look_delta: Vec2,
    /// Interact command edge (E).
    pub interact: bool,
    /// Close-dialogue command edge (Escape).
    pub close: bool,
    /// Dance held (Space).
    pub dance: bool,
}

#[derive(Component, Debug)]
pub struct Player {
    pub yaw: f32,
    pub speed: f32,
    /// While dancing, directional input is ignored.
    pub dancing: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            speed: 0.1,
            dancing: false,
        }
    }
}

/// Nearest agent within [`INTERACT_RADIUS`], recomputed from scratch every
/// tick. Ties go to the first agent encountered in iteration order.
#[derive(Resource, Debug, Default)]
pub struct NearbyAgent(pub Option<Entity>);

/// Interaction affordance string for the host view, e.g.
/// "Press E to talk to Gary Xia". `None` while a dialogue is open or nobody
/// is near.
#[derive(Resource, Debug, Default)]
pub struct InteractionHint(pub Option<String>);

pub(crate) fn collect_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mouse: Option<Res<AccumulatedMouseMotion>>,
    mut input: ResMut<InputState>,
) {
    // Without an input plugin (headless tests) the state is driven externally.
    let Some(keys) = keys else {
        return;
    };

    input.forward = keys.pressed(KeyCode::KeyW);
    input.back = keys.pressed(KeyCode::KeyS);
    input.left = keys.pressed(KeyCode::KeyA);
    input.right = keys.pressed(KeyCode::KeyD);
    input.interact = keys.just_pressed(KeyCode::KeyE);
    input.close = keys.just_pressed(KeyCode::Escape);
    input.dance = keys.pressed(KeyCode::Space);

    let mut look = mouse.map(|m| m.delta).unwrap_or(Vec2::ZERO);
    if keys.pressed(KeyCode::ArrowLeft) {
        look.x -= ARROW_LOOK_DELTA;
    }
    if keys.pressed(KeyCode::ArrowRight) {
        look.x += ARROW_LOOK_DELTA;
    }
    input.look_delta = look;
}

pub(crate) fn move_player(
    input: Res<InputState>,
    session: Res<DialogueSession>,
    mut players: Query<(&mut Player, &mut Transform)>,
    mut commands: Commands,
) {
    let Ok((mut player, mut transform)) = players.single_mut() else {
        return;
    };
    let dialogue_open = session.is_open();

    if !dialogue_open {
        player.yaw -= input.look_delta.x * LOOK_SENSITIVITY;
        let was_dancing = player.dancing;
        player.dancing = input.dance;
        if player.dancing && !was_dancing {
            commands.trigger(FloatingCue::new("\u{1f483}\u{1f57a}", transform.translation));
        }
    }
    transform.rotation = Quat::from_rotation_y(player.yaw);

    if player.dancing || dialogue_open {
        return;
    }

    let mut velocity = Vec3::ZERO;
    if input.forward {
        velocity.z += player.speed;
    }
    if input.back {
        velocity.z -= player.speed;
    }
    if input.left {
        velocity.x -= player.speed;
    }
    if input.right {
        velocity.x += player.speed;
    }

    // Move in camera space, flattened to the floor plane.
    let mut forward = *transform.forward();
    forward.y = 0.0;
    let forward = forward.normalize_or_zero();
    let mut right = *transform.right();
    right.y = 0.0;
    let right = right.normalize_or_zero();

    transform.translation += forward * velocity.z + right * velocity.x;
    transform.translation.x = transform
        .translation
        .x
        .clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
    transform.translation.z = transform
        .translation
        .z
        .clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
}

pub(crate) fn detect_nearby(
    players: Query<&Transform, With<Player>>,
    agents: Query<(Entity, &Agent, &Transform), Without<Player>>,
    session: Res<DialogueSession>,
    mut nearby: ResMut<NearbyAgent>,
    mut hint: ResMut<InteractionHint>,
) {
    nearby.0 = None;
    hint.0 = None;
    let Ok(player_transform) = players.single() else {
        return;
    };

    let mut best = f32::INFINITY;
    let mut best_name = None;
    for (entity, agent, transform) in agents.iter() {
        let distance = player_transform.translation.distance(transform.translation);
        if distance < INTERACT_RADIUS && distance < best {
            best = distance;
            nearby.0 = Some(entity);
            best_name = Some(agent.profile.name.clone());
        }
    }

    if !session.is_open() {
        if let Some(name) = best_name {
            hint.0 = Some(format!("Press E to talk to {name}"));
        }
    }
}

/// Runs last in the tick: command edges and look deltas are one-shot.
pub(crate) fn reset_input_edges(mut input: ResMut<InputState>) {
    input.interact = false;
    input.close = false;
    input.look_delta = Vec2::ZERO;
}
