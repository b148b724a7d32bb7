//! Transient floating-text cues ("Oof!", music notes) spawned near agents.

use bevy::prelude::*;

const FLOATING_TEXT_SECS: f32 = 2.0;
const FLOATING_TEXT_RISE: f32 = 1.8;

/// Event fired whenever the simulation wants a short floating text shown at a
/// world position. Purely cosmetic.
#[derive(Event, Clone, Debug)]
pub struct FloatingCue {
    pub text: String,
    pub position: Vec3,
}

impl FloatingCue {
    pub fn new(text: impl Into<String>, position: Vec3) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }
}

/// A live floating-text entity; despawned when its timer runs out. The host
/// view is responsible for actually rendering the text at the transform.
#[derive(Component, Debug)]
pub struct FloatingText {
    pub text: String,
    pub ttl: Timer,
}

pub(crate) fn spawn_floating_text(trigger: On<FloatingCue>, mut commands: Commands) {
    let cue = trigger.event();
    debug!("floating text '{}' at {:?}", cue.text, cue.position);
    commands.spawn((
        FloatingText {
            text: cue.text.clone(),
            ttl: Timer::from_seconds(FLOATING_TEXT_SECS, TimerMode::Once),
        },
        Transform::from_translation(cue.position + Vec3::Y * FLOATING_TEXT_RISE),
    ));
}

pub(crate) fn expire_floating_text(
    time: Res<Time>,
    mut texts: Query<(Entity, &mut FloatingText)>,
    mut commands: Commands,
) {
    for (entity, mut text) in texts.iter_mut() {
        text.ttl.tick(time.delta());
        if text.ttl.finished() {
            commands.entity(entity).despawn();
        }
    }
}
