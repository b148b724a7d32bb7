//! Per-character movement and idle behaviour: wandering, spontaneous dancing,
//! random trips, and the conversing face-the-player override.

use std::f32::consts::{FRAC_PI_4, FRAC_PI_8, TAU};
use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::effects::FloatingCue;
use crate::player::Player;
use crate::rng::SimRng;

/// Half-extent of the square arena; wander targets and the player are clamped
/// to `[-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT]` on both horizontal axes.
pub const ARENA_HALF_EXTENT: f32 = 18.0;

/// Distance below which a wander target counts as reached.
pub const TARGET_EPSILON: f32 = 0.1;

/// Per-tick probability of a spontaneous trip.
pub const BASE_TRIP_CHANCE: f32 = 0.001;

const TRIP_POSE_SECS: f32 = 1.0;
const TRIP_COOLDOWN_SECS: f32 = 5.0;
const TRIP_POSE_HEIGHT: f32 = 0.3;

/// Per-tick probability of breaking into a dance.
const DANCE_CHANCE: f32 = 0.001;
const DANCE_SECS: f32 = 3.0;

const WALK_STEP: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// Regular coworker: wanders, dances, trips.
    Human,
    /// Hovering guide entity: bobs and spins in place, nothing else.
    Guide,
}

/// Identity and role-play traits for one character. This is the snapshot the
/// response generator receives; it never carries behaviour state.
#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub name: String,
    pub role: String,
    pub personality: String,
    pub quirk: String,
    /// Cosmetic appearance tag, e.g. a hair description. No semantic meaning.
    pub hair: String,
    pub kind: AgentKind,
}

impl AgentProfile {
    pub fn human(name: &str, role: &str, personality: &str, quirk: &str, hair: &str) -> Self {
        Self {
            name: name.to_string(),
            role: role.to_string(),
            personality: personality.to_string(),
            quirk: quirk.to_string(),
            hair: hair.to_string(),
            kind: AgentKind::Human,
        }
    }

    pub fn guide(name: &str, role: &str) -> Self {
        Self {
            name: name.to_string(),
            role: role.to_string(),
            personality: "formal and precise".to_string(),
            quirk: "answers in platform documentation style".to_string(),
            hair: String::new(),
            kind: AgentKind::Guide,
        }
    }
}

/// Reported behaviour state, derived from the agent's flags and timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Idle,
    Travelling,
    Dancing,
    Tripped,
    Conversing,
}

/// One question/response pair in an agent's conversation memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub question: String,
    pub response: String,
}

#[derive(Component, Debug)]
pub struct Agent {
    pub profile: AgentProfile,
    /// Anchor for the wander radius; guides also hover around its height.
    pub home: Vec3,
    pub target: Vec3,
    /// Seconds until a new wander target is chosen.
    pub wander_timer: f32,
    pub trip_chance: f32,
    trip_pose: Option<Timer>,
    trip_cooldown: Option<Timer>,
    dance: Option<Timer>,
    /// Set by the dialogue session; only ever true for one agent at a time.
    pub conversing: bool,
    /// Append-only within the session lifetime, never persisted.
    pub history: Vec<Exchange>,
}

impl Agent {
    pub fn new(profile: AgentProfile, home: Vec3) -> Self {
        Self {
            profile,
            home,
            target: home,
            wander_timer: 0.0,
            trip_chance: BASE_TRIP_CHANCE,
            trip_pose: None,
            trip_cooldown: None,
            dance: None,
            conversing: false,
            history: Vec::new(),
        }
    }

    pub fn is_dancing(&self) -> bool {
        self.dance.is_some()
    }

    pub fn is_tripped(&self) -> bool {
        self.trip_pose.is_some()
    }

    /// Current behaviour state as seen from outside, given the agent's
    /// world position.
    pub fn behavior(&self, position: Vec3) -> Behavior {
        if self.conversing {
            Behavior::Conversing
        } else if self.is_tripped() {
            Behavior::Tripped
        } else if self.is_dancing() {
            Behavior::Dancing
        } else {
            let mut to_target = self.target - position;
            to_target.y = 0.0;
            if to_target.length() > TARGET_EPSILON {
                Behavior::Travelling
            } else {
                Behavior::Idle
            }
        }
    }

    /// Advance this agent by one tick. Mutates the transform in place and
    /// pushes any floating-text cues onto `cues`; never fails.
    ///
    /// `now` is wall-clock elapsed seconds, used for the bob animations.
    pub fn advance(
        &mut self,
        transform: &mut Transform,
        player: Vec3,
        dt: f32,
        now: f32,
        rng: &mut impl Rng,
        cues: &mut Vec<FloatingCue>,
    ) {
        if self.profile.kind == AgentKind::Guide {
            // Decorative hover only; the ring spin runs in its own system.
            transform.translation.y = self.home.y + now.sin() * 0.1;
            return;
        }

        self.tick_timers(transform, dt);

        // Random trip. Non-blocking: the pose is reapplied at the end of the
        // tick while its timer runs, everything else keeps going.
        if !self.is_dancing() && rng.gen_range(0.0..1.0f32) < self.trip_chance {
            self.trip_pose = Some(Timer::from_seconds(TRIP_POSE_SECS, TimerMode::Once));
            self.trip_cooldown = Some(Timer::from_seconds(TRIP_COOLDOWN_SECS, TimerMode::Once));
            self.trip_chance = 0.0;
            cues.push(FloatingCue::new("Oof!", transform.translation));
        }

        if self.conversing {
            // Yaw-only orientation toward the player; pitch/roll stay zero.
            let focus = Vec3::new(player.x, transform.translation.y, player.z);
            if focus.distance(transform.translation) > TARGET_EPSILON {
                transform.look_at(focus, Vec3::Y);
            }
        } else {
            if !self.is_dancing() {
                if rng.gen_range(0.0..1.0f32) < DANCE_CHANCE {
                    self.dance = Some(Timer::from_seconds(DANCE_SECS, TimerMode::Once));
                    cues.push(FloatingCue::new("\u{1f3b5}", transform.translation));
                }
                self.wander(transform, dt, now, rng);
            }
            if self.is_dancing() {
                transform.rotate_y(6.0 * dt);
                transform.translation.y = (now * 10.0).sin().abs() * 0.3;
            }
        }

        if self.is_tripped() {
            let (yaw, _, _) = transform.rotation.to_euler(EulerRot::YXZ);
            transform.rotation = Quat::from_euler(EulerRot::YXZ, yaw, FRAC_PI_4, 0.0);
            transform.translation.y = TRIP_POSE_HEIGHT;
        }
    }

    fn tick_timers(&mut self, transform: &mut Transform, dt: f32) {
        let step = Duration::from_secs_f32(dt);
        if let Some(pose) = &mut self.trip_pose {
            pose.tick(step);
            if pose.finished() {
                self.trip_pose = None;
                let (yaw, _, _) = transform.rotation.to_euler(EulerRot::YXZ);
                transform.rotation = Quat::from_rotation_y(yaw);
                transform.translation.y = 0.0;
            }
        }
        if let Some(cooldown) = &mut self.trip_cooldown {
            cooldown.tick(step);
            if cooldown.finished() {
                self.trip_cooldown = None;
                self.trip_chance = BASE_TRIP_CHANCE;
            }
        }
        if let Some(dance) = &mut self.dance {
            dance.tick(step);
            if dance.finished() {
                self.dance = None;
                transform.translation.y = 0.0;
            }
        }
    }

    fn wander(&mut self, transform: &mut Transform, dt: f32, now: f32, rng: &mut impl Rng) {
        self.wander_timer -= dt;
        if self.wander_timer <= 0.0 {
            let angle = rng.gen_range(0.0..TAU);
            let radius = rng.gen_range(3.0..8.0f32);
            self.target = Vec3::new(
                (self.home.x + angle.cos() * radius).clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT),
                0.0,
                (self.home.z + angle.sin() * radius).clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT),
            );
            self.wander_timer = rng.gen_range(5.0..10.0);
        }

        let mut to_target = self.target - transform.translation;
        to_target.y = 0.0;
        if to_target.length() > TARGET_EPSILON {
            transform.translation += to_target.normalize() * WALK_STEP;
            let face = Vec3::new(self.target.x, transform.translation.y, self.target.z);
            transform.look_at(face, Vec3::Y);
            let (yaw, _, _) = transform.rotation.to_euler(EulerRot::YXZ);
            transform.rotation = Quat::from_rotation_y(yaw);
            if !self.is_tripped() && !self.is_dancing() {
                // Walking bob.
                transform.translation.y = (now * 5.0).sin().abs() * 0.05;
            }
        }
    }
}

/// Child marker for the guide bot's orbiting rings; spins continuously around
/// its local axis.
#[derive(Component, Debug)]
pub struct GuideRing {
    pub axis: Dir3,
}

/// Child marker for a human agent's arms; swings while the owner dances.
#[derive(Component, Debug)]
pub struct SwingArm {
    pub agent: Entity,
    /// +1 for the left arm, -1 for the right.
    pub side: f32,
}

pub(crate) fn advance_agents(
    time: Res<Time>,
    mut rng: ResMut<SimRng>,
    player: Query<&Transform, (With<Player>, Without<Agent>)>,
    mut agents: Query<(&mut Agent, &mut Transform), Without<Player>>,
    mut commands: Commands,
) {
    let Ok(player_transform) = player.single() else {
        return;
    };
    let player_pos = player_transform.translation;
    let dt = time.delta_secs();
    let now = time.elapsed_secs();

    let mut cues = Vec::new();
    for (mut agent, mut transform) in agents.iter_mut() {
        agent.advance(&mut transform, player_pos, dt, now, &mut rng.0, &mut cues);
    }
    for cue in cues {
        commands.trigger(cue);
    }
}

pub(crate) fn spin_guide_rings(time: Res<Time>, mut rings: Query<(&GuideRing, &mut Transform)>) {
    let dt = time.delta_secs();
    for (ring, mut transform) in rings.iter_mut() {
        transform.rotate_local_axis(ring.axis, 0.6 * dt);
    }
}

pub(crate) fn swing_arms(
    time: Res<Time>,
    agents: Query<&Agent>,
    mut arms: Query<(&SwingArm, &mut Transform)>,
) {
    let now = time.elapsed_secs();
    for (arm, mut transform) in arms.iter_mut() {
        let Ok(agent) = agents.get(arm.agent) else {
            continue;
        };
        let angle = if agent.is_dancing() {
            arm.side * ((now * 10.0).sin() * 0.5 + FRAC_PI_8)
        } else {
            arm.side * FRAC_PI_8
        };
        transform.rotation = Quat::from_rotation_z(angle);
    }
}
