//! Walkable virtual-office scene for Bevy: wandering NPC coworkers, a hovering
//! guide bot, and an LLM-backed dialogue system with a scripted fallback.
pub mod agent;

pub mod auth;

pub mod dialogue;

pub mod effects;

pub mod fallback;

pub mod parse;

pub mod player;

pub mod responder;

pub mod rng;

pub mod scene;

// Test helpers (exposed to tests & dev tooling)
pub mod test_helpers;

use std::sync::Arc;

use bevy::prelude::*;

use crate::responder::{FallbackResponder, RemoteResponder, Responder, ResponderHandle};

pub mod prelude {
    pub use crate::VirtualOfficePlugin;
    pub use crate::agent::{Agent, AgentKind, AgentProfile, Behavior, Exchange};
    pub use crate::auth::SignIn;
    pub use crate::dialogue::{ChatLine, DialogueSession, QuestionQueue};
    pub use crate::effects::{FloatingCue, FloatingText};
    pub use crate::fallback::{ScriptedResponder, Topic, classify, scripted_reply};
    pub use crate::player::{InputState, InteractionHint, NearbyAgent, Player};
    pub use crate::responder::{
        FallbackResponder, RemoteResponder, RespondError, Responder, ResponderHandle,
        StaticResponder,
    };
    pub use crate::rng::SimRng;
    pub use crate::scene::{CharacterSpec, office_roster, spawn_character, spawn_roster};
}

/// Plugin that runs the whole office simulation: player locomotion, agent
/// wander/dance/trip behaviour, proximity detection, the dialogue session and
/// the response generator.
///
/// Resources:
/// - `ResponderHandle`: dialogue backend plus the response channel
/// - `DialogueSession` / `QuestionQueue`: the single active conversation
/// - `InputState`, `NearbyAgent`, `InteractionHint`, `SimRng`
pub struct VirtualOfficePlugin {
    pub backend: Option<Arc<dyn Responder>>,
}

impl VirtualOfficePlugin {
    /// Create the plugin with a prebuilt dialogue backend.
    pub fn with_backend(backend: Arc<dyn Responder>) -> Self {
        Self {
            backend: Some(backend),
        }
    }
}

impl Default for VirtualOfficePlugin {
    fn default() -> Self {
        Self { backend: None }
    }
}

impl Plugin for VirtualOfficePlugin {
    fn build(&self, app: &mut App) {
        if app.world().get_resource::<ResponderHandle>().is_some() {
            // Already added; skip
            return;
        }

        let backend = self.backend.clone().unwrap_or_else(default_backend);

        app.insert_resource(ResponderHandle::new(backend))
            .insert_resource(rng::SimRng::default())
            .insert_resource(player::InputState::default())
            .insert_resource(player::NearbyAgent::default())
            .insert_resource(player::InteractionHint::default())
            .insert_resource(dialogue::DialogueSession::default())
            .insert_resource(dialogue::QuestionQueue::default());

        // One logical tick per frame. Everything runs synchronously except the
        // responder call, which happens on its own thread and is drained by
        // `apply_responses`.
        app.add_systems(
            Update,
            (
                player::collect_input,
                player::move_player,
                agent::advance_agents,
                agent::spin_guide_rings,
                agent::swing_arms,
                player::detect_nearby,
                dialogue::open_on_interact,
                dialogue::close_on_escape,
                dialogue::dispatch_questions,
                dialogue::apply_responses,
                effects::expire_floating_text,
                player::reset_input_edges,
            )
                .chain(),
        );

        app.add_observer(effects::spawn_floating_text);
    }
}

/// Remote generation when an API key is configured, scripted replies otherwise.
/// The remote path is always wrapped so a failed call degrades to the script.
fn default_backend() -> Arc<dyn Responder> {
    match RemoteResponder::from_env() {
        Some(remote) => Arc::new(FallbackResponder::new(remote)),
        None => {
            info!("GEMINI_API_KEY not set; dialogue will use scripted replies only");
            Arc::new(fallback::ScriptedResponder)
        }
    }
}
