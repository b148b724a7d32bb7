#![allow(dead_code)]

//! Shared drivers for headless tests: build a minimal app, spawn characters,
//! and run the update loop until a dialogue exchange completes.

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;

use crate::VirtualOfficePlugin;
use crate::agent::{Agent, AgentProfile};
use crate::dialogue::{DialogueSession, QuestionQueue};
use crate::player::{InputState, Player};
use crate::responder::Responder;
use crate::rng::SimRng;
use crate::scene::spawn_character;

/// Headless app with the office plugin, the given backend and a fixed seed.
pub fn office_test_app(backend: Arc<dyn Responder>, seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(VirtualOfficePlugin::with_backend(backend));
    app.insert_resource(SimRng::seeded(seed));
    app
}

pub fn spawn_player_at(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((Player::default(), Transform::from_translation(position)))
        .id()
}

pub fn spawn_agent_at(app: &mut App, profile: AgentProfile, home: Vec3) -> Entity {
    let spec = crate::scene::CharacterSpec {
        profile,
        home,
        shirt: Color::WHITE,
        hair: Color::WHITE,
    };
    let mut commands = app.world_mut().commands();
    let entity = spawn_character(&mut commands, &spec);
    app.world_mut().flush();
    entity
}

/// Press the interact key for exactly one update.
pub fn press_interact(app: &mut App) {
    app.world_mut().resource_mut::<InputState>().interact = true;
    app.update();
}

/// Press the close key for exactly one update.
pub fn press_close(app: &mut App) {
    app.world_mut().resource_mut::<InputState>().close = true;
    app.update();
}

/// Submit a question to the open session and run updates until the agent's
/// reply shows up in the transcript, or `max_updates` passes elapse.
pub fn ask_and_wait(app: &mut App, question: &str, max_updates: usize) -> Option<String> {
    app.world_mut()
        .resource_mut::<QuestionQueue>()
        .push(question);

    for _ in 0..max_updates {
        app.update();
        let session = app.world().resource::<DialogueSession>();
        if session.can_submit() {
            if let Some(line) = session.transcript.last() {
                if line.speaker != "You" {
                    return Some(line.text.clone());
                }
            }
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    None
}

/// The conversation history of an agent, cloned out of the world.
pub fn history_of(app: &App, entity: Entity) -> Vec<crate::agent::Exchange> {
    app.world()
        .get::<Agent>(entity)
        .map(|agent| agent.history.clone())
        .unwrap_or_default()
}
