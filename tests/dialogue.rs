use bevy::prelude::*;
use myopic_office::prelude::*;
use myopic_office::test_helpers::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;

use myopic_office::dialogue::{QUESTION_POOL, suggested_questions};

fn coworker(name: &str) -> AgentProfile {
    AgentProfile::human(name, "AI Engineer", "technical and precise", "loves gas fees", "black")
}

/// Backend that blocks until the test releases it, for in-flight scenarios.
struct GatedResponder(flume::Receiver<String>);

impl Responder for GatedResponder {
    fn respond(&self, _profile: &AgentProfile, _question: &str) -> Result<String, RespondError> {
        Ok(self.0.recv().unwrap_or_else(|_| "gate dropped".to_string()))
    }
}

#[test]
fn interact_opens_a_session_with_greeting_and_four_options() {
    let mut app = office_test_app(Arc::new(StaticResponder::new("ok")), 5);
    spawn_player_at(&mut app, Vec3::new(0.0, 0.0, 0.0));
    spawn_agent_at(
        &mut app,
        AgentProfile::guide("Guide Bot", "AI Assistant"),
        Vec3::new(1.5, 0.0, 0.0),
    );
    app.update();

    press_interact(&mut app);

    let session = app.world().resource::<DialogueSession>();
    assert!(session.is_open());
    assert_eq!(session.title, "Guide Bot - AI Assistant");
    assert_eq!(session.transcript.len(), 1);
    assert_eq!(session.transcript[0].speaker, "Guide Bot");

    assert_eq!(session.options.len(), 4);
    for option in &session.options {
        assert!(QUESTION_POOL.contains(&option.as_str()));
    }
    let mut unique = session.options.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 4, "options must be drawn without replacement");
}

#[test]
fn suggested_questions_are_distinct_for_any_seed() {
    for seed in 0..100u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let picked = suggested_questions(&mut rng);
        assert_eq!(picked.len(), 4);
        let mut unique = picked.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 4, "seed {seed}");
        for question in &picked {
            assert!(QUESTION_POOL.contains(&question.as_str()));
        }
    }
}

#[test]
fn interact_while_open_does_not_retarget_the_session() {
    let mut app = office_test_app(Arc::new(StaticResponder::new("ok")), 9);
    let player = spawn_player_at(&mut app, Vec3::ZERO);
    let first = spawn_agent_at(&mut app, coworker("Gary Xia"), Vec3::new(1.0, 0.0, 0.0));
    let second = spawn_agent_at(
        &mut app,
        coworker("Finn the Human"),
        Vec3::new(12.0, 0.0, 0.0),
    );
    app.update();

    press_interact(&mut app);
    assert_eq!(app.world().resource::<DialogueSession>().agent(), Some(first));

    // Walk over to the other agent and press interact again: no-op.
    app.world_mut().get_mut::<Transform>(player).unwrap().translation =
        Vec3::new(12.0, 0.0, 1.0);
    press_interact(&mut app);
    assert_eq!(app.world().resource::<DialogueSession>().agent(), Some(first));

    // Exactly one agent is ever conversing.
    let conversing: Vec<Entity> = [first, second]
        .into_iter()
        .filter(|&e| app.world().get::<Agent>(e).unwrap().conversing)
        .collect();
    assert_eq!(conversing, vec![first]);
}

#[test]
fn proximity_is_recomputed_every_tick() {
    let mut app = office_test_app(Arc::new(StaticResponder::new("ok")), 2);
    let player = spawn_player_at(&mut app, Vec3::ZERO);
    let agent = spawn_agent_at(&mut app, coworker("Gary Xia"), Vec3::new(2.0, 0.0, 0.0));
    app.update();

    assert_eq!(app.world().resource::<NearbyAgent>().0, Some(agent));
    let hint = app.world().resource::<InteractionHint>();
    assert_eq!(hint.0.as_deref(), Some("Press E to talk to Gary Xia"));

    app.world_mut().get_mut::<Transform>(player).unwrap().translation =
        Vec3::new(10.0, 0.0, 0.0);
    app.update();
    assert_eq!(app.world().resource::<NearbyAgent>().0, None);
    assert!(app.world().resource::<InteractionHint>().0.is_none());
}

#[test]
fn reopening_shows_only_the_most_recent_exchange() {
    let mut app = office_test_app(Arc::new(StaticResponder::new("Canned reply")), 4);
    spawn_player_at(&mut app, Vec3::ZERO);
    let agent = spawn_agent_at(&mut app, coworker("Gary Xia"), Vec3::new(1.0, 0.0, 0.0));
    app.update();

    press_interact(&mut app);
    ask_and_wait(&mut app, "How does the virtual economy work?", 200)
        .expect("first exchange should complete");
    ask_and_wait(&mut app, "What is the Web3 Metaverse?", 200)
        .expect("second exchange should complete");
    assert_eq!(history_of(&app, agent).len(), 2);

    press_close(&mut app);
    assert!(!app.world().resource::<DialogueSession>().is_open());
    assert!(!app.world().get::<Agent>(agent).unwrap().conversing);

    press_interact(&mut app);
    let session = app.world().resource::<DialogueSession>();
    assert_eq!(session.transcript.len(), 2, "exactly the last exchange");
    assert_eq!(session.transcript[0].speaker, "You");
    assert_eq!(session.transcript[0].text, "What is the Web3 Metaverse?");
    assert_eq!(session.transcript[1].text, "Canned reply");
}

#[test]
fn invalid_submissions_are_silently_ignored() {
    let mut app = office_test_app(Arc::new(StaticResponder::new("ok")), 6);
    spawn_player_at(&mut app, Vec3::ZERO);
    spawn_agent_at(&mut app, coworker("Gary Xia"), Vec3::new(1.0, 0.0, 0.0));
    app.update();
    press_interact(&mut app);

    {
        let mut queue = app.world_mut().resource_mut::<QuestionQueue>();
        queue.push("   ");
        queue.push("x".repeat(201));
    }
    app.update();

    let session = app.world().resource::<DialogueSession>();
    assert_eq!(session.transcript.len(), 1, "only the greeting is shown");
    assert!(session.can_submit(), "no exchange was dispatched");
}

#[test]
fn only_one_exchange_may_be_in_flight() {
    let (gate, gate_rx) = flume::unbounded::<String>();
    let mut app = office_test_app(Arc::new(GatedResponder(gate_rx)), 8);
    spawn_player_at(&mut app, Vec3::ZERO);
    spawn_agent_at(&mut app, coworker("Gary Xia"), Vec3::new(1.0, 0.0, 0.0));
    app.update();
    press_interact(&mut app);

    app.world_mut().resource_mut::<QuestionQueue>().push("first question");
    app.update();
    assert!(!app.world().resource::<DialogueSession>().can_submit());

    // A second submission while busy is dropped, not queued.
    app.world_mut().resource_mut::<QuestionQueue>().push("second question");
    app.update();
    let player_lines = app
        .world()
        .resource::<DialogueSession>()
        .transcript
        .iter()
        .filter(|line| line.speaker == "You")
        .count();
    assert_eq!(player_lines, 1);

    gate.send("released".to_string()).unwrap();
    let reply = wait_for_reply(&mut app);
    assert_eq!(reply.as_deref(), Some("released"));
    assert!(app.world().resource::<DialogueSession>().can_submit());
    assert_eq!(app.world().resource::<DialogueSession>().options.len(), 4);
}

#[test]
fn late_response_after_close_is_discarded() {
    let (gate, gate_rx) = flume::unbounded::<String>();
    let mut app = office_test_app(Arc::new(GatedResponder(gate_rx)), 8);
    spawn_player_at(&mut app, Vec3::ZERO);
    let agent = spawn_agent_at(&mut app, coworker("Gary Xia"), Vec3::new(1.0, 0.0, 0.0));
    app.update();
    press_interact(&mut app);

    app.world_mut().resource_mut::<QuestionQueue>().push("anyone home?");
    app.update();
    press_close(&mut app);

    // The response resolves after teardown; it must be dropped on the floor.
    gate.send("too late".to_string()).unwrap();
    for _ in 0..50 {
        app.update();
        std::thread::sleep(Duration::from_millis(1));
    }

    assert!(!app.world().resource::<DialogueSession>().is_open());
    assert!(app.world().resource::<DialogueSession>().transcript.is_empty());
    assert!(history_of(&app, agent).is_empty());
}

/// Run updates until the in-flight exchange resolves.
fn wait_for_reply(app: &mut App) -> Option<String> {
    for _ in 0..200 {
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
