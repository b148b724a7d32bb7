use bevy::prelude::*;
use myopic_office::prelude::*;
use myopic_office::test_helpers::*;
use std::sync::Arc;

/// Backend that always fails, to exercise the scripted fallback path.
struct FailingResponder;

impl Responder for FailingResponder {
    fn respond(&self, _profile: &AgentProfile, _question: &str) -> Result<String, RespondError> {
        Err(RespondError::Malformed("synthetic failure".to_string()))
    }
}

#[test]
fn failed_backend_falls_back_to_the_scripted_table() {
    let backend = FallbackResponder::new(FailingResponder);
    let profile = AgentProfile::guide("Guide Bot", "AI Assistant");

    let reply = backend
        .respond(&profile, "What is the Web3 Metaverse?")
        .expect("fallback never fails");
    assert_eq!(reply, scripted_reply("Guide Bot", Topic::Metaverse));
    assert!(reply.contains("web-based virtual world"));
}

#[test]
fn unknown_persona_and_topic_use_the_guide_default() {
    let backend = FallbackResponder::new(FailingResponder);
    let profile = AgentProfile::human("Nobody", "Visitor", "quiet", "none", "brown");

    let reply = backend.respond(&profile, "banana").expect("fallback never fails");
    assert_eq!(classify("banana"), Topic::Default);
    assert_eq!(reply, scripted_reply("Nobody", Topic::Default));
    assert_eq!(reply, scripted_reply("Guide Bot", Topic::Default));
}

#[test]
fn scripted_backend_answers_end_to_end() {
    let mut app = office_test_app(Arc::new(ScriptedResponder), 11);
    spawn_player_at(&mut app, Vec3::ZERO);
    let agent = spawn_agent_at(
        &mut app,
        AgentProfile::guide("Guide Bot", "AI Assistant"),
        Vec3::new(1.0, 0.0, 0.0),
    );
    app.update();
    press_interact(&mut app);

    let reply = ask_and_wait(&mut app, "How does the virtual economy work?", 200)
        .expect("scripted exchange should complete");
    assert_eq!(reply, scripted_reply("Guide Bot", Topic::Economy));

    let history = history_of(&app, agent);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].question, "How does the virtual economy work?");
    assert_eq!(history[0].response, reply);
}

#[test]
fn dispatch_recovers_even_when_the_composed_backend_errors() {
    // No FallbackResponder wrapper here: the worker thread itself must fall
    // back to the scripted table when the backend returns an error.
    let mut app = office_test_app(Arc::new(FailingResponder), 13);
    spawn_player_at(&mut app, Vec3::ZERO);
    spawn_agent_at(
        &mut app,
        AgentProfile::human("Gary Xia", "CEO", "visionary", "talks fast", "black"),
        Vec3::new(1.0, 0.0, 0.0),
    );
    app.update();
    press_interact(&mut app);

    let reply = ask_and_wait(&mut app, "Can I create my own avatar as an NFT?", 200)
        .expect("exchange should still complete");
    assert_eq!(reply, scripted_reply("Gary Xia", Topic::Avatar));
}
