//! The single active dialogue session: open/close transitions, suggested
//! questions, submission handling and response application.

use std::collections::VecDeque;

use bevy::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::agent::{Agent, AgentKind, Exchange};
use crate::effects::FloatingCue;
use crate::player::{InputState, NearbyAgent};
use crate::responder::{ExchangeOutcome, ResponderHandle};
use crate::rng::SimRng;

/// Free-form questions longer than this are silently dropped.
pub const MAX_QUESTION_LEN: usize = 200;

/// Probability of a decorative cue near the agent when a response lands.
const RESPONSE_CUE_CHANCE: f32 = 0.2;

/// Fixed pool the suggested questions are drawn from.
pub const QUESTION_POOL: [&str; 8] = [
    "What is the Web3 Metaverse?",
    "How do the AI-powered avatars work?",
    "Can I create my own avatar as an NFT?",
    "Tell me about the Web3 login with MetaMask.",
    "How does the virtual economy work?",
    "What are knowledge-based roles and permissions?",
    "What's the main goal of this project?",
    "How will voice and video chat work in the space?",
];

/// One line of the visible transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub speaker: String,
    pub text: String,
}

impl ChatLine {
    fn player(text: impl Into<String>) -> Self {
        Self {
            speaker: "You".to_string(),
            text: text.into(),
        }
    }
}

/// Queue of submitted questions, suggested or free-form. The host view pushes
/// here; `dispatch_questions` validates and forwards to the backend.
#[derive(Resource, Default)]
pub struct QuestionQueue {
    pub queue: VecDeque<String>,
}

impl QuestionQueue {
    pub fn push(&mut self, question: impl Into<String>) {
        self.queue.push_back(question.into());
    }
}

/// The "currently talking to" state. Closed by default; at most one agent is
/// ever referenced, which is what enforces the single-converser invariant.
#[derive(Resource, Default)]
pub struct DialogueSession {
    agent: Option<Entity>,
    /// "Name - Role" header for the dialogue box.
    pub title: String,
    pub transcript: Vec<ChatLine>,
    /// The 4 currently offered suggested questions.
    pub options: Vec<String>,
    /// Sequence number of the in-flight exchange, if any. Cleared on close so
    /// a late response is recognised as stale and discarded.
    pending: Option<u64>,
    next_seq: u64,
}

impl DialogueSession {
    pub fn is_open(&self) -> bool {
        self.agent.is_some()
    }

    pub fn agent(&self) -> Option<Entity> {
        self.agent
    }

    /// Submission is allowed only while open with no exchange in flight.
    pub fn can_submit(&self) -> bool {
        self.agent.is_some() && self.pending.is_none()
    }
}

const HUMAN_GREETINGS: usize = 3;
const GUIDE_GREETINGS: usize = 2;

fn greeting(agent: &Agent, rng: &mut impl Rng) -> String {
    let name = &agent.profile.name;
    match agent.profile.kind {
        AgentKind::Human => match rng.gen_range(0..HUMAN_GREETINGS) {
            0 => format!(
                "Welcome to MyopicMetaverse! I'm {name}. We're building the future of digital interaction here."
            ),
            1 => format!("Hi there! I'm {name}. Glad you're here to check out the Web3 Metaverse."),
            _ => format!(
                "Hello! {name} here. Ready to talk about the next generation of virtual worlds?"
            ),
        },
        AgentKind::Guide => match rng.gen_range(0..GUIDE_GREETINGS) {
            0 => format!(
                "Greetings. I am the {name}. I can provide information about the Web3 Metaverse platform."
            ),
            _ => "Welcome. I am a MyopicMetaverse AI. Please ask me about our core features."
                .to_string(),
        },
    }
}

/// Shuffle the fixed pool and take the first 4: exactly 4 distinct entries,
/// drawn without replacement, no subset favoured.
pub fn suggested_questions(rng: &mut impl Rng) -> Vec<String> {
    let mut pool: Vec<&str> = QUESTION_POOL.to_vec();
    pool.shuffle(rng);
    pool[..4].iter().map(|q| q.to_string()).collect()
}

/// Closed -> Open(agent) on the interact edge, gated on proximity. Ignored
/// while a session is already open or nobody is near.
pub(crate) fn open_on_interact(
    input: Res<InputState>,
    nearby: Res<NearbyAgent>,
    mut session: ResMut<DialogueSession>,
    mut agents: Query<&mut Agent>,
    mut rng: ResMut<SimRng>,
) {
    if !input.interact || session.is_open() {
        return;
    }
    let Some(entity) = nearby.0 else {
        return;
    };
    let Ok(mut agent) = agents.get_mut(entity) else {
        return;
    };

    agent.conversing = true;
    session.agent = Some(entity);
    session.title = format!("{} - {}", agent.profile.name, agent.profile.role);
    session.transcript.clear();
    match agent.history.last() {
        // Only the most recent exchange is redisplayed; older turns stay in
        // memory but are not rendered.
        Some(last) => {
            session.transcript.push(ChatLine::player(&last.question));
            session.transcript.push(ChatLine {
                speaker: agent.profile.name.clone(),
                text: last.response.clone(),
            });
        }
        None => {
            session.transcript.push(ChatLine {
                speaker: agent.profile.name.clone(),
                text: greeting(&agent, &mut rng.0),
            });
        }
    }
    session.options = suggested_questions(&mut rng.0);
    info!("dialogue opened with {}", agent.profile.name);
}

/// Open -> Closed on the close edge. Marks any in-flight exchange stale.
pub(crate) fn close_on_escape(
    input: Res<InputState>,
    mut session: ResMut<DialogueSession>,
    mut agents: Query<&mut Agent>,
) {
    if !input.close || !session.is_open() {
        return;
    }
    if let Some(entity) = session.agent {
        if let Ok(mut agent) = agents.get_mut(entity) {
            agent.conversing = false;
        }
    }
    session.agent = None;
    session.title.clear();
    session.transcript.clear();
    session.options.clear();
    session.pending = None;
    info!("dialogue closed");
}

/// Validate queued questions and hand them to the backend on a worker thread.
/// The backend handle's channel brings the result back to `apply_responses`.
pub(crate) fn dispatch_questions(
    mut queue: ResMut<QuestionQueue>,
    mut session: ResMut<DialogueSession>,
    agents: Query<&Agent>,
    handle: Res<ResponderHandle>,
) {
    while let Some(raw) = queue.queue.pop_front() {
        let question = raw.trim().to_string();
        if question.is_empty() || question.chars().count() > MAX_QUESTION_LEN {
            debug!("ignoring invalid question submission");
            continue;
        }
        if !session.can_submit() {
            debug!("dropping question while session is busy or closed");
            continue;
        }
        let Some(entity) = session.agent else {
            continue;
        };
        let Ok(agent) = agents.get(entity) else {
            continue;
        };

        let seq = session.next_seq;
        session.next_seq += 1;
        session.pending = Some(seq);
        session.transcript.push(ChatLine::player(&question));

        let profile = agent.profile.clone();
        let backend = handle.backend.clone();
        let tx = handle.tx.clone();
        std::thread::spawn(move || {
            // Must complete one way or another: the scripted table is the
            // last line of defence even if the composed backend errors out.
            let response = backend.respond(&profile, &question).unwrap_or_else(|err| {
                warn!("dialogue backend failed ({err}); using scripted reply");
                crate::fallback::scripted_reply(
                    &profile.name,
                    crate::fallback::classify(&question),
                )
                .to_string()
            });
            let _ = tx.send(ExchangeOutcome {
                agent: entity,
                seq,
                question,
                response,
            });
        });
    }
}

/// Drain completed exchanges. Stale outcomes (session closed or reopened
/// since dispatch) are discarded without touching any state.
pub(crate) fn apply_responses(
    handle: Res<ResponderHandle>,
    mut session: ResMut<DialogueSession>,
    mut agents: Query<(&mut Agent, &Transform)>,
    mut rng: ResMut<SimRng>,
    mut commands: Commands,
) {
    while let Ok(outcome) = handle.rx.try_recv() {
        if session.agent != Some(outcome.agent) || session.pending != Some(outcome.seq) {
            debug!("discarding stale dialogue response");
            continue;
        }
        session.pending = None;
        let Ok((mut agent, transform)) = agents.get_mut(outcome.agent) else {
            continue;
        };

        agent.history.push(Exchange {
            question: outcome.question,
            response: outcome.response.clone(),
        });
        session.transcript.push(ChatLine {
            speaker: agent.profile.name.clone(),
            text: outcome.response,
        });
        session.options = suggested_questions(&mut rng.0);
        if rng.0.gen_range(0.0..1.0f32) < RESPONSE_CUE_CHANCE {
            commands.trigger(FloatingCue::new("\u{1f4a1}", transform.translation));
        }
    }
}
