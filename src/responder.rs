//! Response generation: the backend trait, the remote text-generation client
//! and the fallback decorator.

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use flume::{Receiver, Sender, unbounded};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::agent::AgentProfile;
use crate::fallback::ScriptedResponder;
use crate::parse;

const GENERATION_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";
/// Defensive cap on the remote call; expiry is just another fallback trigger.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// Failures of the primary generation path. All of them are recovered via the
/// scripted fallback; none ever reach the frame loop.
#[derive(Debug, Error)]
pub enum RespondError {
    #[error("remote call failed: {0}")]
    Remote(#[from] reqwest::Error),
    #[error("malformed response payload: {0}")]
    Malformed(String),
}

/// A dialogue backend: pure function of (agent snapshot, question). Called
/// from a worker thread, so implementors may block.
pub trait Responder: Send + Sync + 'static {
    fn respond(&self, profile: &AgentProfile, question: &str) -> Result<String, RespondError>;
}

/// A completed exchange travelling back from the worker thread.
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    pub agent: Entity,
    pub seq: u64,
    pub question: String,
    pub response: String,
}

/// A handle resource that holds the backend and a channel for outcomes.
#[derive(Resource)]
pub struct ResponderHandle {
    pub backend: Arc<dyn Responder>,
    pub tx: Sender<ExchangeOutcome>,
    pub rx: Receiver<ExchangeOutcome>,
}

impl ResponderHandle {
    pub fn new(backend: Arc<dyn Responder>) -> Self {
        let (tx, rx) = unbounded();
        Self { backend, tx, rx }
    }
}

/// API key kept zeroized in memory.
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Zeroizing::new(key.into()))
    }

    pub fn from_env() -> Option<Self> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Self::new)
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

/// Role-play instruction sent to the text-generation service.
pub fn build_roleplay_prompt(profile: &AgentProfile, question: &str) -> String {
    format!(
        r#"You are roleplaying as {name}, {role} at MyopicMetaverse Inc.
Character traits: {personality}, {quirk}
User question: "{question}"

Important context: You are a key stakeholder at MyopicMetaverse Inc. Talk about the "Web3 Metaverse", a project that combines AI chatbots, 3D avatars (NFTs), Web3 login (MetaMask), and a virtual economy. Be enthusiastic and informative for a potential new user.

Respond as this character with professional enthusiasm in 50-80 words.

IMPORTANT: Output ONLY valid JSON:
{{"response": "your character's response here"}}"#,
        name = profile.name,
        role = profile.role,
        personality = profile.personality,
        quirk = profile.quirk,
        question = question,
    )
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Blocking client for a Gemini-style `generateContent` endpoint, requesting
/// structured JSON output of shape `{"response": string}`.
pub struct RemoteResponder {
    client: reqwest::blocking::Client,
    key: ApiKey,
    model: String,
}

impl RemoteResponder {
    pub fn new(key: ApiKey) -> Result<Self, RespondError> {
        Self::with_model(key, DEFAULT_MODEL)
    }

    pub fn with_model(key: ApiKey, model: &str) -> Result<Self, RespondError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            key,
            model: model.to_string(),
        })
    }

    /// Build from `GEMINI_API_KEY`; `None` when the key is absent.
    pub fn from_env() -> Option<Self> {
        ApiKey::from_env().and_then(|key| Self::new(key).ok())
    }
}

impl Responder for RemoteResponder {
    fn respond(&self, profile: &AgentProfile, question: &str) -> Result<String, RespondError> {
        let prompt = build_roleplay_prompt(profile, question);
        let url = format!(
            "{}/{}:generateContent?key={}",
            GENERATION_ENDPOINT,
            self.model,
            self.key.expose()
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let payload: GenerateContentResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| RespondError::Malformed("no candidate text".to_string()))?;

        parse::extract_reply(&text)
    }
}

/// Decorator that recovers every primary-path failure with the scripted
/// topic-matched reply, so the caller always gets a character response.
pub struct FallbackResponder<P: Responder> {
    primary: P,
}

impl<P: Responder> FallbackResponder<P> {
    pub fn new(primary: P) -> Self {
        Self { primary }
    }
}

impl<P: Responder> Responder for FallbackResponder<P> {
    fn respond(&self, profile: &AgentProfile, question: &str) -> Result<String, RespondError> {
        match self.primary.respond(profile, question) {
            Ok(text) => Ok(text),
            Err(err) => {
                warn!(
                    "remote generation failed for {} ({err}); using scripted reply",
                    profile.name
                );
                ScriptedResponder.respond(profile, question)
            }
        }
    }
}

/// Deterministic backend used by tests and examples: always answers with the
/// same fixed string.
pub struct StaticResponder(pub String);

impl StaticResponder {
    pub fn new(reply: impl Into<String>) -> Self {
        Self(reply.into())
    }
}

impl Responder for StaticResponder {
    fn respond(&self, _profile: &AgentProfile, _question: &str) -> Result<String, RespondError> {
        Ok(self.0.clone())
    }
}
