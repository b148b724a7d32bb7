//! Extraction of the structured `{"response": string}` payload from raw model
//! output, which may be fenced or embedded in surrounding prose.

use serde::Deserialize;

use crate::responder::RespondError;

/// Substitute used when the model returns valid JSON with an empty field.
pub const UNSURE_REPLY: &str = "I'm not sure how to answer that. Try asking something else!";

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    response: String,
}

/// Parse the model output into the final response text.
///
/// Handles pure JSON, JSON inside markdown code fences (```json ... ```) and
/// JSON embedded in explanatory text. An empty `response` field yields
/// [`UNSURE_REPLY`]; anything unparseable is a [`RespondError::Malformed`].
pub fn extract_reply(raw: &str) -> Result<String, RespondError> {
    let reply = parse_reply(raw)?;
    if reply.response.trim().is_empty() {
        Ok(UNSURE_REPLY.to_string())
    } else {
        Ok(reply.response)
    }
}

fn parse_reply(raw: &str) -> Result<ChatReply, RespondError> {
    let text = raw.trim();

    if let Ok(reply) = serde_json::from_str::<ChatReply>(text) {
        return Ok(reply);
    }

    if let Some(block) = extract_code_block(text) {
        if let Ok(reply) = serde_json::from_str::<ChatReply>(&block) {
            return Ok(reply);
        }
    }

    if let Some(object) = extract_json_object(text) {
        if let Ok(reply) = serde_json::from_str::<ChatReply>(&object) {
            return Ok(reply);
        }
    }

    Err(RespondError::Malformed(preview(text)))
}

/// Extract the body of a markdown code fence (```json ... ``` or ``` ... ```).
fn extract_code_block(text: &str) -> Option<String> {
    // Try ```json first
    if let Some(start) = text.find("```json") {
        let content_start = start + 7;
        if let Some(end) = text[content_start..].find("```") {
            return Some(text[content_start..content_start + end].trim().to_string());
        }
    }

    // Try plain ``` block
    if let Some(start) = text.find("```") {
        let content_start = start + 3;
        // Skip to end of line in case there's a language specifier
        let newline_pos = text[content_start..]
            .find('\n')
            .map(|p| content_start + p + 1)
            .unwrap_or(content_start);
        if let Some(end) = text[newline_pos..].find("```") {
            return Some(text[newline_pos..newline_pos + end].trim().to_string());
        }
    }

    None
}

/// Extract a JSON object from text by finding matching braces.
fn extract_json_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

fn preview(text: &str) -> String {
    if text.chars().count() > 200 {
        let cut: String = text.chars().take(200).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pure_json() {
        let reply = extract_reply(r#"{"response": "Welcome aboard!"}"#).expect("should parse");
        assert_eq!(reply, "Welcome aboard!");
    }

    #[test]
    fn strips_code_fence() {
        let raw = "```json\n{\"response\": \"Fenced answer\"}\n```";
        let reply = extract_reply(raw).expect("should parse");
        assert_eq!(reply, "Fenced answer");
    }

    #[test]
    fn finds_json_embedded_in_text() {
        let raw = r#"Sure, here you go: {"response": "Embedded"} hope that helps"#;
        let reply = extract_reply(raw).expect("should parse");
        assert_eq!(reply, "Embedded");
    }

    #[test]
    fn empty_field_becomes_unsure_reply() {
        let reply = extract_reply(r#"{"response": ""}"#).expect("should parse");
        assert_eq!(reply, UNSURE_REPLY);
    }

    #[test]
    fn missing_field_becomes_unsure_reply() {
        // serde fills the default; shape-wise this is still a valid payload.
        let reply = extract_reply(r#"{"something_else": 3}"#).expect("should parse");
        assert_eq!(reply, UNSURE_REPLY);
    }

    #[test]
    fn garbage_is_malformed() {
        let err = extract_reply("I refuse to answer in JSON").unwrap_err();
        assert!(matches!(err, RespondError::Malformed(_)));
    }

    #[test]
    fn nested_braces_in_strings_are_handled() {
        let raw = r#"prefix {"response": "curly {not a} problem"} suffix"#;
        let reply = extract_reply(raw).expect("should parse");
        assert_eq!(reply, "curly {not a} problem");
    }
}
