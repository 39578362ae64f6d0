use std::sync::Arc;

use crate::capability::TextCompletion;
use crate::error::{PlannerError, Result};
use crate::intent::prompt::SYSTEM_INSTRUCTIONS;
use crate::intent::rules::apply_keyword_rules;
use crate::intent::schema::Intent;

/// Turns free text into an [`Intent`] through the injected completion handle.
#[derive(Clone)]
pub struct IntentParser {
    completion: Arc<dyn TextCompletion>,
}

impl IntentParser {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    pub async fn parse(&self, text: &str) -> Result<Intent> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PlannerError::EmptyPrompt);
        }

        let status = self.completion.status().await;
        if !status.is_available() {
            return Err(PlannerError::CapabilityUnavailable(format!(
                "text completion is {status}"
            )));
        }

        let raw = self.completion.complete(SYSTEM_INSTRUCTIONS, text).await?;
        log::debug!("completion returned {} bytes", raw.len());

        let intent = decode_intent(&raw)?.sanitized();
        Ok(apply_keyword_rules(intent, text))
    }
}

/// Remove Markdown code-fence lines such as "```json" and "```".
pub fn strip_code_fences(raw: &str) -> String {
    raw.lines()
        .filter(|l| !l.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// The first balanced `{...}` object in `s`, honouring JSON string escapes.
pub fn extract_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in s[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn decode_intent(raw: &str) -> Result<Intent> {
    let cleaned = strip_code_fences(raw);
    let body = extract_json_object(&cleaned)
        .ok_or_else(|| PlannerError::Parse("completion contained no JSON object".into()))?;
    serde_json::from_str(body).map_err(|e| PlannerError::Parse(e.to_string()))
}
