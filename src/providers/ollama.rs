use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::capability::{CapabilityStatus, TextCompletion};
use crate::error::{PlannerError, Result};
use crate::providers::http::{send_json, trim_base};

/// Text completion backed by a local Ollama server.
pub struct OllamaCompletion {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaCompletion {
    pub fn new(client: Client, base_url: &str, model: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            model: model.to_string(),
        }
    }

    fn has_model(&self, tags: &TagsResponse) -> bool {
        tags.models.iter().any(|m| {
            m.name == self.model || m.name.split(':').next() == Some(self.model.as_str())
        })
    }
}

#[async_trait]
impl TextCompletion for OllamaCompletion {
    /// Reachable server with the model pulled is `Available`; reachable
    /// without it is `Downloadable`; unreachable is `Unavailable`.
    async fn status(&self) -> CapabilityStatus {
        let req = self.client.get(format!("{}/api/tags", self.base_url));
        match send_json::<TagsResponse>(req).await {
            Ok(tags) if self.has_model(&tags) => CapabilityStatus::Available,
            Ok(_) => CapabilityStatus::Downloadable,
            Err(e) if e.status().is_some() => CapabilityStatus::Error(e.to_string()),
            Err(e) => {
                log::debug!("ollama not reachable: {e}");
                CapabilityStatus::Unavailable
            }
        }
    }

    async fn complete(&self, system_instructions: &str, user_text: &str) -> Result<String> {
        let body = GenerateRequest {
            model: &self.model,
            system: system_instructions,
            prompt: user_text,
            stream: false,
            format: "json",
        };
        let req = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body);

        let resp: GenerateResponse = send_json(req)
            .await
            .map_err(|e| PlannerError::Completion(e.to_string()))?;
        Ok(resp.response)
    }
}
