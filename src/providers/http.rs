use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ProvidersConfig;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl HttpError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status(s) => Some(*s),
            _ => None,
        }
    }
}

pub fn build_client(cfg: &ProvidersConfig) -> Result<Client> {
    Client::builder()
        .user_agent(cfg.user_agent.clone())
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("Unable to build HTTP client")
}

/// Send `req`, require a 2xx status and decode the JSON body.
pub async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> std::result::Result<T, HttpError> {
    let resp = req
        .send()
        .await
        .map_err(|e| HttpError::Transport(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(HttpError::Status(status));
    }

    resp.json::<T>()
        .await
        .map_err(|e| HttpError::Decode(e.to_string()))
}

pub fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
