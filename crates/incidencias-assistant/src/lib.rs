// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use incidencias_app::CompletionBackend;
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use url::Url;

/// Text the assistant produced for one prompt, with the service's own
/// timestamp for the reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompletionReply {
    pub response: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

/// Blocking client for the Completion Service endpoint. One prompt in,
/// one reply out; any account-context enrichment happens server-side.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("assistant.base_url must not be empty");
        }
        Url::parse(&base_url)
            .with_context(|| format!("assistant.base_url {base_url:?} is not a valid URL"))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `POST /api/chat` with `{ "message": ... }`. The 400/500 error
    /// envelopes surface as errors carrying the service's text.
    pub fn ask(&self, message: &str) -> Result<CompletionReply> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            bail!("message must not be empty");
        }

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&ChatRequest { message: trimmed })
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let reply: CompletionReply = response.json().context("decode assistant reply")?;
        Ok(reply)
    }

    /// Health probe: `GET /api/chat` answers 200 whenever the service
    /// is up, independent of authentication.
    pub fn health(&self) -> Result<HealthStatus> {
        let response = self
            .http
            .get(format!("{}/api/chat", self.base_url))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let health: HealthStatus = response.json().context("decode health status")?;
        Ok(health)
    }
}

impl CompletionBackend for Client {
    fn complete(&self, message: &str) -> Result<String> {
        Ok(self.ask(message)?.response)
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach the assistant at {} -- check [assistant].base_url ({} )",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return anyhow!("assistant error ({}): {}", status.as_u16(), error);
    }

    if body.len() < 100 && !body.contains('{') {
        return anyhow!("assistant error ({}): {}", status.as_u16(), body);
    }

    anyhow!("assistant returned {}", status.as_u16())
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}
