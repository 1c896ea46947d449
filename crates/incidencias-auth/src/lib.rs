// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use incidencias_app::{IdentityGateway, Profile, SchoolId, SignUpRequest, UserRole};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Blocking client for the Identity Service REST surface. Credential
/// verification and profile storage stay on the service side; this
/// client only carries the calls and keeps the session token.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    anon_key: String,
    http: HttpClient,
    access_token: Option<String>,
}

impl Client {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("identity.base_url must not be empty");
        }
        Url::parse(&base_url)
            .with_context(|| format!("identity.base_url {base_url:?} is not a valid URL"))?;
        if anon_key.trim().is_empty() {
            bail!("identity.anon_key must not be empty");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            anon_key: anon_key.to_owned(),
            http,
            access_token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_signed_in(&self) -> bool {
        self.access_token.is_some()
    }

    /// Registers an account with the profile fields attached as user
    /// metadata. Service error text surfaces verbatim so the caller
    /// can show it inline.
    pub fn sign_up(&self, request: &SignUpRequest) -> Result<()> {
        let body = SignUpBody {
            email: &request.email,
            password: &request.password,
            data: MetadataBody {
                full_name: &request.metadata.full_name,
                role: request.metadata.role.as_str(),
                school_cct: &request.metadata.school_cct,
                school_name: &request.metadata.school_name,
            },
        };

        let response = self
            .http
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(service_error(status, &text));
        }
        Ok(())
    }

    /// Password grant. The returned access token is retained for the
    /// profile and sign-out calls.
    pub fn sign_in_with_password(&mut self, email: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(format!(
                "{}/auth/v1/token?grant_type=password",
                self.base_url
            ))
            .header("apikey", &self.anon_key)
            .json(&PasswordGrantBody { email, password })
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(service_error(status, &text));
        }

        let session: SessionBody = response.json().context("decode session")?;
        self.access_token = Some(session.access_token);
        Ok(())
    }

    /// Ends the session. Signing out without one is not an error.
    pub fn sign_out(&mut self) -> Result<()> {
        let Some(token) = self.access_token.take() else {
            return Ok(());
        };

        let response = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(service_error(status, &text));
        }
        Ok(())
    }

    /// Fetches the signed-in user's profile; `None` without a session
    /// rather than an error.
    pub fn current_profile(&self) -> Result<Option<Profile>> {
        let Some(token) = &self.access_token else {
            return Ok(None);
        };

        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(service_error(status, &text));
        }

        let user: UserBody = response.json().context("decode user")?;
        let metadata = user.user_metadata;
        let role = UserRole::parse(&metadata.role)
            .ok_or_else(|| anyhow!("unrecognized role {:?} in profile", metadata.role))?;
        Ok(Some(Profile {
            full_name: metadata.full_name,
            role,
            school_id: SchoolId::new(metadata.school_cct),
        }))
    }
}

impl IdentityGateway for Client {
    fn sign_up(&mut self, request: &SignUpRequest) -> Result<()> {
        Client::sign_up(self, request)
    }

    fn sign_in(&mut self, email: &str, password: &str) -> Result<()> {
        self.sign_in_with_password(email, password)
    }

    fn sign_out(&mut self) -> Result<()> {
        Client::sign_out(self)
    }

    fn current_profile(&self) -> Result<Option<Profile>> {
        Client::current_profile(self)
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach the identity service at {} -- check [identity].base_url ({} )",
        base_url,
        error
    )
}

/// The service's own message must reach the user unchanged, so the
/// envelope text becomes the whole error when present.
fn service_error(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body) {
        for text in [parsed.error_description, parsed.msg, parsed.message] {
            if let Some(text) = text
                && !text.is_empty()
            {
                return anyhow!("{text}");
            }
        }
    }

    if body.len() < 100 && !body.contains('{') && !body.is_empty() {
        return anyhow!("{body}");
    }

    anyhow!("identity service returned {}", status.as_u16())
}

#[derive(Debug, Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: MetadataBody<'a>,
}

#[derive(Debug, Serialize)]
struct MetadataBody<'a> {
    full_name: &'a str,
    role: &'a str,
    school_cct: &'a str,
    school_name: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordGrantBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    user_metadata: UserMetadataBody,
}

#[derive(Debug, Deserialize)]
struct UserMetadataBody {
    full_name: String,
    role: String,
    school_cct: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}
