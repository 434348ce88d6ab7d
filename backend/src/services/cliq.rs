//! Zoho Cliq API client
//!
//! The channel-message call used by OAuth-path notifications, plus the
//! OAuth plumbing around it (consent URL, code exchange, token refresh).
//! Base URLs are configurable so tests can stand in a local server.

use crate::config::CliqConfig;
use anyhow::{bail, Context, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};

const OAUTH_SCOPE: &str = "ZohoCliq.Webhooks.CREATE,ZohoCliq.Channels.READ";

/// Token grant response from the accounts endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CliqTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Client for the Zoho Cliq HTTP API
#[derive(Clone)]
pub struct CliqClient {
    http: reqwest::Client,
    api_base: String,
    accounts_base: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl CliqClient {
    pub fn new(http: reqwest::Client, config: &CliqConfig) -> Self {
        Self {
            http,
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            accounts_base: config.accounts_base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    /// Provider consent URL for the authorization-code flow
    ///
    /// `state` is the caller's CSRF token and must not be empty.
    pub fn authorization_url(&self, state: &str) -> Result<String> {
        if state.is_empty() {
            bail!("State parameter is required");
        }

        let mut url = Url::parse(&self.accounts_base)
            .context("Invalid accounts base URL")?
            .join("/oauth/v2/auth")
            .context("Invalid accounts base URL")?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", OAUTH_SCOPE)
            .append_pair("access_type", "offline")
            .append_pair("state", state);

        Ok(url.to_string())
    }

    /// Exchange an authorization code for a token grant
    pub async fn exchange_code_for_tokens(&self, code: &str) -> Result<CliqTokens> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_uri),
        ])
        .await
    }

    /// Mint a new access token from a refresh token
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<CliqTokens> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ])
        .await
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<CliqTokens> {
        let response = self
            .http
            .post(format!("{}/oauth/v2/token", self.accounts_base))
            .form(params)
            .send()
            .await
            .context("Token request failed")?
            .error_for_status()
            .context("Token request rejected")?;

        response.json().await.context("Malformed token response")
    }

    /// Post a plain-text message to a channel
    pub async fn send_channel_message(
        &self,
        access_token: &str,
        channel_id: &str,
        text: &str,
    ) -> Result<Value> {
        let url = format!("{}/api/v2/channelsbyname/{}/message", self.api_base, channel_id);

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Zoho-oauthtoken {}", access_token))
            .json(&json!({ "text": text }))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Value>().await.unwrap_or(Value::Null))
    }
}
