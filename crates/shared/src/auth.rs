use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

/// Tokens expiring sooner than this are refreshed before use
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Supplies a valid bearer token for Google APIs
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Google "authorized user" credentials as written by the OAuth consent flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub expiry: Option<DateTime<Utc>>,
    /// Fields this crate does not use, kept so the file is written back intact
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl AuthorizedUser {
    /// True when there is an access token that will outlive the safety margin
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        match (&self.token, self.expiry) {
            (Some(token), Some(expiry)) => {
                !token.is_empty() && expiry - Duration::seconds(EXPIRY_MARGIN_SECS) > now
            }
            (Some(token), None) => !token.is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Load credentials from a token file
pub fn load_token(path: &Path) -> Result<AuthorizedUser> {
    if !path.exists() {
        anyhow::bail!(
            "Token file not found: {}. Run the Google OAuth consent flow for the Sheets scope \
             and save the authorized user credentials there.",
            path.display()
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read token file: {}", path.display()))?;

    serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse token JSON from {}. The file may be corrupted.",
            path.display()
        )
    })
}

/// Save credentials back to a token file
pub fn save_token(path: &Path, user: &AuthorizedUser) -> Result<()> {
    let json = serde_json::to_string_pretty(user).context("Failed to serialize token")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write token file: {}", path.display()))?;
    Ok(())
}

/// Reads a token file and refreshes it in place when the access token is stale
pub struct TokenFileProvider {
    client: Client,
    path: PathBuf,
    cached: Mutex<Option<AuthorizedUser>>,
}

impl TokenFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            path: path.into(),
            cached: Mutex::new(None),
        })
    }

    async fn refresh(&self, user: &mut AuthorizedUser) -> Result<()> {
        let refresh_token = user
            .refresh_token
            .as_deref()
            .context("Access token expired and the token file has no refresh_token")?;

        let body = format!(
            "grant_type=refresh_token&refresh_token={}&client_id={}&client_secret={}",
            urlencoding::encode(refresh_token),
            urlencoding::encode(&user.client_id),
            urlencoding::encode(&user.client_secret)
        );

        let response = self
            .client
            .post(&user.token_uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .context("Failed to send token refresh request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Token refresh failed: {} - {}", status, error_text);
        }

        let refreshed = response
            .json::<RefreshResponse>()
            .await
            .context("Failed to parse token refresh response")?;

        user.token = Some(refreshed.access_token);
        user.expiry = refreshed
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));

        Ok(())
    }
}

#[async_trait]
impl AccessTokenProvider for TokenFileProvider {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        let mut user = match cached.take() {
            Some(user) => user,
            None => load_token(&self.path)?,
        };

        if !user.is_valid(Utc::now()) {
            info!("Refreshing Google access token");
            self.refresh(&mut user).await?;
            save_token(&self.path, &user)?;
        }

        let token = user.token.clone().unwrap_or_default();
        *cached = Some(user);
        Ok(token)
    }
}
