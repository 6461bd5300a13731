use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::auth::AccessTokenProvider;
use crate::models::PostRecord;

const SHEETS_API_URL: &str = "https://sheets.googleapis.com";

/// Persistent destination for finished posts, one row per article
#[async_trait]
pub trait RowSink: Send + Sync {
    /// `row_index` is 1-based and follows processing order
    async fn append(&self, row_index: usize, record: &PostRecord) -> Result<()>;
}

/// Prints each post followed by a separator rule
pub struct StdoutSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowSink for StdoutSink {
    async fn append(&self, _row_index: usize, record: &PostRecord) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow::anyhow!("Output writer lock poisoned"))?;
        writeln!(out, "{}", record.body).context("Failed to write post")?;
        writeln!(out, "\n{}\n", "=".repeat(80)).context("Failed to write post")?;
        out.flush().context("Failed to flush output")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ValueRange {
    values: Vec<Vec<String>>,
}

/// Appends rows to a Google Sheets spreadsheet
pub struct GoogleSheetsSink {
    client: Client,
    spreadsheet_id: String,
    sheet_name: String,
    tokens: Arc<dyn AccessTokenProvider>,
    base_url: String,
}

impl GoogleSheetsSink {
    pub fn new(
        spreadsheet_id: String,
        sheet_name: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            spreadsheet_id,
            sheet_name: sheet_name.into(),
            tokens,
            base_url: SHEETS_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// A1 range covering the five columns of one row
    pub fn range(&self, row_index: usize) -> String {
        format!("{}!A{}:E{}", self.sheet_name, row_index, row_index)
    }
}

#[async_trait]
impl RowSink for GoogleSheetsSink {
    async fn append(&self, row_index: usize, record: &PostRecord) -> Result<()> {
        let token = self
            .tokens
            .access_token()
            .await
            .context("Failed to obtain Google access token")?;

        let range = self.range(row_index);
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append?valueInputOption=RAW",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(&range)
        );

        let body = ValueRange {
            values: vec![record.to_row()],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("Failed to send append request to Google Sheets")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Google Sheets error {}: {}", status, error_text);
        }

        info!("Data appended to {}", range);
        Ok(())
    }
}
