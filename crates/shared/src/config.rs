use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::claude::DEFAULT_MODEL;

const APP_DIR: &str = "news-to-blog";

#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub youtube_api_key: Option<String>,
    pub news_api_key: Option<String>,
    pub huggingface_api_token: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub google_token_file: PathBuf,
    pub sheet_name: String,
}

impl Config {
    pub fn from_env() -> Self {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        Self {
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            anthropic_model: var("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            youtube_api_key: var("YOUTUBE_API_KEY"),
            news_api_key: var("NEWS_API"),
            huggingface_api_token: var("HUGGINGFACE_API_TOKEN"),
            spreadsheet_id: var("GOOGLE_SPREADSHEET_ID"),
            google_token_file: var("GOOGLE_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("token.json")),
            sheet_name: var("GOOGLE_SHEET_NAME").unwrap_or_else(|| "Sheet1".to_string()),
        }
    }

    pub fn anthropic_api_key(&self) -> Result<String> {
        require(
            &self.anthropic_api_key,
            "ANTHROPIC_API_KEY",
            "Get your Anthropic API key from: https://console.anthropic.com/settings/keys",
        )
    }

    pub fn youtube_api_key(&self) -> Result<String> {
        require(
            &self.youtube_api_key,
            "YOUTUBE_API_KEY",
            "Create a YouTube Data API v3 key at: https://console.cloud.google.com/apis/credentials",
        )
    }

    pub fn news_api_key(&self) -> Result<String> {
        require(
            &self.news_api_key,
            "NEWS_API",
            "Get your NewsAPI key from: https://newsapi.org/register",
        )
    }

    pub fn huggingface_api_token(&self) -> Result<String> {
        require(
            &self.huggingface_api_token,
            "HUGGINGFACE_API_TOKEN",
            "Create a Hugging Face access token at: https://huggingface.co/settings/tokens",
        )
    }

    pub fn spreadsheet_id(&self) -> Result<String> {
        require(
            &self.spreadsheet_id,
            "GOOGLE_SPREADSHEET_ID",
            "Use the ID from the spreadsheet URL: https://docs.google.com/spreadsheets/d/<ID>/edit",
        )
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/news-to-blog/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join(APP_DIR).join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() && dotenvy::from_path(&home_path).is_ok() {
                return;
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn require(value: &Option<String>, name: &str, hint: &str) -> Result<String> {
    value.clone().with_context(|| {
        format!(
            "{name} not found.\n\n\
            To fix this, set it in the environment or in ~/.config/{APP_DIR}/.env:\n  \
            {name}=your_value_here\n\n\
            {hint}"
        )
    })
}
