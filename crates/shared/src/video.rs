use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{is_search_phrase, VideoInfo};

const YOUTUBE_API_URL: &str = "https://www.googleapis.com";

/// Top-1 video search
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn top_result(&self, query: &str) -> Result<Option<VideoInfo>>;
}

/// Finds a related video for a search phrase, swallowing every failure
pub struct VideoFinder {
    search: Arc<dyn VideoSearch>,
}

impl VideoFinder {
    pub fn new(search: Arc<dyn VideoSearch>) -> Self {
        Self { search }
    }

    pub async fn find(&self, search_phrase: &str) -> Option<VideoInfo> {
        if !is_search_phrase(search_phrase) {
            info!("No usable search phrase, skipping video search");
            return None;
        }

        match self.search.top_result(search_phrase.trim()).await {
            Ok(Some(video)) => Some(video),
            Ok(None) => {
                info!("No relevant videos found for '{}'", search_phrase);
                None
            }
            Err(e) => {
                warn!("Error searching videos for '{}': {:#}", search_phrase, e);
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
}

/// YouTube Data API v3 search client
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: YOUTUBE_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl VideoSearch for YouTubeClient {
    async fn top_result(&self, query: &str) -> Result<Option<VideoInfo>> {
        let url = format!(
            "{}/youtube/v3/search?part=id,snippet&type=video&maxResults=1&q={}&key={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send YouTube search request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("YouTube API error {}: {}", status, error_text);
        }

        let search = response
            .json::<SearchResponse>()
            .await
            .context("Failed to parse YouTube search response")?;

        Ok(search.items.into_iter().next().map(|item| VideoInfo {
            link: format!("https://www.youtube.com/watch?v={}", item.id.video_id),
            title: item.snippet.title,
            description: item.snippet.description,
        }))
    }
}
