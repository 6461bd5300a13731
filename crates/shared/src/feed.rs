use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::claude::{GenerationRequest, TextGenerator};
use crate::models::NewsItem;

const GOOGLE_NEWS_URL: &str = "https://news.google.com/rss?hl=en-US&gl=US&ceid=US:en";
const NEWS_API_URL: &str = "https://newsapi.org";

/// Raw feed of news items in delivery order
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_items(&self) -> Result<Vec<NewsItem>>;
}

/// Predicate deciding whether an item should be left out of the run
#[async_trait]
pub trait ExclusionFilter: Send + Sync {
    async fn is_excluded(&self, title: &str, description: &str) -> bool;
}

/// Bounded, optionally filtered view over a feed
pub struct NewsSource {
    feed: Arc<dyn FeedSource>,
    filter: Option<Arc<dyn ExclusionFilter>>,
}

impl NewsSource {
    pub fn new(feed: Arc<dyn FeedSource>) -> Self {
        Self { feed, filter: None }
    }

    pub fn with_filter(mut self, filter: Arc<dyn ExclusionFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Returns up to `max_items` accepted items in feed order.
    ///
    /// `None` means the feed could not be read at all, which is different from
    /// a feed that was read and had nothing in it.
    pub async fn fetch(&self, max_items: usize) -> Option<Vec<NewsItem>> {
        let items = match self.feed.fetch_items().await {
            Ok(items) => items,
            Err(e) => {
                warn!("Unable to fetch news: {:#}", e);
                return None;
            }
        };

        let mut accepted = Vec::new();
        for item in items {
            if accepted.len() >= max_items {
                break;
            }

            if let Some(filter) = &self.filter {
                let description = item.description.as_deref().unwrap_or("");
                if filter.is_excluded(&item.title, description).await {
                    info!("Skipping filtered item: {}", item.title);
                    continue;
                }
            }

            accepted.push(item);
        }

        Some(accepted)
    }
}

/// Top stories from the Google News RSS feed
pub struct GoogleNewsFeed {
    client: Client,
    url: String,
}

impl GoogleNewsFeed {
    pub fn new() -> Result<Self> {
        Self::with_url(GOOGLE_NEWS_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; NewsToBlog/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FeedSource for GoogleNewsFeed {
    async fn fetch_items(&self) -> Result<Vec<NewsItem>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to fetch Google News feed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Google News returned status {}", status);
        }

        let content = response
            .bytes()
            .await
            .context("Failed to read Google News feed")?;

        let channel = rss::Channel::read_from(&content[..])
            .context("Failed to parse Google News RSS")?;

        Ok(parse_channel(&channel))
    }
}

/// Converts RSS items into news items, skipping entries without a title or link
pub fn parse_channel(channel: &rss::Channel) -> Vec<NewsItem> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title()?.trim();
            let link = item.link()?.trim();
            if title.is_empty() || link.is_empty() {
                return None;
            }
            Some(NewsItem {
                title: title.to_string(),
                link: link.to_string(),
                description: item.description().map(|d| d.to_string()),
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    content: Option<String>,
}

/// Top US headlines from NewsAPI
pub struct NewsApiFeed {
    client: Client,
    api_key: String,
    page_size: usize,
    base_url: String,
}

impl NewsApiFeed {
    pub fn new(api_key: String, page_size: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("NewsToBlog/1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            page_size,
            base_url: NEWS_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl FeedSource for NewsApiFeed {
    async fn fetch_items(&self) -> Result<Vec<NewsItem>> {
        let url = format!(
            "{}/v2/top-headlines?country=us&pageSize={}&apiKey={}",
            self.base_url.trim_end_matches('/'),
            self.page_size,
            urlencoding::encode(&self.api_key)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch headlines from NewsAPI")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("NewsAPI returned error: {} - {}", status, error_text);
        }

        let body = response
            .json::<NewsApiResponse>()
            .await
            .context("Failed to parse NewsAPI response")?;

        let items = body
            .articles
            .into_iter()
            .filter_map(|article| {
                let title = article.title.filter(|t| !t.trim().is_empty())?;
                let link = article.url.filter(|u| !u.trim().is_empty())?;
                let description = article
                    .content
                    .filter(|c| !c.trim().is_empty())
                    .or(article.description);
                Some(NewsItem {
                    title,
                    link,
                    description,
                })
            })
            .collect();

        Ok(items)
    }
}

/// Asks the generation backend whether an item is political news
pub struct PoliticalNewsFilter {
    generator: Arc<dyn TextGenerator>,
}

impl PoliticalNewsFilter {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ExclusionFilter for PoliticalNewsFilter {
    async fn is_excluded(&self, title: &str, description: &str) -> bool {
        let request = GenerationRequest::new(
            format!(
                "Is this news article political? Title: '{}'\n\nText: {}",
                title, description
            ),
            50,
        )
        .system(
            "You are an AI assistant that determines if a news article is political or not. \
             Respond with only 'True' for political news or 'False' for non-political news.",
        )
        .temperature(0.0);

        match self.generator.generate(request).await {
            Ok(answer) => answer.trim().eq_ignore_ascii_case("true"),
            Err(e) => {
                // Unclassifiable items are kept
                warn!("Political classification failed for '{}': {:#}", title, e);
                false
            }
        }
    }
}
