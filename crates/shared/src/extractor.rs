use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::info;
use url::Url;

/// Turns an article link into plain article text
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn resolve(&self, link: &str) -> Result<String>;
}

pub struct ContentExtractor {
    client: Client,
}

impl ContentExtractor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; NewsToBlog/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Follows redirects and returns the URL the link finally lands on
    pub async fn resolve_url(&self, link: &str) -> Result<Url> {
        let response = self
            .client
            .get(link)
            .send()
            .await
            .with_context(|| format!("Unable to resolve original URL for {}", link))?;

        Ok(response.url().clone())
    }

    /// Fetches a page and returns its visible text
    pub async fn fetch_text(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        let html = response.text().await.context("Failed to read response body")?;

        Ok(visible_text(&html))
    }
}

#[async_trait]
impl ContentSource for ContentExtractor {
    async fn resolve(&self, link: &str) -> Result<String> {
        let original_url = self.resolve_url(link).await?;
        let text = self.fetch_text(&original_url).await?;

        if text.trim().is_empty() {
            anyhow::bail!("No visible text at {}", original_url);
        }

        info!("Extracted {} chars from {}", text.len(), original_url);
        Ok(text)
    }
}

/// Renders an HTML document to plain text, dropping markup and scripts
pub fn visible_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_strips_markup() {
        let html = "<html><body><h1>Headline</h1><p>First <b>bold</b> paragraph.</p></body></html>";
        let text = visible_text(html);

        assert!(text.contains("Headline"));
        assert!(text.contains("paragraph."));
        assert!(!text.contains("<p>"));
    }
}
