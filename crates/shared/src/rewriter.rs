use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::claude::{GenerationRequest, TextGenerator};

/// Produces a headline for the finished post. Never fails.
#[async_trait]
pub trait TitleRewriter: Send + Sync {
    async fn rewrite(&self, title: &str) -> String;
}

/// Prepends a fixed label to the original title
pub struct PrefixTitleRewriter {
    prefix: String,
}

impl PrefixTitleRewriter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for PrefixTitleRewriter {
    fn default() -> Self {
        Self::new("Breaking: ")
    }
}

#[async_trait]
impl TitleRewriter for PrefixTitleRewriter {
    async fn rewrite(&self, title: &str) -> String {
        format!("{}{}", self.prefix, title)
    }
}

pub struct ClaudeTitleRewriter {
    generator: Arc<dyn TextGenerator>,
}

impl ClaudeTitleRewriter {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl TitleRewriter for ClaudeTitleRewriter {
    async fn rewrite(&self, title: &str) -> String {
        let request = GenerationRequest::new(
            format!(
                "Rewrite the following news title without citing any source, making it catchy and \
                 engaging. Provide only the rewritten title without any additional text: '{}'",
                title
            ),
            50,
        )
        .system(
            "You are an AI assistant that rewrites news titles to be catchy and engaging without \
             citing any source. Provide only the rewritten title without any additional text.",
        );

        match self.generator.generate(request).await {
            Ok(rewritten) if !rewritten.trim().is_empty() => rewritten.trim().to_string(),
            Ok(_) => {
                warn!("Empty title rewrite for '{}', keeping original", title);
                title.to_string()
            }
            Err(e) => {
                warn!("Error rewriting title '{}': {:#}", title, e);
                title.to_string()
            }
        }
    }
}
