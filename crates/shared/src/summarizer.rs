use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::chunker::{split_text, DEFAULT_CHUNK_LENGTH};
use crate::claude::{GenerationRequest, TextGenerator};
use crate::models::{
    SummaryBundle, NOT_AVAILABLE, SUMMARY_DELIMITER, SUMMARY_PARTS, SUMMARY_UNAVAILABLE,
};

/// Article text beyond this many characters is not sent to the model
const PROMPT_ARTICLE_CHARS: usize = 2000;

const LOCAL_HASHTAGS: &str = "#NewsUpdate #BreakingNews";
const SEARCH_QUERY_WORDS: usize = 5;

/// Produces the five-part summary bundle for an article. Never fails.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, title: &str, article_text: &str) -> SummaryBundle;
}

/// Summarizes with one structured prompt to a chat model
pub struct ClaudeSummarizer {
    generator: Arc<dyn TextGenerator>,
}

impl ClaudeSummarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    async fn try_summarize(&self, title: &str, article_text: &str) -> Result<SummaryBundle> {
        let prompt = format!(
            "Summarize the following news article in five parts: \
             1) A brief 5-minute read summary. \
             2) A relevant hashtag for the article. \
             3) Educational content related to key terms or concepts in the summary (2-3 paragraphs max). \
             4) Short summaries of any places, person names, company names, brand names, business names, \
             sports club names, food names, device names, tool names, country names, region names, \
             or geographical feature names mentioned in the summary. \
             5) A short phrase or a few keywords (1-5 words) that capture the main topic or focus of \
             the article, suitable for a YouTube search. \
             Separate the five parts with '{}'. Title: {}\n\nArticle content: {}...",
            SUMMARY_DELIMITER,
            title,
            truncate_chars(article_text, PROMPT_ARTICLE_CHARS)
        );

        let request = GenerationRequest::new(prompt, 1000).system(format!(
            "You are an AI assistant that summarizes news articles concisely, provides educational \
             context, gives short summaries of important names or entities mentioned, and creates a \
             short phrase or keywords for YouTube search. Always provide five parts in your response, \
             separated by '{}'. Do not include any labels or numbering for the parts.",
            SUMMARY_DELIMITER
        ));

        let response = self.generator.generate(request).await?;

        let (mut bundle, found) = SummaryBundle::from_delimited(&response);
        if found != SUMMARY_PARTS {
            warn!(
                "Expected {} parts in the summary, but got {}. Adjusting...",
                SUMMARY_PARTS, found
            );
        }

        if bundle.video_search_phrase == NOT_AVAILABLE {
            info!("Search phrase is {}, asking for one", NOT_AVAILABLE);
            if let Some(phrase) = self.search_phrase(title, &bundle.summary).await {
                bundle.video_search_phrase = phrase;
            }
        }

        Ok(bundle)
    }

    async fn search_phrase(&self, title: &str, summary: &str) -> Option<String> {
        let request = GenerationRequest::new(
            format!(
                "Create a short phrase or a few keywords (1-5 words) that capture the main topic or \
                 focus of this article, suitable for a YouTube search. Title: {}\n\nSummary: {}",
                title, summary
            ),
            20,
        )
        .system(
            "You are an AI assistant that creates short, relevant phrases or keywords for YouTube \
             searches based on news articles. Provide only the search phrase or keywords without \
             any additional text.",
        );

        match self.generator.generate(request).await {
            Ok(phrase) => Some(phrase.trim().to_string()).filter(|p| !p.is_empty()),
            Err(e) => {
                warn!("Failed to generate search phrase: {:#}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Summarizer for ClaudeSummarizer {
    async fn summarize(&self, title: &str, article_text: &str) -> SummaryBundle {
        match self.try_summarize(title, article_text).await {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!("Error summarizing article '{}': {:#}", title, e);
                SummaryBundle::unavailable(SUMMARY_UNAVAILABLE)
            }
        }
    }
}

/// Output length window for a summarization model, in tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    pub min_length: u32,
    pub max_length: u32,
}

impl Default for LengthBounds {
    fn default() -> Self {
        Self {
            min_length: 40,
            max_length: 150,
        }
    }
}

/// Abstractive summarization of a single chunk of text
#[async_trait]
pub trait SummarizationModel: Send + Sync {
    async fn summarize_chunk(&self, chunk: &str, bounds: LengthBounds) -> Result<String>;
}

/// Chunked summarization with templated extras
pub struct LocalSummarizer {
    model: Arc<dyn SummarizationModel>,
    chunk_length: usize,
    bounds: LengthBounds,
    input_limit: Option<usize>,
}

impl LocalSummarizer {
    pub fn new(model: Arc<dyn SummarizationModel>) -> Self {
        Self {
            model,
            chunk_length: DEFAULT_CHUNK_LENGTH,
            bounds: LengthBounds::default(),
            input_limit: None,
        }
    }

    /// Only the first `max_chars` characters of an article are chunked, which
    /// caps the number of model calls per article
    pub fn with_input_limit(mut self, max_chars: usize) -> Self {
        self.input_limit = Some(max_chars);
        self
    }

    async fn summarize_text(&self, article_text: &str) -> Result<String> {
        let text = match self.input_limit {
            Some(limit) => truncate_chars(article_text, limit),
            None => article_text,
        };

        let mut summaries = Vec::new();
        for chunk in split_text(text, self.chunk_length) {
            let summary = self.model.summarize_chunk(&chunk, self.bounds).await?;
            summaries.push(summary.trim().to_string());
        }
        Ok(summaries.join(" "))
    }
}

#[async_trait]
impl Summarizer for LocalSummarizer {
    async fn summarize(&self, title: &str, article_text: &str) -> SummaryBundle {
        let summary = match self.summarize_text(article_text).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Error summarizing article '{}': {:#}", title, e);
                return SummaryBundle::unavailable(SUMMARY_UNAVAILABLE);
            }
        };

        SummaryBundle {
            hashtag: LOCAL_HASHTAGS.to_string(),
            educational_content: format!("Did you know? {}", summary),
            entity_summaries: NOT_AVAILABLE.to_string(),
            video_search_phrase: search_query(&summary),
            summary,
        }
    }
}

/// First few words of a summary, or `N/A` when there are none
pub fn search_query(summary: &str) -> String {
    let words: Vec<&str> = summary.split_whitespace().take(SEARCH_QUERY_WORDS).collect();
    if words.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        words.join(" ")
    }
}

/// Truncates to `max_chars` characters, respecting UTF-8 boundaries
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

const HUGGINGFACE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_SUMMARIZATION_MODEL: &str = "facebook/bart-large-cnn";

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    min_length: u32,
    max_length: u32,
    do_sample: bool,
}

#[derive(Deserialize)]
struct InferenceOutput {
    summary_text: String,
}

/// Hosted BART summarization through the Hugging Face Inference API
pub struct HuggingFaceSummarizer {
    client: Client,
    api_token: String,
    model: String,
    base_url: String,
}

impl HuggingFaceSummarizer {
    pub fn new(api_token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_token,
            model: DEFAULT_SUMMARIZATION_MODEL.to_string(),
            base_url: HUGGINGFACE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SummarizationModel for HuggingFaceSummarizer {
    async fn summarize_chunk(&self, chunk: &str, bounds: LengthBounds) -> Result<String> {
        let request = InferenceRequest {
            inputs: chunk,
            parameters: InferenceParameters {
                min_length: bounds.min_length,
                max_length: bounds.max_length,
                do_sample: false,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}",
                self.base_url.trim_end_matches('/'),
                self.model
            ))
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&request)
            .send()
            .await
            .context("Failed to send request to summarization model")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Summarization model error {}: {}", status, error_text);
        }

        let outputs = response
            .json::<Vec<InferenceOutput>>()
            .await
            .context("Failed to parse summarization model response")?;

        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text)
            .context("Summarization model returned no output")
    }
}
