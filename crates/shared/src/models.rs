use serde::{Deserialize, Serialize};

/// Placeholder for any field the upstream response did not provide
pub const NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_HASHTAG: &str = "#News";
pub const NO_VIDEO_FOUND: &str = "No video found";
pub const SUMMARY_UNAVAILABLE: &str = "Unable to generate summary.";
pub const POST_UNAVAILABLE: &str = "Unable to generate blog post.";
pub const URL_UNAVAILABLE: &str = "Unable to get original URL.";

/// Number of `|||`-delimited parts a summary response carries
pub const SUMMARY_PARTS: usize = 5;
pub const SUMMARY_DELIMITER: &str = "|||";

/// A single entry delivered by a news feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Feed-provided text, if it carries anything besides whitespace
    pub fn fallback_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// Everything the summarization stage produces for one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBundle {
    pub summary: String,
    pub hashtag: String,
    pub educational_content: String,
    pub entity_summaries: String,
    pub video_search_phrase: String,
}

impl SummaryBundle {
    /// Bundle used when no summary could be produced at all
    pub fn unavailable(reason: &str) -> Self {
        Self {
            summary: reason.to_string(),
            hashtag: DEFAULT_HASHTAG.to_string(),
            educational_content: String::new(),
            entity_summaries: String::new(),
            video_search_phrase: String::new(),
        }
    }

    /// Builds a bundle from a delimited model response.
    ///
    /// Missing parts become `N/A` and anything past the fifth part is dropped.
    /// Also returns how many parts the response actually contained.
    pub fn from_delimited(text: &str) -> (Self, usize) {
        let mut parts: Vec<String> = text
            .trim()
            .split(SUMMARY_DELIMITER)
            .map(|p| p.trim().to_string())
            .collect();
        let found = parts.len();

        parts.resize(SUMMARY_PARTS, NOT_AVAILABLE.to_string());
        let mut parts = parts.into_iter();
        let mut next = || parts.next().unwrap_or_default();

        let bundle = Self {
            summary: next(),
            hashtag: next(),
            educational_content: next(),
            entity_summaries: next(),
            video_search_phrase: next(),
        };

        (bundle, found)
    }

    pub fn has_search_phrase(&self) -> bool {
        is_search_phrase(&self.video_search_phrase)
    }
}

/// True when a phrase is worth sending to a video search
pub fn is_search_phrase(phrase: &str) -> bool {
    let phrase = phrase.trim();
    !phrase.is_empty() && phrase != NOT_AVAILABLE
}

/// Best-match video for an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub link: String,
    pub title: String,
    pub description: String,
}

/// One finished row, ready for the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub title: String,
    pub body: String,
    pub hashtag: String,
    pub video_search_phrase: String,
    pub video_link: Option<String>,
}

impl PostRecord {
    pub fn video_link_or_sentinel(&self) -> &str {
        self.video_link.as_deref().unwrap_or(NO_VIDEO_FOUND)
    }

    /// Column values in sheet order
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.body.clone(),
            self.hashtag.clone(),
            self.video_search_phrase.clone(),
            self.video_link_or_sentinel().to_string(),
        ]
    }
}
