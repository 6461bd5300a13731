// Public modules
pub mod auth;
pub mod chunker;
pub mod claude;
pub mod composer;
pub mod config;
pub mod extractor;
pub mod feed;
pub mod models;
pub mod pipeline;
pub mod rewriter;
pub mod sink;
pub mod summarizer;
pub mod video;

// Re-export commonly used types
pub use auth::{AccessTokenProvider, TokenFileProvider};
pub use chunker::split_text;
pub use claude::{ClaudeClient, GenerationRequest, TextGenerator};
pub use composer::{ClaudePostComposer, PostComposer, TemplatePostComposer};
pub use config::Config;
pub use extractor::{ContentExtractor, ContentSource};
pub use feed::{
    ExclusionFilter, FeedSource, GoogleNewsFeed, NewsApiFeed, NewsSource, PoliticalNewsFilter,
};
pub use models::{NewsItem, PostRecord, SummaryBundle, VideoInfo};
pub use pipeline::{Pipeline, RunReport, DEFAULT_MAX_ITEMS};
pub use rewriter::{ClaudeTitleRewriter, PrefixTitleRewriter, TitleRewriter};
pub use sink::{GoogleSheetsSink, RowSink, StdoutSink};
pub use summarizer::{
    ClaudeSummarizer, HuggingFaceSummarizer, LocalSummarizer, SummarizationModel, Summarizer,
};
pub use video::{VideoFinder, VideoSearch, YouTubeClient};
