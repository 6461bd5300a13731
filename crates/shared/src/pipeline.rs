use std::sync::Arc;
use tracing::{error, info, warn};

use crate::composer::PostComposer;
use crate::extractor::ContentSource;
use crate::feed::NewsSource;
use crate::models::{NewsItem, PostRecord, SummaryBundle, URL_UNAVAILABLE};
use crate::rewriter::TitleRewriter;
use crate::sink::RowSink;
use crate::summarizer::Summarizer;
use crate::video::VideoFinder;

pub const DEFAULT_MAX_ITEMS: usize = 10;

/// Outcome of a single run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Items returned by the news source
    pub fetched: usize,
    /// Rows the sink accepted
    pub persisted: usize,
    /// Row indices the sink rejected
    pub failed_rows: Vec<usize>,
}

impl RunReport {
    pub fn no_data(&self) -> bool {
        self.fetched == 0
    }
}

/// Carries each news item through every stage, one article at a time
pub struct Pipeline {
    source: NewsSource,
    content: Arc<dyn ContentSource>,
    summarizer: Arc<dyn Summarizer>,
    rewriter: Arc<dyn TitleRewriter>,
    videos: VideoFinder,
    composer: Arc<dyn PostComposer>,
    sink: Arc<dyn RowSink>,
}

impl Pipeline {
    pub fn new(
        source: NewsSource,
        content: Arc<dyn ContentSource>,
        summarizer: Arc<dyn Summarizer>,
        rewriter: Arc<dyn TitleRewriter>,
        videos: VideoFinder,
        composer: Arc<dyn PostComposer>,
        sink: Arc<dyn RowSink>,
    ) -> Self {
        Self {
            source,
            content,
            summarizer,
            rewriter,
            videos,
            composer,
            sink,
        }
    }

    pub async fn run(&self, max_items: usize) -> RunReport {
        let mut report = RunReport::default();

        let items = match self.source.fetch(max_items).await {
            Some(items) if !items.is_empty() => items,
            _ => {
                warn!("No news articles found");
                return report;
            }
        };
        report.fetched = items.len();
        info!("Processing {} articles", items.len());

        for (i, item) in items.iter().enumerate() {
            let row_index = i + 1;
            info!("[{}/{}] {}", row_index, items.len(), item.title);

            let record = self.process(item).await;

            // A failed row is not retried and does not stop the run
            match self.sink.append(row_index, &record).await {
                Ok(()) => report.persisted += 1,
                Err(e) => {
                    error!("Failed to store row {} ('{}'): {:#}", row_index, record.title, e);
                    report.failed_rows.push(row_index);
                }
            }
        }

        report
    }

    /// Builds the finished record for one item. Every stage falls back to a
    /// sentinel, so this always produces a record.
    pub async fn process(&self, item: &NewsItem) -> PostRecord {
        let bundle = self.summarize(item).await;
        let title = self.rewriter.rewrite(&item.title).await;
        let video = self.videos.find(&bundle.video_search_phrase).await;
        let body = self.composer.compose(&title, &bundle, video.as_ref()).await;

        PostRecord {
            title,
            body,
            hashtag: bundle.hashtag,
            video_search_phrase: bundle.video_search_phrase,
            video_link: video.map(|v| v.link),
        }
    }

    async fn summarize(&self, item: &NewsItem) -> SummaryBundle {
        let text = match self.content.resolve(&item.link).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Unable to fetch article '{}': {:#}", item.title, e);
                match item.fallback_text() {
                    Some(description) => {
                        info!("Using feed description for '{}'", item.title);
                        description.to_string()
                    }
                    None => return SummaryBundle::unavailable(URL_UNAVAILABLE),
                }
            }
        };

        self.summarizer.summarize(&item.title, &text).await
    }
}
