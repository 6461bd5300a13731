use anyhow::Result;
use clap::Parser;
use shared::{
    Config, ContentExtractor, HuggingFaceSummarizer, LocalSummarizer, NewsApiFeed, NewsSource,
    Pipeline, PrefixTitleRewriter, StdoutSink, TemplatePostComposer, VideoFinder, YouTubeClient,
    DEFAULT_MAX_ITEMS,
};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

/// Page text beyond this is not summarized; full pages carry navigation and
/// footer text after the story
const ARTICLE_CHAR_LIMIT: usize = 2000;

#[derive(Parser)]
#[command(name = "draft-posts")]
#[command(about = "Draft templated blog posts from NewsAPI top headlines and print them")]
struct Args {
    /// Number of articles to process
    #[arg(short, long, default_value_t = DEFAULT_MAX_ITEMS)]
    max_items: usize,

    /// Log filter, e.g. "info" or "shared=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Posts go to stdout, diagnostics to stderr
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();

    let feed = NewsApiFeed::new(config.news_api_key()?, args.max_items)?;
    let model = HuggingFaceSummarizer::new(config.huggingface_api_token()?)?;
    let summarizer = LocalSummarizer::new(Arc::new(model)).with_input_limit(ARTICLE_CHAR_LIMIT);

    let pipeline = Pipeline::new(
        NewsSource::new(Arc::new(feed)),
        Arc::new(ContentExtractor::new()?),
        Arc::new(summarizer),
        Arc::new(PrefixTitleRewriter::default()),
        VideoFinder::new(Arc::new(YouTubeClient::new(config.youtube_api_key()?)?)),
        Arc::new(TemplatePostComposer),
        Arc::new(StdoutSink::new()),
    );

    let report = pipeline.run(args.max_items).await;

    if report.no_data() {
        eprintln!("No news articles found from NewsAPI.");
        return Ok(());
    }

    eprintln!("✓ Drafted {}/{} posts", report.persisted, report.fetched);

    Ok(())
}
