use anyhow::Result;
use clap::Parser;
use shared::{
    ClaudeClient, ClaudePostComposer, ClaudeSummarizer, ClaudeTitleRewriter, Config,
    ContentExtractor, GoogleNewsFeed, GoogleSheetsSink, NewsSource, Pipeline,
    PoliticalNewsFilter, TextGenerator, TokenFileProvider, VideoFinder, YouTubeClient,
    DEFAULT_MAX_ITEMS,
};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "publish-posts")]
#[command(about = "Turn today's top Google News stories into blog posts and append them to a Google Sheet")]
struct Args {
    /// Number of articles to process
    #[arg(short, long, default_value_t = DEFAULT_MAX_ITEMS)]
    max_items: usize,

    /// Keep political stories instead of filtering them out
    #[arg(long)]
    include_political: bool,

    /// Log filter, e.g. "info" or "shared=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let config = Config::from_env();

    let claude: Arc<dyn TextGenerator> = Arc::new(ClaudeClient::new(
        config.anthropic_api_key()?,
        config.anthropic_model.clone(),
    )?);

    let mut source = NewsSource::new(Arc::new(GoogleNewsFeed::new()?));
    if !args.include_political {
        source = source.with_filter(Arc::new(PoliticalNewsFilter::new(claude.clone())));
    }

    let tokens = Arc::new(TokenFileProvider::new(config.google_token_file.clone())?);
    let sink = GoogleSheetsSink::new(config.spreadsheet_id()?, config.sheet_name.clone(), tokens)?;

    let pipeline = Pipeline::new(
        source,
        Arc::new(ContentExtractor::new()?),
        Arc::new(ClaudeSummarizer::new(claude.clone())),
        Arc::new(ClaudeTitleRewriter::new(claude.clone())),
        VideoFinder::new(Arc::new(YouTubeClient::new(config.youtube_api_key()?)?)),
        Arc::new(ClaudePostComposer::new(claude)),
        Arc::new(sink),
    );

    println!("\n📰 Fetching top stories from Google News...");
    let report = pipeline.run(args.max_items).await;

    if report.no_data() {
        println!("No news articles found from Google News.");
        return Ok(());
    }

    println!(
        "\n✅ Appended {}/{} posts to {}",
        report.persisted, report.fetched, config.sheet_name
    );
    if !report.failed_rows.is_empty() {
        println!("⚠ Failed rows: {:?}", report.failed_rows);
    }

    Ok(())
}
