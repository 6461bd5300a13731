use mockito::Matcher;
use shared::auth::{load_token, AuthorizedUser};
use shared::summarizer::LengthBounds;
use shared::{
    AccessTokenProvider, ClaudeClient, ContentExtractor, ContentSource, FeedSource,
    GenerationRequest, GoogleNewsFeed, GoogleSheetsSink, HuggingFaceSummarizer, NewsApiFeed,
    NewsSource, PostRecord, RowSink, SummarizationModel, TextGenerator, TokenFileProvider,
    VideoSearch, YouTubeClient,
};
use std::sync::Arc;

#[tokio::test]
async fn test_claude_client_sends_system_prompt() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "fake-api-key")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJsonString(
            r#"{
                "model": "claude-test",
                "max_tokens": 50,
                "system": "Answer briefly.",
                "messages": [{"role": "user", "content": "Hello?"}]
            }"#
            .to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "Hi there"}],
                "model": "claude-test",
                "stop_reason": "end_turn"
            }"#,
        )
        .create_async()
        .await;

    let client = ClaudeClient::new("fake-api-key".to_string(), "claude-test")
        .unwrap()
        .with_base_url(server.url());

    let text = client
        .generate(GenerationRequest::new("Hello?", 50).system("Answer briefly."))
        .await
        .unwrap();

    assert_eq!(text, "Hi there");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_claude_client_reports_api_errors() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/v1/messages")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(r#"{"type": "error", "error": {"type": "rate_limit_error"}}"#)
        .create_async()
        .await;

    let client = ClaudeClient::new("fake-api-key".to_string(), "claude-test")
        .unwrap()
        .with_base_url(server.url());

    let err = client
        .generate(GenerationRequest::new("Hello?", 50))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("429"));
    assert!(err.to_string().contains("rate_limit_error"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_extractor_follows_redirect_to_article() {
    let mut server = mockito::Server::new_async().await;

    let _redirect = server
        .mock("GET", "/rss/articles/abc")
        .with_status(302)
        .with_header("location", "/story")
        .create_async()
        .await;
    let _story = server
        .mock("GET", "/story")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(
            "<html><head><script>var tracker = 1;</script></head>\
             <body><p>Real article text.</p></body></html>",
        )
        .create_async()
        .await;

    let extractor = ContentExtractor::new().unwrap();
    let link = format!("{}/rss/articles/abc", server.url());

    let resolved = extractor.resolve_url(&link).await.unwrap();
    assert_eq!(resolved.path(), "/story");

    let text = extractor.resolve(&link).await.unwrap();
    assert!(text.contains("Real article text."));
    assert!(!text.contains("tracker"));
}

#[tokio::test]
async fn test_extractor_rejects_error_pages() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("<html><body>Not here</body></html>")
        .create_async()
        .await;

    let extractor = ContentExtractor::new().unwrap();
    let err = extractor
        .resolve(&format!("{}/missing", server.url()))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_extractor_rejects_blank_pages() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/blank")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("   \n\t  ")
        .create_async()
        .await;

    let extractor = ContentExtractor::new().unwrap();
    let err = extractor
        .resolve(&format!("{}/blank", server.url()))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("No visible text"));
}

#[tokio::test]
async fn test_youtube_client_maps_top_result() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/youtube/v3/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "mars rover".into()),
            Matcher::UrlEncoded("maxResults".into(), "1".into()),
            Matcher::UrlEncoded("type".into(), "video".into()),
            Matcher::UrlEncoded("key".into(), "yt-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "items": [{
                    "id": {"kind": "youtube#video", "videoId": "abc123"},
                    "snippet": {"title": "Rover lands", "description": "Footage of the landing"}
                }]
            }"#,
        )
        .create_async()
        .await;

    let client = YouTubeClient::new("yt-key".to_string())
        .unwrap()
        .with_base_url(server.url());

    let video = client.top_result("mars rover").await.unwrap().unwrap();

    assert_eq!(video.link, "https://www.youtube.com/watch?v=abc123");
    assert_eq!(video.title, "Rover lands");
    assert_eq!(video.description, "Footage of the landing");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_youtube_client_handles_no_results() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/youtube/v3/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items": []}"#)
        .create_async()
        .await;

    let client = YouTubeClient::new("yt-key".to_string())
        .unwrap()
        .with_base_url(server.url());

    assert!(client.top_result("nothing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_news_api_feed_prefers_content() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/v2/top-headlines")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("country".into(), "us".into()),
            Matcher::UrlEncoded("pageSize".into(), "10".into()),
            Matcher::UrlEncoded("apiKey".into(), "news-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "status": "ok",
                "totalResults": 3,
                "articles": [
                    {"title": "One", "url": "https://a.example/1", "description": "Desc one", "content": "Content one"},
                    {"title": "Two", "url": "https://a.example/2", "description": "Desc two", "content": null},
                    {"title": null, "url": "https://a.example/3", "description": null, "content": null}
                ]
            }"#,
        )
        .create_async()
        .await;

    let feed = NewsApiFeed::new("news-key".to_string(), 10)
        .unwrap()
        .with_base_url(server.url());

    let items = feed.fetch_items().await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].description.as_deref(), Some("Content one"));
    assert_eq!(items[1].description.as_deref(), Some("Desc two"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_feed_error_status_means_no_data() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/rss")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let feed = GoogleNewsFeed::with_url(format!("{}/rss?hl=en-US", server.url())).unwrap();
    let source = NewsSource::new(Arc::new(feed));

    assert!(source.fetch(10).await.is_none());
}

#[tokio::test]
async fn test_huggingface_summarizer_sends_length_bounds() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/models/facebook/bart-large-cnn")
        .match_header("authorization", "Bearer hf-token")
        .match_body(Matcher::PartialJsonString(
            r#"{
                "inputs": "Chunk text.",
                "parameters": {"min_length": 40, "max_length": 150, "do_sample": false}
            }"#
            .to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"summary_text": "Short summary."}]"#)
        .create_async()
        .await;

    let model = HuggingFaceSummarizer::new("hf-token".to_string())
        .unwrap()
        .with_base_url(server.url());

    let summary = model
        .summarize_chunk("Chunk text.", LengthBounds::default())
        .await
        .unwrap();

    assert_eq!(summary, "Short summary.");
    mock.assert_async().await;
}

fn write_token_file(dir: &tempfile::TempDir, token_uri: &str, expiry: &str) -> std::path::PathBuf {
    let path = dir.path().join("token.json");
    let json = format!(
        r#"{{
            "token": "stale-token",
            "refresh_token": "refresh-me",
            "token_uri": "{}",
            "client_id": "client-id",
            "client_secret": "client-secret",
            "scopes": ["https://www.googleapis.com/auth/spreadsheets"],
            "expiry": "{}",
            "universe_domain": "googleapis.com",
            "account": ""
        }}"#,
        token_uri, expiry
    );
    std::fs::write(&path, json).unwrap();
    path
}

#[tokio::test]
async fn test_token_provider_refreshes_expired_token() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_token_file(
        &dir,
        &format!("{}/token", server.url()),
        "2020-01-01T00:00:00Z",
    );

    let mock = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "refresh-me".into()),
            Matcher::UrlEncoded("client_id".into(), "client-id".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "fresh-token", "expires_in": 3599, "token_type": "Bearer"}"#)
        .expect(1)
        .create_async()
        .await;

    let provider = TokenFileProvider::new(&path).unwrap();

    assert_eq!(provider.access_token().await.unwrap(), "fresh-token");
    // Second call is served from the refreshed token
    assert_eq!(provider.access_token().await.unwrap(), "fresh-token");
    mock.assert_async().await;

    let saved: AuthorizedUser = load_token(&path).unwrap();
    assert_eq!(saved.token.as_deref(), Some("fresh-token"));
    assert_eq!(saved.refresh_token.as_deref(), Some("refresh-me"));
    assert!(saved.expiry.unwrap() > chrono::Utc::now());
    assert_eq!(saved.extra["universe_domain"], "googleapis.com");
    assert_eq!(saved.extra["account"], "");
}

#[tokio::test]
async fn test_token_provider_uses_valid_token_without_refresh() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_token_file(
        &dir,
        &format!("{}/token", server.url()),
        "2999-01-01T00:00:00Z",
    );

    let mock = server
        .mock("POST", "/token")
        .expect(0)
        .create_async()
        .await;

    let provider = TokenFileProvider::new(&path).unwrap();

    assert_eq!(provider.access_token().await.unwrap(), "stale-token");
    mock.assert_async().await;
}

struct FixedToken;

#[async_trait::async_trait]
impl AccessTokenProvider for FixedToken {
    async fn access_token(&self) -> anyhow::Result<String> {
        Ok("sheet-token".to_string())
    }
}

#[tokio::test]
async fn test_sheets_sink_appends_row() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock(
            "POST",
            Matcher::Regex(r"^/v4/spreadsheets/sheet-id/values/Sheet1(%21|!)A2(%3A|:)E2:append$".to_string()),
        )
        .match_query(Matcher::UrlEncoded("valueInputOption".into(), "RAW".into()))
        .match_header("authorization", "Bearer sheet-token")
        .match_body(Matcher::Json(serde_json::json!({
            "values": [["Title", "Body", "#Tag", "phrase", "No video found"]]
        })))
        .with_status(200)
        .with_body(r#"{"spreadsheetId": "sheet-id"}"#)
        .create_async()
        .await;

    let sink = GoogleSheetsSink::new("sheet-id".to_string(), "Sheet1", Arc::new(FixedToken))
        .unwrap()
        .with_base_url(server.url());

    let record = PostRecord {
        title: "Title".into(),
        body: "Body".into(),
        hashtag: "#Tag".into(),
        video_search_phrase: "phrase".into(),
        video_link: None,
    };

    sink.append(2, &record).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_sheets_sink_surfaces_errors() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", Matcher::Any)
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body("PERMISSION_DENIED")
        .create_async()
        .await;

    let sink = GoogleSheetsSink::new("sheet-id".to_string(), "Sheet1", Arc::new(FixedToken))
        .unwrap()
        .with_base_url(server.url());

    let record = PostRecord {
        title: "Title".into(),
        body: "Body".into(),
        hashtag: "#Tag".into(),
        video_search_phrase: "phrase".into(),
        video_link: Some("https://www.youtube.com/watch?v=1".into()),
    };

    let err = sink.append(1, &record).await.unwrap_err();
    assert!(err.to_string().contains("403"));
}
