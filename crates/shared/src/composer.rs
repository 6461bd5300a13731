use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::claude::{GenerationRequest, TextGenerator};
use crate::models::{SummaryBundle, VideoInfo, NO_VIDEO_FOUND, POST_UNAVAILABLE};

/// Assembles the final blog post. Never fails.
#[async_trait]
pub trait PostComposer: Send + Sync {
    async fn compose(&self, title: &str, bundle: &SummaryBundle, video: Option<&VideoInfo>)
        -> String;
}

/// Offline composer that lays the parts out as labeled sections
pub struct TemplatePostComposer;

impl TemplatePostComposer {
    pub fn render(title: &str, bundle: &SummaryBundle, video: Option<&VideoInfo>) -> String {
        let mut post = String::new();

        post.push_str(&format!("{}\n\n", title));
        post.push_str(&format!("{}\n\n", bundle.summary));
        post.push_str(&format!("{}\n\n", bundle.educational_content));

        match video {
            Some(video) => {
                post.push_str(&format!("Related Video: {}\n", video.title));
                post.push_str(&format!("{}\n\n", video.link));
            }
            None => post.push_str(&format!("Related Video: {}\n\n", NO_VIDEO_FOUND)),
        }

        post.push_str(&bundle.hashtag);
        post
    }
}

#[async_trait]
impl PostComposer for TemplatePostComposer {
    async fn compose(
        &self,
        title: &str,
        bundle: &SummaryBundle,
        video: Option<&VideoInfo>,
    ) -> String {
        Self::render(title, bundle, video)
    }
}

/// Has the chat model write the post from all gathered parts
pub struct ClaudePostComposer {
    generator: Arc<dyn TextGenerator>,
}

impl ClaudePostComposer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    fn prompt(title: &str, bundle: &SummaryBundle, video: Option<&VideoInfo>) -> String {
        let video_link = video.map(|v| v.link.as_str()).unwrap_or(NO_VIDEO_FOUND);

        format!(
            r#"Create a compelling, engaging, educational, informational, fun, and catchy blog post using the following components:

Title: {title}
Summary: {summary}
Hashtag: {hashtag}
Educational Content: {educational}
Entity Summaries: {entities}
YouTube Search Phrase: {phrase}
Video Link: {video_link}

The blog post should:

1. Start with a Hook: Capture the attention of the reader right from the start with a compelling introduction. Use strong, captivating language, whether it's a surprising fact, a powerful statistic, or a thought-provoking question, to immediately draw them in. Consider adding relevant data or a shocking trend to strengthen the hook.

2. Seamless Integration of Summary and Educational Content: The content should flow smoothly, combining a concise news summary with relevant educational insights. Transition between factual reporting and analysis naturally. Include historical context, industry data, or expert analysis where necessary to enhance understanding and keep the reader engaged.

3. Keep it Readable: Break complex ideas into short paragraphs or bullet points. This improves readability and ensures the content is easy to digest. Include infographics, charts, emojis, or visual aids where appropriate to break down complex data points. Avoid overwhelming readers with large blocks of text.

4. Highlight the Significance: Focus on why the news matters. Rather than simply listing facts, explain how the story impacts daily life, society, or the future. Highlight related trends, industry implications, or geographical impact to clarify why this information is exciting or important.

5. Provide Context: Help readers understand the bigger picture by offering background information. Frame the news within a broader narrative so the audience can appreciate the full scope of the issue. Include comparative case studies, previous developments, or related articles to provide depth and clarity.

6. Make it Relatable: Use analogies or comparisons to help readers connect with the topic. Relating the news to something familiar makes it easier to grasp. For example, compare a financial crisis to a well-known event or explain technological changes by drawing parallels to everyday experiences.

7. Incorporate Key Quotes: Include emotional or provocative quotes from the article to humanize the story and add authenticity. Where possible, supplement with expert opinions or social media reactions to bring diverse perspectives into the conversation.

8. Use Vivid Language: Avoid dry or overly factual language. Instead, use descriptive and dynamic wording to paint a mental picture for the reader. Opt for active voice and strong verbs to bring the story to life. Use storytelling techniques to make complex subjects more engaging.

9. Add Video Links: Include a video link with a brief description of its importance or relevance to the story. Use multimedia to provide additional context or visual representation. For example, embed news clips, interviews, or explainer videos related to the topic.

10. Encourage Thought and Action: Ask questions that encourage the reader to think critically or imagine future possibilities. Highlight potential implications or future developments and end with a call to action or thought-provoking statement. Use interactive elements like polls, quizzes, or social media hashtags to prompt reader engagement.

11. Maintain Flow: Ensure the post maintains a smooth, continuous flow from beginning to end. Avoid abrupt transitions or sections that might break the reader's engagement. Balance narrative structure with clear, concise points to keep the reader interested throughout.

12. Be Factual: Stay entirely factual throughout the post. Avoid embellishment or adding fictional elements. Accuracy should be prioritized while maintaining an engaging tone. Where necessary, provide links to relevant reports, legal documents, or research papers to substantiate claims.

The tone should be conversational yet informative, striking a balance that resonates with a wide audience. Be approachable while delivering clear, factual insights.
Provide the blog post without any additional text."#,
            title = title,
            summary = bundle.summary,
            hashtag = bundle.hashtag,
            educational = bundle.educational_content,
            entities = bundle.entity_summaries,
            phrase = bundle.video_search_phrase,
            video_link = video_link,
        )
    }
}

#[async_trait]
impl PostComposer for ClaudePostComposer {
    async fn compose(
        &self,
        title: &str,
        bundle: &SummaryBundle,
        video: Option<&VideoInfo>,
    ) -> String {
        let request = GenerationRequest::new(Self::prompt(title, bundle, video), 1500).system(
            "You are an AI assistant that creates engaging and informative blog posts based on news \
             articles and related information. Provide the blog post without any additional text.",
        );

        match self.generator.generate(request).await {
            Ok(post) => post.trim().to_string(),
            Err(e) => {
                warn!("Error creating blog post for '{}': {:#}", title, e);
                POST_UNAVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> SummaryBundle {
        SummaryBundle {
            summary: "The summary.".into(),
            hashtag: "#NewsUpdate #BreakingNews".into(),
            educational_content: "Did you know? The summary.".into(),
            entity_summaries: "N/A".into(),
            video_search_phrase: "The summary".into(),
        }
    }

    #[test]
    fn test_template_with_video() {
        let video = VideoInfo {
            link: "https://www.youtube.com/watch?v=abc".into(),
            title: "Explainer".into(),
            description: String::new(),
        };
        let post = TemplatePostComposer::render("Breaking: Title", &bundle(), Some(&video));

        assert_eq!(
            post,
            "Breaking: Title\n\nThe summary.\n\nDid you know? The summary.\n\n\
             Related Video: Explainer\nhttps://www.youtube.com/watch?v=abc\n\n\
             #NewsUpdate #BreakingNews"
        );
    }

    #[test]
    fn test_template_without_video() {
        let post = TemplatePostComposer::render("Title", &bundle(), None);

        assert!(post.contains("Related Video: No video found\n\n"));
        assert!(post.ends_with("#NewsUpdate #BreakingNews"));
    }

    #[test]
    fn test_prompt_mentions_missing_video() {
        let prompt = ClaudePostComposer::prompt("Title", &bundle(), None);

        assert!(prompt.contains("Video Link: No video found"));
        assert!(prompt.contains("Summary: The summary."));
    }

    #[test]
    fn test_prompt_keeps_full_guidance() {
        let prompt = ClaudePostComposer::prompt("Title", &bundle(), None);

        assert!(prompt.contains("relevant data or a shocking trend"));
        assert!(prompt.contains("comparative case studies"));
        assert!(prompt.contains("expert opinions or social media reactions"));
        assert!(prompt.contains("explainer videos related to the topic"));
        assert!(prompt.contains("polls, quizzes, or social media hashtags"));
        assert!(prompt.contains("12. Be Factual"));
        assert!(prompt.ends_with("Provide the blog post without any additional text."));
    }
}
