use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::client::{call_claude, ChatMessage, ChatRequest, ContentPart, ImageSource, Role};
use crate::config::settings::{LlmConfig, LlmProvider};

pub const MAX_TOKENS: u32 = 500;
const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

const INSTRUCTION: &str = r#"Analyze this image as a social media marketing expert. Evaluate its potential for marketing use.

Respond in this exact JSON format (no markdown, just raw JSON):
{
  "score": <number 1-10>,
  "category": "<category like 'Product Shot', 'Interior', 'Portrait', 'Lifestyle', 'Architecture', 'Food', 'Nature', 'Abstract'>",
  "strengths": ["<strength 1>", "<strength 2>", "<strength 3>"],
  "improvements": ["<improvement 1>", "<improvement 2>"],
  "heroWorthy": <true/false - is this good enough to be a main marketing image?>,
  "caption": "<suggested social media caption, 1-2 sentences>"
}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    pub score: f64,
    pub category: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub hero_worthy: bool,
    pub caption: String,
}

impl ImageAnalysis {
    /// Returned when the model's answer can't be read as an analysis.
    pub fn fallback() -> Self {
        Self {
            score: 7.0,
            category: "General".to_string(),
            strengths: vec![
                "Good overall composition".to_string(),
                "Clear subject matter".to_string(),
            ],
            improvements: vec![
                "Consider adjusting lighting".to_string(),
                "Try different angles".to_string(),
            ],
            hero_worthy: false,
            caption: "A captivating visual that tells a story.".to_string(),
        }
    }
}

/// Splits a `data:image/<type>;base64,` URL into (media type, payload).
/// Input without the prefix is treated as bare base64 JPEG.
pub fn split_data_url(image: &str) -> Result<(String, &str)> {
    let re = Regex::new(r"^data:(image/\w+);base64,").context("Invalid data URL pattern")?;
    Ok(match re.captures(image) {
        Some(caps) => {
            let prefix_len = caps.get(0).map_or(0, |m| m.end());
            let media_type = caps
                .get(1)
                .map_or(DEFAULT_MEDIA_TYPE, |m| m.as_str())
                .to_string();
            (media_type, &image[prefix_len..])
        }
        None => (DEFAULT_MEDIA_TYPE.to_string(), image),
    })
}

pub fn parse_analysis(text: &str) -> ImageAnalysis {
    let trimmed = text.trim();
    let candidate = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };
    serde_json::from_str(candidate).unwrap_or_else(|e| {
        log::warn!("image analysis reply was not valid JSON: {}", e);
        ImageAnalysis::fallback()
    })
}

pub fn build_request(image: &str) -> Result<ChatRequest> {
    let (media_type, data) = split_data_url(image)?;
    Ok(ChatRequest {
        system: None,
        messages: vec![ChatMessage {
            role: Role::User,
            content: vec![
                ContentPart::Image {
                    source: ImageSource {
                        kind: "base64",
                        media_type,
                        data: data.to_string(),
                    },
                },
                ContentPart::Text {
                    text: INSTRUCTION.to_string(),
                },
            ],
        }],
        max_tokens: MAX_TOKENS,
    })
}

pub async fn analyze(config: &LlmConfig, image: &str) -> Result<ImageAnalysis> {
    if config.provider != LlmProvider::Anthropic {
        bail!("Image analysis requires llm.provider = \"anthropic\"");
    }
    let request = build_request(image)?;
    let text = call_claude(config, &request).await?;
    Ok(parse_analysis(&text))
}
