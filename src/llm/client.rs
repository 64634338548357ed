use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::settings::{LlmConfig, LlmProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of message content, serialized in Anthropic's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub media_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentPart::Text { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: Option<String>,
}

pub async fn call_claude(config: &LlmConfig, request: &ChatRequest) -> Result<String> {
    match config.provider {
        LlmProvider::Anthropic => call_anthropic(config, request).await,
        LlmProvider::Bedrock => call_bedrock(config, request).await,
    }
}

fn anthropic_body<'a>(config: &'a LlmConfig, request: &'a ChatRequest) -> AnthropicRequest<'a> {
    AnthropicRequest {
        model: &config.model,
        max_tokens: request.max_tokens,
        system: request.system.as_deref(),
        messages: &request.messages,
    }
}

async fn call_anthropic(config: &LlmConfig, request: &ChatRequest) -> Result<String> {
    let api_key = config
        .api_key
        .clone()
        .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
        .context("No Anthropic API key found. Either:\n  - Set ANTHROPIC_API_KEY in ~/.parsec/env\n  - Set llm.api_key in ~/.parsec/config.toml\n  - Or switch to Bedrock: set llm.provider = \"bedrock\" in config.toml")?;

    let client = reqwest::Client::new();
    let url = format!("{}/v1/messages", config.base_url.trim_end_matches('/'));

    let response = client
        .post(&url)
        .header("x-api-key", &api_key)
        .header("anthropic-version", "2023-06-01")
        .header("content-type", "application/json")
        .json(&anthropic_body(config, request))
        .send()
        .await
        .context("Failed to call Anthropic API")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("Anthropic API error ({}): {}", status, body);
    }

    let msg: AnthropicResponse = response
        .json()
        .await
        .context("Failed to parse Anthropic API response")?;

    let text = msg
        .content
        .into_iter()
        .filter_map(|b| b.text)
        .collect::<Vec<_>>()
        .join("");

    Ok(text)
}

async fn call_bedrock(config: &LlmConfig, request: &ChatRequest) -> Result<String> {
    use aws_sdk_bedrockruntime::types::{
        ContentBlock, ConversationRole, Message, SystemContentBlock,
    };

    let region = config.aws_region.as_deref().unwrap_or("us-east-1");

    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await;

    let client = aws_sdk_bedrockruntime::Client::new(&sdk_config);

    let mut messages = Vec::with_capacity(request.messages.len());
    for msg in &request.messages {
        let role = match msg.role {
            Role::User => ConversationRole::User,
            Role::Assistant => ConversationRole::Assistant,
        };
        let mut builder = Message::builder().role(role);
        for part in &msg.content {
            match part {
                ContentPart::Text { text } => builder = builder.content(ContentBlock::Text(text.clone())),
                ContentPart::Image { .. } => bail!("Image input requires the Anthropic provider"),
            }
        }
        messages.push(builder.build().context("Failed to build Bedrock message")?);
    }

    let mut converse = client
        .converse()
        .model_id(&config.model)
        .set_messages(Some(messages));
    if let Some(system) = &request.system {
        converse = converse.system(SystemContentBlock::Text(system.clone()));
    }

    let response = converse
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Bedrock API error: {}", e))?;

    let output = response
        .output()
        .ok_or_else(|| anyhow::anyhow!("No output in Bedrock response"))?;

    let reply = output
        .as_message()
        .map_err(|_| anyhow::anyhow!("Bedrock output is not a message"))?;

    let text = reply
        .content()
        .iter()
        .filter_map(|block| block.as_text().ok().map(|s| s.as_str()))
        .collect::<Vec<_>>()
        .join("");

    Ok(text)
}
