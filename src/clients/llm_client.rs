//! 文本生成服务客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（如 Groq、Azure、Doubao 等）
//! - 单次调用由 `tokio::time::timeout` 限时，不重试

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GenerationError;

/// 文本生成服务契约：一条用户消息进，一段文本出
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// 发送提示词，返回原始响应文本
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;

    /// 模型标识，用于日志
    fn model_name(&self) -> &str;

    /// 连通性检查
    async fn probe(&self) -> Result<(), GenerationError> {
        self.complete("ping").await.map(|_| ())
    }
}

/// OpenAI 兼容客户端
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAiCompletionClient {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout: Duration::from_secs(config.llm_timeout_secs),
        }
    }

    async fn send(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        debug!("调用 LLM API，模型: {}，提示词长度: {} 字符", self.model_name, prompt.len());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| GenerationError::RequestBuildFailed(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.temperature)
            .max_tokens(max_tokens)
            .build()
            .map_err(|e| GenerationError::RequestBuildFailed(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| GenerationError::Timeout {
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                GenerationError::api_failed(&self.model_name, e)
            })?;

        debug!("LLM API 调用成功");

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GenerationError::EmptyContent {
                model: self.model_name.clone(),
            })
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        self.send(prompt, self.max_tokens).await
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn probe(&self) -> Result<(), GenerationError> {
        self.send("ping", 1).await.map(|_| ())
    }
}
