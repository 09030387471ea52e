use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use base64::Engine;

use crate::errors::{AppError, AppResult};

/// The external text-completion service. One call shape: prompt text in,
/// free text out. Image description carries the image as a data URL because
/// the backend has no other media channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;
    async fn describe_image(&self, prompt: &str, image_data_url: &str) -> AppResult<String>;
}

/// Base64 codec for API keys at rest. Injected into whoever constructs a
/// backend instead of living as a process-wide helper.
#[derive(Clone, Debug, Default)]
pub struct ApiKeyCodec;

impl ApiKeyCodec {
    pub fn encode(&self, key: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(key.as_bytes())
    }

    pub fn decode(&self, encoded: &str) -> AppResult<String> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| AppError::BadRequest(format!("Invalid encoded API key: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::BadRequest(format!("Invalid encoded API key: {}", e)))
    }
}

pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: &str, model: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    /// Construct from a key stored in its encoded form.
    pub fn from_encoded_key(codec: &ApiKeyCodec, encoded_key: &str, model: &str) -> AppResult<Self> {
        let api_key = codec.decode(encoded_key)?;
        Ok(Self::new(&api_key, model))
    }

    fn first_choice_text(
        response: async_openai::types::chat::CreateChatCompletionResponse,
    ) -> String {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .build()?;

        let response = self.client.chat().create(request).await?;
        Ok(Self::first_choice_text(response))
    }

    async fn describe_image(&self, prompt: &str, image_data_url: &str) -> AppResult<String> {
        let parts = vec![
            ChatCompletionRequestMessageContentPartTextArgs::default()
                .text(prompt)
                .build()?
                .into(),
            ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(ImageUrlArgs::default().url(image_data_url).build()?)
                .build()?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(parts))
                .build()?
                .into()])
            .build()?;

        let response = self.client.chat().create(request).await?;
        Ok(Self::first_choice_text(response))
    }
}

/// Builds the `data:` URL an image-bearing chat message expects.
pub fn image_data_url(bytes: &[u8], mime_type: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime_type, encoded)
}
