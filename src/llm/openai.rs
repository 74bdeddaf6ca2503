//! OpenAI-compatible chat completions.

use super::{ChatMessage, ChatModel, Role};
use crate::config::{ApiCredentials, LlmSettings};
use crate::error::{CandlelightError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chat model backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    /// Create a chat model from settings and resolved credentials.
    pub fn new(settings: &LlmSettings, credentials: &ApiCredentials) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(
                credentials,
                Duration::from_secs(settings.request_timeout_secs),
            )?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let built: ChatCompletionRequestMessage = match message.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| CandlelightError::Rag(e.to_string()))?
                .into(),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| CandlelightError::Rag(e.to_string()))?
                .into(),
        };
        Ok(built)
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| CandlelightError::Rag(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            CandlelightError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| CandlelightError::Rag("Empty response from LLM".to_string()))?
            .clone();

        debug!("Received {} characters from the model", answer.len());
        Ok(answer)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_messages_keep_roles() {
        let messages = [
            ChatMessage::system("context"),
            ChatMessage::user("question"),
        ];

        let built: Vec<_> = messages
            .iter()
            .map(OpenAIChatModel::to_request_message)
            .collect::<Result<_>>()
            .unwrap();

        assert!(matches!(built[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(built[1], ChatCompletionRequestMessage::User(_)));
    }
}
