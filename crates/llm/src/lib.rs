use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq)]
pub enum LlmProvider {
    OpenAI { api_key: String, model: String },
    Anthropic { api_key: String, model: String },
    Groq { api_key: String, model: String },
    /// Any OpenAI- or Anthropic-compatible server (Ollama, LM Studio, llama.cpp)
    Local { url: String, model: String },
}

impl LlmProvider {
    /// Имя провайдера для вывода
    pub fn display_name(&self) -> String {
        match self {
            LlmProvider::OpenAI { model, .. } => format!("OpenAI ({})", model),
            LlmProvider::Anthropic { model, .. } => format!("Anthropic ({})", model),
            LlmProvider::Groq { model, .. } => format!("Groq ({})", model),
            LlmProvider::Local { model, .. } => format!("Local ({})", model),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

#[derive(Clone)]
pub struct LlmClient {
    provider: LlmProvider,
    client: reqwest::Client,
    max_tokens: u32,
    temperature: f32,
    /// Заменяет адрес API облачного провайдера (прокси, тесты)
    base_url: Option<String>,
}

// OpenAI API types
#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChatChoice>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIChatChoice {
    message: OpenAIMessage,
}

// Anthropic API types
#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicContent {
    text: String,
}

impl LlmClient {
    pub fn new(provider: LlmProvider, max_tokens: u32, temperature: f32) -> Self {
        Self {
            provider,
            client: reqwest::Client::new(),
            max_tokens,
            temperature,
            base_url: None,
        }
    }

    /// Send hosted-provider requests to `url` instead of the public API.
    ///
    /// `url` replaces the versioned root, e.g. `https://api.openai.com/v1`.
    /// Local providers already carry their own URL and ignore it.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    /// Настройка из переменных окружения (и `.env`, если он есть).
    ///
    /// `LLM_PROVIDER` selects `openai` (default), `anthropic`, `groq`, `local`
    /// or `ollama`; each provider reads its own key and model variables.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let provider_type = env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let max_tokens = env::var("MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(256);
        let temperature = env::var("TEMPERATURE")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(0.7);

        let provider = match provider_type.to_lowercase().as_str() {
            "openai" => {
                let api_key = env::var("OPENAI_API_KEY")
                    .map_err(|_| anyhow!("OPENAI_API_KEY is not set"))?;
                let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
                LlmProvider::OpenAI { api_key, model }
            }
            "anthropic" => {
                let api_key = env::var("ANTHROPIC_API_KEY")
                    .map_err(|_| anyhow!("ANTHROPIC_API_KEY is not set"))?;
                let model = env::var("ANTHROPIC_MODEL")
                    .unwrap_or_else(|_| "claude-3-haiku-20240307".to_string());
                LlmProvider::Anthropic { api_key, model }
            }
            "groq" => {
                let api_key =
                    env::var("GROQ_API_KEY").map_err(|_| anyhow!("GROQ_API_KEY is not set"))?;
                let model =
                    env::var("GROQ_MODEL").unwrap_or_else(|_| "llama-3.1-8b-instant".to_string());
                LlmProvider::Groq { api_key, model }
            }
            "local" => {
                let url = env::var("LOCAL_LLM_URL")
                    .unwrap_or_else(|_| "http://localhost:1234/v1".to_string());
                let model = env::var("LOCAL_LLM_MODEL")
                    .unwrap_or_else(|_| "llama-3.2-3b-instruct".to_string());
                LlmProvider::Local { url, model }
            }
            "ollama" => {
                let url = env::var("OLLAMA_URL")
                    .unwrap_or_else(|_| "http://localhost:11434/v1".to_string());
                let model = env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
                LlmProvider::Local { url, model }
            }
            _ => return Err(anyhow!("Unsupported LLM_PROVIDER: {}", provider_type)),
        };

        Ok(Self::new(provider, max_tokens, temperature))
    }

    pub async fn complete(&self, request: CompletionRequest) -> Result<String> {
        info!("Using provider: {}", self.provider.display_name());

        // Значения из запроса важнее настроек клиента
        let overridden = Self {
            provider: self.provider.clone(),
            client: self.client.clone(),
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            temperature: request.temperature.unwrap_or(self.temperature),
            base_url: self.base_url.clone(),
        };

        overridden.chat_internal(&request.prompt).await
    }

    fn hosted_endpoint(&self, default_root: &str, path: &str) -> String {
        let root = self.base_url.as_deref().unwrap_or(default_root);
        format!("{}{}", root, path)
    }

    async fn chat_internal(&self, message: &str) -> Result<String> {
        match &self.provider {
            LlmProvider::OpenAI { api_key, model } => {
                let endpoint = self.hosted_endpoint("https://api.openai.com/v1", "/chat/completions");
                self.openai_compatible_chat(
                    "OpenAI",
                    &endpoint,
                    Some(api_key),
                    model,
                    message,
                )
                .await
            }
            LlmProvider::Groq { api_key, model } => {
                let endpoint =
                    self.hosted_endpoint("https://api.groq.com/openai/v1", "/chat/completions");
                self.openai_compatible_chat(
                    "Groq",
                    &endpoint,
                    Some(api_key),
                    model,
                    message,
                )
                .await
            }
            LlmProvider::Anthropic { api_key, model } => {
                self.anthropic_chat(api_key, model, message).await
            }
            LlmProvider::Local { url, model } => self.local_chat(url, model, message).await,
        }
    }

    fn openai_request(&self, model: &str, message: &str) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: model.to_string(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: message.to_string(),
            }],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        }
    }

    fn anthropic_request(&self, model: &str, message: &str) -> AnthropicRequest {
        AnthropicRequest {
            model: model.to_string(),
            max_tokens: self.max_tokens,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: message.to_string(),
            }],
            temperature: Some(self.temperature),
        }
    }

    async fn openai_compatible_chat(
        &self,
        label: &str,
        endpoint: &str,
        api_key: Option<&str>,
        model: &str,
        message: &str,
    ) -> Result<String> {
        let request = self.openai_request(model, message);

        info!("Sending request to {}: {}", label, model);
        debug!("Request text: {}", message);

        let mut builder = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json");
        if let Some(key) = api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }
        let response = builder.json(&request).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            error!("{} API error: {}", label, error_text);
            return Err(anyhow!("{} API error: {}", label, error_text));
        }

        let chat_response: OpenAIChatResponse = response.json().await?;

        match chat_response.choices.into_iter().next() {
            Some(choice) => {
                info!("Got response from {}", label);
                Ok(choice.message.content)
            }
            None => Err(anyhow!("Empty response from {}", label)),
        }
    }

    async fn anthropic_chat(&self, api_key: &str, model: &str, message: &str) -> Result<String> {
        let request = self.anthropic_request(model, message);

        info!("Sending request to Anthropic: {}", model);
        debug!("Request text: {}", message);

        let endpoint = self.hosted_endpoint("https://api.anthropic.com/v1", "/messages");
        let response = self
            .client
            .post(&endpoint)
            .header("x-api-key", api_key)
            .header("Content-Type", "application/json")
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            error!("Anthropic API error: {}", error_text);
            return Err(anyhow!("Anthropic API error: {}", error_text));
        }

        let chat_response: AnthropicResponse = response.json().await?;

        match chat_response.content.into_iter().next() {
            Some(content) => {
                info!("Got response from Anthropic");
                Ok(content.text)
            }
            None => Err(anyhow!("Empty response from Anthropic")),
        }
    }

    async fn local_chat(&self, url: &str, model: &str, message: &str) -> Result<String> {
        info!("Sending request to local model: {} -> {}", url, model);
        debug!("Request text: {}", message);

        // Нормализуем базовый endpoint: убираем завершающее "/" и необязательный "/v1"
        let mut base = url.trim_end_matches('/');
        if let Some(stripped) = base.strip_suffix("/v1") {
            base = stripped;
        }

        // 1) OpenAI-совместимый эндпоинт
        let endpoint_oa = format!("{}/chat/completions", base);
        let resp_oa = self
            .client
            .post(&endpoint_oa)
            .header("Content-Type", "application/json")
            .json(&self.openai_request(model, message))
            .send()
            .await?;

        if resp_oa.status().is_success() {
            let chat_response: OpenAIChatResponse = resp_oa.json().await?;
            return match chat_response.choices.into_iter().next() {
                Some(choice) => {
                    info!("Got response from local model (OpenAI compatible)");
                    Ok(choice.message.content)
                }
                None => Err(anyhow!("Empty response from local model")),
            };
        }
        debug!(
            status = %resp_oa.status(),
            "OpenAI-compatible endpoint failed, trying /v1/messages"
        );

        // 2) Fallback: Anthropic-совместимый эндпоинт /v1/messages
        let endpoint_anth = format!("{}/v1/messages", base);
        let resp_anth = self
            .client
            .post(&endpoint_anth)
            .header("Content-Type", "application/json")
            .json(&self.anthropic_request(model, message))
            .send()
            .await?;

        if !resp_anth.status().is_success() {
            let error_text = resp_anth.text().await.unwrap_or_default();
            error!("Local LLM error (Anthropic fallback): {}", error_text);
            return Err(anyhow!("Local LLM error: {}", error_text));
        }

        let chat_response: AnthropicResponse = resp_anth.json().await?;
        match chat_response.content.into_iter().next() {
            Some(content) => {
                info!("Got response from local model (Anthropic compatible)");
                Ok(content.text)
            }
            None => Err(anyhow!("Empty response from local model")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("hi")
            .max_tokens(256)
            .temperature(0.7);
        assert_eq!(request.prompt, "hi");
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(CompletionRequest::new("hi").max_tokens, None);
    }

    #[test]
    fn test_display_name() {
        let provider = LlmProvider::Local {
            url: "http://localhost:1234/v1".to_string(),
            model: "llama".to_string(),
        };
        assert_eq!(provider.display_name(), "Local (llama)");
    }

    #[test]
    fn test_hosted_endpoint_override() {
        let provider = LlmProvider::OpenAI {
            api_key: "k".to_string(),
            model: "m".to_string(),
        };
        let client = LlmClient::new(provider, 256, 0.7);
        assert_eq!(
            client.hosted_endpoint("https://api.openai.com/v1", "/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );

        let proxied = client.with_base_url("http://127.0.0.1:8080/");
        assert_eq!(
            proxied.hosted_endpoint("https://api.openai.com/v1", "/chat/completions"),
            "http://127.0.0.1:8080/chat/completions"
        );
    }
}
