use crate::types::Task;
use anyhow::Result;
use async_trait::async_trait;
use llm::{CompletionRequest, LlmClient};
use tracing::{debug, info};

const PREAMBLE: &str = "You are a helpful productivity assistant. \
                        Use the task list below to give an accurate and thoughtful answer.";

/// Sampling settings for assistant answers.
///
/// `None` leaves the value to the generator, which for [`LlmClient`] means
/// `MAX_TOKENS`/`TEMPERATURE` from the environment, else 256 and 0.7.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Внешняя модель генерации текста
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, settings: GenerationSettings) -> Result<String>;
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str, settings: GenerationSettings) -> Result<String> {
        let mut request = CompletionRequest::new(prompt);
        if let Some(tokens) = settings.max_tokens {
            request = request.max_tokens(tokens);
        }
        if let Some(temperature) = settings.temperature {
            request = request.temperature(temperature);
        }
        self.complete(request).await
    }
}

/// Формирует единый промпт из активных задач и вопроса пользователя
pub fn build_prompt<'a, I>(tasks: I, question: &str) -> String
where
    I: IntoIterator<Item = &'a Task>,
{
    let lines: Vec<String> = tasks
        .into_iter()
        .filter(|t| !t.done)
        .map(|t| {
            format!(
                "- {} (Due: {}, Priority: {}, Category: {})",
                t.name,
                t.due_display(),
                t.priority,
                t.category
            )
        })
        .collect();

    let summary = if lines.is_empty() {
        "No active tasks.".to_string()
    } else {
        lines.join("\n")
    };

    format!("{PREAMBLE}\n\nTasks:\n{summary}\n\nUser: {question}\nAssistant:")
}

/// Question answering over the current task list
pub struct Assistant<G> {
    generator: G,
    settings: GenerationSettings,
}

impl<G: TextGenerator> Assistant<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the model output verbatim
    pub async fn ask<'a, I>(&self, tasks: I, question: &str) -> Result<String>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let prompt = build_prompt(tasks, question);
        info!(question, "asking assistant");
        debug!(%prompt, "assistant prompt");
        self.generator.generate(&prompt, self.settings).await
    }
}
