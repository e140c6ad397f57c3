use std::sync::Arc;

use crate::document::Document;
use crate::error::{AppError, Result};
use crate::llm::TextGenerator;

const TEXT_SLOT: &str = "{text}";
const DOCUMENT_SEPARATOR: &str = "\n\n";

/// A prompt with a single `{text}` slot.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(TEXT_SLOT) {
            return Err(AppError::Config(format!(
                "Prompt template must contain a {} placeholder",
                TEXT_SLOT
            )));
        }
        Ok(Self { template })
    }

    pub fn format(&self, text: &str) -> String {
        self.template.replace(TEXT_SLOT, text)
    }
}

/// "Stuff" summarization: every document goes into one prompt, one model call.
pub struct SummarizeChain {
    llm: Arc<dyn TextGenerator>,
    prompt: PromptTemplate,
}

impl SummarizeChain {
    pub fn new(llm: Arc<dyn TextGenerator>, prompt: PromptTemplate) -> Self {
        Self { llm, prompt }
    }

    pub fn build_prompt(&self, docs: &[Document]) -> Result<String> {
        let text = docs
            .iter()
            .map(|doc| doc.page_content.trim())
            .filter(|content| !content.is_empty())
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR);

        if text.is_empty() {
            return Err(AppError::Parse(
                "No content could be extracted from the URL".to_string(),
            ));
        }

        Ok(self.prompt.format(&text))
    }

    pub async fn run(&self, api_key: &str, docs: &[Document]) -> Result<String> {
        let prompt = self.build_prompt(docs)?;
        tracing::debug!(prompt_chars = prompt.len(), documents = docs.len(), "calling text generation endpoint");
        self.llm.generate(api_key, &prompt).await
    }
}
