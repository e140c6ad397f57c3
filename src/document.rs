use serde::Serialize;
use serde_json::{Map, Value};

/// Text extracted by a loader plus whatever metadata the loader knows about it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub page_content: String,
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn word_count(&self) -> usize {
        self.page_content.split_whitespace().count()
    }
}
