use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    /// Note title
    pub title: String,
    /// Note content
    pub content: String,
}

impl Default for CreateNoteRequest {
    fn default() -> Self {
        Self {
            title: crate::models::UNTITLED.to_string(),
            content: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    /// New title, left unchanged when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New content, left unchanged when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Shapes accepted for `GET /notes`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse {
    Bare(Vec<Value>),
    Envelope { items: Vec<Value> },
}

impl ListResponse {
    /// Anything that is neither an array nor an object with an `items` array
    /// is read as an empty list.
    pub fn items(value: Value) -> Vec<Value> {
        match serde_json::from_value::<Self>(value) {
            Ok(Self::Bare(items) | Self::Envelope { items }) => items,
            Err(_) => Vec::new(),
        }
    }
}
