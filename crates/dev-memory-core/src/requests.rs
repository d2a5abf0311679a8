//! Caller-supplied payloads.
//!
//! Shape errors (a non-array `changes`, a non-object `context`, a numeric
//! `title`) are rejected while deserializing. Semantic checks such as a
//! missing title are left to the services.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::records::Context;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub context: Option<Context>,
}

/// Partial update of a task. Every field is optional.
///
/// `description` distinguishes an absent key (`None`) from an explicit
/// `null` (`Some(None)`), which clears the stored value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    pub changes: Option<Vec<Value>>,
    pub context: Option<Context>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppendInteractionRequest {
    pub role: Option<String>,
    pub content: Option<String>,
    pub context: Option<Context>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
