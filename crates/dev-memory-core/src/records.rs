use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::{InteractionId, TaskId};

/// Free-form key/value bag attached to tasks and interactions.
pub type Context = Map<String, Value>;

/// A development work item, as stored in `development_tasks`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    /// Free-form label. No transitions are enforced.
    pub status: String,
    /// Append-only log of opaque change entries.
    pub changes: Vec<Value>,
    pub context: Context,
    pub created_at: String,
    pub updated_at: String,
}

/// The mutable columns of a task after a merge, ready to be written back.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub changes: Vec<Value>,
    pub context: Context,
}

/// One exchange recorded against a task, as stored in `ai_interactions`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub task_id: TaskId,
    pub role: String,
    pub content: Option<String>,
    pub context: Context,
    pub created_at: String,
}

/// A global rule the agent must respect, as stored in `foundation_invariants`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invariant {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_severity")]
    pub severity: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Invariant {
    pub const CRITICAL: &'static str = "critical";
}

fn default_severity() -> String {
    "normal".to_owned()
}

fn default_active() -> bool {
    true
}

/// Projection of an active critical invariant returned by the check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CriticalInvariant {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl From<Invariant> for CriticalInvariant {
    fn from(inv: Invariant) -> Self {
        Self {
            id: inv.id,
            title: inv.title,
            description: inv.description,
            category: inv.category,
        }
    }
}

/// Result of the pre-mutation invariant check.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvariantCheck {
    pub count: usize,
    pub invariants: Vec<CriticalInvariant>,
    pub message: String,
}

impl InvariantCheck {
    pub const MUST_RESPECT: &'static str =
        "You MUST respect ALL listed invariants before proceeding with any mutation.";
    pub const NONE_ACTIVE: &'static str = "No active invariants.";

    pub fn new(invariants: Vec<CriticalInvariant>) -> Self {
        let message = if invariants.is_empty() {
            Self::NONE_ACTIVE
        } else {
            Self::MUST_RESPECT
        };
        Self {
            count: invariants.len(),
            invariants,
            message: message.to_owned(),
        }
    }
}
