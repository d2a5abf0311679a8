//! Shared record types for the dev-memory service: branded identifiers,
//! the task / interaction / invariant records, request payloads and the
//! task merge engine.

pub mod ids;
pub mod merge;
pub mod records;
pub mod requests;

pub use ids::{InteractionId, TaskId};
pub use merge::merge_update;
pub use records::{
    Context, CriticalInvariant, Interaction, Invariant, InvariantCheck, Task, TaskFields,
};
pub use requests::{AppendInteractionRequest, CreateTaskRequest, TaskPatch};
