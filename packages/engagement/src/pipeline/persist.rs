//! Task persistence stage.
//!
//! Consumes reply suggestions and persists each as a `Pending` task,
//! deduplicated by source-post identity. Redelivered or racing events are
//! absorbed silently; the pipeline guarantees at most one task per post.

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::traits::TaskStore;
use crate::types::{NewTask, ReplySuggestion, Task};

/// How the stage disposed of one suggestion.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    /// A new task was created in `Pending` status.
    Created(Task),

    /// A task already existed for the source post; nothing was written.
    Duplicate,
}

/// The persistence stage.
pub struct PersistStage {
    tasks: Arc<dyn TaskStore>,
}

impl PersistStage {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// Persist one suggestion as a task, absorbing duplicates.
    pub async fn process(&self, suggestion: &ReplySuggestion) -> Result<PersistOutcome> {
        if self.tasks.exists_for_post(&suggestion.post_id).await? {
            info!(post_id = %suggestion.post_id, "task already exists, skipping");
            return Ok(PersistOutcome::Duplicate);
        }

        match self.tasks.create(&NewTask::from(suggestion)).await? {
            Some(task) => {
                info!(
                    task_id = task.id,
                    post_id = %task.post_id,
                    campaign_id = task.campaign_id,
                    "created pending task"
                );
                Ok(PersistOutcome::Created(task))
            }
            // A concurrent worker created the task between the existence
            // check and the insert; the constraint absorbed the race
            None => {
                info!(post_id = %suggestion.post_id, "lost creation race, task exists");
                Ok(PersistOutcome::Duplicate)
            }
        }
    }
}
