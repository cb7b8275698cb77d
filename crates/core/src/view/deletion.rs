use super::collection::TaskCollection;
use crate::model::TaskId;

/// Two-step guard in front of task deletion. The only path to a delete request is
/// `request` followed by `confirm`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletionFlow {
    #[default]
    Idle,
    AwaitingConfirmation(TaskId),
}

impl DeletionFlow {
    /// Marks `id` for deletion. Ids the collection does not hold are refused.
    pub fn request(&mut self, id: TaskId, collection: &TaskCollection) -> bool {
        if !collection.contains(id) {
            return false;
        }
        *self = DeletionFlow::AwaitingConfirmation(id);
        true
    }

    pub fn confirm(&mut self) -> Option<TaskId> {
        match std::mem::take(self) {
            DeletionFlow::AwaitingConfirmation(id) => Some(id),
            DeletionFlow::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        *self = DeletionFlow::Idle;
    }

    pub fn pending(&self) -> Option<TaskId> {
        match self {
            DeletionFlow::AwaitingConfirmation(id) => Some(*id),
            DeletionFlow::Idle => None,
        }
    }
}
