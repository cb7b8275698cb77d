use async_trait::async_trait;

use super::query::TaskQuery;
use super::tasks::{Command, Message, TasksView};
use crate::error::ApiResult;
use crate::model::{TaskId, TaskPage, TaskStatus};

/// Remote store behind the tasks view.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list(&self, query: &TaskQuery) -> ApiResult<TaskPage>;
    async fn update_status(&self, id: TaskId, status: TaskStatus) -> ApiResult<()>;
    async fn delete(&self, id: TaskId) -> ApiResult<()>;
}

/// Executes one command and reports its outcome as the message the view expects.
pub async fn run_command<S>(store: &S, command: Command) -> Message
where
    S: TaskStore + ?Sized,
{
    match command {
        Command::Fetch { generation, query } => Message::TasksLoaded {
            generation,
            result: store.list(&query).await.map_err(|err| err.to_string()),
        },
        Command::UpdateStatus { id, status } => Message::StatusUpdated {
            id,
            status,
            result: store
                .update_status(id, status)
                .await
                .map_err(|err| err.to_string()),
        },
        Command::Delete { id } => Message::TaskDeleted {
            id,
            result: store.delete(id).await.map_err(|err| err.to_string()),
        },
    }
}

/// Feeds `message` to the view and runs every command that follows, one at a time, until the
/// view stops asking for work.
pub async fn settle<S>(view: &mut TasksView, store: &S, message: Message)
where
    S: TaskStore + ?Sized,
{
    let mut next = view.update(message);
    while let Some(command) = next {
        let outcome = run_command(store, command).await;
        next = view.update(outcome);
    }
}
