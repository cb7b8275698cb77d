//! State machine behind the tasks screen.
//!
//! `TasksView::update` is the only writer of the collection. It never performs I/O: it returns
//! the [`Command`] the caller should run, and the caller feeds the outcome back as a [`Message`].

use std::collections::HashSet;
use std::time::Instant;

use chrono::NaiveDate;

use super::collection::TaskCollection;
use super::deletion::DeletionFlow;
use super::query::{local_today, TaskFilter, TaskQuery};
use crate::model::{Task, TaskCounts, TaskId, TaskPage, TaskStatus};

#[derive(Debug, Clone)]
pub enum Message {
    Mounted,
    FilterSelected(TaskFilter),
    Refresh,
    TasksLoaded {
        generation: u64,
        result: Result<TaskPage, String>,
    },
    ToggleRequested(TaskId),
    StatusUpdated {
        id: TaskId,
        status: TaskStatus,
        result: Result<(), String>,
    },
    DeleteRequested(TaskId),
    DeleteConfirmed,
    DeleteCancelled,
    TaskDeleted {
        id: TaskId,
        result: Result<(), String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch { generation: u64, query: TaskQuery },
    UpdateStatus { id: TaskId, status: TaskStatus },
    Delete { id: TaskId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub created_at: Instant,
}

impl Notice {
    fn new(message: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at: Instant::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TasksView {
    collection: TaskCollection,
    filter: TaskFilter,
    deletion: DeletionFlow,
    load_state: LoadState,
    generation: u64,
    toggles_in_flight: HashSet<TaskId>,
    notice: Option<Notice>,
    limit: Option<u32>,
    today: fn() -> NaiveDate,
}

impl Default for TasksView {
    fn default() -> Self {
        Self::new()
    }
}

impl TasksView {
    pub fn new() -> Self {
        Self {
            collection: TaskCollection::default(),
            filter: TaskFilter::All,
            deletion: DeletionFlow::Idle,
            load_state: LoadState::Idle,
            generation: 0,
            toggles_in_flight: HashSet::new(),
            notice: None,
            limit: None,
            today: local_today,
        }
    }

    /// Replaces the source of "today" used by [`TaskFilter::Today`].
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    pub fn update(&mut self, message: Message) -> Option<Command> {
        match message {
            Message::Mounted => {
                self.filter = TaskFilter::All;
                self.deletion.cancel();
                Some(self.fetch())
            }
            Message::FilterSelected(filter) => self.select_filter(filter),
            Message::Refresh => Some(self.fetch()),
            Message::TasksLoaded { generation, result } => {
                self.handle_loaded(generation, result);
                None
            }
            Message::ToggleRequested(id) => self.request_toggle(id),
            Message::StatusUpdated { id, status, result } => {
                self.handle_status_updated(id, status, result);
                None
            }
            Message::DeleteRequested(id) => {
                if !self.deletion.request(id, &self.collection) {
                    tracing::debug!(task_id = id, "delete requested for unknown task");
                }
                None
            }
            Message::DeleteConfirmed => self
                .deletion
                .confirm()
                .map(|id| Command::Delete { id }),
            Message::DeleteCancelled => {
                self.deletion.cancel();
                None
            }
            Message::TaskDeleted { id, result } => {
                self.handle_deleted(id, result);
                None
            }
        }
    }

    fn select_filter(&mut self, filter: TaskFilter) -> Option<Command> {
        if filter == self.filter {
            return None;
        }
        tracing::debug!(filter = %filter, "task filter changed");
        self.filter = filter;
        Some(self.fetch())
    }

    fn fetch(&mut self) -> Command {
        self.generation = self.generation.wrapping_add(1);
        self.load_state = LoadState::Loading;
        let query = TaskQuery::for_filter(self.filter, (self.today)()).with_limit(self.limit);
        Command::Fetch {
            generation: self.generation,
            query,
        }
    }

    fn handle_loaded(&mut self, generation: u64, result: Result<TaskPage, String>) {
        if generation != self.generation {
            tracing::debug!(
                generation,
                latest = self.generation,
                "discarding superseded task list"
            );
            return;
        }

        match result {
            Ok(page) => {
                tracing::debug!(filter = %self.filter, count = page.items.len(), "task list loaded");
                self.collection.replace(page.items, page.counts);
                self.load_state = LoadState::Idle;
            }
            Err(err) => {
                tracing::warn!(filter = %self.filter, error = %err, "failed to fetch tasks");
                self.load_state = LoadState::Failed(err.clone());
                self.notice = Some(Notice::new(
                    format!("Failed to fetch tasks: {err}"),
                    NoticeKind::Error,
                ));
            }
        }
    }

    fn request_toggle(&mut self, id: TaskId) -> Option<Command> {
        let current = self.collection.get(id)?.status;
        if !self.toggles_in_flight.insert(id) {
            tracing::debug!(task_id = id, "toggle already in flight");
            return None;
        }
        Some(Command::UpdateStatus {
            id,
            status: current.toggled(),
        })
    }

    fn handle_status_updated(&mut self, id: TaskId, status: TaskStatus, result: Result<(), String>) {
        self.toggles_in_flight.remove(&id);
        match result {
            Ok(()) => {
                if self.collection.set_status(id, status) {
                    self.notice = Some(Notice::new(
                        format!("Marked task {id} {status}"),
                        NoticeKind::Info,
                    ));
                }
            }
            Err(err) => {
                tracing::warn!(task_id = id, error = %err, "failed to update task");
                self.notice = Some(Notice::new(
                    format!("Failed to update task: {err}"),
                    NoticeKind::Error,
                ));
            }
        }
    }

    fn handle_deleted(&mut self, id: TaskId, result: Result<(), String>) {
        match result {
            Ok(()) => {
                self.collection.remove(id);
                self.notice = Some(Notice::new(format!("Deleted task {id}"), NoticeKind::Info));
            }
            Err(err) => {
                tracing::warn!(task_id = id, error = %err, "failed to delete task");
                self.notice = Some(Notice::new(
                    format!("Failed to delete task: {err}"),
                    NoticeKind::Error,
                ));
            }
        }
    }

    pub fn collection(&self) -> &TaskCollection {
        &self.collection
    }

    pub fn tasks(&self) -> &[Task] {
        self.collection.tasks()
    }

    pub fn counts(&self) -> TaskCounts {
        self.collection.counts()
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn pending_deletion(&self) -> Option<TaskId> {
        self.deletion.pending()
    }

    pub fn pending_deletion_task(&self) -> Option<&Task> {
        self.deletion.pending().and_then(|id| self.collection.get(id))
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_toggle_in_flight(&self, id: TaskId) -> bool {
        self.toggles_in_flight.contains(&id)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}
