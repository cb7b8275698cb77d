use crate::model::{Task, TaskCounts, TaskId, TaskStatus};

/// The last successfully fetched page plus the server's aggregate counts.
///
/// `counts` describe the whole account and are never reconciled against `tasks`;
/// the pending/completed figures are derived from `tasks` alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    counts: TaskCounts,
}

impl TaskCollection {
    pub fn new(tasks: Vec<Task>, counts: TaskCounts) -> Self {
        Self { tasks, counts }
    }

    pub fn replace(&mut self, tasks: Vec<Task>, counts: TaskCounts) {
        self.tasks = tasks;
        self.counts = counts;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn counts(&self) -> TaskCounts {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Returns false when the task is no longer held.
    pub(crate) fn set_status(&mut self, id: TaskId, status: TaskStatus) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.status = status;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    pub fn completed_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.status.is_completed())
            .count()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len() - self.completed_count()
    }

    pub fn progress_percent(&self) -> u8 {
        if self.tasks.is_empty() {
            return 0;
        }
        let ratio = self.completed_count() as f64 / self.tasks.len() as f64;
        (ratio * 100.0).round() as u8
    }
}
