use std::time::Instant;

use ratatui::style::{Color, Style};
use ratatui::widgets::TableState;

use super::buffer::TextBuffer;
use super::constants::*;
use crate::config::AppConfig;
use crate::model::{Task, TaskId};
use crate::view::{Command, LoadState, Message, Notice, NoticeKind, TaskFilter, TasksView};

mod input;
mod render;
#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    DatePrompt,
    Help,
    ConfirmDelete,
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    kind: StatusKind,
    created_at: Instant,
}

impl StatusMessage {
    fn new<T: Into<String>>(text: T, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    fn style(&self) -> Style {
        match self.kind {
            StatusKind::Info => Style::default().fg(Color::Cyan),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

impl From<&Notice> for StatusMessage {
    fn from(notice: &Notice) -> Self {
        let kind = match notice.kind {
            NoticeKind::Info => StatusKind::Info,
            NoticeKind::Error => StatusKind::Error,
        };
        Self {
            text: notice.message.clone(),
            kind,
            created_at: notice.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Error,
}

/// Terminal shell around [`TasksView`]. Commands produced by the view are queued here until the
/// event loop hands them to the background runtime.
pub(crate) struct App {
    config: AppConfig,
    view: TasksView,
    selected: usize,
    table_state: TableState,
    input_mode: InputMode,
    input: TextBuffer,
    status: Option<StatusMessage>,
    outbox: Vec<Command>,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(config: AppConfig, view: TasksView) -> Self {
        Self {
            config,
            view,
            selected: 0,
            table_state: TableState::default(),
            input_mode: InputMode::Normal,
            input: TextBuffer::new(),
            status: None,
            outbox: Vec::new(),
            should_quit: false,
        }
    }

    pub(crate) fn start(&mut self) {
        self.apply(Message::Mounted);
    }

    /// Feeds one message to the view and mirrors whatever it reports back into the shell.
    pub(crate) fn apply(&mut self, message: Message) {
        if let Some(command) = self.view.update(message) {
            self.outbox.push(command);
        }
        if let Some(notice) = self.view.notice() {
            self.status = Some(StatusMessage::from(notice));
            self.view.clear_notice();
        }
        if self.input_mode == InputMode::ConfirmDelete && self.view.pending_deletion().is_none() {
            self.input_mode = InputMode::Normal;
        }
        self.clamp_selection();
    }

    pub(crate) fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.outbox)
    }

    pub(crate) fn on_tick(&mut self) {
        if let Some(status) = &self.status {
            if status.created_at.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn tasks(&self) -> &[Task] {
        self.view.tasks()
    }

    fn selected_task(&self) -> Option<&Task> {
        self.tasks().get(self.selected)
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.selected_task().map(|task| task.id)
    }

    fn is_loading(&self) -> bool {
        matches!(self.view.load_state(), LoadState::Loading)
    }

    fn select_filter(&mut self, filter: TaskFilter) {
        if filter != self.view.filter() {
            self.selected = 0;
        }
        self.apply(Message::FilterSelected(filter));
    }

    fn select_next(&mut self) {
        if self.tasks().is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.tasks().len() - 1);
        self.table_state.select(Some(self.selected));
    }

    fn select_prev(&mut self) {
        if self.tasks().is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(1);
        self.table_state.select(Some(self.selected));
    }

    fn select_first(&mut self) {
        self.selected = 0;
        self.clamp_selection();
    }

    fn select_last(&mut self) {
        self.selected = self.tasks().len().saturating_sub(1);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.tasks().len();
        if len == 0 {
            self.selected = 0;
            self.table_state.select(None);
        } else {
            if self.selected >= len {
                self.selected = len - 1;
            }
            self.table_state.select(Some(self.selected));
        }
    }

    fn set_status_info<T: Into<String>>(&mut self, text: T) {
        self.status = Some(StatusMessage::new(text, StatusKind::Info));
    }

    fn set_status_error<T: Into<String>>(&mut self, text: T) {
        self.status = Some(StatusMessage::new(text, StatusKind::Error));
    }
}
