use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::constants::{
    STATUS_CONFIRM_DELETE, STATUS_ENTER_DATE, STATUS_INVALID_DATE, STATUS_LOADING,
    STATUS_NO_SELECTION, STATUS_TOGGLE_PENDING,
};
use crate::view::{Message, TaskFilter};

use super::{App, InputMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NormalAction {
    Quit,
    ShowFilter(TaskFilter),
    PromptDate,
    ShowHelp,
    Refresh,
    Toggle,
    Delete,
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
}

impl NormalAction {
    fn from_event(key: &KeyEvent) -> Option<Self> {
        if matches!(key.code, KeyCode::Char('c')) && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Self::Quit);
        }

        match key.code {
            KeyCode::Char('q') => Some(Self::Quit),
            KeyCode::Char('a') => Some(Self::ShowFilter(TaskFilter::All)),
            KeyCode::Char('t') => Some(Self::ShowFilter(TaskFilter::Today)),
            KeyCode::Char('u') => Some(Self::ShowFilter(TaskFilter::Upcoming)),
            KeyCode::Char('c') => Some(Self::PromptDate),
            KeyCode::Char('h') | KeyCode::Char('?') => Some(Self::ShowHelp),
            KeyCode::Char('r') => Some(Self::Refresh),
            KeyCode::Char(' ') => Some(Self::Toggle),
            KeyCode::Char('x') | KeyCode::Delete => Some(Self::Delete),
            KeyCode::Char('j') | KeyCode::Down => Some(Self::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Self::SelectPrev),
            KeyCode::Home => Some(Self::SelectFirst),
            KeyCode::End => Some(Self::SelectLast),
            _ => None,
        }
    }
}

impl App {
    pub(crate) fn on_key(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode(key),
            InputMode::DatePrompt => self.handle_date_mode(key),
            InputMode::Help => self.handle_help_mode(key),
            InputMode::ConfirmDelete => self.handle_confirm_delete_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) {
        if let Some(action) = NormalAction::from_event(&key) {
            self.execute_normal_action(action);
        }
    }

    fn execute_normal_action(&mut self, action: NormalAction) {
        match action {
            NormalAction::Quit => self.should_quit = true,
            NormalAction::ShowFilter(filter) => self.select_filter(filter),
            NormalAction::PromptDate => {
                self.input.clear();
                self.input_mode = InputMode::DatePrompt;
                self.set_status_info(STATUS_ENTER_DATE);
            }
            NormalAction::ShowHelp => self.input_mode = InputMode::Help,
            NormalAction::Refresh => {
                self.apply(Message::Refresh);
                self.set_status_info(STATUS_LOADING);
            }
            NormalAction::Toggle => self.toggle_selected(),
            NormalAction::Delete => self.request_delete_selected(),
            NormalAction::SelectNext => self.select_next(),
            NormalAction::SelectPrev => self.select_prev(),
            NormalAction::SelectFirst => self.select_first(),
            NormalAction::SelectLast => self.select_last(),
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            self.set_status_error(STATUS_NO_SELECTION);
            return;
        };
        if self.view.is_toggle_in_flight(id) {
            self.set_status_info(STATUS_TOGGLE_PENDING);
            return;
        }
        self.apply(Message::ToggleRequested(id));
    }

    fn request_delete_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            self.set_status_error(STATUS_NO_SELECTION);
            return;
        };
        self.apply(Message::DeleteRequested(id));
        if self.view.pending_deletion().is_some() {
            self.input_mode = InputMode::ConfirmDelete;
            self.set_status_info(STATUS_CONFIRM_DELETE);
        }
    }

    fn handle_confirm_delete_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.status = None;
                self.apply(Message::DeleteConfirmed);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.status = None;
                self.apply(Message::DeleteCancelled);
            }
            _ => {}
        }
    }

    fn handle_date_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input.clear();
                self.status = None;
            }
            KeyCode::Enter => self.submit_date(),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete_char(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Char(ch) => self.input.insert_char(ch),
            _ => {}
        }
    }

    fn submit_date(&mut self) {
        let raw = self.input.as_str().trim().to_string();
        let filter = if raw.is_empty() {
            TaskFilter::All
        } else {
            match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                Ok(date) => TaskFilter::Date(date),
                Err(_) => {
                    self.set_status_error(STATUS_INVALID_DATE);
                    return;
                }
            }
        };
        self.input_mode = InputMode::Normal;
        self.input.clear();
        self.status = None;
        self.select_filter(filter);
    }

    fn handle_help_mode(&mut self, key: KeyEvent) {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('h') | KeyCode::Char('q')
        ) {
            self.input_mode = InputMode::Normal;
        }
    }
}
