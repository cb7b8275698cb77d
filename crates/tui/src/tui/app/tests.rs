use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use super::{App, InputMode, StatusKind};
use crate::config::AppConfig;
use crate::model::{Severity, Task, TaskCounts, TaskPage, TaskStatus};
use crate::tui::helpers::{centered_rect, status_marker};
use crate::view::{Command, Message, TaskFilter, TaskQuery, TasksView};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

fn task(id: i64, status: TaskStatus) -> Task {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Task {id}"),
        "due_date": "2025-03-14T09:30:00Z",
        "status": status.as_str(),
        "confidence_score": 0.5,
        "severity": Severity::High.as_str(),
        "origin_provider": "slack"
    }))
    .unwrap()
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// App that has mounted and received `tasks` for its first fetch.
fn loaded_app(tasks: Vec<Task>) -> App {
    let config = AppConfig::from_data_dir("/tmp/taskdeck-test".into());
    let mut app = App::new(config, TasksView::new().with_clock(today));
    app.start();
    let generation = match app.take_commands().as_slice() {
        [Command::Fetch { generation, .. }] => *generation,
        other => panic!("expected a single fetch, got {other:?}"),
    };
    let total = tasks.len() as u64;
    app.apply(Message::TasksLoaded {
        generation,
        result: Ok(TaskPage {
            items: tasks,
            counts: TaskCounts {
                total,
                all_tasks: total,
                todays_task: 1,
                later_tasks: 0,
            },
        }),
    });
    app
}

#[test]
fn centered_rect_keeps_within_bounds() {
    let area = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 24,
    };
    let rect = centered_rect(40, 10, area);
    assert!(rect.x >= area.x);
    assert!(rect.y >= area.y);
    assert_eq!(rect.width, 40);
    assert_eq!(rect.height, 10);
}

#[test]
fn status_marker_reflects_completion() {
    assert_eq!(status_marker(TaskStatus::Completed), "[x]");
    assert_eq!(status_marker(TaskStatus::Pending), "[ ]");
}

#[test]
fn filter_keys_issue_fetch_for_today() {
    let mut app = loaded_app(vec![task(1, TaskStatus::Pending)]);
    app.on_key(key(KeyCode::Char('t')));

    match app.take_commands().as_slice() {
        [Command::Fetch { query, .. }] => assert_eq!(
            *query,
            TaskQuery {
                filter_date: Some(today()),
                limit: None
            }
        ),
        other => panic!("unexpected commands {other:?}"),
    }

    app.on_key(key(KeyCode::Char('t')));
    assert!(app.take_commands().is_empty());
}

#[test]
fn date_prompt_applies_valid_date() {
    let mut app = loaded_app(vec![task(1, TaskStatus::Pending)]);
    app.on_key(key(KeyCode::Char('c')));
    assert_eq!(app.input_mode, InputMode::DatePrompt);
    for ch in "2025-04-01".chars() {
        app.on_key(key(KeyCode::Char(ch)));
    }
    app.on_key(key(KeyCode::Enter));

    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(
        app.view.filter(),
        TaskFilter::Date(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())
    );
    assert_eq!(app.take_commands().len(), 1);
}

#[test]
fn date_prompt_rejects_garbage_and_stays_open() {
    let mut app = loaded_app(vec![task(1, TaskStatus::Pending)]);
    app.on_key(key(KeyCode::Char('c')));
    for ch in "soon".chars() {
        app.on_key(key(KeyCode::Char(ch)));
    }
    app.on_key(key(KeyCode::Enter));

    assert_eq!(app.input_mode, InputMode::DatePrompt);
    assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Error));
    assert!(app.take_commands().is_empty());
}

#[test]
fn space_toggles_selected_task_once_until_confirmed() {
    let mut app = loaded_app(vec![task(1, TaskStatus::Pending), task(2, TaskStatus::Pending)]);
    app.on_key(key(KeyCode::Char('j')));
    app.on_key(key(KeyCode::Char(' ')));
    app.on_key(key(KeyCode::Char(' ')));

    assert_eq!(
        app.take_commands(),
        vec![Command::UpdateStatus {
            id: 2,
            status: TaskStatus::Completed
        }]
    );
    assert_eq!(app.view.tasks()[1].status, TaskStatus::Pending);

    app.apply(Message::StatusUpdated {
        id: 2,
        status: TaskStatus::Completed,
        result: Ok(()),
    });
    assert_eq!(app.view.tasks()[1].status, TaskStatus::Completed);
    assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Info));
}

#[test]
fn delete_requires_confirmation() {
    let mut app = loaded_app(vec![task(1, TaskStatus::Pending)]);
    app.on_key(key(KeyCode::Char('x')));
    assert_eq!(app.input_mode, InputMode::ConfirmDelete);
    assert!(app.take_commands().is_empty());

    app.on_key(key(KeyCode::Char('y')));
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.take_commands(), vec![Command::Delete { id: 1 }]);

    app.apply(Message::TaskDeleted {
        id: 1,
        result: Ok(()),
    });
    assert!(app.view.tasks().is_empty());
    assert_eq!(app.table_state.selected(), None);
}

#[test]
fn cancelled_delete_keeps_task() {
    let mut app = loaded_app(vec![task(1, TaskStatus::Pending)]);
    app.on_key(key(KeyCode::Char('x')));
    app.on_key(key(KeyCode::Esc));

    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.take_commands().is_empty());
    assert_eq!(app.view.tasks().len(), 1);
    assert_eq!(app.view.pending_deletion(), None);
}

#[test]
fn failed_fetch_surfaces_error_status() {
    let config = AppConfig::from_data_dir("/tmp/taskdeck-test".into());
    let mut app = App::new(config, TasksView::new().with_clock(today));
    app.start();
    let commands = app.take_commands();
    let Some(Command::Fetch { generation, .. }) = commands.first() else {
        panic!("expected fetch");
    };
    app.apply(Message::TasksLoaded {
        generation: *generation,
        result: Err("server responded with 500: boom".into()),
    });

    let status = app.status.as_ref().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.text.contains("boom"));
}

#[test]
fn quit_key_stops_loop() {
    let mut app = loaded_app(Vec::new());
    assert!(!app.should_quit());
    app.on_key(key(KeyCode::Char('q')));
    assert!(app.should_quit());
}

#[test]
fn draws_tasks_and_confirm_overlay() {
    let mut app = loaded_app(vec![task(1, TaskStatus::Pending)]);
    app.on_key(key(KeyCode::Char('x')));

    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| app.draw(f)).unwrap();

    let buffer = terminal.backend().buffer();
    let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
    assert!(text.contains("Task 1"));
    assert!(text.contains("Delete 'Task 1'?"));
}
