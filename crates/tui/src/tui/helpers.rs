use std::cmp::min;

use chrono::{DateTime, Local};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::model::{Severity, Task, TaskStatus};

pub const BG_BASE: Color = Color::Rgb(14, 17, 23);
pub const BG_PANEL: Color = Color::Rgb(22, 26, 34);
pub const BG_ACCENT: Color = Color::Rgb(32, 37, 47);
pub const FG_ACCENT: Color = Color::Rgb(120, 161, 255);

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = min(width, area.width);
    let h = min(height, area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

pub fn inset_rect(area: Rect, padding: u16) -> Rect {
    if area.width == 0 || area.height == 0 {
        return area;
    }
    let px = padding.min(area.width / 2);
    let py = padding.min(area.height / 2);
    Rect {
        x: area.x + px,
        y: area.y + py,
        width: area.width.saturating_sub(px * 2),
        height: area.height.saturating_sub(py * 2),
    }
}

pub fn status_marker(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "[x]",
        TaskStatus::Pending => "[ ]",
    }
}

pub fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Severity::High => Style::default().fg(Color::LightRed),
        Severity::Medium => Style::default().fg(Color::Yellow),
        Severity::Low => Style::default().fg(Color::Green),
    }
}

fn local_due(task: &Task) -> DateTime<Local> {
    task.due_date.with_timezone(&Local)
}

/// Due day in the viewer's timezone, e.g. `Mar 14`.
pub fn format_due_date(task: &Task) -> String {
    local_due(task).format("%b %d").to_string()
}

pub fn format_due_time(task: &Task) -> String {
    local_due(task).format("%H:%M").to_string()
}

pub fn build_help_lines() -> Vec<(&'static str, &'static str)> {
    vec![
        ("a / t / u", "Show all, today's or later tasks"),
        ("c", "Filter by a calendar date"),
        ("j / k or ↓ / ↑", "Move selection"),
        ("Space", "Mark selected task done / pending"),
        ("x / Delete", "Delete task (with confirmation)"),
        ("r", "Refresh from the server"),
        ("h", "Toggle this help overlay"),
        ("q", "Quit"),
    ]
}

pub fn accent_title(text: &str) -> Line<'static> {
    Line::from(vec![Span::styled(
        text.to_owned(),
        Style::default().fg(FG_ACCENT).add_modifier(Modifier::BOLD),
    )])
}
