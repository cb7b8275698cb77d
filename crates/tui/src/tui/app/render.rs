use std::cmp::min;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Tabs, Wrap};
use ratatui::Frame;

use crate::model::TaskStatus;
use crate::tui::constants::APP_VERSION;
use crate::tui::helpers::{
    accent_title, build_help_lines, centered_rect, format_due_date, format_due_time, inset_rect,
    severity_style, status_marker, BG_ACCENT, BG_BASE, BG_PANEL, FG_ACCENT,
};
use crate::view::{LoadState, TaskFilter};

use super::{App, InputMode};

impl App {
    pub(crate) fn draw(&mut self, f: &mut Frame<'_>) {
        let size = f.size();
        f.render_widget(Clear, size);
        f.render_widget(Block::default().style(Style::default().bg(BG_BASE)), size);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(size);

        self.draw_header(f, chunks[0]);
        self.draw_tabs(f, chunks[1]);
        self.draw_progress(f, chunks[2]);
        self.draw_tasks(f, chunks[3]);
        self.draw_footer(f, chunks[4]);

        match self.input_mode {
            InputMode::DatePrompt => self.draw_date_overlay(f, size),
            InputMode::Help => self.draw_help_overlay(f, size),
            InputMode::ConfirmDelete => self.draw_confirm_overlay(f, size),
            InputMode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let left_line = Line::from(vec![
            Span::styled(
                format!(" taskdeck v{} ", APP_VERSION),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("— {} tasks", self.view.filter())),
            Span::raw("  "),
            Span::styled(
                format!("🌐 {}", self.config.api_url()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        f.render_widget(
            Paragraph::new(left_line).style(Style::default().bg(BG_BASE)),
            cols[0],
        );

        let indicator = if self.is_loading() {
            Span::styled("⟳ loading", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("● synced", Style::default().fg(Color::DarkGray))
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![indicator, Span::raw(" ")]))
                .alignment(Alignment::Right)
                .style(Style::default().bg(BG_BASE)),
            cols[1],
        );
    }

    fn draw_tabs(&self, f: &mut Frame<'_>, area: Rect) {
        let counts = self.view.counts();
        let mut titles = vec![
            Line::from(format!("All ({})", counts.all_tasks)),
            Line::from(format!("Today ({})", counts.todays_task)),
            Line::from(format!("Later ({})", counts.later_tasks)),
        ];
        let selected = match self.view.filter() {
            TaskFilter::All => 0,
            TaskFilter::Today => 1,
            TaskFilter::Upcoming => 2,
            TaskFilter::Date(date) => {
                titles.push(Line::from(format!("📅 {}", date.format("%Y-%m-%d"))));
                3
            }
        };

        let tabs = Tabs::new(titles)
            .select(selected)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(accent_title("Filters"))
                    .border_style(Style::default().fg(Color::DarkGray))
                    .style(Style::default().bg(BG_PANEL)),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Green)
                    .bg(BG_ACCENT)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, area);
    }

    fn draw_progress(&self, f: &mut Frame<'_>, area: Rect) {
        let collection = self.view.collection();
        let label = format!(
            "{} pending · {} done · {}%",
            collection.pending_count(),
            collection.completed_count(),
            collection.progress_percent()
        );
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(accent_title("Progress"))
                    .border_style(Style::default().fg(Color::DarkGray))
                    .style(Style::default().bg(BG_PANEL)),
            )
            .gauge_style(Style::default().fg(Color::Green).bg(BG_ACCENT))
            .percent(u16::from(collection.progress_percent()))
            .label(label);
        f.render_widget(gauge, area);
    }

    fn draw_tasks(&mut self, f: &mut Frame<'_>, area: Rect) {
        if self.tasks().is_empty() {
            self.draw_empty_state(f, area);
            return;
        }

        let header = Row::new(vec![
            Cell::from(""),
            Cell::from("📝 Title"),
            Cell::from("⚠ Severity"),
            Cell::from("📅 Due"),
            Cell::from("⏰ Time"),
            Cell::from("📨 Source"),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .tasks()
            .iter()
            .map(|task| {
                let marker = if self.view.is_toggle_in_flight(task.id) {
                    "[~]"
                } else {
                    status_marker(task.status)
                };
                let title_style = if task.status == TaskStatus::Completed {
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(marker),
                    Cell::from(task.title.clone()).style(title_style),
                    Cell::from(task.severity.as_str()).style(severity_style(task.severity)),
                    Cell::from(format_due_date(task)),
                    Cell::from(format_due_time(task)),
                    Cell::from(task.origin_provider.clone()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Percentage(45),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Min(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(accent_title("Tasks"))
                    .border_style(Style::default().fg(Color::DarkGray))
                    .style(Style::default().bg(BG_PANEL)),
            )
            .highlight_style(
                Style::default()
                    .bg(BG_ACCENT)
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_empty_state(&self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(area);
        f.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = match self.view.load_state() {
            LoadState::Loading => vec![Line::from("Loading tasks…")],
            LoadState::Failed(err) => vec![
                Line::from(Span::styled(
                    "Could not load tasks",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(err.clone()),
                Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(Color::DarkGray),
                )),
            ],
            LoadState::Idle => vec![
                Line::from(Span::styled(
                    format!("No tasks for {}", self.view.filter()),
                    Style::default().fg(FG_ACCENT).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Try another filter with a / t / u or pick a date with c",
                    Style::default().fg(Color::DarkGray),
                )),
            ],
        };

        let height = (lines.len() as u16).min(inner.height);
        let content_area = centered_rect(inner.width.min(80), height, inner);
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Center)
                .style(Style::default().bg(BG_PANEL)),
            content_area,
        );
    }

    fn draw_footer(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.style())])
        } else {
            Line::from(vec![Span::raw("Ready")])
        };
        f.render_widget(Paragraph::new(status_line), lines[0]);

        let help = match self.input_mode {
            InputMode::Normal => {
                "filters: a all | t today | u later | c date 📅 | j/k move | space done ✅ | x delete 🗑️ | r refresh 🔄 | h help ❔ | q quit"
            }
            InputMode::DatePrompt => "Enter apply • Esc cancel",
            InputMode::Help => "Enter/Esc to close ❔",
            InputMode::ConfirmDelete => "y/Enter delete • n/Esc keep",
        };
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                help,
                Style::default().fg(Color::DarkGray),
            ))),
            lines[1],
        );
    }

    fn draw_date_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let width = min(area.width.saturating_sub(10), 50).max(30);
        let popup_area = centered_rect(width, 5, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("📅 Due on (YYYY-MM-DD)"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let content = inset_rect(inner, 1);
        f.render_widget(
            Paragraph::new(self.input.as_str()).style(Style::default().bg(BG_PANEL)),
            content,
        );

        let column = self.input.cursor_column() as u16;
        if content.width > 0 {
            f.set_cursor(content.x + column.min(content.width - 1), content.y);
        }
    }

    fn draw_help_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = build_help_lines();
        let width = min(area.width.saturating_sub(10), 70);
        let height = min(lines.len() as u16 + 4, area.height.saturating_sub(2)).max(6);
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("⌨️ Keyboard Reference"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        if inner.width < 3 || inner.height < 3 {
            return;
        }

        let help_lines: Vec<Line> = lines
            .into_iter()
            .map(|(combo, desc)| {
                Line::from(vec![
                    Span::styled(format!("{combo:<16}"), Style::default().fg(Color::Cyan)),
                    Span::raw(desc),
                ])
            })
            .collect();
        f.render_widget(
            Paragraph::new(help_lines)
                .wrap(Wrap { trim: true })
                .style(Style::default().bg(BG_PANEL)),
            inset_rect(inner, 1),
        );
    }

    fn draw_confirm_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let width = min(area.width.saturating_sub(20), 60).max(40);
        let popup_area = centered_rect(width, 8, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("🗑 Delete task"))
            .border_style(Style::default().fg(Color::Red))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let task_title = self
            .view
            .pending_deletion_task()
            .map(|task| task.title.as_str())
            .unwrap_or("selected task");

        let lines = vec![
            Line::from(Span::styled(
                "This action cannot be undone.",
                Style::default().fg(Color::Red),
            )),
            Line::from(Span::styled(
                format!("Delete '{}'?", task_title),
                Style::default().fg(Color::White),
            )),
            Line::default(),
            Line::from(vec![
                Span::styled(
                    "  y Delete  ",
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Red)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled("  n Keep  ", Style::default().fg(Color::Gray)),
            ]),
        ];

        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Center)
                .style(Style::default().bg(BG_PANEL)),
            inset_rect(inner, 1),
        );
    }
}
