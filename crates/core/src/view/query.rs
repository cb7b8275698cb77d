use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};

/// The single active constraint over the task list. A calendar date replaces the named
/// filters rather than combining with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Today,
    Upcoming,
    Date(NaiveDate),
}

impl TaskFilter {
    pub const NAMED: &'static [TaskFilter] =
        &[TaskFilter::All, TaskFilter::Today, TaskFilter::Upcoming];

    pub fn label(&self) -> String {
        match self {
            TaskFilter::All => "All".into(),
            TaskFilter::Today => "Today".into(),
            TaskFilter::Upcoming => "Later".into(),
            TaskFilter::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            TaskFilter::Date(date) => Some(*date),
            _ => None,
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TaskFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "today" => Ok(TaskFilter::Today),
            "upcoming" | "later" => Ok(TaskFilter::Upcoming),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map(TaskFilter::Date)
                .map_err(|_| {
                    anyhow!(
                        "Unknown filter '{}': expected all|today|upcoming or a YYYY-MM-DD date",
                        other
                    )
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub filter_date: Option<NaiveDate>,
    pub limit: Option<u32>,
}

impl TaskQuery {
    /// `Upcoming` has no server-side counterpart yet and is sent like `All`.
    pub fn for_filter(filter: TaskFilter, today: NaiveDate) -> Self {
        let filter_date = match filter {
            TaskFilter::All | TaskFilter::Upcoming => None,
            TaskFilter::Today => Some(today),
            TaskFilter::Date(date) => Some(date),
        };
        Self {
            filter_date,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
