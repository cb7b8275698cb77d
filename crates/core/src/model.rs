use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub type TaskId = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Completed,
    #[serde(other)]
    Pending,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Completed => TaskStatus::Pending,
            TaskStatus::Pending => TaskStatus::Completed,
        }
    }

    pub fn is_completed(self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" | "med" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(anyhow!(
                "Unknown severity '{}': expected low|medium|high|critical",
                other
            )),
        }
    }
}

/// One actionable item surfaced from an upstream integration (an email, a chat message).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence_score: f64,
    pub severity: Severity,
    pub origin_provider: String,
    #[serde(default)]
    pub origin_integration_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeline_events: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message_links: Vec<Value>,
}

/// Server-wide totals; independent of the page currently held by a view.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub all_tasks: u64,
    #[serde(default)]
    pub todays_task: u64,
    #[serde(default)]
    pub later_tasks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskPage {
    #[serde(default)]
    pub items: Vec<Task>,
    #[serde(flatten)]
    pub counts: TaskCounts,
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Integration {
    pub id: i64,
    pub provider: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub metadata_json: Map<String, Value>,
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Integration")
            .field("id", &self.id)
            .field("provider", &self.provider)
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .field("metadata_json", &self.metadata_json)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthStart {
    #[serde(default)]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}

impl From<&UserProfile> for ProfileUpdate {
    fn from(profile: &UserProfile) -> Self {
        Self {
            full_name: profile.full_name.clone().unwrap_or_default(),
            email: profile.email.clone().unwrap_or_default(),
            phone: profile.phone.clone().unwrap_or_default(),
            location: profile.location.clone().unwrap_or_default(),
        }
    }
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Serialize)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Passthrough fields may arrive as `null`; treat that like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The backend emits both RFC 3339 and zone-less timestamps; zone-less ones are UTC.
pub(crate) mod timestamp {
    use super::*;

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub(crate) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }

    pub(crate) fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_task(id: TaskId, status: TaskStatus) -> Task {
    Task {
        id,
        title: format!("Task {id}"),
        description: None,
        due_date: timestamp::parse("2025-03-14T09:30:00Z").expect("valid timestamp"),
        status,
        confidence_score: 0.9,
        severity: Severity::Medium,
        origin_provider: "gmail".into(),
        origin_integration_id: Some(1),
        user_id: Some(7),
        created_at: None,
        timeline_events: Vec::new(),
        message_links: Vec::new(),
    }
}
