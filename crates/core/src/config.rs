use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;

static SESSION_FILE_NAME: &str = "session.json";
static LOG_FILE_NAME: &str = "taskdeck.log";
static ENV_DATA_DIR: &str = "TASKDECK_DATA_DIR";
static ENV_API_URL: &str = "TASKDECK_API_URL";
pub static DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "taskdeck", "taskdeck"));

#[derive(Debug, Clone)]
pub struct AppConfig {
    data_dir: PathBuf,
    session_path: PathBuf,
    api_url: String,
}

impl AppConfig {
    /// Construct [`AppConfig`] by resolving the data directory and API url using the provided
    /// overrides, environment variables, and platform defaults.
    pub fn discover(data_dir_override: Option<PathBuf>, api_url_override: Option<String>) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir_override)?;
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).with_context(|| {
                format!("Failed to create data directory at {}", data_dir.display())
            })?;
        }
        let api_url = api_url_override
            .or_else(|| env::var(ENV_API_URL).ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Self::from_data_dir(data_dir).with_api_url(api_url))
    }

    /// Construct [`AppConfig`] directly from a resolved data directory, using the default API url.
    pub fn from_data_dir(data_dir: PathBuf) -> Self {
        let session_path = data_dir.join(SESSION_FILE_NAME);
        Self {
            data_dir,
            session_path,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = normalize_api_url(api_url.into());
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

fn normalize_api_url(raw: String) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn resolve_data_dir(data_dir_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_dir_override {
        return Ok(dir);
    }

    if let Ok(env_dir) = env::var(ENV_DATA_DIR) {
        return Ok(PathBuf::from(env_dir));
    }

    if cfg!(debug_assertions) {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let dev_dir = manifest_dir.join("..").join("tmp").join("dev-taskdeck");
        return Ok(dev_dir);
    }

    if let Some(project) = &*PROJECT_DIRS {
        return Ok(project.data_dir().to_path_buf());
    }

    if let Some(base) = BaseDirs::new() {
        return Ok(base.home_dir().join(".taskdeck"));
    }

    Ok(env::current_dir()?.join(".taskdeck"))
}
