use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{value_parser, Args, Parser, Subcommand};

use crate::view::TaskFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskdeck",
    version,
    about = "Keep on top of the tasks extracted from your inboxes and chats.",
    after_help = "Examples:\n  taskdeck                 Launch the TUI (same as `taskdeck tui`)\n  taskdeck login --email me@example.com\n  taskdeck tasks --filter today\n  taskdeck delete 42 --yes"
)]
pub struct Cli {
    /// Override the data directory (defaults to platform-specific app dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override the API base url (defaults to TASKDECK_API_URL or the local server)
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Tracing filter directive (e.g. "info", "taskdeck_core=debug")
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Launch the keyboard-first terminal UI (default command)
    Tui,
    /// Sign in and remember the session
    Login(LoginArgs),
    /// Create an account and sign in
    Signup(SignupArgs),
    /// Forget the stored session
    Logout,
    /// Show who the stored session belongs to
    Whoami,
    /// Today's tasks and connected integrations at a glance
    Home,
    /// List tasks
    Tasks(TasksArgs),
    /// Flip a task between pending and completed
    Toggle(TaskIdArgs),
    /// Delete a task after confirmation
    Delete(DeleteArgs),
    /// Show connectable providers and which are connected
    Integrations(IntegrationsArgs),
    /// Start connecting a provider and print the authorization url
    Connect(ConnectArgs),
    /// Show or edit the profile
    Profile(ProfileArgs),
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    /// Password (or set TASKDECK_PASSWORD)
    #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug, Clone)]
pub struct SignupArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    /// Password (or set TASKDECK_PASSWORD)
    #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug, Clone)]
pub struct TasksArgs {
    /// all, today or upcoming
    #[arg(long, default_value = "all")]
    pub filter: TaskFilter,

    /// Only tasks due on this day (YYYY-MM-DD); replaces --filter
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Maximum number of tasks to fetch
    #[arg(long, value_parser = value_parser!(u32))]
    pub limit: Option<u32>,
}

impl TasksArgs {
    pub fn effective_filter(&self) -> TaskFilter {
        self.date.map(TaskFilter::Date).unwrap_or(self.filter)
    }
}

#[derive(Args, Debug, Clone)]
pub struct TaskIdArgs {
    #[arg(value_name = "ID")]
    pub id: i64,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    #[arg(value_name = "ID")]
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct IntegrationsArgs {
    #[arg(long, value_parser = value_parser!(u32))]
    pub limit: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Provider name, e.g. gmail or slack
    #[arg(value_name = "PROVIDER")]
    pub provider: String,
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: Option<ProfileAction>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileAction {
    /// Update profile fields; omitted fields keep their current value
    Set(ProfileSetArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProfileSetArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("expected a YYYY-MM-DD date, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["taskdeck"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn date_overrides_named_filter() {
        let cli =
            Cli::try_parse_from(["taskdeck", "tasks", "--filter", "today", "--date", "2025-03-14"])
                .unwrap();
        let Some(CliCommand::Tasks(args)) = cli.command else {
            panic!("expected tasks command");
        };
        assert_eq!(
            args.effective_filter(),
            TaskFilter::Date(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
        );
    }

    #[test]
    fn rejects_malformed_date() {
        assert!(Cli::try_parse_from(["taskdeck", "tasks", "--date", "14/03/2025"]).is_err());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "taskdeck",
            "delete",
            "7",
            "--yes",
            "--api-url",
            "http://example.test",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://example.test"));
        assert!(matches!(cli.command, Some(CliCommand::Delete(DeleteArgs { id: 7, yes: true }))));
    }
}
