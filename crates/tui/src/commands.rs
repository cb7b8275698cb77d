use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};

use crate::cli::{
    CliCommand, ConnectArgs, DeleteArgs, IntegrationsArgs, LoginArgs, ProfileAction,
    ProfileSetArgs, SignupArgs, TaskIdArgs, TasksArgs,
};
use crate::config::AppConfig;
use crate::core::{ApiClient, Session, SessionStore};
use crate::model::{Credentials, ProfileUpdate, SignupRequest, Task, TaskStatus, UserProfile};
use crate::services::{AuthService, IntegrationCatalog, IntegrationsService, TasksService, UserService};
use crate::tui::helpers::{format_due_date, format_due_time, status_marker};
use crate::view::{local_today, settle, HomeView, LoadState, Message, NoticeKind, TasksView};

/// Runs a one-shot command on a fresh runtime. `input` answers confirmation prompts.
pub fn execute<R: BufRead, W: Write>(
    config: &AppConfig,
    command: CliCommand,
    input: R,
    output: W,
) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(run(config, command, input, output))
}

pub(crate) async fn run<R: BufRead, W: Write>(
    config: &AppConfig,
    command: CliCommand,
    input: R,
    mut output: W,
) -> Result<()> {
    let sessions = SessionStore::for_config(config);
    let client = ApiClient::from_config(config, sessions.load())?;

    match command {
        CliCommand::Login(args) => handle_login(&client, &sessions, &args, &mut output).await,
        CliCommand::Signup(args) => handle_signup(&client, &sessions, &args, &mut output).await,
        CliCommand::Logout => handle_logout(&client, &sessions, &mut output),
        CliCommand::Whoami => handle_whoami(&client, &sessions, &mut output).await,
        CliCommand::Home => handle_home(&client, &mut output).await,
        CliCommand::Tasks(args) => handle_tasks(&client, &args, &mut output).await,
        CliCommand::Toggle(args) => handle_toggle(&client, &args, &mut output).await,
        CliCommand::Delete(args) => handle_delete(&client, &args, input, &mut output).await,
        CliCommand::Integrations(args) => {
            handle_integrations(&client, &args, &mut output).await
        }
        CliCommand::Connect(args) => handle_connect(&client, &args, &mut output).await,
        CliCommand::Profile(args) => match args.action {
            None => handle_profile(&client, &mut output).await,
            Some(ProfileAction::Set(set)) => handle_profile_set(&client, &set, &mut output).await,
        },
        CliCommand::Tui => Err(anyhow!("launch interactive surfaces directly")),
    }
}

fn require_session(client: &ApiClient) -> Result<()> {
    if client.session().is_none() {
        bail!("not signed in; run `taskdeck login` first");
    }
    Ok(())
}

async fn handle_login<W: Write>(
    client: &ApiClient,
    sessions: &SessionStore,
    args: &LoginArgs,
    mut output: W,
) -> Result<()> {
    let credentials = Credentials {
        email: args.email.trim().to_string(),
        password: args.password.clone(),
    };
    let session = AuthService::new(client.without_session())
        .login(&credentials)
        .await
        .context("login failed")?;
    remember(sessions, &session)?;
    writeln!(output, "Signed in as {}", credentials.email)?;
    Ok(())
}

async fn handle_signup<W: Write>(
    client: &ApiClient,
    sessions: &SessionStore,
    args: &SignupArgs,
    mut output: W,
) -> Result<()> {
    let request = SignupRequest {
        full_name: args.name.trim().to_string(),
        email: args.email.trim().to_string(),
        password: args.password.clone(),
    };
    let session = AuthService::new(client.without_session())
        .signup(&request)
        .await
        .context("signup failed")?;
    remember(sessions, &session)?;
    writeln!(output, "Account created; signed in as {}", request.email)?;
    Ok(())
}

fn remember(sessions: &SessionStore, session: &Session) -> Result<()> {
    sessions
        .save(session)
        .context("signed in, but the session could not be stored")
}

fn handle_logout<W: Write>(client: &ApiClient, sessions: &SessionStore, mut output: W) -> Result<()> {
    let was_signed_in = client.session().is_some();
    AuthService::new(client.clone()).logout(sessions)?;
    if was_signed_in {
        writeln!(output, "Signed out")?;
    } else {
        writeln!(output, "Not signed in")?;
    }
    Ok(())
}

async fn handle_whoami<W: Write>(
    client: &ApiClient,
    sessions: &SessionStore,
    mut output: W,
) -> Result<()> {
    require_session(client)?;
    match UserService::new(client.clone()).profile().await {
        Ok(profile) => write_profile(&profile, &mut output),
        Err(err) => {
            tracing::warn!(error = %err, "stored session rejected; signing out");
            sessions.clear()?;
            Err(anyhow!(err).context("session is no longer valid; signed out"))
        }
    }
}

async fn handle_home<W: Write>(client: &ApiClient, mut output: W) -> Result<()> {
    require_session(client)?;
    let tasks = TasksService::new(client.clone());
    let integrations = IntegrationsService::new(client.clone());
    let snapshot = HomeView::load(&tasks, &integrations, local_today()).await;

    writeln!(output, "Today's tasks")?;
    if snapshot.todays_tasks.is_empty() {
        writeln!(output, "  Nothing due today")?;
    }
    for task in &snapshot.todays_tasks {
        writeln!(output, "  {}", task_line(task))?;
    }

    writeln!(output)?;
    writeln!(output, "Integrations")?;
    if snapshot.integrations.is_empty() {
        writeln!(output, "  None connected (see `taskdeck integrations`)")?;
    }
    for integration in &snapshot.integrations {
        writeln!(output, "  {}", integration.provider)?;
    }
    Ok(())
}

async fn handle_tasks<W: Write>(client: &ApiClient, args: &TasksArgs, mut output: W) -> Result<()> {
    require_session(client)?;
    let store = TasksService::new(client.clone());
    let mut view = TasksView::new().with_limit(args.limit);
    let filter = args.effective_filter();
    let first = if filter == view.filter() {
        Message::Refresh
    } else {
        Message::FilterSelected(filter)
    };
    settle(&mut view, &store, first).await;
    ensure_loaded(&view)?;

    let collection = view.collection();
    if collection.is_empty() {
        writeln!(output, "No tasks ({})", view.filter())?;
    }
    for task in collection.tasks() {
        writeln!(output, "{}", task_line(task))?;
    }

    let counts = collection.counts();
    writeln!(output)?;
    writeln!(
        output,
        "{} of {} done ({}%) · {} pending",
        collection.completed_count(),
        collection.len(),
        collection.progress_percent(),
        collection.pending_count()
    )?;
    writeln!(
        output,
        "All {} · Today {} · Later {}",
        counts.all_tasks, counts.todays_task, counts.later_tasks
    )?;
    Ok(())
}

async fn handle_toggle<W: Write>(client: &ApiClient, args: &TaskIdArgs, mut output: W) -> Result<()> {
    require_session(client)?;
    let store = TasksService::new(client.clone());
    let mut view = TasksView::new();
    settle(&mut view, &store, Message::Refresh).await;
    ensure_loaded(&view)?;
    if !view.collection().contains(args.id) {
        bail!("task {} not found", args.id);
    }

    settle(&mut view, &store, Message::ToggleRequested(args.id)).await;
    ensure_no_error(&view)?;

    let status = view
        .collection()
        .get(args.id)
        .map(|task| task.status)
        .unwrap_or(TaskStatus::Pending);
    writeln!(output, "Task {} is now {}", args.id, status)?;
    Ok(())
}

async fn handle_delete<R: BufRead, W: Write>(
    client: &ApiClient,
    args: &DeleteArgs,
    mut input: R,
    mut output: W,
) -> Result<()> {
    require_session(client)?;
    let store = TasksService::new(client.clone());
    let mut view = TasksView::new();
    settle(&mut view, &store, Message::Refresh).await;
    ensure_loaded(&view)?;

    settle(&mut view, &store, Message::DeleteRequested(args.id)).await;
    let title = match view.pending_deletion_task() {
        Some(task) => task.title.clone(),
        None => bail!("task {} not found", args.id),
    };

    let confirmed = args.yes || {
        write!(output, "Delete '{title}'? This cannot be undone. [y/N] ")?;
        output.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        is_yes(&answer)
    };

    if !confirmed {
        settle(&mut view, &store, Message::DeleteCancelled).await;
        writeln!(output, "Kept task {}", args.id)?;
        return Ok(());
    }

    settle(&mut view, &store, Message::DeleteConfirmed).await;
    ensure_no_error(&view)?;
    writeln!(output, "Deleted task {}", args.id)?;
    Ok(())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn handle_integrations<W: Write>(
    client: &ApiClient,
    args: &IntegrationsArgs,
    mut output: W,
) -> Result<()> {
    require_session(client)?;
    let connected = IntegrationsService::new(client.clone())
        .list(args.limit)
        .await
        .context("failed to fetch integrations")?;

    for provider in IntegrationCatalog::providers() {
        let marker = if IntegrationCatalog::is_connected(provider.name, &connected) {
            "[connected]"
        } else {
            "[ ]"
        };
        writeln!(
            output,
            "{:<12} {:<10} {}",
            marker, provider.name, provider.description
        )?;
    }
    writeln!(output)?;
    writeln!(output, "{} connected", connected.len())?;
    Ok(())
}

async fn handle_connect<W: Write>(client: &ApiClient, args: &ConnectArgs, mut output: W) -> Result<()> {
    require_session(client)?;
    let provider = IntegrationCatalog::find(&args.provider)
        .ok_or_else(|| anyhow!("unknown provider '{}'", args.provider))?;
    let start = IntegrationsService::new(client.clone())
        .start_authentication(provider.name)
        .await
        .with_context(|| format!("failed to start connecting {}", provider.name))?;
    let url = start
        .redirect_url
        .ok_or_else(|| anyhow!("server did not return an authorization url"))?;
    writeln!(output, "Open this url to connect {}:", provider.name)?;
    writeln!(output, "{url}")?;
    Ok(())
}

async fn handle_profile<W: Write>(client: &ApiClient, output: W) -> Result<()> {
    require_session(client)?;
    let profile = UserService::new(client.clone())
        .profile()
        .await
        .context("failed to fetch profile")?;
    write_profile(&profile, output)
}

async fn handle_profile_set<W: Write>(
    client: &ApiClient,
    args: &ProfileSetArgs,
    mut output: W,
) -> Result<()> {
    require_session(client)?;
    let service = UserService::new(client.clone());
    let current = service.profile().await.context("failed to fetch profile")?;
    let update = merge_profile(&current, args);
    service
        .update_profile(&update)
        .await
        .context("failed to update profile")?;
    writeln!(output, "Profile updated")?;
    Ok(())
}

fn merge_profile(current: &UserProfile, args: &ProfileSetArgs) -> ProfileUpdate {
    let mut update = ProfileUpdate::from(current);
    if let Some(name) = &args.name {
        update.full_name = name.clone();
    }
    if let Some(email) = &args.email {
        update.email = email.clone();
    }
    if let Some(phone) = &args.phone {
        update.phone = phone.clone();
    }
    if let Some(location) = &args.location {
        update.location = location.clone();
    }
    update
}

fn write_profile<W: Write>(profile: &UserProfile, mut output: W) -> Result<()> {
    let rows = [
        ("Name", profile.full_name.as_deref()),
        ("Email", profile.email.as_deref()),
        ("Phone", profile.phone.as_deref()),
        ("Location", profile.location.as_deref()),
    ];
    for (label, value) in rows {
        writeln!(output, "{:<9} {}", label, value.unwrap_or("-"))?;
    }
    Ok(())
}

fn ensure_loaded(view: &TasksView) -> Result<()> {
    match view.load_state() {
        LoadState::Failed(err) => Err(anyhow!("failed to fetch tasks: {err}")),
        LoadState::Idle | LoadState::Loading => Ok(()),
    }
}

fn ensure_no_error(view: &TasksView) -> Result<()> {
    match view.notice() {
        Some(notice) if notice.kind == NoticeKind::Error => Err(anyhow!(notice.message.clone())),
        _ => Ok(()),
    }
}

fn task_line(task: &Task) -> String {
    format!(
        "{} #{:<5} {:<40} {:<8} {} {} ({})",
        status_marker(task.status),
        task.id,
        task.title,
        task.severity,
        format_due_date(task),
        format_due_time(task),
        task.origin_provider
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ProfileArgs;
    use rstest::rstest;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Harness {
        config: AppConfig,
        server: MockServer,
        _dir: TempDir,
    }

    impl Harness {
        async fn new(signed_in: bool) -> Self {
            let dir = TempDir::new().unwrap();
            let server = MockServer::start().await;
            let config = AppConfig::from_data_dir(dir.path().to_path_buf()).with_api_url(server.uri());
            if signed_in {
                SessionStore::for_config(&config)
                    .save(&Session::new("tok"))
                    .unwrap();
            }
            Self {
                config,
                server,
                _dir: dir,
            }
        }

        async fn run(&self, command: CliCommand, input: &str) -> Result<String> {
            let mut out = Vec::new();
            run(&self.config, command, input.as_bytes(), &mut out).await?;
            Ok(String::from_utf8(out).unwrap())
        }

        fn session(&self) -> Option<Session> {
            SessionStore::for_config(&self.config).load()
        }
    }

    fn task_json(id: i64, status: &str) -> Value {
        json!({
            "id": id,
            "title": format!("Task {id}"),
            "description": null,
            "due_date": "2025-03-14T09:30:00",
            "status": status,
            "confidence_score": 0.9,
            "severity": "high",
            "origin_provider": "gmail",
            "timeline_events": [],
            "message_links": []
        })
    }

    async fn mount_tasks(server: &MockServer, items: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": items,
                "total": 2,
                "all_tasks": 2,
                "todays_task": 1,
                "later_tasks": 1
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn login_stores_session() {
        let harness = Harness::new(false).await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "email": "me@example.com", "password": "pw" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access_token": "new-token", "token_type": "bearer" })),
            )
            .mount(&harness.server)
            .await;

        let output = harness
            .run(
                CliCommand::Login(LoginArgs {
                    email: "me@example.com".into(),
                    password: "pw".into(),
                }),
                "",
            )
            .await
            .unwrap();

        assert!(output.contains("Signed in as me@example.com"));
        assert_eq!(harness.session().unwrap().access_token(), "new-token");
    }

    #[tokio::test]
    async fn commands_require_a_session() {
        let harness = Harness::new(false).await;
        let err = harness
            .run(CliCommand::Tasks(tasks_args()), "")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not signed in"));
    }

    #[tokio::test]
    async fn logout_forgets_session() {
        let harness = Harness::new(true).await;
        let output = harness.run(CliCommand::Logout, "").await.unwrap();
        assert!(output.contains("Signed out"));
        assert!(harness.session().is_none());
    }

    #[tokio::test]
    async fn whoami_signs_out_when_profile_is_rejected() {
        let harness = Harness::new(true).await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&harness.server)
            .await;

        let err = harness.run(CliCommand::Whoami, "").await.unwrap_err();
        assert!(err.to_string().contains("signed out"));
        assert!(harness.session().is_none());
    }

    fn tasks_args() -> TasksArgs {
        TasksArgs {
            filter: crate::view::TaskFilter::All,
            date: None,
            limit: None,
        }
    }

    #[tokio::test]
    async fn tasks_prints_rows_and_progress() {
        let harness = Harness::new(true).await;
        mount_tasks(
            &harness.server,
            vec![task_json(1, "pending"), task_json(2, "completed")],
        )
        .await;

        let output = harness.run(CliCommand::Tasks(tasks_args()), "").await.unwrap();
        assert!(output.contains("Task 1"));
        assert!(output.contains("Task 2"));
        assert!(output.contains("1 of 2 done (50%)"));
        assert!(output.contains("All 2 · Today 1 · Later 1"));
    }

    #[tokio::test]
    async fn tasks_failure_is_reported() {
        let harness = Harness::new(true).await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&harness.server)
            .await;

        let err = harness
            .run(CliCommand::Tasks(tasks_args()), "")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to fetch tasks"));
    }

    #[tokio::test]
    async fn toggle_sends_flipped_status() {
        let harness = Harness::new(true).await;
        mount_tasks(&harness.server, vec![task_json(1, "pending")]).await;
        Mock::given(method("PUT"))
            .and(path("/tasks/1"))
            .and(header("Authorization", "Bearer tok"))
            .and(body_json(json!({ "status": "completed" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&harness.server)
            .await;

        let output = harness
            .run(CliCommand::Toggle(TaskIdArgs { id: 1 }), "")
            .await
            .unwrap();
        assert!(output.contains("Task 1 is now completed"));
    }

    #[tokio::test]
    async fn toggle_unknown_task_fails_without_request() {
        let harness = Harness::new(true).await;
        mount_tasks(&harness.server, vec![task_json(1, "pending")]).await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&harness.server)
            .await;

        let err = harness
            .run(CliCommand::Toggle(TaskIdArgs { id: 9 }), "")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("task 9 not found"));
    }

    #[tokio::test]
    async fn delete_declined_keeps_task() {
        let harness = Harness::new(true).await;
        mount_tasks(&harness.server, vec![task_json(1, "pending")]).await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&harness.server)
            .await;

        let output = harness
            .run(CliCommand::Delete(DeleteArgs { id: 1, yes: false }), "n\n")
            .await
            .unwrap();
        assert!(output.contains("Delete 'Task 1'?"));
        assert!(output.contains("Kept task 1"));
    }

    #[tokio::test]
    async fn delete_confirmed_by_prompt() {
        let harness = Harness::new(true).await;
        mount_tasks(&harness.server, vec![task_json(1, "pending")]).await;
        Mock::given(method("DELETE"))
            .and(path("/tasks/1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&harness.server)
            .await;

        let output = harness
            .run(CliCommand::Delete(DeleteArgs { id: 1, yes: false }), "yes\n")
            .await
            .unwrap();
        assert!(output.contains("Deleted task 1"));
    }

    #[tokio::test]
    async fn delete_failure_is_an_error() {
        let harness = Harness::new(true).await;
        mount_tasks(&harness.server, vec![task_json(1, "pending")]).await;
        Mock::given(method("DELETE"))
            .and(path("/tasks/1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("nope"))
            .mount(&harness.server)
            .await;

        let err = harness
            .run(CliCommand::Delete(DeleteArgs { id: 1, yes: true }), "")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to delete task"));
    }

    #[tokio::test]
    async fn integrations_marks_connected_providers() {
        let harness = Harness::new(true).await;
        Mock::given(method("GET"))
            .and(path("/integrations"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "id": 1, "provider": "slack" }])),
            )
            .mount(&harness.server)
            .await;

        let output = harness
            .run(CliCommand::Integrations(IntegrationsArgs { limit: None }), "")
            .await
            .unwrap();
        let slack = output.lines().find(|line| line.contains("Slack")).unwrap();
        let gmail = output.lines().find(|line| line.contains("Gmail")).unwrap();
        assert!(slack.starts_with("[connected]"));
        assert!(gmail.starts_with("[ ]"));
        assert!(output.contains("1 connected"));
    }

    #[tokio::test]
    async fn connect_prints_redirect_url() {
        let harness = Harness::new(true).await;
        Mock::given(method("GET"))
            .and(path("/auth/gmail/start"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "redirect_url": "https://accounts.example/auth" })),
            )
            .mount(&harness.server)
            .await;

        let output = harness
            .run(
                CliCommand::Connect(ConnectArgs {
                    provider: "GMAIL".into(),
                }),
                "",
            )
            .await
            .unwrap();
        assert!(output.contains("https://accounts.example/auth"));
    }

    #[tokio::test]
    async fn profile_set_keeps_unspecified_fields() {
        let harness = Harness::new(true).await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1",
                "full_name": "Ada",
                "email": "ada@example.com",
                "phone": "123",
                "location": "London"
            })))
            .mount(&harness.server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/users/me"))
            .and(body_json(json!({
                "full_name": "Ada",
                "email": "ada@example.com",
                "phone": "123",
                "location": "Paris"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&harness.server)
            .await;

        let command = CliCommand::Profile(ProfileArgs {
            action: Some(ProfileAction::Set(ProfileSetArgs {
                location: Some("Paris".into()),
                ..ProfileSetArgs::default()
            })),
        });
        let output = harness.run(command, "").await.unwrap();
        assert!(output.contains("Profile updated"));
    }

    #[tokio::test]
    async fn home_lists_today_and_integrations() {
        let harness = Harness::new(true).await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [task_json(5, "pending")]
            })))
            .mount(&harness.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/integrations"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&harness.server)
            .await;

        let output = harness.run(CliCommand::Home, "").await.unwrap();
        assert!(output.contains("Task 5"));
        assert!(output.contains("None connected"));
    }

    #[rstest]
    #[case("y\n", true)]
    #[case(" YES ", true)]
    #[case("", false)]
    #[case("no", false)]
    #[case("yep", false)]
    fn confirmation_answers(#[case] answer: &str, #[case] expected: bool) {
        assert_eq!(is_yes(answer), expected);
    }
}
