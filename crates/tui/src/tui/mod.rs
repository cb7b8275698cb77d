use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::AppConfig;
use crate::core::{ApiClient, SessionStore};
use crate::services::TasksService;
use crate::view::{run_command, Command, Message, TaskStore, TasksView};

mod app;
mod buffer;
mod constants;
pub(crate) mod helpers;

use app::App;
use constants::TICK_RATE;

type Backend = CrosstermBackend<Stdout>;

/// Runs view commands on the background runtime and posts their outcomes back to the UI thread.
struct Dispatcher {
    handle: Handle,
    store: Arc<dyn TaskStore>,
    tx: UnboundedSender<Message>,
}

impl Dispatcher {
    fn dispatch(&self, command: Command) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let message = run_command(store.as_ref(), command).await;
            if tx.send(message).is_err() {
                tracing::debug!("ui closed before command finished");
            }
        });
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    // Resolve the session before touching the terminal.
    let session = SessionStore::for_config(&config)
        .load()
        .ok_or_else(|| anyhow!("not signed in; run `taskdeck login` first"))?;
    let client = ApiClient::from_config(&config, Some(session))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher {
        handle: runtime.handle().clone(),
        store: Arc::new(TasksService::new(client)),
        tx,
    };

    tracing::info!(api_url = config.api_url(), "starting tui");

    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
    terminal.hide_cursor().context("failed to hide cursor")?;

    let mut app = App::new(config, TasksView::new());
    app.start();
    let result = run_app(&mut terminal, &mut app, &dispatcher, &mut rx);

    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    runtime.shutdown_background();
    result
}

fn run_app(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    dispatcher: &Dispatcher,
    rx: &mut UnboundedReceiver<Message>,
) -> Result<()> {
    let mut last_tick = Instant::now();
    loop {
        for command in app.take_commands() {
            dispatcher.dispatch(command);
        }

        terminal.draw(|f| app.draw(f))?;
        if app.should_quit() {
            break;
        }

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| std::time::Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        while let Ok(message) = rx.try_recv() {
            app.apply(message);
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.on_tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
