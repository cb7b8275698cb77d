use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = taskdeck::cli::Cli::parse();
    let config = taskdeck::config::from_cli(&cli)?;
    let log_filter = cli.log_filter.as_deref();

    match cli.command.clone() {
        Some(taskdeck::cli::CliCommand::Tui) | None => {
            taskdeck::logging::init_file(&config.log_path(), log_filter)?;
            taskdeck::tui::run(config)?;
        }
        Some(command) => {
            taskdeck::logging::init_stderr(log_filter)?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            taskdeck::commands::execute(&config, command, stdin.lock(), stdout.lock())?;
        }
    }

    Ok(())
}
