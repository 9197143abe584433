mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use kodakhome_core::SmartHomeSession;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::{CliError, from_core};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a portal session
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "kodakhome", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let (session_config, profile) = config::resolve_session_config(&cli.global)?;
            let mut session =
                SmartHomeSession::new(session_config).map_err(|e| from_core(e, &profile))?;

            connect(&mut session, &cli.global)
                .await
                .map_err(|e| from_core(e, &profile))?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &session, &cli.global);
            session.disconnect().await;
            result
        }
    }
}

/// Log in and pull the snapshot behind a spinner.
async fn connect(
    session: &mut SmartHomeSession,
    global: &GlobalOpts,
) -> Result<(), kodakhome_core::CoreError> {
    let spinner = if global.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Connecting as {}", session.username()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = session.connect().await;
    spinner.finish_and_clear();

    if result.is_ok() {
        tracing::info!(
            devices = session.store().devices().len(),
            events = session.store().event_count(),
            "snapshot loaded"
        );
    }
    result
}
