//! Pytheon CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use pytheon::auth::PASSWORD_ENV;
use pytheon::cli::{Cli, CommandDispatcher};
use pytheon::config::user_config_path;
use pytheon::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--verbose` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pytheon=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pytheon=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Whether we run under a CI system.
fn is_ci() -> bool {
    std::env::var_os("CI").is_some_and(|v| !v.is_empty() && v != "false")
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tracing::debug!("Pytheon starting with args: {:?}", cli);

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let mut ui = create_ui(!is_ci(), output_mode);

    let (project_root, config_path) = match (std::env::current_dir(), user_config_path()) {
        (Ok(root), Ok(config)) => (root, config),
        (Err(e), _) => {
            ui.error(&format!("Cannot read the current directory: {}", e));
            return ExitCode::from(1);
        }
        (_, Err(e)) => {
            ui.error(&e.to_string());
            return ExitCode::from(1);
        }
    };

    let dispatcher = CommandDispatcher::new(project_root, config_path)
        .with_api_host(cli.api_host.clone())
        .with_platform_store(!cli.no_keyring)
        .with_password_override(std::env::var(PASSWORD_ENV).ok());

    let result = dispatcher.dispatch(&cli.command, ui.as_mut());
    ExitCode::from(u8::try_from(result.exit_code).unwrap_or(1))
}
