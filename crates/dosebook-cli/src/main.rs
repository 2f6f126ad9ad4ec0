//! dosebook - command-line front-end for dosebook accounts.
//!
//! Restores the saved session at startup, then runs one account command
//! against the API server.

mod commands;
mod shell;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dosebook_core::config::API_BASE_URL_ENV;
use dosebook_core::{App, Config};

use shell::ConsoleNavigator;

#[derive(Parser, Debug)]
#[command(name = "dosebook", about = "Sign in to dosebook and manage the saved session")]
struct Cli {
    /// Server origin, e.g. http://127.0.0.1:8000 (the /api prefix is added)
    #[arg(long, env = API_BASE_URL_ENV)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and save the session
    Login {
        #[arg(long, short)]
        username: Option<String>,

        #[arg(long, env = "DOSEBOOK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out locally and revoke the token on the server
    Logout,
    /// Create an account and sign in
    Register {
        #[arg(long, short)]
        username: Option<String>,

        #[arg(long)]
        nickname: Option<String>,
    },
    /// Fetch the signed-in profile from the server
    Whoami {
        #[arg(long)]
        json: bool,
    },
    /// Show the saved session without contacting the server
    Status {
        #[arg(long)]
        json: bool,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing();
    info!("dosebook starting");

    let mut config = Config::load()?;
    let app = App::from_config(&config, cli.base_url.as_deref(), Arc::new(ConsoleNavigator))?;

    let result = match cli.command {
        Command::Login { username, password } => {
            commands::login(&app, &mut config, username, password).await
        }
        Command::Logout => commands::logout(&app).await,
        Command::Register { username, nickname } => {
            commands::register(&app, &mut config, username, nickname).await
        }
        Command::Whoami { json } => commands::whoami(&app, json).await,
        Command::Status { json } => commands::status(&app, &config, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_login_with_username() {
        let cli = Cli::try_parse_from(["dosebook", "login", "-u", "alice"]).unwrap();
        match cli.command {
            Command::Login { username, .. } => assert_eq!(username.as_deref(), Some("alice")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_base_url_flag() {
        let cli = Cli::try_parse_from(["dosebook", "--base-url", "http://example.com", "status"])
            .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://example.com"));
        assert!(matches!(cli.command, Command::Status { json: false }));
    }

    #[test]
    fn test_base_url_env_feeds_the_override() {
        std::env::set_var(API_BASE_URL_ENV, "http://from-env");
        let from_env = Cli::try_parse_from(["dosebook", "status"]).unwrap();
        let from_flag =
            Cli::try_parse_from(["dosebook", "--base-url", "http://from-flag", "status"]).unwrap();
        std::env::remove_var(API_BASE_URL_ENV);

        assert_eq!(from_env.base_url.as_deref(), Some("http://from-env"));
        assert_eq!(from_flag.base_url.as_deref(), Some("http://from-flag"));
    }
}
