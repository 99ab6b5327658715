use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{Parser, Subcommand};

use mediconnect::api::ApiClient;
use mediconnect::api::http::HttpTransport;
use mediconnect::cli::{self, FormatTarget};
use mediconnect::config;
use mediconnect::dashboard::DashboardController;
use mediconnect::logging;
use mediconnect::notify::NotificationCenter;
use mediconnect::shell::Shell;

#[derive(Debug, Parser)]
#[command(name = "mediconnect")]
#[command(about = "Terminal client for the MediConnect healthcare portal")]
struct App {
    /// Backend origin, overriding configuration
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the interactive shell (default)
    Shell,
    /// Format an assistant reply read from stdin
    Format {
        #[arg(long, value_enum, default_value = "terminal")]
        to: FormatTarget,
    },
    /// Check configuration and backend reachability
    Health,
    /// Manage configuration files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration and its sources
    Show,
    /// Write the default config to ~/.mediconnect/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set one dotted key, e.g. `server.base_url`
    Set { key: String, value: String },
    /// Overwrite the global config with defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    let mut cfg = config::load();
    if let Some(url) = app.base_url {
        cfg.server.base_url = url;
    }
    logging::init(&cfg.logging.level)?;

    match app.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            if !io::stdout().is_terminal() {
                colored::control::set_override(false);
            }
            let api = ApiClient::new(HttpTransport::new(&cfg.server.base_url));
            let notifications = NotificationCenter::new(cfg.notifications.ttl(), cfg.notifications.cap());
            let controller = DashboardController::new(api, notifications);
            let mut shell = Shell::new(controller, cfg.chat.clone());
            shell.run(io::stdin().lock(), io::stdout().lock())
        }
        Commands::Format { to } => cli::run_format(to),
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
