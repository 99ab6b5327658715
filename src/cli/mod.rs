//! Non-interactive subcommands: `config`, `format` and `health`.
//!
//! Output goes to stdout with the same ✓/✗/· markers the shell uses.

use std::io::Read;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::http::HttpTransport;
use crate::api::{ApiClient, ApiError};
use crate::chat::format::format_reply;
use crate::config::{self, MediConnectConfig};
use crate::render::{html, terminal};

/// Target of `mediconnect format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatTarget {
    Html,
    Terminal,
}

// ---------------------------------------------------------------------------
// mediconnect format
// ---------------------------------------------------------------------------

/// Format an assistant reply read from stdin.
pub fn run_format(target: FormatTarget) -> Result<()> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read reply text from stdin")?;
    println!("{}", format_text(&text, target));
    Ok(())
}

pub fn format_text(text: &str, target: FormatTarget) -> String {
    let blocks = format_reply(text);
    match target {
        FormatTarget::Html => html::blocks(&blocks),
        FormatTarget::Terminal => terminal::blocks(&blocks, ""),
    }
}

// ---------------------------------------------------------------------------
// mediconnect health
// ---------------------------------------------------------------------------

/// Check configuration files and backend reachability.
pub fn run_health(cfg: &MediConnectConfig) -> Result<()> {
    println!("{}", "MediConnect Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.mediconnect/config.toml found"
        } else {
            "not found (run `mediconnect config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".mediconnect.toml found"
        } else {
            "none (optional)"
        },
    );

    let api = ApiClient::new(HttpTransport::new(&cfg.server.base_url));
    let (ok, detail) = describe_reachability(&cfg.server.base_url, api.current_user().map(|u| u.full_name()));
    print_health_item("Backend", ok, &detail);

    print_health_item(
        "Assistant",
        cfg.chat.enabled,
        if cfg.chat.enabled {
            "enabled"
        } else {
            "disabled (set MEDICONNECT_CHAT=1 to enable)"
        },
    );
    print_health_item(
        "Notifications",
        true,
        &match cfg.notifications.cap() {
            Some(cap) => format!("{}s, at most {cap} stacked", cfg.notifications.ttl_secs),
            None => format!("{}s, unlimited stack", cfg.notifications.ttl_secs),
        },
    );
    Ok(())
}

/// Any HTTP answer from the session check, even 401, means the backend is up.
fn describe_reachability(base_url: &str, answer: Result<String, ApiError>) -> (bool, String) {
    match answer {
        Ok(name) => (true, format!("reachable at {base_url} (session for {name})")),
        Err(ApiError::Status { status, .. }) => {
            (true, format!("reachable at {base_url} (HTTP {status}, no session)"))
        }
        Err(ApiError::Malformed(_)) => (
            false,
            format!("{base_url} answered with an unexpected body"),
        ),
        Err(ApiError::Transport(err)) => (false, format!("not reachable at {base_url}: {err}")),
    }
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// mediconnect config show | init | set | reset
// ---------------------------------------------------------------------------

pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective MediConnect Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.mediconnect/config.toml", global_exists);
    print_source(".mediconnect.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "MEDICONNECT_* environment variables".dimmed()
    );
    Ok(())
}

fn print_source(name: &str, found: bool) {
    if found {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    let path = config::set_config_value(key, value)?;
    println!(
        "{} Set {} = {} in {}",
        "✓".green().bold(),
        key.bold(),
        value,
        path.display()
    );
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
