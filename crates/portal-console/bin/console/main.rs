mod cli;

use crate::cli::CLI;
use anyhow::Context;
use clap::Parser;
use portal_console::session::HELP;
use portal_console::{Flow, Session};
use portal_registry::LinkRegistry;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr and stay quiet by default so the prompt is readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CLI::parse();
    let settings = config.registry_settings()?;

    info!(
        ttl = %settings.ttl,
        default_visit_limit = settings.default_visit_limit,
        sweep_interval = ?settings.sweep_interval,
        "starting link registry"
    );

    let registry = LinkRegistry::new(settings).context("failed to start the link registry")?;
    let owner_id = config
        .owner_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut session = Session::new(&registry, owner_id);
    if let Some(base_url) = &config.base_url {
        session = session.with_base_url(base_url.as_str());
    }

    let mut stdout = std::io::stdout();
    writeln!(stdout, "Welcome to the link shortener!")?;
    writeln!(stdout, "Your owner id: {}", session.owner_id())?;
    writeln!(stdout)?;
    write!(stdout, "{HELP}")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };

        let Some(line) = line else {
            writeln!(stdout)?;
            break;
        };

        if session.handle_line(&line, &mut stdout)? == Flow::Exit {
            break;
        }
    }

    registry.shutdown().await;
    Ok(())
}
