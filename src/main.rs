mod assessments;
mod auth;
mod backup;
mod config;
mod db;
mod error;
mod features;
mod ipc;
mod ratings;
mod reports;
mod students;
mod taxonomy;

use anyhow::Context;
use clap::Parser;
use config::{Cli, Command, Config};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Config errors are reported by anyhow on stderr, before logging exists.
    let config = Config::from_cli(&cli)?;

    // stdout carries the protocol; logs go to stderr.
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command.clone().unwrap_or(Command::Serve) {
        Command::Restore { bundle } => {
            let summary = backup::restore_bundle(&bundle, &config.database_path)
                .with_context(|| format!("failed to restore {}", bundle.to_string_lossy()))?;
            tracing::info!(
                format = %summary.bundle_format_detected,
                bytes = summary.db_bytes,
                database = %config.database_path.display(),
                "database restored"
            );
            Ok(())
        }
        Command::Serve => serve(config),
    }
}

fn serve(config: Config) -> anyhow::Result<()> {
    let conn = db::open_db(&config.database_path)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %config.database_path.display(),
        "drdpd ready"
    );
    let mut state = ipc::AppState { db: conn, config };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            // No usable id to reply to.
            Err(e) => serde_json::json!({
                "id": null,
                "ok": false,
                "error": { "code": "bad_json", "message": e.to_string() }
            }),
        };
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
