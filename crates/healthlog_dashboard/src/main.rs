use std::sync::Arc;

use anyhow::{Context, bail};
use healthlog_client::HealthLogClient;
use healthlog_client::config::Config;
use healthlog_client::http_client::ReqwestHealthLogClient;
use healthlog_dashboard::types::{HistoryReport, RangeParams};
use healthlog_dashboard::{
    DashboardView, HistoryState, LoggingMiddleware, Session, ViewCoordinator,
};

#[derive(Debug, PartialEq)]
enum Command {
    Dashboard,
    History(RangeParams),
    Exercises(Option<String>),
    Schema,
}

fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    match args.first().map(String::as_str) {
        None | Some("dashboard") => Ok(Command::Dashboard),
        Some("history") => match (args.get(1), args.get(2)) {
            (Some(start), Some(end)) => Ok(Command::History(RangeParams {
                start: start.clone(),
                end: end.clone(),
            })),
            _ => bail!("usage: healthlog history <start YYYY-MM-DD> <end YYYY-MM-DD>"),
        },
        Some("exercises") => Ok(Command::Exercises(args.get(1).cloned())),
        Some("schema") => Ok(Command::Schema),
        Some(other) => bail!("unknown command `{other}` (expected dashboard, history, exercises or schema)"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from env var `HEALTHLOG_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("HEALTHLOG_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!("healthlog: log filter: {}", log_env);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;
    if command == Command::Schema {
        return print_json(&serde_json::json!({
            "DashboardView": schemars::schema_for!(DashboardView),
            "HistoryState": schemars::schema_for!(HistoryState),
            "HistoryReport": schemars::schema_for!(HistoryReport),
        }));
    }

    let config = Config::from_env().context("reading HEALTHLOG_* configuration")?;
    let http = ReqwestHealthLogClient::from_config(&config).context("building HTTP client")?;
    let client = Arc::new(LoggingMiddleware::new(http));
    tracing::info!("healthlog: using API at {}", config.base_url);

    if let Command::Exercises(query) = &command {
        let catalog = match query {
            Some(name) => client.search_exercises(name).await?,
            None => client.list_exercises().await?,
        };
        return print_json(&catalog);
    }

    let session = Session::from_config(&config)?;
    let coordinator = ViewCoordinator::new(client, session);
    match command {
        Command::History(params) => {
            coordinator.load_range(params.to_range()).await;
            print_json(&HistoryReport::from(coordinator.history().await))
        }
        _ => {
            coordinator.refresh_dashboard().await;
            print_json(&coordinator.dashboard().await)
        }
    }
}
