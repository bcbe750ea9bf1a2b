use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use common::context::Context;
use common::logging;
use common::signal::SignalHandler;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::ConnectOptions;
use todo_api::config::AppConfig;
use todo_api::global::GlobalState;
use todo_api::store::PgStore;
use tokio::signal::unix::SignalKind;
use tokio::{select, time};

#[tokio::main]
async fn main() -> Result<()> {
	let config = AppConfig::parse()?;

	logging::init(&config.logging.level, config.logging.mode)?;

	if let Some(file) = &config.config_file {
		tracing::info!(file = file, "loaded config from file");
	}

	let pool = PgPoolOptions::new()
		.max_connections(config.database.max_connections)
		.connect_with(PgConnectOptions::from_str(&config.database.uri)?.disable_statement_logging())
		.await?;

	let store = PgStore::new(pool);
	store.migrate().await?;

	tracing::info!("database migrations applied");

	let (ctx, handler) = Context::new();

	let global = Arc::new(GlobalState::new(config, ctx, store));

	let api_future = tokio::spawn(todo_api::api::run(global.clone()));

	// Listen on both sigint and sigterm and cancel the context when either is received
	let mut signal_handler = SignalHandler::new()
		.with_signal(SignalKind::interrupt())?
		.with_signal(SignalKind::terminate())?;

	select! {
		r = api_future => tracing::error!("api stopped unexpectedly: {:?}", r),
		_ = signal_handler.recv() => tracing::info!("shutting down"),
	}

	// A context still in scope would keep the handler waiting forever.
	drop(global);

	tracing::info!("waiting for tasks to finish");

	select! {
		_ = time::sleep(Duration::from_secs(60)) => tracing::warn!("force shutting down"),
		_ = signal_handler.recv() => tracing::warn!("force shutting down"),
		_ = handler.cancel() => tracing::info!("shutting down"),
	}

	Ok(())
}
