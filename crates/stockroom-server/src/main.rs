// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stockroom membership guard server binary.

use std::time::Duration;

use clap::{Parser, Subcommand};
use stockroom_server::{create_app_state, create_router};
use stockroom_server_db::SessionRepository;
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Stockroom server - workspace membership authorization for the ops dashboard.
#[derive(Parser, Debug)]
#[command(
	name = "stockroom-server",
	about = "Stockroom workspace membership guard server",
	version
)]
struct Args {
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("stockroom-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = stockroom_server_config::load_config_from_env()?;

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.filter.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting stockroom-server"
	);

	let pool = stockroom_server_db::create_pool(&config.database.url).await?;
	stockroom_server_db::ensure_schema(&pool).await?;

	let state = create_app_state(pool.clone(), &config).await;

	// Hourly sweep for expired sessions.
	{
		let sessions = SessionRepository::new(pool.clone());
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
			loop {
				ticker.tick().await;
				match sessions.delete_expired_sessions().await {
					Ok(0) => {}
					Ok(n) => tracing::info!(deleted = n, "expired sessions removed"),
					Err(e) => tracing::warn!(error = %e, "session sweep failed"),
				}
			}
		});
	}

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
