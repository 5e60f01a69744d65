// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderName;
use chrono::Local;
use server::config::Config;
use server::database::{self, SqliteStore};
use server::routes;
use server::storage::StorageService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting up the server...");

    if let Err(e) = run().await {
        tracing::error!("Server stopped: {:?}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    if let Some(dir) = config.database_dir() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create database directory {}", dir))?;
    }

    let db_pool = database::establish_connection_pool(&config.database_url).await?;
    tracing::info!("Database connection was made successfully.");

    let storage = StorageService::new(Arc::new(SqliteStore::new(db_pool)));

    report_reminders(&storage).await;

    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
        ])
        .allow_origin(Any);

    let app = routes::create_router(storage)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("The server listens on http://{}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Runs the reminder check once at launch and logs what is due.
async fn report_reminders(storage: &StorageService) {
    match storage.pending_reminders(Local::now().naive_local()).await {
        Ok(due) if due.is_empty() => tracing::info!("No reminders due."),
        Ok(due) => {
            for task in due {
                let at = task
                    .reminder_time
                    .map(|time| format!("{:02}:{:02}", time.hour(), time.minute()))
                    .unwrap_or_default();
                tracing::info!("Reminder: '{}' at {} (task {})", task.title, at, task.id);
            }
        }
        Err(e) => tracing::warn!("Could not check reminders: {}", e),
    }
}
