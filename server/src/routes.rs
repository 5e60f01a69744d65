// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::handlers;
use crate::storage::StorageService;
use axum::{
    routing::{delete, get, patch},
    Router,
};

/// Creates and configures the application router.
pub fn create_router(storage: StorageService) -> Router {
    Router::new()
        // `GET` lists tasks (optionally for one day), `POST` creates one
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/api/tasks/{id}/toggle", patch(handlers::toggle_task))
        // Days of a month that have tasks, for calendar markers
        .route("/api/calendar/{year}/{month}", get(handlers::month_overview))
        .route("/api/reminders", get(handlers::pending_reminders))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .route("/api/data", delete(handlers::clear_data))
        // Adds the storage service to the application state
        .with_state(storage)
}
