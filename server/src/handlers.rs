// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::storage::{StorageError, StorageService};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDate, NaiveTime};
use common::{DaySummary, ReminderTime, Settings, Task, TaskPayload};
use serde::Deserialize;
use tracing::{debug, error, info};

#[derive(Deserialize, Debug)]
pub struct ListQuery {
    pub date: Option<NaiveDate>,
}

/// Handler for listing all tasks, or only those due on `?date=`.
pub async fn list_tasks(
    State(storage): State<StorageService>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = match query.date {
        Some(date) => storage.tasks_due_on(date).await?,
        None => storage.get_tasks().await?,
    };
    info!("Successfully retrieved {} tasks.", tasks.len());
    Ok(Json(tasks))
}

/// Handler for fetching one task.
pub async fn get_task(
    State(storage): State<StorageService>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, AppError> {
    match storage.find_task(&task_id).await? {
        Some(task) => Ok(Json(task)),
        None => Err(AppError::not_found(&task_id)),
    }
}

/// Checks the form fields shared by create and edit.
fn validate_payload(payload: &TaskPayload) -> Result<Option<ReminderTime>, AppError> {
    if payload.title.trim().is_empty() {
        error!("Validation failed: Title is empty.");
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Title cannot be empty.",
        ));
    }

    payload
        .reminder_time
        .as_deref()
        .map(str::parse::<ReminderTime>)
        .transpose()
        .map_err(|e| {
            error!("Validation failed: {}", e);
            AppError::new(StatusCode::BAD_REQUEST, &e.to_string())
        })
}

/// Handler for creating a new task.
pub async fn create_task(
    State(storage): State<StorageService>,
    Json(payload): Json<TaskPayload>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    debug!("Received request to create task: {}", payload.title);
    let reminder_time = validate_payload(&payload)?;

    let task = Task::new(
        uuid::Uuid::new_v4().to_string(),
        payload.title,
        payload.description,
        payload.due_date.and_time(NaiveTime::MIN),
        reminder_time,
    );
    storage.add_task(task.clone()).await?;

    info!("Task created successfully with ID: {}", task.id);

    // Return a 201 Created status with the new task as JSON.
    Ok((StatusCode::CREATED, Json(task)))
}

/// Handler for editing a task. The id and completion state are kept.
pub async fn update_task(
    State(storage): State<StorageService>,
    Path(task_id): Path<String>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<Task>, AppError> {
    debug!("Attempting to update task with ID: {}", task_id);
    let reminder_time = validate_payload(&payload)?;

    let Some(existing) = storage.find_task(&task_id).await? else {
        return Err(AppError::not_found(&task_id));
    };

    let edited = Task {
        title: payload.title,
        description: payload.description,
        due_date: payload.due_date.and_time(existing.due_date.time()),
        reminder_time,
        ..existing
    };

    if !storage.update_task(edited.clone()).await? {
        return Err(AppError::not_found(&task_id));
    }

    info!("Task with ID {} updated successfully.", task_id);
    Ok(Json(edited))
}

/// Handler for flipping a task between done and not done.
pub async fn toggle_task(
    State(storage): State<StorageService>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, AppError> {
    match storage.toggle_completion(&task_id).await? {
        Some(task) => {
            info!(
                "Task with ID {} marked completed={}.",
                task_id, task.is_completed
            );
            Ok(Json(task))
        }
        None => Err(AppError::not_found(&task_id)),
    }
}

/// Handler for deleting a task by ID.
pub async fn delete_task(
    State(storage): State<StorageService>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, AppError> {
    debug!("Attempting to delete task with ID: {}", task_id);

    let removed = storage.delete_task(&task_id).await?;

    if removed > 0 {
        info!("Deleted {} task(s) with ID {}.", removed, task_id);
        Ok(StatusCode::NO_CONTENT) // 204 No Content for successful deletion
    } else {
        Err(AppError::not_found(&task_id))
    }
}

/// Handler for the calendar markers of one month.
pub async fn month_overview(
    State(storage): State<StorageService>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Vec<DaySummary>>, AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            &format!("Month must be between 1 and 12, got {}.", month),
        ));
    }

    let tasks = storage.get_tasks().await?;
    Ok(Json(common::day_summaries(&tasks, year, month)))
}

/// Handler for the reminders due right now on the local clock.
pub async fn pending_reminders(
    State(storage): State<StorageService>,
) -> Result<Json<Vec<Task>>, AppError> {
    let due = storage
        .pending_reminders(Local::now().naive_local())
        .await?;
    debug!("{} reminders due.", due.len());
    Ok(Json(due))
}

pub async fn get_settings(
    State(storage): State<StorageService>,
) -> Result<Json<Settings>, AppError> {
    Ok(Json(Settings {
        reminders_enabled: storage.get_reminders_enabled().await?,
    }))
}

pub async fn update_settings(
    State(storage): State<StorageService>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, AppError> {
    storage
        .set_reminders_enabled(settings.reminders_enabled)
        .await?;
    Ok(Json(settings))
}

/// Handler for wiping every task and setting.
pub async fn clear_data(State(storage): State<StorageService>) -> Result<StatusCode, AppError> {
    storage.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Custom Error Handling ---

/// Our custom error type for the application.
#[derive(Debug)]
pub struct AppError {
    code: StatusCode,
    message: String,
}

impl AppError {
    fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }

    fn not_found(task_id: &str) -> Self {
        error!("Task with ID {} not found.", task_id);
        Self::new(
            StatusCode::NOT_FOUND,
            &format!("Task with ID {} not found.", task_id),
        )
    }
}

/// Allows converting a `StorageError` into our `AppError`.
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        // Log the internal error for debugging.
        tracing::error!("Storage error: {:?}", err);
        let message = match err {
            StorageError::Record(_) => "Stored task data is corrupt.",
            StorageError::Store(_) => "An internal error occurred.",
        };
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// Allows Axum to convert our `AppError` into an HTTP `Response`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(
            "Responding with error: status_code={}, message={}",
            self.code.as_u16(),
            self.message
        );
        (
            self.code,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn test_storage() -> StorageService {
        StorageService::new(Arc::new(MemoryStore::new()))
    }

    // Helper to create a payload for tests
    fn create_test_payload(title: &str, reminder_time: Option<&str>) -> Json<TaskPayload> {
        Json(TaskPayload {
            title: title.to_string(),
            description: "A valid description".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            reminder_time: reminder_time.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_create_task_validation_empty_title() {
        let storage = test_storage();
        let payload = create_test_payload("   ", None);

        let result = create_task(State(storage.clone()), payload).await;

        let err = result.unwrap_err();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Title cannot be empty.");
        assert!(storage.get_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_task_validation_bad_reminder() {
        let storage = test_storage();
        let payload = create_test_payload("Essay", Some("9"));

        let err = create_task(State(storage), payload).await.unwrap_err();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("\"9\""));
    }

    #[tokio::test]
    async fn test_create_assigns_fresh_ids() {
        let storage = test_storage();

        let (status, Json(first)) = create_task(
            State(storage.clone()),
            create_test_payload("Essay", Some("9:30")),
        )
        .await
        .unwrap();
        let (_, Json(second)) = create_task(State(storage.clone()), create_test_payload("Quiz", None))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_ne!(first.id, second.id);
        assert!(!first.is_completed);
        assert_eq!(first.reminder_time, Some(ReminderTime::new(9, 30).unwrap()));
        assert_eq!(storage.get_tasks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_completion() {
        let storage = test_storage();
        let (_, Json(created)) = create_task(State(storage.clone()), create_test_payload("Essay", None))
            .await
            .unwrap();
        storage.toggle_completion(&created.id).await.unwrap();

        let Json(edited) = update_task(
            State(storage.clone()),
            Path(created.id.clone()),
            create_test_payload("Essay v2", Some("18:00")),
        )
        .await
        .unwrap();

        assert_eq!(edited.id, created.id);
        assert!(edited.is_completed);
        assert_eq!(edited.title, "Essay v2");
        assert_eq!(storage.find_task(&created.id).await.unwrap(), Some(edited));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let storage = test_storage();

        let err = delete_task(State(storage.clone()), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.code, StatusCode::NOT_FOUND);

        let err = toggle_task(State(storage), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.code, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_month_overview_rejects_bad_month() {
        let err = month_overview(State(test_storage()), Path((2024, 13)))
            .await
            .unwrap_err();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_corrupt_data_maps_to_internal_error() {
        let record_err = common::decode_tasks("not json").unwrap_err();
        let err = AppError::from(StorageError::from(record_err));
        assert_eq!(err.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Stored task data is corrupt.");
    }
}
