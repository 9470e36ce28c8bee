use axum::extract::State;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{Json, Path};
use crate::state::AppState;
use crate::tasks::TaskRecord;

/// GET /api/v1/tasks/:id
pub async fn handle_get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskRecord>, AppError> {
    state
        .tasks
        .get(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Task {id} not found")))
}

/// DELETE /api/v1/tasks/:id
///
/// Cancels a pending task. Already-finished tasks come back as they are.
pub async fn handle_cancel_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskRecord>, AppError> {
    state
        .tasks
        .cancel(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Task {id} not found")))
}
