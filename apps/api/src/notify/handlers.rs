use axum::{extract::State, http::StatusCode};
use chrono::Utc;

use crate::errors::AppError;
use crate::extract::{Json, Path};
use crate::notify::{Notification, NotificationId};
use crate::state::AppState;

/// GET /api/v1/notifications
///
/// Live notifications, oldest first. Anything past its lifetime is swept
/// first in case its expiry timer has not fired yet.
pub async fn handle_list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    state.relay.sweep_expired(Utc::now());
    Json(state.relay.pending())
}

/// DELETE /api/v1/notifications/:id
pub async fn handle_dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    if state.relay.dismiss(NotificationId(id)) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Notification {id} not found")))
    }
}
