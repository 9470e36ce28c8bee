use axum::{extract::State, http::StatusCode};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::Json;
use crate::state::AppState;
use crate::support::SupportTicket;

pub const SUBMITTED_MESSAGE: &str = "Support ticket submitted successfully!";

#[derive(Debug, Serialize)]
pub struct TicketAccepted {
    pub task_id: Uuid,
}

/// POST /api/v1/support-tickets
///
/// Validates the form, then files it in the background. Poll
/// `/api/v1/tasks/:id` for the outcome.
pub async fn handle_submit_ticket(
    State(state): State<AppState>,
    Json(ticket): Json<SupportTicket>,
) -> Result<(StatusCode, Json<TicketAccepted>), AppError> {
    ticket.validate().map_err(AppError::InvalidFields)?;

    let desk = state.ticket_desk.clone();
    let task_id = state
        .tasks
        .spawn("Submit support ticket", SUBMITTED_MESSAGE, async move {
            desk.submit(ticket).await
        });

    Ok((StatusCode::ACCEPTED, Json(TicketAccepted { task_id })))
}
