use axum::{extract::State, http::HeaderMap};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::actions::idempotency::Replay;
use crate::actions::{ActionError, ActionOutcome, Dispatcher};
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::lists::dto::{
    ActionReceipt, ActiveList, AssignTemplateRequest, CopyTemplateResponse, ListResponse, Row,
    StatusRequest,
};
use crate::lists::workspace::{DashboardSummary, Lists};
use crate::models::record::{ListKind, RecordId};
use crate::models::status::{OutboundStatus, ProspectStatus, StatusKind};
use crate::state::AppState;
use crate::tasks::{report, run_outbound, Liveness};
use crate::views::columns::{discarded_fields, record_fields};
use crate::views::{project, FieldTable, ListQuery, QueryState};

pub const IDEMPOTENCY_HEADER: &str = "idempotency-key";

fn list_response<T>(
    list: ListKind,
    records: &[T],
    table: &FieldTable<T>,
    query: QueryState,
) -> Result<ListResponse<T>, AppError>
where
    for<'r> Row<T>: From<&'r T>,
{
    let visible = project(records, table, &query)?;
    Ok(ListResponse {
        list,
        total: records.len(),
        columns: table.names(),
        records: visible.into_iter().map(Row::from).collect(),
        query,
    })
}

fn to_json<T: Serialize>(value: T) -> Result<Json<Value>, AppError> {
    Ok(Json(serde_json::to_value(value).map_err(anyhow::Error::from)?))
}

/// GET /api/v1/lists/:list
///
/// Query: `search`, `filter_field`, `filter_value`, `filter_op`, `sort`, `direction`.
pub async fn handle_list(
    State(state): State<AppState>,
    Path(list): Path<ListKind>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let query = QueryState::from(params);
    let ws = state.workspace.read().await;
    match list {
        ListKind::Prospects => to_json(list_response(
            list,
            ws.lists.prospects.records(),
            &record_fields::<ProspectStatus>(),
            query,
        )?),
        ListKind::Outbounds => to_json(list_response(
            list,
            ws.lists.outbounds.records(),
            &record_fields::<OutboundStatus>(),
            query,
        )?),
        ListKind::Discarded => to_json(list_response(
            list,
            ws.lists.discarded.records(),
            &discarded_fields(),
            query,
        )?),
    }
}

/// Runs one mutating action under the workspace lock.
///
/// With an `Idempotency-Key` header, the first successful response is
/// stored and replayed for retries of the same action; the action itself
/// is not applied again.
async fn apply_action<F>(
    state: &AppState,
    headers: &HeaderMap,
    action_path: &str,
    apply: F,
) -> Result<Json<Value>, AppError>
where
    F: FnOnce(&mut Lists, &Dispatcher<'_>) -> Result<ActionReceipt, AppError>,
{
    let key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty());

    let mut guard = state.workspace.write().await;
    let ws = &mut *guard;

    if let Some(key) = key {
        match ws.ledger.check(key, action_path) {
            Replay::Stored(response) => {
                info!("Replaying stored response for idempotency key {key}");
                return Ok(Json(response));
            }
            Replay::Mismatch => {
                return Err(AppError::Conflict(format!(
                    "Idempotency key {key} was already used for a different action"
                )));
            }
            Replay::Fresh => {}
        }
    }

    let dispatcher = Dispatcher::new(state.clock.as_ref(), &ws.templates);
    let receipt = apply(&mut ws.lists, &dispatcher)?;
    let response = serde_json::to_value(&receipt).map_err(anyhow::Error::from)?;

    if let Some(key) = key {
        ws.ledger.record(key, action_path, response.clone());
    }
    Ok(Json(response))
}

fn parse_status<S: StatusKind>(list: ActiveList, raw: &str) -> Result<S, ActionError> {
    S::parse(raw).ok_or_else(|| ActionError::InvalidStatus {
        list: list.as_str(),
        value: raw.to_string(),
    })
}

/// POST /api/v1/lists/:list/:id/template
pub async fn handle_assign_template(
    State(state): State<AppState>,
    Path((list, id)): Path<(ActiveList, RecordId)>,
    headers: HeaderMap,
    Json(req): Json<AssignTemplateRequest>,
) -> Result<Json<Value>, AppError> {
    let path = format!("{}/{id}/template/{}", list.as_str(), req.template_id);
    apply_action(&state, &headers, &path, |lists, d| {
        let outcome = match list {
            ActiveList::Prospects => {
                to_value(d.assign_template(&mut lists.prospects, id, req.template_id)?)
            }
            ActiveList::Outbounds => {
                to_value(d.assign_template(&mut lists.outbounds, id, req.template_id)?)
            }
        }?;
        ActionReceipt::from_outcome(list.kind(), id, "assign_template", outcome)
    })
    .await
}

/// POST /api/v1/lists/:list/:id/status
pub async fn handle_advance_status(
    State(state): State<AppState>,
    Path((list, id)): Path<(ActiveList, RecordId)>,
    headers: HeaderMap,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Value>, AppError> {
    let path = format!("{}/{id}/status/{}", list.as_str(), req.status.trim());
    apply_action(&state, &headers, &path, |lists, d| {
        let outcome = match list {
            ActiveList::Prospects => {
                let next = parse_status::<ProspectStatus>(list, &req.status)?;
                to_value(d.advance_status(&mut lists.prospects, id, next)?)
            }
            ActiveList::Outbounds => {
                let next = parse_status::<OutboundStatus>(list, &req.status)?;
                to_value(d.advance_status(&mut lists.outbounds, id, next)?)
            }
        }?;
        ActionReceipt::from_outcome(list.kind(), id, "advance_status", outcome)
    })
    .await
}

/// DELETE /api/v1/lists/:list/:id/status
pub async fn handle_revert_status(
    State(state): State<AppState>,
    Path((list, id)): Path<(ActiveList, RecordId)>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let path = format!("{}/{id}/revert", list.as_str());
    apply_action(&state, &headers, &path, |lists, d| {
        let outcome = match list {
            ActiveList::Prospects => to_value(d.revert_status(&mut lists.prospects, id)?),
            ActiveList::Outbounds => to_value(d.revert_status(&mut lists.outbounds, id)?),
        }?;
        ActionReceipt::from_outcome(list.kind(), id, "revert_status", outcome)
    })
    .await
}

/// POST /api/v1/lists/:list/:id/discard
pub async fn handle_discard(
    State(state): State<AppState>,
    Path((list, id)): Path<(ActiveList, RecordId)>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let path = format!("{}/{id}/discard", list.as_str());
    let mut name = None;
    let response = apply_action(&state, &headers, &path, |lists, d| {
        let outcome = match list {
            ActiveList::Prospects => d.discard(&mut lists.prospects, &mut lists.discarded, id)?,
            ActiveList::Outbounds => d.discard(&mut lists.outbounds, &mut lists.discarded, id)?,
        };
        if let ActionOutcome::Applied(moved) = &outcome {
            name = Some(moved.contact.name.clone());
        }
        ActionReceipt::from_outcome(list.kind(), id, "discard", outcome)
    })
    .await?;

    if let Some(name) = name {
        state.relay.success(format!("{name} moved to Discarded"));
    }
    Ok(response)
}

/// POST /api/v1/lists/:list/:id/promote
///
/// Prospects only: moves the record into the outbound list.
pub async fn handle_promote(
    State(state): State<AppState>,
    Path((list, id)): Path<(ActiveList, RecordId)>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    if list != ActiveList::Prospects {
        return Err(AppError::Validation(
            "Only prospects can be promoted to outbounds".to_string(),
        ));
    }
    let path = format!("{}/{id}/promote", list.as_str());
    let mut name = None;
    let response = apply_action(&state, &headers, &path, |lists, d| {
        let outcome = d.promote(&mut lists.prospects, &mut lists.outbounds, id)?;
        if let ActionOutcome::Applied(moved) = &outcome {
            name = Some(moved.contact.name.clone());
        }
        ActionReceipt::from_outcome(list.kind(), id, "promote", outcome)
    })
    .await?;

    if let Some(name) = name {
        state.relay.success(format!("{name} added to Outbounds"));
    }
    Ok(response)
}

/// POST /api/v1/lists/:list/:id/copy-template
///
/// Renders the record's template for its first name and writes it to the
/// clipboard. Clipboard failures are reported through the relay and leave
/// every record untouched.
pub async fn handle_copy_template(
    State(state): State<AppState>,
    Path((list, id)): Path<(ActiveList, RecordId)>,
) -> Result<Json<CopyTemplateResponse>, AppError> {
    let outcome = {
        let ws = state.workspace.read().await;
        let d = Dispatcher::new(state.clock.as_ref(), &ws.templates);
        match list {
            ActiveList::Prospects => d.template_text(&ws.lists.prospects, id)?,
            ActiveList::Outbounds => d.template_text(&ws.lists.outbounds, id)?,
        }
    };

    let ActionOutcome::Applied(text) = outcome else {
        return Ok(Json(CopyTemplateResponse {
            record_id: id,
            copied: false,
            text: None,
        }));
    };

    let liveness = Liveness::new();
    let clipboard = state.clipboard.clone();
    let result = run_outbound(
        "Copy template",
        state.config.action_timeout,
        &liveness,
        async { clipboard.write_text(&text).await },
    )
    .await;
    report(&state.relay, &result, "Template copied to clipboard");
    result?;

    Ok(Json(CopyTemplateResponse {
        record_id: id,
        copied: true,
        text: Some(text),
    }))
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(State(state): State<AppState>) -> Json<DashboardSummary> {
    Json(state.workspace.read().await.summary())
}

fn to_value<T: Serialize>(outcome: ActionOutcome<T>) -> Result<ActionOutcome<Value>, AppError> {
    Ok(match outcome {
        ActionOutcome::Applied(record) => {
            ActionOutcome::Applied(serde_json::to_value(record).map_err(anyhow::Error::from)?)
        }
        ActionOutcome::NotFound => ActionOutcome::NotFound,
    })
}
