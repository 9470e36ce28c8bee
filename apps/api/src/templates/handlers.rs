use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::{Json, Path};
use crate::models::template::{Template, TemplateId};
use crate::state::AppState;

#[derive(Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<Template>,
    pub allowed_ids: Vec<TemplateId>,
    pub body_max: usize,
}

#[derive(Deserialize)]
pub struct SaveTemplateRequest {
    #[serde(default)]
    pub descriptor: String,
    #[serde(default)]
    pub body: String,
}

/// GET /api/v1/templates
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<TemplateListResponse> {
    let ws = state.workspace.read().await;
    Json(TemplateListResponse {
        templates: ws.templates.list().into_iter().cloned().collect(),
        allowed_ids: ws.templates.allowed_ids().to_vec(),
        body_max: ws.templates.body_max(),
    })
}

/// PUT /api/v1/templates/:id
///
/// Creates or replaces the template for one letter. Every invalid field is
/// reported at once; nothing is stored unless all pass.
pub async fn handle_save_template(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<SaveTemplateRequest>,
) -> Result<Json<Template>, AppError> {
    let id = raw_id
        .parse::<TemplateId>()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let saved = {
        let mut ws = state.workspace.write().await;
        ws.templates
            .save(Template {
                id,
                descriptor: req.descriptor,
                body: req.body,
            })
            .map_err(AppError::InvalidFields)?
            .clone()
    };

    state.relay.success(format!("Template {id} saved"));
    Ok(Json(saved))
}
