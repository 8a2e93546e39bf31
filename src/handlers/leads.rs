// src/handlers/leads.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::{error::ApiError, extract::ApiJson},
    config::AppState,
    models::lead::{LeadPayload, LeadReceipt},
};

// POST /api/leads
// Público. O limite por IP é aplicado pelo rate_limit_guard no router.
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = LeadPayload,
    responses(
        (status = 200, description = "Lead registrado", body = LeadReceipt),
        (status = 400, description = "Contato incompleto"),
        (status = 429, description = "Muitos envios do mesmo IP")
    )
)]
pub async fn submit_lead(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<LeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.lead_service.capture(payload).await?;
    Ok((StatusCode::OK, Json(LeadReceipt { success: true })))
}
