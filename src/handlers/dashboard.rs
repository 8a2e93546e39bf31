// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::{error::ApiError, response::ApiResponse},
    config::AppState,
    middleware::rbac::{RequireRole, ViewerAccess},
    models::dashboard::DashboardSummary,
};

// GET /api/admin/dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Contagem por etapa, valor em aberto e lembretes", body = DashboardSummary),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    _guard: RequireRole<ViewerAccess>,
) -> Result<impl IntoResponse, ApiError> {
    // Lembretes usam a data local do servidor
    let today = chrono::Local::now().date_naive();

    let summary = app_state.dashboard_service.get_summary(today).await?;

    Ok((StatusCode::OK, Json(ApiResponse::ok(summary))))
}
