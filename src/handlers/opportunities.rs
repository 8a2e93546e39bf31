// src/handlers/opportunities.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;

use crate::{
    common::{
        error::ApiError,
        extract::{ApiJson, ApiPath, ApiQuery},
        response::{ApiResponse, DeletedRecord},
    },
    config::AppState,
    middleware::rbac::{EditorAccess, RequireRole, ViewerAccess},
    models::opportunity::{
        CreateOpportunityPayload, OpportunityView, PageParams, UpdateOpportunityPayload,
    },
};

// GET /api/admin/opportunities
#[utoipa::path(
    get,
    path = "/api/admin/opportunities",
    tag = "Opportunities",
    params(PageParams),
    responses(
        (status = 200, description = "Oportunidades ativas, mais recentes primeiro", body = Vec<OpportunityView>),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_opportunities(
    State(app_state): State<AppState>,
    _guard: RequireRole<ViewerAccess>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .opportunity_service
        .list(params.limit, params.offset)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(items))))
}

// GET /api/admin/opportunities/{id}
#[utoipa::path(
    get,
    path = "/api/admin/opportunities/{id}",
    tag = "Opportunities",
    params(("id" = Uuid, Path, description = "ID da oportunidade")),
    responses(
        (status = 200, description = "Oportunidade", body = OpportunityView),
        (status = 404, description = "Não encontrada ou excluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_opportunity(
    State(app_state): State<AppState>,
    _guard: RequireRole<ViewerAccess>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state.opportunity_service.get(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(item))))
}

// POST /api/admin/opportunities
#[utoipa::path(
    post,
    path = "/api/admin/opportunities",
    tag = "Opportunities",
    request_body = CreateOpportunityPayload,
    responses(
        (status = 201, description = "Oportunidade criada", body = OpportunityView),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Requer papel de editor")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_opportunity(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<EditorAccess>,
    ApiJson(payload): ApiJson<CreateOpportunityPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state.opportunity_service.create(&session, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(item))))
}

// PUT /api/admin/opportunities/{id}
#[utoipa::path(
    put,
    path = "/api/admin/opportunities/{id}",
    tag = "Opportunities",
    params(("id" = Uuid, Path, description = "ID da oportunidade")),
    request_body = UpdateOpportunityPayload,
    responses(
        (status = 200, description = "Oportunidade atualizada", body = OpportunityView),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Requer papel de editor"),
        (status = 404, description = "Não encontrada ou excluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_opportunity(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<EditorAccess>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateOpportunityPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state.opportunity_service.update(&session, id, payload).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(item))))
}

// DELETE /api/admin/opportunities/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/opportunities/{id}",
    tag = "Opportunities",
    params(("id" = Uuid, Path, description = "ID da oportunidade")),
    responses(
        (status = 200, description = "Oportunidade excluída (soft delete)", body = DeletedRecord),
        (status = 403, description = "Requer papel de editor"),
        (status = 404, description = "Não encontrada ou já excluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_opportunity(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<EditorAccess>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = app_state.opportunity_service.soft_delete(&session, id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(deleted))))
}
