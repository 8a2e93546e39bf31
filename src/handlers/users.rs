// src/handlers/users.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::{
        error::ApiError,
        extract::{ApiJson, ApiPath},
        response::ApiResponse,
    },
    config::AppState,
    middleware::rbac::{AdminAccess, RequireRole},
    models::auth::{AssignRolePayload, Session, SessionInfo, UserRecord},
};

// GET /api/admin/me
#[utoipa::path(
    get,
    path = "/api/admin/me",
    tag = "Users",
    responses(
        (status = 200, description = "Sessão atual", body = SessionInfo),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Usuário sem papel atribuído")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(session: Session) -> Result<impl IntoResponse, ApiError> {
    // Todo usuário com registro tem ao menos Viewer
    Ok((StatusCode::OK, Json(ApiResponse::ok(SessionInfo::from(session)))))
}

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Users",
    responses(
        (status = 200, description = "Usuários do painel", body = Vec<UserRecord>),
        (status = 403, description = "Requer papel de administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminAccess>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state.auth_service.list_users().await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(users))))
}

// PUT /api/admin/users/{uid}
#[utoipa::path(
    put,
    path = "/api/admin/users/{uid}",
    tag = "Users",
    params(("uid" = String, Path, description = "UID do provedor de identidade")),
    request_body = AssignRolePayload,
    responses(
        (status = 200, description = "Papel atribuído", body = UserRecord),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Requer papel de administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_role(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminAccess>,
    ApiPath(uid): ApiPath<String>,
    ApiJson(payload): ApiJson<AssignRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let record = app_state.auth_service.assign_role(&session, &uid, payload).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(record))))
}
