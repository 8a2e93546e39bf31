// src/handlers/customers.rs

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
    models::{
        customer::{CreateCustomerPayload, Customer, UpdateCustomerPayload},
        opportunity::ListParams,
    },
};

#[utoipa::path(
    get,
    path = "/api/admin/customers",
    tag = "Customers",
    params(ListParams),
    responses(
        (status = 200, description = "Clientes ativos", body = Vec<Customer>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    _guard: RequireRole<ViewerAccess>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let customers = app_state.customer_service.list(params.limit).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(customers))))
}

#[utoipa::path(
    get,
    path = "/api/admin/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Customer),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    _guard: RequireRole<ViewerAccess>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = app_state.customer_service.get(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(customer))))
}

#[utoipa::path(
    post,
    path = "/api/admin/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Customer),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<EditorAccess>,
    ApiJson(payload): ApiJson<CreateCustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = app_state.customer_service.create(&session, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(customer))))
}

#[utoipa::path(
    put,
    path = "/api/admin/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = UpdateCustomerPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<EditorAccess>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateCustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = app_state.customer_service.update(&session, id, payload).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(customer))))
}

#[utoipa::path(
    delete,
    path = "/api/admin/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente excluído (soft delete)", body = DeletedRecord),
        (status = 404, description = "Não encontrado ou já excluído")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<EditorAccess>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = app_state.customer_service.soft_delete(&session, id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(deleted))))
}
