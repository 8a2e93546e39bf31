// src/handlers/vehicles.rs

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
    models::vehicle::{
        CreateVehiclePayload, ParseListingPayload, UpdateVehiclePayload, Vehicle, VehicleDraft,
        VehicleFilter,
    },
};

// =============================================================================
//  VITRINE PÚBLICA
// =============================================================================

// GET /api/vehicles
#[utoipa::path(
    get,
    path = "/api/vehicles",
    tag = "Storefront",
    params(VehicleFilter),
    responses(
        (status = 200, description = "Veículos ativos, destaques primeiro", body = Vec<Vehicle>),
        (status = 400, description = "Filtro inválido")
    )
)]
pub async fn search_vehicles(
    State(app_state): State<AppState>,
    ApiQuery(filter): ApiQuery<VehicleFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicles = app_state.vehicle_service.search(&filter).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(vehicles))))
}

// GET /api/vehicles/{id}
#[utoipa::path(
    get,
    path = "/api/vehicles/{id}",
    tag = "Storefront",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 200, description = "Veículo", body = Vehicle),
        (status = 404, description = "Não encontrado")
    )
)]
pub async fn get_public_vehicle(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = app_state.vehicle_service.get(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(vehicle))))
}

// =============================================================================
//  ADMIN
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/vehicles",
    tag = "Vehicles",
    params(VehicleFilter),
    responses(
        (status = 200, description = "Veículos ativos", body = Vec<Vehicle>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_vehicles(
    State(app_state): State<AppState>,
    _guard: RequireRole<ViewerAccess>,
    ApiQuery(filter): ApiQuery<VehicleFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicles = app_state.vehicle_service.search(&filter).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(vehicles))))
}

#[utoipa::path(
    get,
    path = "/api/admin/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 200, description = "Veículo", body = Vehicle),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_vehicle(
    State(app_state): State<AppState>,
    _guard: RequireRole<ViewerAccess>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = app_state.vehicle_service.get(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(vehicle))))
}

#[utoipa::path(
    post,
    path = "/api/admin/vehicles",
    tag = "Vehicles",
    request_body = CreateVehiclePayload,
    responses(
        (status = 201, description = "Veículo cadastrado", body = Vehicle),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vehicle(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<EditorAccess>,
    ApiJson(payload): ApiJson<CreateVehiclePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = app_state.vehicle_service.create(&session, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(vehicle))))
}

#[utoipa::path(
    put,
    path = "/api/admin/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    request_body = UpdateVehiclePayload,
    responses(
        (status = 200, description = "Veículo atualizado", body = Vehicle),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_vehicle(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<EditorAccess>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateVehiclePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = app_state.vehicle_service.update(&session, id, payload).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(vehicle))))
}

#[utoipa::path(
    delete,
    path = "/api/admin/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 200, description = "Veículo excluído (soft delete)", body = DeletedRecord),
        (status = 404, description = "Não encontrado ou já excluído")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_vehicle(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<EditorAccess>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = app_state.vehicle_service.soft_delete(&session, id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(deleted))))
}

// POST /api/admin/vehicles/parse-listing
#[utoipa::path(
    post,
    path = "/api/admin/vehicles/parse-listing",
    tag = "Vehicles",
    request_body = ParseListingPayload,
    responses(
        (status = 200, description = "Rascunho extraído do anúncio", body = VehicleDraft),
        (status = 400, description = "Texto vazio ou longo demais"),
        (status = 500, description = "Parser indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn parse_listing(
    State(app_state): State<AppState>,
    _guard: RequireRole<EditorAccess>,
    ApiJson(payload): ApiJson<ParseListingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = app_state.listing_parser.parse(&payload.text).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(draft))))
}
