// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::{auth::auth_guard, rate_limit::rate_limit_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Vitrine pública (sem autenticação)
    let storefront_routes = Router::new()
        .route("/", get(handlers::vehicles::search_vehicles))
        .route("/{id}", get(handlers::vehicles::get_public_vehicle));

    // Formulário de contato: público, mas limitado por IP
    let lead_routes = Router::new()
        .route("/api/leads", post(handlers::leads::submit_lead))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            rate_limit_guard,
        ));

    // Painel administrativo: Bearer obrigatório, papel checado por rota
    let admin_routes = Router::new()
        .route("/me", get(handlers::users::get_me))
        .route("/dashboard", get(handlers::dashboard::get_summary))
        .route("/opportunities"
               ,get(handlers::opportunities::list_opportunities)
               .post(handlers::opportunities::create_opportunity)
        )
        .route("/opportunities/{id}"
               ,get(handlers::opportunities::get_opportunity)
               .put(handlers::opportunities::update_opportunity)
               .delete(handlers::opportunities::delete_opportunity)
        )
        .route("/customers"
               ,get(handlers::customers::list_customers)
               .post(handlers::customers::create_customer)
        )
        .route("/customers/{id}"
               ,get(handlers::customers::get_customer)
               .put(handlers::customers::update_customer)
               .delete(handlers::customers::delete_customer)
        )
        .route("/vehicles"
               ,get(handlers::vehicles::list_vehicles)
               .post(handlers::vehicles::create_vehicle)
        )
        .route("/vehicles/parse-listing", post(handlers::vehicles::parse_listing))
        .route("/vehicles/{id}"
               ,get(handlers::vehicles::get_vehicle)
               .put(handlers::vehicles::update_vehicle)
               .delete(handlers::vehicles::delete_vehicle)
        )
        .route("/users", get(handlers::users::list_users))
        .route("/users/{uid}", put(handlers::users::assign_role))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/vehicles", storefront_routes)
        .nest("/api/admin", admin_routes)
        .merge(lead_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
