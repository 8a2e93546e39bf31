// src/config.rs

use std::{env, sync::Arc};

use anyhow::Context;

use crate::{
    db::{self, Repositories},
    middleware::rate_limit::RateLimiter,
    services::{
        auth::AuthService, customer_service::CustomerService, dashboard_service::DashboardService,
        lead_service::LeadService, listing_parser::ListingParser,
        opportunity_service::OpportunityService, vehicle_service::VehicleService,
    },
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LEAD_RATE_LIMIT: u32 = 5;

#[derive(Debug, Clone)]
pub struct ListingParserConfig {
    pub url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Sem DATABASE_URL a aplicação sobe com o armazenamento em memória
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub lead_rate_limit: u32,
    // Só atrás de um proxy confiável os cabeçalhos X-Forwarded-For/X-Real-IP valem
    pub trust_proxy: bool,
    pub listing_parser: Option<ListingParserConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let lead_rate_limit = match env::var("LEAD_RATE_LIMIT") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("LEAD_RATE_LIMIT inválido: {value}"))?,
            Err(_) => DEFAULT_LEAD_RATE_LIMIT,
        };

        let listing_parser = match (env::var("LISTING_PARSER_URL"), env::var("LISTING_PARSER_API_KEY")) {
            (Ok(url), Ok(api_key)) => Some(ListingParserConfig {
                url,
                api_key,
                model: env::var("LISTING_PARSER_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            lead_rate_limit,
            trust_proxy: env::var("TRUST_PROXY")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            listing_parser,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub opportunity_service: OpportunityService,
    pub customer_service: CustomerService,
    pub vehicle_service: VehicleService,
    pub lead_service: LeadService,
    pub dashboard_service: DashboardService,
    pub listing_parser: ListingParser,
    pub lead_limiter: RateLimiter,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let repos = match &config.database_url {
            Some(url) => Repositories::postgres(db::connect_postgres(url).await?),
            None => {
                tracing::warn!("⚠️ DATABASE_URL não definida: usando armazenamento em memória");
                Repositories::in_memory()
            }
        };

        Ok(Self::from_parts(config, repos))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(config: Config, repos: Repositories) -> Self {
        let auth_service = AuthService::new(repos.users.clone(), &config.jwt_secret);
        let opportunity_service = OpportunityService::new(
            repos.opportunities.clone(),
            repos.customers.clone(),
            repos.vehicles.clone(),
        );
        let customer_service = CustomerService::new(repos.customers.clone());
        let vehicle_service = VehicleService::new(repos.vehicles.clone());
        let lead_service = LeadService::new(repos.customers.clone(), repos.opportunities.clone());
        let dashboard_service = DashboardService::new(opportunity_service.clone());
        let listing_parser = ListingParser::new(config.listing_parser.clone());
        let lead_limiter = RateLimiter::per_minute(config.lead_rate_limit);

        Self {
            config: Arc::new(config),
            auth_service,
            opportunity_service,
            customer_service,
            vehicle_service,
            lead_service,
            dashboard_service,
            listing_parser,
            lead_limiter,
        }
    }
}
