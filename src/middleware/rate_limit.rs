// src/middleware/rate_limit.rs
//
// Limite de envios por IP para o formulário público de leads.
// Janelas fixas de um minuto, contadas em memória por processo.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
};

const WINDOW: Duration = Duration::from_secs(60);
// Acima disso a tabela é varrida para descartar janelas vencidas
const PRUNE_THRESHOLD: usize = 1024;
/// Teto rígido de origens acompanhadas ao mesmo tempo.
pub const MAX_TRACKED_KEYS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_per_window: u32,
    window: Duration,
    max_tracked: usize,
    hits: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn per_minute(max_per_window: u32) -> Self {
        Self {
            max_per_window,
            window: WINDOW,
            max_tracked: MAX_TRACKED_KEYS,
            hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_max_tracked(mut self, max_tracked: usize) -> Self {
        self.max_tracked = max_tracked;
        self
    }

    /// Registra uma tentativa; `false` quando a chave já esgotou a janela atual
    /// ou quando a tabela está cheia de janelas ainda válidas.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        // Um lock envenenado só significa que outra thread panicou no meio da contagem
        let mut hits = match self.hits.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let window = self.window;
        if hits.len() > PRUNE_THRESHOLD {
            hits.retain(|_, w| now.saturating_duration_since(w.started) < window);
        }

        if !hits.contains_key(key) && hits.len() >= self.max_tracked {
            hits.retain(|_, w| now.saturating_duration_since(w.started) < window);
            if hits.len() >= self.max_tracked {
                return false;
            }
        }

        let entry = hits.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_per_window {
            return false;
        }
        entry.count += 1;
        true
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.hits.lock().map(|h| h.len()).unwrap_or(0)
    }
}

/// IP do cliente. Com `TRUST_PROXY` ligado: primeiro salto do X-Forwarded-For,
/// depois X-Real-IP. Sem ele (ou sem cabeçalhos), o endereço da conexão.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn resolve(parts: &Parts, trust_proxy: bool) -> Self {
        if trust_proxy {
            let header = |name: &str| {
                parts
                    .headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
            };

            if let Some(forwarded) = header("x-forwarded-for") {
                if let Some(first) = forwarded.split(',').map(str::trim).find(|v| !v.is_empty()) {
                    return ClientIp(first.to_string());
                }
            }
            if let Some(real_ip) = header("x-real-ip") {
                return ClientIp(real_ip.to_string());
            }
        }

        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        ClientIp(ip)
    }
}

pub async fn rate_limit_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let ClientIp(ip) = ClientIp::resolve(&parts, app_state.config.trust_proxy);

    if !app_state.lead_limiter.check(&ip) {
        tracing::warn!("🚦 Limite de leads excedido para {}", ip);
        return Err(AppError::RateLimited.into());
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}
