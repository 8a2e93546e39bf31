// src/pipeline/client.rs
//
// Cliente HTTP da API administrativa, usado pelo quadro de oportunidades.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    common::response::DeletedRecord,
    models::{
        auth::SessionInfo,
        opportunity::{CreateOpportunityPayload, OpportunityView, Stage, UpdateOpportunityPayload},
    },
    pipeline::controller::OpportunityApi,
};

#[derive(Debug, Error)]
pub enum ClientError {
    // Resposta de erro do servidor, já com o código do envelope
    #[error("{code} ({status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Falha de comunicação com a API: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            ClientError::Transport(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl AdminClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/admin{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        decode_envelope(status, &bytes)
    }

    pub async fn me(&self) -> Result<SessionInfo, ClientError> {
        self.send(self.http.get(self.url("/me"))).await
    }

    pub async fn list(&self, limit: Option<i64>, offset: i64) -> Result<Vec<OpportunityView>, ClientError> {
        let mut request = self.http.get(self.url("/opportunities"));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        if offset > 0 {
            request = request.query(&[("offset", offset)]);
        }
        self.send(request).await
    }

    pub async fn get(&self, id: Uuid) -> Result<OpportunityView, ClientError> {
        self.send(self.http.get(self.url(&format!("/opportunities/{id}"))))
            .await
    }

    pub async fn create(
        &self,
        payload: &CreateOpportunityPayload,
    ) -> Result<OpportunityView, ClientError> {
        self.send(self.http.post(self.url("/opportunities")).json(payload))
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: &UpdateOpportunityPayload,
    ) -> Result<OpportunityView, ClientError> {
        self.send(
            self.http
                .put(self.url(&format!("/opportunities/{id}")))
                .json(patch),
        )
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<DeletedRecord, ClientError> {
        self.send(self.http.delete(self.url(&format!("/opportunities/{id}"))))
            .await
    }
}

#[async_trait]
impl OpportunityApi for AdminClient {
    async fn list_opportunities(&self, limit: i64, offset: i64) -> Result<Vec<OpportunityView>, ClientError> {
        self.list(Some(limit), offset).await
    }

    async fn update_stage(&self, id: Uuid, stage: Stage) -> Result<OpportunityView, ClientError> {
        self.update(id, &UpdateOpportunityPayload::stage_only(stage)).await
    }
}

/// Lê o envelope `{success, data}` / `{success:false, error:{code,message}}`.
/// Corpo fora do formato vira erro com o status HTTP.
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ClientError> {
    let fallback = |message: String| ClientError::Api {
        status: status.as_u16(),
        code: "HTTP_ERROR".to_string(),
        message,
    };

    let envelope: Envelope<Value> = serde_json::from_slice(body)
        .map_err(|_| fallback(String::from_utf8_lossy(body).into_owned()))?;

    if let Some(error) = envelope.error {
        return Err(ClientError::Api {
            status: status.as_u16(),
            code: error.code,
            message: error.message,
        });
    }

    match envelope.data {
        Some(data) if envelope.success && status.is_success() => serde_json::from_value(data)
            .map_err(|e| fallback(format!("Resposta em formato inesperado: {e}"))),
        _ => Err(fallback(format!("Resposta sem dados (HTTP {status})"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_success_envelope() {
        let body = br#"{"success": true, "data": {"id": "6f1c2a4e-8b0e-4b53-9a8e-3a5f7d2c1b90", "message": "ok"}}"#;
        let record: DeletedRecord = decode_envelope(StatusCode::OK, body).unwrap();
        assert_eq!(record.message, "ok");
    }

    #[test]
    fn decodes_error_envelope_into_api_error() {
        let body = r#"{"success": false, "error": {"code": "FORBIDDEN", "message": "Sem permiss\u00e3o"}}"#.as_bytes();
        let err = decode_envelope::<DeletedRecord>(StatusCode::FORBIDDEN, body).unwrap_err();
        match err {
            ClientError::Api { status, code, message } => {
                assert_eq!(status, 403);
                assert_eq!(code, "FORBIDDEN");
                assert_eq!(message, "Sem permissão");
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn non_json_body_keeps_http_status() {
        let err = decode_envelope::<DeletedRecord>(StatusCode::BAD_GATEWAY, b"upstream down").unwrap_err();
        assert_eq!(err.code(), Some("HTTP_ERROR"));
        assert!(matches!(err, ClientError::Api { status: 502, .. }));
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let client = AdminClient::new("http://localhost:3000/", "token");
        assert_eq!(client.url("/me"), "http://localhost:3000/api/admin/me");
    }
}
