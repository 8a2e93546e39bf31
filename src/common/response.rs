// src/common/response.rs

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;

// Envelope padrão de sucesso: { "success": true, "data": ... }
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

// Resposta do soft delete: { id, message }
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedRecord {
    pub id: Uuid,
    #[schema(example = "Registro removido com sucesso.")]
    pub message: String,
}

/// Distingue "campo ausente" (None) de "campo enviado como null" (Some(None))
/// em payloads de atualização parcial. Usar junto com `#[serde(default)]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        notes: Option<Option<String>>,
    }

    #[test]
    fn double_option_distinguishes_missing_from_null() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.notes, None);

        let null: Patch = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        assert_eq!(null.notes, Some(None));

        let value: Patch = serde_json::from_str(r#"{"notes": "ligar amanhã"}"#).unwrap();
        assert_eq!(value.notes, Some(Some("ligar amanhã".to_string())));
    }
}
