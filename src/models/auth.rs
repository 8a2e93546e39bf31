// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::error::AppError;

// Papéis do console administrativo. A ordem numérica define a hierarquia:
// Admin(3) > Editor(2) > Viewer(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

impl Role {
    pub fn rank(self) -> u8 {
        match self {
            Role::Viewer => 1,
            Role::Editor => 2,
            Role::Admin => 3,
        }
    }

    /// `true` quando este papel alcança (ou supera) o mínimo exigido.
    pub fn satisfies(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }
}

// Registro da coleção `users`: vincula o uid do provedor de identidade a um papel.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[schema(example = "kR2x9ZfQ1uN3")]
    pub uid: String,
    #[schema(example = "vendas@loja.com")]
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Contexto da requisição autenticada. Montado pelo `auth_guard` a cada
// requisição; nada de estado global de "usuário atual".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    pub fn can_edit(&self) -> bool {
        self.role.satisfies(Role::Editor)
    }

    pub fn authorize(&self, required: Role) -> Result<(), AppError> {
        if self.role.satisfies(required) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Esta ação exige o papel '{}' ou superior.",
                required.as_str()
            )))
        }
    }
}

// Resposta do GET /api/admin/me
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(flatten)]
    pub session: Session,
    pub can_edit: bool,
}

impl From<Session> for SessionInfo {
    fn from(session: Session) -> Self {
        let can_edit = session.can_edit();
        Self { session, can_edit }
    }
}

// Payload para atribuir papel a um usuário (somente Admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolePayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "vendas@loja.com")]
    pub email: String,
    pub role: Role,
}

// Claims do token emitido pelo provedor de identidade
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // uid do usuário no provedor
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
}
