// src/services/auth.rs

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{AssignRolePayload, Claims, Session, UserRecord},
};

// A identidade é do provedor externo: aqui só verificamos o token
// e buscamos o papel na coleção `users`.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt_secret: &str) -> Self {
        Self {
            users,
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token rejeitado: {}", e);
                AppError::InvalidToken
            })?;

        Ok(token_data.claims)
    }

    /// Token válido → sessão com o papel atual do usuário.
    /// Token inválido é 401; usuário sem registro em `users` é 403.
    pub async fn resolve_session(&self, token: &str) -> Result<Session, AppError> {
        let claims = self.verify_token(token)?;

        let user = self.users.find_by_uid(&claims.sub).await?.ok_or_else(|| {
            AppError::Forbidden("Usuário sem acesso ao painel administrativo.".to_string())
        })?;

        Ok(Session {
            uid: user.uid,
            email: user.email,
            role: user.role,
        })
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, AppError> {
        self.users.list().await
    }

    pub async fn assign_role(
        &self,
        actor: &Session,
        uid: &str,
        payload: AssignRolePayload,
    ) -> Result<UserRecord, AppError> {
        let record = self
            .users
            .upsert(uid, &payload.email, payload.role, Utc::now())
            .await?;

        tracing::info!(
            "👤 Papel de {} definido como '{}' por {}",
            record.uid,
            record.role.as_str(),
            actor.uid
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::MemoryStore, models::auth::Role};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "segredo-de-teste";

    fn token_for(uid: &str, secret: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub: uid.to_string(),
            email: Some(format!("{uid}@loja.com")),
            exp: (Utc::now().timestamp() + exp_offset) as usize,
            iat: Some(Utc::now().timestamp() as usize),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    async fn service_with(uid: &str, role: Role) -> AuthService {
        let store = Arc::new(MemoryStore::new());
        store.upsert(uid, "x@loja.com", role, Utc::now()).await.unwrap();
        AuthService::new(store, SECRET)
    }

    #[tokio::test]
    async fn valid_token_resolves_session_role() {
        let service = service_with("u-editor", Role::Editor).await;
        let session = service
            .resolve_session(&token_for("u-editor", SECRET, 3600))
            .await
            .unwrap();
        assert_eq!(session.uid, "u-editor");
        assert_eq!(session.role, Role::Editor);
    }

    #[tokio::test]
    async fn bad_signature_or_expired_token_is_unauthorized() {
        let service = service_with("u1", Role::Admin).await;

        let forged = service.resolve_session(&token_for("u1", "outro-segredo", 3600)).await;
        assert!(matches!(forged, Err(AppError::InvalidToken)));

        let expired = service.resolve_session(&token_for("u1", SECRET, -3600)).await;
        assert!(matches!(expired, Err(AppError::InvalidToken)));

        let garbage = service.resolve_session("nao.e.jwt").await;
        assert!(matches!(garbage, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn unknown_user_is_forbidden_not_unauthorized() {
        let service = service_with("u1", Role::Admin).await;
        let result = service.resolve_session(&token_for("desconhecido", SECRET, 3600)).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
