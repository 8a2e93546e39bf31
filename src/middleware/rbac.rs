// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    models::auth::{Role, Session},
};

/// 1. O Trait que define o papel mínimo de uma rota
pub trait RoleRequirement: Send + Sync + 'static {
    fn minimum() -> Role;
}

/// 2. O Extractor (Guardião). Entrega a sessão ao handler.
pub struct RequireRole<T>(pub Session, pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleRequirement,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Sessão montada pelo auth_guard (ausente = não autenticado)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        // B. Compara o nível do papel
        session.authorize(T::minimum())?;

        Ok(RequireRole(session, PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS NÍVEIS (TIPOS)
// ---

pub struct ViewerAccess;
impl RoleRequirement for ViewerAccess {
    fn minimum() -> Role {
        Role::Viewer
    }
}

pub struct EditorAccess;
impl RoleRequirement for EditorAccess {
    fn minimum() -> Role {
        Role::Editor
    }
}

pub struct AdminAccess;
impl RoleRequirement for AdminAccess {
    fn minimum() -> Role {
        Role::Admin
    }
}
