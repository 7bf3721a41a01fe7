//! Bearer-token extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::{AppState, Session};

/// The signed-in mobile user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: String,
    pub token: String,
}

/// The signed-in admin.
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub token: String,
}

fn bearer(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

async fn session(parts: &Parts, state: &AppState) -> Result<(String, Session), AppError> {
    let token = bearer(parts).ok_or(AppError::Unauthorized)?;
    let session = state
        .db
        .read()
        .await
        .sessions
        .get(&token)
        .cloned()
        .ok_or(AppError::Unauthorized)?;
    Ok((token, session))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let (token, session) = session(parts, state).await?;
        if session.admin {
            return Err(AppError::Forbidden("NOT_A_USER_SESSION".to_string()));
        }
        Ok(CurrentUser {
            user_id: session.user_id,
            token,
        })
    }
}

impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let (token, session) = session(parts, state).await?;
        if !session.admin {
            return Err(AppError::Forbidden("ADMIN_PERMISSION_REQUIRED".to_string()));
        }
        Ok(CurrentAdmin { token })
    }
}
