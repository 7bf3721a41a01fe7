use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::auth::Credentials;
use super::{created, data, Data};
use crate::auth::CurrentAdmin;
use crate::error::AppError;
use crate::state::{Account, AppState, STATUS_APPROVED, STATUS_REJECTED};

type JsonBody<T> = Result<Json<T>, JsonRejection>;

pub async fn login(
    State(state): State<AppState>,
    body: JsonBody<Credentials>,
) -> Result<(StatusCode, Json<Data<Value>>), AppError> {
    let Json(body) = body?;
    let mut db = state.db.write().await;
    if db.admins.get(&body.email) != Some(&body.password) {
        return Err(AppError::bad_request("INVALID_LOGIN_DATA"));
    }
    let (access, refresh) = db.open_session(&body.email, true);
    info!(email = %body.email, "admin signed in");
    Ok(created(json!({ "accessToken": access, "refreshToken": refresh })))
}

pub async fn protected(_admin: CurrentAdmin) -> Json<Data<Value>> {
    data(json!({ "result": true }))
}

pub async fn logout(State(state): State<AppState>, admin: CurrentAdmin) -> Json<Data<Value>> {
    state.db.write().await.sessions.remove(&admin.token);
    data(json!({ "result": true }))
}

#[derive(Deserialize)]
pub struct StatusFilter {
    pub status: Option<i32>,
}

pub async fn users(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    query: Result<Query<StatusFilter>, QueryRejection>,
) -> Result<Json<Data<Vec<Account>>>, AppError> {
    let Query(filter) = query?;
    let db = state.db.read().await;
    let mut users: Vec<Account> = db
        .accounts
        .values()
        .filter(|a| filter.status.map_or(true, |s| a.approval_status == s))
        .cloned()
        .collect();
    users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(data(users))
}

pub async fn user_detail(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(document_id): Path<String>,
) -> Result<Json<Data<Account>>, AppError> {
    let db = state.db.read().await;
    db.accounts
        .values()
        .find(|a| a.document_id == document_id)
        .cloned()
        .map(data)
        .ok_or_else(|| AppError::bad_request("USER_NOT_FOUND"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub document_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn approve(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    body: JsonBody<Decision>,
) -> Result<(StatusCode, Json<Data<Value>>), AppError> {
    let Json(body) = body?;
    let mut db = state.db.write().await;
    let account = db
        .account_by_document_mut(&body.document_id)
        .ok_or_else(|| AppError::bad_request("USER_NOT_FOUND"))?;
    account.approval_status = STATUS_APPROVED;
    account.reject_reason = None;
    Ok(created(json!({ "result": true })))
}

pub async fn reject(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    body: JsonBody<Decision>,
) -> Result<Json<Data<Value>>, AppError> {
    let Json(body) = body?;
    let reason = body
        .reason
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::bad_request("REJECT_REASON_REQUIRED"))?;
    let mut db = state.db.write().await;
    let account = db
        .account_by_document_mut(&body.document_id)
        .ok_or_else(|| AppError::bad_request("USER_NOT_FOUND"))?;
    account.approval_status = STATUS_REJECTED;
    account.reject_reason = Some(reason);
    Ok(data(json!({ "result": true })))
}

pub async fn remove_user(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(document_id): Path<String>,
) -> Result<Json<Data<Value>>, AppError> {
    let mut db = state.db.write().await;
    let email = db
        .accounts
        .values()
        .find(|a| a.document_id == document_id)
        .map(|a| a.email.clone())
        .ok_or_else(|| AppError::bad_request("USER_NOT_FOUND"))?;
    db.accounts.remove(&email);
    Ok(data(json!({ "result": true })))
}
