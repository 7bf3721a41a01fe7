use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::auth::timestamp;
use super::{created, data, Data};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::{AppState, Review};

fn sites() -> Value {
    json!([
        {
            "id": 1,
            "name": "Gyeongbokgung Palace",
            "imageKey": "public/site/gyeongbokgung.jpg",
            "address": "161 Sajik-ro, Jongno-gu, Seoul",
            "description": "Main royal palace of the Joseon dynasty."
        },
        {
            "id": 2,
            "name": "N Seoul Tower",
            "imageKey": "public/site/n-seoul-tower.jpg",
            "address": "105 Namsangongwon-gil, Yongsan-gu, Seoul",
            "description": null
        }
    ])
}

pub async fn all(_user: CurrentUser) -> Json<Data<Value>> {
    data(sites())
}

pub async fn visit_history(State(state): State<AppState>, user: CurrentUser) -> Json<Data<Value>> {
    let db = state.db.read().await;
    let catalogue = sites();
    let visits: Vec<Value> = db
        .visits
        .iter()
        .filter(|v| v.user_id == user.user_id)
        .map(|v| {
            let site = catalogue
                .as_array()
                .and_then(|all| all.iter().find(|s| s["id"].to_string() == v.site_id))
                .cloned();
            json!({
                "id": v.id,
                "userId": v.user_id,
                "siteId": v.site_id,
                "createdAt": v.created_at,
                "review": v.review,
                "site": site,
            })
        })
        .collect();
    data(Value::Array(visits))
}

#[derive(Deserialize)]
pub struct ReviewBody {
    pub content: String,
}

pub async fn review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(visit_id): Path<String>,
    body: Result<Json<ReviewBody>, JsonRejection>,
) -> Result<Json<Data<Value>>, AppError> {
    let Json(body) = body?;
    let mut db = state.db.write().await;
    let visit = db
        .visits
        .iter_mut()
        .find(|v| v.id == visit_id && v.user_id == user.user_id)
        .ok_or_else(|| AppError::bad_request("VISIT_NOT_FOUND"))?;
    visit.review = Some(Review {
        id: Uuid::new_v4().to_string(),
        content: body.content,
        created_at: timestamp(),
    });
    Ok(data(json!({ "result": true })))
}

pub async fn notifications(user: CurrentUser) -> Json<Data<Value>> {
    data(json!([
        {
            "id": "n-1",
            "userId": user.user_id,
            "type": "APPROVAL",
            "title": "Identity approved",
            "content": "Your IDBlock identity has been approved.",
            "displayType": "PUSH",
            "displayTime": "2024-05-01T09:05:00.000Z",
            "createdAt": "2024-05-01T09:05:00.000Z"
        }
    ]))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FcmToken {
    pub fcm_token: String,
}

pub async fn fcm(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<FcmToken>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Value>>), AppError> {
    let Json(body) = body?;
    state.db.write().await.fcm_tokens.insert(user.user_id, body.fcm_token);
    Ok(created(json!({ "result": true })))
}
