pub mod admin;
pub mod auth;
pub mod common;
pub mod site;

use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Success wrapper used by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

pub fn data<T: Serialize>(value: T) -> Json<Data<T>> {
    Json(Data { data: value })
}

/// POST handlers answer 201, like the real backend.
pub fn created<T: Serialize>(value: T) -> (StatusCode, Json<Data<T>>) {
    (StatusCode::CREATED, data(value))
}

/// Routes relative to `/api/v1`.
pub fn api() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", delete(auth::logout))
        .route("/auth/profile", get(auth::profile))
        .route("/auth/information", put(auth::information))
        .route("/auth/qr-code", get(auth::qr_code))
        .route("/auth/country", get(auth::country))
        .route("/auth/city", get(auth::city))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-up/verify-step1", post(auth::verify_passport))
        .route("/auth/verify-email/request", post(auth::verify_email_request))
        .route("/auth/verify-email/confirm", post(auth::verify_email_confirm))
        .route("/auth/reset-password/request", post(auth::reset_request))
        .route("/auth/reset-password/confirm", post(auth::reset_confirm))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/upload/profile-image", post(auth::upload_profile_image))
        .route("/auth/upload/passport-image", post(auth::upload_passport_image))
        .route("/auth/upload/passport-recognition", post(auth::passport_recognition))
        .route("/auth/delete-user", post(auth::delete_user))
        .route("/common/country", get(common::countries))
        .route("/common/city", get(common::cities))
        .route("/common/html/{term}", get(common::html))
        .route("/site/all", get(site::all))
        .route("/site/visit-history", get(site::visit_history))
        .route("/site/review/{visit_id}", put(site::review))
        .route("/notification", get(site::notifications))
        .route("/notification/fcm", post(site::fcm))
        .route("/admin-auth/login", post(admin::login))
        .route("/admin-auth/protected", get(admin::protected))
        .route("/admin-auth/logout", delete(admin::logout))
        .route("/user", get(admin::users))
        .route("/user/approve", post(admin::approve))
        .route("/user/reject", patch(admin::reject))
        .route("/user/{document_id}", get(admin::user_detail).delete(admin::remove_user))
}
