use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use super::common::{cities_of, city_by_id, country_by_code3, City, Country, CountryCode};
use super::{created, data, Data};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::{
    Account, AppState, Verification, STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED, VERIFICATION_CODE,
};

type Created = (StatusCode, Json<Data<Value>>);
type JsonBody<T> = Result<Json<T>, JsonRejection>;

pub(crate) fn timestamp() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    millis.to_string()
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub async fn login(State(state): State<AppState>, body: JsonBody<Credentials>) -> Result<Created, AppError> {
    let Json(body) = body?;
    let mut db = state.db.write().await;
    let user_id = match db.account_by_email(&body.email) {
        Some(account) if account.password == body.password => account.id.clone(),
        _ => return Err(AppError::bad_request("INVALID_LOGIN_DATA")),
    };
    let (access, refresh) = db.open_session(&user_id, false);
    info!(%user_id, "user signed in");
    Ok(created(json!({ "accessToken": access, "refreshToken": refresh, "userId": user_id })))
}

pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> Json<Data<Value>> {
    state.db.write().await.sessions.remove(&user.token);
    data(json!({ "result": true }))
}

pub async fn profile(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Data<Value>>, AppError> {
    let mut db = state.db.write().await;
    let account = db
        .account_by_id_mut(&user.user_id)
        .ok_or_else(|| AppError::bad_request("USER_NOT_FOUND"))?;
    let status = match account.approval_status {
        STATUS_APPROVED => "APPROVED",
        STATUS_REJECTED => "REJECTED",
        _ => "PENDING",
    };
    Ok(data(json!({
        "id": account.id,
        "email": account.email,
        "name": account.name,
        "birthday": account.birthday,
        "city": city_by_id(&account.city_id),
        "status": status,
        "profileImage": format!("https://s3.mock/{}", account.profile_image_key),
        "reason": account.reject_reason,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Information {
    pub name: String,
    pub birthday: String,
    pub country_code: String,
    pub city_id: String,
    pub passport_number: String,
    pub passport_image_key: String,
    pub profile_image_key: String,
}

pub async fn information(
    State(state): State<AppState>,
    user: CurrentUser,
    body: JsonBody<Information>,
) -> Result<Json<Data<Value>>, AppError> {
    let Json(body) = body?;
    let mut db = state.db.write().await;
    let account = db
        .account_by_id_mut(&user.user_id)
        .ok_or_else(|| AppError::bad_request("USER_NOT_FOUND"))?;
    account.name = body.name;
    account.birthday = body.birthday;
    account.country_code = body.country_code;
    account.city_id = body.city_id;
    account.passport_number = body.passport_number;
    account.passport_image_key = body.passport_image_key;
    account.profile_image_key = body.profile_image_key;
    account.approval_status = STATUS_PENDING;
    account.reject_reason = None;
    Ok(data(json!({ "result": true })))
}

pub async fn qr_code(user: CurrentUser) -> Json<Data<String>> {
    data(format!("data:image/png;base64,UVI6{}", user.user_id))
}

#[derive(Deserialize)]
pub struct Code3 {
    pub code3: String,
}

pub async fn country(query: Result<Query<Code3>, QueryRejection>) -> Result<Json<Data<Option<Country>>>, AppError> {
    let Query(query) = query?;
    Ok(data(country_by_code3(&query.code3)))
}

pub async fn city(query: Result<Query<CountryCode>, QueryRejection>) -> Result<Json<Data<Option<City>>>, AppError> {
    let Query(query) = query?;
    Ok(data(cities_of(&query.country_code).into_iter().next()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    pub uuid: String,
    pub email: String,
    pub password: String,
    pub password_check: String,
    pub name: String,
    pub birthday: String,
    pub country_code: String,
    pub city_id: String,
    pub passport_number: String,
    pub passport_image_key: String,
    pub profile_image_key: String,
}

pub async fn sign_up(State(state): State<AppState>, body: JsonBody<SignUp>) -> Result<Created, AppError> {
    let Json(body) = body?;
    let mut db = state.db.write().await;
    match db.verifications.get(&body.uuid) {
        Some(v) if v.confirmed && v.email == body.email => {}
        _ => return Err(AppError::bad_request("EMAIL_VERIFICATION_NOT_FOUND")),
    }
    if body.password != body.password_check {
        return Err(AppError::bad_request("PASSWORD_MISMATCH"));
    }
    if db.account_by_email(&body.email).is_some() {
        return Err(AppError::bad_request("ALREADY_USED_EMAIL"));
    }
    if db.passport_in_use(&body.passport_number) {
        return Err(AppError::bad_request("ALREADY_USED_PASSPORT_NUMBER"));
    }

    let id = Uuid::new_v4().to_string();
    let account = Account {
        id: id.clone(),
        document_id: format!("doc-{}", Uuid::new_v4().simple()),
        email: body.email,
        password: body.password,
        name: body.name,
        birthday: body.birthday,
        country_code: body.country_code,
        city_id: body.city_id,
        passport_number: body.passport_number,
        passport_image_key: body.passport_image_key,
        profile_image_key: body.profile_image_key,
        approval_status: STATUS_PENDING,
        reject_reason: None,
        created_at: timestamp(),
    };
    db.verifications.remove(&body.uuid);
    db.accounts.insert(account.email.clone(), account);
    info!(%id, "account created");
    Ok(created(json!({ "id": id })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassportCheck {
    pub birthday: String,
    pub passport_number: String,
}

pub async fn verify_passport(State(state): State<AppState>, body: JsonBody<PassportCheck>) -> Result<Created, AppError> {
    let Json(body) = body?;
    if body.birthday.is_empty() {
        return Err(AppError::bad_request("INVALID_DATE_FORMAT"));
    }
    if state.db.read().await.passport_in_use(&body.passport_number) {
        return Err(AppError::bad_request("ALREADY_USED_PASSPORT_NUMBER"));
    }
    Ok(created(json!({ "passportNumber": body.passport_number })))
}

#[derive(Deserialize)]
pub struct Email {
    pub email: String,
}

fn open_verification(db: &mut crate::state::Db, email: &str) -> Value {
    let uuid = Uuid::new_v4().to_string();
    db.verifications.insert(
        uuid.clone(),
        Verification {
            email: email.to_string(),
            confirmed: false,
        },
    );
    json!({ "email": email, "uuid": uuid, "createdAt": timestamp() })
}

pub async fn verify_email_request(State(state): State<AppState>, body: JsonBody<Email>) -> Result<Created, AppError> {
    let Json(body) = body?;
    let mut db = state.db.write().await;
    if db.account_by_email(&body.email).is_some() {
        return Err(AppError::bad_request("ALREADY_USED_EMAIL"));
    }
    Ok(created(open_verification(&mut db, &body.email)))
}

#[derive(Deserialize)]
pub struct Confirmation {
    pub email: String,
    pub uuid: String,
    pub code: String,
}

async fn confirm(state: &AppState, body: &Confirmation) -> Result<(), AppError> {
    let mut db = state.db.write().await;
    let verification = db
        .verifications
        .get_mut(&body.uuid)
        .filter(|v| v.email == body.email)
        .ok_or_else(|| AppError::bad_request("EMAIL_VERIFICATION_NOT_FOUND"))?;
    if body.code != VERIFICATION_CODE {
        return Err(AppError::bad_request("INVALID_VERIFICATION_CODE"));
    }
    verification.confirmed = true;
    Ok(())
}

pub async fn verify_email_confirm(
    State(state): State<AppState>,
    body: JsonBody<Confirmation>,
) -> Result<Created, AppError> {
    let Json(body) = body?;
    confirm(&state, &body).await?;
    Ok(created(json!({ "uuid": body.uuid })))
}

pub async fn reset_request(State(state): State<AppState>, body: JsonBody<Email>) -> Result<Created, AppError> {
    let Json(body) = body?;
    let mut db = state.db.write().await;
    if db.account_by_email(&body.email).is_none() {
        return Err(AppError::bad_request("USER_NOT_FOUND"));
    }
    Ok(created(open_verification(&mut db, &body.email)))
}

pub async fn reset_confirm(State(state): State<AppState>, body: JsonBody<Confirmation>) -> Result<Created, AppError> {
    let Json(body) = body?;
    confirm(&state, &body).await?;
    Ok(created(json!({ "email": body.email, "uuid": body.uuid })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPassword {
    pub uuid: String,
    pub password: String,
    pub password_check: String,
}

pub async fn reset_password(State(state): State<AppState>, body: JsonBody<NewPassword>) -> Result<Created, AppError> {
    let Json(body) = body?;
    if body.password != body.password_check {
        return Err(AppError::bad_request("PASSWORD_MISMATCH"));
    }
    let mut db = state.db.write().await;
    let email = match db.verifications.get(&body.uuid) {
        Some(v) if v.confirmed => v.email.clone(),
        _ => return Err(AppError::bad_request("EMAIL_VERIFICATION_NOT_FOUND")),
    };
    db.verifications.remove(&body.uuid);
    let account = db
        .accounts
        .get_mut(&email)
        .ok_or_else(|| AppError::bad_request("USER_NOT_FOUND"))?;
    account.password = body.password;
    Ok(created(json!({ "id": account.id })))
}

/// Read the `file` field of an upload.
async fn read_file(multipart: Result<Multipart, MultipartRejection>) -> Result<(String, usize), AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.jpg").to_string();
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::bad_request("EMPTY_FILE"));
        }
        return Ok((file_name, bytes.len()));
    }
    Err(AppError::bad_request("FILE_REQUIRED"))
}

async fn store(folder: &str, multipart: Result<Multipart, MultipartRejection>) -> Result<Created, AppError> {
    let (file_name, size) = read_file(multipart).await?;
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("jpg");
    let key = format!("private/{folder}/{}.{extension}", Uuid::new_v4().simple());
    info!(%key, size, "file stored");
    Ok(created(json!({ "key": key, "uri": format!("https://s3.mock/{key}") })))
}

pub async fn upload_profile_image(multipart: Result<Multipart, MultipartRejection>) -> Result<Created, AppError> {
    store("profile", multipart).await
}

pub async fn upload_passport_image(multipart: Result<Multipart, MultipartRejection>) -> Result<Created, AppError> {
    store("passport", multipart).await
}

pub async fn passport_recognition(multipart: Result<Multipart, MultipartRejection>) -> Result<Created, AppError> {
    read_file(multipart).await?;
    Ok(created(json!({
        "ocr_fullName": "HONG GILDONG",
        "ocr_gender": "M",
        "ocr_birthDate": "1990-01-01",
        "ocr_issueDate": "2020-01-01",
        "ocr_expireDate": "2030-01-01",
        "ocr_nationality": "KOR",
        "ocr_full_mrz": "PMKORHONG<<GILDONG<<<<<<<<<<<<<<<<<<<<<<<<<<<",
        "ocr_number": "M98765432",
    })))
}

pub async fn delete_user(State(state): State<AppState>, body: JsonBody<Email>) -> Result<Created, AppError> {
    let Json(body) = body?;
    let mut db = state.db.write().await;
    let account = db
        .accounts
        .remove(&body.email)
        .ok_or_else(|| AppError::bad_request("USER_NOT_FOUND"))?;
    db.sessions.retain(|_, s| s.user_id != account.id);
    Ok(created(json!({ "result": true })))
}
