//! In-memory backend state.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Code accepted by every e-mail verification.
pub const VERIFICATION_CODE: &str = "123456";

pub const DEMO_EMAIL: &str = "a@b.com";
pub const DEMO_PASSWORD: &str = "x";
pub const ADMIN_EMAIL: &str = "admin@idblock.io";
pub const ADMIN_PASSWORD: &str = "admin";

pub const STATUS_PENDING: i32 = 0;
pub const STATUS_APPROVED: i32 = 1;
pub const STATUS_REJECTED: i32 = 2;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub document_id: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub name: String,
    pub birthday: String,
    pub country_code: String,
    pub city_id: String,
    pub passport_number: String,
    pub passport_image_key: String,
    pub profile_image_key: String,
    pub approval_status: i32,
    pub reject_reason: Option<String>,
    pub created_at: String,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: String,
    pub admin: bool,
}

#[derive(Clone, Debug)]
pub struct Verification {
    pub email: String,
    pub confirmed: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: String,
    pub user_id: String,
    pub site_id: String,
    pub created_at: String,
    pub review: Option<Review>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Default, Debug)]
pub struct Db {
    pub accounts: HashMap<String, Account>,
    pub admins: HashMap<String, String>,
    pub sessions: HashMap<String, Session>,
    pub verifications: HashMap<String, Verification>,
    pub visits: Vec<Visit>,
    pub fcm_tokens: HashMap<String, String>,
}

impl Db {
    pub fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.get(email)
    }

    pub fn account_by_id_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.accounts.values_mut().find(|a| a.id == id)
    }

    pub fn account_by_document_mut(&mut self, document_id: &str) -> Option<&mut Account> {
        self.accounts.values_mut().find(|a| a.document_id == document_id)
    }

    pub fn passport_in_use(&self, passport_number: &str) -> bool {
        self.accounts.values().any(|a| a.passport_number == passport_number)
    }

    /// Issue a fresh pair and register its access token.
    pub fn open_session(&mut self, user_id: &str, admin: bool) -> (String, String) {
        let access = format!("at-{}", Uuid::new_v4().simple());
        let refresh = format!("rt-{}", Uuid::new_v4().simple());
        self.sessions.insert(
            access.clone(),
            Session {
                user_id: user_id.to_string(),
                admin,
            },
        );
        (access, refresh)
    }
}

#[derive(Clone, Default, Debug)]
pub struct AppState {
    pub db: Arc<RwLock<Db>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One approved demo user with a visit, and one admin.
    pub fn seeded() -> Self {
        let mut db = Db::default();
        let demo = Account {
            id: "1".to_string(),
            document_id: "doc-1".to_string(),
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
            name: "Hong Gildong".to_string(),
            birthday: "1990-01-01".to_string(),
            country_code: "KR".to_string(),
            city_id: "1835848".to_string(),
            passport_number: "M12345678".to_string(),
            passport_image_key: "private/passport/demo.jpg".to_string(),
            profile_image_key: "private/profile/demo.jpg".to_string(),
            approval_status: STATUS_APPROVED,
            reject_reason: None,
            created_at: "2024-05-01T09:00:00.000Z".to_string(),
        };
        db.visits.push(Visit {
            id: "v-1".to_string(),
            user_id: demo.id.clone(),
            site_id: "1".to_string(),
            created_at: "2024-05-02T10:00:00.000Z".to_string(),
            review: None,
        });
        db.accounts.insert(demo.email.clone(), demo);
        db.admins.insert(ADMIN_EMAIL.to_string(), ADMIN_PASSWORD.to_string());
        Self {
            db: Arc::new(RwLock::new(db)),
        }
    }

    /// Invalidate every issued access token.
    pub async fn expire_sessions(&self) {
        self.db.write().await.sessions.clear();
    }

    pub async fn fcm_token(&self, user_id: &str) -> Option<String> {
        self.db.read().await.fcm_tokens.get(user_id).cloned()
    }
}
