//! Domain DTOs returned by the IDBlock backend.
//!
//! # Design
//! These mirror the backend's JSON (camelCase) but are lenient: fields the
//! mobile app treats as optional are `Option` or defaulted, so a sparse
//! record still decodes. Every 2xx JSON body arrives wrapped in the
//! `{ "data": ... }` envelope.

use serde::{Deserialize, Deserializer, Serialize};

/// The backend's success wrapper. `data` may be absent or null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub data: Option<T>,
}

/// Body type of enveloped operations. A `null` or empty body is `None`.
pub type Enveloped<T> = Option<Envelope<T>>;

/// Unwrap an enveloped body to its `data`, if any.
pub fn data_of<T>(body: Enveloped<T>) -> Option<T> {
    body.and_then(|envelope| envelope.data)
}

/// Accept ids serialized either as strings or as numbers (bigserial columns).
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Unsigned(u64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Country {
    pub name: String,
    pub code: String,
    #[serde(rename = "code_3", skip_serializing_if = "Option::is_none")]
    pub code3: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct City {
    pub id: String,
    pub name: Option<String>,
    pub country_code: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Site {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub image_key: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Review {
    pub id: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Visit {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub site_id: Option<String>,
    pub created_at: Option<String>,
    pub review: Option<Review>,
    pub site: Option<Site>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub content: String,
    pub display_type: String,
    pub display_time: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProfileStatus {
    Approved,
    Rejected,
    Pending,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub birthday: Option<String>,
    pub city: Option<City>,
    pub status: Option<ProfileStatus>,
    pub profile_image: Option<String>,
    pub reason: Option<String>,
}

/// Stored object reference returned by the upload endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUpload {
    pub key: String,
    pub uri: String,
}

/// OCR result of the passport recognition upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassportRecognition {
    #[serde(rename = "ocr_fullName")]
    pub full_name: String,
    #[serde(rename = "ocr_gender")]
    pub gender: String,
    #[serde(rename = "ocr_birthDate")]
    pub birth_date: String,
    #[serde(rename = "ocr_issueDate")]
    pub issue_date: String,
    #[serde(rename = "ocr_expireDate")]
    pub expire_date: String,
    #[serde(rename = "ocr_nationality")]
    pub nationality: String,
    #[serde(rename = "ocr_full_mrz")]
    pub full_mrz: String,
    #[serde(rename = "ocr_number")]
    pub number: String,
}

/// Pending e-mail verification (sign-up or password reset).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmailVerification {
    pub email: Option<String>,
    pub uuid: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfirmation {
    pub email: Option<String>,
    pub uuid: Option<String>,
}

/// Applicant record shown in the admin consoles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub user_id: Option<String>,
    pub document_id: String,
    pub email: String,
    pub name: String,
    pub country_code: Option<String>,
    pub city_id: Option<String>,
    pub birthday: Option<String>,
    pub passport_number: Option<String>,
    pub passport_image_key: Option<String>,
    pub profile_image_key: Option<String>,
    pub approval_status: Option<i32>,
    pub approval_id: Option<String>,
    pub reject_reason: Option<String>,
    pub match_similarity: Option<f64>,
    pub match_confidence: Option<f64>,
    pub face_liveness: Option<f64>,
    pub created_at: Option<String>,
}

/// Legal documents served as HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermType {
    #[serde(rename = "term-of-service")]
    TermOfService,
    #[serde(rename = "privacy-policy")]
    PrivacyPolicy,
}

impl TermType {
    pub fn as_str(self) -> &'static str {
        match self {
            TermType::TermOfService => "term-of-service",
            TermType::PrivacyPolicy => "privacy-policy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_without_data_is_none() {
        let body: Enveloped<Vec<City>> = serde_json::from_str("{}").unwrap();
        assert!(data_of(body).is_none());
        let body: Enveloped<Vec<City>> = serde_json::from_str("null").unwrap();
        assert!(data_of(body).is_none());
        let body: Enveloped<Vec<City>> = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(data_of(body).is_none());
    }

    #[test]
    fn site_id_accepts_numbers_and_strings() {
        let a: Site = serde_json::from_str(r#"{"id":12,"name":"Gyeongbokgung"}"#).unwrap();
        let b: Site = serde_json::from_str(r#"{"id":"12","name":"Gyeongbokgung"}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id, "12");
    }

    #[test]
    fn notification_type_field_maps_to_kind() {
        let n: Notification = serde_json::from_str(
            r#"{"id":"n1","userId":"u1","type":"APPROVAL","title":"Approved","content":"ok",
                "displayType":"PUSH","displayTime":"2024-01-01","createdAt":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(n.kind, "APPROVAL");
        assert_eq!(serde_json::to_value(&n).unwrap()["type"], "APPROVAL");
    }

    #[test]
    fn profile_status_is_uppercase() {
        let p: Profile = serde_json::from_str(r#"{"id":"1","status":"PENDING"}"#).unwrap();
        assert_eq!(p.status, Some(ProfileStatus::Pending));
    }

    #[test]
    fn passport_recognition_uses_ocr_names() {
        let p: PassportRecognition =
            serde_json::from_str(r#"{"ocr_fullName":"HONG GILDONG","ocr_number":"M1234"}"#).unwrap();
        assert_eq!(p.full_name, "HONG GILDONG");
        assert_eq!(p.number, "M1234");
        assert!(p.gender.is_empty());
    }

    #[test]
    fn country_code3_wire_name() {
        let c: Country = serde_json::from_str(r#"{"name":"Korea","code":"KR","code_3":"KOR"}"#).unwrap();
        assert_eq!(c.code3.as_deref(), Some("KOR"));
    }
}
