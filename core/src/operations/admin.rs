//! Back-office endpoints used by the admin consoles.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::{list_or_empty, record_or_default, Operation};
use crate::error::ApiError;
use crate::guard::{SessionGuard, SignOutReason};
use crate::request::RequestDescriptor;
use crate::token::TokenPair;
use crate::types::{data_of, Enveloped, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSignIn {
    pub email: String,
    pub password: String,
}

impl Operation for AdminSignIn {
    const NAME: &'static str = "admin-auth.login";
    type Body = Enveloped<TokenPair>;
    type Output = TokenPair;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::post("admin-auth/login").public().json(self)
    }

    fn output(body: Self::Body) -> TokenPair {
        record_or_default(body)
    }

    fn commit(output: &TokenPair, session: &SessionGuard) -> Result<(), ApiError> {
        session.sign_in(output.clone())
    }
}

/// Probe whether the stored admin credential is still accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAuthStatus;

impl Operation for AdminAuthStatus {
    const NAME: &'static str = "admin-auth.protected";
    type Body = IgnoredAny;
    type Output = ();

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("admin-auth/protected"))
    }

    fn output(_body: IgnoredAny) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSignOut;

impl Operation for AdminSignOut {
    const NAME: &'static str = "admin-auth.logout";
    type Body = IgnoredAny;
    type Output = ();

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::delete("admin-auth/logout"))
    }

    fn output(_body: IgnoredAny) {}

    fn commit(_output: &(), session: &SessionGuard) -> Result<(), ApiError> {
        session.teardown(SignOutReason::SignedOut);
        Ok(())
    }
}

/// Applicants filtered by approval status (e.g. `"0"` pending).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListUsers {
    pub status: String,
}

impl Operation for ListUsers {
    const NAME: &'static str = "user.list";
    type Body = Enveloped<Vec<User>>;
    type Output = Vec<User>;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("user").query("status", &self.status))
    }

    fn output(body: Self::Body) -> Vec<User> {
        list_or_empty(body)
    }
}

/// An empty id would address the `user` collection instead of one user.
fn document_id(id: &str) -> Result<&str, ApiError> {
    if id.is_empty() {
        return Err(ApiError::InvalidRequest("document id is empty".to_string()));
    }
    Ok(id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUserDetail {
    pub document_id: String,
}

impl Operation for GetUserDetail {
    const NAME: &'static str = "user.detail";
    type Body = Enveloped<User>;
    type Output = Option<User>;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("user").segment(document_id(&self.document_id)?))
    }

    fn output(body: Self::Body) -> Option<User> {
        data_of(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveUser {
    pub document_id: String,
}

impl Operation for ApproveUser {
    const NAME: &'static str = "user.approve";
    type Body = IgnoredAny;
    type Output = ();

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::post("user/approve").json(self)
    }

    fn output(_body: IgnoredAny) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectUser {
    pub document_id: String,
    pub reason: String,
}

impl Operation for RejectUser {
    const NAME: &'static str = "user.reject";
    type Body = IgnoredAny;
    type Output = ();

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::patch("user/reject").json(self)
    }

    fn output(_body: IgnoredAny) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveUser {
    pub document_id: String,
}

impl Operation for RemoveUser {
    const NAME: &'static str = "user.remove";
    type Body = IgnoredAny;
    type Output = ();

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::delete("user").segment(document_id(&self.document_id)?))
    }

    fn output(_body: IgnoredAny) {}
}

/// Delete an account by e-mail. Public on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAccount {
    pub email: String,
}

impl Operation for DeleteAccount {
    const NAME: &'static str = "auth.delete-user";
    type Body = IgnoredAny;
    type Output = ();

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::post("auth/delete-user").public().json(self)
    }

    fn output(_body: IgnoredAny) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http::HttpMethod;
    use crate::operations::testing::output_of;
    use crate::request::{Access, Payload};
    use crate::token::TokenStore;

    #[test]
    fn reject_is_patch_with_reason() {
        let d = RejectUser {
            document_id: "doc-1".into(),
            reason: "blurry passport".into(),
        }
        .descriptor()
        .unwrap();
        assert_eq!(d.method, HttpMethod::Patch);
        assert_eq!(
            d.body,
            Some(Payload::Json(serde_json::json!({"documentId": "doc-1", "reason": "blurry passport"})))
        );
    }

    #[test]
    fn remove_user_targets_document_segment() {
        let d = RemoveUser { document_id: "doc-1".into() }.descriptor().unwrap();
        assert_eq!(d.method, HttpMethod::Delete);
        assert_eq!(d.path(), "user/doc-1");
        assert_eq!(d.access, Access::Protected);
    }

    #[test]
    fn empty_document_id_is_rejected() {
        let detail = GetUserDetail { document_id: String::new() }.descriptor();
        assert!(matches!(detail, Err(ApiError::InvalidRequest(_))));
        let remove = RemoveUser { document_id: String::new() }.descriptor();
        assert!(matches!(remove, Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn list_users_carries_status_query() {
        let d = ListUsers { status: "0".into() }.descriptor().unwrap();
        assert_eq!(d.query, vec![("status".to_string(), "0".to_string())]);
        assert!(output_of::<ListUsers>("{}").is_empty());
    }

    #[test]
    fn user_detail_missing_is_none() {
        assert!(output_of::<GetUserDetail>(r#"{"data":null}"#).is_none());
        let user = output_of::<GetUserDetail>(r#"{"data":{"id":"1","documentId":"doc-1","matchSimilarity":98.5}}"#)
            .unwrap();
        assert_eq!(user.match_similarity, Some(98.5));
    }

    #[test]
    fn delete_account_is_public() {
        assert!(DeleteAccount { email: "a@b.com".into() }.descriptor().unwrap().is_public());
    }

    #[test]
    fn admin_sign_out_tears_down_session() {
        let guard = SessionGuard::new(Arc::new(TokenStore::in_memory()));
        guard.sign_in(TokenPair::new("AT", "RT")).unwrap();
        AdminSignOut::commit(&(), &guard).unwrap();
        assert!(!guard.is_authenticated());
        assert!(guard.tokens().is_empty());
    }
}
