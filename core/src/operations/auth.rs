//! `auth/*` endpoints used by the mobile app.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::{record_or_default, Operation};
use crate::error::ApiError;
use crate::guard::{SessionGuard, SignOutReason};
use crate::request::RequestDescriptor;
use crate::token::TokenPair;
use crate::types::{data_of, City, Country, EmailConfirmation, EmailVerification, Enveloped, Profile};

/// Marker payloads: only the presence of one identifying field matters.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdMarker {
    pub id: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UuidMarker {
    pub uuid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PassportMarker {
    pub passport_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResultMarker {
    pub result: Option<bool>,
}

fn present(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// `POST auth/login`. Stores the returned pair in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

impl Operation for SignIn {
    const NAME: &'static str = "auth.login";
    type Body = Enveloped<TokenPair>;
    type Output = TokenPair;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::post("auth/login").public().json(self)
    }

    fn output(body: Self::Body) -> TokenPair {
        record_or_default(body)
    }

    fn commit(output: &TokenPair, session: &SessionGuard) -> Result<(), ApiError> {
        session.sign_in(output.clone())
    }
}

/// `DELETE auth/logout`. Ends the session on success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignOut;

impl Operation for SignOut {
    const NAME: &'static str = "auth.logout";
    type Body = IgnoredAny;
    type Output = ();

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::delete("auth/logout"))
    }

    fn output(_body: IgnoredAny) {}

    fn commit(_output: &(), session: &SessionGuard) -> Result<(), ApiError> {
        session.teardown(SignOutReason::SignedOut);
        Ok(())
    }
}

/// `GET auth/profile`. A profile without `id` counts as missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetProfile;

impl Operation for GetProfile {
    const NAME: &'static str = "auth.profile";
    type Body = Enveloped<Profile>;
    type Output = Profile;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("auth/profile"))
    }

    fn output(body: Self::Body) -> Profile {
        data_of(body)
            .filter(|p| p.id.as_deref().is_some_and(|id| !id.is_empty()))
            .unwrap_or_default()
    }
}

/// `PUT auth/information`: resubmit applicant details after a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInformation {
    pub name: String,
    pub birthday: String,
    pub country_code: String,
    pub city_id: String,
    pub passport_number: String,
    pub passport_image_key: String,
    pub profile_image_key: String,
}

impl Operation for UpdateInformation {
    const NAME: &'static str = "auth.information";
    type Body = Enveloped<ResultMarker>;
    type Output = bool;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::put("auth/information").json(self)
    }

    fn output(body: Self::Body) -> bool {
        data_of(body).and_then(|m| m.result).unwrap_or(false)
    }
}

/// `GET auth/qr-code`: the signed-in user's QR image as a data URI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetQrCode;

impl Operation for GetQrCode {
    const NAME: &'static str = "auth.qr-code";
    type Body = Enveloped<String>;
    type Output = String;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("auth/qr-code"))
    }

    fn output(body: Self::Body) -> String {
        record_or_default(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserCountry {
    pub code3: String,
}

impl Operation for GetUserCountry {
    const NAME: &'static str = "auth.country";
    type Body = Enveloped<Country>;
    type Output = Option<Country>;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("auth/country").public().query("code3", &self.code3))
    }

    fn output(body: Self::Body) -> Option<Country> {
        data_of(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUserCity {
    pub country_code: String,
}

impl Operation for GetUserCity {
    const NAME: &'static str = "auth.city";
    type Body = Enveloped<City>;
    type Output = Option<City>;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("auth/city")
            .public()
            .query("countryCode", &self.country_code))
    }

    fn output(body: Self::Body) -> Option<City> {
        data_of(body)
    }
}

/// `POST auth/sign-up`. `true` when the backend returns the new user's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

impl Operation for SignUp {
    const NAME: &'static str = "auth.sign-up";
    type Body = Enveloped<IdMarker>;
    type Output = bool;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::post("auth/sign-up").public().json(self)
    }

    fn output(body: Self::Body) -> bool {
        data_of(body).is_some_and(|m| present(m.id.as_ref()))
    }
}

/// `POST auth/sign-up/verify-step1`: checks the passport is not registered yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPassport {
    pub birthday: String,
    pub passport_number: String,
}

impl Operation for VerifyPassport {
    const NAME: &'static str = "auth.verify-passport";
    type Body = Enveloped<PassportMarker>;
    type Output = bool;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::post("auth/sign-up/verify-step1").public().json(self)
    }

    fn output(body: Self::Body) -> bool {
        data_of(body)
            .and_then(|m| m.passport_number)
            .is_some_and(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEmailVerification {
    pub email: String,
}

impl Operation for RequestEmailVerification {
    const NAME: &'static str = "auth.verify-email.request";
    type Body = Enveloped<EmailVerification>;
    type Output = EmailVerification;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::post("auth/verify-email/request").public().json(self)
    }

    fn output(body: Self::Body) -> EmailVerification {
        record_or_default(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmEmail {
    pub email: String,
    pub code: String,
    pub uuid: String,
}

impl Operation for ConfirmEmail {
    const NAME: &'static str = "auth.verify-email.confirm";
    type Body = Enveloped<UuidMarker>;
    type Output = bool;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::post("auth/verify-email/confirm").public().json(self)
    }

    fn output(body: Self::Body) -> bool {
        data_of(body).and_then(|m| m.uuid).is_some_and(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPasswordReset {
    pub email: String,
}

impl Operation for RequestPasswordReset {
    const NAME: &'static str = "auth.reset-password.request";
    type Body = Enveloped<EmailVerification>;
    type Output = EmailVerification;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::post("auth/reset-password/request").public().json(self)
    }

    fn output(body: Self::Body) -> EmailVerification {
        record_or_default(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPasswordReset {
    pub email: String,
    pub uuid: String,
    pub code: String,
}

impl Operation for ConfirmPasswordReset {
    const NAME: &'static str = "auth.reset-password.confirm";
    type Body = Enveloped<EmailConfirmation>;
    type Output = EmailConfirmation;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::post("auth/reset-password/confirm").public().json(self)
    }

    fn output(body: Self::Body) -> EmailConfirmation {
        record_or_default(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPassword {
    pub uuid: String,
    pub password: String,
    pub password_check: String,
}

impl Operation for ResetPassword {
    const NAME: &'static str = "auth.reset-password";
    type Body = Enveloped<IdMarker>;
    type Output = bool;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::post("auth/reset-password").public().json(self)
    }

    fn output(body: Self::Body) -> bool {
        data_of(body).is_some_and(|m| present(m.id.as_ref()))
    }
}
