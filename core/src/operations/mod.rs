//! Typed Operation Wrappers, one per backend endpoint.
//!
//! # Design
//! Each wrapper is a small input type implementing [`Operation`]: it
//! describes its request, names the body type the normalizer decodes, and
//! narrows that body to the caller-facing output. Wrappers carry no business
//! logic.
//!
//! Missing data never fails a call. The policy is fixed per output shape:
//! lists become empty, records take their `Default`, optional records become
//! `None`, flags become `false`, text becomes empty, and fire-and-forget
//! calls ignore the body entirely.

pub mod admin;
pub mod auth;
pub mod common;
pub mod notification;
pub mod site;
pub mod upload;

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::guard::SessionGuard;
use crate::normalize::ResponseKind;
use crate::request::RequestDescriptor;
use crate::types::{data_of, Enveloped};

pub use admin::{
    AdminAuthStatus, AdminSignIn, AdminSignOut, ApproveUser, DeleteAccount, GetUserDetail, ListUsers, RejectUser,
    RemoveUser,
};
pub use auth::{
    ConfirmEmail, ConfirmPasswordReset, GetProfile, GetQrCode, GetUserCity, GetUserCountry, RequestEmailVerification,
    RequestPasswordReset, ResetPassword, SignIn, SignOut, SignUp, UpdateInformation, VerifyPassport,
};
pub use common::{GetTermPolicy, ListCities, ListCountries};
pub use notification::{ListNotifications, RegisterPushToken};
pub use site::{ListSites, ListVisitHistory, WriteReview};
pub use upload::{ImageFile, RecognizePassport, UploadFaceImage, UploadPassportImage};

/// Binding of one endpoint to a typed input/output contract.
pub trait Operation {
    /// Stable name used in logs and by the FFI dispatcher.
    const NAME: &'static str;

    /// How a 2xx body is decoded.
    const RESPONSE: ResponseKind = ResponseKind::Json;

    /// What the normalizer decodes a 2xx body into.
    type Body: DeserializeOwned;

    /// What the caller receives.
    type Output;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError>;

    fn output(body: Self::Body) -> Self::Output;

    /// Session side effect of a successful call.
    fn commit(_output: &Self::Output, _session: &SessionGuard) -> Result<(), ApiError> {
        Ok(())
    }
}

pub(crate) fn list_or_empty<T>(body: Enveloped<Vec<T>>) -> Vec<T> {
    data_of(body).unwrap_or_default()
}

pub(crate) fn record_or_default<T: Default>(body: Enveloped<T>) -> T {
    data_of(body).unwrap_or_default()
}
