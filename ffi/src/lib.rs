//! C-ABI wrapper around `idblock-core`.
//!
//! # Overview
//! Lets a native host (the mobile shell, a WebView bridge) build IDBlock
//! requests and interpret responses while doing the network I/O itself.
//! The Session Guard and token store live inside the client handle, so a
//! 401 observed through `idblock_parse_response` tears the session down
//! exactly as it does for the Rust transport.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Operations are addressed by name (`auth.login`, `common.city`, ...).
//!   Inputs arrive as JSON and outputs leave as JSON, so the surface stays
//!   fixed as endpoints are added. Multipart uploads are not exposed.
//! - The C caller owns all returned pointers and must call the matching
//!   `idblock_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use idblock_core::operations::*;
use idblock_core::{
    ApiError, ClientConfig, FilePersistence, HttpRequest, HttpResponse, IdBlockClient, Operation, Outcome,
    TokenPair, TransportError, TransportErrorKind,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use types::*;

/// Borrow a C string as `&str`. Null or invalid UTF-8 yields `None`.
fn borrow_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn decode_input<O: DeserializeOwned>(input: Option<&str>) -> Result<O, ApiError> {
    let text = match input.map(str::trim) {
        None | Some("") => "null",
        Some(text) => text,
    };
    serde_json::from_str(text).map_err(|e| ApiError::InvalidRequest(format!("bad input: {e}")))
}

fn encode_output<T: Serialize>(output: T) -> Result<String, ApiError> {
    serde_json::to_string(&output).map_err(|e| ApiError::InvalidRequest(format!("bad output: {e}")))
}

macro_rules! dispatch {
    ($($op:ty),* $(,)?) => {
        /// Names accepted by `idblock_build_request` and `idblock_parse_response`.
        pub const OPERATIONS: &[&str] = &[$(<$op as Operation>::NAME),*];

        fn build_named(client: &IdBlockClient, name: &str, input: Option<&str>) -> Option<Result<HttpRequest, ApiError>> {
            $(
                if name == <$op as Operation>::NAME {
                    return Some(decode_input::<$op>(input).and_then(|op| client.build(&op)));
                }
            )*
            None
        }

        fn parse_named(client: &IdBlockClient, name: &str, outcome: Outcome) -> Option<Result<String, ApiError>> {
            $(
                if name == <$op as Operation>::NAME {
                    return Some(client.parse::<$op>(outcome).and_then(encode_output));
                }
            )*
            None
        }
    };
}

dispatch!(
    SignIn,
    SignOut,
    GetProfile,
    UpdateInformation,
    GetQrCode,
    GetUserCountry,
    GetUserCity,
    SignUp,
    VerifyPassport,
    RequestEmailVerification,
    ConfirmEmail,
    RequestPasswordReset,
    ConfirmPasswordReset,
    ResetPassword,
    ListCountries,
    ListCities,
    GetTermPolicy,
    ListSites,
    ListVisitHistory,
    WriteReview,
    ListNotifications,
    RegisterPushToken,
    AdminSignIn,
    AdminAuthStatus,
    AdminSignOut,
    ListUsers,
    GetUserDetail,
    ApproveUser,
    RejectUser,
    RemoveUser,
    DeleteAccount,
);

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for the API at `origin` (e.g. `https://api.idblock.io`).
///
/// If `token_path` is non-null the session is persisted to that file and
/// restored from it now. Returns null if `origin` is null or invalid.
/// The caller must free the returned pointer with `idblock_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn idblock_client_new(origin: *const c_char, token_path: *const c_char) -> *mut FfiClient {
    catch_unwind(|| {
        let Some(origin) = borrow_str(origin) else {
            return std::ptr::null_mut();
        };
        let mut builder = IdBlockClient::builder(ClientConfig::new(origin));
        if let Some(path) = borrow_str(token_path) {
            builder = builder.persistence(Arc::new(FilePersistence::new(path)));
        }
        match builder.build() {
            Ok(inner) => Box::into_raw(Box::new(FfiClient { inner })),
            Err(e) => {
                warn!(error = %e, "client construction failed");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `idblock_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn idblock_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Install a token pair, e.g. one restored by the host. Returns false on null
/// arguments or a persistence failure.
#[unsafe(no_mangle)]
pub extern "C" fn idblock_session_set_tokens(
    client: *const FfiClient,
    access_token: *const c_char,
    refresh_token: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let (Some(access), Some(refresh)) = (borrow_str(access_token), borrow_str(refresh_token)) else {
            return false;
        };
        let client = unsafe { &*client };
        client.inner.set_tokens(TokenPair::new(access, refresh)).is_ok()
    }))
    .unwrap_or(false)
}

/// End the local session without calling the backend. Listeners are told
/// the user signed out. Returns true if a session was cleared.
#[unsafe(no_mangle)]
pub extern "C" fn idblock_session_clear(client: *const FfiClient) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        client.inner.clear_session()
    }))
    .unwrap_or(false)
}

#[unsafe(no_mangle)]
pub extern "C" fn idblock_session_is_authenticated(client: *const FfiClient) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        client.inner.is_authenticated()
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Build / parse
// ---------------------------------------------------------------------------

/// Build the HTTP request for `operation` from its JSON input.
///
/// `input_json` may be null for operations without fields. A protected
/// operation with no session fails with `Unauthenticated` before anything
/// is built. The caller must free the result with `idblock_free_build_result`.
#[unsafe(no_mangle)]
pub extern "C" fn idblock_build_request(
    client: *const FfiClient,
    operation: *const c_char,
    input_json: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiBuildResult::error(FfiErrorCode::NullArg, "null client");
        }
        let Some(name) = borrow_str(operation) else {
            return FfiBuildResult::error(FfiErrorCode::NullArg, "null operation");
        };
        let client = unsafe { &*client };
        let built = build_named(&client.inner, name, borrow_str(input_json));
        match built {
            None => {
                warn!(operation = name, "unknown operation");
                FfiBuildResult::error(FfiErrorCode::UnknownOperation, format!("unknown operation: {name}"))
            }
            Some(Err(e)) => FfiBuildResult::from_error(&e),
            Some(Ok(req)) => match FfiHttpRequest::from_core(req) {
                Ok(request) => FfiBuildResult::ok(request),
                Err(e) => FfiBuildResult::from_error(&e),
            },
        }
    }))
    .unwrap_or_else(|_| FfiBuildResult::error(FfiErrorCode::Panic, "internal panic"))
}

/// Interpret what the host observed for a request built for `operation`.
///
/// Runs the Session Guard first: a 401 clears the session, notifies
/// listeners once and yields `Unauthenticated`. On success `data` holds the
/// operation's output as JSON. The caller must free the result with
/// `idblock_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn idblock_parse_response(
    client: *const FfiClient,
    operation: *const c_char,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || response.is_null() {
            return FfiResult::error(FfiErrorCode::NullArg, "null client or response");
        }
        let Some(name) = borrow_str(operation) else {
            return FfiResult::error(FfiErrorCode::NullArg, "null operation");
        };
        let client = unsafe { &*client };
        let response = unsafe { &*response };

        match parse_named(&client.inner, name, outcome_of(response)) {
            None => {
                warn!(operation = name, "unknown operation");
                FfiResult::error(FfiErrorCode::UnknownOperation, format!("unknown operation: {name}"))
            }
            Some(Ok(json)) => FfiResult::ok(json),
            Some(Err(e)) => FfiResult::from_error(&e),
        }
    }))
    .unwrap_or_else(|_| FfiResult::error(FfiErrorCode::Panic, "internal panic"))
}

/// What the host observed, as the core sees it. A null body is empty; a body
/// that is not UTF-8 could not be read and counts as a transport failure.
fn outcome_of(response: &FfiHttpResponse) -> Outcome {
    if !response.transport_error.is_null() {
        let message = borrow_str(response.transport_error).unwrap_or("transport failure");
        return Err(TransportError::new(TransportErrorKind::Other, message));
    }
    if response.body.is_null() {
        return Ok(HttpResponse::new(response.status, ""));
    }
    match unsafe { CStr::from_ptr(response.body) }.to_str() {
        Ok(body) => Ok(HttpResponse::new(response.status, body)),
        Err(e) => Err(TransportError::new(
            TransportErrorKind::Body,
            format!("response body is not UTF-8: {e}"),
        )),
    }
}

/// JSON array of every operation name this library dispatches.
/// Free with `idblock_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn idblock_operations() -> *mut c_char {
    catch_unwind(|| match serde_json::to_string(OPERATIONS) {
        Ok(json) => c_string(json),
        Err(_) => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

fn free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let req = unsafe { Box::from_raw(req) };
    free_c_string(req.url);
    free_c_string(req.body);
    if !req.headers.is_null() {
        let len = req.headers_len as usize;
        let headers = unsafe { Vec::from_raw_parts(req.headers, len, len) };
        for h in headers {
            free_c_string(h.key);
            free_c_string(h.value);
        }
    }
}

/// Free a request detached from its build result. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn idblock_free_request(req: *mut FfiHttpRequest) {
    let _ = catch_unwind(AssertUnwindSafe(|| free_request(req)));
}

/// Free a build result and the request it carries. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn idblock_free_build_result(result: *mut FfiBuildResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_request(result.request);
    }));
}

/// Free a parse result. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn idblock_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.error_body);
        free_c_string(result.data);
    }));
}

/// Free a string returned by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn idblock_free_string(s: *mut c_char) {
    let _ = catch_unwind(AssertUnwindSafe(|| free_c_string(s)));
}
