//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests go out as C structs (method, URL, headers, optional JSON body).
//! Operation inputs and outputs cross as JSON text so one pair of
//! `build`/`parse` entry points covers every operation. Conversion helpers
//! live here to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use idblock_core::{ApiError, HttpMethod, HttpRequest, IdBlockClient, RequestBody};

/// Opaque handle to an `IdBlockClient`.
pub struct FfiClient {
    pub(crate) inner: IdBlockClient,
}

/// Allocate a C string, dropping interior NULs.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let s: String = s.into();
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A request for the host to execute. `body` is JSON text or null.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: HttpRequest) -> Result<*mut Self, ApiError> {
        let body = match req.body {
            None => std::ptr::null_mut(),
            Some(RequestBody::Json(text)) => c_string(text),
            Some(RequestBody::Multipart(_)) => {
                return Err(ApiError::InvalidRequest(
                    "multipart bodies are not supported over FFI".to_string(),
                ))
            }
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Vec<FfiHeader> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            // Exact capacity so `Vec::from_raw_parts(ptr, len, len)` is sound on free.
            Box::into_raw(ffi_headers.into_boxed_slice()) as *mut FfiHeader
        };

        Ok(Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            headers,
            headers_len,
            body,
        })))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not freed by us)
// ---------------------------------------------------------------------------

/// What the host observed. A non-null `transport_error` means no response
/// was received; `status` and `body` are then ignored.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
    pub transport_error: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    /// No session, or the server answered 401. Show the sign-in screen.
    Unauthenticated = 1,
    /// Backend or transport failure; see `error_body`.
    Response = 2,
    InvalidRequest = 3,
    UnknownOperation = 4,
    Panic = 5,
    NullArg = 6,
}

/// Outcome of `idblock_build_request`.
#[repr(C)]
pub struct FfiBuildResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub request: *mut FfiHttpRequest,
}

impl FfiBuildResult {
    pub(crate) fn ok(request: *mut FfiHttpRequest) -> *mut Self {
        Box::into_raw(Box::new(FfiBuildResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            request,
        }))
    }

    pub(crate) fn error(error_code: FfiErrorCode, message: impl Into<String>) -> *mut Self {
        Box::into_raw(Box::new(FfiBuildResult {
            error_code,
            error_message: c_string(message),
            request: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn from_error(err: &ApiError) -> *mut Self {
        Self::error(error_code(err), err.to_string())
    }
}

/// Outcome of `idblock_parse_response`.
///
/// On success `data` is the operation's output as JSON. On a `Response`
/// failure `error_body` is the `{message, error, statusCode}` JSON and
/// `status_code` mirrors it (-1 for transport failures). Every other
/// outcome has `status_code` 0.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub status_code: i32,
    pub error_body: *mut c_char,
    pub data: *mut c_char,
}

impl FfiResult {
    pub(crate) fn ok(json: String) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            status_code: 0,
            error_body: std::ptr::null_mut(),
            data: c_string(json),
        }))
    }

    pub(crate) fn error(error_code: FfiErrorCode, message: impl Into<String>) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: c_string(message),
            status_code: 0,
            error_body: std::ptr::null_mut(),
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn from_error(err: &ApiError) -> *mut Self {
        let error_body = err
            .error_response()
            .and_then(|body| serde_json::to_string(body).ok())
            .map_or(std::ptr::null_mut(), c_string);
        Box::into_raw(Box::new(FfiResult {
            error_code: error_code(err),
            error_message: c_string(err.to_string()),
            status_code: err.error_response().map_or(0, |body| body.status_code),
            error_body,
            data: std::ptr::null_mut(),
        }))
    }
}

fn error_code(err: &ApiError) -> FfiErrorCode {
    match err {
        ApiError::Unauthenticated => FfiErrorCode::Unauthenticated,
        ApiError::Response(_) => FfiErrorCode::Response,
        ApiError::InvalidRequest(_) => FfiErrorCode::InvalidRequest,
    }
}
