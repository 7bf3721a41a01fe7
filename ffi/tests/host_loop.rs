//! Drives the C ABI the way a native host does.
//!
//! # Design
//! Starts the mock server on a random port, then for each call asks the
//! library for a request, executes it with ureq, and hands the observed
//! status and body back through `idblock_parse_response`. Nothing here
//! touches the Rust-side transport crate.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use idblock_ffi::types::{FfiClient, FfiErrorCode, FfiHttpMethod, FfiHttpRequest, FfiHttpResponse};
use idblock_ffi::*;

fn read(ptr: *const c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
}

/// Execute a request built by the library and return `(status, body)`.
fn execute(req: &FfiHttpRequest) -> (u16, String) {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let url = read(req.url);
    let headers: Vec<(String, String)> = if req.headers.is_null() {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) }
            .iter()
            .map(|h| (read(h.key), read(h.value)))
            .collect()
    };
    let body = (!req.body.is_null()).then(|| read(req.body));

    let result = match req.method {
        FfiHttpMethod::Get => {
            let mut r = agent.get(&url);
            for (k, v) in &headers {
                r = r.header(k, v);
            }
            r.call()
        }
        FfiHttpMethod::Delete => {
            let mut r = agent.delete(&url);
            for (k, v) in &headers {
                r = r.header(k, v);
            }
            r.call()
        }
        method => {
            let mut r = match method {
                FfiHttpMethod::Post => agent.post(&url),
                FfiHttpMethod::Put => agent.put(&url),
                _ => agent.patch(&url),
            };
            for (k, v) in &headers {
                r = r.header(k, v);
            }
            match &body {
                Some(text) => r.send(text.as_bytes()),
                None => r.send_empty(),
            }
        }
    };

    let mut response = result.expect("HTTP transport error");
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    (status, body)
}

/// One build/execute/parse round trip. Returns `(error_code, data or error body)`.
fn call(client: *mut FfiClient, operation: &str, input: Option<&str>) -> (FfiErrorCode, Option<String>) {
    let op = CString::new(operation).unwrap();
    let input = input.map(|s| CString::new(s).unwrap());
    let built = idblock_build_request(client, op.as_ptr(), input.as_ref().map_or(ptr::null(), |s| s.as_ptr()));
    let b = unsafe { &*built };
    if b.error_code != FfiErrorCode::Ok {
        let code = b.error_code;
        idblock_free_build_result(built);
        return (code, None);
    }

    let (status, body) = execute(unsafe { &*b.request });
    idblock_free_build_result(built);

    let body = CString::new(body).unwrap();
    let response = FfiHttpResponse {
        status,
        body: body.as_ptr(),
        transport_error: ptr::null(),
    };
    let parsed = idblock_parse_response(client, op.as_ptr(), &response);
    let r = unsafe { &*parsed };
    let payload = if !r.data.is_null() {
        Some(read(r.data))
    } else if !r.error_body.is_null() {
        Some(read(r.error_body))
    } else {
        None
    };
    let code = r.error_code;
    idblock_free_result(parsed);
    (code, payload)
}

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn sign_in_profile_sign_out() {
    let origin = CString::new(start_server()).unwrap();
    let client = idblock_client_new(origin.as_ptr(), ptr::null());
    assert!(!client.is_null());

    let (code, _) = call(client, "auth.profile", None);
    assert_eq!(code, FfiErrorCode::Unauthenticated);

    let credentials = format!(
        r#"{{"email":"{}","password":"{}"}}"#,
        mock_server::DEMO_EMAIL,
        mock_server::DEMO_PASSWORD
    );
    let (code, data) = call(client, "auth.login", Some(&credentials));
    assert_eq!(code, FfiErrorCode::Ok);
    let pair: serde_json::Value = serde_json::from_str(&data.unwrap()).unwrap();
    assert!(pair["accessToken"].as_str().unwrap().starts_with("at-"));
    assert!(idblock_session_is_authenticated(client));

    let (code, data) = call(client, "auth.profile", None);
    assert_eq!(code, FfiErrorCode::Ok);
    let profile: serde_json::Value = serde_json::from_str(&data.unwrap()).unwrap();
    assert_eq!(profile["email"], mock_server::DEMO_EMAIL);

    let (code, data) = call(client, "auth.logout", None);
    assert_eq!(code, FfiErrorCode::Ok);
    assert_eq!(data.as_deref(), Some("null"));
    assert!(!idblock_session_is_authenticated(client));

    idblock_client_free(client);
}

#[test]
fn public_calls_and_backend_errors() {
    let origin = CString::new(start_server()).unwrap();
    let client = idblock_client_new(origin.as_ptr(), ptr::null());

    let (code, data) = call(client, "common.city", Some(r#"{"countryCode":"KR"}"#));
    assert_eq!(code, FfiErrorCode::Ok);
    let cities: Vec<serde_json::Value> = serde_json::from_str(&data.unwrap()).unwrap();
    assert_eq!(cities.len(), 2);

    let (code, data) = call(client, "common.html", Some(r#"{"term":"privacy-policy"}"#));
    assert_eq!(code, FfiErrorCode::Ok);
    let html: String = serde_json::from_str(&data.unwrap()).unwrap();
    assert!(html.contains("Privacy Policy"));

    let (code, data) = call(client, "auth.login", Some(r#"{"email":"a@b.com","password":"nope"}"#));
    assert_eq!(code, FfiErrorCode::Response);
    let body: serde_json::Value = serde_json::from_str(&data.unwrap()).unwrap();
    assert_eq!(body["message"], "INVALID_LOGIN_DATA");
    assert_eq!(body["statusCode"], 400);

    idblock_client_free(client);
}
