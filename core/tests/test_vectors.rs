//! Verify request building and response normalization against the JSON
//! vectors stored in `test-vectors/`.
//!
//! Bodies are compared as parsed JSON, not raw strings, so field ordering
//! never causes a false negative.

use idblock_core::operations::{
    GetProfile, GetTermPolicy, GetUserCountry, ListCities, RejectUser, RemoveUser, SignIn, WriteReview,
};
use idblock_core::{
    normalize, ClientConfig, ErrorResponse, HttpMethod, HttpResponse, Operation, RequestBuilder, ResponseKind,
    TokenPair, TransportError, TransportErrorKind,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn check_request<O: Operation + DeserializeOwned>(builder: &RequestBuilder, tokens: &TokenPair, case: &Value) {
    let name = case["name"].as_str().unwrap();
    let op: O = serde_json::from_value(case["input"].clone()).unwrap();
    let expected = &case["expected_request"];

    let req = builder.build(&op.descriptor().unwrap(), Some(tokens)).unwrap();
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let pair = h.as_array().unwrap();
            (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    let body = req
        .body
        .as_ref()
        .map(|b| serde_json::from_str::<Value>(b.as_json().unwrap()).unwrap())
        .unwrap_or(Value::Null);
    assert_eq!(body, expected["body"], "{name}: body");
}

#[test]
fn request_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let config = ClientConfig::new(vectors["base"].as_str().unwrap());
    let builder = RequestBuilder::from_config(&config).unwrap();
    let tokens: TokenPair = serde_json::from_value(vectors["tokens"].clone()).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        match case["operation"].as_str().unwrap() {
            "auth.login" => check_request::<SignIn>(&builder, &tokens, case),
            "auth.profile" => check_request::<GetProfile>(&builder, &tokens, case),
            "auth.country" => check_request::<GetUserCountry>(&builder, &tokens, case),
            "common.city" => check_request::<ListCities>(&builder, &tokens, case),
            "common.html" => check_request::<GetTermPolicy>(&builder, &tokens, case),
            "site.review" => check_request::<WriteReview>(&builder, &tokens, case),
            "user.reject" => check_request::<RejectUser>(&builder, &tokens, case),
            "user.remove" => check_request::<RemoveUser>(&builder, &tokens, case),
            other => panic!("no vector binding for {other}"),
        }
    }
}

#[test]
fn response_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let outcome = match case["transport_error"].as_str() {
            Some(message) => Err(TransportError::new(TransportErrorKind::Connect, message)),
            None => Ok(HttpResponse::new(
                case["status"].as_u64().unwrap() as u16,
                case["body"].as_str().unwrap(),
            )),
        };

        let result = normalize::<Value>(outcome, ResponseKind::Json);
        let expected = &case["expected"];
        if let Some(ok) = expected.get("ok") {
            assert_eq!(result.as_ref().ok(), Some(ok), "{name}: payload");
        } else {
            let err: ErrorResponse = serde_json::from_value(expected["err"].clone()).unwrap();
            assert_eq!(result.err(), Some(err), "{name}: failure");
        }
    }
}
