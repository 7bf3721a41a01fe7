//! Request Builder: logical operation + current tokens -> `HttpRequest`.
//!
//! # Design
//! A `RequestDescriptor` names the method, the path relative to the API
//! base (`/api/v1/`), query pairs, an optional payload and whether the call
//! is public. The builder composes the URL with the `url` crate so path
//! segments and query values are percent-encoded, attaches the bearer token
//! for protected calls, and serializes JSON bodies. Multipart payloads pass
//! through untouched and get no JSON content type.

use serde::Serialize;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::http::{HttpMethod, HttpRequest, RequestBody};
use crate::multipart::MultipartForm;
use crate::token::TokenPair;

/// Whether an operation needs the bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

/// Payload of a logical operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

/// One logical call. Built per invocation and discarded afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Payload>,
    pub access: Access,
}

impl RequestDescriptor {
    /// `path` is split on `/`; use [`segment`](Self::segment) for values that
    /// must be encoded as a single segment.
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            query: Vec::new(),
            body: None,
            access: Access::Protected,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: &str) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn public(mut self) -> Self {
        self.access = Access::Public;
        self
    }

    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = Some(Payload::Json(value));
        Ok(self)
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(Payload::Multipart(form));
        self
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, Some(Payload::Multipart(_)))
    }

    pub fn is_public(&self) -> bool {
        self.access == Access::Public
    }

    /// Relative path, for logs.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }
}

/// Composes descriptors with the fixed API base.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base: Url,
}

impl RequestBuilder {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.base_url()?))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn build(
        &self,
        descriptor: &RequestDescriptor,
        tokens: Option<&TokenPair>,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.url_for(descriptor)?;
        let mut headers = vec![("cache-control".to_string(), "no-cache".to_string())];

        if descriptor.access == Access::Protected {
            if let Some(pair) = tokens.filter(|p| !p.is_empty()) {
                if !pair.access_token.chars().all(|c| c.is_ascii_graphic()) {
                    return Err(ApiError::InvalidRequest(
                        "access token contains characters not allowed in a header".to_string(),
                    ));
                }
                headers.push((
                    "authorization".to_string(),
                    format!("Bearer {}", pair.access_token),
                ));
            }
        }

        let body = match &descriptor.body {
            None => None,
            Some(Payload::Json(value)) => {
                let text = serde_json::to_string(value).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(RequestBody::Json(text))
            }
            Some(Payload::Multipart(form)) => Some(RequestBody::Multipart(form.clone())),
        };

        Ok(HttpRequest {
            method: descriptor.method,
            url: url.into(),
            headers,
            body,
        })
    }

    fn url_for(&self, descriptor: &RequestDescriptor) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidRequest(format!("{} cannot be a base URL", self.base)))?;
            segments.pop_if_empty();
            for segment in &descriptor.segments {
                segments.push(segment);
            }
        }
        if !descriptor.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&descriptor.query);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RequestBuilder {
        RequestBuilder::from_config(&ClientConfig::new("http://localhost:3000")).unwrap()
    }

    fn tokens() -> TokenPair {
        TokenPair::new("AT1", "RT1")
    }

    #[test]
    fn composes_base_prefix_with_relative_path() {
        let req = builder()
            .build(&RequestDescriptor::get("site/visit-history"), Some(&tokens()))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/v1/site/visit-history");
        assert!(req.body.is_none());
    }

    #[test]
    fn attaches_bearer_for_protected_calls() {
        let req = builder()
            .build(&RequestDescriptor::get("auth/profile"), Some(&tokens()))
            .unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer AT1"));
    }

    #[test]
    fn omits_bearer_for_public_calls() {
        let req = builder()
            .build(&RequestDescriptor::get("common/country").public(), Some(&tokens()))
            .unwrap();
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn omits_bearer_without_tokens() {
        let req = builder()
            .build(&RequestDescriptor::get("auth/profile"), None)
            .unwrap();
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn json_body_sets_content_type() {
        let descriptor = RequestDescriptor::post("auth/login")
            .public()
            .json(&serde_json::json!({"email": "a@b.com", "password": "x"}))
            .unwrap();
        let req = builder().build(&descriptor, None).unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value =
            serde_json::from_str(req.body.as_ref().unwrap().as_json().unwrap()).unwrap();
        assert_eq!(body["email"], "a@b.com");
    }

    #[test]
    fn multipart_passes_through_without_json_content_type() {
        let form = MultipartForm::new().file("file", "face.jpg", "image/jpeg", vec![1, 2, 3]);
        let descriptor = RequestDescriptor::post("auth/upload/profile-image")
            .public()
            .multipart(form.clone());
        assert!(descriptor.is_multipart());
        let req = builder().build(&descriptor, None).unwrap();
        assert!(req.header("content-type").is_none());
        assert_eq!(req.body, Some(RequestBody::Multipart(form)));
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let descriptor = RequestDescriptor::get("common/city")
            .public()
            .query("countryCode", "K R&x");
        let req = builder().build(&descriptor, None).unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/v1/common/city?countryCode=K+R%26x");
    }

    #[test]
    fn dynamic_segments_are_encoded_as_one_segment() {
        let descriptor = RequestDescriptor::put("site/review").segment("a/b c");
        let req = builder().build(&descriptor, Some(&tokens())).unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/v1/site/review/a%2Fb%20c");
    }

    #[test]
    fn corrupt_token_is_a_request_error() {
        let bad = TokenPair::new("AT\r\nX-Evil: 1", "RT");
        let err = builder()
            .build(&RequestDescriptor::get("auth/profile"), Some(&bad))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn non_serializable_body_fails_immediately() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(vec![1u8], "non-string key");
        let err = RequestDescriptor::post("x").json(&map).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
