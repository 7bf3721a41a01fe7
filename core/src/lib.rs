//! Authenticated API client core for the IDBlock backend.
//!
//! # Overview
//! Builds `HttpRequest` values and consumes transport outcomes without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, which keeps the core deterministic and lets the
//! same logic serve the blocking transport, the FFI surface and tests.
//!
//! # Design
//! - `TokenStore` holds at most one token pair per client, optionally
//!   written through to a `TokenPersistence` backend.
//! - `RequestBuilder` composes the API base with an operation's relative
//!   path and attaches the bearer token to protected calls.
//! - `SessionGuard` is the first response interceptor: any 401 tears the
//!   session down once and ends the call with `ApiError::Unauthenticated`.
//! - `normalize` maps every outcome to the payload or an `ErrorResponse`.
//! - `operations` binds each backend endpoint to a typed input/output.
//!
//! DTOs are defined independently from the mock-server crate; integration
//! tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod interceptor;
pub mod multipart;
pub mod normalize;
pub mod operations;
pub mod request;
pub mod retry;
pub mod token;
pub mod types;

pub use client::{ClientBuilder, IdBlockClient};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, ErrorResponse, StorageError};
pub use guard::{SessionGuard, SessionListener, SessionState, SignOutReason};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Outcome, RequestBody, TransportError, TransportErrorKind};
pub use interceptor::{Exchange, InterceptorChain, ResponseInterceptor, TraceInterceptor, Verdict};
pub use multipart::MultipartForm;
pub use normalize::{normalize, ResponseKind};
pub use operations::Operation;
pub use request::{Access, RequestBuilder, RequestDescriptor};
pub use retry::RetryPolicy;
pub use token::{FilePersistence, MemoryPersistence, TokenPair, TokenPersistence, TokenStore};
