//! Blocking HTTP transport for the IDBlock client core.
//!
//! # Overview
//! `idblock-core` never touches the network. This crate supplies the
//! executor: a ureq agent that runs `HttpRequest` values, applies the retry
//! policy and per-call deadlines, and encodes multipart uploads. `ApiClient`
//! ties the two together so callers can write `client.call(&op)`.

pub mod client;
pub mod executor;

pub use client::ApiClient;
pub use executor::Transport;
