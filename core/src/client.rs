//! Sans-IO client for the IDBlock API.
//!
//! # Design
//! `IdBlockClient` owns one session context (token store + session guard)
//! and the response interceptor chain. Every call is split in two:
//!
//! - [`build`](IdBlockClient::build) turns a typed operation into an
//!   `HttpRequest`, failing fast with `Unauthenticated` when a protected
//!   operation is attempted without credentials.
//! - [`parse`](IdBlockClient::parse) runs the interceptors on the outcome,
//!   normalizes it, applies the operation's missing-data policy and commits
//!   any session side effect (sign-in stores tokens, sign-out tears down).
//!
//! The caller executes the round-trip in between. Failures are returned as
//! values and logged once here.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::guard::{SessionGuard, SessionListener, SignOutReason};
use crate::http::{HttpRequest, Outcome};
use crate::interceptor::{Exchange, InterceptorChain, ResponseInterceptor, TraceInterceptor};
use crate::normalize::normalize;
use crate::operations::Operation;
use crate::request::RequestBuilder;
use crate::token::{MemoryPersistence, TokenPair, TokenPersistence, TokenStore};

#[derive(Debug)]
pub struct IdBlockClient {
    config: ClientConfig,
    builder: RequestBuilder,
    session: Arc<SessionGuard>,
    interceptors: InterceptorChain,
}

impl IdBlockClient {
    /// Client with in-memory token persistence and the default interceptors.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionGuard> {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Install a pair obtained out of band, e.g. restored by the host.
    pub fn set_tokens(&self, pair: TokenPair) -> Result<(), ApiError> {
        self.session.sign_in(pair)
    }

    /// End the session locally without contacting the server.
    pub fn clear_session(&self) -> bool {
        self.session.teardown(SignOutReason::SignedOut)
    }

    pub fn build<O: Operation>(&self, op: &O) -> Result<HttpRequest, ApiError> {
        let descriptor = op.descriptor().inspect_err(|e| {
            warn!(operation = O::NAME, error = %e, "invalid request");
        })?;
        let credentials = self.session.credentials();
        if !descriptor.is_public() && credentials.is_none() {
            warn!(operation = O::NAME, "protected call without a session");
            return Err(ApiError::Unauthenticated);
        }
        let request = self.builder.build(&descriptor, credentials.as_ref())?;
        debug!(operation = O::NAME, method = %request.method, url = %request.url, "request built");
        Ok(request)
    }

    pub fn parse<O: Operation>(&self, outcome: Outcome) -> Result<O::Output, ApiError> {
        match &outcome {
            Ok(response) => {
                let exchange = Exchange {
                    operation: O::NAME,
                    response,
                };
                self.interceptors.run(&exchange).inspect_err(|e| {
                    warn!(operation = O::NAME, error = %e, "call rejected");
                })?;
            }
            Err(err) => {
                warn!(operation = O::NAME, kind = ?err.kind, error = %err.message, "transport failure");
            }
        }

        let body = normalize::<O::Body>(outcome, O::RESPONSE).map_err(|e| {
            warn!(operation = O::NAME, status = e.status_code, message = %e.message, "call failed");
            ApiError::Response(e)
        })?;
        let output = O::output(body);
        O::commit(&output, &self.session)?;
        Ok(output)
    }
}

/// Assembles a client: persistence, listeners and extra interceptors.
pub struct ClientBuilder {
    config: ClientConfig,
    persistence: Option<Arc<dyn TokenPersistence>>,
    listeners: Vec<Arc<dyn SessionListener>>,
    interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            persistence: None,
            listeners: Vec::new(),
            interceptors: Vec::new(),
        }
    }

    pub fn persistence(mut self, persistence: Arc<dyn TokenPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Extra stage, run after the session guard and the trace stage.
    pub fn interceptor(mut self, stage: Arc<dyn ResponseInterceptor>) -> Self {
        self.interceptors.push(stage);
        self
    }

    pub fn build(self) -> Result<IdBlockClient, ConfigError> {
        let builder = RequestBuilder::from_config(&self.config)?;
        let persistence = self
            .persistence
            .unwrap_or_else(|| Arc::new(MemoryPersistence::new()));
        let tokens = Arc::new(TokenStore::new(persistence));
        tokens.restore();

        let session = Arc::new(SessionGuard::new(tokens));
        for listener in self.listeners {
            session.add_listener(listener);
        }

        let mut interceptors = InterceptorChain::new();
        interceptors.push(session.clone());
        interceptors.push(Arc::new(TraceInterceptor));
        for stage in self.interceptors {
            interceptors.push(stage);
        }

        Ok(IdBlockClient {
            config: self.config,
            builder,
            session,
            interceptors,
        })
    }
}
