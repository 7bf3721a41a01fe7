use std::sync::Arc;
use std::time::Duration;

use idblock_core::operations::{Operation, SignOut};
use idblock_core::{ApiError, ClientConfig, ClientBuilder, ConfigError, IdBlockClient, SessionGuard};
use tracing::info;

use crate::executor::Transport;

/// Blocking IDBlock client: the sans-IO core driven by a ureq transport.
///
/// `ApiClient` is `Send + Sync`; share it behind an `Arc` and call it from
/// as many threads as needed. All threads see the same session.
#[derive(Debug)]
pub struct ApiClient {
    core: IdBlockClient,
    transport: Transport,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::from_builder(IdBlockClient::builder(config))
    }

    /// Configuration from `IDBLOCK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Finish a customized core (persistence, listeners, interceptors).
    pub fn from_builder(builder: ClientBuilder) -> Result<Self, ConfigError> {
        let core = builder.build()?;
        let transport = Transport::new(core.config());
        Ok(Self { core, transport })
    }

    pub fn core(&self) -> &IdBlockClient {
        &self.core
    }

    pub fn session(&self) -> &Arc<SessionGuard> {
        self.core.session()
    }

    pub fn is_authenticated(&self) -> bool {
        self.core.is_authenticated()
    }

    pub fn call<O: Operation>(&self, op: &O) -> Result<O::Output, ApiError> {
        let request = self.core.build(op)?;
        let outcome = self.transport.execute(&request);
        self.core.parse::<O>(outcome)
    }

    /// Like [`call`](Self::call), bounded by `deadline` across retries.
    pub fn call_with_deadline<O: Operation>(&self, op: &O, deadline: Duration) -> Result<O::Output, ApiError> {
        let request = self.core.build(op)?;
        let outcome = self.transport.execute_with_deadline(&request, deadline);
        self.core.parse::<O>(outcome)
    }

    /// Sign out on the server, then end the local session whatever the
    /// server said.
    pub fn sign_out(&self) -> Result<(), ApiError> {
        let result = self.call(&SignOut);
        if self.core.clear_session() {
            info!("session cleared after failed sign-out");
        }
        result
    }
}
