//! Response interceptor chain.
//!
//! Stages are registered when the client is built and run in order on every
//! received response, before normalization. Any stage may short-circuit the
//! exchange with an error; later stages then do not run.

use std::sync::Arc;

use tracing::debug;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// A received response together with the operation that asked for it.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub operation: &'static str,
    pub response: &'a HttpResponse,
}

/// Decision of one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Continue,
    ShortCircuit(ApiError),
}

pub trait ResponseInterceptor: Send + Sync {
    fn intercept(&self, exchange: &Exchange<'_>) -> Verdict;

    fn name(&self) -> &str {
        "interceptor"
    }
}

#[derive(Clone, Default)]
pub struct InterceptorChain {
    stages: Vec<Arc<dyn ResponseInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: Arc<dyn ResponseInterceptor>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn run(&self, exchange: &Exchange<'_>) -> Result<(), ApiError> {
        for stage in &self.stages {
            if let Verdict::ShortCircuit(err) = stage.intercept(exchange) {
                debug!(stage = stage.name(), operation = exchange.operation, "exchange short-circuited");
                return Err(err);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.name().to_string()))
            .finish()
    }
}

/// Logs every received response.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceInterceptor;

impl ResponseInterceptor for TraceInterceptor {
    fn intercept(&self, exchange: &Exchange<'_>) -> Verdict {
        debug!(
            operation = exchange.operation,
            status = exchange.response.status,
            bytes = exchange.response.body.len(),
            "response received"
        );
        Verdict::Continue
    }

    fn name(&self) -> &str {
        "trace"
    }
}
