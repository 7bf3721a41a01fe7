//! Session Guard: the AUTHENTICATED / UNAUTHENTICATED state machine.
//!
//! # Design
//! The guard owns the session context for one client: the `TokenStore`, the
//! current state and the listeners that drive the presentation layer.
//!
//! - `sign_in` is the only way into AUTHENTICATED.
//! - Any 401 tears the session down: tokens cleared, listeners told once,
//!   and the triggering call ends with `ApiError::Unauthenticated`.
//! - Teardown is idempotent. Concurrent 401s race on the state mutex and
//!   only the first one observes the AUTHENTICATED state, so listeners fire
//!   once per transition.
//!
//! There is no in-band token refresh; a 401 always means signing in again.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::info;

use crate::error::ApiError;
use crate::interceptor::{Exchange, ResponseInterceptor, Verdict};
use crate::token::{TokenPair, TokenStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// The server rejected the credential with 401.
    Expired,
    /// The user signed out.
    SignedOut,
}

/// Receives the "navigate to the signed-out view" signal.
///
/// Implementations also drop any application state tied to the session.
pub trait SessionListener: Send + Sync {
    fn signed_out(&self, reason: SignOutReason);
}

pub struct SessionGuard {
    tokens: Arc<TokenStore>,
    state: Mutex<SessionState>,
    listeners: RwLock<Vec<Arc<dyn SessionListener>>>,
}

impl SessionGuard {
    /// Starts AUTHENTICATED only if the store already holds a pair.
    pub fn new(tokens: Arc<TokenStore>) -> Self {
        let state = if tokens.is_empty() {
            SessionState::Unauthenticated
        } else {
            SessionState::Authenticated
        };
        Self {
            tokens,
            state: Mutex::new(state),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn SessionListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Tokens to attach to the next request; `None` when signed out.
    pub fn credentials(&self) -> Option<TokenPair> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            SessionState::Authenticated => self.tokens.get(),
            SessionState::Unauthenticated => None,
        }
    }

    /// Store a freshly issued pair. An empty pair is refused.
    pub fn sign_in(&self, pair: TokenPair) -> Result<(), ApiError> {
        if pair.is_empty() {
            return Err(ApiError::Unauthenticated);
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.tokens.set(pair);
        *state = SessionState::Authenticated;
        info!("session authenticated");
        Ok(())
    }

    /// Tear the session down. Returns `true` only for the call that performed
    /// the AUTHENTICATED -> UNAUTHENTICATED transition.
    pub fn teardown(&self, reason: SignOutReason) -> bool {
        let transitioned = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let was = *state;
            *state = SessionState::Unauthenticated;
            self.tokens.clear();
            was == SessionState::Authenticated
        };
        if transitioned {
            info!(?reason, "session ended");
            let listeners = self
                .listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            for listener in listeners {
                listener.signed_out(reason);
            }
        }
        transitioned
    }
}

impl ResponseInterceptor for SessionGuard {
    fn intercept(&self, exchange: &Exchange<'_>) -> Verdict {
        if exchange.response.status != 401 {
            return Verdict::Continue;
        }
        self.teardown(SignOutReason::Expired);
        Verdict::ShortCircuit(ApiError::Unauthenticated)
    }

    fn name(&self) -> &str {
        "session-guard"
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("state", &self.state())
            .field("tokens", &self.tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;
    use crate::http::HttpResponse;

    #[derive(Default)]
    struct Navigator {
        expired: AtomicUsize,
        signed_out: AtomicUsize,
    }

    impl SessionListener for Navigator {
        fn signed_out(&self, reason: SignOutReason) {
            match reason {
                SignOutReason::Expired => self.expired.fetch_add(1, Ordering::SeqCst),
                SignOutReason::SignedOut => self.signed_out.fetch_add(1, Ordering::SeqCst),
            };
        }
    }

    fn signed_in() -> (SessionGuard, Arc<Navigator>) {
        let guard = SessionGuard::new(Arc::new(TokenStore::in_memory()));
        let nav = Arc::new(Navigator::default());
        guard.add_listener(nav.clone());
        guard.sign_in(TokenPair::new("AT1", "RT1")).unwrap();
        (guard, nav)
    }

    #[test]
    fn starts_unauthenticated_with_empty_store() {
        let guard = SessionGuard::new(Arc::new(TokenStore::in_memory()));
        assert_eq!(guard.state(), SessionState::Unauthenticated);
        assert!(guard.credentials().is_none());
    }

    #[test]
    fn starts_authenticated_with_restored_tokens() {
        let store = TokenStore::in_memory();
        store.set(TokenPair::new("AT", "RT"));
        let guard = SessionGuard::new(Arc::new(store));
        assert!(guard.is_authenticated());
    }

    #[test]
    fn sign_in_rejects_empty_pair() {
        let guard = SessionGuard::new(Arc::new(TokenStore::in_memory()));
        assert_eq!(guard.sign_in(TokenPair::default()), Err(ApiError::Unauthenticated));
        assert!(!guard.is_authenticated());
    }

    #[test]
    fn teardown_twice_navigates_once() {
        let (guard, nav) = signed_in();
        assert!(guard.teardown(SignOutReason::Expired));
        assert!(!guard.teardown(SignOutReason::Expired));
        assert!(guard.tokens().is_empty());
        assert_eq!(nav.expired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_401s_navigate_once() {
        let (guard, nav) = signed_in();
        let guard = Arc::new(guard);
        let unauthorized = HttpResponse::new(401, r#"{"message":"Unauthorized","statusCode":401}"#);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                let response = unauthorized.clone();
                thread::spawn(move || {
                    guard.intercept(&Exchange {
                        operation: "auth.profile",
                        response: &response,
                    })
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Verdict::ShortCircuit(ApiError::Unauthenticated));
        }

        assert!(guard.tokens().is_empty());
        assert_eq!(guard.state(), SessionState::Unauthenticated);
        assert_eq!(nav.expired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn non_401_passes_through() {
        let (guard, nav) = signed_in();
        let forbidden = HttpResponse::new(403, "{}");
        let verdict = guard.intercept(&Exchange {
            operation: "user.list",
            response: &forbidden,
        });
        assert_eq!(verdict, Verdict::Continue);
        assert!(guard.is_authenticated());
        assert_eq!(nav.expired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sign_in_after_teardown_re_arms_listener() {
        let (guard, nav) = signed_in();
        guard.teardown(SignOutReason::SignedOut);
        guard.sign_in(TokenPair::new("AT2", "RT2")).unwrap();
        guard.teardown(SignOutReason::Expired);
        assert_eq!(nav.signed_out.load(Ordering::SeqCst), 1);
        assert_eq!(nav.expired.load(Ordering::SeqCst), 1);
    }
}
