//! Session context shared by the auth client, the request authorizer and
//! the router.
//!
//! Reads are open to everyone. Writes go through crate-private methods that
//! run under one writer lock, so token storage and the observable snapshot
//! change together.

pub mod state;
pub mod store;

use chrono::Utc;
use std::sync::Mutex;
use tokio::sync::{broadcast, watch};

use crate::error::ClientError;
use crate::models::{Role, User};
use crate::utils::jwt::Token;
pub use state::{SessionEvent, SessionSnapshot, SessionState, SignOutReason};
pub use store::{FileStorage, KeyValueStorage, MemoryStorage, StoreError, TokenStore};

pub struct Session {
    store: TokenStore,
    state: SessionState,
    writer: Mutex<()>,
}

impl Session {
    /// Loads the persisted session and runs the startup check.
    pub fn restore(store: TokenStore) -> Self {
        Self::restore_at(store, Utc::now().timestamp())
    }

    /// [`Session::restore`] with an explicit clock, in seconds since epoch.
    pub fn restore_at(store: TokenStore, now: i64) -> Self {
        let user = store.user();
        let session = Self {
            state: SessionState::new(user),
            store,
            writer: Mutex::new(()),
        };
        session.verify_stored_token(now);
        session
    }

    /// Startup check: an expired token, a token without a cached user, or a
    /// cached user without a token all end the session.
    fn verify_stored_token(&self, now: i64) {
        let token = self.store.get();
        let has_user = self.state.snapshot().is_authenticated();

        let reason = match (&token, has_user) {
            (Some(token), _) if token.is_expired_at(now) => Some(SignOutReason::Expired),
            (Some(_), false) | (None, true) => Some(SignOutReason::Inconsistent),
            _ => None,
        };

        if let Some(reason) = reason {
            tracing::info!(reason = ?reason, "Discarding stored session at startup");
            self.end(reason);
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.snapshot().user
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.snapshot().is_authenticated()
    }

    pub fn role(&self) -> Option<Role> {
        self.state.snapshot().role()
    }

    pub fn is_loading(&self) -> bool {
        self.state.snapshot().is_loading
    }

    pub fn generation(&self) -> u64 {
        self.state.generation()
    }

    pub fn token(&self) -> Option<Token> {
        self.store.get()
    }

    pub fn has_token(&self) -> bool {
        self.store.has_token()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.state.subscribe_events()
    }

    /// Marks a session-mutating call as in flight. The returned guard keeps
    /// `is_loading` set until dropped and remembers the generation the call
    /// started from.
    pub(crate) fn begin_request(&self) -> PendingRequest<'_> {
        self.state.request_started();
        PendingRequest {
            session: self,
            generation: self.state.generation(),
        }
    }

    /// Stores a fresh sign-in, unless the session moved on since
    /// `generation`.
    pub(crate) fn establish(
        &self,
        generation: u64,
        token: &Token,
        user: &User,
    ) -> Result<(), ClientError> {
        {
            let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
            if self.state.generation() != generation {
                return Err(ClientError::Superseded);
            }

            let persisted = self
                .store
                .set(token)
                .and_then(|_| self.store.set_user(user));
            if let Err(e) = persisted {
                if let Err(clear_err) = self.store.clear() {
                    tracing::error!(error = %clear_err, "Failed to roll back partial sign-in");
                }
                return Err(e.into());
            }

            self.state.replace_user(Some(user.clone()));
        }

        tracing::info!(user_id = %user.id, role = %user.role, "Session established");
        self.state.emit(SessionEvent::SignedIn(user.clone()));
        Ok(())
    }

    /// Overwrites the cached user of the current session.
    pub(crate) fn update_user(&self, generation: u64, user: &User) -> Result<(), ClientError> {
        {
            let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
            if self.state.generation() != generation || !self.store.has_token() {
                return Err(ClientError::Superseded);
            }
            self.store.set_user(user)?;
            self.state.replace_user(Some(user.clone()));
        }

        tracing::info!(user_id = %user.id, "Cached profile refreshed");
        self.state.emit(SessionEvent::ProfileRefreshed(user.clone()));
        Ok(())
    }

    /// Clears token, cached user and state. Never fails and is safe to call
    /// on an empty session.
    pub(crate) fn end(&self, reason: SignOutReason) {
        {
            let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
            self.clear();
        }

        tracing::info!(reason = ?reason, "Session ended");
        self.state.emit_signed_out(reason);
    }

    /// [`Session::end`] for a rejection of a request sent at `generation`.
    /// A session that was replaced since then is left alone.
    pub(crate) fn end_since(&self, generation: u64, reason: SignOutReason) -> bool {
        {
            let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
            if self.state.generation() != generation {
                tracing::debug!(reason = ?reason, "Ignoring rejection of a stale request");
                return false;
            }
            self.clear();
        }

        tracing::info!(reason = ?reason, "Session ended");
        self.state.emit_signed_out(reason);
        true
    }

    /// Caller holds `writer`.
    fn clear(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear session storage");
        }
        self.state.replace_user(None);
    }

    /// Self-correction before guards run: a cached user with no token is
    /// not a session. Returns whether a sign-out happened.
    pub(crate) fn repair(&self) -> bool {
        if self.is_authenticated() && !self.has_token() {
            tracing::warn!("Cached user without token, signing out");
            self.end(SignOutReason::Inconsistent);
            return true;
        }
        false
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("snapshot", &self.snapshot())
            .field("store", &self.store)
            .finish()
    }
}

pub(crate) struct PendingRequest<'a> {
    session: &'a Session,
    generation: u64,
}

impl PendingRequest<'_> {
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        self.session.state.request_finished();
    }
}
