use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{broadcast, watch};

use crate::models::{Role, User, LOGIN_ROUTE};

/// Point-in-time view of the session. Derived fields are computed from
/// `user`, so a snapshot is always internally consistent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub is_loading: bool,
    /// Bumped by every sign-in, profile refresh and sign-out.
    pub generation: u64,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.role().is_some_and(|r| roles.contains(&r))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignOutReason {
    /// Explicit logout.
    UserRequested,
    /// The stored token's `exp` has passed.
    Expired,
    /// Token and cached user disagree.
    Inconsistent,
    /// The backend answered 401.
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(User),
    ProfileRefreshed(User),
    SignedOut {
        reason: SignOutReason,
        redirect: String,
    },
}

/// Observable session value plus a stream of discrete events.
pub struct SessionState {
    current: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
    pending: AtomicUsize,
}

const EVENT_CAPACITY: usize = 64;

impl SessionState {
    pub fn new(user: Option<User>) -> Self {
        let (current, _) = watch::channel(SessionSnapshot {
            user,
            is_loading: false,
            generation: 0,
        });
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            current,
            events,
            pending: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.current.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.current.borrow().generation
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.current.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Counts one more call in flight. The count and `is_loading` change
    /// under the watch channel's lock, so a finishing call cannot clear the
    /// flag a starting one just set.
    pub(crate) fn request_started(&self) {
        self.current.send_if_modified(|snapshot| {
            self.pending.fetch_add(1, Ordering::SeqCst);
            let changed = !snapshot.is_loading;
            snapshot.is_loading = true;
            changed
        });
    }

    pub(crate) fn request_finished(&self) {
        self.current.send_if_modified(|snapshot| {
            let remaining = self.pending.fetch_sub(1, Ordering::SeqCst) - 1;
            let is_loading = remaining > 0;
            let changed = snapshot.is_loading != is_loading;
            snapshot.is_loading = is_loading;
            changed
        });
    }

    pub(crate) fn replace_user(&self, user: Option<User>) {
        self.current.send_modify(|snapshot| {
            snapshot.user = user;
            snapshot.generation += 1;
        });
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    pub(crate) fn emit_signed_out(&self, reason: SignOutReason) {
        self.emit(SessionEvent::SignedOut {
            reason,
            redirect: LOGIN_ROUTE.to_string(),
        });
    }
}
