//! Application state store.
//!
//! One [`AppStore`] is created at startup and handed (cloned) to every
//! component that needs it. State is an immutable [`AppState`] behind an
//! `Arc`; the only way to change it is [`AppStore::dispatch`], which runs the
//! reducer for exactly one [`Action`] and then notifies subscribers in the
//! order they subscribed.
//!
//! Dispatches are serialized: a `dispatch` from another thread waits until
//! the current one has finished notifying. A `dispatch` made by a subscriber
//! while it is being notified is queued and applied, in order, once every
//! subscriber has seen the state that triggered it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};

use crate::error::SubmissionError;
use crate::types::{Notification, Origin, Session};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// UI state of the origin-creation form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OriginUiState {
    pub creating: bool,
    pub last_error: Option<SubmissionError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OriginsState {
    /// Origins owned by the signed-in user.
    pub mine: Vec<Origin>,
    /// Whether `mine` has been fetched at least once this session.
    pub mine_loaded: bool,
    pub current: Option<Origin>,
    pub ui: OriginUiState,
}

/// Snapshot of the whole application state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub session: Option<Session>,
    pub origins: OriginsState,
    pub notifications: Vec<Notification>,
    /// Last route requested through the router.
    pub route: Option<String>,
}

impl AppState {
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.username.as_str())
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.auth_token.as_str())
    }

    /// True iff the signed-in user owns zero origins.
    pub fn owns_no_origins(&self) -> bool {
        self.origins.mine.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Every state transition the application knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SignIn(Session),
    SignOut,
    SetMyOrigins(Vec<Origin>),
    SetOriginCreating(bool),
    OriginCreated {
        origin: Origin,
        is_first_origin: bool,
    },
    OriginCreateFailed(SubmissionError),
    AddNotification(Notification),
    RemoveNotification(usize),
    RequestRoute(String),
}

impl Action {
    fn label(&self) -> &'static str {
        match self {
            Action::SignIn(_) => "sign_in",
            Action::SignOut => "sign_out",
            Action::SetMyOrigins(_) => "set_my_origins",
            Action::SetOriginCreating(_) => "set_origin_creating",
            Action::OriginCreated { .. } => "origin_created",
            Action::OriginCreateFailed(_) => "origin_create_failed",
            Action::AddNotification(_) => "add_notification",
            Action::RemoveNotification(_) => "remove_notification",
            Action::RequestRoute(_) => "request_route",
        }
    }
}

/// Pure transition function: `state` + `action` → next state.
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::SignIn(session) => {
            next.session = Some(session);
        }
        Action::SignOut => {
            next = AppState::default();
        }
        Action::SetMyOrigins(origins) => {
            next.origins.mine = origins;
            next.origins.mine_loaded = true;
        }
        Action::SetOriginCreating(creating) => {
            next.origins.ui.creating = creating;
            if creating {
                next.origins.ui.last_error = None;
            }
        }
        Action::OriginCreated {
            origin,
            is_first_origin,
        } => {
            if is_first_origin {
                next.origins.current = Some(origin.clone());
            }
            if !next.origins.mine.iter().any(|o| o.name == origin.name) {
                next.origins.mine.push(origin);
            }
            next.origins.ui.last_error = None;
        }
        Action::OriginCreateFailed(error) => {
            next.origins.ui.last_error = Some(error);
        }
        Action::AddNotification(notification) => {
            next.notifications.push(notification);
        }
        Action::RemoveNotification(index) => {
            if index < next.notifications.len() {
                next.notifications.remove(index);
            }
        }
        Action::RequestRoute(route) => {
            next.route = Some(route);
        }
    }
    next
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

type Listener = Arc<dyn Fn(&AppState) + Send + Sync>;

/// Thread currently inside `dispatch` and the actions its subscribers
/// dispatched meanwhile.
#[derive(Default)]
struct Drain {
    owner: Option<ThreadId>,
    queued: VecDeque<Action>,
}

struct Inner {
    state: Mutex<Arc<AppState>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    dispatching: Mutex<()>,
    drain: Mutex<Drain>,
    next_id: AtomicU64,
}

/// Cloneable handle to the process-wide state container.
#[derive(Clone)]
pub struct AppStore {
    inner: Arc<Inner>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl AppStore {
    pub fn new(initial: AppState) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(Arc::new(initial)),
                listeners: Mutex::new(Vec::new()),
                dispatching: Mutex::new(()),
                drain: Mutex::new(Drain::default()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Consistent snapshot of the current state.
    pub fn get_state(&self) -> Arc<AppState> {
        lock(&self.inner.state).clone()
    }

    /// Apply one action and notify subscribers. Returns the new state.
    ///
    /// Called from a subscriber, the action is queued behind the dispatch in
    /// progress and the current state is returned; the outer call applies it
    /// before returning.
    pub fn dispatch(&self, action: Action) -> Arc<AppState> {
        let me = thread::current().id();
        {
            let mut drain = lock(&self.inner.drain);
            if drain.owner == Some(me) {
                tracing::debug!(action = action.label(), "queued behind dispatch in progress");
                drain.queued.push_back(action);
                return self.get_state();
            }
        }

        let _serial = lock(&self.inner.dispatching);
        lock(&self.inner.drain).owner = Some(me);
        let _reset = DrainReset(&self.inner);

        let mut next = self.apply(action);
        while let Some(action) = self.next_queued() {
            next = self.apply(action);
        }
        next
    }

    fn next_queued(&self) -> Option<Action> {
        lock(&self.inner.drain).queued.pop_front()
    }

    fn apply(&self, action: Action) -> Arc<AppState> {
        let label = action.label();
        let next = {
            let mut current = lock(&self.inner.state);
            let next = Arc::new(reduce(&current, action));
            *current = next.clone();
            next
        };
        tracing::debug!(action = label, "dispatched");

        // Listeners run without the registry lock held so they may subscribe,
        // drop subscriptions or dispatch.
        let listeners: Vec<Listener> = lock(&self.inner.listeners)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&next);
        }
        next
    }

    /// Register `listener`; it is called after every dispatch until the
    /// returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AppState) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).push((id, Arc::new(listener)));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }
}

/// Guard returned by [`AppStore::subscribe`]; unsubscribes on drop.
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            lock(&inner.listeners).retain(|(id, _)| *id != self.id);
        }
    }
}

/// Releases drain ownership, even if a subscriber panics.
struct DrainReset<'a>(&'a Inner);

impl Drop for DrainReset<'_> {
    fn drop(&mut self) {
        let mut drain = lock(&self.0.drain);
        drain.owner = None;
        drain.queued.clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
