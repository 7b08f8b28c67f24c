//! Navigation and sign-in guard collaborators.

use std::sync::Arc;

use builder_core::{Action, AppState, AppStore};

pub const SIGN_IN_ROUTE: &str = "/sign-in";

pub trait Router: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Records navigation requests in the store as [`Action::RequestRoute`].
#[derive(Clone)]
pub struct StoreRouter {
    store: AppStore,
}

impl StoreRouter {
    pub fn new(store: AppStore) -> Self {
        Self { store }
    }
}

impl Router for StoreRouter {
    fn navigate(&self, path: &str) {
        tracing::info!(route = path, "navigating");
        self.store.dispatch(Action::RequestRoute(path.to_string()));
    }
}

/// Gate run when a page initializes.
pub trait SignInGuard: Send + Sync {
    /// Returns `true` when the page may proceed. When it returns `false`
    /// the guard has already redirected.
    fn require_sign_in(&self, state: &AppState) -> bool;
}

/// Redirects to [`SIGN_IN_ROUTE`] when there is no session.
#[derive(Clone)]
pub struct RequireSignIn {
    router: Arc<dyn Router>,
}

impl RequireSignIn {
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self { router }
    }
}

impl SignInGuard for RequireSignIn {
    fn require_sign_in(&self, state: &AppState) -> bool {
        if state.is_signed_in() {
            return true;
        }
        tracing::info!("no session, redirecting to sign-in");
        self.router.navigate(SIGN_IN_ROUTE);
        false
    }
}
