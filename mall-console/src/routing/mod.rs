pub mod guards;
pub mod routes;

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

pub use guards::{evaluate, login_redirect, Decision, Guard, GuardContext};
pub use routes::{Crumb, Page, Resolved, RouteTable, Section};

use crate::models::default_route_for;
use crate::session::Session;

const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Too many redirects while navigating to {0}")]
    TooManyRedirects(String),
}

/// Where a navigation attempt ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub requested: String,
    /// Final URL, including any query string.
    pub url: String,
    pub title: &'static str,
    pub breadcrumb: Vec<Crumb>,
    /// Every redirect taken on the way, in order.
    pub redirects: Vec<String>,
}

impl Navigation {
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

pub struct Router {
    table: RouteTable,
    session: Arc<Session>,
}

impl Router {
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_table(RouteTable::standard(), session)
    }

    pub fn with_table(table: RouteTable, session: Arc<Session>) -> Self {
        Self { table, session }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolves `url`, running the guards of the matched section against the
    /// current session and following redirects until a page admits entry.
    pub fn navigate(&self, url: &str) -> Result<Navigation, RoutingError> {
        let requested = normalize(url);
        let mut current = requested.clone();
        let mut redirects = Vec::new();

        for _ in 0..=MAX_REDIRECTS {
            let target = match self.table.resolve(&current) {
                Resolved::Redirect(target) => target,
                Resolved::Page { section, page } => {
                    self.session.repair();
                    let snapshot = self.session.snapshot();
                    let ctx = GuardContext {
                        session: &snapshot,
                        has_token: self.session.has_token(),
                        requested_url: &current,
                    };

                    match evaluate(&section.guards, &ctx) {
                        Decision::Allow => {
                            tracing::debug!(url = %current, redirects = redirects.len(), "Navigation allowed");
                            return Ok(Navigation {
                                requested,
                                url: current,
                                title: page.title,
                                breadcrumb: page.breadcrumb.clone(),
                                redirects,
                            });
                        }
                        Decision::Redirect(target) => {
                            tracing::debug!(from = %current, to = %target, "Guard redirected navigation");
                            target
                        }
                    }
                }
            };
            redirects.push(target.clone());
            current = target;
        }

        tracing::warn!(url = %requested, "Navigation exceeded redirect limit");
        Err(RoutingError::TooManyRedirects(requested))
    }

    /// Landing page after a successful sign-in: the `returnUrl` the user was
    /// bounced from, else the role dashboard.
    pub fn after_sign_in(&self, return_url: Option<&str>) -> Result<Navigation, RoutingError> {
        match return_url.filter(|u| !u.trim().is_empty()) {
            Some(url) => self.navigate(url),
            None => self.navigate(default_route_for(self.session.role())),
        }
    }
}

fn normalize(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};
    use crate::session::TokenStore;
    use crate::utils::jwt::Token;

    fn signed_in(role: Role) -> Arc<Session> {
        let store = TokenStore::in_memory();
        store.set(&Token::new("opaque")).unwrap();
        store
            .set_user(&User {
                id: "u-1".to_string(),
                email: "someone@mall.test".to_string(),
                role,
                profile: None,
                shop_id: None,
                is_active: None,
                created_at: None,
                updated_at: None,
            })
            .unwrap();
        Arc::new(Session::restore_at(store, 1_000))
    }

    fn anonymous() -> Arc<Session> {
        Arc::new(Session::restore_at(TokenStore::in_memory(), 1_000))
    }

    #[test]
    fn test_anonymous_is_sent_to_login_with_return_url() {
        let router = Router::new(anonymous());
        let nav = router.navigate("/admin/reports").unwrap();
        assert_eq!(nav.url, "/authentication/login?returnUrl=%2Fadmin%2Freports");
        assert_eq!(nav.title, "Sign In");
        assert_eq!(nav.redirects.len(), 1);
    }

    #[test]
    fn test_buyer_hitting_admin_lands_on_own_dashboard() {
        let router = Router::new(signed_in(Role::User));
        let nav = router.navigate("/admin/dashboard").unwrap();
        assert_eq!(nav.url, "/user/dashboard");
        assert!(!nav.redirects.iter().any(|r| r.starts_with("/authentication")));
    }

    #[test]
    fn test_signed_in_user_skips_login_page() {
        let router = Router::new(signed_in(Role::Admin));
        let nav = router.navigate("/authentication/login").unwrap();
        assert_eq!(nav.url, "/admin/dashboard");
        assert_eq!(nav.title, "Admin Dashboard");
    }

    #[test]
    fn test_unknown_admin_page_bounces_through_login_to_dashboard() {
        let router = Router::new(signed_in(Role::Admin));
        let nav = router.navigate("admin/statistics").unwrap();
        assert_eq!(nav.requested, "/admin/statistics");
        assert_eq!(
            nav.redirects,
            vec!["/authentication/login".to_string(), "/admin/dashboard".to_string()]
        );
    }

    #[test]
    fn test_shop_owner_enters_own_pages() {
        let router = Router::new(signed_in(Role::Shop));
        let nav = router.navigate("/shop/products").unwrap();
        assert!(!nav.was_redirected());
        assert_eq!(nav.breadcrumb[1].title, "Products");
    }

    #[test]
    fn test_after_sign_in_prefers_return_url() {
        let router = Router::new(signed_in(Role::Shop));
        assert_eq!(router.after_sign_in(None).unwrap().url, "/shop/dashboard");
        assert_eq!(
            router.after_sign_in(Some("/shop/orders")).unwrap().url,
            "/shop/orders"
        );
    }

    #[test]
    fn test_demo_pages_need_any_session() {
        let router = Router::new(signed_in(Role::User));
        assert_eq!(router.navigate("/demo").unwrap().url, "/demo/starter");
    }
}
