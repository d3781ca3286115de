use crate::models::{default_route_for, Role, LOGIN_ROUTE};
use crate::session::SessionSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(String),
}

/// What a guard gets to look at. Built from already resolved local state,
/// so evaluation never waits on the network.
#[derive(Debug, Clone, Copy)]
pub struct GuardContext<'a> {
    pub session: &'a SessionSnapshot,
    pub has_token: bool,
    /// Path (and query) the caller tried to enter.
    pub requested_url: &'a str,
}

impl GuardContext<'_> {
    /// A cached user only counts together with a stored token.
    pub fn is_signed_in(&self) -> bool {
        self.session.is_authenticated() && self.has_token
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// Signed in, else sign-in page with `returnUrl`.
    Auth,
    /// Signed out (sign-in and registration pages), else own dashboard.
    NoAuth,
    /// Signed in with one of the roles, else own dashboard.
    Role(Vec<Role>),
}

impl Guard {
    pub fn admin() -> Self {
        Guard::Role(vec![Role::Admin])
    }

    pub fn shop() -> Self {
        Guard::Role(vec![Role::Shop])
    }

    pub fn user() -> Self {
        Guard::Role(vec![Role::User])
    }

    pub fn admin_or_shop() -> Self {
        Guard::Role(vec![Role::Admin, Role::Shop])
    }

    pub fn admin_or_user() -> Self {
        Guard::Role(vec![Role::Admin, Role::User])
    }

    pub fn check(&self, ctx: &GuardContext<'_>) -> Decision {
        match self {
            Guard::Auth => {
                if ctx.is_signed_in() {
                    Decision::Allow
                } else {
                    Decision::Redirect(login_redirect(ctx.requested_url))
                }
            }
            Guard::NoAuth => {
                if ctx.is_signed_in() {
                    Decision::Redirect(default_route_for(ctx.session.role()).to_string())
                } else {
                    Decision::Allow
                }
            }
            Guard::Role(allowed) => {
                if !ctx.is_signed_in() {
                    return Decision::Redirect(login_redirect(ctx.requested_url));
                }
                if ctx.session.has_any_role(allowed) {
                    Decision::Allow
                } else {
                    Decision::Redirect(default_route_for(ctx.session.role()).to_string())
                }
            }
        }
    }
}

/// Runs guards first to last and stops at the first redirect.
pub fn evaluate(guards: &[Guard], ctx: &GuardContext<'_>) -> Decision {
    for guard in guards {
        if let Decision::Redirect(target) = guard.check(ctx) {
            return Decision::Redirect(target);
        }
    }
    Decision::Allow
}

/// Sign-in page that sends the user back to `return_url` afterwards.
pub fn login_redirect(return_url: &str) -> String {
    if return_url.is_empty() || return_url == "/" {
        return LOGIN_ROUTE.to_string();
    }
    format!(
        "{}?returnUrl={}",
        LOGIN_ROUTE,
        urlencoding::encode(return_url)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn snapshot(role: Option<Role>) -> SessionSnapshot {
        SessionSnapshot {
            user: role.map(|role| User {
                id: "u-1".to_string(),
                email: "someone@mall.test".to_string(),
                role,
                profile: None,
                shop_id: None,
                is_active: None,
                created_at: None,
                updated_at: None,
            }),
            is_loading: false,
            generation: 1,
        }
    }

    fn ctx<'a>(session: &'a SessionSnapshot, has_token: bool, url: &'a str) -> GuardContext<'a> {
        GuardContext {
            session,
            has_token,
            requested_url: url,
        }
    }

    #[test]
    fn test_auth_guard_redirects_with_return_url() {
        let session = snapshot(None);
        let decision = Guard::Auth.check(&ctx(&session, false, "/admin/shops"));
        assert_eq!(
            decision,
            Decision::Redirect("/authentication/login?returnUrl=%2Fadmin%2Fshops".to_string())
        );
    }

    #[test]
    fn test_auth_guard_requires_token_as_well_as_user() {
        let session = snapshot(Some(Role::User));
        assert_eq!(
            Guard::Auth.check(&ctx(&session, true, "/user/orders")),
            Decision::Allow
        );
        assert!(matches!(
            Guard::Auth.check(&ctx(&session, false, "/user/orders")),
            Decision::Redirect(_)
        ));
    }

    #[test]
    fn test_no_auth_sends_signed_in_users_to_their_dashboard() {
        let session = snapshot(Some(Role::Shop));
        assert_eq!(
            Guard::NoAuth.check(&ctx(&session, true, "/authentication/login")),
            Decision::Redirect("/shop/dashboard".to_string())
        );
    }

    #[test]
    fn test_auth_and_no_auth_are_mutually_exclusive() {
        let cases = [
            (None, false),
            (None, true),
            (Some(Role::Admin), false),
            (Some(Role::Admin), true),
            (Some(Role::User), true),
        ];
        for (role, has_token) in cases {
            let session = snapshot(role);
            let c = ctx(&session, has_token, "/demo/starter");
            let auth = Guard::Auth.check(&c) == Decision::Allow;
            let no_auth = Guard::NoAuth.check(&c) == Decision::Allow;
            assert_ne!(auth, no_auth, "role={:?} has_token={}", role, has_token);
        }
    }

    #[test]
    fn test_admin_guard_sends_buyer_to_buyer_dashboard() {
        let session = snapshot(Some(Role::User));
        let decision = Guard::admin().check(&ctx(&session, true, "/admin/dashboard"));
        assert_eq!(decision, Decision::Redirect("/user/dashboard".to_string()));
    }

    #[test]
    fn test_role_guard_sends_anonymous_to_login() {
        let session = snapshot(None);
        let decision = Guard::shop().check(&ctx(&session, false, "/shop/products"));
        assert_eq!(
            decision,
            Decision::Redirect("/authentication/login?returnUrl=%2Fshop%2Fproducts".to_string())
        );
    }

    #[test]
    fn test_combined_role_guards() {
        let admin = snapshot(Some(Role::Admin));
        let shop = snapshot(Some(Role::Shop));
        let buyer = snapshot(Some(Role::User));
        assert_eq!(
            Guard::admin_or_shop().check(&ctx(&shop, true, "/x")),
            Decision::Allow
        );
        assert_eq!(
            Guard::admin_or_user().check(&ctx(&admin, true, "/x")),
            Decision::Allow
        );
        assert_eq!(
            Guard::admin_or_shop().check(&ctx(&buyer, true, "/x")),
            Decision::Redirect("/user/dashboard".to_string())
        );
    }

    #[test]
    fn test_evaluation_short_circuits_on_first_redirect() {
        let session = snapshot(None);
        let guards = [Guard::Auth, Guard::admin()];
        let decision = evaluate(&guards, &ctx(&session, false, "/admin"));
        assert_eq!(
            decision,
            Decision::Redirect("/authentication/login?returnUrl=%2Fadmin".to_string())
        );
        assert_eq!(evaluate(&[], &ctx(&session, false, "/")), Decision::Allow);
    }

    #[test]
    fn test_root_return_url_is_dropped() {
        assert_eq!(login_redirect("/"), "/authentication/login");
    }
}
