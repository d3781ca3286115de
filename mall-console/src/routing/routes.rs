use serde::Serialize;

use super::guards::Guard;
use crate::models::LOGIN_ROUTE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub path: &'static str,
    pub title: &'static str,
    pub breadcrumb: Vec<Crumb>,
}

/// A top-level path segment, the guards protecting it, and its pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub segment: &'static str,
    pub guards: Vec<Guard>,
    pub default_page: &'static str,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    Page { section: &'a Section, page: &'a Page },
    Redirect(String),
}

/// Every navigable path of the console.
#[derive(Debug, Clone)]
pub struct RouteTable {
    sections: Vec<Section>,
    /// Top-level paths that always redirect.
    aliases: Vec<(&'static str, &'static str)>,
    fallback: &'static str,
}

fn page(
    section: &'static str,
    section_url: &'static str,
    path: &'static str,
    title: &'static str,
    crumb: &'static str,
) -> Page {
    Page {
        path,
        title,
        breadcrumb: vec![
            Crumb {
                title: section,
                url: Some(section_url),
            },
            Crumb {
                title: crumb,
                url: None,
            },
        ],
    }
}

impl RouteTable {
    pub fn standard() -> Self {
        let sections = vec![
            Section {
                segment: "authentication",
                guards: vec![Guard::NoAuth],
                default_page: "login",
                pages: vec![
                    page("Account", "/authentication", "login", "Sign In", "Sign In"),
                    page("Account", "/authentication", "register", "Create Account", "Register"),
                ],
            },
            Section {
                segment: "admin",
                guards: vec![Guard::Auth, Guard::admin()],
                default_page: "dashboard",
                pages: vec![
                    page("Admin", "/admin", "dashboard", "Admin Dashboard", "Dashboard"),
                    page("Admin", "/admin", "shops", "Manage Shops", "Shops"),
                    page("Admin", "/admin", "users", "Manage Users", "Users"),
                    page("Admin", "/admin", "reports", "Reports", "Reports"),
                ],
            },
            Section {
                segment: "shop",
                guards: vec![Guard::Auth, Guard::shop()],
                default_page: "dashboard",
                pages: vec![
                    page("Shop", "/shop", "dashboard", "Shop Dashboard", "Dashboard"),
                    page("Shop", "/shop", "products", "Products", "Products"),
                    page("Shop", "/shop", "orders", "Orders", "Orders"),
                    page("Shop", "/shop", "inventory", "Inventory", "Inventory"),
                    page("Shop", "/shop", "promotions", "Promotions", "Promotions"),
                ],
            },
            Section {
                segment: "user",
                guards: vec![Guard::Auth, Guard::user()],
                default_page: "dashboard",
                pages: vec![
                    page("Home", "/user", "dashboard", "User Dashboard", "Dashboard"),
                    page("Home", "/user", "shops", "Browse Shops", "Shops"),
                    page("Home", "/user", "products", "Browse Products", "Products"),
                    page("Home", "/user", "categories", "Categories", "Categories"),
                    page("Home", "/user", "orders", "My Orders", "Orders"),
                    page("Home", "/user", "profile", "My Profile", "Profile"),
                ],
            },
            Section {
                segment: "demo",
                guards: vec![Guard::Auth],
                default_page: "starter",
                pages: vec![
                    page("Demo", "/demo", "starter", "Starter", "Starter"),
                    page("Demo", "/demo", "ui-components", "UI Components", "UI Components"),
                    page("Demo", "/demo", "extra", "Extra", "Extra"),
                ],
            },
        ];

        Self {
            sections,
            aliases: vec![("", LOGIN_ROUTE), ("dashboard", LOGIN_ROUTE)],
            fallback: LOGIN_ROUTE,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Matches a path (query string ignored) against the table.
    pub fn resolve(&self, url: &str) -> Resolved<'_> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => self.alias("").unwrap_or_else(|| self.fallback()),
            [segment] => {
                if let Some(section) = self.section(segment) {
                    return Resolved::Redirect(format!("/{}/{}", section.segment, section.default_page));
                }
                self.alias(segment).unwrap_or_else(|| self.fallback())
            }
            [segment, child] => self
                .section(segment)
                .and_then(|section| {
                    section
                        .pages
                        .iter()
                        .find(|p| p.path == *child)
                        .map(|page| Resolved::Page { section, page })
                })
                .unwrap_or_else(|| self.fallback()),
            _ => self.fallback(),
        }
    }

    fn section(&self, segment: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.segment == segment)
    }

    fn alias(&self, segment: &str) -> Option<Resolved<'_>> {
        self.aliases
            .iter()
            .find(|(from, _)| *from == segment)
            .map(|(_, to)| Resolved::Redirect(to.to_string()))
    }

    fn fallback(&self) -> Resolved<'_> {
        Resolved::Redirect(self.fallback.to_string())
    }
}
