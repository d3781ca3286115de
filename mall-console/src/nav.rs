//! Per-role sidebar menus.

use serde::Serialize;

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavEntry {
    Caption {
        label: &'static str,
    },
    Link {
        label: &'static str,
        icon: &'static str,
        route: &'static str,
    },
}

const fn caption(label: &'static str) -> NavEntry {
    NavEntry::Caption { label }
}

const fn link(label: &'static str, icon: &'static str, route: &'static str) -> NavEntry {
    NavEntry::Link { label, icon, route }
}

const ADMIN_MENU: &[NavEntry] = &[
    caption("Admin Panel"),
    link("Dashboard", "solar:widget-line-duotone", "/admin/dashboard"),
    caption("Management"),
    link("Shops", "solar:shop-line-duotone", "/admin/shops"),
    link("Users", "solar:users-group-rounded-line-duotone", "/admin/users"),
    caption("Analytics"),
    link("Reports", "solar:chart-square-line-duotone", "/admin/reports"),
    link("Statistics", "solar:graph-up-line-duotone", "/admin/statistics"),
    caption("Settings"),
    link("Mall Settings", "solar:settings-line-duotone", "/admin/settings"),
];

const SHOP_MENU: &[NavEntry] = &[
    caption("Shop Panel"),
    link("Dashboard", "solar:widget-line-duotone", "/shop/dashboard"),
    caption("Store Management"),
    link("Products", "solar:box-line-duotone", "/shop/products"),
    link("Inventory", "solar:clipboard-list-line-duotone", "/shop/inventory"),
    link("Categories", "solar:folder-open-line-duotone", "/shop/categories"),
    caption("Sales"),
    link("Orders", "solar:bag-4-line-duotone", "/shop/orders"),
    link("Promotions", "solar:tag-price-line-duotone", "/shop/promotions"),
    caption("Analytics"),
    link("Sales Report", "solar:chart-line-duotone", "/shop/reports"),
];

const USER_MENU: &[NavEntry] = &[
    caption("Home"),
    link("Dashboard", "solar:home-2-line-duotone", "/user/dashboard"),
    caption("Shopping"),
    link("Browse Shops", "solar:shop-line-duotone", "/user/shops"),
    link("Browse Products", "solar:bag-smile-line-duotone", "/user/products"),
    link("Categories", "solar:widget-4-line-duotone", "/user/categories"),
    caption("My Account"),
    link("My Orders", "solar:bag-4-line-duotone", "/user/orders"),
    link("My Profile", "solar:user-circle-line-duotone", "/user/profile"),
];

pub fn menu_for(role: Role) -> &'static [NavEntry] {
    match role {
        Role::Admin => ADMIN_MENU,
        Role::Shop => SHOP_MENU,
        Role::User => USER_MENU,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes(role: Role) -> Vec<&'static str> {
        menu_for(role)
            .iter()
            .filter_map(|entry| match entry {
                NavEntry::Link { route, .. } => Some(*route),
                NavEntry::Caption { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_menus_start_with_caption_and_dashboard() {
        for role in Role::ALL {
            let menu = menu_for(role);
            assert!(matches!(menu[0], NavEntry::Caption { .. }));
            assert_eq!(routes(role)[0], role.dashboard_route());
        }
    }

    #[test]
    fn test_links_stay_inside_role_section() {
        for role in Role::ALL {
            let prefix = format!("/{}/", role.dashboard_route().split('/').nth(1).unwrap());
            assert!(routes(role).iter().all(|r| r.starts_with(&prefix)));
        }
    }

    #[test]
    fn test_entries_serialize_with_kind_tag() {
        let json = serde_json::to_value(menu_for(Role::User)[1]).unwrap();
        assert_eq!(json["kind"], "link");
        assert_eq!(json["route"], "/user/dashboard");
    }
}
