pub mod admin_api;
pub mod api_client;
pub mod auth_client;
pub mod buyer_api;
pub mod shop_api;

pub const CATEGORIES_PATH: &str = "/categories";
pub const SHOPS_PATH: &str = "/shops";
pub const PRODUCTS_PATH: &str = "/products";
pub const MY_PRODUCTS_PATH: &str = "/products/my";

pub(crate) fn shop_path(id: &str) -> String {
    format!("{}/{}", SHOPS_PATH, urlencoding::encode(id))
}

pub(crate) fn product_path(id: &str) -> String {
    format!("{}/{}", PRODUCTS_PATH, urlencoding::encode(id))
}

pub(crate) fn product_status_path(id: &str) -> String {
    format!("{}/status", product_path(id))
}
