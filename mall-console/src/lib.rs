pub mod config;
pub mod error;
pub mod models;
pub mod nav;
pub mod routing;
pub mod services;
pub mod session;
pub mod startup;
pub mod utils;

use routing::Router;
use services::{
    admin_api::AdminApi, api_client::ApiClient, auth_client::AuthClient, buyer_api::BuyerApi,
    shop_api::ShopApi,
};
use session::Session;
use std::sync::Arc;

/// Shared application state: one session, and the clients that read and
/// write it.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub api: Arc<ApiClient>,
    pub auth: Arc<AuthClient>,
    pub router: Arc<Router>,
}

impl AppState {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let session = api.session().clone();
        Self {
            auth: Arc::new(AuthClient::new(api.clone())),
            router: Arc::new(Router::new(session.clone())),
            session,
            api,
        }
    }

    pub fn admin_api(&self) -> AdminApi {
        AdminApi::new(self.api.clone())
    }

    pub fn shop_api(&self) -> ShopApi {
        ShopApi::new(self.api.clone())
    }

    pub fn buyer_api(&self) -> BuyerApi {
        BuyerApi::new(self.api.clone())
    }
}
