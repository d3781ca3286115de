use std::sync::Arc;

use crate::config::{ApiSettings, Settings};
use crate::error::ClientError;
use crate::services::api_client::ApiClient;
use crate::session::{FileStorage, Session, TokenStore};
use crate::AppState;

/// Opens persisted storage, runs the startup session check and wires the
/// clients together.
pub fn build_state(settings: &Settings) -> Result<AppState, ClientError> {
    let storage = FileStorage::open(&settings.storage.path);
    tracing::debug!(path = %settings.storage.path.display(), "Session storage opened");
    build_state_with_store(&settings.api, TokenStore::new(storage))
}

pub fn build_state_with_store(api: &ApiSettings, store: TokenStore) -> Result<AppState, ClientError> {
    let session = Arc::new(Session::restore(store));
    let api = Arc::new(ApiClient::new(api, session)?);

    tracing::info!(
        base_url = %api.base_url(),
        signed_in = api.session().is_authenticated(),
        "Mall console ready"
    );
    Ok(AppState::new(api))
}
