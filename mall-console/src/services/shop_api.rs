use serde::Serialize;
use std::sync::Arc;

use super::api_client::ApiClient;
use super::{product_path, product_status_path, CATEGORIES_PATH, MY_PRODUCTS_PATH, PRODUCTS_PATH};
use crate::error::ClientError;
use crate::models::catalog::{Category, Product, ProductPayload, ProductStatus, ProductStatusUpdate};
use crate::models::{Envelope, Paginated, SearchParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopStats {
    pub product_count: u64,
    pub published_count: u64,
    pub draft_count: u64,
}

/// Calls available to the SHOP role: its own catalogue.
pub struct ShopApi {
    api: Arc<ApiClient>,
}

impl ShopApi {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        let categories: Envelope<Vec<Category>> =
            self.api.get(CATEGORIES_PATH, &SearchParams::default()).await?;
        Ok(categories.into_inner())
    }

    pub async fn my_products(&self, params: &SearchParams) -> Result<Paginated<Product>, ClientError> {
        self.api.get_list(MY_PRODUCTS_PATH, params).await
    }

    pub async fn product(&self, id: &str) -> Result<Product, ClientError> {
        let product: Envelope<Product> =
            self.api.get(&product_path(id), &SearchParams::default()).await?;
        Ok(product.into_inner())
    }

    pub async fn create_product(&self, payload: &ProductPayload) -> Result<Product, ClientError> {
        let product: Envelope<Product> = self.api.post(PRODUCTS_PATH, payload).await?;
        let product = product.into_inner();
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: &str,
        payload: &ProductPayload,
    ) -> Result<Product, ClientError> {
        let product: Envelope<Product> = self.api.put(&product_path(id), payload).await?;
        Ok(product.into_inner())
    }

    pub async fn update_status(&self, id: &str, status: ProductStatus) -> Result<Product, ClientError> {
        let body = ProductStatusUpdate {
            is_available: status,
        };
        let product: Envelope<Product> = self.api.patch(&product_status_path(id), &body).await?;
        tracing::info!(product_id = id, status = %status, "Product status changed");
        Ok(product.into_inner())
    }

    pub async fn publish(&self, id: &str) -> Result<Product, ClientError> {
        self.update_status(id, ProductStatus::Published).await
    }

    pub async fn unpublish(&self, id: &str) -> Result<Product, ClientError> {
        self.update_status(id, ProductStatus::Draft).await
    }

    pub async fn deactivate(&self, id: &str) -> Result<Product, ClientError> {
        self.update_status(id, ProductStatus::Inactive).await
    }

    /// Soft delete: the backend stamps `deletedAt`.
    pub async fn delete_product(&self, id: &str) -> Result<(), ClientError> {
        self.api.delete(&product_path(id)).await?;
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }

    pub async fn dashboard_stats(&self) -> Result<ShopStats, ClientError> {
        let probe = SearchParams::default().page(1).limit(1);
        let published = probe.clone().filter("isAvailable", ProductStatus::Published);
        let draft = probe.clone().filter("isAvailable", ProductStatus::Draft);
        let (all, published, draft) = tokio::try_join!(
            self.my_products(&probe),
            self.my_products(&published),
            self.my_products(&draft),
        )?;

        Ok(ShopStats {
            product_count: all.pagination.total_items,
            published_count: published.pagination.total_items,
            draft_count: draft.pagination.total_items,
        })
    }
}
