use serde::Serialize;
use std::sync::Arc;

use super::api_client::ApiClient;
use super::{product_path, shop_path, CATEGORIES_PATH, PRODUCTS_PATH, SHOPS_PATH};
use crate::error::ClientError;
use crate::models::catalog::{Category, Product, ProductFilter, ProductStatus, Shop};
use crate::models::{Envelope, Paginated, SearchParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_shops: u64,
    pub total_products: u64,
    pub total_categories: u64,
}

/// Calls available to the ADMIN role.
pub struct AdminApi {
    api: Arc<ApiClient>,
}

impl AdminApi {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        let categories: Envelope<Vec<Category>> =
            self.api.get(CATEGORIES_PATH, &SearchParams::default()).await?;
        Ok(categories.into_inner())
    }

    pub async fn shops(&self, params: &SearchParams) -> Result<Paginated<Shop>, ClientError> {
        self.api.get_list(SHOPS_PATH, params).await
    }

    pub async fn shop(&self, id: &str) -> Result<Shop, ClientError> {
        let shop: Envelope<Shop> = self.api.get(&shop_path(id), &SearchParams::default()).await?;
        Ok(shop.into_inner())
    }

    /// Every product regardless of status.
    pub async fn products(
        &self,
        params: SearchParams,
        filter: &ProductFilter,
    ) -> Result<Paginated<Product>, ClientError> {
        self.api.get_list(PRODUCTS_PATH, &filter.apply(params)).await
    }

    pub async fn product(&self, id: &str) -> Result<Product, ClientError> {
        let product: Envelope<Product> =
            self.api.get(&product_path(id), &SearchParams::default()).await?;
        Ok(product.into_inner())
    }

    pub async fn products_by_shop(
        &self,
        shop_id: &str,
        params: SearchParams,
    ) -> Result<Paginated<Product>, ClientError> {
        let filter = ProductFilter {
            shop_id: Some(shop_id.to_string()),
            ..ProductFilter::default()
        };
        self.products(params, &filter).await
    }

    pub async fn products_by_category(
        &self,
        category_id: &str,
        params: SearchParams,
    ) -> Result<Paginated<Product>, ClientError> {
        let filter = ProductFilter {
            category_id: Some(category_id.to_string()),
            ..ProductFilter::default()
        };
        self.products(params, &filter).await
    }

    pub async fn products_by_status(
        &self,
        status: ProductStatus,
        params: SearchParams,
    ) -> Result<Paginated<Product>, ClientError> {
        let filter = ProductFilter {
            is_available: Some(status),
            ..ProductFilter::default()
        };
        self.products(params, &filter).await
    }

    /// Totals for the admin dashboard, read from list pagination metadata.
    pub async fn dashboard_stats(&self) -> Result<AdminStats, ClientError> {
        let probe = SearchParams::default().page(1).limit(1);
        let everything = ProductFilter::default();
        let (shops, products, categories) = tokio::try_join!(
            self.shops(&probe),
            self.products(probe.clone(), &everything),
            self.categories(),
        )?;

        Ok(AdminStats {
            total_shops: shops.pagination.total_items,
            total_products: products.pagination.total_items,
            total_categories: categories.len() as u64,
        })
    }
}
