use serde::Serialize;
use std::sync::Arc;

use super::api_client::ApiClient;
use super::{product_path, shop_path, CATEGORIES_PATH, PRODUCTS_PATH, SHOPS_PATH};
use crate::error::ClientError;
use crate::models::catalog::{Category, Product, ProductFilter, Shop};
use crate::models::{Envelope, Paginated, SearchParams};

const FEATURED_SHOPS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerDashboard {
    pub featured_shops: Vec<Shop>,
    pub categories: Vec<Category>,
}

/// Calls available to the USER (buyer) role. The backend only returns
/// published products here.
pub struct BuyerApi {
    api: Arc<ApiClient>,
}

impl BuyerApi {
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

    pub async fn products_by_price(
        &self,
        min_price: Option<f64>,
        max_price: Option<f64>,
        params: SearchParams,
    ) -> Result<Paginated<Product>, ClientError> {
        let filter = ProductFilter {
            min_price,
            max_price,
            ..ProductFilter::default()
        };
        self.products(params, &filter).await
    }

    pub async fn dashboard(&self) -> Result<BuyerDashboard, ClientError> {
        let featured = SearchParams::default().page(1).limit(FEATURED_SHOPS);
        let (shops, categories) = tokio::try_join!(self.shops(&featured), self.categories())?;

        Ok(BuyerDashboard {
            featured_shops: shops.data,
            categories,
        })
    }
}
