//! Catalog reads: `GET /products`, `GET /products/:id`.

use std::sync::Arc;

use mangaverse_core::ProductId;
use tracing::{debug, instrument};

use super::types::Product;
use super::{ApiClient, ApiError, CacheValue, not_found_as};

impl ApiClient {
    /// List the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let cache_key = "products".to_string();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product list");
            return Ok(products.as_ref().clone());
        }

        let products: Vec<Product> = self.send(self.get(&["products"])?).await?;
        debug!(count = products.len(), "fetched product list");

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(Arc::new(products.clone())))
            .await;

        Ok(products)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids, or another error if the
    /// request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(product.as_ref().clone());
        }

        let product: Product = self
            .send(self.get(&["products", id.as_str()])?)
            .await
            .map_err(|e| not_found_as(e, || format!("product {id}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Arc::new(product.clone())))
            .await;

        Ok(product)
    }
}
