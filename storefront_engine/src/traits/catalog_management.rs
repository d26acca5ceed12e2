use thiserror::Error;

use crate::db_types::{DeliveryLocation, Product, Shillings};

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

/// Read access to the parts of the catalog that the order pipeline depends on. Catalog editing is handled elsewhere;
/// the insert methods exist so that stores can be seeded.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;

    /// Products with the given ids. Ids that are not in the catalog are silently skipped.
    async fn fetch_products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, CatalogError>;

    async fn fetch_delivery_locations(&self) -> Result<Vec<DeliveryLocation>, CatalogError>;

    async fn fetch_delivery_location(&self, id: i64) -> Result<Option<DeliveryLocation>, CatalogError>;

    /// Inserts the product, or replaces it if one with the same id exists.
    async fn upsert_product(&self, product: Product) -> Result<Product, CatalogError>;

    async fn insert_delivery_location(&self, name: &str, fee: Shillings) -> Result<DeliveryLocation, CatalogError>;
}
