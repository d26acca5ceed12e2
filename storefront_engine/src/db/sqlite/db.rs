use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::{catalog, db_url, new_pool, orders, SqliteDatabaseError};
use crate::{
    db_types::{DeliveryLocation, NewOrder, Order, OrderNumber, OrderStatusType, Product, Shillings},
    order_objects::OrderQueryFilter,
    traits::{CatalogError, CatalogManagement, OrderManagement, OrderManagementError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using `SF_DATABASE_URL` for the connection.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl OrderManagement for SqliteDatabase {
    /// The order and its items are written in a single transaction.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let id = orders::insert_order(order, &mut tx).await?;
        let order = orders::fetch_order_by_id(id, &mut tx)
            .await?
            .ok_or_else(|| SqliteDatabaseError::QueryError(format!("Order #{id} vanished after insert")))?;
        tx.commit().await?;
        Ok(order)
    }

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_id(id, &mut conn).await?)
    }

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_number(number, &mut conn).await?)
    }

    async fn fetch_orders_by_phone(&self, phone: &str) -> Result<Vec<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders_by_phone(phone, &mut conn).await?)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::search_orders(query, &mut conn).await?)
    }

    async fn update_order_status(
        &self,
        id: i64,
        status: OrderStatusType,
    ) -> Result<(OrderStatusType, Order), OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let old = orders::update_order_status(id, status, &mut tx).await?.ok_or(SqliteDatabaseError::OrderNotFound(id))?;
        let order = orders::fetch_order_by_id(id, &mut tx).await?.ok_or(SqliteDatabaseError::OrderNotFound(id))?;
        tx.commit().await?;
        trace!("🗃️ Order #{id} status written: {old} -> {status}");
        Ok((old, order))
    }

    async fn delete_order(&self, id: i64) -> Result<bool, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let deleted = orders::delete_order(id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn count_orders_with_status(&self, status: OrderStatusType) -> Result<i64, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::count_orders_with_status(status, &mut conn).await?)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::fetch_products(&mut conn).await?)
    }

    async fn fetch_products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::fetch_products_by_ids(ids, &mut conn).await?)
    }

    async fn fetch_delivery_locations(&self) -> Result<Vec<DeliveryLocation>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::fetch_delivery_locations(&mut conn).await?)
    }

    async fn fetch_delivery_location(&self, id: i64) -> Result<Option<DeliveryLocation>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::fetch_delivery_location(id, &mut conn).await?)
    }

    async fn upsert_product(&self, product: Product) -> Result<Product, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::upsert_product(product, &mut conn).await?)
    }

    async fn insert_delivery_location(&self, name: &str, fee: Shillings) -> Result<DeliveryLocation, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::insert_delivery_location(name, fee, &mut conn).await?)
    }
}
