use log::debug;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{DeliveryLocation, Product, Shillings},
};

#[derive(Debug, Clone, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: i64,
    image: Option<String>,
    category: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self { id: row.id, name: row.name, price: Shillings::from(row.price), image: row.image, category: row.category }
    }
}

#[derive(Debug, Clone, FromRow)]
struct LocationRow {
    id: i64,
    name: String,
    fee: i64,
}

impl From<LocationRow> for DeliveryLocation {
    fn from(row: LocationRow) -> Self {
        Self { id: row.id, name: row.name, fee: Shillings::from(row.fee) }
    }
}

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, SqliteDatabaseError> {
    let rows = sqlx::query_as::<_, ProductRow>("SELECT id, name, price, image, category FROM products ORDER BY id")
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

pub async fn fetch_products_by_ids(
    ids: &[i64],
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, SqliteDatabaseError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT id, name, price, image, category FROM products WHERE id IN (");
    let mut list = builder.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    builder.push(") ORDER BY id");
    let rows = builder.build_query_as::<ProductRow>().fetch_all(conn).await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

pub async fn upsert_product(product: Product, conn: &mut SqliteConnection) -> Result<Product, SqliteDatabaseError> {
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
            INSERT INTO products (id, name, price, image, category) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                price = excluded.price,
                image = excluded.image,
                category = excluded.category
            RETURNING id, name, price, image, category;
        "#,
    )
    .bind(product.id)
    .bind(product.name)
    .bind(product.price.value())
    .bind(product.image)
    .bind(product.category)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Product #{} ({}) saved", row.id, row.name);
    Ok(row.into())
}

pub async fn fetch_delivery_locations(conn: &mut SqliteConnection) -> Result<Vec<DeliveryLocation>, SqliteDatabaseError> {
    let rows = sqlx::query_as::<_, LocationRow>("SELECT id, name, fee FROM delivery_locations ORDER BY name")
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().map(DeliveryLocation::from).collect())
}

pub async fn fetch_delivery_location(
    id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<DeliveryLocation>, SqliteDatabaseError> {
    let row = sqlx::query_as::<_, LocationRow>("SELECT id, name, fee FROM delivery_locations WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(DeliveryLocation::from))
}

pub async fn insert_delivery_location(
    name: &str,
    fee: Shillings,
    conn: &mut SqliteConnection,
) -> Result<DeliveryLocation, SqliteDatabaseError> {
    let row = sqlx::query_as::<_, LocationRow>(
        "INSERT INTO delivery_locations (name, fee) VALUES ($1, $2) RETURNING id, name, fee;",
    )
    .bind(name)
    .bind(fee.value())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Delivery location {} added with a fee of {}", row.name, fee);
    Ok(row.into())
}
