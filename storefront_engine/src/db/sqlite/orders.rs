use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{
        CustomerDetails,
        MpesaDetails,
        NewOrder,
        Order,
        OrderItem,
        OrderNumber,
        OrderStatusType,
        Shillings,
    },
    helpers::phone_key,
    order_objects::OrderQueryFilter,
};

const ORDER_COLUMNS: &str = r#"
    SELECT
        o.id,
        o.order_number,
        o.customer_name,
        o.customer_phone,
        o.customer_email,
        o.delivery_location_id,
        l.name AS delivery_location,
        o.delivery_address,
        o.notes,
        o.subtotal,
        o.delivery_fee,
        o.total,
        o.status,
        o.channel,
        o.payment_method,
        o.mpesa_code,
        o.mpesa_phone,
        o.mpesa_message,
        o.created_at,
        o.updated_at
    FROM orders o
    LEFT JOIN delivery_locations l ON o.delivery_location_id = l.id
"#;

const NEWEST_FIRST: &str = " ORDER BY o.created_at DESC, o.id DESC";

const ITEM_QUERY_CHUNK: usize = 500;

#[derive(Debug, Clone, FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    delivery_location_id: Option<i64>,
    delivery_location: Option<String>,
    delivery_address: String,
    notes: Option<String>,
    subtotal: i64,
    delivery_fee: i64,
    total: i64,
    status: String,
    channel: String,
    payment_method: String,
    mpesa_code: Option<String>,
    mpesa_phone: Option<String>,
    mpesa_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, SqliteDatabaseError> {
        let conversion = |e: crate::db_types::ConversionError| SqliteDatabaseError::Conversion(e.to_string());
        Ok(Order {
            id: self.id,
            order_number: OrderNumber(self.order_number),
            customer: CustomerDetails { name: self.customer_name, phone: self.customer_phone, email: self.customer_email },
            delivery_location_id: self.delivery_location_id,
            delivery_location: self.delivery_location,
            delivery_address: self.delivery_address,
            notes: self.notes,
            items,
            subtotal: Shillings::from(self.subtotal),
            delivery_fee: Shillings::from(self.delivery_fee),
            total: Shillings::from(self.total),
            status: self.status.parse().map_err(conversion)?,
            channel: self.channel.parse().map_err(conversion)?,
            payment_method: self.payment_method.parse().map_err(conversion)?,
            mpesa: MpesaDetails { code: self.mpesa_code, phone: self.mpesa_phone, raw_message: self.mpesa_message },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct OrderItemRow {
    order_id: i64,
    product_id: i64,
    product_name: String,
    unit_price: i64,
    image: Option<String>,
    variation_label: Option<String>,
    quantity: i64,
    line_total: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.product_name,
            unit_price: Shillings::from(row.unit_price),
            image: row.image,
            variation_label: row.variation_label,
            quantity: row.quantity,
            line_total: Shillings::from(row.line_total),
        }
    }
}

/// Inserts the order and its items. This is not atomic on its own. Call it inside a transaction and pass `&mut *tx`
/// as the connection.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let now = Utc::now();
    let number = order.order_number.as_str().to_string();
    let phone = phone_key(&order.customer.phone);
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO orders (
                order_number,
                customer_name,
                customer_phone,
                customer_phone_key,
                customer_email,
                delivery_location_id,
                delivery_address,
                notes,
                subtotal,
                delivery_fee,
                total,
                status,
                channel,
                payment_method,
                mpesa_code,
                mpesa_phone,
                mpesa_message,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING id;
        "#,
    )
    .bind(&number)
    .bind(order.customer.name)
    .bind(order.customer.phone)
    .bind(phone)
    .bind(order.customer.email)
    .bind(order.delivery_location_id)
    .bind(order.delivery_address)
    .bind(order.notes)
    .bind(order.subtotal.value())
    .bind(order.delivery_fee.value())
    .bind(order.total.value())
    .bind(order.status.as_str())
    .bind(order.channel.as_str())
    .bind(order.payment_method.as_str())
    .bind(order.mpesa.code)
    .bind(order.mpesa.phone)
    .bind(order.mpesa.raw_message)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| SqliteDatabaseError::from_insert(e, &number))?;
    for item in order.items {
        sqlx::query(
            r#"
                INSERT INTO order_items (
                    order_id, product_id, product_name, unit_price, image, variation_label, quantity, line_total
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
            "#,
        )
        .bind(id)
        .bind(item.product_id)
        .bind(item.name)
        .bind(item.unit_price.value())
        .bind(item.image)
        .bind(item.variation_label)
        .bind(item.quantity)
        .bind(item.line_total.value())
        .execute(&mut *conn)
        .await?;
    }
    debug!("🗃️ Order {number} saved with id {id}");
    Ok(id)
}

/// Loads the items of every order in `rows` and assembles the orders, keeping the row order.
///
/// Items are fetched `ITEM_QUERY_CHUNK` orders at a time so a large result set stays under SQLite's bind limit.
async fn with_items(rows: Vec<OrderRow>, conn: &mut SqliteConnection) -> Result<Vec<Order>, SqliteDatabaseError> {
    let mut grouped = HashMap::<i64, Vec<OrderItem>>::new();
    for chunk in rows.chunks(ITEM_QUERY_CHUNK) {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT order_id, product_id, product_name, unit_price, image, variation_label, quantity, line_total FROM \
             order_items WHERE order_id IN (",
        );
        let mut ids = builder.separated(", ");
        for row in chunk {
            ids.push_bind(row.id);
        }
        builder.push(") ORDER BY id ASC");
        let items = builder.build_query_as::<OrderItemRow>().fetch_all(&mut *conn).await?;
        for item in items {
            grouped.entry(item.order_id).or_default().push(item.into());
        }
    }
    rows.into_iter()
        .map(|row| {
            let items = grouped.remove(&row.id).unwrap_or_default();
            row.into_order(items)
        })
        .collect()
}

async fn first_order(
    mut builder: QueryBuilder<'_, Sqlite>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    builder.push(" LIMIT 1");
    let row = builder.build_query_as::<OrderRow>().fetch_optional(&mut *conn).await?;
    let orders = with_items(row.into_iter().collect(), conn).await?;
    Ok(orders.into_iter().next())
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::<Sqlite>::new(ORDER_COLUMNS);
    builder.push(" WHERE o.id = ");
    builder.push_bind(id);
    first_order(builder, conn).await
}

/// The order number column is case-insensitive, so `ord-260205-0417` finds `ORD-260205-0417`.
pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::<Sqlite>::new(ORDER_COLUMNS);
    builder.push(" WHERE o.order_number = ");
    builder.push_bind(number.as_str().to_string());
    first_order(builder, conn).await
}

/// `phone` is matched against the key stored at insert time, not the number as the customer typed it.
pub async fn fetch_orders_by_phone(phone: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::<Sqlite>::new(ORDER_COLUMNS);
    builder.push(" WHERE o.customer_phone_key = ");
    builder.push_bind(phone.to_string());
    builder.push(NEWEST_FIRST);
    let rows = builder.build_query_as::<OrderRow>().fetch_all(&mut *conn).await?;
    with_items(rows, conn).await
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at`, newest first.
pub async fn search_orders(
    query: OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::<Sqlite>::new(ORDER_COLUMNS);
    if !query.is_empty() {
        builder.push(" WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(statuses) = query.status.filter(|s| !s.is_empty()) {
        where_clause.push("o.status IN (");
        for (i, status) in statuses.iter().enumerate() {
            if i > 0 {
                where_clause.push_unseparated(", ");
            }
            where_clause.push_bind_unseparated(status.as_str());
        }
        where_clause.push_unseparated(")");
    }
    if let Some(channel) = query.channel {
        where_clause.push("o.channel = ");
        where_clause.push_bind_unseparated(channel.as_str());
    }
    if let Some(since) = query.since {
        where_clause.push("datetime(o.created_at) >= datetime(");
        where_clause.push_bind_unseparated(since);
        where_clause.push_unseparated(")");
    }
    if let Some(until) = query.until {
        where_clause.push("datetime(o.created_at) < datetime(");
        where_clause.push_bind_unseparated(until);
        where_clause.push_unseparated(")");
    }
    if let Some(search) = query.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        where_clause.push("(o.order_number LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR o.customer_name LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR o.customer_phone LIKE ");
        where_clause.push_bind_unseparated(pattern);
        where_clause.push_unseparated(")");
    }
    builder.push(NEWEST_FIRST);
    trace!("🗃️ Executing query: {}", builder.sql());
    let rows = builder.build_query_as::<OrderRow>().fetch_all(&mut *conn).await?;
    trace!("🗃️ Result of search_orders: {}", rows.len());
    with_items(rows, conn).await
}

/// Overwrites the status. Returns the previous status, or `None` if the order does not exist.
pub(crate) async fn update_order_status(
    id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderStatusType>, SqliteDatabaseError> {
    let old: Option<String> =
        sqlx::query_scalar("SELECT status FROM orders WHERE id = $1").bind(id).fetch_optional(&mut *conn).await?;
    let Some(old) = old else {
        return Ok(None);
    };
    let old = old.parse::<OrderStatusType>().map_err(|e| SqliteDatabaseError::Conversion(e.to_string()))?;
    sqlx::query("UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(Some(old))
}

/// Deletes the order and its items. Returns `false` if there was nothing to delete.
pub(crate) async fn delete_order(id: i64, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    sqlx::query("DELETE FROM order_items WHERE order_id = $1").bind(id).execute(&mut *conn).await?;
    let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_orders_with_status(
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<i64, SqliteDatabaseError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = $1")
        .bind(status.as_str())
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}
