//! Commerce metrics for the staff dashboard.
//!
//! Everything here is derived on read from snapshots of the order and product collections. Nothing is stored, and
//! every function is pure: the same orders, products and `now` always give the same metrics.
//!
//! A *sale* is an order whose status is confirmed, dispatched or delivered. Pending and cancelled orders never count
//! towards revenue or the product and category rankings, but pending orders do count towards `total_orders`.
//!
//! Categories are attributed by matching the order item name against the current catalog, ignoring case. Items whose
//! product has since been renamed or deleted fall into [`OTHER_CATEGORY`]. This is a known limitation of name-based
//! attribution and historical reports will shift if products are renamed.
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Order, OrderNumber, OrderStatusType, Product, Shillings},
    helpers::time_ago,
    sf_api::pagination::{Page, Pagination},
};

/// How many monthly revenue buckets the dashboard shows.
pub const REVENUE_MONTHS: usize = 6;
pub const OTHER_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    /// Short month and two-digit year, e.g. `Feb 26`
    pub month: String,
    pub revenue: Shillings,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub name: String,
    pub sold: i64,
    pub revenue: Shillings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: String,
    pub sold: i64,
    pub revenue: Shillings,
    /// Share of units sold, rounded to the nearest whole percent
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub order_id: i64,
    pub order_number: OrderNumber,
    pub message: String,
    pub customer: String,
    pub total: Shillings,
    pub status: OrderStatusType,
    pub time_ago: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommerceMetrics {
    pub total_revenue: Shillings,
    /// Every order, whatever its status
    pub total_orders: usize,
    pub total_sales: usize,
    pub pending_orders: usize,
    pub average_order_value: Shillings,
    pub revenue_by_month: Vec<MonthlyRevenue>,
    pub top_products: Page<ProductSales>,
    pub categories: Vec<CategoryShare>,
    pub activity: Page<ActivityEntry>,
}

/// Which pages of the paginated lists to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardPages {
    pub top_products: Pagination,
    pub activity: Pagination,
}

pub fn aggregate(orders: &[Order], products: &[Product], now: DateTime<Utc>, pages: DashboardPages) -> CommerceMetrics {
    let sales = orders.iter().filter(|o| o.status.is_sale()).collect::<Vec<_>>();
    let total_revenue = sales.iter().map(|o| o.total).sum::<Shillings>();
    let average_order_value = match sales.len() as i64 {
        0 => Shillings::zero(),
        n => Shillings::from(total_revenue.value() / n),
    };
    CommerceMetrics {
        total_revenue,
        total_orders: orders.len(),
        total_sales: sales.len(),
        pending_orders: orders.iter().filter(|o| o.status == OrderStatusType::Pending).count(),
        average_order_value,
        revenue_by_month: revenue_by_month(orders, now),
        top_products: Page::paginate(top_products(orders), pages.top_products),
        categories: category_mix(orders, products),
        activity: Page::paginate(activity_feed(orders, now), pages.activity),
    }
}

/// Sale revenue bucketed by calendar month. Only the most recent [`REVENUE_MONTHS`] months that have sales are
/// returned, oldest first. With no sales at all, a single zero bucket for the current month is returned instead.
pub fn revenue_by_month(orders: &[Order], now: DateTime<Utc>) -> Vec<MonthlyRevenue> {
    let mut buckets = BTreeMap::<(i32, u32), MonthlyRevenue>::new();
    for order in orders.iter().filter(|o| o.status.is_sale()) {
        let key = (order.created_at.year(), order.created_at.month());
        let bucket = buckets.entry(key).or_insert_with(|| MonthlyRevenue {
            month: month_label(order.created_at),
            revenue: Shillings::zero(),
            orders: 0,
        });
        bucket.revenue += order.total;
        bucket.orders += 1;
    }
    if buckets.is_empty() {
        return vec![MonthlyRevenue { month: month_label(now), revenue: Shillings::zero(), orders: 0 }];
    }
    let skip = buckets.len().saturating_sub(REVENUE_MONTHS);
    buckets.into_values().skip(skip).collect()
}

fn month_label(t: DateTime<Utc>) -> String {
    t.format("%b %y").to_string()
}

/// Units sold and revenue per product name across all sale items, highest revenue first.
pub fn top_products(orders: &[Order]) -> Vec<ProductSales> {
    let mut totals = HashMap::<&str, (i64, Shillings)>::new();
    for item in orders.iter().filter(|o| o.status.is_sale()).flat_map(|o| o.items.iter()) {
        let entry = totals.entry(item.name.as_str()).or_insert((0, Shillings::zero()));
        entry.0 += item.quantity;
        entry.1 += item.line_total;
    }
    let mut result = totals
        .into_iter()
        .map(|(name, (sold, revenue))| ProductSales { name: name.to_string(), sold, revenue })
        .collect::<Vec<_>>();
    result.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));
    result
}

/// Units sold and revenue per product category, with each category's share of units sold.
pub fn category_mix(orders: &[Order], products: &[Product]) -> Vec<CategoryShare> {
    let lookup = products
        .iter()
        .filter_map(|p| p.category.as_deref().map(|c| (p.name.to_lowercase(), c)))
        .collect::<HashMap<String, &str>>();
    let mut totals = HashMap::<&str, (i64, Shillings)>::new();
    for item in orders.iter().filter(|o| o.status.is_sale()).flat_map(|o| o.items.iter()) {
        let category = lookup.get(&item.name.to_lowercase()).copied().unwrap_or(OTHER_CATEGORY);
        let entry = totals.entry(category).or_insert((0, Shillings::zero()));
        entry.0 += item.quantity;
        entry.1 += item.line_total;
    }
    let total_sold = totals.values().map(|(sold, _)| *sold).sum::<i64>();
    let mut result = totals
        .into_iter()
        .map(|(category, (sold, revenue))| CategoryShare {
            category: category.to_string(),
            sold,
            revenue,
            percentage: percentage(sold, total_sold),
        })
        .collect::<Vec<_>>();
    result.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.category.cmp(&b.category)));
    result
}

fn percentage(part: i64, whole: i64) -> u32 {
    if whole <= 0 {
        return 0;
    }
    (part as f64 * 100.0 / whole as f64).round() as u32
}

pub fn activity_message(status: OrderStatusType) -> String {
    match status {
        OrderStatusType::Pending => "New order".to_string(),
        OrderStatusType::Dispatched => "Order dispatched".to_string(),
        OrderStatusType::Delivered => "Order delivered".to_string(),
        other => format!("Order {other}"),
    }
}

/// Every order as a feed entry, most recent first.
pub fn activity_feed(orders: &[Order], now: DateTime<Utc>) -> Vec<ActivityEntry> {
    let mut sorted = orders.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    sorted
        .into_iter()
        .map(|o| ActivityEntry {
            order_id: o.id,
            order_number: o.order_number.clone(),
            message: activity_message(o.status),
            customer: o.customer.name.clone(),
            total: o.total,
            status: o.status,
            time_ago: time_ago(o.created_at, now),
            created_at: o.created_at,
        })
        .collect()
}
