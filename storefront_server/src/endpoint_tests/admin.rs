use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use storefront_engine::{
    db_types::OrderStatusType,
    events::EventProducers,
    traits::{NoTrafficFeed, OrderManagementError},
    AnalyticsApi,
    OrderFlowApi,
    OrderQueryApi,
    StoreConfig,
};
use tokio::sync::watch;

use super::{
    helpers::{as_staff, json, send},
    mocks::{order, MockCatalogManager, MockOrderManager},
};
use crate::{
    pending_worker::PendingBadge,
    routes::{
        pending_count,
        AdminOrderByIdRoute,
        AdminOrdersRoute,
        AnalyticsRoute,
        DeleteOrdersRoute,
        UpdateOrderStatusRoute,
    },
};

fn configure_listing(cfg: &mut ServiceConfig) {
    let mut db = MockOrderManager::new();
    db.expect_search_orders().returning(|filter| {
        let orders = (1..=12).rev().map(|id| order(id, OrderStatusType::Pending)).collect::<Vec<_>>();
        let orders = match filter.status {
            Some(statuses) if !statuses.contains(&OrderStatusType::Pending) => vec![],
            _ => orders,
        };
        Ok(orders)
    });
    db.expect_fetch_order_by_id().returning(|id| Ok((id == 3).then(|| order(3, OrderStatusType::Confirmed))));
    let api = web::Data::new(OrderQueryApi::new(db));
    cfg.service(AdminOrdersRoute::<MockOrderManager>::new())
        .service(AdminOrderByIdRoute::<MockOrderManager>::new())
        .app_data(api);
}

#[actix_web::test]
async fn staff_routes_need_the_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send(TestRequest::get().uri("/admin/orders"), configure_listing).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(json(&body)["error"].as_str().unwrap().starts_with("Access denied."));
    let req = TestRequest::get().uri("/admin/orders").insert_header(("sf_admin_token", "guessing"));
    let (status, _) = send(req, configure_listing).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn list_orders() {
    let _ = env_logger::try_init().ok();
    let req = as_staff(TestRequest::get().uri("/admin/orders?page=2&per_page=5"));
    let (status, body) = send(req, configure_listing).await;
    assert_eq!(status, StatusCode::OK);
    let page = json(&body);
    assert_eq!(page["page"], 2);
    assert_eq!(page["totalItems"], 12);
    assert_eq!(page["totalPages"], 3);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["id"], 7);
    assert_eq!(items[0]["status"], "pending");
}

#[actix_web::test]
async fn list_orders_with_a_status_filter() {
    let _ = env_logger::try_init().ok();
    let req = as_staff(TestRequest::get().uri("/admin/orders?status=delivered,cancelled"));
    let (status, body) = send(req, configure_listing).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["totalItems"], 0);

    let req = as_staff(TestRequest::get().uri("/admin/orders?status=shipped"));
    let (status, _) = send(req, configure_listing).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn order_by_id() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send(as_staff(TestRequest::get().uri("/admin/orders/3")), configure_listing).await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["order_number"], "ORD-260205-0003");
    assert_eq!(body["status"], "confirmed");

    let (status, _) = send(as_staff(TestRequest::get().uri("/admin/orders/99")), configure_listing).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure_status(cfg: &mut ServiceConfig) {
    let mut db = MockOrderManager::new();
    db.expect_update_order_status().returning(|id, status| match id {
        1 => Ok((OrderStatusType::Delivered, order(1, status))),
        2 => Ok((OrderStatusType::Pending, order(2, status))),
        _ => Err(OrderManagementError::OrderNotFound(id)),
    });
    let api = OrderFlowApi::new(db, StoreConfig::default(), EventProducers::default());
    cfg.service(UpdateOrderStatusRoute::<MockOrderManager>::new()).app_data(web::Data::new(api));
}

fn status_update(id: i64, status: &str) -> TestRequest {
    let req = TestRequest::patch()
        .uri(&format!("/admin/orders/{id}/status"))
        .insert_header(("content-type", "application/json"))
        .set_payload(format!(r#"{{"status": "{status}"}}"#));
    as_staff(req)
}

#[actix_web::test]
async fn forward_status_update() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send(status_update(2, "confirmed"), configure_status).await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["old"], "pending");
    assert_eq!(body["new"], "confirmed");
    assert_eq!(body["backwards"], false);
}

#[actix_web::test]
async fn backwards_status_update_is_flagged() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send(status_update(1, "pending"), configure_status).await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["old"], "delivered");
    assert_eq!(body["backwards"], true);
}

#[actix_web::test]
async fn bad_status_updates() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send(status_update(2, "lost"), configure_status).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(status_update(42, "confirmed"), configure_status).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure_delete(cfg: &mut ServiceConfig) {
    let mut db = MockOrderManager::new();
    db.expect_delete_order().returning(|id| Ok(id != 9));
    let api = OrderFlowApi::new(db, StoreConfig::default(), EventProducers::default());
    cfg.service(DeleteOrdersRoute::<MockOrderManager>::new()).app_data(web::Data::new(api));
}

fn delete_request(payload: &str) -> TestRequest {
    let req = TestRequest::post()
        .uri("/admin/orders/delete")
        .insert_header(("content-type", "application/json"))
        .set_payload(payload.to_string());
    as_staff(req)
}

#[actix_web::test]
async fn delete_needs_confirmation() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send(delete_request(r#"{"ids": [1, 2]}"#), configure_delete).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn delete_reports_each_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send(delete_request(r#"{"ids": [1, 9, 2, 1], "confirm": true}"#), configure_delete).await;
    assert_eq!(status, StatusCode::OK);
    let report = json(&body);
    assert_eq!(report["requested"], 3);
    assert_eq!(report["deleted"], 2);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["failed_ids"], serde_json::json!([9]));
}

#[actix_web::test]
async fn pending_badge() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let (tx, rx) = watch::channel(0);
        tx.send_replace(4);
        cfg.service(pending_count).app_data(web::Data::new(PendingBadge::new(rx)));
    }
    let (status, _) = send(TestRequest::get().uri("/admin/orders/pending_count"), configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(as_staff(TestRequest::get().uri("/admin/orders/pending_count")), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["pending"], 4);
}

fn configure_analytics(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_search_orders().returning(|_| {
        Ok(vec![order(2, OrderStatusType::Pending), order(1, OrderStatusType::Delivered)])
    });
    let mut catalog = MockCatalogManager::new();
    catalog.expect_fetch_products().returning(|| Ok(vec![]));
    let api = AnalyticsApi::new(orders, catalog, NoTrafficFeed);
    cfg.service(AnalyticsRoute::<MockOrderManager, MockCatalogManager, NoTrafficFeed>::new())
        .app_data(web::Data::new(api));
}

#[actix_web::test]
async fn analytics_dashboard() {
    let _ = env_logger::try_init().ok();
    let req = as_staff(TestRequest::get().uri("/admin/analytics?days=7"));
    let (status, body) = send(req, configure_analytics).await;
    assert_eq!(status, StatusCode::OK);
    let dashboard = json(&body);
    assert_eq!(dashboard["days"], 7);
    assert_eq!(dashboard["commerce"]["totalOrders"], 2);
    assert_eq!(dashboard["commerce"]["totalSales"], 1);
    assert_eq!(dashboard["commerce"]["pendingOrders"], 1);
    assert_eq!(dashboard["commerce"]["totalRevenue"], 2200);
}
