use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use storefront_engine::{
    db_types::{DeliveryLocation, OrderStatusType, Shillings},
    events::EventProducers,
    OrderFlowApi,
    StoreConfig,
    TrackingApi,
};

use super::{
    helpers::{json, send},
    mocks::{order, MockCatalogManager, MockOrderManager},
};
use crate::routes::{health, CreateOrderRoute, DeliveryLocationsRoute, TrackRoute};

const ORDER_JSON: &str = r#"{
    "customerName": "Wanjiku Kamau",
    "customerPhone": "0712345678",
    "deliveryLocationId": 1,
    "deliveryAddress": "Moi Avenue, Shop 4",
    "deliveryFee": 200,
    "subtotal": 2000,
    "total": 2200,
    "orderedVia": "website",
    "items": [
        {"productId": 1, "productName": "Ankara Dress", "quantity": 2, "unitPrice": 1000, "totalPrice": 2000}
    ]
}"#;

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send(TestRequest::get().uri("/health"), |cfg| {
        cfg.service(health);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn create_order() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/orders").insert_header(("content-type", "application/json")).set_payload(ORDER_JSON);
    let (status, body) = send(req, configure_orders).await;
    assert_eq!(status, StatusCode::CREATED);
    let body = json(&body);
    assert_eq!(body["orderId"], 7);
    assert!(body["orderNumber"].as_str().unwrap().starts_with("ORD-"));
}

#[actix_web::test]
async fn create_order_with_bad_totals() {
    let _ = env_logger::try_init().ok();
    let payload = ORDER_JSON.replace(r#""total": 2200"#, r#""total": 2000"#);
    let req = TestRequest::post().uri("/orders").insert_header(("content-type", "application/json")).set_payload(payload);
    let (status, body) = send(req, configure_orders).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].is_string());
}

#[actix_web::test]
async fn create_order_without_a_name() {
    let _ = env_logger::try_init().ok();
    let payload = ORDER_JSON.replace("Wanjiku Kamau", " ");
    let req = TestRequest::post().uri("/orders").insert_header(("content-type", "application/json")).set_payload(payload);
    let (status, _) = send(req, configure_orders).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn create_order_with_hostile_amounts() {
    let _ = env_logger::try_init().ok();
    let huge = ORDER_JSON.replace(r#""quantity": 2"#, &format!(r#""quantity": {}"#, i64::MAX / 2));
    let negative = ORDER_JSON
        .replace(r#""unitPrice": 1000, "totalPrice": 2000"#, r#""unitPrice": -1000, "totalPrice": -2000"#)
        .replace(r#""subtotal": 2000"#, r#""subtotal": -2000"#)
        .replace(r#""deliveryFee": 200"#, r#""deliveryFee": 0"#)
        .replace(r#""total": 2200"#, r#""total": -2000"#);
    for payload in [huge, negative] {
        let req =
            TestRequest::post().uri("/orders").insert_header(("content-type", "application/json")).set_payload(payload);
        let (status, body) = send(req, configure_orders).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }
}

fn configure_orders(cfg: &mut ServiceConfig) {
    let mut db = MockOrderManager::new();
    db.expect_insert_order().returning(|o| {
        let mut stored = order(7, OrderStatusType::Pending);
        stored.order_number = o.order_number;
        Ok(stored)
    });
    let api = OrderFlowApi::new(db, StoreConfig::default(), EventProducers::default());
    cfg.service(CreateOrderRoute::<MockOrderManager>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn track_by_order_number() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send(TestRequest::get().uri("/track?order_number=%23ord-260205-0003"), configure_tracking).await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["orderNumber"], "ORD-260205-0003");
    assert_eq!(orders[0]["status"], "dispatched");
    assert_eq!(orders[0]["timeline"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn track_by_phone() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send(TestRequest::get().uri("/track?phone=%2B254712345678"), configure_tracking).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body).as_array().unwrap().len(), 2);
    let (status, body) = send(TestRequest::get().uri("/track?phone=0712%20345%20678"), configure_tracking).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body).as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn track_unknown_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send(TestRequest::get().uri("/track?order_number=ORD-000000-0000"), configure_tracking).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "The data was not found. No orders match that search.");
}

#[actix_web::test]
async fn track_needs_exactly_one_parameter() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send(TestRequest::get().uri("/track"), configure_tracking).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) =
        send(TestRequest::get().uri("/track?order_number=ORD-1&phone=0712345678"), configure_tracking).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn configure_tracking(cfg: &mut ServiceConfig) {
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_number().returning(|n| {
        if n.as_str().eq_ignore_ascii_case("ORD-260205-0003") {
            Ok(Some(order(3, OrderStatusType::Dispatched)))
        } else {
            Ok(None)
        }
    });
    db.expect_fetch_orders_by_phone().returning(|phone| {
        if phone == "254712345678" {
            Ok(vec![order(5, OrderStatusType::Pending), order(3, OrderStatusType::Dispatched)])
        } else {
            Ok(vec![])
        }
    });
    cfg.service(TrackRoute::<MockOrderManager>::new()).app_data(web::Data::new(TrackingApi::new(db)));
}

#[actix_web::test]
async fn list_delivery_locations() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send(TestRequest::get().uri("/delivery_locations"), |cfg| {
        let mut catalog = MockCatalogManager::new();
        catalog.expect_fetch_delivery_locations().returning(|| {
            Ok(vec![
                DeliveryLocation { id: 1, name: "Nairobi CBD".into(), fee: Shillings::from(200) },
                DeliveryLocation { id: 2, name: "Westlands".into(), fee: Shillings::from(350) },
            ])
        });
        cfg.service(DeliveryLocationsRoute::<MockCatalogManager>::new()).app_data(web::Data::new(catalog));
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body[1]["name"], "Westlands");
    assert_eq!(body[1]["fee"], 350);
}
