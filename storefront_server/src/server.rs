use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use storefront_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    traits::NoTrafficFeed,
    AnalyticsApi,
    OrderFlowApi,
    OrderQueryApi,
    SqliteDatabase,
    TrackingApi,
};

use crate::{
    config::{ServerConfig, StaffAccess},
    errors::ServerError,
    pending_worker::{start_pending_worker, PendingBadge},
    routes::{
        health,
        pending_count,
        AdminOrderByIdRoute,
        AdminOrdersRoute,
        AnalyticsRoute,
        CreateOrderRoute,
        DeleteOrdersRoute,
        DeliveryLocationsRoute,
        TrackRoute,
        UpdateOrderStatusRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 50;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, create_event_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let (worker, badge) = start_pending_worker(db.clone(), config.pending_poll_interval);
    let srv = create_server_instance(config, db, producers, badge)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    worker.abort();
    info!("🕰️ Pending order worker stopped");
    result
}

/// Logs order lifecycle events. Backwards status moves are called out at `warn` level.
pub fn create_event_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_order_created(|ev| {
        Box::pin(async move {
            let order = ev.order;
            info!("📬️ New {} order {} for {} ({})", order.channel, order.order_number, order.customer.name, order.total);
        })
    });
    hooks.on_status_changed(|ev| {
        Box::pin(async move {
            let order = ev.order;
            if ev.backwards {
                warn!("📬️ Order {} moved backwards from {} to {}", order.order_number, ev.old_status, order.status);
            } else {
                info!("📬️ Order {} is now {}", order.order_number, order.status);
            }
        })
    });
    hooks.on_orders_deleted(|ev| {
        Box::pin(async move {
            info!("📬️ {} orders were deleted: {:?}", ev.ids.len(), ev.ids);
        })
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
    badge: PendingBadge,
) -> Result<Server, ServerError> {
    let staff_access = StaffAccess::from_config(&config);
    let store = config.store.clone();
    let srv = HttpServer::new(move || {
        let flow_api = OrderFlowApi::new(db.clone(), store.clone(), producers.clone());
        let query_api = OrderQueryApi::new(db.clone());
        let tracking_api = TrackingApi::new(db.clone());
        let analytics_api = AnalyticsApi::new(db.clone(), db.clone(), NoTrafficFeed);
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(TrackRoute::<SqliteDatabase>::new())
            .service(DeliveryLocationsRoute::<SqliteDatabase>::new())
            // Registered ahead of `/admin/orders/{id}`, which would otherwise capture it
            .service(pending_count)
            .service(AdminOrdersRoute::<SqliteDatabase>::new())
            .service(DeleteOrdersRoute::<SqliteDatabase>::new())
            .service(AdminOrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(AnalyticsRoute::<SqliteDatabase, SqliteDatabase, NoTrafficFeed>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sf::access_log"))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(query_api))
            .app_data(web::Data::new(tracking_api))
            .app_data(web::Data::new(analytics_api))
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(badge.clone()))
            .app_data(web::Data::new(staff_access.clone()))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    info!("💻️ Server listening on {}:{}", config.host, config.port);
    Ok(srv)
}
