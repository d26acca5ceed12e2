//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use log::*;
use storefront_engine::{
    order_objects::OrderRequest,
    sf_api::tracking_api::{TrackingOutcome, TrackingQuery},
    traits::{CatalogManagement, OrderManagement, TrafficFeed},
    AnalyticsApi,
    OrderFlowApi,
    OrderQueryApi,
    TrackingApi,
};

use crate::{
    data_objects::{
        AdminOrdersParams,
        AnalyticsParams,
        DeleteOrdersRequest,
        PendingCount,
        StatusUpdateRequest,
        StatusUpdateResponse,
        TrackParams,
    },
    errors::ServerError,
    middleware::StaffTokenMiddlewareFactory,
    pending_worker::PendingBadge,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where staff_only) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::StaffTokenMiddlewareFactory::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderManagement);
/// Route handler for order creation.
///
/// Checkout posts the order here for every channel. The request is validated before anything is stored: name, phone
/// and delivery address must be present, there must be at least one item, and the totals must add up. New orders are
/// always `pending`.
///
/// On success, the server responds with `201 Created` and `{"orderNumber": ..., "orderId": ...}`.
pub async fn create_order<B: OrderManagement>(
    body: web::Json<OrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST new {} order for {}", request.ordered_via, request.customer_name);
    let created = api.create_order(request).await.map_err(|e| {
        debug!("💻️ Order was not created. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Created().json(created))
}

route!(track => Get "/track" impl OrderManagement);
/// Route handler for customer order tracking.
///
/// Customers supply exactly one of `order_number` or `phone` in the query string. A phone number matches every order
/// placed with that number, in any of the local or international formats. The response is a list of tracked orders,
/// newest first, each with its timeline.
///
/// If nothing matches, the server responds with `404` and an error body.
pub async fn track<B: OrderManagement>(
    query: web::Query<TrackParams>,
    api: web::Data<TrackingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let TrackParams { order_number, phone } = query.into_inner();
    let query = TrackingQuery::from_params(order_number, phone)?;
    debug!("💻️ GET track for {query:?}");
    match api.track(query).await? {
        TrackingOutcome::Found(orders) => Ok(HttpResponse::Ok().json(orders)),
        TrackingOutcome::NotFound => Err(ServerError::NoRecordFound("No orders match that search.".into())),
    }
}

route!(delivery_locations => Get "/delivery_locations" impl CatalogManagement);
pub async fn delivery_locations<C: CatalogManagement>(catalog: web::Data<C>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET delivery_locations");
    let locations = catalog.fetch_delivery_locations().await.map_err(|e| {
        debug!("💻️ Could not fetch delivery locations. {e}");
        ServerError::BackendError(e.to_string())
    })?;
    Ok(HttpResponse::Ok().json(locations))
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(admin_orders => Get "/admin/orders" impl OrderManagement where staff_only);
/// Route handler for the staff order list.
///
/// Supports filtering by `status` (comma-separated), `channel`, `since`, `until` and a free-text `search` on order
/// number, customer name and phone. Results are newest first and paginated with `page` and `per_page`.
pub async fn admin_orders<B: OrderManagement>(
    query: web::Query<AdminOrdersParams>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (filter, pagination) = query.into_inner().into_query()?;
    debug!("💻️ GET admin orders. {filter}");
    let page = api.list_orders(filter, pagination).await?;
    Ok(HttpResponse::Ok().json(page))
}

route!(admin_order_by_id => Get "/admin/orders/{id}" impl OrderManagement where staff_only);
pub async fn admin_order_by_id<B: OrderManagement>(
    path: web::Path<i64>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET admin order #{id}");
    let order = api.order_by_id(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_order_status => Patch "/admin/orders/{id}/status" impl OrderManagement where staff_only);
/// Route handler for staff status updates.
///
/// Any of the five statuses may be set from any other. Moves back along the fulfilment path are allowed, and are
/// flagged with `"backwards": true` in the response so that the UI can draw attention to them.
pub async fn update_order_status<B: OrderManagement>(
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let StatusUpdateRequest { status } = body.into_inner();
    debug!("💻️ PATCH status of order #{id} to {status}");
    let change = api.set_status_str(id, &status).await.map_err(|e| {
        debug!("💻️ Status of order #{id} was not changed. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(StatusUpdateResponse::from(change)))
}

route!(delete_orders => Post "/admin/orders/delete" impl OrderManagement where staff_only);
/// Route handler for permanent order deletion.
///
/// The body must carry `"confirm": true`. Each order is deleted independently; the response reports how many were
/// deleted and which ids failed.
pub async fn delete_orders<B: OrderManagement>(
    body: web::Json<DeleteOrdersRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let DeleteOrdersRequest { ids, confirm } = body.into_inner();
    info!("💻️ POST delete {} orders", ids.len());
    let report = api.delete_orders(&ids, confirm).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// The pending-order badge. The count is refreshed in the background, so this never touches the database.
#[get("/admin/orders/pending_count", wrap = "StaffTokenMiddlewareFactory::new()")]
pub async fn pending_count(badge: web::Data<PendingBadge>) -> impl Responder {
    trace!("💻️ GET pending_count");
    HttpResponse::Ok().json(PendingCount { pending: badge.count() })
}

route!(analytics => Get "/admin/analytics" impl OrderManagement, CatalogManagement, TrafficFeed where staff_only);
/// Route handler for the staff dashboard.
///
/// `days` sets the lookback window for the traffic figures (default 30). Commerce metrics always cover every order.
/// `top_page`, `activity_page` and `per_page` select pages of the top-products table and the activity feed.
pub async fn analytics<B: OrderManagement, C: CatalogManagement, T: TrafficFeed>(
    query: web::Query<AnalyticsParams>,
    api: web::Data<AnalyticsApi<B, C, T>>,
) -> Result<HttpResponse, ServerError> {
    let params = query.into_inner();
    debug!("💻️ GET analytics for {:?} days", params.days);
    let dashboard = api.dashboard(params.days, params.pages(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}
