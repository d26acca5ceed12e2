use cucumber::{then, when};
use log::*;
use storefront_engine::{
    db_types::{OrderNumber, OrderStatusType, Shillings},
    order_objects::OrderQueryFilter,
    sf_api::{
        checkout_objects::{CheckoutChannel, CheckoutForm, CheckoutOutcome, MpesaConfirmationInput},
        tracking_api::{TrackingApi, TrackingOutcome, TrackingQuery, TrackingState},
    },
    traits::{CatalogManagement, OrderManagement},
    CheckoutError,
    OrderApiError,
    ValidationError,
};

use crate::cucumber::StoreWorld;

async fn location_id(world: &StoreWorld, name: &str) -> i64 {
    let locations = world.system().db.fetch_delivery_locations().await.expect("Error fetching locations");
    locations.into_iter().find(|l| l.name == name).map(|l| l.id).expect("No such delivery location")
}

async fn form(world: &StoreWorld, name: &str, phone: &str, location: &str) -> CheckoutForm {
    CheckoutForm {
        name: name.to_string(),
        phone: phone.to_string(),
        email: None,
        delivery_location_id: Some(location_id(world, location).await),
        delivery_address: "Moi Avenue, 3rd floor".to_string(),
        notes: None,
    }
}

async fn checkout(world: &mut StoreWorld, form: CheckoutForm, channel: CheckoutChannel) {
    let mut cart = world.cart.take().expect("The cart is empty");
    let result = world.system().checkout.checkout(&mut cart, &form, channel).await;
    debug!("🚀️ Checkout result: {result:?}");
    world.cart = Some(cart);
    world.outcome = Some(result);
}

async fn latest_order_status(world: &StoreWorld) -> OrderStatusType {
    let id = world.placed_order().order_id;
    world.system().db.fetch_order_by_id(id).await.expect("Error fetching order").expect("Order not found").status
}

//--------------------------------------        cart         ----------------------------------------------------------

#[when(expr = "the customer adds {int} {string} to the cart")]
async fn add_to_cart(world: &mut StoreWorld, quantity: i64, name: String) {
    let product = world.system().product(&name).await;
    world.cart().add_line(product, quantity, None);
}

#[when(expr = "the price of {string} changes to {int}")]
async fn change_price(world: &mut StoreWorld, name: String, price: i64) {
    let mut product = world.system().product(&name).await;
    product.price = Shillings::from(price);
    world.system().db.upsert_product(product).await.expect("Error updating product");
}

#[then(expr = "the cart is empty")]
async fn cart_is_empty(world: &mut StoreWorld) {
    assert!(world.cart().is_empty());
}

#[then(expr = "the cart still holds {int} items")]
async fn cart_holds(world: &mut StoreWorld, count: i64) {
    assert_eq!(world.cart().total_items(), count);
}

//--------------------------------------      checkout       ----------------------------------------------------------

#[when(expr = "{string} with phone {string} checks out on the website for delivery to {string}")]
async fn website_checkout(world: &mut StoreWorld, name: String, phone: String, location: String) {
    let form = form(world, &name, &phone, &location).await;
    checkout(world, form, CheckoutChannel::Website).await;
}

#[when(expr = "{string} with phone {string} checks out over WhatsApp for delivery to {string}")]
async fn whatsapp_checkout(world: &mut StoreWorld, name: String, phone: String, location: String) {
    let form = form(world, &name, &phone, &location).await;
    checkout(world, form, CheckoutChannel::WhatsApp).await;
}

#[when(expr = "{string} with phone {string} pays by M-Pesa for delivery to {string} and pastes {string}")]
async fn mpesa_checkout(world: &mut StoreWorld, name: String, phone: String, location: String, message: String) {
    let form = form(world, &name, &phone, &location).await;
    let input = MpesaConfirmationInput { message, code: None, phone: None };
    checkout(world, form, CheckoutChannel::Mpesa(input)).await;
}

#[then(expr = "the checkout quote for {string} shows a delivery fee of {int} and a total of {int}")]
async fn quote(world: &mut StoreWorld, location: String, fee: i64, total: i64) {
    let id = location_id(world, &location).await;
    let cart = world.cart.take().expect("The cart is empty");
    let quote = world.system().checkout.quote(&cart, Some(id)).await;
    world.cart = Some(cart);
    let quote = quote.expect("Error fetching quote");
    assert_eq!(quote.delivery_fee, Shillings::from(fee));
    assert_eq!(quote.total, Shillings::from(total));
}

#[then(expr = "an order is placed")]
async fn order_placed(world: &mut StoreWorld) {
    let created = world.placed_order();
    info!("🚀️ Order {} placed", created.order_number);
}

#[then(expr = "the order is stored with subtotal {int}, delivery fee {int} and total {int}")]
async fn order_totals(world: &mut StoreWorld, subtotal: i64, fee: i64, total: i64) {
    let id = world.placed_order().order_id;
    let order = world.system().db.fetch_order_by_id(id).await.expect("Error fetching order").expect("Order not found");
    assert_eq!(order.subtotal, Shillings::from(subtotal));
    assert_eq!(order.delivery_fee, Shillings::from(fee));
    assert_eq!(order.total, Shillings::from(total));
}

#[then(expr = "the order was placed via {string} with payment method {string}")]
async fn order_channel(world: &mut StoreWorld, channel: String, method: String) {
    let id = world.placed_order().order_id;
    let order = world.system().db.fetch_order_by_id(id).await.expect("Error fetching order").expect("Order not found");
    assert_eq!(order.channel.as_str(), channel);
    assert_eq!(order.payment_method.as_str(), method);
    assert_eq!(order.status, OrderStatusType::Pending);
}

#[then(expr = "the order records the M-Pesa code {string}")]
async fn order_mpesa_code(world: &mut StoreWorld, code: String) {
    let id = world.placed_order().order_id;
    let order = world.system().db.fetch_order_by_id(id).await.expect("Error fetching order").expect("Order not found");
    assert_eq!(order.mpesa.code.as_deref(), Some(code.as_str()));
    assert!(order.mpesa.raw_message.is_some());
}

#[then(expr = "the order line for {string} is priced at {int}")]
async fn order_line_price(world: &mut StoreWorld, name: String, price: i64) {
    let id = world.placed_order().order_id;
    let order = world.system().db.fetch_order_by_id(id).await.expect("Error fetching order").expect("Order not found");
    let item = order.items.iter().find(|i| i.name == name).expect("No such order line");
    assert_eq!(item.unit_price, Shillings::from(price));
}

#[then(expr = "a chat link to the shop mentioning the order number is opened")]
async fn chat_opened(world: &mut StoreWorld) {
    let created = world.placed_order();
    let link = match world.outcome.as_ref() {
        Some(Ok(CheckoutOutcome::ChatHandoff { link, persisted, .. })) => {
            assert!(*persisted);
            link.clone()
        },
        other => panic!("Expected a chat handoff, got {other:?}"),
    };
    assert!(link.starts_with("https://wa.me/254700111222?text="));
    assert!(link.contains(created.order_number.as_str()));
    let opened = world.system().launcher.links.lock().expect("Poisoned lock").clone();
    assert_eq!(opened, vec![link]);
}

#[then(expr = "checkout is rejected because the confirmation message is too short")]
async fn message_too_short(world: &mut StoreWorld) {
    match world.outcome.as_ref() {
        Some(Err(CheckoutError::Validation(ValidationError::MessageTooShort { .. }))) => {},
        other => panic!("Expected a short message rejection, got {other:?}"),
    }
}

#[then(expr = "checkout is rejected because the {string} is missing")]
async fn missing_field(world: &mut StoreWorld, field: String) {
    match world.outcome.as_ref() {
        Some(Err(CheckoutError::Validation(ValidationError::MissingField(f)))) => assert_eq!(*f, field),
        other => panic!("Expected a missing field rejection, got {other:?}"),
    }
}

#[then(expr = "the store holds {int} orders")]
async fn order_count(world: &mut StoreWorld, count: usize) {
    let orders = world.system().db.search_orders(OrderQueryFilter::default()).await.expect("Error fetching orders");
    assert_eq!(orders.len(), count);
}

//--------------------------------------    order status     ----------------------------------------------------------

#[when(expr = "staff mark the order as {string}")]
async fn set_status(world: &mut StoreWorld, status: String) {
    let id = world.placed_order().order_id;
    let result = world.system().staff.set_status_str(id, &status).await;
    world.status_result = Some(result.map(|change| {
        if change.backwards {
            info!("🚀️ Order moved backwards from {} to {}", change.old, change.new);
        }
    }));
}

#[then(expr = "the order status is {string}")]
async fn status_is(world: &mut StoreWorld, status: String) {
    let status = status.parse::<OrderStatusType>().expect("Invalid status in feature file");
    assert_eq!(latest_order_status(world).await, status);
}

#[then(expr = "the status update succeeds")]
async fn status_update_succeeds(world: &mut StoreWorld) {
    assert!(matches!(world.status_result, Some(Ok(()))), "{:?}", world.status_result);
}

#[then(expr = "the status update is rejected as invalid")]
async fn status_update_rejected(world: &mut StoreWorld) {
    match world.status_result.as_ref() {
        Some(Err(OrderApiError::Validation(ValidationError::InvalidStatus(_)))) => {},
        other => panic!("Expected an invalid status rejection, got {other:?}"),
    }
}

#[then(expr = "{int} pending orders are counted")]
async fn pending_count(world: &mut StoreWorld, count: i64) {
    let n = world.system().db.count_orders_with_status(OrderStatusType::Pending).await.expect("Error counting orders");
    assert_eq!(n, count);
}

#[when(expr = "staff delete the order without confirming")]
async fn delete_unconfirmed(world: &mut StoreWorld) {
    let id = world.placed_order().order_id;
    let result = world.system().staff.delete_orders(&[id], false).await;
    assert!(matches!(result, Err(OrderApiError::Validation(ValidationError::DeletionNotConfirmed))));
}

#[when(expr = "staff delete the order")]
async fn delete_confirmed(world: &mut StoreWorld) {
    let id = world.placed_order().order_id;
    let report = world.system().staff.delete_orders(&[id], true).await.expect("Error deleting order");
    assert!(report.is_complete());
}

//--------------------------------------      tracking       ----------------------------------------------------------

async fn track(world: &mut StoreWorld, query: TrackingQuery) {
    let api = TrackingApi::new(world.system().db.clone());
    let mut state = TrackingState::default();
    api.search(&mut state, query).await;
    world.tracking = state;
}

#[when(expr = "the customer tracks the order number in lower case")]
async fn track_lower(world: &mut StoreWorld) {
    let number = format!("#{}", world.placed_order().order_number.as_str().to_lowercase());
    track(world, TrackingQuery::OrderNumber(number)).await;
}

#[when(expr = "the customer tracks order number {string}")]
async fn track_number(world: &mut StoreWorld, number: String) {
    track(world, TrackingQuery::OrderNumber(number)).await;
}

#[when(expr = "the customer tracks orders for phone {string}")]
async fn track_phone(world: &mut StoreWorld, phone: String) {
    track(world, TrackingQuery::Phone(phone)).await;
}

#[then(expr = "{int} tracked orders are shown")]
async fn tracked_count(world: &mut StoreWorld, count: usize) {
    match &world.tracking {
        TrackingState::Done(TrackingOutcome::Found(orders)) => assert_eq!(orders.len(), count),
        other => panic!("Expected tracked orders, got {other:?}"),
    }
}

#[then(expr = "the tracked order shows {int} of 3 milestones reached")]
async fn milestones(world: &mut StoreWorld, reached: usize) {
    match &world.tracking {
        TrackingState::Done(TrackingOutcome::Found(orders)) => {
            let order = &orders[0];
            assert_eq!(order.timeline.len(), 3);
            assert_eq!(order.timeline.iter().filter(|m| m.reached).count(), reached);
        },
        other => panic!("Expected tracked orders, got {other:?}"),
    }
}

#[then(expr = "the tracked order is shown as cancelled")]
async fn tracked_cancelled(world: &mut StoreWorld) {
    match &world.tracking {
        TrackingState::Done(TrackingOutcome::Found(orders)) => assert!(orders[0].cancelled),
        other => panic!("Expected tracked orders, got {other:?}"),
    }
}

#[then(expr = "the tracked order is the one that was placed")]
async fn tracked_is_placed(world: &mut StoreWorld) {
    let number = world.placed_order().order_number;
    match &world.tracking {
        TrackingState::Done(TrackingOutcome::Found(orders)) => assert_eq!(orders[0].order_number, number),
        other => panic!("Expected tracked orders, got {other:?}"),
    }
}

#[then(expr = "no orders are found")]
async fn not_found(world: &mut StoreWorld) {
    assert_eq!(world.tracking, TrackingState::Done(TrackingOutcome::NotFound));
}

#[then(expr = "order number {string} is not on record")]
async fn not_on_record(world: &mut StoreWorld, number: String) {
    let order = world.system().db.fetch_order_by_number(&OrderNumber(number)).await.expect("Error fetching order");
    assert!(order.is_none());
}
