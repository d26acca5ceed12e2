use cucumber::given;
use storefront_engine::{db_types::Shillings, traits::CatalogManagement, StoreConfig};

use crate::cucumber::{store_world::StoreSystem, StoreWorld};

#[given(expr = "a fresh store with free shipping from {int}")]
async fn fresh_store(world: &mut StoreWorld, threshold: i64) {
    let config = StoreConfig {
        free_shipping_threshold: Shillings::from(threshold),
        whatsapp_number: "254700111222".into(),
        till_number: "5123456".into(),
        ..Default::default()
    };
    world.system = Some(StoreSystem::new(config).await);
}

#[given(expr = "product {int} {string} priced at {int} in {string}")]
async fn product(world: &mut StoreWorld, id: i64, name: String, price: i64, category: String) {
    world.system().add_product(id, &name, price, &category).await;
}

#[given(expr = "a delivery location {string} with a fee of {int}")]
async fn delivery_location(world: &mut StoreWorld, name: String, fee: i64) {
    world.system().db.insert_delivery_location(&name, Shillings::from(fee)).await.expect("Error adding location");
}
