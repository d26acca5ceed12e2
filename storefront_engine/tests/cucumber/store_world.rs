use std::sync::{Arc, Mutex};

use cucumber::World;
use log::*;
use storefront_engine::{
    cart::{CartStore, MemoryCartStorage},
    db_types::{Product, Shillings},
    events::EventProducers,
    order_objects::OrderCreated,
    sf_api::{
        checkout_objects::CheckoutOutcome,
        tracking_api::TrackingState,
    },
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    traits::{CatalogManagement, ChatLauncher},
    CheckoutApi,
    CheckoutError,
    OrderApiError,
    OrderFlowApi,
    SqliteDatabase,
    StoreConfig,
};

/// Remembers every chat link it is asked to open.
#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher {
    pub links: Arc<Mutex<Vec<String>>>,
}

impl ChatLauncher for RecordingLauncher {
    fn open_chat(&self, link: &str) -> Result<(), String> {
        self.links.lock().map_err(|e| e.to_string())?.push(link.to_string());
        Ok(())
    }
}

#[derive(Default, Debug, World)]
pub struct StoreWorld {
    pub system: Option<StoreSystem>,
    pub cart: Option<CartStore<MemoryCartStorage>>,
    pub outcome: Option<Result<CheckoutOutcome, CheckoutError>>,
    pub status_result: Option<Result<(), OrderApiError>>,
    pub tracking: TrackingState,
}

#[derive(Debug)]
pub struct StoreSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub staff: OrderFlowApi<SqliteDatabase>,
    pub checkout: CheckoutApi<OrderFlowApi<SqliteDatabase>, SqliteDatabase, RecordingLauncher>,
    pub launcher: RecordingLauncher,
}

impl StoreWorld {
    pub fn system(&self) -> &StoreSystem {
        self.system.as_ref().expect("Store not initialised")
    }

    pub fn cart(&mut self) -> &mut CartStore<MemoryCartStorage> {
        self.cart.get_or_insert_with(|| CartStore::new(MemoryCartStorage::default()))
    }

    /// The order created by the last checkout, whichever channel it went through.
    pub fn placed_order(&self) -> OrderCreated {
        match self.outcome.as_ref() {
            Some(Ok(CheckoutOutcome::Placed(created))) => created.clone(),
            Some(Ok(CheckoutOutcome::ChatHandoff { order: Some(created), .. })) => created.clone(),
            other => panic!("No order was placed. Last checkout: {other:?}"),
        }
    }
}

impl StoreSystem {
    pub async fn new(config: StoreConfig) -> Self {
        let url = random_db_path();
        create_database(&url).await;
        run_migrations(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let launcher = RecordingLauncher::default();
        let gateway = OrderFlowApi::new(db.clone(), config.clone(), EventProducers::default());
        let checkout = CheckoutApi::new(gateway, db.clone(), launcher.clone(), config.clone());
        let staff = OrderFlowApi::new(db.clone(), config, EventProducers::default());
        Self { db_path: url, db, staff, checkout, launcher }
    }

    pub async fn add_product(&self, id: i64, name: &str, price: i64, category: &str) {
        let product = Product::new(id, name, Shillings::from(price)).with_category(category);
        self.db.upsert_product(product).await.expect("Error adding product");
    }

    pub async fn product(&self, name: &str) -> Product {
        let products = self.db.fetch_products().await.expect("Error fetching products");
        products.into_iter().find(|p| p.name == name).expect("No such product")
    }
}
