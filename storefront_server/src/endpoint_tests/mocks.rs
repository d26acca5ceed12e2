use chrono::{TimeZone, Utc};
use mockall::mock;
use storefront_engine::{
    db_types::{
        Channel,
        CustomerDetails,
        DeliveryLocation,
        MpesaDetails,
        NewOrder,
        Order,
        OrderNumber,
        OrderStatusType,
        PaymentMethod,
        Product,
        Shillings,
    },
    order_objects::OrderQueryFilter,
    traits::{CatalogError, CatalogManagement, OrderManagement, OrderManagementError},
};

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError>;
        async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderManagementError>;
        async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderManagementError>;
        async fn fetch_orders_by_phone(&self, phone: &str) -> Result<Vec<Order>, OrderManagementError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderManagementError>;
        async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<(OrderStatusType, Order), OrderManagementError>;
        async fn delete_order(&self, id: i64) -> Result<bool, OrderManagementError>;
        async fn count_orders_with_status(&self, status: OrderStatusType) -> Result<i64, OrderManagementError>;
    }
}

mock! {
    pub CatalogManager {}
    impl CatalogManagement for CatalogManager {
        async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;
        async fn fetch_products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, CatalogError>;
        async fn fetch_delivery_locations(&self) -> Result<Vec<DeliveryLocation>, CatalogError>;
        async fn fetch_delivery_location(&self, id: i64) -> Result<Option<DeliveryLocation>, CatalogError>;
        async fn upsert_product(&self, product: Product) -> Result<Product, CatalogError>;
        async fn insert_delivery_location(&self, name: &str, fee: Shillings) -> Result<DeliveryLocation, CatalogError>;
    }
}

pub fn order(id: i64, status: OrderStatusType) -> Order {
    let created_at = Utc.with_ymd_and_hms(2026, 2, 5, 9, 0, 0).unwrap();
    Order {
        id,
        order_number: OrderNumber(format!("ORD-260205-{id:04}")),
        customer: CustomerDetails { name: "Wanjiku Kamau".into(), phone: "0712345678".into(), email: None },
        delivery_location_id: Some(1),
        delivery_location: Some("Nairobi CBD".into()),
        delivery_address: "Moi Avenue".into(),
        notes: None,
        items: vec![],
        subtotal: Shillings::from(2000),
        delivery_fee: Shillings::from(200),
        total: Shillings::from(2200),
        status,
        channel: Channel::Website,
        payment_method: PaymentMethod::Cod,
        mpesa: MpesaDetails::default(),
        created_at,
        updated_at: created_at,
    }
}
