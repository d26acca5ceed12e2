use storefront_engine::{
    db_types::{Product, Shillings},
    order_objects::{OrderRequest, OrderRequestItem},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::CatalogManagement,
    SqliteDatabase,
};

/// A migrated, throwaway database with a small catalog and two delivery locations (ids 1 and 2).
pub async fn seeded_database() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    for product in catalog() {
        db.upsert_product(product).await.expect("Error seeding products");
    }
    db.insert_delivery_location("Nairobi CBD", Shillings::from(200)).await.expect("Error seeding locations");
    db.insert_delivery_location("Westlands", Shillings::from(350)).await.expect("Error seeding locations");
    db
}

pub fn catalog() -> Vec<Product> {
    vec![
        Product::new(1, "Ankara Dress", Shillings::from(1000)).with_category("Dresses"),
        Product::new(2, "Silk Scarf", Shillings::from(500)).with_category("Accessories"),
        Product::new(3, "Beaded Necklace", Shillings::from(800)).with_category("Accessories"),
    ]
}

pub fn order_request(name: &str, phone: &str) -> OrderRequest {
    serde_json::from_value(serde_json::json!({
        "customerName": name,
        "customerPhone": phone,
        "deliveryLocationId": 1,
        "deliveryAddress": "Moi Avenue, Shop 4",
        "deliveryFee": 200,
        "subtotal": 2000,
        "total": 2200,
        "orderedVia": "website",
        "items": [
            {"productId": 1, "productName": "Ankara Dress", "quantity": 1, "unitPrice": 1000, "totalPrice": 1000},
            {"productId": 2, "productName": "Silk Scarf", "variation": "Color: Red", "quantity": 2,
             "unitPrice": 500, "totalPrice": 1000}
        ]
    }))
    .expect("Invalid order request")
}

#[allow(dead_code)]
pub fn item(product_id: i64, name: &str, quantity: i64, unit_price: i64) -> OrderRequestItem {
    OrderRequestItem {
        product_id,
        product_name: name.to_string(),
        product_image: None,
        variation: None,
        quantity,
        unit_price: Shillings::from(unit_price),
        total_price: Shillings::from(unit_price * quantity),
    }
}
