//! Shared test fixtures for the storefront integration tests.
//!
//! Provides `setup_backend()`, an in-memory backend seeded with a small
//! catalog, and `setup_storefront()`, which builds a [`Storefront`] over it
//! with a temporary snapshot directory.

#![allow(dead_code)]

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::json;
use storefront_sdk::models::{NewAddress, Product, ProductId, SignUp};
use storefront_sdk::{config, Backend, MemoryBackend, QueryBuilder, Storefront};

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "correct-horse";

/// Create a `MemoryBackend` seeded with categories, products and flags.
///
/// Product ids 1..=5 are seeded in order:
/// 1. Linen Shirt (Clothing, 10.005, stock 4, featured, images as array)
/// 2. Wool Scarf (Clothing, 5, stock 0, best seller, images as encoded string)
/// 3. Ceramic Mug (Kitchen, 12.50, stock 10, new arrival, malformed images)
/// 4. Teapot (Kitchen, 30, stock 2, no images column)
/// 5. Denim Jacket (Clothing, 45.99, stock 1, featured, null images)
pub fn setup_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();

    // -- categories -----------------------------------------------------------
    backend
        .seed(
            config::CATEGORIES,
            vec![
                json!({"id": 1, "name": "Clothing", "image": null}),
                json!({"id": 2, "name": "Kitchen", "image": "https://cdn.example.com/kitchen.png"}),
            ],
        )
        .unwrap();

    // -- products -------------------------------------------------------------
    backend
        .seed(
            config::PRODUCTS,
            vec![
                json!({
                    "id": 1,
                    "name": "Linen Shirt",
                    "description": "Breathable summer shirt",
                    "price": "10.005",
                    "category_id": 1,
                    "images": ["https://cdn.example.com/shirt-1.png", "https://cdn.example.com/shirt-2.png"],
                    "stock": 4,
                    "is_featured": true,
                    "is_best_seller": false,
                    "is_new_arrival": false
                }),
                json!({
                    "id": 2,
                    "name": "Wool Scarf",
                    "description": "Warm and soft",
                    "price": "5",
                    "category_id": 1,
                    "images": "[\"https://cdn.example.com/scarf.png\"]",
                    "stock": 0,
                    "is_featured": false,
                    "is_best_seller": true,
                    "is_new_arrival": false
                }),
                json!({
                    "id": 3,
                    "name": "Ceramic Mug",
                    "description": "Holds a large coffee",
                    "price": "12.50",
                    "category_id": 2,
                    "images": "not a json list",
                    "stock": 10,
                    "is_featured": false,
                    "is_best_seller": false,
                    "is_new_arrival": true
                }),
                json!({
                    "id": 4,
                    "name": "Teapot",
                    "description": null,
                    "price": "30",
                    "category_id": 2,
                    "stock": 2
                }),
                json!({
                    "id": 5,
                    "name": "Denim Jacket",
                    "description": "Classic blue jacket",
                    "price": "45.99",
                    "category_id": 1,
                    "images": null,
                    "stock": 1,
                    "is_featured": true,
                    "is_best_seller": false,
                    "is_new_arrival": false
                }),
            ],
        )
        .unwrap();

    // -- feature_flags --------------------------------------------------------
    backend
        .seed(
            config::FEATURE_FLAGS,
            vec![
                json!({"key": "reviews_enabled", "value": true}),
                json!({"key": "maintenance", "value": "off"}),
            ],
        )
        .unwrap();

    backend
}

/// Build a `Storefront` over a fresh seeded backend.
///
/// Returns `(Storefront, MemoryBackend, tempfile::TempDir)`. The backend
/// handle shares tables with the storefront for seeding and inspection. The
/// caller must keep the `TempDir` alive for the duration of the test.
pub fn setup_storefront() -> (Storefront, MemoryBackend, tempfile::TempDir) {
    let backend = setup_backend();
    let (storefront, tmp_dir) = storefront_over(backend.clone());
    (storefront, backend, tmp_dir)
}

/// Build a `Storefront` over an existing backend with a fresh snapshot dir.
pub fn storefront_over(backend: MemoryBackend) -> (Storefront, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let storefront = Storefront::builder()
        .backend(backend)
        .cache_dir(tmp_dir.path())
        .build()
        .unwrap();
    (storefront, tmp_dir)
}

/// A storefront with a registered, signed-in customer.
pub fn setup_signed_in() -> (Storefront, MemoryBackend, tempfile::TempDir) {
    let (mut storefront, backend, tmp_dir) = setup_storefront();
    storefront
        .sign_up(&SignUp::new("Ada", EMAIL, PASSWORD))
        .unwrap()
        .unwrap();
    (storefront, backend, tmp_dir)
}

/// A storefront whose signed-in user has been promoted to seller.
pub fn setup_seller() -> (Storefront, MemoryBackend, tempfile::TempDir) {
    let (storefront, backend, tmp_dir) = setup_signed_in();
    let user_id = storefront.current_user().unwrap().id;
    let mut qb = QueryBuilder::new(config::USERS);
    qb.eq("id", &user_id.to_string());
    backend.update(&qb, &json!({"role": "seller"})).unwrap();
    (storefront, backend, tmp_dir)
}

pub fn sample_address() -> NewAddress {
    NewAddress {
        full_name: "Ada Lovelace".to_string(),
        phone: "+44 20 7946 0000".to_string(),
        area: "12 St James's Square".to_string(),
        city: "London".to_string(),
        state: "Greater London".to_string(),
        postal_code: Some("SW1Y 4JH".to_string()),
    }
}

/// Build a product value directly, for store-level tests.
pub fn product(id: i64, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: String::new(),
        price: dec(price),
        category_id: None,
        images: Vec::new(),
        stock: 5,
        is_featured: false,
        is_best_seller: false,
        is_new_arrival: false,
    }
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}
