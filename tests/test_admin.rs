//! Seller panel: access control, product and category management, order
//! fulfilment and dashboard figures.

mod common;

use common::{dec, sample_address};
use storefront_sdk::models::{
    CategoryId, NewCategory, NewProduct, OrderId, OrderStatus, Placement, ProductId, ProductUpdate,
};
use storefront_sdk::queries::ImageUpload;
use storefront_sdk::{config, StorefrontError};

fn scarf_form() -> NewProduct {
    NewProduct {
        name: "Silk Scarf".to_string(),
        description: "Light and smooth".to_string(),
        price: dec("22.40"),
        category_id: Some(CategoryId::new(1)),
        stock: 6,
        ..NewProduct::default()
    }
}

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

#[test]
fn admin_requires_sign_in() {
    let (shop, _backend, _tmp) = common::setup_storefront();
    assert!(matches!(shop.admin().unwrap_err(), StorefrontError::Unauthenticated));
}

#[test]
fn admin_rejects_customers() {
    let (shop, _backend, _tmp) = common::setup_signed_in();
    assert!(matches!(shop.admin().unwrap_err(), StorefrontError::Forbidden(_)));
}

#[test]
fn admin_allows_sellers() {
    let (shop, _backend, _tmp) = common::setup_seller();
    assert!(shop.admin().is_ok());
}

#[test]
fn admin_panel_debug_hides_backend() {
    let (shop, _backend, _tmp) = common::setup_seller();
    let panel = shop.admin().unwrap();
    assert_eq!(format!("{panel:?}"), "AdminPanel { .. }");
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[test]
fn add_product_removes_uploaded_images_when_insert_fails() {
    let (shop, backend, _tmp) = common::setup_seller();
    backend.set_unavailable(config::PRODUCTS, true).unwrap();

    let err = shop
        .admin()
        .unwrap()
        .add_product(
            scarf_form(),
            vec![
                ImageUpload::new("front.png", vec![1], "image/png"),
                ImageUpload::new("back.png", vec![2], "image/png"),
            ],
        )
        .unwrap_err();

    assert!(matches!(err, StorefrontError::Backend { status: 503, .. }));
    assert!(backend.objects(config::PRODUCT_IMAGES_BUCKET).unwrap().is_empty());
}

#[test]
fn add_product_removes_earlier_images_when_a_later_one_is_rejected() {
    let (shop, backend, _tmp) = common::setup_seller();

    let err = shop
        .admin()
        .unwrap()
        .add_product(
            scarf_form(),
            vec![
                ImageUpload::new("front.png", vec![1], "image/png"),
                ImageUpload::new("empty.png", Vec::new(), "image/png"),
            ],
        )
        .unwrap_err();

    assert!(matches!(err, StorefrontError::Validation { .. }));
    assert!(backend.objects(config::PRODUCT_IMAGES_BUCKET).unwrap().is_empty());
    assert_eq!(backend.rows(config::PRODUCTS).unwrap().len(), 5);
}

#[test]
fn add_product_uploads_images_then_inserts() {
    let (mut shop, backend, _tmp) = common::setup_seller();
    let created = shop
        .admin()
        .unwrap()
        .add_product(
            scarf_form(),
            vec![ImageUpload::new("front view.png", vec![1, 2, 3], "image/png")],
        )
        .unwrap();

    assert_eq!(created.id, ProductId::new(6));
    assert_eq!(created.price, dec("22.40"));
    assert_eq!(created.images.len(), 1);

    let url = &created.images[0];
    let path = url
        .strip_prefix(&format!("memory://{}/", config::PRODUCT_IMAGES_BUCKET))
        .unwrap();
    assert!(path.starts_with("products/"));
    assert!(!path.contains(' '));
    assert_eq!(
        backend.object(config::PRODUCT_IMAGES_BUCKET, path).unwrap(),
        Some(vec![1, 2, 3])
    );

    // Visible to customers after the next fetch
    shop.fetch_products().unwrap();
    assert_eq!(shop.catalog().len(), 6);
}

#[test]
fn invalid_product_stores_nothing() {
    let (shop, backend, _tmp) = common::setup_seller();
    let admin = shop.admin().unwrap();

    let cases = [
        (NewProduct { name: " ".to_string(), ..scarf_form() }, "name"),
        (NewProduct { price: dec("0"), ..scarf_form() }, "price"),
        (NewProduct { category_id: None, ..scarf_form() }, "category_id"),
        (NewProduct { stock: -1, ..scarf_form() }, "stock"),
    ];
    for (form, expected) in cases {
        let images = vec![ImageUpload::new("a.png", vec![9], "image/png")];
        match admin.add_product(form, images).unwrap_err() {
            StorefrontError::Validation { field, .. } => assert_eq!(field, expected),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    assert_eq!(backend.rows(config::PRODUCTS).unwrap().len(), 5);
}

#[test]
fn empty_image_upload_is_rejected() {
    let (shop, _backend, _tmp) = common::setup_seller();
    let err = shop
        .admin()
        .unwrap()
        .add_product(scarf_form(), vec![ImageUpload::new("a.png", Vec::new(), "image/png")])
        .unwrap_err();
    assert!(matches!(err, StorefrontError::Validation { field: "image", .. }));
}

#[test]
fn update_product_changes_only_given_fields() {
    let (shop, _backend, _tmp) = common::setup_seller();
    let admin = shop.admin().unwrap();

    let updated = admin
        .update_product(
            ProductId::new(3),
            &ProductUpdate {
                price: Some(dec("14")),
                ..ProductUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.price, dec("14"));
    assert_eq!(updated.name, "Ceramic Mug");

    assert!(matches!(
        admin
            .update_product(
                ProductId::new(3),
                &ProductUpdate {
                    price: Some(dec("-1")),
                    ..ProductUpdate::default()
                },
            )
            .unwrap_err(),
        StorefrontError::Validation { field: "price", .. }
    ));
}

#[test]
fn set_stock_and_placement() {
    let (shop, _backend, _tmp) = common::setup_seller();
    let admin = shop.admin().unwrap();

    let restocked = admin.set_stock(ProductId::new(2), 12).unwrap();
    assert!(restocked.in_stock());

    let featured = admin
        .set_placement(ProductId::new(4), Placement::Featured, true)
        .unwrap();
    assert!(featured.is_featured);
    let unfeatured = admin
        .set_placement(ProductId::new(1), Placement::Featured, false)
        .unwrap();
    assert!(!unfeatured.is_featured);

    assert!(admin.set_stock(ProductId::new(2), -3).is_err());
}

#[test]
fn delete_product() {
    let (shop, backend, _tmp) = common::setup_seller();
    let admin = shop.admin().unwrap();

    admin.delete_product(ProductId::new(4)).unwrap();
    assert_eq!(backend.rows(config::PRODUCTS).unwrap().len(), 4);
    assert!(matches!(
        admin.delete_product(ProductId::new(4)).unwrap_err(),
        StorefrontError::NotFound(_)
    ));
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[test]
fn add_and_delete_empty_category() {
    let (shop, _backend, _tmp) = common::setup_seller();
    let admin = shop.admin().unwrap();

    let garden = admin
        .add_category(&NewCategory {
            name: "Garden".to_string(),
            image: None,
        })
        .unwrap();
    assert_eq!(garden.name, "Garden");

    admin.delete_category(garden.id).unwrap();
    assert!(shop.categories().get(garden.id).unwrap().is_none());
}

#[test]
fn category_with_products_cannot_be_deleted() {
    let (shop, _backend, _tmp) = common::setup_seller();
    let err = shop.admin().unwrap().delete_category(CategoryId::new(2)).unwrap_err();

    assert!(matches!(err, StorefrontError::InvalidArgument(_)));
    assert!(shop.categories().get(CategoryId::new(2)).unwrap().is_some());
}

#[test]
fn blank_category_name_is_rejected() {
    let (shop, _backend, _tmp) = common::setup_seller();
    let err = shop
        .admin()
        .unwrap()
        .add_category(&NewCategory::default())
        .unwrap_err();
    assert!(matches!(err, StorefrontError::Validation { field: "name", .. }));
}

// ---------------------------------------------------------------------------
// Orders and dashboard
// ---------------------------------------------------------------------------

fn place(shop: &mut storefront_sdk::Storefront, products: &[i64]) -> OrderId {
    let address = match shop.addresses().first() {
        Some(a) => a.id,
        None => shop.add_address(&sample_address()).unwrap().id,
    };
    for id in products {
        shop.add_to_cart_by_id(ProductId::new(*id)).unwrap();
    }
    shop.place_order(address).unwrap().id
}

#[test]
fn status_moves_forward_and_final_states_stick() {
    let (mut shop, _backend, _tmp) = common::setup_seller();
    let order_id = place(&mut shop, &[1]);
    let admin = shop.admin().unwrap();

    let shipped = admin.update_order_status(order_id, OrderStatus::Shipped).unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert_eq!(shipped.items.len(), 1);

    let delivered = admin.update_order_status(order_id, OrderStatus::Delivered).unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    // Repeating the current status is a no-op
    assert!(admin.update_order_status(order_id, OrderStatus::Delivered).is_ok());
    assert!(matches!(
        admin
            .update_order_status(order_id, OrderStatus::Cancelled)
            .unwrap_err(),
        StorefrontError::InvalidArgument(_)
    ));
}

#[test]
fn unknown_order_status_update_is_not_found() {
    let (shop, _backend, _tmp) = common::setup_seller();
    let err = shop
        .admin()
        .unwrap()
        .update_order_status(OrderId::new(404), OrderStatus::Shipped)
        .unwrap_err();
    assert!(matches!(err, StorefrontError::NotFound(_)));
}

#[test]
fn list_orders_filters_by_status() {
    let (mut shop, _backend, _tmp) = common::setup_seller();
    let first = place(&mut shop, &[1]);
    place(&mut shop, &[3]);
    let admin = shop.admin().unwrap();
    admin.update_order_status(first, OrderStatus::Shipped).unwrap();

    assert_eq!(admin.list_orders(None).unwrap().len(), 2);
    let shipped = admin.list_orders(Some(OrderStatus::Shipped)).unwrap();
    assert_eq!(shipped.len(), 1);
    assert_eq!(shipped[0].id, first);
    assert_eq!(admin.list_orders(Some(OrderStatus::Preparing)).unwrap().len(), 1);
}

#[test]
fn dashboard_excludes_cancelled_revenue() {
    let (mut shop, _backend, _tmp) = common::setup_seller();
    place(&mut shop, &[3]); // 12.50
    let cancelled = place(&mut shop, &[4]); // 30
    place(&mut shop, &[1, 2]); // 15.00
    let admin = shop.admin().unwrap();
    admin
        .update_order_status(cancelled, OrderStatus::Cancelled)
        .unwrap();

    let stats = admin.dashboard().unwrap();
    assert_eq!(stats.order_count, 3);
    assert_eq!(stats.revenue, dec("27.50"));
    assert_eq!(stats.orders_by_status.get(&OrderStatus::Preparing), Some(&2));
    assert_eq!(stats.orders_by_status.get(&OrderStatus::Cancelled), Some(&1));
    assert_eq!(stats.product_count, 5);
    assert_eq!(stats.out_of_stock, 1);
}
