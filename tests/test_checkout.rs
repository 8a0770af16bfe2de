//! Placing orders from the cart, order history and product reviews.

mod common;

use common::{dec, sample_address};
use storefront_sdk::models::{AddressId, OrderStatus, ProductId};
use storefront_sdk::{config, StorefrontError};

// ---------------------------------------------------------------------------
// place_order
// ---------------------------------------------------------------------------

#[test]
fn place_order_records_amount_items_and_address() {
    let (mut shop, backend, _tmp) = common::setup_signed_in();
    let address = shop.add_address(&sample_address()).unwrap();
    shop.add_to_cart_by_id(ProductId::new(1)).unwrap();
    shop.add_to_cart_by_id(ProductId::new(1)).unwrap();
    shop.add_to_cart_by_id(ProductId::new(2)).unwrap();

    let order = shop.place_order(address.id).unwrap();

    assert_eq!(order.amount, dec("25.01"));
    assert_eq!(order.status, OrderStatus::Preparing);
    assert_eq!(order.user_id, shop.current_user().unwrap().id);
    assert_eq!(order.address, address.snapshot());
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.item_count(), 3);

    let shirt_line = order
        .items
        .iter()
        .find(|i| i.product_id == ProductId::new(1))
        .unwrap();
    assert_eq!(shirt_line.quantity, 2);
    assert_eq!(shirt_line.price, dec("10.005"));

    assert_eq!(backend.rows(config::ORDERS).unwrap().len(), 1);
    assert_eq!(backend.rows(config::ORDER_ITEMS).unwrap().len(), 2);
}

#[test]
fn place_order_clears_cart() {
    let (mut shop, _backend, _tmp) = common::setup_signed_in();
    let address = shop.add_address(&sample_address()).unwrap();
    shop.add_to_cart_by_id(ProductId::new(3)).unwrap();

    shop.place_order(address.id).unwrap();
    assert_eq!(shop.cart_count(), 0);
}

#[test]
fn place_order_requires_sign_in() {
    let (mut shop, _backend, _tmp) = common::setup_storefront();
    shop.add_to_cart_by_id(ProductId::new(3)).unwrap();

    assert!(matches!(
        shop.place_order(AddressId::new(1)).unwrap_err(),
        StorefrontError::Unauthenticated
    ));
    assert_eq!(shop.cart_count(), 1);
}

#[test]
fn place_order_with_empty_cart_is_rejected() {
    let (mut shop, backend, _tmp) = common::setup_signed_in();
    let address = shop.add_address(&sample_address()).unwrap();

    match shop.place_order(address.id).unwrap_err() {
        StorefrontError::Validation { field, .. } => assert_eq!(field, "cart"),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(backend.rows(config::ORDERS).unwrap().is_empty());
}

#[test]
fn place_order_with_unknown_address_is_not_found() {
    let (mut shop, _backend, _tmp) = common::setup_signed_in();
    shop.add_to_cart_by_id(ProductId::new(3)).unwrap();

    assert!(matches!(
        shop.place_order(AddressId::new(77)).unwrap_err(),
        StorefrontError::NotFound(_)
    ));
    assert_eq!(shop.cart_count(), 1);
}

#[test]
fn failed_line_items_roll_back_order_and_keep_cart() {
    let (mut shop, backend, _tmp) = common::setup_signed_in();
    let address = shop.add_address(&sample_address()).unwrap();
    shop.add_to_cart_by_id(ProductId::new(1)).unwrap();
    backend.set_unavailable(config::ORDER_ITEMS, true).unwrap();

    let err = shop.place_order(address.id).unwrap_err();
    assert!(err.is_transient());
    assert!(backend.rows(config::ORDERS).unwrap().is_empty());
    assert_eq!(shop.cart_count(), 1);
}

#[test]
fn address_snapshot_survives_address_edits() {
    let (mut shop, _backend, _tmp) = common::setup_signed_in();
    let address = shop.add_address(&sample_address()).unwrap();
    shop.add_to_cart_by_id(ProductId::new(4)).unwrap();
    let order = shop.place_order(address.id).unwrap();

    shop.delete_address(address.id).unwrap();

    let history = shop.my_orders().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, order.id);
    assert_eq!(history[0].address.city, "London");
}

// ---------------------------------------------------------------------------
// Order history
// ---------------------------------------------------------------------------

#[test]
fn my_orders_includes_items_and_only_own_orders() {
    let (mut shop, backend, _tmp) = common::setup_signed_in();
    let address = shop.add_address(&sample_address()).unwrap();
    shop.add_to_cart_by_id(ProductId::new(1)).unwrap();
    shop.place_order(address.id).unwrap();
    shop.add_to_cart_by_id(ProductId::new(3)).unwrap();
    shop.add_to_cart_by_id(ProductId::new(4)).unwrap();
    shop.place_order(address.id).unwrap();

    let (mut other, _tmp2) = common::storefront_over(backend);
    other
        .sign_up(&storefront_sdk::models::SignUp::new(
            "Grace",
            "grace@example.com",
            "hopper-1906",
        ))
        .unwrap();
    assert!(other.my_orders().unwrap().is_empty());

    let mine = shop.my_orders().unwrap();
    assert_eq!(mine.len(), 2);
    let total_items: u64 = mine.iter().map(|o| o.item_count()).sum();
    assert_eq!(total_items, 3);
}

#[test]
fn my_orders_requires_sign_in() {
    let (shop, _backend, _tmp) = common::setup_storefront();
    assert!(matches!(
        shop.my_orders().unwrap_err(),
        StorefrontError::Unauthenticated
    ));
}

#[test]
fn order_status_parses_case_insensitively() {
    assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
    assert_eq!(" cancelled ".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
    assert!("lost".parse::<OrderStatus>().is_err());
    assert!(OrderStatus::Delivered.is_final());
    assert!(!OrderStatus::Shipped.is_final());
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[test]
fn add_review_uses_profile_name() {
    let (shop, _backend, _tmp) = common::setup_signed_in();
    let review = shop.add_review(ProductId::new(3), 5, "  Great mug  ").unwrap();

    assert_eq!(review.name, "Ada");
    assert_eq!(review.comment, "Great mug");
    assert_eq!(review.rating, 5);
}

#[test]
fn review_rating_must_be_in_range() {
    let (shop, backend, _tmp) = common::setup_signed_in();
    for rating in [0, 6] {
        match shop.add_review(ProductId::new(3), rating, "ok").unwrap_err() {
            StorefrontError::Validation { field, .. } => assert_eq!(field, "rating"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
    assert!(backend.rows(config::REVIEWS).unwrap().is_empty());
}

#[test]
fn review_requires_comment_and_sign_in() {
    let (shop, _backend, _tmp) = common::setup_signed_in();
    assert!(matches!(
        shop.add_review(ProductId::new(3), 4, "   ").unwrap_err(),
        StorefrontError::Validation { field: "comment", .. }
    ));

    let (anonymous, _b, _t) = common::setup_storefront();
    assert!(matches!(
        anonymous.add_review(ProductId::new(3), 4, "fine").unwrap_err(),
        StorefrontError::Unauthenticated
    ));
}

#[test]
fn review_summary_averages_ratings() {
    let (shop, _backend, _tmp) = common::setup_signed_in();
    shop.add_review(ProductId::new(3), 5, "Great").unwrap();
    shop.add_review(ProductId::new(3), 2, "Chipped").unwrap();
    shop.add_review(ProductId::new(1), 1, "Too small").unwrap();

    let summary = shop.reviews().summary(ProductId::new(3)).unwrap();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.average, Some(3.5));

    let empty = shop.reviews().summary(ProductId::new(4)).unwrap();
    assert_eq!(empty.count, 0);
    assert!(empty.average.is_none());

    assert_eq!(shop.reviews().for_product(ProductId::new(3)).unwrap().len(), 2);
}
