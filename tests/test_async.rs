//! Async wrapper over the in-memory backend.

#![cfg(feature = "async")]

mod common;

use common::{dec, sample_address};
use storefront_sdk::models::{ProductId, SignUp};
use storefront_sdk::AsyncStorefront;

#[tokio::test]
async fn build_and_fetch() {
    let tmp = tempfile::tempdir().unwrap();
    let shop = AsyncStorefront::builder()
        .backend(common::setup_backend())
        .cache_dir(tmp.path())
        .build()
        .await
        .unwrap();

    assert_eq!(shop.fetch_products().await.unwrap(), 5);
    assert_eq!(shop.run(|s| Ok(s.catalog().len())).await.unwrap(), 5);
    shop.close().await.unwrap();
}

#[tokio::test]
async fn cart_and_checkout() {
    let tmp = tempfile::tempdir().unwrap();
    let shop = AsyncStorefront::builder()
        .backend(common::setup_backend())
        .cache_dir(tmp.path())
        .build()
        .await
        .unwrap();

    let address_id = shop
        .run(|s| {
            s.sign_up(&SignUp::new("Ada", common::EMAIL, common::PASSWORD))?;
            s.add_to_cart_by_id(ProductId::new(1))?;
            s.add_to_cart_by_id(ProductId::new(1))?;
            s.add_to_cart_by_id(ProductId::new(2))?;
            Ok(s.add_address(&sample_address())?.id)
        })
        .await
        .unwrap();

    assert_eq!(shop.cart_count().await.unwrap(), 3);
    assert_eq!(shop.cart_amount().await.unwrap(), dec("25.01"));

    let order = shop.place_order(address_id).await.unwrap();
    assert_eq!(order.amount, dec("25.01"));
    assert_eq!(shop.cart_count().await.unwrap(), 0);
}

#[tokio::test]
async fn clones_share_state() {
    let tmp = tempfile::tempdir().unwrap();
    let shop = AsyncStorefront::builder()
        .backend(common::setup_backend())
        .cache_dir(tmp.path())
        .build()
        .await
        .unwrap();
    let other = shop.clone();

    other
        .run(|s| s.add_to_cart_by_id(ProductId::new(3)))
        .await
        .unwrap();
    assert_eq!(shop.cart_count().await.unwrap(), 1);

    other.close().await.unwrap();
    assert_eq!(shop.cart_count().await.unwrap(), 1);
}
