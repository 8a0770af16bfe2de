//! Query modules for the storefront backend.
//!
//! Each module provides a query struct that borrows a [`Backend`](crate::backend::Backend)
//! and exposes typed methods returning `Result<T>`. Query structs hold no state
//! of their own; session-aware flows live on [`Storefront`](crate::Storefront).

pub mod addresses;
pub mod categories;
pub mod flags;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wishlist;

pub use addresses::AddressQuery;
pub use categories::CategoryQuery;
pub use flags::FlagQuery;
pub use orders::OrderQuery;
pub use products::{ImageUpload, ProductQuery, StoredImage};
pub use reviews::ReviewQuery;
pub use users::UserQuery;
pub use wishlist::WishlistQuery;
