pub mod address;
pub mod cart;
pub mod category;
pub mod flag;
pub mod ids;
pub mod order;
pub mod product;
pub mod review;
pub mod user;
pub mod wishlist;

pub use address::*;
pub use cart::*;
pub use category::*;
pub use flag::*;
pub use ids::*;
pub use order::*;
pub use product::*;
pub use review::*;
pub use user::*;
pub use wishlist::*;

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable column into `T`, mapping `null` to `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
