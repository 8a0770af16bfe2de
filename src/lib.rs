//! Storefront SDK for Rust.
//!
//! A client for a storefront hosted on a backend-as-a-service: product
//! catalog, cart, checkout, account management and a seller admin panel.
//! Every data operation is a request to the hosted backend; the client keeps
//! the session-local cart plus mirrors of the catalog, wishlist and addresses.
//!
//! # Quick start
//!
//! ```no_run
//! use storefront_sdk::{RestConfig, Storefront};
//!
//! let mut shop = Storefront::builder()
//!     .rest(RestConfig::new("https://project.example.co", "public-anon-key"))
//!     .build()
//!     .unwrap();
//!
//! // The catalog is fetched at startup
//! let first = shop.catalog().all().first().cloned().unwrap();
//! shop.add_to_cart(&first);
//! println!("{} items, {}", shop.cart_count(), shop.cart_amount());
//! ```

pub mod admin;
#[cfg(feature = "async")]
pub mod async_client;
pub mod backend;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod queries;
pub mod query_builder;
pub mod store;

pub use admin::{AdminPanel, DashboardStats};
#[cfg(feature = "async")]
pub use async_client::AsyncStorefront;
pub use backend::{Backend, MemoryBackend, RestBackend};
pub use cache::CatalogCache;
pub use catalog::{Catalog, CatalogFilter, SortOrder};
pub use config::RestConfig;
pub use error::{Result, StorefrontError};
pub use query_builder::QueryBuilder;
pub use store::ClientStore;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use models::{
    Address, AddressId, AuthUser, CartEntry, Credentials, NewAddress, NewOrder, NewOrderItem,
    NewReview, Order, OrderStatus, Product, ProductId, Review, Role, SignUp, UserProfile,
};
use queries::{
    AddressQuery, CategoryQuery, FlagQuery, OrderQuery, ProductQuery, ReviewQuery, UserQuery,
    WishlistQuery,
};

// ---------------------------------------------------------------------------
// StorefrontBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`Storefront`].
///
/// Use [`Storefront::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](StorefrontBuilder::build).
pub struct StorefrontBuilder {
    backend: Option<Box<dyn Backend>>,
    rest: Option<RestConfig>,
    cache_dir: Option<PathBuf>,
    offline: bool,
    timeout: Option<Duration>,
    sync_on_build: bool,
}

impl Default for StorefrontBuilder {
    fn default() -> Self {
        Self {
            backend: None,
            rest: None,
            cache_dir: None,
            offline: false,
            timeout: None,
            sync_on_build: true,
        }
    }
}

impl StorefrontBuilder {
    /// Use an already constructed backend. Takes precedence over [`rest`](Self::rest).
    pub fn backend<B: Backend + 'static>(mut self, backend: B) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Connect to the hosted backend over HTTP.
    ///
    /// If neither this nor [`backend`](Self::backend) is set, the REST
    /// settings are read from the environment (see [`RestConfig::from_env`]).
    pub fn rest(mut self, config: RestConfig) -> Self {
        self.rest = Some(config);
        self
    }

    /// Set a custom directory for the catalog snapshot.
    ///
    /// If not set, the platform-appropriate default cache directory is used
    /// (e.g. `~/.cache/storefront-sdk` on Linux).
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Serve the catalog from the last saved snapshot instead of the backend.
    ///
    /// Defaults to `false`. Cart operations work the same either way.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// HTTP request timeout for the REST backend. Overrides the value in
    /// the [`RestConfig`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether [`build()`](Self::build) performs the initial sync.
    ///
    /// Defaults to `true`. A failed initial fetch does not fail the build;
    /// it is reported through [`Storefront::catalog_error`].
    pub fn sync_on_build(mut self, sync: bool) -> Self {
        self.sync_on_build = sync;
        self
    }

    /// Build the storefront and, unless disabled, load the catalog and any
    /// existing session's user data.
    pub fn build(self) -> Result<Storefront> {
        let backend: Box<dyn Backend> = match self.backend {
            Some(backend) => backend,
            None => {
                let mut config = match self.rest {
                    Some(config) => config,
                    None => RestConfig::from_env()?,
                };
                if let Some(timeout) = self.timeout {
                    config.timeout = timeout;
                }
                Box::new(RestBackend::new(config)?)
            }
        };

        let cache = CatalogCache::new(self.cache_dir, self.offline)?;
        let mut storefront = Storefront {
            backend,
            store: ClientStore::new(),
            cache,
            profile: None,
        };

        if self.sync_on_build {
            if let Err(e) = storefront.restore_session() {
                warn!(error = %e, "could not restore session");
            }
            if let Err(e) = storefront.sync() {
                warn!(error = %e, "initial sync failed");
            }
        }

        Ok(storefront)
    }
}

// ---------------------------------------------------------------------------
// Storefront
// ---------------------------------------------------------------------------

/// The application-wide state holder.
///
/// Owns the backend handle, the client store (cart and mirrors), the catalog
/// snapshot cache and the signed-in user's profile. Create one at application
/// start, pass it to every view that needs it, and [`close`](Self::close) it
/// at session end.
pub struct Storefront {
    backend: Box<dyn Backend>,
    store: ClientStore,
    cache: CatalogCache,
    profile: Option<UserProfile>,
}

impl Storefront {
    /// Create a new builder for configuring the storefront.
    pub fn builder() -> StorefrontBuilder {
        StorefrontBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Product table queries.
    pub fn products(&self) -> ProductQuery<'_> {
        ProductQuery::new(self.backend.as_ref())
    }

    pub fn categories(&self) -> CategoryQuery<'_> {
        CategoryQuery::new(self.backend.as_ref())
    }

    pub fn reviews(&self) -> ReviewQuery<'_> {
        ReviewQuery::new(self.backend.as_ref())
    }

    pub fn orders(&self) -> OrderQuery<'_> {
        OrderQuery::new(self.backend.as_ref())
    }

    /// Profile rows keyed by auth user id.
    pub fn users(&self) -> UserQuery<'_> {
        UserQuery::new(self.backend.as_ref())
    }

    /// Application-wide switches from the key-value flag table.
    pub fn flags(&self) -> FlagQuery<'_> {
        FlagQuery::new(self.backend.as_ref())
    }

    /// Direct access to the backend for operations not covered above.
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// The client store holding the cart and mirrors.
    pub fn store(&self) -> &ClientStore {
        &self.store
    }

    // -- Catalog -----------------------------------------------------------

    /// Replace the cached catalog with a fresh copy.
    ///
    /// Online, a successful fetch also refreshes the on-disk snapshot. In
    /// offline mode the snapshot is read instead. On failure the previous
    /// catalog is kept (empty before the first success), the error message
    /// is exposed through [`catalog_error`](Self::catalog_error), and
    /// nothing is retried.
    pub fn fetch_products(&mut self) -> Result<usize> {
        let fetched = if self.cache.offline {
            self.cache.load()
        } else {
            self.products().list_all()
        };

        match fetched {
            Ok(products) => {
                if !self.cache.offline {
                    if let Err(e) = self.cache.save(&products) {
                        warn!(error = %e, "could not write catalog snapshot");
                    }
                }
                let count = products.len();
                self.store.replace_catalog(products);
                info!(products = count, offline = self.cache.offline, "catalog loaded");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "catalog fetch failed");
                self.store.set_catalog_error(e.to_string());
                Err(e)
            }
        }
    }

    /// View over the cached catalog.
    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(self.store.catalog())
    }

    pub fn catalog_error(&self) -> Option<&str> {
        self.store.catalog_error()
    }

    /// Reload the catalog and, when signed in, the user's addresses and
    /// wishlist. User data is loaded even if the catalog fetch fails; the
    /// first error is returned.
    pub fn sync(&mut self) -> Result<()> {
        let catalog = self.fetch_products().map(|_| ());
        let user = if self.profile.is_some() {
            self.load_user_data()
        } else {
            Ok(())
        };
        catalog.and(user)
    }

    // -- Cart --------------------------------------------------------------

    pub fn add_to_cart(&mut self, product: &Product) {
        self.store.add_to_cart(product);
        debug!(product_id = %product.id, count = self.store.cart_count(), "added to cart");
    }

    /// Add a product from the cached catalog by id.
    pub fn add_to_cart_by_id(&mut self, product_id: ProductId) -> Result<()> {
        let product = self
            .store
            .product(product_id)
            .cloned()
            .ok_or_else(|| StorefrontError::NotFound(format!("product {product_id}")))?;
        self.add_to_cart(&product);
        Ok(())
    }

    /// Set a cart entry's quantity; zero or less removes it. Fails with
    /// [`StorefrontError::NotFound`] if the product is not in the cart.
    pub fn update_cart_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<()> {
        self.store.update_cart_quantity(product_id, quantity)
    }

    pub fn remove_from_cart(&mut self, product_id: ProductId) -> Option<CartEntry> {
        self.store.remove_from_cart(product_id)
    }

    pub fn clear_cart(&mut self) {
        self.store.clear_cart();
    }

    pub fn cart_count(&self) -> u64 {
        self.store.cart_count()
    }

    pub fn cart_amount(&self) -> Decimal {
        self.store.cart_amount()
    }

    pub fn cart_entries(&self) -> impl Iterator<Item = &CartEntry> {
        self.store.cart_entries()
    }

    // -- Account -----------------------------------------------------------

    /// The signed-in user's profile.
    pub fn current_user(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    fn require_user(&self) -> Result<&UserProfile> {
        self.profile.as_ref().ok_or(StorefrontError::Unauthenticated)
    }

    /// Register and, when the service issues a session right away, sign in.
    ///
    /// Returns `None` if the account must be confirmed before signing in.
    pub fn sign_up(&mut self, form: &SignUp) -> Result<Option<UserProfile>> {
        form.validate()?;
        let Some(session) = self.backend.sign_up(&form.credentials)? else {
            info!(email = %form.credentials.email, "sign-up pending confirmation");
            return Ok(None);
        };

        let profile = UserProfile {
            id: session.user.id,
            name: form.name.trim().to_string(),
            email: form.credentials.email.trim().to_string(),
            role: Role::Customer,
        };
        let profile = self.users().create(&profile)?;
        info!(user_id = %profile.id, "signed up");
        self.profile = Some(profile.clone());
        self.load_user_data()?;
        Ok(Some(profile))
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<UserProfile> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(StorefrontError::validation("email", "email and password are required"));
        }
        let session = self
            .backend
            .sign_in(&Credentials::new(email.trim(), password))?;
        let profile = self.ensure_profile(&session.user)?;
        info!(user_id = %profile.id, "signed in");
        self.profile = Some(profile.clone());
        self.load_user_data()?;
        Ok(profile)
    }

    /// Pick up a session the backend already holds.
    pub fn restore_session(&mut self) -> Result<Option<UserProfile>> {
        let Some(session) = self.backend.session()? else {
            return Ok(None);
        };
        let profile = self.ensure_profile(&session.user)?;
        self.profile = Some(profile.clone());
        self.load_user_data()?;
        Ok(Some(profile))
    }

    /// End the session and drop user data. The cart is kept. Local state is
    /// cleared even if the remote sign-out fails.
    pub fn sign_out(&mut self) -> Result<()> {
        let result = self.backend.sign_out();
        if let Some(profile) = self.profile.take() {
            info!(user_id = %profile.id, "signed out");
        }
        self.store.clear_user_data();
        result
    }

    /// Load the profile row, creating one for accounts that have none yet.
    fn ensure_profile(&self, user: &AuthUser) -> Result<UserProfile> {
        let users = self.users();
        if let Some(profile) = users.get(user.id)? {
            return Ok(profile);
        }
        let email = user.email.clone().unwrap_or_default();
        let name = email.split('@').next().unwrap_or_default().to_string();
        users.create(&UserProfile {
            id: user.id,
            name,
            email,
            role: Role::Customer,
        })
    }

    fn load_user_data(&mut self) -> Result<()> {
        self.fetch_addresses()?;
        self.fetch_wishlist()?;
        Ok(())
    }

    // -- Addresses ---------------------------------------------------------

    pub fn fetch_addresses(&mut self) -> Result<&[Address]> {
        let user_id = self.require_user()?.id;
        let addresses = AddressQuery::new(self.backend.as_ref()).for_user(user_id)?;
        self.store.set_addresses(addresses);
        Ok(self.store.addresses())
    }

    pub fn addresses(&self) -> &[Address] {
        self.store.addresses()
    }

    pub fn add_address(&mut self, address: &NewAddress) -> Result<Address> {
        let user_id = self.require_user()?.id;
        let created = AddressQuery::new(self.backend.as_ref()).insert(user_id, address)?;
        self.store.upsert_address(created.clone());
        Ok(created)
    }

    pub fn update_address(&mut self, id: AddressId, address: &NewAddress) -> Result<Address> {
        let user_id = self.require_user()?.id;
        let updated = AddressQuery::new(self.backend.as_ref()).update(user_id, id, address)?;
        self.store.upsert_address(updated.clone());
        Ok(updated)
    }

    pub fn delete_address(&mut self, id: AddressId) -> Result<()> {
        let user_id = self.require_user()?.id;
        AddressQuery::new(self.backend.as_ref()).delete(user_id, id)?;
        self.store.remove_address(id);
        Ok(())
    }

    // -- Wishlist ----------------------------------------------------------

    pub fn fetch_wishlist(&mut self) -> Result<&BTreeSet<ProductId>> {
        let user_id = self.require_user()?.id;
        let ids = WishlistQuery::new(self.backend.as_ref()).for_user(user_id)?;
        self.store.set_wishlist(ids);
        Ok(self.store.wishlist())
    }

    pub fn wishlist(&self) -> &BTreeSet<ProductId> {
        self.store.wishlist()
    }

    pub fn is_wishlisted(&self, product_id: ProductId) -> bool {
        self.store.is_wishlisted(product_id)
    }

    /// Favorite or unfavorite a product. Returns the new state.
    pub fn toggle_wishlist(&mut self, product_id: ProductId) -> Result<bool> {
        let user_id = self.require_user()?.id;
        let wishlist = WishlistQuery::new(self.backend.as_ref());
        let now_wishlisted = if self.store.is_wishlisted(product_id) {
            wishlist.remove(user_id, product_id)?;
            false
        } else {
            wishlist.add(user_id, product_id)?;
            true
        };
        self.store.mark_wishlisted(product_id, now_wishlisted);
        Ok(now_wishlisted)
    }

    // -- Checkout & orders -------------------------------------------------

    /// Place an order for the whole cart, shipped to a saved address.
    ///
    /// The order stores a snapshot of the address and each line's unit
    /// price. The cart is cleared only after the backend accepts the order.
    pub fn place_order(&mut self, address_id: AddressId) -> Result<Order> {
        let user_id = self.require_user()?.id;
        if self.store.cart_is_empty() {
            return Err(StorefrontError::validation("cart", "the cart is empty"));
        }
        let address = self
            .store
            .address(address_id)
            .ok_or_else(|| StorefrontError::NotFound(format!("address {address_id}")))?;

        let order = NewOrder {
            user_id,
            created_at: Utc::now(),
            amount: self.store.cart_amount(),
            status: OrderStatus::Preparing,
            address: address.snapshot(),
        };
        let items: Vec<NewOrderItem> = self
            .store
            .cart_entries()
            .map(|entry| NewOrderItem {
                product_id: entry.product.id,
                quantity: entry.quantity,
                price: entry.product.price,
            })
            .collect();

        let placed = self.orders().create(&order, &items)?;
        info!(order_id = %placed.id, amount = %placed.amount, "order placed");
        self.store.clear_cart();
        Ok(placed)
    }

    /// The signed-in user's orders, newest first.
    pub fn my_orders(&self) -> Result<Vec<Order>> {
        let user_id = self.require_user()?.id;
        self.orders().for_user(user_id)
    }

    pub fn add_review(&self, product_id: ProductId, rating: u8, comment: &str) -> Result<Review> {
        let user = self.require_user()?;
        let review = NewReview {
            product_id,
            user_id: user.id,
            name: user.name.clone(),
            rating,
            comment: comment.trim().to_string(),
            created_at: Utc::now(),
        };
        self.reviews().add(&review)
    }

    // -- Seller panel ------------------------------------------------------

    /// Open the admin panel. The role is re-read from the backend on every
    /// call so a revoked seller loses access immediately.
    pub fn admin(&self) -> Result<AdminPanel<'_>> {
        let user_id = self.require_user()?.id;
        let profile = self
            .users()
            .get(user_id)?
            .ok_or_else(|| StorefrontError::NotFound(format!("user {user_id}")))?;
        if !profile.is_seller() {
            return Err(StorefrontError::Forbidden(
                "the seller panel requires a seller account".to_string(),
            ));
        }
        Ok(AdminPanel::new(self.backend.as_ref()))
    }

    // -- Lifecycle ---------------------------------------------------------

    /// Return a reference to the catalog snapshot cache.
    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Consume the storefront at session end, releasing the backend client.
    pub fn close(self) {
        debug!(cart_count = self.store.cart_count(), "storefront closed");
        drop(self);
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Storefront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Storefront(products={}, cart_count={}, user={}, offline={})",
            self.store.catalog().len(),
            self.store.cart_count(),
            self.profile.as_ref().map_or("-", |p| p.email.as_str()),
            self.cache.offline
        )
    }
}
