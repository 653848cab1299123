//! In-memory caches for hot read paths.
//!
//! Per-user snapshots (cart, wishlist, profile) are read-through: a miss
//! loads from the database and populates the entry. Every mutation removes
//! the affected user's entry after its write commits. The cache is best
//! effort; a snapshot may be stale between a write and its invalidation,
//! and the database constraints are what keep the data correct.
//!
//! Catalog listings and details are cached for 5 minutes and dropped on
//! revalidation from the admin.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use maison_core::UserId;

use crate::models::{CartSnapshot, ProductDetail, ProductPage, User, WishlistSnapshot};

const USER_CACHE_CAPACITY: u64 = 10_000;
const USER_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const CATALOG_CACHE_CAPACITY: u64 = 1_000;
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cache key for catalog entries.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CatalogKey {
    /// A listing page, keyed by its normalized filter.
    Listing(String),
    /// A product detail, keyed by slug.
    Detail(String),
}

/// Cached catalog values.
#[derive(Debug, Clone)]
pub enum CatalogValue {
    Listing(Arc<ProductPage>),
    Detail(Arc<ProductDetail>),
}

/// All storefront caches. Cheap to clone.
#[derive(Clone)]
pub struct ShopCache {
    carts: Cache<UserId, Arc<CartSnapshot>>,
    wishlists: Cache<UserId, Arc<WishlistSnapshot>>,
    profiles: Cache<UserId, Arc<User>>,
    catalog: Cache<CatalogKey, CatalogValue>,
}

fn user_cache<V: Clone + Send + Sync + 'static>() -> Cache<UserId, V> {
    Cache::builder()
        .max_capacity(USER_CACHE_CAPACITY)
        .time_to_live(USER_CACHE_TTL)
        .build()
}

impl Default for ShopCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ShopCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            carts: user_cache(),
            wishlists: user_cache(),
            profiles: user_cache(),
            catalog: Cache::builder()
                .max_capacity(CATALOG_CACHE_CAPACITY)
                .time_to_live(CATALOG_CACHE_TTL)
                .build(),
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub async fn cart(&self, user_id: UserId) -> Option<Arc<CartSnapshot>> {
        self.carts.get(&user_id).await
    }

    pub async fn put_cart(&self, snapshot: Arc<CartSnapshot>) {
        self.carts.insert(snapshot.user_id, snapshot).await;
    }

    pub async fn invalidate_cart(&self, user_id: UserId) {
        debug!(%user_id, "Invalidating cart cache");
        self.carts.invalidate(&user_id).await;
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    pub async fn wishlist(&self, user_id: UserId) -> Option<Arc<WishlistSnapshot>> {
        self.wishlists.get(&user_id).await
    }

    pub async fn put_wishlist(&self, snapshot: Arc<WishlistSnapshot>) {
        self.wishlists.insert(snapshot.user_id, snapshot).await;
    }

    pub async fn invalidate_wishlist(&self, user_id: UserId) {
        debug!(%user_id, "Invalidating wishlist cache");
        self.wishlists.invalidate(&user_id).await;
    }

    // =========================================================================
    // Profile
    // =========================================================================

    pub async fn profile(&self, user_id: UserId) -> Option<Arc<User>> {
        self.profiles.get(&user_id).await
    }

    pub async fn put_profile(&self, user: Arc<User>) {
        self.profiles.insert(user.id, user).await;
    }

    pub async fn invalidate_profile(&self, user_id: UserId) {
        self.profiles.invalidate(&user_id).await;
    }

    /// Drop every cached snapshot belonging to a user.
    pub async fn drop_user(&self, user_id: UserId) {
        self.invalidate_cart(user_id).await;
        self.invalidate_wishlist(user_id).await;
        self.invalidate_profile(user_id).await;
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub async fn catalog(&self, key: &CatalogKey) -> Option<CatalogValue> {
        self.catalog.get(key).await
    }

    pub async fn put_catalog(&self, key: CatalogKey, value: CatalogValue) {
        self.catalog.insert(key, value).await;
    }

    /// Drop all catalog entries (listing and detail).
    pub fn invalidate_catalog(&self) {
        self.catalog.invalidate_all();
    }

    /// Drop the cached detail for one product.
    pub async fn invalidate_product(&self, slug: &str) {
        self.catalog
            .invalidate(&CatalogKey::Detail(slug.to_string()))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use maison_core::Price;

    use super::*;

    #[tokio::test]
    async fn test_new_starts_empty_for_every_kind() {
        let cache = ShopCache::new();
        let user = UserId::new(3);
        assert!(cache.cart(user).await.is_none());
        assert!(cache.wishlist(user).await.is_none());
        assert!(cache.profile(user).await.is_none());
        assert!(
            cache
                .catalog(&CatalogKey::Detail("silk-scarf".to_string()))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_cart_read_then_invalidate() {
        let cache = ShopCache::new();
        let user = UserId::new(42);
        assert!(cache.cart(user).await.is_none());

        cache
            .put_cart(Arc::new(CartSnapshot::new(user, Vec::new())))
            .await;
        let hit = cache.cart(user).await;
        assert_eq!(hit.map(|c| c.active_subtotal), Some(Price::ZERO));

        cache.invalidate_cart(user).await;
        assert!(cache.cart(user).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidation_is_per_user() {
        let cache = ShopCache::new();
        let (alice, bob) = (UserId::new(1), UserId::new(2));
        cache.put_wishlist(Arc::new(WishlistSnapshot::new(alice, Vec::new()))).await;
        cache.put_wishlist(Arc::new(WishlistSnapshot::new(bob, Vec::new()))).await;

        cache.invalidate_wishlist(alice).await;
        assert!(cache.wishlist(alice).await.is_none());
        assert!(cache.wishlist(bob).await.is_some());
    }

    #[tokio::test]
    async fn test_drop_user_clears_all_snapshots() {
        let cache = ShopCache::new();
        let user = UserId::new(7);
        cache.put_cart(Arc::new(CartSnapshot::new(user, Vec::new()))).await;
        cache.put_wishlist(Arc::new(WishlistSnapshot::new(user, Vec::new()))).await;

        cache.drop_user(user).await;
        assert!(cache.cart(user).await.is_none());
        assert!(cache.wishlist(user).await.is_none());
    }
}
