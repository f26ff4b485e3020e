//! Read-only snapshot of the backend catalog.
//!
//! The catalog is fetched once per session. There is no pagination, no
//! filtering and no automatic retry: if the fetch fails the cache stays empty
//! until the caller explicitly asks again.

use shopping_portal_core::{Item, ItemId};
use tracing::{debug, info, instrument};

use crate::error::FetchResult;
use crate::gateway::ApiGateway;

/// Cached copy of the item catalog.
#[derive(Debug, Default)]
pub struct CatalogCache {
    items: Vec<Item>,
    loaded: bool,
}

impl CatalogCache {
    /// Create an empty, unloaded cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the catalog if it has not been loaded yet.
    ///
    /// Once loaded, the snapshot is returned without a request.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` if the request fails; the cache stays empty.
    #[instrument(skip(self, gateway))]
    pub async fn load_items(&mut self, gateway: &ApiGateway) -> FetchResult<&[Item]> {
        if self.loaded {
            debug!(count = self.items.len(), "Catalog already loaded");
            return Ok(&self.items);
        }

        let items = gateway.list_items().await?;
        info!(count = items.len(), "Catalog loaded");
        self.items = items;
        self.loaded = true;
        Ok(&self.items)
    }

    /// Look up a cached item by id.
    #[must_use]
    pub fn find(&self, item_id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == item_id)
    }

    /// The cached items, empty until loaded.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Whether a fetch has succeeded since creation or the last clear.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Drop the snapshot so the next session fetches a fresh one.
    pub fn clear(&mut self) {
        self.items.clear();
        self.loaded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::gateway::GatewayError;

    fn loaded(items: Vec<Item>) -> CatalogCache {
        CatalogCache {
            items,
            loaded: true,
        }
    }

    fn widget() -> Item {
        Item {
            id: ItemId::from(1),
            name: "Widget".to_string(),
        }
    }

    #[test]
    fn test_find_by_id() {
        let cache = loaded(vec![widget()]);
        assert_eq!(cache.find(&ItemId::from(1)).map(|i| i.name.as_str()), Some("Widget"));
        assert!(cache.find(&ItemId::from(2)).is_none());
        assert!(cache.find(&ItemId::from("1")).is_none());
    }

    #[test]
    fn test_clear_resets_loaded_flag() {
        let mut cache = loaded(vec![widget()]);
        cache.clear();
        assert!(!cache.is_loaded());
        assert!(cache.items().is_empty());
    }

    #[tokio::test]
    async fn test_loaded_cache_makes_no_request() {
        let gateway = crate::test_support::unreachable_gateway();
        let mut cache = loaded(vec![widget()]);
        let items = cache.load_items(&gateway).await.expect("served from cache");
        assert_eq!(items, &[widget()]);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_cache_empty() {
        let gateway = crate::test_support::unreachable_gateway();
        let mut cache = CatalogCache::new();
        let err = cache.load_items(&gateway).await.expect_err("nothing is listening");
        assert!(matches!(err, FetchError::Gateway(GatewayError::Transport(_))));
        assert!(!cache.is_loaded());
        assert!(cache.items().is_empty());
    }
}
