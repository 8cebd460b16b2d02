use std::collections::HashSet;

use tracing::{debug, warn};

use super::client::CatalogApi;
use super::error::Result;
use super::types::ListingRecord;

/// Counters for a finished (or in-progress) pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagerStats {
    pub pages_fetched: u32,
    pub pages_failed: u32,
    pub duplicates_skipped: u32,
}

/// Offset-based walk over a shop's active listings.
///
/// The total is taken from the `count` of every successful page, so the
/// loop tracks listings added or removed mid-run. A failed page is logged
/// and skipped once a total is known; before that there is nothing to page
/// against and the error is returned.
pub struct ListingPager<'a> {
    api: &'a dyn CatalogApi,
    shop_id: String,
    page_size: u32,
    offset: u64,
    total: Option<u64>,
    seen: HashSet<u64>,
    stats: PagerStats,
}

/// Starts paging the shop's active listings. Nothing is fetched until the
/// first call to [`ListingPager::next_batch`].
pub fn list_active_listings<'a>(
    api: &'a dyn CatalogApi,
    shop_id: &str,
    page_size: u32,
) -> ListingPager<'a> {
    ListingPager {
        api,
        shop_id: shop_id.to_string(),
        page_size: page_size.max(1),
        offset: 0,
        total: None,
        seen: HashSet::new(),
        stats: PagerStats::default(),
    }
}

impl<'a> ListingPager<'a> {
    pub fn stats(&self) -> PagerStats {
        self.stats
    }

    /// Fetches the next page. `Ok(None)` once `offset >= total`; a failed
    /// page after the first yields an empty batch.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<ListingRecord>>> {
        if let Some(total) = self.total {
            if self.offset >= total {
                return Ok(None);
            }
        }

        let offset = self.offset;
        self.offset += u64::from(self.page_size);

        match self
            .api
            .fetch_listings_page(&self.shop_id, offset, self.page_size)
            .await
        {
            Ok(page) => {
                if let Some(previous) = self.total {
                    if previous != page.count {
                        warn!(previous, current = page.count, "Listing count changed during export");
                    }
                }
                self.total = Some(page.count);
                self.stats.pages_fetched += 1;
                debug!(offset, count = page.count, received = page.results.len(), "Fetched listings page");

                let mut batch = Vec::with_capacity(page.results.len());
                for listing in page.results {
                    if self.seen.insert(listing.listing_id) {
                        batch.push(listing);
                    } else {
                        self.stats.duplicates_skipped += 1;
                        debug!(listing_id = listing.listing_id, "Skipping listing already seen");
                    }
                }
                Ok(Some(batch))
            }
            Err(e) if self.total.is_some() => {
                self.stats.pages_failed += 1;
                warn!(offset, error = %e, "Failed to fetch listings page, skipping");
                Ok(Some(Vec::new()))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fake::FakeCatalog;

    async fn drain(pager: &mut ListingPager<'_>) -> Result<Vec<ListingRecord>> {
        let mut listings = Vec::new();
        while let Some(batch) = pager.next_batch().await? {
            listings.extend(batch);
        }
        Ok(listings)
    }

    #[tokio::test]
    async fn test_visits_ceil_count_over_page_size_pages() {
        let catalog = FakeCatalog::with_listings(250);
        let mut pager = list_active_listings(&catalog, "shop", 100);
        let listings = drain(&mut pager).await.unwrap();

        assert_eq!(listings.len(), 250);
        assert_eq!(catalog.page_offsets(), vec![0, 100, 200]);
    }

    #[tokio::test]
    async fn test_exact_multiple_does_not_fetch_extra_page() {
        let catalog = FakeCatalog::with_listings(200);
        let mut pager = list_active_listings(&catalog, "shop", 100);
        while pager.next_batch().await.unwrap().is_some() {}

        assert_eq!(catalog.page_offsets(), vec![0, 100]);
        assert_eq!(pager.stats().pages_fetched, 2);
    }

    #[tokio::test]
    async fn test_failed_middle_page_is_skipped() {
        let mut catalog = FakeCatalog::with_listings(250);
        catalog.fail_offsets = vec![100];

        let mut pager = list_active_listings(&catalog, "shop", 100);
        let mut received = 0;
        while let Some(batch) = pager.next_batch().await.unwrap() {
            received += batch.len();
        }

        assert_eq!(received, 150);
        assert_eq!(pager.stats().pages_failed, 1);
        assert_eq!(pager.stats().pages_fetched, 2);
    }

    #[tokio::test]
    async fn test_first_page_failure_is_fatal() {
        let mut catalog = FakeCatalog::with_listings(10);
        catalog.fail_offsets = vec![0];

        let mut pager = list_active_listings(&catalog, "shop", 100);
        assert!(drain(&mut pager).await.is_err());
        assert_eq!(catalog.page_offsets(), vec![0]);
        assert_eq!(pager.stats().pages_fetched, 0);
    }

    #[tokio::test]
    async fn test_empty_shop_fetches_one_page() {
        let catalog = FakeCatalog::with_listings(0);
        let mut pager = list_active_listings(&catalog, "shop", 100);
        let listings = drain(&mut pager).await.unwrap();

        assert!(listings.is_empty());
        assert_eq!(catalog.page_offsets(), vec![0]);
    }

    #[tokio::test]
    async fn test_repeated_ids_are_skipped() {
        let mut catalog = FakeCatalog::with_listings(3);
        let duplicate = catalog.listings[0].clone();
        catalog.listings.push(duplicate);

        let mut pager = list_active_listings(&catalog, "shop", 2);
        let mut ids = Vec::new();
        while let Some(batch) = pager.next_batch().await.unwrap() {
            ids.extend(batch.into_iter().map(|l| l.listing_id));
        }

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(pager.stats().duplicates_skipped, 1);
    }
}
