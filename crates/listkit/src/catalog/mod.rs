//! Remote shop catalog access: listing pages, section lookup, listing
//! patches and media uploads.

pub mod client;
pub mod error;
pub mod pager;
pub mod retry;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{CatalogApi, CatalogClient};
pub use error::CatalogError;
pub use pager::{list_active_listings, ListingPager, PagerStats};
pub use retry::submit_with_retries;
pub use types::{
    ImageUpload, ListingRecord, ListingUpdate, ListingsPage, MultipartPayload, ShopSection,
    SubmitOutcome, VideoUpload,
};
