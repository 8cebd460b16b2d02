//! In-memory shop catalog.
//!
//! Unlike a call recorder, patches and uploads change the stored listings so
//! a second export shows what the reimport stages did.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use listkit::catalog::{
    ImageUpload, ListingRecord, ListingUpdate, ListingsPage, SubmitOutcome, VideoUpload,
};
use listkit::{CatalogApi, CatalogError};

/// One listing as the shop would show it.
#[derive(Debug, Clone, Default)]
pub struct StoredListing {
    pub title: String,
    pub section_id: Option<u64>,
    pub tags: Vec<String>,
    /// Image file names by rank.
    pub images: BTreeMap<u32, String>,
    pub videos: Vec<String>,
}

#[derive(Default)]
pub struct ShopCatalog {
    sections: HashMap<u64, String>,
    listings: Mutex<BTreeMap<u64, StoredListing>>,
    rejected_images: HashSet<String>,
    patch_calls: Mutex<usize>,
    upload_calls: Mutex<usize>,
}

impl ShopCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, id: u64, title: &str) -> Self {
        self.sections.insert(id, title.to_string());
        self
    }

    pub fn with_listing(self, id: u64, title: &str, section_id: Option<u64>, tags: &[&str]) -> Self {
        self.listings.lock().unwrap().insert(
            id,
            StoredListing {
                title: title.to_string(),
                section_id,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                ..StoredListing::default()
            },
        );
        self
    }

    /// The API answers 400 for uploads of this file name.
    pub fn rejecting_image(mut self, file_name: &str) -> Self {
        self.rejected_images.insert(file_name.to_string());
        self
    }

    pub fn listing(&self, id: u64) -> StoredListing {
        self.listings
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn patch_calls(&self) -> usize {
        *self.patch_calls.lock().unwrap()
    }

    pub fn upload_calls(&self) -> usize {
        *self.upload_calls.lock().unwrap()
    }

    fn not_found(listing_id: &str) -> CatalogError {
        CatalogError::RemoteApi {
            status: 404,
            body: format!("Listing {} not found", listing_id),
        }
    }
}

#[async_trait]
impl CatalogApi for ShopCatalog {
    async fn list_categories(&self, _shop_id: &str) -> Result<HashMap<u64, String>, CatalogError> {
        Ok(self.sections.clone())
    }

    async fn fetch_listings_page(
        &self,
        _shop_id: &str,
        offset: u64,
        limit: u32,
    ) -> Result<ListingsPage, CatalogError> {
        let listings = self.listings.lock().unwrap();
        let results = listings
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|(id, stored)| ListingRecord {
                listing_id: *id,
                title: stored.title.clone(),
                shop_section_id: stored.section_id,
                tags: stored.tags.clone(),
            })
            .collect();
        Ok(ListingsPage {
            count: listings.len() as u64,
            results,
        })
    }

    async fn patch_listing(
        &self,
        _shop_id: &str,
        listing_id: &str,
        update: &ListingUpdate,
    ) -> Result<(), CatalogError> {
        *self.patch_calls.lock().unwrap() += 1;
        let id: u64 = listing_id.parse().map_err(|_| Self::not_found(listing_id))?;
        let mut listings = self.listings.lock().unwrap();
        let stored = listings.get_mut(&id).ok_or_else(|| Self::not_found(listing_id))?;
        stored.title = update.title.clone();
        stored.tags = update
            .tags
            .split(',')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Ok(())
    }

    async fn upload_listing_image(
        &self,
        _shop_id: &str,
        listing_id: &str,
        image: &ImageUpload,
    ) -> Result<(), CatalogError> {
        *self.upload_calls.lock().unwrap() += 1;
        if self.rejected_images.contains(&image.file_name) {
            return Err(CatalogError::RemoteApi {
                status: 400,
                body: "Image too small".to_string(),
            });
        }
        let id: u64 = listing_id.parse().map_err(|_| Self::not_found(listing_id))?;
        let mut listings = self.listings.lock().unwrap();
        let stored = listings.get_mut(&id).ok_or_else(|| Self::not_found(listing_id))?;
        stored.images.insert(image.rank, image.file_name.clone());
        Ok(())
    }

    async fn upload_listing_video(
        &self,
        _shop_id: &str,
        listing_id: &str,
        video: &VideoUpload,
        _retries: u32,
    ) -> SubmitOutcome {
        *self.upload_calls.lock().unwrap() += 1;
        let Ok(id) = listing_id.parse::<u64>() else {
            return SubmitOutcome::Failed;
        };
        match self.listings.lock().unwrap().get_mut(&id) {
            Some(stored) => {
                stored.videos.push(video.file_name.clone());
                SubmitOutcome::Success
            }
            None => SubmitOutcome::Failed,
        }
    }
}
