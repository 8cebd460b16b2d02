//! In-memory catalog for stage tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::CatalogApi;
use super::error::{CatalogError, Result};
use super::types::{
    ImageUpload, ListingRecord, ListingUpdate, ListingsPage, SubmitOutcome, VideoUpload,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Sections,
    Page { offset: u64 },
    Patch { listing_id: String, update: ListingUpdate },
    Image { listing_id: String, file_name: String, rank: u32, overwrite: bool },
    Video { listing_id: String, file_name: String, retries: u32 },
}

#[derive(Default)]
pub(crate) struct FakeCatalog {
    pub listings: Vec<ListingRecord>,
    pub sections: HashMap<u64, String>,
    pub fail_sections: bool,
    pub fail_offsets: Vec<u64>,
    pub fail_patch_ids: Vec<String>,
    pub fail_image_names: Vec<String>,
    pub fail_videos: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeCatalog {
    pub fn with_listings(count: u64) -> Self {
        Self {
            listings: (1..=count)
                .map(|id| ListingRecord {
                    listing_id: id,
                    title: format!("Listing {}", id),
                    shop_section_id: None,
                    tags: Vec::new(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn page_offsets(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Page { offset } => Some(offset),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn rejected(message: &str) -> CatalogError {
        CatalogError::RemoteApi {
            status: 400,
            body: message.to_string(),
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn list_categories(&self, _shop_id: &str) -> Result<HashMap<u64, String>> {
        self.push(Call::Sections);
        if self.fail_sections {
            return Err(Self::rejected("sections unavailable"));
        }
        Ok(self.sections.clone())
    }

    async fn fetch_listings_page(
        &self,
        _shop_id: &str,
        offset: u64,
        limit: u32,
    ) -> Result<ListingsPage> {
        self.push(Call::Page { offset });
        if self.fail_offsets.contains(&offset) {
            return Err(CatalogError::RemoteApi {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(ListingsPage {
            count: self.listings.len() as u64,
            results: self
                .listings
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
        })
    }

    async fn patch_listing(
        &self,
        _shop_id: &str,
        listing_id: &str,
        update: &ListingUpdate,
    ) -> Result<()> {
        self.push(Call::Patch {
            listing_id: listing_id.to_string(),
            update: update.clone(),
        });
        if self.fail_patch_ids.iter().any(|id| id == listing_id) {
            return Err(Self::rejected("listing not found"));
        }
        Ok(())
    }

    async fn upload_listing_image(
        &self,
        _shop_id: &str,
        listing_id: &str,
        image: &ImageUpload,
    ) -> Result<()> {
        self.push(Call::Image {
            listing_id: listing_id.to_string(),
            file_name: image.file_name.clone(),
            rank: image.rank,
            overwrite: image.overwrite,
        });
        if self.fail_image_names.contains(&image.file_name) {
            return Err(Self::rejected("Image too small"));
        }
        Ok(())
    }

    async fn upload_listing_video(
        &self,
        _shop_id: &str,
        listing_id: &str,
        video: &VideoUpload,
        retries: u32,
    ) -> SubmitOutcome {
        self.push(Call::Video {
            listing_id: listing_id.to_string(),
            file_name: video.file_name.clone(),
            retries,
        });
        if self.fail_videos {
            SubmitOutcome::Failed
        } else {
            SubmitOutcome::Success
        }
    }
}
