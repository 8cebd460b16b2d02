//! HTTP client for the shop catalog API.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, info_span, Instrument};

use crate::config::CatalogConfig;
use crate::session::RunSession;

use super::error::{CatalogError, Result};
use super::retry::submit_with_retries;
use super::types::{
    ImageUpload, ListingUpdate, ListingsPage, MultipartPayload, SectionsPage, SubmitOutcome,
    VideoUpload,
};

/// Maximum length for error bodies carried into errors and logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Truncates a response body on a char boundary.
fn sanitize_error_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_LENGTH) {
        Some((cut, _)) => format!("{}... (truncated)", &body[..cut]),
        None => body.to_string(),
    }
}

#[derive(Deserialize)]
struct ErrorPayload {
    error: String,
}

/// Remote operations the pipeline stages need from the catalog.
///
/// The stages take `&dyn CatalogApi` so tests can substitute an in-memory
/// catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Section id to section title for the shop.
    async fn list_categories(&self, shop_id: &str) -> Result<HashMap<u64, String>>;

    async fn fetch_listings_page(&self, shop_id: &str, offset: u64, limit: u32)
        -> Result<ListingsPage>;

    async fn patch_listing(
        &self,
        shop_id: &str,
        listing_id: &str,
        update: &ListingUpdate,
    ) -> Result<()>;

    async fn upload_listing_image(
        &self,
        shop_id: &str,
        listing_id: &str,
        image: &ImageUpload,
    ) -> Result<()>;

    /// Uploads a video, retrying up to `retries` extra times.
    async fn upload_listing_video(
        &self,
        shop_id: &str,
        listing_id: &str,
        video: &VideoUpload,
        retries: u32,
    ) -> SubmitOutcome;
}

/// reqwest-backed [`CatalogApi`] carrying the run's API key and bearer
/// credential on every request.
#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig, session: &RunSession) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(session.api_key().expose_secret())
            .map_err(|_| CatalogError::InvalidCredential("api key".to_string()))?;
        api_key.set_sensitive(true);
        headers.insert("x-api-key", api_key);

        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", session.credential().expose_secret()))
                .map_err(|_| CatalogError::InvalidCredential("access token".to_string()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POSTs a multipart payload, rebuilding the form for each attempt.
    pub async fn post_multipart(
        &self,
        url: &str,
        payload: &MultipartPayload,
        retries: u32,
    ) -> SubmitOutcome {
        let http = &self.http;
        submit_with_retries(url, retries, move |_| async move {
            let form = payload.to_form()?;
            let response = http.post(url).multipart(form).send().await?;
            check_status(response).await.map(|_| ())
        })
        .await
    }
}

/// Maps non-2xx responses to [`CatalogError::RemoteApi`], preferring the
/// `error` field of a JSON error payload as the message.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorPayload>(&body) {
        Ok(payload) => payload.error,
        Err(_) => body,
    };
    Err(CatalogError::RemoteApi {
        status: status.as_u16(),
        body: sanitize_error_body(&message),
    })
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| CatalogError::Decode(e.to_string()))
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_categories(&self, shop_id: &str) -> Result<HashMap<u64, String>> {
        let url = self.url(&format!("/shops/{}/sections", shop_id));
        let page: SectionsPage = decode(self.http.get(&url).send().await?).await?;
        debug!(sections = page.results.len(), "Fetched shop sections");
        Ok(page
            .results
            .into_iter()
            .map(|s| (s.shop_section_id, s.title))
            .collect())
    }

    async fn fetch_listings_page(
        &self,
        shop_id: &str,
        offset: u64,
        limit: u32,
    ) -> Result<ListingsPage> {
        let url = self.url(&format!("/shops/{}/listings", shop_id));
        let span = info_span!("fetch_listings_page", offset, limit);
        async {
            let response = self
                .http
                .get(&url)
                .query(&[
                    ("state", "active".to_string()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ])
                .send()
                .await?;
            decode(response).await
        }
        .instrument(span)
        .await
    }

    async fn patch_listing(
        &self,
        shop_id: &str,
        listing_id: &str,
        update: &ListingUpdate,
    ) -> Result<()> {
        let url = self.url(&format!("/shops/{}/listings/{}", shop_id, listing_id));
        let response = self.http.patch(&url).json(update).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn upload_listing_image(
        &self,
        shop_id: &str,
        listing_id: &str,
        image: &ImageUpload,
    ) -> Result<()> {
        let url = self.url(&format!("/shops/{}/listings/{}/images", shop_id, listing_id));
        let form = image.to_payload().to_form()?;
        let response = self.http.post(&url).multipart(form).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn upload_listing_video(
        &self,
        shop_id: &str,
        listing_id: &str,
        video: &VideoUpload,
        retries: u32,
    ) -> SubmitOutcome {
        let url = self.url(&format!("/shops/{}/listings/{}/videos", shop_id, listing_id));
        self.post_multipart(&url, &video.to_payload(), retries).await
    }
}
