use serde::{Deserialize, Serialize};

use super::error::{CatalogError, Result};

/// An active listing as returned by the shop listings endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListingRecord {
    pub listing_id: u64,
    pub title: String,
    #[serde(default)]
    pub shop_section_id: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One page of `GET /shops/{shop_id}/listings`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingsPage {
    /// Total number of active listings at the time of the request.
    pub count: u64,
    #[serde(default)]
    pub results: Vec<ListingRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopSection {
    pub shop_section_id: u64,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionsPage {
    #[serde(default)]
    pub results: Vec<ShopSection>,
}

/// Body of the listing PATCH call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingUpdate {
    pub title: String,
    /// Comma-joined tag list.
    pub tags: String,
}

impl ListingUpdate {
    pub fn new<'a>(title: impl Into<String>, tags: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            title: title.into(),
            tags: tags.into_iter().collect::<Vec<_>>().join(","),
        }
    }
}

/// A ranked listing image.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// 1-based display position.
    pub rank: u32,
    pub overwrite: bool,
}

impl ImageUpload {
    pub fn to_payload(&self) -> MultipartPayload {
        MultipartPayload::new()
            .file("image", &self.file_name, self.bytes.clone())
            .text("rank", self.rank.to_string())
            .text("overwrite", self.overwrite.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl VideoUpload {
    pub fn to_payload(&self) -> MultipartPayload {
        MultipartPayload::new()
            .file("video", &self.file_name, self.bytes.clone())
            .text("name", self.file_name.clone())
    }
}

/// Terminal result of a retried submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmitOutcome {
    Success,
    Failed,
}

impl std::fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitOutcome::Success => write!(f, "Success"),
            SubmitOutcome::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone)]
enum PayloadPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// Multipart form contents kept outside of `reqwest::multipart::Form`, which
/// is consumed on send and cannot be replayed by the retry loop.
#[derive(Debug, Clone, Default)]
pub struct MultipartPayload {
    parts: Vec<PayloadPart>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parts.push(PayloadPart::Text {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: Vec<u8>) -> Self {
        self.parts.push(PayloadPart::File {
            name: name.to_string(),
            file_name: file_name.to_string(),
            bytes,
        });
        self
    }

    /// Builds a fresh form for one request attempt.
    pub fn to_form(&self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for part in &self.parts {
            form = match part {
                PayloadPart::Text { name, value } => form.text(name.clone(), value.clone()),
                PayloadPart::File {
                    name,
                    file_name,
                    bytes,
                } => {
                    let mime = mime_guess::from_path(file_name).first_or_octet_stream();
                    let file_part = reqwest::multipart::Part::bytes(bytes.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime.as_ref())
                        .map_err(CatalogError::Http)?;
                    form.part(name.clone(), file_part)
                }
            };
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_update_joins_tags() {
        let update = ListingUpdate::new("Mug", ["cat", "gift", "coffee"]);
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["title"], "Mug");
        assert_eq!(json["tags"], "cat,gift,coffee");
    }

    #[test]
    fn test_listings_page_ignores_unknown_fields() {
        let page: ListingsPage = serde_json::from_str(
            r#"{
                "count": 2,
                "results": [
                    { "listing_id": 1, "title": "A", "shop_section_id": 7, "tags": ["x"], "state": "active" },
                    { "listing_id": 2, "title": "B", "shop_section_id": null }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(page.count, 2);
        assert_eq!(page.results[0].shop_section_id, Some(7));
        assert!(page.results[1].tags.is_empty());
    }

    #[test]
    fn test_payload_builds_repeatable_forms() {
        let upload = ImageUpload {
            file_name: "1.jpg".to_string(),
            bytes: vec![1, 2, 3],
            rank: 1,
            overwrite: true,
        };
        let payload = upload.to_payload();

        assert!(payload.to_form().is_ok());
        assert!(payload.to_form().is_ok());
    }

    #[test]
    fn test_submit_outcome_display() {
        assert_eq!(SubmitOutcome::Success.to_string(), "Success");
        assert_eq!(SubmitOutcome::Failed.to_string(), "Failed");
    }
}
