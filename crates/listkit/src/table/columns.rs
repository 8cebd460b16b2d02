//! Column titles shared by the export, enrichment and reimport stages.
//!
//! Downstream stages look columns up by these exact titles, so a human may
//! reorder columns in a spreadsheet but must not rename them.

pub const PRODUCT_ID: &str = "Product ID";
pub const MOCKUPS_FOLDER: &str = "Mockups Folder";
pub const PRODUCT_TITLE: &str = "Product Title";
pub const PRODUCT_TYPE: &str = "Product Type";

/// Etsy caps listings at 13 tags.
pub const MAX_TAGS: usize = 13;

/// `Tag 1` .. `Tag 13`.
pub fn tag_column(position: usize) -> String {
    format!("Tag {}", position)
}

pub fn tag_columns() -> Vec<String> {
    (1..=MAX_TAGS).map(tag_column).collect()
}

/// The fixed 20-column header written by the export stage.
pub fn template_header() -> Vec<String> {
    let mut header = vec![
        PRODUCT_ID.to_string(),
        MOCKUPS_FOLDER.to_string(),
        PRODUCT_TITLE.to_string(),
    ];
    header.extend(tag_columns());
    header.push(PRODUCT_TYPE.to_string());
    header.extend(KeywordSlot::ALL.iter().map(|slot| slot.keyword_column().to_string()));
    header
}

/// One of the three human-filled keyword columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordSlot {
    Fact,
    People,
    Occasion,
}

impl KeywordSlot {
    /// Processing order within a row.
    pub const ALL: [KeywordSlot; 3] = [KeywordSlot::Fact, KeywordSlot::People, KeywordSlot::Occasion];

    pub fn keyword_column(&self) -> &'static str {
        match self {
            KeywordSlot::Fact => "Fact keyword",
            KeywordSlot::People => "People keyword",
            KeywordSlot::Occasion => "Occasion keyword",
        }
    }

    pub fn result_column(&self) -> &'static str {
        match self {
            KeywordSlot::Fact => "Fact Results",
            KeywordSlot::People => "People Results",
            KeywordSlot::Occasion => "Occasion Results",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            KeywordSlot::Fact => 0,
            KeywordSlot::People => 1,
            KeywordSlot::Occasion => 2,
        }
    }
}

impl std::fmt::Display for KeywordSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeywordSlot::Fact => write!(f, "fact"),
            KeywordSlot::People => write!(f, "people"),
            KeywordSlot::Occasion => write!(f, "occasion"),
        }
    }
}
