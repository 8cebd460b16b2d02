use super::columns::{self, KeywordSlot, MAX_TAGS};

/// One table row as an ordered field-name -> value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `field`, or `None` when the row has no such column.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Value of `field` with surrounding whitespace removed; missing -> "".
    pub fn text(&self, field: &str) -> &str {
        self.get(field).map(str::trim).unwrap_or("")
    }

    /// Replaces the value of an existing field or appends a new one.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.set(&key.into(), value);
        }
        record
    }
}

/// Headers plus rows, in file order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Rows paired with their line number in the spreadsheet. The header
    /// is line 1, so the first data row is 2.
    pub fn numbered_rows(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.rows.iter().enumerate().map(|(i, row)| (i + 2, row))
    }
}

/// Typed view of a listing-template row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateRow {
    pub listing_id: String,
    pub mockups_folder: String,
    pub title: String,
    /// Positional tags; `tags[i]` is `Tag i+1`, empty when unset.
    pub tags: Vec<String>,
    pub category: String,
    pub keywords: [String; 3],
}

impl TemplateRow {
    pub fn from_record(record: &Record) -> Self {
        let tags = (1..=MAX_TAGS)
            .map(|i| record.text(&columns::tag_column(i)).to_string())
            .collect();
        let keywords = KeywordSlot::ALL.map(|slot| record.text(slot.keyword_column()).to_string());

        Self {
            listing_id: record.text(columns::PRODUCT_ID).to_string(),
            mockups_folder: record.text(columns::MOCKUPS_FOLDER).to_string(),
            title: record.text(columns::PRODUCT_TITLE).to_string(),
            tags,
            category: record.text(columns::PRODUCT_TYPE).to_string(),
            keywords,
        }
    }

    /// Non-empty tags in column order; gaps are skipped.
    pub fn present_tags(&self) -> Vec<&str> {
        self.tags
            .iter()
            .map(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn keyword(&self, slot: KeywordSlot) -> &str {
        &self.keywords[slot.index()]
    }

    /// Renders the row under the fixed template header.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set(columns::PRODUCT_ID, self.listing_id.clone());
        record.set(columns::MOCKUPS_FOLDER, self.mockups_folder.clone());
        record.set(columns::PRODUCT_TITLE, self.title.clone());
        for position in 1..=MAX_TAGS {
            let tag = self.tags.get(position - 1).cloned().unwrap_or_default();
            record.set(&columns::tag_column(position), tag);
        }
        record.set(columns::PRODUCT_TYPE, self.category.clone());
        for slot in KeywordSlot::ALL {
            record.set(slot.keyword_column(), self.keyword(slot).to_string());
        }
        record
    }
}
