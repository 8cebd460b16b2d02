use std::collections::HashMap;
use std::path::Path;

use crate::error::TableError;

use super::columns::{self, KeywordSlot};
use super::record::Table;

/// Columns a stage needs, checked once when its input table is loaded.
#[derive(Debug, Clone)]
pub struct TableSchema {
    required: Vec<String>,
    unique_key: Option<String>,
}

impl TableSchema {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            unique_key: None,
        }
    }

    /// Non-empty values of `column` must not repeat across rows.
    pub fn with_unique_key(mut self, column: &str) -> Self {
        self.unique_key = Some(column.to_string());
        self
    }

    /// Schema for the enrichment stage input.
    pub fn enrichment() -> Self {
        let mut required = vec![columns::PRODUCT_ID.to_string(), columns::PRODUCT_TYPE.to_string()];
        required.extend(KeywordSlot::ALL.iter().map(|s| s.keyword_column().to_string()));
        Self::new(required).with_unique_key(columns::PRODUCT_ID)
    }

    /// Schema for the title/tag patch stage input.
    pub fn title_tags() -> Self {
        let mut required = vec![
            columns::PRODUCT_ID.to_string(),
            columns::PRODUCT_TITLE.to_string(),
        ];
        required.extend(columns::tag_columns());
        Self::new(required).with_unique_key(columns::PRODUCT_ID)
    }

    /// Schema for the image upload stage input.
    pub fn images() -> Self {
        Self::new([columns::PRODUCT_ID, columns::MOCKUPS_FOLDER])
            .with_unique_key(columns::PRODUCT_ID)
    }

    pub fn validate(&self, path: &Path, table: &Table) -> Result<(), TableError> {
        if let Some(missing) = self.required.iter().find(|c| !table.has_column(c)) {
            return Err(TableError::MissingColumn {
                path: path.to_path_buf(),
                column: missing.clone(),
            });
        }

        if let Some(key) = &self.unique_key {
            let mut seen: HashMap<&str, usize> = HashMap::new();
            for (line, row) in table.numbered_rows() {
                let id = row.text(key);
                if id.is_empty() {
                    continue;
                }
                if let Some(first) = seen.insert(id, line) {
                    return Err(TableError::DuplicateId {
                        path: path.to_path_buf(),
                        id: id.to_string(),
                        first,
                        second: line,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::record::Record;

    fn table(headers: &[&str], rows: &[&[(&str, &str)]]) -> Table {
        let mut table = Table::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.rows.push(row.iter().copied().collect::<Record>());
        }
        table
    }

    #[test]
    fn test_missing_column_is_named() {
        let t = table(&["Product ID"], &[]);
        let err = TableSchema::images()
            .validate(Path::new("in.csv"), &t)
            .unwrap_err();

        match err {
            TableError::MissingColumn { column, .. } => assert_eq!(column, "Mockups Folder"),
            other => panic!("Expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_ids_report_both_rows() {
        let t = table(
            &["Product ID", "Mockups Folder"],
            &[
                &[("Product ID", "1")],
                &[("Product ID", "2")],
                &[("Product ID", " 1 ")],
            ],
        );

        let err = TableSchema::images()
            .validate(Path::new("in.csv"), &t)
            .unwrap_err();
        match err {
            TableError::DuplicateId { id, first, second, .. } => {
                assert_eq!(id, "1");
                assert_eq!((first, second), (2, 4));
            }
            other => panic!("Expected DuplicateId, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_ids_are_not_duplicates() {
        let t = table(
            &["Product ID", "Mockups Folder"],
            &[&[("Product ID", "")], &[("Product ID", "")]],
        );
        assert!(TableSchema::images().validate(Path::new("in.csv"), &t).is_ok());
    }

    #[test]
    fn test_reordered_columns_are_accepted() {
        let mut headers: Vec<String> = columns::template_header();
        headers.reverse();
        let t = Table::new(headers);

        assert!(TableSchema::title_tags().validate(Path::new("in.csv"), &t).is_ok());
        assert!(TableSchema::enrichment().validate(Path::new("in.csv"), &t).is_ok());
    }
}
