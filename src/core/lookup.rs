use crate::domain::model::{CategoryRow, Table};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "png"];

/// Distinct category identifiers in first-occurrence order; rows without an
/// identifier are skipped.
pub fn list_categories(table: &Table) -> Vec<&str> {
    let mut seen = HashSet::new();
    table
        .iter()
        .filter_map(|row| row.category_id())
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Every row carrying `category_id`. Empty means not found.
pub fn rows_for_category<'a>(table: &'a Table, category_id: &str) -> Vec<&'a CategoryRow> {
    table
        .iter()
        .filter(|row| row.category_id() == Some(category_id))
        .collect()
}

pub fn image_candidates(category_id: &str, image_root: &Path) -> Vec<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| image_root.join(format!("cemt_{}.{}", category_id, ext)))
        .collect()
}

/// `cemt_{id}.jpg` wins over `.png`. Probed on every call.
pub fn image_for(category_id: &str, image_root: &Path) -> Option<PathBuf> {
    image_candidates(category_id, image_root)
        .into_iter()
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table() -> Table {
        Table::new(vec![
            CategoryRow::new("IV", (80.0, 85.0), (9.5, 9.5)),
            CategoryRow::new("I", (38.5, 38.5), (5.05, 5.05)),
            CategoryRow::new("", (10.0, 20.0), (2.0, 3.0)),
            CategoryRow::new("IV", (85.0, 105.0), (9.5, 9.5)),
        ])
    }

    #[test]
    fn test_list_categories_distinct_first_occurrence() {
        assert_eq!(list_categories(&table()), vec!["IV", "I"]);
        assert!(list_categories(&Table::default()).is_empty());
    }

    #[test]
    fn test_rows_for_category_returns_duplicates() {
        let table = table();
        let rows = rows_for_category(&table, "IV");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].max_length, 105.0);
        assert!(rows_for_category(&table, "VII").is_empty());
    }

    #[test]
    fn test_image_for_prefers_jpg() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("cemt_IV.png"), b"png").unwrap();
        assert_eq!(image_for("IV", dir.path()), Some(dir.path().join("cemt_IV.png")));

        std::fs::write(dir.path().join("cemt_IV.jpg"), b"jpg").unwrap();
        assert_eq!(image_for("IV", dir.path()), Some(dir.path().join("cemt_IV.jpg")));
    }

    #[test]
    fn test_image_for_reprobes_and_handles_absence() {
        let dir = TempDir::new().unwrap();
        assert_eq!(image_for("Va", dir.path()), None);

        std::fs::write(dir.path().join("cemt_Va.png"), b"png").unwrap();
        assert!(image_for("Va", dir.path()).is_some());

        std::fs::remove_file(dir.path().join("cemt_Va.png")).unwrap();
        assert_eq!(image_for("Va", dir.path()), None);
    }
}
