// Adapters layer: concrete table sources (xlsx, csv) behind the TableSource port.

pub mod csv_source;
pub mod xlsx_source;

pub use csv_source::CsvSource;
pub use xlsx_source::XlsxSource;

use crate::domain::model::{CategoryRow, Table};
use crate::domain::ports::TableSource;
use crate::utils::error::{CemtError, Result};
use std::path::{Path, PathBuf};

pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["xlsx", "csv"];

/// A file-backed table source; the format is picked from the file extension.
#[derive(Debug, Clone)]
pub enum FileSource {
    Xlsx(XlsxSource),
    Csv(CsvSource),
}

impl FileSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("xlsx") => Ok(FileSource::Xlsx(XlsxSource::new(path))),
            Some("csv") => Ok(FileSource::Csv(CsvSource::new(path))),
            _ => Err(CemtError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

impl TableSource for FileSource {
    fn location(&self) -> &Path {
        match self {
            FileSource::Xlsx(source) => source.location(),
            FileSource::Csv(source) => source.location(),
        }
    }

    fn load(&self) -> Result<Table> {
        match self {
            FileSource::Xlsx(source) => source.load(),
            FileSource::Csv(source) => source.load(),
        }
    }

    fn persist(&self, table: &Table) -> Result<()> {
        match self {
            FileSource::Xlsx(source) => source.persist(table),
            FileSource::Csv(source) => source.persist(table),
        }
    }
}

pub(crate) fn ensure_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(CemtError::SourceNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// min > max 的列永遠不會被匹配到，只記錄警告。
/// `row_number` 與載入錯誤一樣是試算表列號（標題為第 1 列）。
pub(crate) fn warn_if_dead(row: &CategoryRow, row_number: usize, path: &Path) -> bool {
    if !row.has_dead_interval() {
        return false;
    }
    tracing::warn!(
        "⚠️ Sheet row {} ({}) in {} has min > max and will never match",
        row_number,
        row.category_id().unwrap_or("-"),
        path.display()
    );
    true
}
