use crate::adapters::{ensure_exists, ensure_parent_dir, warn_if_dead};
use crate::domain::model::{Column, Table};
use crate::domain::ports::TableSource;
use crate::domain::schema::{self, CellValue, HeaderMap};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for CsvSource {
    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Table> {
        ensure_exists(&self.path)?;
        tracing::debug!("Reading CSV table from {}", self.path.display());

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;
        let headers = HeaderMap::resolve(reader.headers()?.iter())?;

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let cells: Vec<CellValue> = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect();

            if cells.iter().all(CellValue::is_blank) {
                continue;
            }
            let row_number = schema::sheet_row_number(index);
            let row = schema::parse_row(row_number, &headers, &cells)?;
            warn_if_dead(&row, row_number, &self.path);
            rows.push(row);
        }

        let table = Table::new(rows);
        tracing::debug!("Loaded {} rows from {}", table.len(), self.path.display());
        Ok(table)
    }

    fn persist(&self, table: &Table) -> Result<()> {
        // 先檢查再開檔，避免把原檔截斷成寫到一半的內容
        schema::check_table_writable(table)?;
        ensure_parent_dir(&self.path)?;

        // 標題列自行寫出，空表也要保留欄位名稱
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        writer.write_record(Column::ALL.iter().map(|c| c.header()))?;
        for row in table {
            writer.serialize(row)?;
        }
        writer.flush()?;

        tracing::debug!("Wrote {} rows to {}", table.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CategoryRow;
    use crate::utils::error::CemtError;
    use tempfile::TempDir;

    const HEADER: &str = "CEMT等级,最小长度(m),最大长度(m),最小宽度(m),最大宽度(m),典型航道,运营船只数量,典型航段距离(km),单次航行时间(h)";

    #[test]
    fn test_load_csv_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cemt.csv");
        std::fs::write(
            &path,
            format!(
                "{}\nI,38.5,38.5,5.05,5.05,Canal du Nord,120,95,10\n,,,,,,,,\nII,50,55,6.6,6.6,\"Kempisch, kanaal\",80,60,7.5\n",
                HEADER
            ),
        )
        .unwrap();

        let table = CsvSource::new(&path).load().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).unwrap().typical_route, "Kempisch, kanaal");
        assert_eq!(table.get(1).unwrap().typical_duration_h, 7.5);
    }

    #[test]
    fn test_load_csv_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cemt.csv");
        std::fs::write(&path, "CEMT等级,最小长度(m)\nI,38.5\n").unwrap();

        let err = CsvSource::new(&path).load().unwrap_err();
        assert!(matches!(err, CemtError::MissingColumn { .. }));
    }

    #[test]
    fn test_persist_empty_table_keeps_header() {
        let dir = TempDir::new().unwrap();
        let source = CsvSource::new(dir.path().join("out/cemt.csv"));
        source.persist(&Table::default()).unwrap();

        let content = std::fs::read_to_string(source.location()).unwrap();
        assert_eq!(content.trim_end(), HEADER);
        assert!(source.load().unwrap().is_empty());
    }

    #[test]
    fn test_persist_writes_missing_id_as_blank() {
        let dir = TempDir::new().unwrap();
        let source = CsvSource::new(dir.path().join("cemt.csv"));
        let mut row = CategoryRow::new("I", (38.5, 38.5), (5.05, 5.05));
        row.category_id = None;
        source.persist(&Table::new(vec![row.clone()])).unwrap();

        let loaded = source.load().unwrap();
        assert_eq!(loaded.rows(), &[row]);
    }

    #[test]
    fn test_padded_and_blank_ids_load_back_equal() {
        let dir = TempDir::new().unwrap();
        let source = CsvSource::new(dir.path().join("cemt.csv"));
        let table = Table::new(vec![
            CategoryRow::new(" IV ", (80.0, 85.0), (9.5, 9.5)),
            CategoryRow::new("", (38.5, 38.5), (5.05, 5.05)),
        ]);
        source.persist(&table).unwrap();

        let loaded = source.load().unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.get(0).unwrap().category_id(), Some("IV"));
        assert_eq!(loaded.get(1).unwrap().category_id(), None);
    }

    #[test]
    fn test_persist_rejects_nan_and_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let source = CsvSource::new(dir.path().join("cemt.csv"));
        let good = Table::new(vec![CategoryRow::new("I", (38.5, 38.5), (5.05, 5.05))]);
        source.persist(&good).unwrap();
        let before = std::fs::read_to_string(source.location()).unwrap();

        let mut bad = CategoryRow::new("X", (40.0, 80.0), (5.0, 9.0));
        bad.max_length = f64::NAN;
        let err = source
            .persist(&Table::new(vec![good.get(0).unwrap().clone(), bad]))
            .unwrap_err();
        assert!(matches!(
            err,
            CemtError::InvalidCell { row: 3, ref column, .. } if column == "最大长度(m)"
        ));

        assert_eq!(std::fs::read_to_string(source.location()).unwrap(), before);
        assert_eq!(source.load().unwrap(), good);
    }

    #[test]
    fn test_dead_row_still_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cemt.csv");
        std::fs::write(&path, format!("{}
,,,,,,,,
X,80,40,5,9,,0,0,0
", HEADER)).unwrap();

        let table = CsvSource::new(&path).load().unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get(0).unwrap().has_dead_interval());
    }
}
