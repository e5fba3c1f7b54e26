use crate::adapters::{ensure_exists, ensure_parent_dir, warn_if_dead};
use crate::domain::model::{CategoryRow, Column, Table};
use crate::domain::ports::TableSource;
use crate::domain::schema::{self, CellValue, HeaderMap};
use crate::utils::error::{CemtError, Result};
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

/// First worksheet of an `.xlsx` workbook.
#[derive(Debug, Clone)]
pub struct XlsxSource {
    path: PathBuf,
}

impl XlsxSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn empty_source(&self) -> CemtError {
        CemtError::EmptySource {
            path: self.path.display().to_string(),
        }
    }
}

impl TableSource for XlsxSource {
    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Table> {
        ensure_exists(&self.path)?;
        tracing::debug!("Opening workbook {}", self.path.display());

        let mut workbook: Sheets<_> = open_workbook_auto(&self.path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| self.empty_source())??;

        // 使用範圍不一定從 A1 開始
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

        let mut sheet_rows = range.rows();
        let header_row = sheet_rows.next().ok_or_else(|| self.empty_source())?;
        let header_names: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();
        let headers = HeaderMap::resolve(header_names.iter().map(String::as_str))?;

        let mut rows = Vec::new();
        for (index, sheet_row) in sheet_rows.enumerate() {
            let cells: Vec<CellValue> = sheet_row.iter().map(to_cell).collect();
            if cells.iter().all(CellValue::is_blank) {
                continue;
            }
            let row_number = first_row + schema::sheet_row_number(index);
            let row = schema::parse_row(row_number, &headers, &cells)?;
            warn_if_dead(&row, row_number, &self.path);
            rows.push(row);
        }

        let table = Table::new(rows);
        tracing::debug!("Loaded {} rows from {}", table.len(), self.path.display());
        Ok(table)
    }

    fn persist(&self, table: &Table) -> Result<()> {
        // NaN 會被寫成 #NUM!，之後就載入不了
        schema::check_table_writable(table)?;
        ensure_parent_dir(&self.path)?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let header_format = Format::new().set_bold();

        for (col, column) in Column::ALL.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, column.header(), &header_format)?;
        }

        for (index, row) in table.iter().enumerate() {
            let sheet_row = (index + 1) as u32;
            for (col, column) in Column::ALL.iter().enumerate() {
                match cell_of(row, *column) {
                    CellValue::Number(n) => {
                        worksheet.write_number(sheet_row, col as u16, n)?;
                    }
                    CellValue::Text(s) if !s.is_empty() => {
                        worksheet.write_string(sheet_row, col as u16, &s)?;
                    }
                    _ => {}
                }
            }
        }

        workbook.save(&self.path)?;
        tracing::debug!("Wrote {} rows to {}", table.len(), self.path.display());
        Ok(())
    }
}

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        other => CellValue::Text(other.to_string()),
    }
}

/// 類別代碼永遠以文字寫出，讀回時才不會變成數字
fn cell_of(row: &CategoryRow, column: Column) -> CellValue {
    match column {
        Column::CategoryId => row
            .category_id
            .clone()
            .map(CellValue::Text)
            .unwrap_or(CellValue::Empty),
        Column::MinLength => CellValue::Number(row.min_length),
        Column::MaxLength => CellValue::Number(row.max_length),
        Column::MinWidth => CellValue::Number(row.min_width),
        Column::MaxWidth => CellValue::Number(row.max_width),
        Column::TypicalRoute => CellValue::Text(row.typical_route.clone()),
        Column::FleetCount => CellValue::Number(row.fleet_count as f64),
        Column::TypicalDistanceKm => CellValue::Number(row.typical_distance_km),
        Column::TypicalDurationH => CellValue::Number(row.typical_duration_h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_rejects_renamed_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cemt.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, column) in Column::ALL.iter().enumerate() {
            let name = if *column == Column::MaxWidth {
                "max width"
            } else {
                column.header()
            };
            sheet.write_string(0, col as u16, name).unwrap();
        }
        workbook.save(&path).unwrap();

        let err = XlsxSource::new(&path).load().unwrap_err();
        match err {
            CemtError::MissingColumn { column } => assert_eq!(column, "最大宽度(m)"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_numeric_category_and_text_bound() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cemt.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, column) in Column::ALL.iter().enumerate() {
            sheet.write_string(0, col as u16, column.header()).unwrap();
        }
        sheet.write_number(1, 0, 4.0).unwrap();
        sheet.write_number(1, 1, 80.0).unwrap();
        sheet.write_string(1, 2, "85").unwrap();
        sheet.write_number(1, 3, 9.5).unwrap();
        sheet.write_number(1, 4, 9.5).unwrap();
        sheet.write_string(1, 5, "Dortmund-Ems-Kanal").unwrap();
        sheet.write_number(1, 6, 42.0).unwrap();
        sheet.write_number(1, 7, 120.0).unwrap();
        sheet.write_number(1, 8, 14.0).unwrap();
        workbook.save(&path).unwrap();

        let table = XlsxSource::new(&path).load().unwrap();
        let row = table.get(0).unwrap();
        assert_eq!(row.category_id(), Some("4"));
        assert_eq!(row.max_length, 85.0);
        assert_eq!(row.fleet_count, 42);
    }

    #[test]
    fn test_load_reports_sheet_row_of_bad_cell() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cemt.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, column) in Column::ALL.iter().enumerate() {
            sheet.write_string(0, col as u16, column.header()).unwrap();
        }
        for col in 0..9u16 {
            sheet.write_number(1, col, 1.0).unwrap();
            sheet.write_number(2, col, 1.0).unwrap();
        }
        sheet.write_string(2, 3, "n/a").unwrap();
        workbook.save(&path).unwrap();

        let err = XlsxSource::new(&path).load().unwrap_err();
        assert!(matches!(err, CemtError::InvalidCell { row: 3, ref column, .. } if column == "最小宽度(m)"));
    }

    #[test]
    fn test_persist_rejects_infinite_bound_without_writing() {
        let dir = TempDir::new().unwrap();
        let source = XlsxSource::new(dir.path().join("cemt.xlsx"));

        let mut row = CategoryRow::new("VIa", (95.0, 110.0), (22.8, 22.8));
        row.min_width = f64::INFINITY;
        let err = source.persist(&Table::new(vec![row])).unwrap_err();

        assert!(matches!(
            err,
            CemtError::InvalidCell { row: 2, ref column, .. } if column == "最小宽度(m)"
        ));
        assert!(!source.location().exists());
    }
}
