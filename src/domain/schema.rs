//! Typed schema for the category sheet: header resolution and per-cell
//! parsing shared by every table source. Missing or mistyped columns are
//! rejected, never coerced.

use crate::domain::model::{CategoryRow, Column, Table};
use crate::utils::error::{CemtError, Result};
use std::collections::HashMap;

/// A raw cell as read from a spreadsheet or CSV record.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    fn raw(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
        }
    }
}

/// 資料列在試算表中的列號（第 1 列是標題）
pub fn sheet_row_number(index: usize) -> usize {
    index + 2
}

/// 整數值的數字儲存格以整數形式呈現，例如等級 4.0 → "4"
pub fn number_to_text(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// 等級代號去除前後空白；空白代號視為缺少
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Rejects rows that would be written but could not be loaded back:
/// every numeric field must be finite.
pub fn check_writable(row: &CategoryRow, row_number: usize) -> Result<()> {
    let numeric = [
        (Column::MinLength, row.min_length),
        (Column::MaxLength, row.max_length),
        (Column::MinWidth, row.min_width),
        (Column::MaxWidth, row.max_width),
        (Column::TypicalDistanceKm, row.typical_distance_km),
        (Column::TypicalDurationH, row.typical_duration_h),
    ];
    for (column, value) in numeric {
        if !value.is_finite() {
            return Err(CemtError::invalid_cell(
                row_number,
                column.header(),
                value.to_string(),
                "expected a finite number",
            ));
        }
    }
    Ok(())
}

/// 寫出前逐列檢查，任何一列不合格就整份不寫
pub fn check_table_writable(table: &Table) -> Result<()> {
    table
        .iter()
        .enumerate()
        .try_for_each(|(index, row)| check_writable(row, sheet_row_number(index)))
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    positions: HashMap<Column, usize>,
}

impl HeaderMap {
    pub fn resolve<'a, I>(headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut found: HashMap<&str, usize> = HashMap::new();
        for (position, header) in headers.into_iter().enumerate() {
            found.entry(header.trim()).or_insert(position);
        }

        let mut positions = HashMap::new();
        for column in Column::ALL {
            let position =
                found
                    .get(column.header())
                    .copied()
                    .ok_or_else(|| CemtError::MissingColumn {
                        column: column.header().to_string(),
                    })?;
            positions.insert(column, position);
        }

        Ok(Self { positions })
    }

    pub fn position(&self, column: Column) -> usize {
        self.positions[&column]
    }
}

/// Parse one data row. `row_number` is the spreadsheet row used in errors.
pub fn parse_row(row_number: usize, headers: &HeaderMap, cells: &[CellValue]) -> Result<CategoryRow> {
    let mut row = CategoryRow {
        category_id: None,
        min_length: 0.0,
        max_length: 0.0,
        min_width: 0.0,
        max_width: 0.0,
        typical_route: String::new(),
        fleet_count: 0,
        typical_distance_km: 0.0,
        typical_duration_h: 0.0,
    };

    for column in Column::ALL {
        let cell = cells
            .get(headers.position(column))
            .unwrap_or(&CellValue::Empty);
        apply_cell(&mut row, column, cell, row_number)?;
    }

    Ok(row)
}

/// 依欄位型別把儲存格寫入資料列
pub fn apply_cell(row: &mut CategoryRow, column: Column, cell: &CellValue, row_number: usize) -> Result<()> {
    match column {
        Column::CategoryId => row.category_id = parse_identifier(cell),
        Column::MinLength => row.min_length = parse_number(cell, column, row_number)?,
        Column::MaxLength => row.max_length = parse_number(cell, column, row_number)?,
        Column::MinWidth => row.min_width = parse_number(cell, column, row_number)?,
        Column::MaxWidth => row.max_width = parse_number(cell, column, row_number)?,
        Column::TypicalRoute => row.typical_route = parse_text(cell),
        Column::FleetCount => row.fleet_count = parse_count(cell, column, row_number)?,
        Column::TypicalDistanceKm => {
            row.typical_distance_km = parse_number(cell, column, row_number)?
        }
        Column::TypicalDurationH => {
            row.typical_duration_h = parse_number(cell, column, row_number)?
        }
    }
    Ok(())
}

fn parse_identifier(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Empty => None,
        CellValue::Text(s) => normalize_identifier(s),
        CellValue::Number(n) => Some(number_to_text(*n)),
    }
}

fn parse_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => number_to_text(*n),
    }
}

fn parse_number(cell: &CellValue, column: Column, row_number: usize) -> Result<f64> {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CemtError::invalid_cell(row_number, column.header(), s.as_str(), "expected a number"))?,
        _ => {
            return Err(CemtError::invalid_cell(
                row_number,
                column.header(),
                cell.raw(),
                "value is required",
            ))
        }
    };

    if !value.is_finite() {
        return Err(CemtError::invalid_cell(
            row_number,
            column.header(),
            cell.raw(),
            "expected a finite number",
        ));
    }
    Ok(value)
}

fn parse_count(cell: &CellValue, column: Column, row_number: usize) -> Result<u64> {
    match cell {
        CellValue::Number(n) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => Ok(*n as u64),
        CellValue::Text(s) if !s.trim().is_empty() => s.trim().parse::<u64>().map_err(|_| {
            CemtError::invalid_cell(row_number, column.header(), s.as_str(), "expected a non-negative integer")
        }),
        CellValue::Number(_) => Err(CemtError::invalid_cell(
            row_number,
            column.header(),
            cell.raw(),
            "expected a non-negative integer",
        )),
        _ => Err(CemtError::invalid_cell(
            row_number,
            column.header(),
            cell.raw(),
            "value is required",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> HeaderMap {
        HeaderMap::resolve(Column::ALL.iter().map(|c| c.header())).unwrap()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_resolve_reports_first_missing_column() {
        let err = HeaderMap::resolve(["CEMT等级", "最小长度(m)", "最大长度(m)"]).unwrap_err();
        match err {
            CemtError::MissingColumn { column } => assert_eq!(column, "最小宽度(m)"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_accepts_any_column_order() {
        let mut names: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
        names.reverse();
        let map = HeaderMap::resolve(names).unwrap();
        assert_eq!(map.position(Column::CategoryId), 8);
        assert_eq!(map.position(Column::TypicalDurationH), 0);
    }

    #[test]
    fn test_parse_row_mixed_cells() {
        let cells = vec![
            CellValue::Number(4.0),
            CellValue::Number(80.0),
            text("85"),
            CellValue::Number(9.5),
            text("9.5"),
            text("Main-Donau-Kanal"),
            CellValue::Number(312.0),
            text("171.5"),
            CellValue::Number(18.0),
        ];
        let row = parse_row(2, &headers(), &cells).unwrap();

        assert_eq!(row.category_id(), Some("4"));
        assert_eq!(row.max_length, 85.0);
        assert_eq!(row.max_width, 9.5);
        assert_eq!(row.fleet_count, 312);
        assert_eq!(row.typical_distance_km, 171.5);
    }

    #[test]
    fn test_parse_row_rejects_missing_bound() {
        let cells = vec![
            text("Va"),
            CellValue::Empty,
            text("110"),
            text("11.4"),
            text("11.4"),
            text(""),
            text("0"),
            text("0"),
            text("0"),
        ];
        let err = parse_row(7, &headers(), &cells).unwrap_err();
        assert!(matches!(err, CemtError::InvalidCell { row: 7, ref column, .. } if column == "最小长度(m)"));
    }

    #[test]
    fn test_parse_count_rejects_fraction() {
        let mut cells = vec![text("I"), text("38.5"), text("38.5"), text("5"), text("5")];
        cells.extend([text(""), CellValue::Number(2.5), text("1"), text("1")]);
        let err = parse_row(3, &headers(), &cells).unwrap_err();
        assert!(matches!(err, CemtError::InvalidCell { ref column, .. } if column == "运营船只数量"));
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier(" IV "), Some("IV".to_string()));
        assert_eq!(normalize_identifier("   "), None);
        assert_eq!(normalize_identifier(""), None);
    }

    #[test]
    fn test_check_table_writable_names_sheet_row() {
        let mut bad = CategoryRow::new("Va", (95.0, 110.0), (11.4, 11.4));
        bad.typical_duration_h = f64::INFINITY;
        let table = Table::new(vec![CategoryRow::new("I", (38.5, 38.5), (5.05, 5.05)), bad]);

        let err = check_table_writable(&table).unwrap_err();
        assert!(matches!(
            err,
            CemtError::InvalidCell { row: 3, ref column, ref reason, .. }
                if column == "单次航行时间(h)" && reason == "expected a finite number"
        ));
        assert!(check_table_writable(&Table::default()).is_ok());
    }

    #[test]
    fn test_number_to_text() {
        assert_eq!(number_to_text(4.0), "4");
        assert_eq!(number_to_text(5.5), "5.5");
    }
}
