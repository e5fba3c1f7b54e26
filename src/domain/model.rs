use crate::domain::schema::{self, CellValue};
use crate::utils::error::{CemtError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 資料表的固定欄位。欄位名稱就是與試算表之間的契約。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    CategoryId,
    MinLength,
    MaxLength,
    MinWidth,
    MaxWidth,
    TypicalRoute,
    FleetCount,
    TypicalDistanceKm,
    TypicalDurationH,
}

impl Column {
    /// 寫出時的欄位順序
    pub const ALL: [Column; 9] = [
        Column::CategoryId,
        Column::MinLength,
        Column::MaxLength,
        Column::MinWidth,
        Column::MaxWidth,
        Column::TypicalRoute,
        Column::FleetCount,
        Column::TypicalDistanceKm,
        Column::TypicalDurationH,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::CategoryId => "CEMT等级",
            Column::MinLength => "最小长度(m)",
            Column::MaxLength => "最大长度(m)",
            Column::MinWidth => "最小宽度(m)",
            Column::MaxWidth => "最大宽度(m)",
            Column::TypicalRoute => "典型航道",
            Column::FleetCount => "运营船只数量",
            Column::TypicalDistanceKm => "典型航段距离(km)",
            Column::TypicalDurationH => "单次航行时间(h)",
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            Column::CategoryId => "category_id",
            Column::MinLength => "min_length",
            Column::MaxLength => "max_length",
            Column::MinWidth => "min_width",
            Column::MaxWidth => "max_width",
            Column::TypicalRoute => "typical_route",
            Column::FleetCount => "fleet_count",
            Column::TypicalDistanceKm => "typical_distance_km",
            Column::TypicalDurationH => "typical_duration_h",
        }
    }

    /// 接受試算表欄名或 snake_case 欄位名
    pub fn from_name(name: &str) -> Result<Column> {
        let name = name.trim();
        Column::ALL
            .into_iter()
            .find(|c| c.header() == name || c.field_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| CemtError::UnknownColumn {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One classification category: a length interval, a width interval and the
/// operational data that goes with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    #[serde(rename = "CEMT等级")]
    pub category_id: Option<String>,
    #[serde(rename = "最小长度(m)")]
    pub min_length: f64,
    #[serde(rename = "最大长度(m)")]
    pub max_length: f64,
    #[serde(rename = "最小宽度(m)")]
    pub min_width: f64,
    #[serde(rename = "最大宽度(m)")]
    pub max_width: f64,
    #[serde(rename = "典型航道")]
    pub typical_route: String,
    #[serde(rename = "运营船只数量")]
    pub fleet_count: u64,
    #[serde(rename = "典型航段距离(km)")]
    pub typical_distance_km: f64,
    #[serde(rename = "单次航行时间(h)")]
    pub typical_duration_h: f64,
}

impl CategoryRow {
    /// The id is normalized the same way the loader does it: trimmed, and
    /// blank becomes `None`.
    pub fn new(category_id: impl Into<String>, length: (f64, f64), width: (f64, f64)) -> Self {
        Self {
            category_id: schema::normalize_identifier(&category_id.into()),
            min_length: length.0,
            max_length: length.1,
            min_width: width.0,
            max_width: width.1,
            typical_route: String::new(),
            fleet_count: 0,
            typical_distance_km: 0.0,
            typical_duration_h: 0.0,
        }
    }

    pub fn category_id(&self) -> Option<&str> {
        self.category_id.as_deref()
    }

    /// min > max：任何值都不會落在這個區間，這一列永遠不會被匹配到
    pub fn has_dead_interval(&self) -> bool {
        self.min_length > self.max_length || self.min_width > self.max_width
    }

    /// 以試算表上看到的形式取出某個欄位
    pub fn display_value(&self, column: Column) -> String {
        match column {
            Column::CategoryId => self.category_id.clone().unwrap_or_default(),
            Column::MinLength => self.min_length.to_string(),
            Column::MaxLength => self.max_length.to_string(),
            Column::MinWidth => self.min_width.to_string(),
            Column::MaxWidth => self.max_width.to_string(),
            Column::TypicalRoute => self.typical_route.clone(),
            Column::FleetCount => self.fleet_count.to_string(),
            Column::TypicalDistanceKm => self.typical_distance_km.to_string(),
            Column::TypicalDurationH => self.typical_duration_h.to_string(),
        }
    }
}

/// Ordered category rows. No uniqueness or bound ordering is enforced here;
/// that is the data source's business.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<CategoryRow>,
}

impl Table {
    pub fn new(rows: Vec<CategoryRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CategoryRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CategoryRow> {
        self.rows.get(index)
    }

    /// 新增一列；非有限數值會被拒絕，等級代號依載入規則正規化
    pub fn push(&mut self, mut row: CategoryRow) -> Result<()> {
        schema::check_writable(&row, schema::sheet_row_number(self.rows.len()))?;
        row.category_id = row.category_id.as_deref().and_then(schema::normalize_identifier);
        self.rows.push(row);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<CategoryRow> {
        self.check_index(index)?;
        Ok(self.rows.remove(index))
    }

    /// 編輯單一儲存格；值依欄位型別解析，解析失敗時整列保持不變
    pub fn set_field(&mut self, index: usize, column: Column, value: &str) -> Result<()> {
        self.check_index(index)?;
        let mut edited = self.rows[index].clone();
        schema::apply_cell(
            &mut edited,
            column,
            &CellValue::Text(value.to_string()),
            schema::sheet_row_number(index),
        )?;
        self.rows[index] = edited;
        Ok(())
    }

    pub fn into_rows(self) -> Vec<CategoryRow> {
        self.rows
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.rows.len() {
            return Err(CemtError::RowIndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<CategoryRow>> for Table {
    fn from(rows: Vec<CategoryRow>) -> Self {
        Self::new(rows)
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a CategoryRow;
    type IntoIter = std::slice::Iter<'a, CategoryRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
