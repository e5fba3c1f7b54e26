//! Interval containment over the category table.
//!
//! Bounds are inclusive on both ends, so a value sitting on a boundary shared
//! by two categories matches both. Callers that need a single answer take the
//! first match in table order.

use crate::domain::model::{CategoryRow, Table};
use serde::Serialize;
use std::fmt;

/// `min <= value <= max`. A row with `min > max` never contains anything;
/// NaN never compares true.
pub fn contains(min: f64, max: f64, value: f64) -> bool {
    min <= value && value <= max
}

pub fn match_by_length(table: &Table, length: f64) -> Vec<&CategoryRow> {
    table
        .iter()
        .filter(|row| contains(row.min_length, row.max_length, length))
        .collect()
}

pub fn match_by_length_and_width(table: &Table, length: f64, width: f64) -> Vec<&CategoryRow> {
    table
        .iter()
        .filter(|row| {
            contains(row.min_length, row.max_length, length)
                && contains(row.min_width, row.max_width, width)
        })
        .collect()
}

/// The conventional single answer: first row satisfying both constraints.
pub fn classify(table: &Table, length: f64, width: f64) -> Option<&CategoryRow> {
    table.iter().find(|row| {
        contains(row.min_length, row.max_length, length)
            && contains(row.min_width, row.max_width, width)
    })
}

/// Width interval of a category whose length interval contains the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidthHint {
    pub category_id: Option<String>,
    pub min_width: f64,
    pub max_width: f64,
}

impl fmt::Display for WidthHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CEMT {}: {}~{} m",
            self.category_id.as_deref().unwrap_or("-"),
            self.min_width,
            self.max_width
        )
    }
}

/// 輸入長度後，列出可選的寬度區間
pub fn width_hints(table: &Table, length: f64) -> Vec<WidthHint> {
    match_by_length(table, length)
        .into_iter()
        .map(|row| WidthHint {
            category_id: row.category_id.clone(),
            min_width: row.min_width,
            max_width: row.max_width,
        })
        .collect()
}
