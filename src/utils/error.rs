use thiserror::Error;

#[derive(Error, Debug)]
pub enum CemtError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Excel read error: {0}")]
    ExcelReadError(#[from] calamine::Error),

    #[error("Excel write error: {0}")]
    ExcelWriteError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Table source not found: {path}")]
    SourceNotFound { path: String },

    #[error("Unsupported table format: {path} (expected .xlsx or .csv)")]
    UnsupportedFormat { path: String },

    #[error("Table source is empty: {path}")]
    EmptySource { path: String },

    #[error("Missing column '{column}'")]
    MissingColumn { column: String },

    #[error("Invalid value '{value}' in row {row}, column '{column}': {reason}")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Unknown column '{name}'")]
    UnknownColumn { name: String },

    #[error("Row index {index} out of range (table has {len} rows)")]
    RowIndexOutOfRange { index: usize, len: usize },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Format,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl CemtError {
    pub fn invalid_cell(row: usize, column: &str, value: impl Into<String>, reason: &str) -> Self {
        CemtError::InvalidCell {
            row,
            column: column.to_string(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// 載入階段的錯誤：呼叫端必須停止後續流程
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            CemtError::IoError(_)
                | CemtError::CsvError(_)
                | CemtError::ExcelReadError(_)
                | CemtError::SourceNotFound { .. }
                | CemtError::UnsupportedFormat { .. }
                | CemtError::EmptySource { .. }
                | CemtError::MissingColumn { .. }
                | CemtError::InvalidCell { .. }
        )
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CemtError::IoError(_) | CemtError::SourceNotFound { .. } => ErrorCategory::Io,
            CemtError::CsvError(_)
            | CemtError::ExcelReadError(_)
            | CemtError::ExcelWriteError(_)
            | CemtError::SerializationError(_)
            | CemtError::UnsupportedFormat { .. }
            | CemtError::EmptySource { .. }
            | CemtError::MissingColumn { .. }
            | CemtError::InvalidCell { .. } => ErrorCategory::Format,
            CemtError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            CemtError::InvalidConfigValueError { .. }
            | CemtError::UnknownColumn { .. }
            | CemtError::RowIndexOutOfRange { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Format => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CemtError::SourceNotFound { path } => {
                format!("找不到資料檔案 '{}'，請指定 Excel 或 CSV 檔案", path)
            }
            CemtError::MissingColumn { column } => {
                format!("資料表缺少欄位「{}」", column)
            }
            CemtError::InvalidCell {
                row,
                column,
                value,
                reason,
            } => format!("第 {} 列「{}」的值 '{}' 無效：{}", row, column, value, reason),
            CemtError::RowIndexOutOfRange { index, len } => {
                format!("列索引 {} 超出範圍（共 {} 列）", index, len)
            }
            CemtError::InvalidConfigValueError { field, value, .. } => {
                format!("參數 {} 的值 '{}' 無效", field, value)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CemtError::SourceNotFound { .. } => "Pass --table <file.xlsx|file.csv> or set [table].path in the config",
            CemtError::UnsupportedFormat { .. } => "Convert the table to .xlsx or .csv",
            CemtError::EmptySource { .. } => "Make sure the first sheet has a header row",
            CemtError::MissingColumn { .. } => {
                "Check the header row: column names must match exactly"
            }
            CemtError::InvalidCell { .. } => "Fix the cell value in the table file",
            CemtError::UnknownColumn { .. } => "Run `cemt show` to see the valid column names",
            CemtError::RowIndexOutOfRange { .. } => "Run `cemt show` to see the row indices",
            CemtError::InvalidConfigValueError { .. } => "Adjust the value to the allowed range",
            CemtError::ConfigValidationError { .. } => "Check the TOML configuration file",
            CemtError::IoError(_) | CemtError::ExcelWriteError(_) => {
                "Check that the file is not open elsewhere and the directory is writable"
            }
            CemtError::CsvError(_) | CemtError::ExcelReadError(_) => {
                "Make sure the file is a valid spreadsheet and not corrupted"
            }
            CemtError::SerializationError(_) => "Retry without --json",
        }
    }
}

pub type Result<T> = std::result::Result<T, CemtError>;
