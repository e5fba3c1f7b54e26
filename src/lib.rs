pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{CsvSource, FileSource, XlsxSource};
pub use config::TomlConfig;
pub use crate::core::store::TableSession;
pub use domain::model::{CategoryRow, Column, Table};
pub use domain::ports::TableSource;
pub use utils::error::{CemtError, Result};
