pub mod lookup;
pub mod matcher;
pub mod store;

pub use crate::domain::model::{CategoryRow, Table};
pub use crate::domain::ports::TableSource;
pub use crate::utils::error::Result;
