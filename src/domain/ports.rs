use crate::domain::model::Table;
use crate::utils::error::Result;
use std::path::Path;

/// An external tabular resource the category table is loaded from and
/// persisted to.
pub trait TableSource {
    fn location(&self) -> &Path;

    /// Missing or malformed resources are errors; an empty table is never
    /// substituted.
    fn load(&self) -> Result<Table>;

    /// Overwrites the whole resource. Last writer wins.
    fn persist(&self, table: &Table) -> Result<()>;
}
