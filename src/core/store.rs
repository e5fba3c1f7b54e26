use crate::domain::model::Table;
use crate::domain::ports::TableSource;
use crate::utils::error::Result;
use std::time::{Duration, Instant};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

pub fn load<S: TableSource>(source: &S) -> Result<Table> {
    source.load()
}

/// Whole-table replacement; the previous contents are dropped.
pub fn replace(_table: Table, new_table: Table) -> Table {
    new_table
}

pub fn persist<S: TableSource>(table: &Table, destination: &S) -> Result<()> {
    destination.persist(table)
}

/// Owns the in-memory category table for one caller session.
///
/// Every transition is explicit: `open` loads, `replace` swaps the whole
/// table, `persist` writes the current table back, `reload` re-reads the
/// source. The cache TTL is advisory and only consulted by
/// `refresh_if_stale`.
pub struct TableSession<S: TableSource> {
    source: S,
    table: Table,
    loaded_at: Instant,
    cache_ttl: Duration,
    dirty: bool,
}

impl<S: TableSource> TableSession<S> {
    pub fn open(source: S) -> Result<Self> {
        let table = load(&source)?;
        tracing::info!(
            "📂 Loaded {} category rows from {}",
            table.len(),
            source.location().display()
        );

        Ok(Self {
            source,
            table,
            loaded_at: Instant::now(),
            cache_ttl: DEFAULT_CACHE_TTL,
            dirty: false,
        })
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// 直接編輯目前的資料表；之後需要 persist 才會寫回
    pub fn table_mut(&mut self) -> &mut Table {
        self.dirty = true;
        &mut self.table
    }

    /// Returns the table that was replaced.
    pub fn replace(&mut self, new_table: Table) -> Table {
        tracing::debug!(
            "Replacing table ({} rows) with edited version ({} rows)",
            self.table.len(),
            new_table.len()
        );
        self.dirty = true;
        std::mem::replace(&mut self.table, new_table)
    }

    pub fn persist(&mut self) -> Result<()> {
        persist(&self.table, &self.source)?;
        self.dirty = false;
        tracing::info!(
            "💾 Saved {} rows to {}",
            self.table.len(),
            self.source.location().display()
        );
        Ok(())
    }

    /// 另存新檔，session 的來源不變
    pub fn persist_to<D: TableSource>(&self, destination: &D) -> Result<()> {
        persist(&self.table, destination)?;
        tracing::info!(
            "💾 Saved {} rows to {}",
            self.table.len(),
            destination.location().display()
        );
        Ok(())
    }

    /// Re-reads the source, discarding unsaved edits. On failure the current
    /// table is kept and the error returned.
    pub fn reload(&mut self) -> Result<()> {
        let table = load(&self.source)?;
        if self.dirty {
            tracing::warn!("⚠️ Reload discarded unsaved edits");
        }
        tracing::info!(
            "🔄 Reloaded {} rows from {}",
            table.len(),
            self.source.location().display()
        );
        self.table = table;
        self.loaded_at = Instant::now();
        self.dirty = false;
        Ok(())
    }

    pub fn is_stale(&self) -> bool {
        self.loaded_at.elapsed() >= self.cache_ttl
    }

    /// Reloads only when the cache TTL has run out. Returns whether it did.
    pub fn refresh_if_stale(&mut self) -> Result<bool> {
        if !self.is_stale() {
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }
}
