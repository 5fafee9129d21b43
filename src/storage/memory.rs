use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, bail};

use super::table::{TableStore, build_grid, extract_column};
use super::{CATEGORIES_TABLE, CATEGORY_HEADER, EXPENSE_HEADER, EXPENSES_TABLE};

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Vec<String>>>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

/// In-memory table store.
///
/// Clones share the same tables, so a test can keep a handle after moving
/// one into a service. Reads and writes can be made to fail on demand.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with empty `expenses` and `categories` worksheets.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.put_grid(EXPENSES_TABLE, build_grid(&EXPENSE_HEADER, &[]));
        store.put_grid(CATEGORIES_TABLE, build_grid(&CATEGORY_HEADER, &[]));
        store
    }

    /// Replace a worksheet with raw rows, header included.
    pub fn put_grid(&self, table: &str, grid: Vec<Vec<String>>) {
        self.lock().tables.insert(table.to_string(), grid);
    }

    /// Raw rows of a worksheet, header included.
    pub fn grid(&self, table: &str) -> Option<Vec<Vec<String>>> {
        self.lock().tables.get(table).cloned()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Number of successful `write_table` calls so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TableStore for MemoryTableStore {
    async fn read_column(&self, table: &str, header: &str) -> Result<Vec<String>> {
        let state = self.lock();
        if state.fail_reads {
            bail!("simulated read failure on '{}'", table);
        }
        match state.tables.get(table) {
            Some(grid) => extract_column(table, grid, header),
            None => bail!("Table '{}' not found", table),
        }
    }

    async fn write_table(&self, table: &str, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            bail!("simulated write failure on '{}'", table);
        }
        state
            .tables
            .insert(table.to_string(), build_grid(header, rows));
        state.writes += 1;
        Ok(())
    }
}
