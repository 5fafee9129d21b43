mod csv_store;
mod memory;
mod sqlite;
mod table;

use anyhow::Result;

pub use csv_store::*;
pub use memory::*;
pub use sqlite::*;
pub use table::*;

/// SQL migration for the worksheet table
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// A table store chosen at runtime.
pub enum AnyTableStore {
    Sqlite(SqliteTableStore),
    Csv(CsvTableStore),
}

impl TableStore for AnyTableStore {
    async fn read_column(&self, table: &str, header: &str) -> Result<Vec<String>> {
        match self {
            AnyTableStore::Sqlite(store) => store.read_column(table, header).await,
            AnyTableStore::Csv(store) => store.read_column(table, header).await,
        }
    }

    async fn write_table(&self, table: &str, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
        match self {
            AnyTableStore::Sqlite(store) => store.write_table(table, header, rows).await,
            AnyTableStore::Csv(store) => store.write_table(table, header, rows).await,
        }
    }
}
