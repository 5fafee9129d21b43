use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::table::{TableStore, build_grid, extract_column};
use super::{CATEGORIES_TABLE, CATEGORY_HEADER, EXPENSE_HEADER, EXPENSES_TABLE};

/// Table store that keeps each worksheet as `<dir>/<table>.csv`.
///
/// Handy for hand-editing the ledger in a spreadsheet program.
pub struct CsvTableStore {
    dir: PathBuf,
}

impl CsvTableStore {
    /// Open a directory that already holds the worksheets.
    pub fn connect(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            anyhow::bail!("Ledger directory not found: {}", dir.display());
        }
        Ok(Self { dir })
    }

    /// Create the directory and any missing worksheet with its header row.
    pub fn init(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create ledger directory {}", dir.display()))?;
        let store = Self { dir };
        for (table, header) in [
            (EXPENSES_TABLE, &EXPENSE_HEADER[..]),
            (CATEGORIES_TABLE, &CATEGORY_HEADER[..]),
        ] {
            if !store.path_for(table).exists() {
                store.write_grid(table, &build_grid(header, &[]))?;
            }
        }
        Ok(store)
    }

    fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", table))
    }

    fn read_grid(&self, table: &str) -> Result<Vec<Vec<String>>> {
        let path = self.path_for(table);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        reader
            .records()
            .map(|record| -> Result<Vec<String>> {
                let record =
                    record.with_context(|| format!("Failed to parse {}", path.display()))?;
                Ok(record.iter().map(str::to_string).collect())
            })
            .collect()
    }

    fn write_grid(&self, table: &str, grid: &[Vec<String>]) -> Result<()> {
        let path = self.path_for(table);
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for row in grid {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl TableStore for CsvTableStore {
    async fn read_column(&self, table: &str, header: &str) -> Result<Vec<String>> {
        let grid = self.read_grid(table)?;
        extract_column(table, &grid, header)
    }

    async fn write_table(&self, table: &str, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
        self.write_grid(table, &build_grid(header, rows))
    }
}
