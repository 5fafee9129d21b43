use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use super::table::{TableStore, build_grid, extract_column};
use super::{CATEGORIES_TABLE, CATEGORY_HEADER, EXPENSE_HEADER, EXPENSES_TABLE, MIGRATION_001_INITIAL};

/// Table store backed by a local SQLite file.
///
/// Worksheets live in a single `sheet_rows` table, one row per sheet row,
/// so the store behaves like a spreadsheet: ragged rows, headers by text.
pub struct SqliteTableStore {
    pool: SqlitePool,
}

impl SqliteTableStore {
    /// Create a new store with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to an existing SQLite database.
    pub async fn connect(database_path: &str) -> Result<Self> {
        let database_url = format!("sqlite:{}", database_path);
        let pool = SqlitePool::connect(&database_url)
            .await
            .with_context(|| format!("Failed to open ledger store '{}'", database_path))?;
        Ok(Self::new(pool))
    }

    /// Create the database if needed, run migrations and seed header rows.
    /// Existing worksheets are left untouched.
    pub async fn init(database_path: &str) -> Result<Self> {
        let database_url = format!("sqlite:{}?mode=rwc", database_path);
        let pool = SqlitePool::connect(&database_url)
            .await
            .with_context(|| format!("Failed to create ledger store '{}'", database_path))?;
        let store = Self::new(pool);
        store.migrate().await?;
        store.seed_header(EXPENSES_TABLE, &EXPENSE_HEADER).await?;
        store.seed_header(CATEGORIES_TABLE, &CATEGORY_HEADER).await?;
        Ok(store)
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    async fn seed_header(&self, table: &str, header: &[&str]) -> Result<()> {
        let cells = serde_json::to_string(header)?;
        sqlx::query("INSERT OR IGNORE INTO sheet_rows (sheet, row_index, cells) VALUES (?, 0, ?)")
            .bind(table)
            .bind(&cells)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to seed header for '{}'", table))?;
        Ok(())
    }

    async fn load_grid(&self, table: &str) -> Result<Vec<Vec<String>>> {
        let rows = sqlx::query(
            r#"
            SELECT cells
            FROM sheet_rows
            WHERE sheet = ?
            ORDER BY row_index
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to read table '{}'", table))?;

        if rows.is_empty() {
            anyhow::bail!("Table '{}' not found", table);
        }

        rows.iter()
            .map(|row| {
                let cells: String = row.get("cells");
                serde_json::from_str::<Vec<String>>(&cells)
                    .with_context(|| format!("Corrupt row in table '{}'", table))
            })
            .collect()
    }
}

impl TableStore for SqliteTableStore {
    async fn read_column(&self, table: &str, header: &str) -> Result<Vec<String>> {
        let grid = self.load_grid(table).await?;
        extract_column(table, &grid, header)
    }

    async fn write_table(&self, table: &str, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
        let grid = build_grid(header, rows);
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start transaction")?;

        sqlx::query("DELETE FROM sheet_rows WHERE sheet = ?")
            .bind(table)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to clear table '{}'", table))?;

        for (row_index, row) in grid.iter().enumerate() {
            let cells = serde_json::to_string(row)?;
            sqlx::query("INSERT INTO sheet_rows (sheet, row_index, cells) VALUES (?, ?, ?)")
                .bind(table)
                .bind(row_index as i64)
                .bind(&cells)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to write row {} of '{}'", row_index, table))?;
        }

        tx.commit()
            .await
            .with_context(|| format!("Failed to commit table '{}'", table))?;
        Ok(())
    }
}
