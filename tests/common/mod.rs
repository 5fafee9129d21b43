// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use ledgerly::application::LedgerService;
use ledgerly::domain::Budget;
use ledgerly::storage::{
    CATEGORIES_TABLE, CATEGORY_HEADER, MemoryTableStore, SqliteTableStore,
};
use tempfile::TempDir;

/// Helper to build a grid of cells from string slices
pub fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// Helper to parse a DD-MM-YYYY date string
pub fn date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%d-%m-%Y").unwrap()
}

/// Helper to build a budget from a decimal string
pub fn budget(amount: &str) -> Budget {
    Budget::parse(amount).unwrap()
}

/// In-memory store holding the given categories and no expenses
pub fn memory_store(categories: &[&str]) -> MemoryTableStore {
    let store = MemoryTableStore::seeded();
    let mut rows: Vec<Vec<String>> = vec![CATEGORY_HEADER.iter().map(|h| h.to_string()).collect()];
    rows.extend(categories.iter().map(|c| vec![c.to_string()]));
    store.put_grid(CATEGORIES_TABLE, rows);
    store
}

/// Helper to create a loaded service over an in-memory store.
/// Returns a second handle to the same store for inspection.
pub async fn memory_service(
    categories: &[&str],
) -> (LedgerService<MemoryTableStore>, MemoryTableStore) {
    let store = memory_store(categories);
    let (service, _) = LedgerService::open(store.clone(), Budget::default()).await;
    (service, store)
}

/// Helper to create a test service with a temporary SQLite database
pub async fn sqlite_service() -> Result<(LedgerService<SqliteTableStore>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("ledger.db");
    let store = SqliteTableStore::init(db_path.to_str().unwrap()).await?;
    let (service, _) = LedgerService::open(store, Budget::default()).await;
    Ok((service, temp_dir))
}

/// Test fixture: standard categories and a couple of expenses
pub struct StandardLedger;

impl StandardLedger {
    pub const CATEGORIES: [&'static str; 3] = ["Food", "Transport", "Rent"];

    /// Coffee (Food), Bus (Transport), Lunch (Food)
    pub async fn populate(service: &mut LedgerService<MemoryTableStore>) -> Result<()> {
        service.add_expense("Coffee", "3.50", "01-01-2024", 1).await?;
        service.add_expense("Bus", "2.00", "02-01-2024", 2).await?;
        service.add_expense("Lunch", "12.25", "03-01-2024", 1).await?;
        Ok(())
    }

    pub async fn service() -> Result<(LedgerService<MemoryTableStore>, MemoryTableStore)> {
        let (mut service, store) = memory_service(&Self::CATEGORIES).await;
        Self::populate(&mut service).await?;
        Ok((service, store))
    }
}
