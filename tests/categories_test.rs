mod common;

use anyhow::Result;
use common::{StandardLedger, grid, memory_service};
use ledgerly::application::{LedgerError, SyncStatus};
use ledgerly::domain::ValidationError;
use ledgerly::storage::{CATEGORIES_TABLE, EXPENSES_TABLE};

#[tokio::test]
async fn test_add_category_persists_full_list() -> Result<()> {
    let (mut service, store) = memory_service(&["Food"]).await;

    let added = service.add_category("Transport").await?;
    assert_eq!(added.value, "Transport");
    assert_eq!(added.status, SyncStatus::Synced);

    assert_eq!(service.categories().names(), ["Food", "Transport"]);
    assert_eq!(
        store.grid(CATEGORIES_TABLE).unwrap(),
        grid(&[&["Category"], &["Food"], &["Transport"]])
    );

    Ok(())
}

#[tokio::test]
async fn test_add_duplicate_category_is_a_no_op() -> Result<()> {
    let (mut service, store) = memory_service(&[]).await;

    service.add_category("Food").await?;
    let writes = store.write_count();

    let second = service.add_category("Food").await;
    assert!(matches!(second, Err(LedgerError::DuplicateName(ref name)) if name == "Food"));
    assert_eq!(service.categories().names(), ["Food"]);
    assert_eq!(store.write_count(), writes);

    Ok(())
}

#[tokio::test]
async fn test_add_empty_category_rejected() -> Result<()> {
    let (mut service, _store) = memory_service(&[]).await;

    let result = service.add_category("   ").await;
    assert!(matches!(
        result,
        Err(LedgerError::InvalidInput(ValidationError::EmptyName))
    ));
    assert!(service.categories().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_edit_category() -> Result<()> {
    let (mut service, store) = memory_service(&["Food", "Transport"]).await;

    let renamed = service.edit_category(2, "Travel").await?;
    assert_eq!(renamed.value.old, "Transport");
    assert_eq!(renamed.value.new, "Travel");
    assert_eq!(service.categories().names(), ["Food", "Travel"]);
    assert_eq!(
        store.grid(CATEGORIES_TABLE).unwrap(),
        grid(&[&["Category"], &["Food"], &["Travel"]])
    );

    let clash = service.edit_category(2, "Food").await;
    assert!(matches!(clash, Err(LedgerError::DuplicateName(_))));

    Ok(())
}

#[tokio::test]
async fn test_category_index_out_of_range() -> Result<()> {
    let (mut service, store) = memory_service(&["Food"]).await;

    for index in [0, 2] {
        let edit = service.edit_category(index, "Other").await;
        assert!(matches!(
            edit,
            Err(LedgerError::IndexOutOfRange {
                what: "category",
                len: 1,
                ..
            })
        ));
        let delete = service.delete_category(index).await;
        assert!(matches!(delete, Err(LedgerError::IndexOutOfRange { .. })));
    }
    assert_eq!(service.categories().names(), ["Food"]);
    assert_eq!(store.write_count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_delete_category_keeps_existing_expenses() -> Result<()> {
    let (mut service, store) = StandardLedger::service().await?;

    let deleted = service.delete_category(1).await?;
    assert_eq!(deleted.value, "Food");
    assert_eq!(service.categories().names(), ["Transport", "Rent"]);

    // Expenses filed under Food keep the orphaned category text
    let food: Vec<&str> = service
        .expenses()
        .iter()
        .filter(|e| e.category == "Food")
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(food, ["Coffee", "Lunch"]);

    let rows = store.grid(EXPENSES_TABLE).unwrap();
    assert_eq!(rows[1][2], "Food");

    // New expenses can only use the remaining categories
    let added = service
        .add_expense("Flat", "800", "01-02-2024", 2)
        .await?;
    assert_eq!(added.value.category, "Rent");

    Ok(())
}

#[tokio::test]
async fn test_rename_category_does_not_touch_expenses() -> Result<()> {
    let (mut service, _store) = StandardLedger::service().await?;

    service.edit_category(1, "Groceries").await?;
    assert!(service.expenses().iter().any(|e| e.category == "Food"));
    assert!(!service.expenses().iter().any(|e| e.category == "Groceries"));

    Ok(())
}
