use log::{debug, error, info, warn};

use crate::domain::{
    Budget, CategoryRegistry, Expense, PLACEHOLDER_DATE, ValidationError, format_cents,
    format_expense_date, parse_amount, parse_expense_date, placeholder_date, validate_name,
};
use crate::storage::{
    AMOUNT_COLUMN, CATEGORIES_TABLE, CATEGORY_COLUMN, CATEGORY_HEADER, DATE_COLUMN,
    EXPENSE_HEADER, EXPENSE_NAME_COLUMN, EXPENSES_TABLE, TableStore,
};

use super::{LedgerError, Summary};

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, shell, tests).
///
/// The service keeps the working copy of expenses and categories in memory and
/// writes the full table back to the store after every change.
pub struct LedgerService<S> {
    store: S,
    expenses: Vec<Expense>,
    categories: CategoryRegistry,
    budget: Budget,
    unsynced: bool,
}

/// Whether the store accepted the write that followed a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Synced,
    /// The change was kept in memory but the store was not updated.
    Failed,
}

/// Result of a mutating operation together with its sync status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synced<T> {
    pub value: T,
    pub status: SyncStatus,
}

impl<T> Synced<T> {
    pub fn is_synced(&self) -> bool {
        self.status == SyncStatus::Synced
    }
}

/// A stored expense row that could not be turned into an expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// Sheet row number, counting the header as row 1.
    pub row: usize,
    pub reason: String,
}

/// What `load` found in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub categories: usize,
    pub expenses: usize,
    pub skipped: Vec<SkippedRow>,
    /// Rows that had no date cell and were given the placeholder date.
    pub undated: usize,
    /// Reads that failed and were treated as empty.
    pub backend_errors: usize,
}

/// Fields to change on an expense. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpensePatch {
    pub name: Option<String>,
    pub amount: Option<String>,
    pub date: Option<String>,
    /// 1-based position in the category list.
    pub category: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    Edit(ExpensePatch),
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Edited(Expense),
    Removed(Expense),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRename {
    pub old: String,
    pub new: String,
}

impl<S: TableStore> LedgerService<S> {
    /// Create an empty service over `store`. Call [`load`](Self::load) to read it.
    pub fn new(store: S, budget: Budget) -> Self {
        Self {
            store,
            expenses: Vec::new(),
            categories: CategoryRegistry::new(),
            budget,
            unsynced: false,
        }
    }

    /// Create a service and load everything the store holds.
    pub async fn open(store: S, budget: Budget) -> (Self, LoadReport) {
        let mut service = Self::new(store, budget);
        let report = service.load().await;
        (service, report)
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Look an expense up by its 1-based display position.
    pub fn expense(&self, index: usize) -> Result<&Expense, LedgerError> {
        let slot = self.expense_slot(index)?;
        Ok(&self.expenses[slot])
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    pub fn set_budget(&mut self, budget: Budget) {
        debug!("Budget set to {}", format_cents(budget.amount_cents()));
        self.budget = budget;
    }

    // ========================
    // Loading
    // ========================

    /// Replace the in-memory state with what the store holds.
    ///
    /// Never fails: unreadable tables count as empty and malformed rows are
    /// skipped, each logged and listed in the report.
    pub async fn load(&mut self) -> LoadReport {
        let mut report = LoadReport::default();

        let names = self
            .read_or_empty(CATEGORIES_TABLE, CATEGORY_COLUMN, &mut report)
            .await;
        let (categories, duplicates) = CategoryRegistry::from_names(names);
        for name in duplicates {
            warn!("Ignoring duplicate category '{}' in the store", name);
        }
        self.categories = categories;
        report.categories = self.categories.len();

        let names = self
            .read_or_empty(EXPENSES_TABLE, EXPENSE_NAME_COLUMN, &mut report)
            .await;
        let amounts = self
            .read_or_empty(EXPENSES_TABLE, AMOUNT_COLUMN, &mut report)
            .await;
        let categories = self
            .read_or_empty(EXPENSES_TABLE, CATEGORY_COLUMN, &mut report)
            .await;
        // Older sheets carry no date column at all
        let dates = match self.store.read_column(EXPENSES_TABLE, DATE_COLUMN).await {
            Ok(dates) => dates,
            Err(err) => {
                debug!("No expense dates available: {:#}", err);
                Vec::new()
            }
        };

        self.expenses.clear();
        let rows = names.into_iter().zip(amounts).zip(categories).enumerate();
        for (i, ((name, amount), category)) in rows {
            let row = i + 2;
            match Self::parse_row(&name, &amount, category, dates.get(i).map(String::as_str)) {
                Ok((expense, dated)) => {
                    if !dated {
                        warn!(
                            "Row {} has no date, using placeholder {}",
                            row, PLACEHOLDER_DATE
                        );
                        report.undated += 1;
                    }
                    self.expenses.push(expense);
                }
                Err(err) => {
                    error!("Skipping expense row {}: {}", row, err);
                    report.skipped.push(SkippedRow {
                        row,
                        reason: err.to_string(),
                    });
                }
            }
        }
        report.expenses = self.expenses.len();

        info!(
            "Loaded {} expenses and {} categories ({} rows skipped)",
            report.expenses,
            report.categories,
            report.skipped.len()
        );
        report
    }

    fn parse_row(
        name: &str,
        amount: &str,
        category: String,
        date: Option<&str>,
    ) -> Result<(Expense, bool), ValidationError> {
        let name = validate_name(name)?;
        let amount_cents = parse_amount(amount)?;
        let (date, dated) = match date.map(str::trim) {
            Some(text) if !text.is_empty() => (parse_expense_date(text)?, true),
            _ => (placeholder_date(), false),
        };
        Ok((Expense::new(name, amount_cents, category, date), dated))
    }

    async fn read_or_empty(
        &self,
        table: &str,
        header: &str,
        report: &mut LoadReport,
    ) -> Vec<String> {
        match self.store.read_column(table, header).await {
            Ok(values) => values,
            Err(err) => {
                error!("Error loading '{}' from '{}': {:#}", header, table, err);
                report.backend_errors += 1;
                Vec::new()
            }
        }
    }

    // ========================
    // Expense operations
    // ========================

    /// Validate and record a new expense, then save all expenses.
    pub async fn add_expense(
        &mut self,
        name: &str,
        amount: &str,
        date: &str,
        category_index: usize,
    ) -> Result<Synced<Expense>, LedgerError> {
        let category = self.resolve_category(category_index)?;
        let expense = Expense::from_input(name, amount, date, category)?;
        self.expenses.push(expense.clone());
        info!("Added expense: {}", expense);

        let status = self.sync_expenses().await;
        Ok(Synced {
            value: expense,
            status,
        })
    }

    /// Edit or remove the expense at the 1-based `index`, then save all expenses.
    ///
    /// An edit is validated as a whole before any field changes.
    pub async fn edit_or_remove(
        &mut self,
        index: usize,
        action: EditAction,
    ) -> Result<Synced<EditOutcome>, LedgerError> {
        let slot = self.expense_slot(index)?;

        let outcome = match action {
            EditAction::Edit(patch) => {
                let name = patch.name.as_deref().map(validate_name).transpose()?;
                let amount = patch.amount.as_deref().map(parse_amount).transpose()?;
                let date = patch.date.as_deref().map(parse_expense_date).transpose()?;
                let category = patch
                    .category
                    .map(|i| self.resolve_category(i))
                    .transpose()?;

                let expense = &mut self.expenses[slot];
                if let Some(name) = name {
                    expense.name = name;
                }
                if let Some(amount) = amount {
                    expense.amount_cents = amount;
                }
                if let Some(date) = date {
                    expense.date = date;
                }
                if let Some(category) = category {
                    expense.category = category;
                }
                info!("Updated expense {}: {}", index, expense);
                EditOutcome::Edited(expense.clone())
            }
            EditAction::Remove => {
                let removed = self.expenses.remove(slot);
                info!("Removed expense {}: {}", index, removed);
                EditOutcome::Removed(removed)
            }
        };

        let status = self.sync_expenses().await;
        Ok(Synced {
            value: outcome,
            status,
        })
    }

    /// Totals overall and per category against the current budget.
    pub fn summarize(&self) -> Summary {
        Summary::build(&self.expenses, self.budget)
    }

    fn expense_slot(&self, index: usize) -> Result<usize, LedgerError> {
        if index == 0 || index > self.expenses.len() {
            return Err(LedgerError::IndexOutOfRange {
                what: "expense",
                index,
                len: self.expenses.len(),
            });
        }
        Ok(index - 1)
    }

    fn resolve_category(&self, index: usize) -> Result<String, ValidationError> {
        self.categories
            .at(index)
            .map(str::to_string)
            .map_err(|_| ValidationError::UnknownCategory {
                index,
                len: self.categories.len(),
            })
    }

    async fn sync_expenses(&mut self) -> SyncStatus {
        match self.write_expenses().await {
            Ok(()) => {
                info!("Saved {} expenses", self.expenses.len());
                SyncStatus::Synced
            }
            Err(err) => {
                error!("Error saving expenses: {:#}", err);
                self.unsynced = true;
                SyncStatus::Failed
            }
        }
    }

    async fn write_expenses(&self) -> anyhow::Result<()> {
        let rows: Vec<Vec<String>> = self
            .expenses
            .iter()
            .map(|e| {
                vec![
                    e.name.clone(),
                    format_cents(e.amount_cents),
                    e.category.clone(),
                    format_expense_date(e.date),
                ]
            })
            .collect();
        self.store
            .write_table(EXPENSES_TABLE, &EXPENSE_HEADER, &rows)
            .await
    }

    // ========================
    // Category operations
    // ========================

    /// Add a category. An existing name is reported as `DuplicateName`.
    pub async fn add_category(&mut self, name: &str) -> Result<Synced<String>, LedgerError> {
        self.categories.add(name)?;
        let added = self.categories.names()[self.categories.len() - 1].clone();
        info!("Added category '{}'", added);

        let status = self.sync_categories().await;
        Ok(Synced {
            value: added,
            status,
        })
    }

    /// Rename the category at the 1-based `index`.
    /// Expenses keep the category text they were recorded with.
    pub async fn edit_category(
        &mut self,
        index: usize,
        new_name: &str,
    ) -> Result<Synced<CategoryRename>, LedgerError> {
        let old = self.categories.replace(index, new_name)?;
        let new = self.categories.at(index)?.to_string();
        info!("Renamed category '{}' to '{}'", old, new);

        let status = self.sync_categories().await;
        Ok(Synced {
            value: CategoryRename { old, new },
            status,
        })
    }

    /// Delete the category at the 1-based `index`.
    /// Expenses already filed under it are left as they are.
    pub async fn delete_category(&mut self, index: usize) -> Result<Synced<String>, LedgerError> {
        let removed = self.categories.remove(index)?;
        info!("Deleted category '{}'", removed);

        let status = self.sync_categories().await;
        Ok(Synced {
            value: removed,
            status,
        })
    }

    async fn sync_categories(&mut self) -> SyncStatus {
        match self.write_categories().await {
            Ok(()) => {
                info!("Saved {} categories", self.categories.len());
                SyncStatus::Synced
            }
            Err(err) => {
                error!("Error saving categories: {:#}", err);
                self.unsynced = true;
                SyncStatus::Failed
            }
        }
    }

    async fn write_categories(&self) -> anyhow::Result<()> {
        let rows: Vec<Vec<String>> = self.categories.iter().map(|c| vec![c.to_string()]).collect();
        self.store
            .write_table(CATEGORIES_TABLE, &CATEGORY_HEADER, &rows)
            .await
    }

    // ========================
    // Sync
    // ========================

    /// True when a write to the store failed since the last successful [`sync`](Self::sync).
    pub fn has_unsynced_changes(&self) -> bool {
        self.unsynced
    }

    /// Write both tables out in full. Unlike the per-operation saves, a
    /// failure here is returned to the caller.
    pub async fn sync(&mut self) -> Result<(), LedgerError> {
        self.write_categories().await?;
        self.write_expenses().await?;
        self.unsynced = false;
        info!("Ledger synced to the store");
        Ok(())
    }
}
