use anyhow::{Result, anyhow};

/// Worksheet holding one row per expense.
pub const EXPENSES_TABLE: &str = "expenses";

/// Worksheet holding one row per category name.
pub const CATEGORIES_TABLE: &str = "categories";

pub const EXPENSE_NAME_COLUMN: &str = "Expense Name";
pub const AMOUNT_COLUMN: &str = "Amount";
pub const CATEGORY_COLUMN: &str = "Category";
pub const DATE_COLUMN: &str = "Date";

pub const EXPENSE_HEADER: [&str; 4] = [
    EXPENSE_NAME_COLUMN,
    AMOUNT_COLUMN,
    CATEGORY_COLUMN,
    DATE_COLUMN,
];

pub const CATEGORY_HEADER: [&str; 1] = [CATEGORY_COLUMN];

/// A spreadsheet-like backend addressed by worksheet name and column header.
///
/// Every table has a header row. Readers look columns up by header text;
/// writers replace every data row under a fixed header in one go.
#[allow(async_fn_in_trait)]
pub trait TableStore {
    /// All data cells under `header`, top to bottom.
    ///
    /// Fails when the table does not exist or the header is not in its first row.
    async fn read_column(&self, table: &str, header: &str) -> Result<Vec<String>>;

    /// Replace the whole table with `header` followed by `rows`.
    async fn write_table(&self, table: &str, header: &[&str], rows: &[Vec<String>]) -> Result<()>;
}

/// Pull one column out of a grid whose first row is the header.
///
/// Short rows read as empty cells. Trailing empty cells are dropped, the way a
/// spreadsheet reports the used range of a column.
pub(crate) fn extract_column(table: &str, grid: &[Vec<String>], header: &str) -> Result<Vec<String>> {
    let (header_row, data) = grid
        .split_first()
        .ok_or_else(|| anyhow!("Table '{}' has no header row", table))?;

    let column = header_row
        .iter()
        .position(|h| h.trim() == header)
        .ok_or_else(|| anyhow!("Header '{}' not found in the first row of '{}'", header, table))?;

    let mut values: Vec<String> = data
        .iter()
        .map(|row| row.get(column).cloned().unwrap_or_default())
        .collect();
    while values.last().is_some_and(|v| v.is_empty()) {
        values.pop();
    }
    Ok(values)
}

/// Header row followed by the data rows.
pub(crate) fn build_grid(header: &[&str], rows: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut grid = Vec::with_capacity(rows.len() + 1);
    grid.push(header.iter().map(|h| h.to_string()).collect());
    grid.extend(rows.iter().cloned());
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_extract_column() {
        let g = grid(&[
            &["Expense Name", "Amount", "Category"],
            &["Coffee", "3.50", "Food"],
            &["Bus", "2.00"],
        ]);
        assert_eq!(
            extract_column("expenses", &g, "Amount").unwrap(),
            vec!["3.50", "2.00"]
        );
        // Trailing blank cells are not part of the column
        assert_eq!(
            extract_column("expenses", &g, "Category").unwrap(),
            vec!["Food"]
        );
    }

    #[test]
    fn test_extract_column_missing_header() {
        let g = grid(&[&["Category"], &["Food"]]);
        assert!(extract_column("categories", &g, "Amount").is_err());
        assert!(extract_column("categories", &[], "Category").is_err());
    }

    #[test]
    fn test_build_grid() {
        let rows = vec![vec!["Food".to_string()]];
        let g = build_grid(&CATEGORY_HEADER, &rows);
        assert_eq!(g, grid(&[&["Category"], &["Food"]]));
    }
}
