use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Budget, BudgetStanding, Cents, Expense};

/// Spending totals compared against the session budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: Cents,
    pub categories: Vec<CategoryTotal>,
    pub budget: Cents,
    /// `budget - total`; negative when overspent.
    pub remaining: Cents,
    pub standing: BudgetStanding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Cents,
    pub count: usize,
}

impl Summary {
    /// Totals overall and per category, categories in order of first appearance.
    /// Sums saturate at `Cents::MAX` instead of wrapping.
    pub fn build(expenses: &[Expense], budget: Budget) -> Self {
        let mut categories: Vec<CategoryTotal> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut total: Cents = 0;

        for expense in expenses {
            total = total.saturating_add(expense.amount_cents);
            let slot = *positions
                .entry(expense.category.as_str())
                .or_insert_with(|| {
                    categories.push(CategoryTotal {
                        category: expense.category.clone(),
                        total: 0,
                        count: 0,
                    });
                    categories.len() - 1
                });
            let entry = &mut categories[slot];
            entry.total = entry.total.saturating_add(expense.amount_cents);
            entry.count += 1;
        }

        Self {
            total,
            categories,
            budget: budget.amount_cents(),
            remaining: budget.remaining(total),
            standing: budget.standing(total),
        }
    }
}

/// One line of the expense listing, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub index: usize,
    pub date: String,
    pub name: String,
    pub category: String,
    pub amount: Cents,
}

/// Number the expenses from 1, the way they are addressed for edits.
pub fn expense_lines(expenses: &[Expense]) -> Vec<ExpenseLine> {
    expenses
        .iter()
        .enumerate()
        .map(|(i, expense)| ExpenseLine {
            index: i + 1,
            date: expense.date.format("%d/%m/%Y").to_string(),
            name: expense.name.clone(),
            category: expense.category.clone(),
            amount: expense.amount_cents,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_expense_date;

    fn expense(name: &str, cents: Cents, category: &str) -> Expense {
        Expense::new(
            name.into(),
            cents,
            category.into(),
            parse_expense_date("01-01-2024").unwrap(),
        )
    }

    #[test]
    fn test_summary_groups_in_first_appearance_order() {
        let expenses = vec![
            expense("Bus", 200, "Transport"),
            expense("Coffee", 350, "Food"),
            expense("Train", 1000, "Transport"),
        ];
        let summary = Summary::build(&expenses, Budget::new(10000).unwrap());

        assert_eq!(summary.total, 1550);
        let order: Vec<&str> = summary
            .categories
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(order, ["Transport", "Food"]);
        assert_eq!(summary.categories[0].total, 1200);
        assert_eq!(summary.categories[0].count, 2);
        assert_eq!(
            summary.categories.iter().map(|c| c.total).sum::<Cents>(),
            summary.total
        );
        assert_eq!(summary.remaining, 8450);
        assert_eq!(summary.standing, BudgetStanding::Under);
    }

    #[test]
    fn test_summary_saturates_instead_of_wrapping() {
        let expenses = vec![
            expense("Big", Cents::MAX, "Food"),
            expense("Bigger", 1, "Food"),
        ];
        let summary = Summary::build(&expenses, Budget::default());

        assert_eq!(summary.total, Cents::MAX);
        assert_eq!(summary.categories[0].total, Cents::MAX);
        assert_eq!(summary.remaining, -Cents::MAX);
        assert_eq!(summary.standing, BudgetStanding::Over);
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::build(&[], Budget::default());
        assert_eq!(summary.total, 0);
        assert!(summary.categories.is_empty());
        assert_eq!(summary.standing, BudgetStanding::Exact);
    }

    #[test]
    fn test_expense_lines() {
        let lines = expense_lines(&[expense("Coffee", 350, "Food")]);
        assert_eq!(lines[0].index, 1);
        assert_eq!(lines[0].date, "01/01/2024");
    }
}
