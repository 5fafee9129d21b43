use std::fmt::Write;

use crate::application::{ExpenseLine, Summary};
use crate::domain::{BudgetStanding, CategoryRegistry, format_money};

const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// Wrap `text` in the color for `standing`: green under budget, red over,
/// plain when spending matches the budget exactly.
pub fn paint(text: &str, standing: BudgetStanding, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match standing {
        BudgetStanding::Under => format!("{}{}{}", GREEN, text, RESET),
        BudgetStanding::Over => format!("{}{}{}", RED, text, RESET),
        BudgetStanding::Exact => text.to_string(),
    }
}

pub fn render_expense_table(lines: &[ExpenseLine]) -> String {
    if lines.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<12} {:<24} {:<16} {:>12}",
        "INDEX", "DATE", "EXPENSE NAME", "CATEGORY", "AMOUNT"
    );
    let _ = writeln!(out, "{}", "-".repeat(74));
    for line in lines {
        let _ = writeln!(
            out,
            "{:<6} {:<12} {:<24} {:<16} {:>12}",
            line.index,
            line.date,
            truncate(&line.name, 24),
            truncate(&line.category, 16),
            format_money(line.amount)
        );
    }
    out
}

pub fn render_summary(summary: &Summary, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Total Expenses: {}",
        paint(&format_money(summary.total), summary.standing, color)
    );
    let _ = writeln!(
        out,
        "Monthly Budget: {}",
        format_money(summary.budget)
    );
    let _ = writeln!(
        out,
        "Outstanding Monthly Budget: {}",
        paint(&format_money(summary.remaining), summary.standing, color)
    );
    let _ = writeln!(out, "Category-wise Expenses:");
    if summary.categories.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for category in &summary.categories {
        let _ = writeln!(
            out,
            "  {}: {} ({} {})",
            category.category,
            format_money(category.total),
            category.count,
            if category.count == 1 { "expense" } else { "expenses" }
        );
    }
    out
}

/// Numbered list, starting at 1.
pub fn render_categories(categories: &CategoryRegistry) -> String {
    if categories.is_empty() {
        return "No categories yet.\n".to_string();
    }
    let mut out = String::new();
    for (i, name) in categories.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, name);
    }
    out
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
