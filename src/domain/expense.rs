use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Cents, ParseCentsError, format_money, parse_cents};

/// Layout accepted for expense dates: `DD-MM-YYYY`.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Date given to rows stored without a date cell.
pub const PLACEHOLDER_DATE: &str = "01-01-2000";

/// Reasons user-supplied expense fields are rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: &'static str },

    #[error("Invalid date '{0}': expected DD-MM-YYYY")]
    InvalidDate(String),

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Unknown category number {index} (choose 1 to {len})")]
    UnknownCategory { index: usize, len: usize },
}

/// Parse a date in the strict `DD-MM-YYYY` layout.
pub fn parse_expense_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let input = input.trim();
    let bytes = input.as_bytes();
    let well_shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_shaped {
        return Err(ValidationError::InvalidDate(input.to_string()));
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

pub fn format_expense_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn placeholder_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

/// Largest amount accepted for an expense or a budget: €1,000,000,000.00.
/// Totals stay exact for over 92 million expenses at this size.
pub const MAX_AMOUNT_CENTS: Cents = 100_000_000_000;

/// Parse a non-negative decimal amount into cents, at most [`MAX_AMOUNT_CENTS`].
pub fn parse_amount(input: &str) -> Result<Cents, ValidationError> {
    let invalid = |reason| ValidationError::InvalidAmount {
        input: input.trim().to_string(),
        reason,
    };
    let cents = parse_cents(input).map_err(|err| match err {
        ParseCentsError::InvalidFormat => invalid("expected a number such as 12.50"),
        ParseCentsError::OutOfRange => invalid("amount cannot exceed 1000000000.00"),
    })?;
    if cents < 0 {
        return Err(invalid("amount cannot be negative"));
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(invalid("amount cannot exceed 1000000000.00"));
    }
    Ok(cents)
}

/// Trim a name and reject it when nothing is left.
pub fn validate_name(input: &str) -> Result<String, ValidationError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// A single expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub name: String,
    pub amount_cents: Cents,
    pub category: String,
    pub date: NaiveDate,
}

impl Expense {
    pub fn new(name: String, amount_cents: Cents, category: String, date: NaiveDate) -> Self {
        Self {
            name,
            amount_cents,
            category,
            date,
        }
    }

    /// Build an expense from raw text fields, validating each one.
    /// The category is taken as-is; resolving it is the caller's job.
    pub fn from_input(
        name: &str,
        amount: &str,
        date: &str,
        category: String,
    ) -> Result<Self, ValidationError> {
        let name = validate_name(name)?;
        let amount_cents = parse_amount(amount)?;
        let date = parse_expense_date(date)?;
        Ok(Self::new(name, amount_cents, category, date))
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - {}",
            self.date.format("%Y-%m-%d"),
            self.name,
            self.category,
            format_money(self.amount_cents)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expense_date() {
        let date = parse_expense_date("31-01-2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(format_expense_date(date), "31-01-2024");
    }

    #[test]
    fn test_parse_expense_date_rejects_other_layouts() {
        for input in [
            "31-13-2024",
            "2024-01-31",
            "30-02-2024",
            "1-1-2024",
            "01/01/2024",
            "01-01-24",
            "",
            "aa-bb-cccc",
        ] {
            assert_eq!(
                parse_expense_date(input),
                Err(ValidationError::InvalidDate(input.to_string())),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_leap_day() {
        assert!(parse_expense_date("29-02-2024").is_ok());
        assert!(parse_expense_date("29-02-2023").is_err());
    }

    #[test]
    fn test_placeholder_date_matches_constant() {
        assert_eq!(
            parse_expense_date(PLACEHOLDER_DATE).unwrap(),
            placeholder_date()
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("3.50"), Ok(350));
        assert_eq!(parse_amount("0"), Ok(0));
        assert!(matches!(
            parse_amount("-1"),
            Err(ValidationError::InvalidAmount { .. })
        ));
        assert!(matches!(
            parse_amount("ten"),
            Err(ValidationError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_parse_amount_caps_at_maximum() {
        assert_eq!(parse_amount("1000000000"), Ok(MAX_AMOUNT_CENTS));
        for input in ["1000000000.01", "92233720368547758.07", "99999999999999999999"] {
            assert_eq!(
                parse_amount(input),
                Err(ValidationError::InvalidAmount {
                    input: input.to_string(),
                    reason: "amount cannot exceed 1000000000.00",
                }),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Coffee "), Ok("Coffee".to_string()));
        assert_eq!(validate_name("   "), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_from_input() {
        let expense = Expense::from_input("Coffee", "3.50", "01-01-2024", "Food".into()).unwrap();
        assert_eq!(expense.name, "Coffee");
        assert_eq!(expense.amount_cents, 350);
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.to_string(), "2024-01-01 - Coffee - Food - €3.50");

        assert!(Expense::from_input("Coffee", "3.50", "2024-01-01", "Food".into()).is_err());
    }
}
