use serde::{Deserialize, Serialize};

use super::{Cents, MAX_AMOUNT_CENTS, ValidationError, parse_amount};

/// Where total spending sits relative to the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStanding {
    Under,
    Exact,
    Over,
}

impl BudgetStanding {
    pub fn classify(total: Cents, budget: Cents) -> Self {
        match total.cmp(&budget) {
            std::cmp::Ordering::Less => BudgetStanding::Under,
            std::cmp::Ordering::Equal => BudgetStanding::Exact,
            std::cmp::Ordering::Greater => BudgetStanding::Over,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStanding::Under => "under",
            BudgetStanding::Exact => "exact",
            BudgetStanding::Over => "over",
        }
    }
}

impl std::fmt::Display for BudgetStanding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Monthly spending ceiling. Lives for the session only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    amount_cents: Cents,
}

impl Budget {
    pub fn new(amount_cents: Cents) -> Result<Self, ValidationError> {
        if amount_cents < 0 {
            return Err(ValidationError::InvalidAmount {
                input: amount_cents.to_string(),
                reason: "budget cannot be negative",
            });
        }
        if amount_cents > MAX_AMOUNT_CENTS {
            return Err(ValidationError::InvalidAmount {
                input: amount_cents.to_string(),
                reason: "budget cannot exceed 1000000000.00",
            });
        }
        Ok(Self { amount_cents })
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        parse_amount(input).map(|amount_cents| Self { amount_cents })
    }

    pub fn amount_cents(&self) -> Cents {
        self.amount_cents
    }

    /// Budget left after `total` has been spent; negative when overspent.
    pub fn remaining(&self, total: Cents) -> Cents {
        self.amount_cents.saturating_sub(total)
    }

    pub fn standing(&self, total: Cents) -> BudgetStanding {
        BudgetStanding::classify(total, self.amount_cents)
    }
}
