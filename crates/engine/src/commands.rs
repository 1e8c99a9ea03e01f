//! Command structs for ledger writes.
//!
//! These types group the parameters of a new record, keeping call sites
//! readable. Amounts can come typed or as the raw text typed by the driver.

use chrono::{DateTime, Utc};

use crate::{ExpenseCategory, MoneyCents, Movement, ResultEngine};

/// Record a trip (income).
#[derive(Clone, Debug)]
pub struct TripCmd {
    pub amount: MoneyCents,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

impl TripCmd {
    #[must_use]
    pub fn new(amount: MoneyCents, occurred_at: DateTime<Utc>) -> Self {
        Self {
            amount,
            description: String::new(),
            occurred_at,
        }
    }

    /// Parses the amount typed by the driver (`"23,90"`, `"15"`).
    pub fn parse(amount: &str, occurred_at: DateTime<Utc>) -> ResultEngine<Self> {
        Ok(Self::new(amount.parse()?, occurred_at))
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Record an expense.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub category: ExpenseCategory,
    pub amount: MoneyCents,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(category: ExpenseCategory, amount: MoneyCents, occurred_at: DateTime<Utc>) -> Self {
        Self {
            category,
            amount,
            description: String::new(),
            occurred_at,
        }
    }

    /// Parses the amount and category typed by the driver.
    pub fn parse(category: &str, amount: &str, occurred_at: DateTime<Utc>) -> ResultEngine<Self> {
        Ok(Self::new(category.parse()?, amount.parse()?, occurred_at))
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Either command, as accepted by [`Ledger::add_record`](crate::Ledger::add_record).
#[derive(Clone, Debug)]
pub enum NewRecord {
    Trip(TripCmd),
    Expense(ExpenseCmd),
}

impl NewRecord {
    pub(crate) fn movement(&self) -> Movement {
        match self {
            Self::Trip(_) => Movement::Trip,
            Self::Expense(cmd) => Movement::Expense {
                category: cmd.category,
            },
        }
    }

    pub(crate) fn amount(&self) -> MoneyCents {
        match self {
            Self::Trip(cmd) => cmd.amount,
            Self::Expense(cmd) => cmd.amount,
        }
    }

    pub(crate) fn description(&self) -> &str {
        match self {
            Self::Trip(cmd) => &cmd.description,
            Self::Expense(cmd) => &cmd.description,
        }
    }

    pub(crate) fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Trip(cmd) => cmd.occurred_at,
            Self::Expense(cmd) => cmd.occurred_at,
        }
    }
}

impl From<TripCmd> for NewRecord {
    fn from(cmd: TripCmd) -> Self {
        Self::Trip(cmd)
    }
}

impl From<ExpenseCmd> for NewRecord {
    fn from(cmd: ExpenseCmd) -> Self {
        Self::Expense(cmd)
    }
}
