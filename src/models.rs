use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::PurseError;

/// One normalized statement row. A zero amount never makes it this far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
}

/// Transactions in source row order, after row-level filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    transactions: Vec<Transaction>,
}

impl Dataset {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Groceries,
    Utilities,
    Dining,
    Shopping,
    Transportation,
    Entertainment,
    Subscription,
    Travel,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Groceries,
        Category::Utilities,
        Category::Dining,
        Category::Shopping,
        Category::Transportation,
        Category::Entertainment,
        Category::Subscription,
        Category::Travel,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groceries => "groceries",
            Self::Utilities => "utilities",
            Self::Dining => "dining",
            Self::Shopping => "shopping",
            Self::Transportation => "transportation",
            Self::Entertainment => "entertainment",
            Self::Subscription => "subscription",
            Self::Travel => "travel",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = PurseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| PurseError::Other(format!("Unknown category: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
