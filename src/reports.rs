use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::categorizer::categorize;
use crate::fmt::money;
use crate::models::{Category, Dataset};

pub const NO_DATA_MESSAGE: &str = "No transaction data found.";
pub const OVERFLOW_MESSAGE: &str = "Spending totals are too large to compute for this statement.";

// ---------------------------------------------------------------------------
// Spending by category
// ---------------------------------------------------------------------------

pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
    pub count: usize,
}

pub struct SpendingReport {
    /// Sum of absolute amounts.
    pub total: Decimal,
    /// Absolute value of each category's signed sum, ordered by category name.
    pub by_category: Vec<CategoryTotal>,
    pub transaction_count: usize,
}

pub enum Analysis {
    NoData,
    Report(SpendingReport),
    /// A sum left the range `Decimal` can represent.
    Overflow,
}

/// Aggregate total and per-category spend.
///
/// The total adds up absolute amounts, while each category takes the absolute
/// value of its signed sum, so a refund offsets a purchase inside its category
/// but still counts toward the total.
pub fn analyze(dataset: &Dataset) -> Analysis {
    if dataset.is_empty() {
        return Analysis::NoData;
    }

    let mut total = Decimal::ZERO;
    let mut sums: HashMap<Category, (Decimal, usize)> = HashMap::new();
    for txn in dataset.transactions() {
        let entry = sums
            .entry(categorize(&txn.description))
            .or_insert((Decimal::ZERO, 0));
        let (Some(new_total), Some(new_sum)) = (
            total.checked_add(txn.amount.abs()),
            entry.0.checked_add(txn.amount),
        ) else {
            tracing::warn!(rows = dataset.len(), "spending sum overflowed");
            return Analysis::Overflow;
        };
        total = new_total;
        entry.0 = new_sum;
        entry.1 += 1;
    }

    let mut by_category: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(category, (sum, count))| CategoryTotal {
            category,
            total: sum.abs(),
            count,
        })
        .collect();
    by_category.sort_by(|a, b| a.category.as_str().cmp(b.category.as_str()));

    Analysis::Report(SpendingReport {
        total,
        by_category,
        transaction_count: dataset.len(),
    })
}

impl SpendingReport {
    pub fn category_total(&self, category: Category) -> Option<Decimal> {
        self.by_category
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.total)
    }

    pub fn render(&self) -> String {
        let mut out = format!("Total spending: {}\n", money(self.total));
        out.push_str("Spending per category:");
        for item in &self.by_category {
            out.push_str(&format!("\n  {}: {}", item.category, money(item.total)));
        }
        out
    }
}

impl Analysis {
    pub fn render(&self) -> String {
        match self {
            Analysis::NoData => NO_DATA_MESSAGE.to_string(),
            Analysis::Report(report) => report.render(),
            Analysis::Overflow => OVERFLOW_MESSAGE.to_string(),
        }
    }
}
