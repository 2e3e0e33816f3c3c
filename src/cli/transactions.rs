use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::categorizer::categorize;
use crate::fmt::money;
use crate::importer::load_dataset;
use crate::models::Category;
use crate::reports::{analyze, Analysis};

pub fn run(file: &Path, only: Option<Category>) -> anyhow::Result<()> {
    let dataset = load_dataset(file).with_context(|| format!("loading {}", file.display()))?;

    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Category"]);
    let mut shown = 0usize;
    for txn in dataset.transactions() {
        let category = categorize(&txn.description);
        if only.is_some_and(|c| c != category) {
            continue;
        }
        shown += 1;
        let amount = if txn.amount.is_sign_negative() {
            money(txn.amount).red().to_string()
        } else {
            money(txn.amount).green().to_string()
        };
        table.add_row(vec![
            Cell::new(txn.date),
            Cell::new(&txn.description),
            Cell::new(amount),
            Cell::new(category),
        ]);
    }
    println!("{shown} transactions\n{table}");

    if let (Some(category), Analysis::Report(report)) = (only, analyze(&dataset)) {
        let total = report.category_total(category).unwrap_or_default();
        println!("Spending in {category}: {}", money(total).bold());
    }
    Ok(())
}
