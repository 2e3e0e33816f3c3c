use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::fmt::money;
use crate::importer::load_dataset;
use crate::reports::{analyze, Analysis, NO_DATA_MESSAGE, OVERFLOW_MESSAGE};

pub fn run(file: &Path) -> anyhow::Result<()> {
    let dataset = load_dataset(file).with_context(|| format!("loading {}", file.display()))?;

    let report = match analyze(&dataset) {
        Analysis::NoData => {
            println!("{}", NO_DATA_MESSAGE.yellow());
            return Ok(());
        }
        Analysis::Report(report) => report,
        Analysis::Overflow => anyhow::bail!(OVERFLOW_MESSAGE),
    };

    let mut table = Table::new();
    table.set_header(vec!["Category", "Transactions", "Spending"]);
    for item in &report.by_category {
        table.add_row(vec![
            Cell::new(item.category),
            Cell::new(item.count),
            Cell::new(money(item.total)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(report.transaction_count),
        Cell::new(money(report.total)),
    ]);

    println!("Spending by category\n{table}");
    Ok(())
}
