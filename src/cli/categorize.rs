use comfy_table::{Cell, Table};

use crate::categorizer::{categorize, RULES};
use crate::models::Category;

pub fn run(description: &str) -> anyhow::Result<()> {
    println!("{}", categorize(description));
    Ok(())
}

pub fn list() -> anyhow::Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["#", "Category", "Keywords"]);
    for (i, category) in Category::ALL.iter().enumerate() {
        let keywords = RULES
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, words)| words.join(", "))
            .unwrap_or_else(|| "(anything else)".to_string());
        table.add_row(vec![Cell::new(i + 1), Cell::new(category), Cell::new(keywords)]);
    }
    println!("Categories (first match wins)\n{table}");
    Ok(())
}
