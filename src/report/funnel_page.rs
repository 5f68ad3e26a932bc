//! Printable funnel pages

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Table};

use crate::pipeline::{FunnelLayout, FunnelTable};

/// Build a table of a funnel: key columns, stage, count and, if the layout
/// asks for it, conversion. Key values are printed only on the first row of
/// each group.
pub fn render_funnel_table(funnel: &FunnelTable, layout: &FunnelLayout) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let mut header: Vec<Cell> = funnel
        .key_columns
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect();
    header.push(Cell::new(&layout.stage_column).add_attribute(Attribute::Bold));
    header.push(Cell::new(&layout.count_column).add_attribute(Attribute::Bold));
    if let Some(name) = &layout.conversion_column {
        header.push(Cell::new(name).add_attribute(Attribute::Bold));
    }
    table.set_header(header);

    let mut previous_key = None;
    for cell in &funnel.cells {
        let first_in_group = previous_key != Some(&cell.key);
        previous_key = Some(&cell.key);

        let mut row: Vec<Cell> = cell
            .key
            .iter()
            .map(|value| Cell::new(if first_in_group { value.as_str() } else { "" }))
            .collect();
        row.push(Cell::new(cell.stage.label()));
        row.push(Cell::new(cell.reached).set_alignment(CellAlignment::Right));
        if layout.conversion_column.is_some() {
            row.push(Cell::new(cell.conversion_label()).set_alignment(CellAlignment::Right));
        }
        table.add_row(row);
    }

    table
}

/// Render a funnel as a plain-text page with a title and generation time.
pub fn funnel_page(funnel: &FunnelTable, layout: &FunnelLayout, title: &str) -> String {
    let mut table = render_funnel_table(funnel, layout);
    table.force_no_tty();

    let mut page = String::new();
    page.push_str(title);
    page.push('\n');
    page.push_str(&"=".repeat(title.chars().count()));
    page.push('\n');
    page.push_str(&format!(
        "Generated {}\n\n",
        Local::now().format("%Y-%m-%d %H:%M")
    ));
    page.push_str(&table.to_string());
    page.push('\n');

    if funnel.skipped > 0 {
        page.push_str(&format!(
            "\n{} candidate(s) without a value for {} are not shown.\n",
            funnel.skipped,
            funnel.key_columns.join(" / ")
        ));
    }

    page
}

/// Write a funnel page to disk
pub fn write_funnel_page(
    funnel: &FunnelTable,
    layout: &FunnelLayout,
    title: &str,
    path: &Path,
) -> Result<()> {
    std::fs::write(path, funnel_page(funnel, layout, title))
        .with_context(|| format!("Failed to write funnel page to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Stage;

    fn sample_funnel() -> FunnelTable {
        FunnelTable::aggregate(
            vec!["Department".to_string(), "Highest Degree".to_string()],
            vec![
                (Some(vec!["Eng".to_string(), "PhD".to_string()]), Stage::OfferAccepted),
                (Some(vec!["Eng".to_string(), "PhD".to_string()]), Stage::PhoneScreen),
                (None, Stage::NewApplication),
            ],
        )
    }

    #[test]
    fn test_page_contains_title_stages_and_rates() {
        let page = funnel_page(&sample_funnel(), &FunnelLayout::detailed(), "Department Funnel");
        assert!(page.starts_with("Department Funnel\n"));
        assert!(page.contains("Conversion Rate (%)"));
        assert!(page.contains("In-House Interview"));
        assert!(page.contains("50%"));
        assert!(page.contains("1 candidate(s) without a value"));
    }

    #[test]
    fn test_group_key_printed_once() {
        let text = render_funnel_table(&sample_funnel(), &FunnelLayout::detailed())
            .force_no_tty()
            .to_string();
        assert_eq!(text.matches("Eng").count(), 1);
    }
}
