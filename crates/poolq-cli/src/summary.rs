//! Quote breakdown rendering.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::QuoteResult;

pub fn print_quote(result: &QuoteResult) {
    if let Some(project_id) = &result.project_id {
        println!("Project: {project_id}");
    }
    println!("Selections: {}", result.selection_count);
    println!("{}", breakdown_table(result));
    println!("Margin: {:.2}%", result.snapshot.margin_pct);
    println!(
        "Recommended retail: {:.2}",
        result.snapshot.recommended_retail_price
    );
}

/// Per-category cost/margin/price table with a TOTAL row.
pub fn breakdown_table(result: &QuoteResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Cost"),
        header_cell("Margin"),
        header_cell("Price"),
    ]);
    apply_breakdown_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);

    for (category, subtotal) in &result.snapshot.by_category {
        table.add_row(vec![
            Cell::new(category.as_str()).fg(Color::Blue),
            money_cell(subtotal.cost),
            money_cell(subtotal.margin),
            money_cell(subtotal.price),
        ]);
    }
    let snapshot = &result.snapshot;
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        money_cell(snapshot.total_cost).add_attribute(Attribute::Bold),
        money_cell(snapshot.total_margin).add_attribute(Attribute::Bold),
        money_cell(snapshot.total_cost + snapshot.total_margin).add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_breakdown_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn money_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.2}"))
}
