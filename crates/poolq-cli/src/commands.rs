//! Subcommand implementations.

use std::fs;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span};

use poolq_catalog::{CostComponentCatalog, load_catalog_file};
use poolq_model::{Category, UnitKind};
use poolq_persistence::DebounceConfig;
use poolq_session::QuoteSession;

use crate::cli::QuoteArgs;
use crate::summary::apply_table_style;
use crate::types::{QuoteFile, QuoteResult};

/// Price one project file against a catalog.
pub fn run_quote(args: &QuoteArgs) -> Result<QuoteResult> {
    let components = load_catalog_file(&args.catalog)
        .with_context(|| format!("load catalog {}", args.catalog.display()))?;
    let mut catalog = CostComponentCatalog::new();
    catalog.extend(components);

    let raw = fs::read_to_string(&args.project_file)
        .with_context(|| format!("read project file {}", args.project_file.display()))?;
    let quote: QuoteFile = serde_json::from_str(&raw)
        .with_context(|| format!("parse project file {}", args.project_file.display()))?;

    let span = info_span!(
        "quote",
        project = quote.project_id.as_deref().unwrap_or("unsaved")
    );
    let _guard = span.enter();

    let mut session = QuoteSession::new(Arc::new(catalog), DebounceConfig::default());
    if let Some(project_id) = &quote.project_id {
        session.set_project_id(project_id.clone());
    }

    let now = Instant::now();
    let selection_count = quote.selections.len();
    for selection in quote.selections {
        let component = selection.component_id.clone();
        session
            .on_selection_changed(selection, now)
            .with_context(|| format!("apply selection {component}"))?;
    }
    session.on_margin_pct_changed(quote.margin_pct, now);

    let snapshot = session.snapshot().clone();
    info!(
        selections = selection_count,
        total_cost = snapshot.total_cost,
        rrp = snapshot.recommended_retail_price,
        "quote aggregated"
    );
    Ok(QuoteResult {
        project_id: quote.project_id,
        selection_count,
        snapshot,
    })
}

/// Print the closed category and unit listings.
pub fn run_categories() {
    println!("{}", categories_table());
    println!();
    println!("{}", units_table());
}

/// One row per category: where its selections are persisted.
pub fn categories_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Resource kind", "Table"]);
    apply_table_style(&mut table);
    for category in Category::ALL {
        let kind = category.resource_kind();
        let spec = kind.table();
        table.add_row(vec![category.as_str(), kind.as_str(), spec.table]);
    }
    table
}

/// The supported quantity units.
pub fn units_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Unit", "Meaning"]);
    apply_table_style(&mut table);
    for (unit, meaning) in [
        (UnitKind::PerItem, "priced per item"),
        (UnitKind::PerMeter, "priced per linear meter"),
        (UnitKind::PerSquareMeter, "priced per square meter"),
    ] {
        table.add_row(vec![unit.as_str(), meaning]);
    }
    table
}
