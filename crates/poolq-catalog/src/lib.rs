//! Cost component catalog for the pool quoting core.
//!
//! Reference data is loaded once per session from CSV or JSON files and
//! held read-only for the lifetime of the process. The catalog also
//! resolves human-readable slugs to canonical ids and derives cached
//! composite category rates for area-priced materials.

mod catalog;
mod loader;
mod rates;

pub use catalog::CostComponentCatalog;
pub use loader::{
    CatalogError, CatalogSource, CsvCatalogFile, JsonCatalogFile, Result, load_catalog_file,
};
pub use rates::{CategoryRate, RateCache, priced_area};
