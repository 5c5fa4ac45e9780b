//! Catalog ingestion from CSV and JSON reference files.
//!
//! The store-facing contract is `catalog.load(kind)`: each call returns
//! the components of one category, fetched once per kind per session.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use poolq_model::{Category, ComponentId, CostComponent, UnitKind};

/// Catalog loading error.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to {operation} catalog file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog parse error at record {record}: {reason}")]
    Parse { record: usize, reason: String },

    #[error("unknown category '{value}' at record {record}")]
    UnknownCategory { record: usize, value: String },

    #[error("duplicate component id '{id}'")]
    DuplicateId { id: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// A source of catalog reference data.
///
/// `load` is called once per category per session; implementations may
/// read the whole backing file each call.
pub trait CatalogSource {
    fn load(&self, category: Category) -> Result<Vec<CostComponent>>;
}

/// Raw CSV row before enum parsing.
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    slug: String,
    category: String,
    base_cost: f64,
    margin: f64,
    unit_kind: String,
}

/// CSV-backed catalog file with columns
/// `id,slug,category,base_cost,margin,unit_kind`.
#[derive(Debug, Clone)]
pub struct CsvCatalogFile {
    path: PathBuf,
}

impl CsvCatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load every component in the file, regardless of category.
    pub fn load_all(&self) -> Result<Vec<CostComponent>> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| match e.kind() {
            csv::ErrorKind::Io(_) => CatalogError::Io {
                operation: "open",
                path: self.path.clone(),
                source: std::io::Error::other(e.to_string()),
            },
            _ => CatalogError::Parse {
                record: 0,
                reason: e.to_string(),
            },
        })?;

        let mut components = Vec::new();
        let mut seen = HashSet::new();
        for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
            let record = index + 1;
            let row = row.map_err(|e| CatalogError::Parse {
                record,
                reason: e.to_string(),
            })?;
            let component = convert_row(record, row)?;
            if !seen.insert(component.id.clone()) {
                return Err(CatalogError::DuplicateId {
                    id: component.id.to_string(),
                });
            }
            components.push(component);
        }
        tracing::debug!(
            path = %self.path.display(),
            count = components.len(),
            "catalog CSV loaded"
        );
        Ok(components)
    }
}

impl CatalogSource for CsvCatalogFile {
    fn load(&self, category: Category) -> Result<Vec<CostComponent>> {
        let mut components = self.load_all()?;
        components.retain(|c| c.category == category);
        Ok(components)
    }
}

fn convert_row(record: usize, row: CsvRow) -> Result<CostComponent> {
    let category = Category::from_str(&row.category).map_err(|_| {
        CatalogError::UnknownCategory {
            record,
            value: row.category.clone(),
        }
    })?;
    let unit_kind = UnitKind::from_str(&row.unit_kind).map_err(|reason| CatalogError::Parse {
        record,
        reason,
    })?;
    Ok(CostComponent {
        id: ComponentId::new(row.id),
        slug: row.slug,
        category,
        base_cost: row.base_cost,
        margin: row.margin,
        unit_kind,
    })
}

/// JSON-backed catalog file: a top-level array of components.
#[derive(Debug, Clone)]
pub struct JsonCatalogFile {
    path: PathBuf,
}

impl JsonCatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load every component in the file, regardless of category.
    pub fn load_all(&self) -> Result<Vec<CostComponent>> {
        let bytes = std::fs::read(&self.path).map_err(|e| CatalogError::Io {
            operation: "read",
            path: self.path.clone(),
            source: e,
        })?;
        let components: Vec<CostComponent> =
            serde_json::from_slice(&bytes).map_err(|e| CatalogError::Parse {
                record: e.line(),
                reason: e.to_string(),
            })?;

        let mut seen = HashSet::new();
        for component in &components {
            if !seen.insert(component.id.clone()) {
                return Err(CatalogError::DuplicateId {
                    id: component.id.to_string(),
                });
            }
        }
        tracing::debug!(
            path = %self.path.display(),
            count = components.len(),
            "catalog JSON loaded"
        );
        Ok(components)
    }
}

impl CatalogSource for JsonCatalogFile {
    fn load(&self, category: Category) -> Result<Vec<CostComponent>> {
        let mut components = self.load_all()?;
        components.retain(|c| c.category == category);
        Ok(components)
    }
}

/// Load a catalog file, dispatching on extension (`.csv` vs `.json`).
pub fn load_catalog_file(path: &Path) -> Result<Vec<CostComponent>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => JsonCatalogFile::new(path).load_all(),
        _ => CsvCatalogFile::new(path).load_all(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const CSV: &str = "\
id,slug,category,base_cost,margin,unit_kind
pav-001,travertine-silver,paving,85,20,perSquareMeter
cop-001,travertine-coping,paving,40,12,perMeter
crn-001,franna-20t,crane,700,140,perItem
";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_load_filters_by_category() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "catalog.csv", CSV);

        let source = CsvCatalogFile::new(&path);
        let paving = source.load(Category::Paving).unwrap();
        assert_eq!(paving.len(), 2);
        let crane = source.load(Category::Crane).unwrap();
        assert_eq!(crane.len(), 1);
        assert_eq!(crane[0].base_cost, 700.0);
    }

    #[test]
    fn csv_unknown_category_rejected() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "bad.csv",
            "id,slug,category,base_cost,margin,unit_kind\nx,y,landscaping,1,1,perItem\n",
        );

        let error = CsvCatalogFile::new(&path).load_all().unwrap_err();
        assert!(matches!(error, CatalogError::UnknownCategory { record: 1, .. }));
    }

    #[test]
    fn csv_duplicate_id_rejected() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "dup.csv",
            "id,slug,category,base_cost,margin,unit_kind\n\
             a,one,crane,1,1,perItem\na,two,crane,1,1,perItem\n",
        );

        let error = CsvCatalogFile::new(&path).load_all().unwrap_err();
        assert!(matches!(error, CatalogError::DuplicateId { .. }));
    }

    #[test]
    fn json_load_round_trip() {
        let dir = tempdir().unwrap();
        let json = r#"[
            {
                "id": "flt-001",
                "slug": "viron-p320",
                "category": "filtrationPackage",
                "baseCost": 1850.0,
                "margin": 450.0,
                "unitKind": "perItem"
            }
        ]"#;
        let path = write_file(&dir, "catalog.json", json);

        let components = JsonCatalogFile::new(&path).load_all().unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].category, Category::FiltrationPackage);
    }

    #[test]
    fn missing_file_is_io_error() {
        let error = CsvCatalogFile::new("/nonexistent/catalog.csv")
            .load_all()
            .unwrap_err();
        assert!(matches!(error, CatalogError::Io { .. }));
    }
}
