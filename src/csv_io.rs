//! Company CSV import/export.
//!
//! Operates on explicit caller-chosen paths (the frontend picks them via
//! the dialog plugin). Import is additive: rows whose name matches an
//! existing company are skipped, never merged.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::db::RecordDb;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRow<'a> {
    name: &'a str,
    domain: Option<&'a str>,
    last_logged_at: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportRow {
    name: String,
    #[serde(default)]
    domain: Option<String>,
}

/// Outcome of a CSV import.
#[derive(Debug, Default, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Write all companies to `path` as `name,domain,lastLoggedAt`.
pub fn export_companies(db: &RecordDb, path: &Path) -> Result<usize, String> {
    let companies = db.list_companies().map_err(|e| format!("DB error: {}", e))?;

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    for company in &companies {
        writer
            .serialize(ExportRow {
                name: &company.name,
                domain: company.domain.as_deref(),
                last_logged_at: company.last_logged_at.as_deref(),
            })
            .map_err(|e| format!("CSV write error: {}", e))?;
    }
    writer.flush().map_err(|e| format!("CSV flush error: {}", e))?;

    Ok(companies.len())
}

/// Import companies from a CSV with a `name` column (optional `domain`).
///
/// Unreadable rows, blank names, and names already present
/// (case-insensitive) count as skipped.
pub fn import_companies(db: &RecordDb, path: &Path) -> Result<ImportSummary, String> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;

    let mut existing: HashSet<String> = db
        .list_companies()
        .map_err(|e| format!("DB error: {}", e))?
        .into_iter()
        .map(|c| c.name.to_lowercase())
        .collect();

    let mut summary = ImportSummary::default();
    for row in reader.deserialize::<ImportRow>() {
        let row = match row {
            Ok(r) => r,
            Err(_) => {
                summary.skipped += 1;
                continue;
            }
        };
        let name = row.name.trim();
        if name.is_empty() || existing.contains(&name.to_lowercase()) {
            summary.skipped += 1;
            continue;
        }
        db.create_company(name, row.domain.as_deref())
            .map_err(|e| format!("DB error: {}", e))?;
        existing.insert(name.to_lowercase());
        summary.imported += 1;
    }

    Ok(summary)
}
