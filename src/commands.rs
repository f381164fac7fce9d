//! Tauri command surface.
//!
//! Thin wrappers over the record store and the pure parser/alert modules.
//! Errors cross IPC as strings.

use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tauri::State;

use crate::alerts::compute_company_alert;
use crate::csv_io::{self, ImportSummary};
use crate::db::RecordDb;
use crate::state::AppState;
use crate::task_parser::{self, CompanyRef};
use crate::types::{Activity, ActivityKind, AlertSegment, Company, ParsedTaskInput, Person};

/// Run `f` against the open database, mapping lock/availability failures to
/// IPC errors.
fn with_db<T>(state: &AppState, f: impl FnOnce(&RecordDb) -> Result<T, String>) -> Result<T, String> {
    let guard = state.db.lock().map_err(|_| "Lock poisoned".to_string())?;
    let db = guard
        .as_ref()
        .ok_or_else(|| "Records database unavailable".to_string())?;
    f(db)
}

fn db_err(e: crate::db::DbError) -> String {
    format!("DB error: {}", e)
}

fn company_refs(state: &AppState) -> Result<Vec<CompanyRef>, String> {
    with_db(state, |db| {
        Ok(db
            .list_companies()
            .map_err(db_err)?
            .into_iter()
            .map(|c| CompanyRef { id: c.id, name: c.name })
            .collect())
    })
}

// =============================================================================
// Companies
// =============================================================================

#[tauri::command]
pub fn list_companies(state: State<Arc<AppState>>) -> Result<Vec<Company>, String> {
    with_db(&state, |db| db.list_companies().map_err(db_err))
}

#[tauri::command]
pub fn create_company(
    name: String,
    domain: Option<String>,
    state: State<Arc<AppState>>,
) -> Result<Company, String> {
    if name.trim().is_empty() {
        return Err("Company name is required".to_string());
    }
    with_db(&state, |db| {
        db.create_company(&name, domain.as_deref()).map_err(db_err)
    })
}

#[tauri::command]
pub fn update_company(
    id: String,
    name: String,
    domain: Option<String>,
    state: State<Arc<AppState>>,
) -> Result<(), String> {
    with_db(&state, |db| {
        db.update_company(&id, &name, domain.as_deref()).map_err(db_err)
    })
}

#[tauri::command]
pub fn delete_company(id: String, state: State<Arc<AppState>>) -> Result<(), String> {
    with_db(&state, |db| db.delete_company(&id).map_err(db_err))
}

/// Stamp today's date as the company's last logged touchpoint.
#[tauri::command]
pub fn log_company_contact(id: String, state: State<Arc<AppState>>) -> Result<String, String> {
    let today = Local::now().date_naive().to_string();
    with_db(&state, |db| {
        db.touch_company_log(&id, &today).map_err(db_err)?;
        Ok(today.clone())
    })
}

// =============================================================================
// People
// =============================================================================

#[tauri::command]
pub fn list_people(state: State<Arc<AppState>>) -> Result<Vec<Person>, String> {
    with_db(&state, |db| db.list_people().map_err(db_err))
}

#[tauri::command]
pub fn create_person(
    name: String,
    email: Option<String>,
    title: Option<String>,
    company_id: Option<String>,
    state: State<Arc<AppState>>,
) -> Result<Person, String> {
    if name.trim().is_empty() {
        return Err("Person name is required".to_string());
    }
    with_db(&state, |db| {
        db.create_person(&name, email.as_deref(), title.as_deref(), company_id.as_deref())
            .map_err(db_err)
    })
}

#[tauri::command]
pub fn assign_person_company(
    id: String,
    company_id: Option<String>,
    state: State<Arc<AppState>>,
) -> Result<(), String> {
    with_db(&state, |db| {
        db.assign_person_company(&id, company_id.as_deref()).map_err(db_err)
    })
}

#[tauri::command]
pub fn delete_person(id: String, state: State<Arc<AppState>>) -> Result<(), String> {
    with_db(&state, |db| db.delete_person(&id).map_err(db_err))
}

// =============================================================================
// Activities
// =============================================================================

#[tauri::command]
pub fn list_activities(state: State<Arc<AppState>>) -> Result<Vec<Activity>, String> {
    with_db(&state, |db| db.list_activities().map_err(db_err))
}

#[tauri::command]
pub fn create_activity(
    kind: ActivityKind,
    title: String,
    due_date: Option<String>,
    has_time: bool,
    company_id: Option<String>,
    state: State<Arc<AppState>>,
) -> Result<Activity, String> {
    if title.trim().is_empty() {
        return Err("Activity title is required".to_string());
    }
    with_db(&state, |db| {
        db.create_activity(kind, &title, due_date.as_deref(), has_time, company_id.as_deref())
            .map_err(db_err)
    })
}

#[tauri::command]
pub fn set_activity_completed(
    id: String,
    completed: bool,
    state: State<Arc<AppState>>,
) -> Result<(), String> {
    with_db(&state, |db| {
        db.set_activity_completed(&id, completed).map_err(db_err)
    })
}

#[tauri::command]
pub fn reschedule_activity(
    id: String,
    due_date: Option<String>,
    has_time: bool,
    state: State<Arc<AppState>>,
) -> Result<(), String> {
    with_db(&state, |db| {
        db.reschedule_activity(&id, due_date.as_deref(), has_time).map_err(db_err)
    })
}

#[tauri::command]
pub fn link_activity_company(
    id: String,
    company_id: Option<String>,
    state: State<Arc<AppState>>,
) -> Result<(), String> {
    with_db(&state, |db| {
        db.link_activity_company(&id, company_id.as_deref()).map_err(db_err)
    })
}

#[tauri::command]
pub fn delete_activity(id: String, state: State<Arc<AppState>>) -> Result<(), String> {
    with_db(&state, |db| db.delete_activity(&id).map_err(db_err))
}

// =============================================================================
// Quick-add parsing
// =============================================================================

/// Parse a quick-add line for live preview. Called on every keystroke, so
/// a missing database degrades to parsing with no known companies instead
/// of erroring.
#[tauri::command]
pub fn preview_task_input(input: String, state: State<Arc<AppState>>) -> ParsedTaskInput {
    let companies = company_refs(&state).unwrap_or_default();
    task_parser::parse_task_input(&input, &companies)
}

/// Parse a quick-add line and persist the resulting task.
#[tauri::command]
pub fn create_task_from_input(
    input: String,
    state: State<Arc<AppState>>,
) -> Result<Activity, String> {
    let companies = company_refs(&state)?;
    let parsed = task_parser::parse_task_input(&input, &companies);

    // An input that is all date phrase ("tmr") still deserves a title.
    let title = if parsed.clean_title.is_empty() {
        input.trim().to_string()
    } else {
        parsed.clean_title.clone()
    };
    if title.is_empty() {
        return Err("Task title is required".to_string());
    }

    let due_date = parsed
        .due_date
        .map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string());
    with_db(&state, |db| {
        db.create_activity(
            ActivityKind::Task,
            &title,
            due_date.as_deref(),
            parsed.has_time,
            parsed.linked_company_id.as_deref(),
        )
        .map_err(db_err)
    })
}

/// Parse a manually typed date-picker entry. `None` when unrecognized.
#[tauri::command]
pub fn parse_date_input(input: String) -> Option<String> {
    task_parser::parse_date_string(&input).map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string())
}

// =============================================================================
// Alerts
// =============================================================================

/// Alert segments for one company's board card.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAlerts {
    pub company_id: String,
    pub segments: Vec<AlertSegment>,
}

#[tauri::command]
pub fn company_alerts(
    company_id: String,
    state: State<Arc<AppState>>,
) -> Result<Vec<AlertSegment>, String> {
    with_db(&state, |db| {
        let company = db
            .get_company(&company_id)
            .map_err(db_err)?
            .ok_or_else(|| format!("Company not found: {}", company_id))?;
        let activities = db.list_activities().map_err(db_err)?;
        Ok(compute_company_alert(&company, &activities))
    })
}

/// Alerts for every company in one pass, for list and board views.
#[tauri::command]
pub fn all_company_alerts(state: State<Arc<AppState>>) -> Result<Vec<CompanyAlerts>, String> {
    with_db(&state, |db| {
        let companies = db.list_companies().map_err(db_err)?;
        let activities = db.list_activities().map_err(db_err)?;
        Ok(companies
            .into_iter()
            .map(|company| CompanyAlerts {
                segments: compute_company_alert(&company, &activities),
                company_id: company.id,
            })
            .collect())
    })
}

// =============================================================================
// CSV
// =============================================================================

#[tauri::command]
pub fn export_companies_csv(path: String, state: State<Arc<AppState>>) -> Result<usize, String> {
    with_db(&state, |db| csv_io::export_companies(db, Path::new(&path)))
}

#[tauri::command]
pub fn import_companies_csv(
    path: String,
    state: State<Arc<AppState>>,
) -> Result<ImportSummary, String> {
    with_db(&state, |db| csv_io::import_companies(db, Path::new(&path)))
}
