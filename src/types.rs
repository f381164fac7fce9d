//! Domain and IPC types.
//!
//! Everything that crosses the IPC boundary serializes camelCase. Dates
//! travel as ISO strings and are normalized exactly once, at the boundary,
//! via `parse_when` — nothing downstream re-checks string formats.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// =============================================================================
// Records
// =============================================================================

/// A company record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// ISO date of the last logged touchpoint. `None` means never logged.
    #[serde(default)]
    pub last_logged_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A person record, optionally linked to a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// What flavor of activity a row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Task,
    Call,
    Meeting,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Task => "task",
            ActivityKind::Call => "call",
            ActivityKind::Meeting => "meeting",
        }
    }
}

impl std::str::FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(ActivityKind::Task),
            "call" => Ok(ActivityKind::Call),
            "meeting" => Ok(ActivityKind::Meeting),
            other => Err(format!("Unknown activity kind: {}", other)),
        }
    }
}

/// A task, call, or meeting, optionally linked to a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub kind: ActivityKind,
    pub title: String,
    /// ISO date or datetime string; absent means unscheduled.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Whether `due_date` carries a meaningful clock time.
    #[serde(default)]
    pub has_time: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub company_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Activity {
    /// Normalized due date. Malformed strings read as absent.
    pub fn due(&self) -> Option<NaiveDateTime> {
        self.due_date.as_deref().and_then(parse_when)
    }
}

// =============================================================================
// Parser output
// =============================================================================

/// What a highlight range marks in the raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightKind {
    Date,
    Mention,
}

/// A byte span of the original input string, valid as slice bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRange {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: HighlightKind,
}

/// Result of parsing a quick-add task input line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTaskInput {
    /// Original input with date phrase and mention removed, whitespace collapsed.
    pub clean_title: String,
    pub due_date: Option<NaiveDateTime>,
    pub linked_company_id: Option<String>,
    /// True when the recognized date phrase carried an explicit clock time.
    pub has_time: bool,
    /// Non-overlapping, sorted by start offset.
    pub highlight_ranges: Vec<HighlightRange>,
}

// =============================================================================
// Alert output
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Danger,
    Warning,
    Info,
    Success,
    Neutral,
}

/// One atomic piece of a company's follow-up alert display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSegment {
    pub icon: String,
    pub severity: Severity,
    pub text: String,
}

// =============================================================================
// Date normalization
// =============================================================================

/// Parse a stored or user-supplied ISO date/datetime string leniently.
///
/// Accepts RFC 3339 (offset preserved as written wall time), `T`- or
/// space-separated datetimes with or without seconds, and bare dates
/// (resolved to midnight). Anything else — including out-of-range
/// components — reads as `None` rather than an error.
pub fn parse_when(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
