//! SQLite-backed record store for companies, people, and activities.
//!
//! The database lives at `~/.rolodex/records.db`. The desktop frontend is
//! the only writer; WAL mode keeps reads cheap while a write is in flight.

use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use uuid::Uuid;

use crate::types::{Activity, ActivityKind, Company, Person};

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Record not found: {0}")]
    NotFound(String),
}

/// SQLite connection wrapper for record state.
///
/// Intentionally not `Clone` or `Sync`; it is held behind a
/// `std::sync::Mutex` in `AppState` so sync commands can access it safely.
pub struct RecordDb {
    conn: Connection,
}

impl RecordDb {
    /// Open (or create) the database at `~/.rolodex/records.db` and apply
    /// the schema.
    pub fn open() -> Result<Self, DbError> {
        let path = Self::db_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path. Useful for testing.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(include_str!("schema.sql"))?;

        Ok(Self { conn })
    }

    fn db_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".rolodex").join("records.db"))
    }

    fn now() -> String {
        Utc::now().to_rfc3339()
    }

    // =========================================================================
    // Companies
    // =========================================================================

    pub fn create_company(&self, name: &str, domain: Option<&str>) -> Result<Company, DbError> {
        let now = Self::now();
        let company = Company {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            domain: domain.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            last_logged_at: None,
            created_at: now.clone(),
            updated_at: now,
        };
        self.conn.execute(
            "INSERT INTO companies (id, name, domain, last_logged_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                company.id,
                company.name,
                company.domain,
                company.last_logged_at,
                company.created_at,
                company.updated_at
            ],
        )?;
        Ok(company)
    }

    pub fn list_companies(&self) -> Result<Vec<Company>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, domain, last_logged_at, created_at, updated_at
             FROM companies ORDER BY name COLLATE NOCASE",
        )?;
        let rows = stmt.query_map([], Self::company_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_company(&self, id: &str) -> Result<Option<Company>, DbError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, domain, last_logged_at, created_at, updated_at
                 FROM companies WHERE id = ?1",
                params![id],
                Self::company_from_row,
            )
            .optional()?)
    }

    pub fn update_company(
        &self,
        id: &str,
        name: &str,
        domain: Option<&str>,
    ) -> Result<(), DbError> {
        let n = self.conn.execute(
            "UPDATE companies SET name = ?2, domain = ?3, updated_at = ?4 WHERE id = ?1",
            params![id, name.trim(), domain, Self::now()],
        )?;
        if n == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Stamp the company's last logged touchpoint.
    pub fn touch_company_log(&self, id: &str, logged_at: &str) -> Result<(), DbError> {
        let n = self.conn.execute(
            "UPDATE companies SET last_logged_at = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, logged_at, Self::now()],
        )?;
        if n == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Delete a company. Linked people and activities are unlinked, not
    /// deleted.
    pub fn delete_company(&self, id: &str) -> Result<(), DbError> {
        let now = Self::now();
        self.conn.execute(
            "UPDATE people SET company_id = NULL, updated_at = ?2 WHERE company_id = ?1",
            params![id, now],
        )?;
        self.conn.execute(
            "UPDATE activities SET company_id = NULL, updated_at = ?2 WHERE company_id = ?1",
            params![id, now],
        )?;
        let n = self
            .conn
            .execute("DELETE FROM companies WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn company_from_row(row: &rusqlite::Row) -> rusqlite::Result<Company> {
        Ok(Company {
            id: row.get(0)?,
            name: row.get(1)?,
            domain: row.get(2)?,
            last_logged_at: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    // =========================================================================
    // People
    // =========================================================================

    pub fn create_person(
        &self,
        name: &str,
        email: Option<&str>,
        title: Option<&str>,
        company_id: Option<&str>,
    ) -> Result<Person, DbError> {
        let now = Self::now();
        let person = Person {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: email.map(String::from),
            title: title.map(String::from),
            company_id: company_id.map(String::from),
            created_at: now.clone(),
            updated_at: now,
        };
        self.conn.execute(
            "INSERT INTO people (id, name, email, title, company_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                person.id,
                person.name,
                person.email,
                person.title,
                person.company_id,
                person.created_at,
                person.updated_at
            ],
        )?;
        Ok(person)
    }

    pub fn list_people(&self) -> Result<Vec<Person>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, title, company_id, created_at, updated_at
             FROM people ORDER BY name COLLATE NOCASE",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Person {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                title: row.get(3)?,
                company_id: row.get(4)?,
                created_at: row.get(5)?,
                updated_at: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn assign_person_company(
        &self,
        id: &str,
        company_id: Option<&str>,
    ) -> Result<(), DbError> {
        let n = self.conn.execute(
            "UPDATE people SET company_id = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, company_id, Self::now()],
        )?;
        if n == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn delete_person(&self, id: &str) -> Result<(), DbError> {
        let n = self
            .conn
            .execute("DELETE FROM people WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Activities
    // =========================================================================

    pub fn create_activity(
        &self,
        kind: ActivityKind,
        title: &str,
        due_date: Option<&str>,
        has_time: bool,
        company_id: Option<&str>,
    ) -> Result<Activity, DbError> {
        let now = Self::now();
        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            kind,
            title: title.trim().to_string(),
            due_date: due_date.map(String::from),
            has_time,
            is_completed: false,
            company_id: company_id.map(String::from),
            created_at: now.clone(),
            updated_at: now,
        };
        self.conn.execute(
            "INSERT INTO activities
               (id, kind, title, due_date, has_time, is_completed, company_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                activity.id,
                activity.kind.as_str(),
                activity.title,
                activity.due_date,
                activity.has_time,
                activity.is_completed,
                activity.company_id,
                activity.created_at,
                activity.updated_at
            ],
        )?;
        Ok(activity)
    }

    /// All activities, unscheduled last, then by due date.
    pub fn list_activities(&self) -> Result<Vec<Activity>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, title, due_date, has_time, is_completed, company_id,
                    created_at, updated_at
             FROM activities
             ORDER BY due_date IS NULL, due_date, created_at",
        )?;
        let rows = stmt.query_map([], Self::activity_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn set_activity_completed(&self, id: &str, completed: bool) -> Result<(), DbError> {
        let n = self.conn.execute(
            "UPDATE activities SET is_completed = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, completed, Self::now()],
        )?;
        if n == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn reschedule_activity(
        &self,
        id: &str,
        due_date: Option<&str>,
        has_time: bool,
    ) -> Result<(), DbError> {
        let n = self.conn.execute(
            "UPDATE activities SET due_date = ?2, has_time = ?3, updated_at = ?4 WHERE id = ?1",
            params![id, due_date, has_time, Self::now()],
        )?;
        if n == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn link_activity_company(
        &self,
        id: &str,
        company_id: Option<&str>,
    ) -> Result<(), DbError> {
        let n = self.conn.execute(
            "UPDATE activities SET company_id = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, company_id, Self::now()],
        )?;
        if n == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn delete_activity(&self, id: &str) -> Result<(), DbError> {
        let n = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn activity_from_row(row: &rusqlite::Row) -> rusqlite::Result<Activity> {
        let kind: String = row.get(1)?;
        let kind = kind.parse::<ActivityKind>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
        })?;
        Ok(Activity {
            id: row.get(0)?,
            kind,
            title: row.get(2)?,
            due_date: row.get(3)?,
            has_time: row.get(4)?,
            is_completed: row.get(5)?,
            company_id: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}
