#![allow(clippy::missing_errors_doc)]

use std::path::{Path, PathBuf};

use complaint_desk_core::{
    format_rfc3339, generate_complaint_id, now_utc, parse_rfc3339_utc, Complaint, ComplaintError,
    NewComplaint, DEFAULT_STATUS,
};
use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA_COMPLAINTS_V1: &str = r"
CREATE TABLE IF NOT EXISTS complaints (
  complaint_id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  phone_number TEXT NOT NULL,
  email TEXT NOT NULL,
  complaint_details TEXT NOT NULL,
  created_at TEXT NOT NULL,
  status TEXT NOT NULL DEFAULT 'pending'
);
";

/// Fixed sample records seeded into an empty table so a fresh deployment can
/// be verified by hand. Seeding happens at most once, keyed on emptiness.
const SAMPLE_COMPLAINTS: &[(&str, &str, &str, &str, &str, &str, &str)] = &[
    (
        "CMP001",
        "John Doe",
        "1234567890",
        "john@example.com",
        "Delayed delivery of order #12345",
        "2025-06-25T10:30:00Z",
        "pending",
    ),
    (
        "CMP002",
        "Jane Smith",
        "9876543210",
        "jane@example.com",
        "Received wrong item in my order",
        "2025-06-26T14:20:00Z",
        "resolved",
    ),
    (
        "CMP003",
        "Mike Johnson",
        "5555555555",
        "mike@example.com",
        "Food quality was poor",
        "2025-06-27T09:15:00Z",
        "pending",
    ),
];

/// Handle to the complaints database. Holds only the path; every operation
/// opens its own connection and releases it on return, error paths included.
#[derive(Debug, Clone)]
pub struct ComplaintStore {
    db_path: PathBuf,
}

impl ComplaintStore {
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    fn open_connection(&self) -> Result<Connection, ComplaintError> {
        let conn = Connection::open(&self.db_path).map_err(|err| {
            ComplaintError::Storage(format!(
                "failed to open sqlite database at {}: {err}",
                self.db_path.display()
            ))
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|err| storage("failed to configure sqlite pragmas", &err))?;

        Ok(conn)
    }

    /// Ensures the schema exists and, when the table is empty, seeds the
    /// three fixed sample records inside one transaction. Safe to re-run;
    /// a non-empty table is never re-seeded.
    pub fn initialize(&self) -> Result<(), ComplaintError> {
        let mut conn = self.open_connection()?;

        conn.execute_batch(SCHEMA_COMPLAINTS_V1)
            .map_err(|err| storage("failed to apply complaints schema", &err))?;

        let existing: i64 = conn
            .query_row("SELECT COUNT(*) FROM complaints", [], |row| row.get(0))
            .map_err(|err| storage("failed to count complaints", &err))?;
        if existing > 0 {
            return Ok(());
        }

        let tx = conn
            .transaction()
            .map_err(|err| storage("failed to start seed transaction", &err))?;
        for (complaint_id, name, phone_number, email, complaint_details, created_at, status) in
            SAMPLE_COMPLAINTS
        {
            tx.execute(
                "INSERT INTO complaints (complaint_id, name, phone_number, email, complaint_details, created_at, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![complaint_id, name, phone_number, email, complaint_details, created_at, status],
            )
            .map_err(|err| storage("failed to seed sample complaint", &err))?;
        }
        tx.commit()
            .map_err(|err| storage("failed to commit seed transaction", &err))?;

        Ok(())
    }

    /// Validates the input, generates a fresh identifier, and inserts one row
    /// with `created_at` set to now and status defaulted. Validation failures
    /// never touch the database; an identifier collision surfaces as the
    /// primary-key violation mapped to [`ComplaintError::Storage`].
    pub fn create(&self, input: &NewComplaint) -> Result<String, ComplaintError> {
        input.validate()?;

        let complaint_id = generate_complaint_id();
        let created_at = format_rfc3339(now_utc())
            .map_err(|err| ComplaintError::Storage(format!("failed to format created_at: {err}")))?;

        let conn = self.open_connection()?;
        conn.execute(
            "INSERT INTO complaints (complaint_id, name, phone_number, email, complaint_details, created_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                complaint_id,
                input.name,
                input.phone_number,
                input.email,
                input.complaint_details,
                created_at,
                DEFAULT_STATUS,
            ],
        )
        .map_err(|err| storage("failed to insert complaint", &err))?;

        Ok(complaint_id)
    }

    /// Exact primary-key lookup. The projection excludes `status`.
    pub fn get(&self, complaint_id: &str) -> Result<Complaint, ComplaintError> {
        let conn = self.open_connection()?;

        let row = conn
            .query_row(
                "SELECT complaint_id, name, phone_number, email, complaint_details, created_at
                 FROM complaints WHERE complaint_id = ?1",
                params![complaint_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()
            .map_err(|err| storage("failed to query complaint", &err))?;

        let Some((complaint_id, name, phone_number, email, complaint_details, created_at_raw)) =
            row
        else {
            return Err(ComplaintError::NotFound(complaint_id.to_string()));
        };

        let created_at = parse_rfc3339_utc(&created_at_raw).map_err(|err| {
            ComplaintError::Storage(format!("corrupt created_at for {complaint_id}: {err}"))
        })?;

        Ok(Complaint {
            complaint_id,
            name,
            phone_number,
            email,
            complaint_details,
            created_at,
        })
    }

    /// Overwrites `status` for the matching row. The vocabulary is open:
    /// any string is accepted. Zero affected rows is reported as
    /// [`ComplaintError::NotFound`] rather than silent success.
    pub fn update_status(&self, complaint_id: &str, status: &str) -> Result<(), ComplaintError> {
        let conn = self.open_connection()?;

        let updated = conn
            .execute(
                "UPDATE complaints SET status = ?1 WHERE complaint_id = ?2",
                params![status, complaint_id],
            )
            .map_err(|err| storage("failed to update complaint status", &err))?;

        if updated == 0 {
            return Err(ComplaintError::NotFound(complaint_id.to_string()));
        }

        Ok(())
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn storage(context: &str, err: &rusqlite::Error) -> ComplaintError {
    ComplaintError::Storage(format!("{context}: {err}"))
}
