use anyhow::{ Context, Result };
use chrono::{ DateTime, Utc };
use rusqlite::params;

use crate::database::connection::Database;
use crate::types::Source;

/// Starter sources seeded by the init tool
const DEFAULT_SOURCES: &[(&str, i64, &str)] = &[
    ("John Mensah", 7, "Ghana gold dore contact"),
    ("Maria Santos", 8, "Brazilian iron ore broker"),
    ("Ahmed Al-Rashid", 6, "Gulf petroleum products trader"),
    ("Direct LME Desk", 9, "Exchange-listed counterparty"),
];

impl Database {
    /// All known sources, alphabetical
    pub fn list_sources(&self) -> Result<Vec<Source>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, name, reliability_rating, notes, created_at FROM sources ORDER BY name"
        )?;

        let sources = stmt
            .query_map([], |row| {
                Ok(Source {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    reliability_rating: row.get(2)?,
                    notes: row.get(3)?,
                    created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(4)?)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to list sources")?;

        Ok(sources)
    }

    /// Insert a source or update its rating and notes when the name exists
    pub fn upsert_source(
        &self,
        name: &str,
        reliability_rating: Option<i64>,
        notes: Option<&str>
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO sources (name, reliability_rating, notes, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                 reliability_rating = excluded.reliability_rating,
                 notes = excluded.notes",
            params![name, reliability_rating, notes, Utc::now().to_rfc3339()]
        ).context("Failed to upsert source")?;

        let id: i64 = conn.query_row(
            "SELECT id FROM sources WHERE name = ?1",
            params![name],
            |row| row.get(0)
        )?;

        Ok(id)
    }

    /// Seed the starter source list. Existing names are left untouched.
    /// Returns the number of rows inserted.
    pub fn seed_default_sources(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let mut inserted = 0;

        for (name, rating, notes) in DEFAULT_SOURCES {
            inserted += conn.execute(
                "INSERT OR IGNORE INTO sources (name, reliability_rating, notes, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, rating, notes, Utc::now().to_rfc3339()]
            ).context("Failed to seed sources")?;
        }

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn test_upsert_inserts_then_updates() {
        let (_dir, db) = test_db();

        let id = db.upsert_source("Kofi Trading", Some(5), Some("new contact")).unwrap();
        let again = db.upsert_source("Kofi Trading", Some(8), None).unwrap();
        assert_eq!(id, again);

        let sources = db.list_sources().unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].reliability_rating, Some(8));
        assert_eq!(sources[0].notes, None);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let (_dir, db) = test_db();

        let first = db.seed_default_sources().unwrap();
        assert_eq!(first, DEFAULT_SOURCES.len());

        let second = db.seed_default_sources().unwrap();
        assert_eq!(second, 0);

        assert_eq!(db.list_sources().unwrap().len(), DEFAULT_SOURCES.len());
    }

    #[test]
    fn test_list_sources_is_alphabetical() {
        let (_dir, db) = test_db();
        db.upsert_source("Zeta Metals", Some(4), None).unwrap();
        db.upsert_source("Alpha Ores", Some(6), None).unwrap();

        let sources = db.list_sources().unwrap();
        assert_eq!(sources[0].name, "Alpha Ores");
        assert_eq!(sources[1].name, "Zeta Metals");
    }
}
