use anyhow::{ Context, Result };
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed storage for deals and sources
///
/// The connection is wrapped in a mutex so the database handle can be
/// shared across async tasks. Operations are short-lived and never hold
/// the lock across an await point.
pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database at the given path and run migrations
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("Failed to open deals database")?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.create_tables()?;

        Ok(db)
    }

    /// Open the database at the standard location
    pub fn open_default() -> Result<Self> {
        Self::new(crate::paths::get_deals_db_path())
    }

    fn create_tables(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS deals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                commodity_type TEXT NOT NULL,
                source_name TEXT NOT NULL,
                source_reliability INTEGER,
                deal_text TEXT NOT NULL,
                price REAL,
                price_currency TEXT NOT NULL DEFAULT 'USD',
                quantity REAL,
                quantity_unit TEXT,
                origin_country TEXT,
                payment_method TEXT,
                shipping_terms TEXT,
                additional_notes TEXT,
                date_received TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'unassigned',
                price_type TEXT NOT NULL DEFAULT 'fixed_price',
                gross_discount REAL,
                commission REAL,
                net_discount REAL,
                ai_score INTEGER,
                ai_reasoning TEXT,
                ai_analysis TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            []
        ).context("Failed to create deals table")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sources (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                reliability_rating INTEGER,
                notes TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            []
        ).context("Failed to create sources table")?;

        // LME pricing columns arrived after the first release. ALTER fails
        // harmlessly when the column already exists.
        let _ = conn.execute(
            "ALTER TABLE deals ADD COLUMN price_type TEXT NOT NULL DEFAULT 'fixed_price'",
            []
        );
        let _ = conn.execute("ALTER TABLE deals ADD COLUMN gross_discount REAL", []);
        let _ = conn.execute("ALTER TABLE deals ADD COLUMN commission REAL", []);
        let _ = conn.execute("ALTER TABLE deals ADD COLUMN net_discount REAL", []);

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_deals_status ON deals(status)",
            []
        ).context("Failed to create status index")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_deals_commodity ON deals(commodity_type)",
            []
        ).context("Failed to create commodity index")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_deals_date_received ON deals(date_received)",
            []
        ).context("Failed to create date index")?;

        Ok(())
    }

    /// Names of all user tables, for the init tool's verification step
    pub fn table_names(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name"
        )?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(names)
    }

    /// Row count for a table. The name must come from table_names().
    pub fn table_row_count(&self, table: &str) -> Result<u64> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .with_context(|| format!("Failed to count rows in {}", table))?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_tables_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();

        let tables = db.table_names().unwrap();
        assert!(tables.contains(&"deals".to_string()));
        assert!(tables.contains(&"sources".to_string()));
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        drop(Database::new(&path).unwrap());
        let db = Database::new(&path).unwrap();
        assert_eq!(db.table_row_count("deals").unwrap(), 0);
    }
}
