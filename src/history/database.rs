use super::{HistoryError, HistoryRow, HistoryStore};
use crate::config;
use crate::time::ChromeTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use url::Url;

const URL_ROW_FIELDS: &str = "id, url, title, visit_count, typed_count, last_visit_time, hidden";

/// SQLite-based history storage
pub struct HistoryDatabase {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for HistoryDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryDatabase").finish_non_exhaustive()
    }
}

fn row_from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRow> {
    Ok(HistoryRow {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        visit_count: row.get(3)?,
        typed_count: row.get(4)?,
        last_visit_time: ChromeTime(row.get(5)?),
        hidden: row.get(6)?,
    })
}

impl HistoryDatabase {
    /// Create or open a history database in the given data directory
    pub fn new(data_dir: &Path) -> Result<Self, HistoryError> {
        let db_path = data_dir.join(config::HISTORY_DB);
        let conn = Connection::open(&db_path)?;
        let db = Self::with_connection(conn)?;
        log::info!("History database opened at {:?}", db_path);
        Ok(db)
    }

    /// Open a throwaway database that lives in memory
    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, HistoryError> {
        // Create tables if they don't exist
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS urls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL UNIQUE,
                title TEXT,
                visit_count INTEGER NOT NULL DEFAULT 0,
                typed_count INTEGER NOT NULL DEFAULT 0,
                last_visit_time INTEGER NOT NULL,
                hidden INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_urls_url ON urls(url);
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, HistoryError> {
        self.conn.lock().map_err(|_| HistoryError::Poisoned)
    }

    /// Record a page visit now
    pub fn record_visit(&self, url: &Url, title: Option<&str>, typed: bool) -> Result<(), HistoryError> {
        self.record_visit_at(url.as_str(), title, typed, ChromeTime::now())
    }

    /// Record a page visit at an explicit time
    pub fn record_visit_at(
        &self,
        url: &str,
        title: Option<&str>,
        typed: bool,
        time: ChromeTime,
    ) -> Result<(), HistoryError> {
        let typed = i64::from(typed);

        self.conn()?.execute(
            "INSERT INTO urls (url, title, visit_count, typed_count, last_visit_time)
             VALUES (?1, ?2, 1, ?3, ?4)
             ON CONFLICT(url) DO UPDATE SET
                 title = COALESCE(?2, title),
                 visit_count = visit_count + 1,
                 typed_count = typed_count + ?3,
                 last_visit_time = MAX(last_visit_time, ?4)",
            params![url, title, typed, time.as_micros()],
        )?;

        log::debug!("Recorded visit to {}", url);

        Ok(())
    }

    /// Insert or replace a row wholesale. The row id is assigned by the database.
    pub fn upsert_row(&self, row: &HistoryRow) -> Result<(), HistoryError> {
        self.conn()?.execute(
            "INSERT INTO urls (url, title, visit_count, typed_count, last_visit_time, hidden)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(url) DO UPDATE SET
                 title = ?2,
                 visit_count = ?3,
                 typed_count = ?4,
                 last_visit_time = ?5,
                 hidden = ?6",
            params![
                row.url,
                row.title,
                row.visit_count,
                row.typed_count,
                row.last_visit_time.as_micros(),
                row.hidden
            ],
        )?;
        Ok(())
    }

    /// Update the title for a URL
    pub fn update_title(&self, url: &str, title: &str) -> Result<(), HistoryError> {
        self.conn()?.execute(
            "UPDATE urls SET title = ?1 WHERE url = ?2",
            params![title, url],
        )?;
        Ok(())
    }

    /// Hide or unhide a URL from autocomplete
    pub fn set_hidden(&self, url: &str, hidden: bool) -> Result<(), HistoryError> {
        self.conn()?.execute(
            "UPDATE urls SET hidden = ?1 WHERE url = ?2",
            params![hidden, url],
        )?;
        Ok(())
    }

    /// Delete entries by URL
    pub fn delete_by_url(&self, url: &str) -> Result<usize, HistoryError> {
        let count = self
            .conn()?
            .execute("DELETE FROM urls WHERE url = ?1", params![url])?;
        Ok(count)
    }

    /// Clear all history
    pub fn clear_all(&self) -> Result<(), HistoryError> {
        self.conn()?.execute("DELETE FROM urls", [])?;
        log::info!("Cleared all history");
        Ok(())
    }

    /// Get the total number of history entries
    pub fn count(&self) -> Result<i64, HistoryError> {
        let count = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM urls", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl HistoryStore for HistoryDatabase {
    fn autocomplete_for_prefix(
        &self,
        prefix: &str,
        max_results: usize,
        typed_only: bool,
    ) -> Result<Vec<HistoryRow>, HistoryError> {
        // Every URL starting with |prefix| sorts below |prefix| + U+00FF.
        let end_query = format!("{}\u{ff}", prefix);
        let typed_clause = if typed_only { "AND typed_count > 0" } else { "" };
        let sql = format!(
            "SELECT {URL_ROW_FIELDS} FROM urls
             WHERE url >= ?1 AND url < ?2 AND hidden = 0 {typed_clause}
             ORDER BY typed_count DESC, visit_count DESC, last_visit_time DESC
             LIMIT ?3"
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(params![prefix, end_query, max_results as i64], row_from_sql)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    fn find_shortest_url_from_base(
        &self,
        base: &str,
        url: &str,
        min_visits: i64,
        min_typed: i64,
        allow_base: bool,
    ) -> Result<Option<HistoryRow>, HistoryError> {
        // Rows between |base| and |url| that are themselves prefixes of |url|.
        let base_op = if allow_base { ">=" } else { ">" };
        let sql = format!(
            "SELECT {URL_ROW_FIELDS} FROM urls
             WHERE url {base_op} ?1 AND url < ?2 AND url = substr(?2, 1, length(url))
               AND hidden = 0 AND visit_count >= ?3 AND typed_count >= ?4
             ORDER BY url LIMIT 1"
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&sql)?;
        let row = stmt
            .query_row(params![base, url, min_visits, min_typed], row_from_sql)
            .optional()?;

        Ok(row)
    }

    fn row_for_url(&self, url: &str) -> Result<Option<HistoryRow>, HistoryError> {
        let sql = format!("SELECT {URL_ROW_FIELDS} FROM urls WHERE url = ?1");

        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&sql)?;
        let row = stmt.query_row(params![url], row_from_sql).optional()?;

        Ok(row)
    }
}
