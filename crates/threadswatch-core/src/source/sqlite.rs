use super::{CatalogSource, Chart, ThreadRow};
use crate::error::{Result, SwatchError};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

const CHARTS_SQL: &str = "\
SELECT thread_charts.id, thread_charts.chart, thread_brands.brand
FROM thread_charts
INNER JOIN thread_brands ON thread_charts.threadBrandId = thread_brands.id
WHERE thread_charts.disabled = 0
ORDER BY thread_charts.id";

const THREADS_SQL: &str = "\
SELECT id, code, name, red, green, blue
FROM thread_cones
WHERE disabled = 0 AND threadChartId = ?1
ORDER BY id";

/// Thread catalog stored in SQLite. Opened read-only.
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| SwatchError::Source(format!("cannot open {}: {e}", path.display())))?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl CatalogSource for SqliteSource {
    fn charts(&mut self) -> Result<Vec<Chart>> {
        let mut stmt = self.conn.prepare(CHARTS_SQL)?;
        let rows = stmt.query_map([], |row| {
            Ok(Chart {
                id: row.get(0)?,
                chart: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                brand: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn threads(&mut self, chart: &Chart) -> Result<Vec<ThreadRow>> {
        let mut stmt = self.conn.prepare(THREADS_SQL)?;
        let rows = stmt.query_map(params![chart.id], |row| {
            Ok(ThreadRow {
                id: row.get(0)?,
                code: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                red: row.get(3)?,
                green: row.get(4)?,
                blue: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
