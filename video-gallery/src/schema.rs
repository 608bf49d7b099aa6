use rusqlite::{Connection, Result};

/// Initialize the video gallery database schema
pub fn init_gallery_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    // Schema version table for the gallery
    conn.execute(
        "CREATE TABLE IF NOT EXISTS gallery_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT version FROM gallery_schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        create_gallery_schema_v1(conn)?;
        conn.execute(
            "INSERT INTO gallery_schema_version (version) VALUES (1)",
            [],
        )?;
    }

    Ok(())
}

/// Create gallery schema version 1
fn create_gallery_schema_v1(conn: &Connection) -> Result<()> {
    // Table: videos - one row per committed upload, never mutated
    conn.execute(
        "CREATE TABLE IF NOT EXISTS videos (
            id TEXT PRIMARY KEY,
            uri TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            file_size INTEGER NOT NULL
        )",
        [],
    )?;

    // Index for the gallery's newest-first ordering
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_videos_timestamp ON videos(timestamp DESC)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_gallery_schema(&conn).unwrap();
        init_gallery_schema(&conn).unwrap();

        let version: i32 = conn
            .query_row(
                "SELECT MAX(version) FROM gallery_schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, 1);
    }
}
