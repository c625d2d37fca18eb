use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Bootstraps the event store schema.
///
/// Tables are created only when missing so a store already populated by the
/// sync client is left untouched.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Event store: running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS room (
                room_id         TEXT PRIMARY KEY,
                name            TEXT,
                topic           TEXT,
                avatar          TEXT,
                sorting_timestamp INTEGER
            );

            CREATE TABLE IF NOT EXISTS event (
                rowid           INTEGER PRIMARY KEY AUTOINCREMENT,
                room_id         TEXT NOT NULL,
                event_id        TEXT NOT NULL UNIQUE,
                sender          TEXT NOT NULL,
                type            TEXT NOT NULL,
                state_key       TEXT,
                timestamp       INTEGER NOT NULL,
                content         BLOB NOT NULL,
                decrypted       BLOB,
                decrypted_type  TEXT,
                unsigned        TEXT NOT NULL DEFAULT '{}',
                local_content   TEXT,
                redacted_by     TEXT,
                relates_to      TEXT,
                relation_type   TEXT
            );

            CREATE INDEX IF NOT EXISTS event_timestamp_idx
                ON event(timestamp DESC, rowid DESC);

            CREATE INDEX IF NOT EXISTS event_room_timestamp_idx
                ON event(room_id, timestamp DESC);

            CREATE INDEX IF NOT EXISTS event_sender_idx
                ON event(sender);

            CREATE TABLE IF NOT EXISTS timeline (
                rowid           INTEGER PRIMARY KEY AUTOINCREMENT,
                room_id         TEXT NOT NULL,
                event_rowid     INTEGER NOT NULL UNIQUE REFERENCES event(rowid) ON DELETE CASCADE
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Event store migrations complete");
    Ok(())
}
