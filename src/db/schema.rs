use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

// Concurrent writers wait for the lock instead of failing with SQLITE_BUSY.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn init_db(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    // `slot` pins the table to a single row.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS admins (
               id                TEXT PRIMARY KEY,
               slot              INTEGER NOT NULL DEFAULT 1 UNIQUE CHECK (slot = 1),
               name              TEXT NOT NULL,
               phone             TEXT NOT NULL,
               email             TEXT NOT NULL,
               password_hash     TEXT NOT NULL,
               additional_emails TEXT NOT NULL DEFAULT '[]',
               created_at        TEXT NOT NULL
           )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS registrations (
                id               TEXT PRIMARY KEY,
                registrant_phone TEXT NOT NULL,
                personal_info    TEXT NOT NULL,
                buddies          TEXT NOT NULL,
                next_of_kin      TEXT NOT NULL,
                created_at       TEXT NOT NULL,
                updated_at       TEXT
            )",
        [],
    )?;

    // One registration per phone number; submissions upsert on it.
    conn.execute_batch(
        "DROP INDEX IF EXISTS idx_registrations_phone;
         CREATE UNIQUE INDEX IF NOT EXISTS idx_registrations_phone_unique
            ON registrations (registrant_phone);",
    )?;

    Ok(conn)
}
