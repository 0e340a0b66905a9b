//! SQL schema for the SnapTour SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per handled event; a repeated (user_id, timestamp) overwrites.
CREATE TABLE IF NOT EXISTS interactions (
    user_id      TEXT    NOT NULL,
    timestamp    INTEGER NOT NULL,   -- unix seconds
    display_name TEXT    NOT NULL,
    message_text TEXT,
    image_url    TEXT,
    PRIMARY KEY (user_id, timestamp)
);

-- Static reference data, seeded by the admin import.
CREATE TABLE IF NOT EXISTS labels (
    label   TEXT    PRIMARY KEY,
    message TEXT,
    score   INTEGER NOT NULL DEFAULT 0
);

-- Observations are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS observations (
    seq            INTEGER PRIMARY KEY AUTOINCREMENT,
    observation_id TEXT    NOT NULL UNIQUE,
    user_id        TEXT    NOT NULL,
    label          TEXT    NOT NULL,
    score          INTEGER NOT NULL,
    recorded_at    TEXT    NOT NULL   -- ISO 8601 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS observations_user_idx ON observations(user_id);

PRAGMA user_version = 1;
";
