//! SQL schema for the khatt SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- expiry_date is stored verbatim; a value that is not a calendar date is
-- legal here and classifies as UNKNOWN at read time.
CREATE TABLE IF NOT EXISTS lines (
    line_id        TEXT PRIMARY KEY,
    person_name    TEXT NOT NULL,
    phone_number   TEXT NOT NULL,
    job_title      TEXT,
    workplace      TEXT,
    package_amount INTEGER,
    expiry_date    TEXT NOT NULL,
    created_at     TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- The endpoint URL is the subscription identity; the PRIMARY KEY makes
-- re-subscription an INSERT OR IGNORE no-op.
CREATE TABLE IF NOT EXISTS push_subscriptions (
    endpoint TEXT PRIMARY KEY,
    auth     TEXT NOT NULL,
    p256dh   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS lines_expiry_idx ON lines(expiry_date);

PRAGMA user_version = 1;
";
