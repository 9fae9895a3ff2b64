//! SQL schema for the chain store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS prefixes (
    id      INTEGER PRIMARY KEY,
    tuple   TEXT    NOT NULL,   -- space-joined words
    ord     INTEGER NOT NULL,   -- number of words in `tuple`
    author  TEXT    NOT NULL,
    UNIQUE (tuple, author)
);

CREATE TABLE IF NOT EXISTS suffixes (
    id         INTEGER PRIMARY KEY,
    prefix_id  INTEGER NOT NULL REFERENCES prefixes(id),
    word       TEXT    NOT NULL,
    count      INTEGER NOT NULL DEFAULT 1 CHECK (count > 0),
    UNIQUE (prefix_id, word)
);

-- Token index over prefix text. Derived from `prefixes`; never written
-- directly except by the triggers below.
CREATE VIRTUAL TABLE IF NOT EXISTS prefixes_idx USING fts5(
    tuple, author, content = 'prefixes', content_rowid = 'id'
);

CREATE TRIGGER IF NOT EXISTS prefixes_ai AFTER INSERT ON prefixes BEGIN
    INSERT INTO prefixes_idx (rowid, tuple, author)
    VALUES (new.id, new.tuple, new.author);
END;

CREATE TRIGGER IF NOT EXISTS prefixes_ad AFTER DELETE ON prefixes BEGIN
    INSERT INTO prefixes_idx (prefixes_idx, rowid, tuple, author)
    VALUES ('delete', old.id, old.tuple, old.author);
END;

CREATE TRIGGER IF NOT EXISTS prefixes_au AFTER UPDATE ON prefixes BEGIN
    INSERT INTO prefixes_idx (prefixes_idx, rowid, tuple, author)
    VALUES ('delete', old.id, old.tuple, old.author);
    INSERT INTO prefixes_idx (rowid, tuple, author)
    VALUES (new.id, new.tuple, new.author);
END;

PRAGMA user_version = 1;
";
