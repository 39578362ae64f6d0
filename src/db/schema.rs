use rusqlite::{Connection, Transaction};

use crate::db::core::meta_get;
use crate::error::{PlannerError, Result};

pub const SCHEMA_VERSION: i64 = 2;

fn meta_upsert_tx(tx: &Transaction<'_>, key: &str, value: &str) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO meta(key, value) VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
        (key, value),
    )?;
    Ok(())
}

fn m_to_v1(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS incidents (
            id          TEXT PRIMARY KEY,
            latitude    REAL NOT NULL,
            longitude   REAL NOT NULL,
            category    TEXT,
            occurred_at TEXT
        );

        CREATE TABLE IF NOT EXISTS amenities (
            kind      TEXT NOT NULL CHECK (kind IN ('water', 'restroom')),
            id        TEXT NOT NULL,
            latitude  REAL NOT NULL,
            longitude REAL NOT NULL,
            name      TEXT,
            address   TEXT,
            PRIMARY KEY (kind, id)
        );
        "#,
    )?;
    Ok(())
}

fn m_to_v2(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_incidents_occurred_at
          ON incidents(occurred_at DESC);

        CREATE INDEX IF NOT EXISTS idx_amenities_kind
          ON amenities(kind);
        "#,
    )?;
    Ok(())
}

/// Create or upgrade the schema. Idempotent, run on every open.
pub fn run(con: &mut Connection) -> Result<()> {
    con.execute_batch(
        "CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
    )?;

    let current = match meta_get(con, "schema_version")? {
        None => 0,
        Some(v) => v.parse::<i64>().map_err(|_| {
            PlannerError::Cache(format!("invalid schema_version in meta table: '{v}'"))
        })?,
    };
    if current > SCHEMA_VERSION {
        return Err(PlannerError::Cache(format!(
            "cache schema v{current} is newer than supported v{SCHEMA_VERSION}"
        )));
    }
    if current == SCHEMA_VERSION {
        return Ok(());
    }

    log::info!("Upgrading cache schema v{current} -> v{SCHEMA_VERSION}");
    let tx = con.transaction()?;

    if current < 1 {
        m_to_v1(&tx)?;
        meta_upsert_tx(&tx, "schema_version", "1")?;
    }
    if current < 2 {
        m_to_v2(&tx)?;
        meta_upsert_tx(&tx, "schema_version", "2")?;
    }

    tx.commit()?;
    Ok(())
}
