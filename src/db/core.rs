use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;

/// Open (creating if needed) the cache database and bring its schema up to date.
pub fn open_db(path: &Path) -> Result<Connection> {
    let mut con = Connection::open(path)?;
    crate::db::schema::run(&mut con)?;
    Ok(con)
}

pub fn has_table(con: &Connection, table: &str) -> Result<bool> {
    let n: i64 = con.query_row(
        r#"
        SELECT COUNT(*)
        FROM sqlite_master
        WHERE type = 'table' AND name = ?1
        "#,
        [table],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

pub fn meta_get(con: &Connection, key: &str) -> Result<Option<String>> {
    Ok(con
        .query_row("SELECT value FROM meta WHERE key = ?1", [key], |r| r.get(0))
        .optional()?)
}

pub fn meta_upsert(con: &Connection, key: &str, value: &str) -> Result<()> {
    con.execute(
        r#"
        INSERT INTO meta(key, value) VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
        (key, value),
    )?;
    Ok(())
}

pub fn count(con: &Connection, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    Ok(con.query_row(&sql, [], |r| r.get(0))?)
}
