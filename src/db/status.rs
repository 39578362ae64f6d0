use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::db::cache::META_SYNCED_AT;
use crate::db::core::{count, has_table, meta_get};
use crate::ui::{error, success, warning};

/// Print path, size, meta and row counts for the local cache.
pub fn run(db_path: &Path) -> Result<()> {
    println!("Cache path: {}", db_path.display());

    if !db_path.exists() {
        error("Status: MISSING");
        println!("Hint: run `ranno data sync` to create it.");
        return Ok(());
    }

    let meta_fs = fs::metadata(db_path).context("Unable to read cache file metadata")?;
    success("Status: OK");
    println!("Size: {} bytes", meta_fs.len());

    // Opened raw so a status check never migrates the file.
    let con = Connection::open(db_path)
        .with_context(|| format!("Unable to open cache: {}", db_path.display()))?;

    if !has_table(&con, "meta")? {
        warning("Warning: table 'meta' is missing (cache not initialized or schema is invalid)");
        return Ok(());
    }

    println!();
    println!("Meta:");
    for k in ["schema_version", META_SYNCED_AT] {
        if let Some(v) = meta_get(&con, k)? {
            println!("  {k}: {v}");
        }
    }
    print_sync_age(&con)?;

    println!();
    println!("Counts:");
    if has_table(&con, "incidents")? {
        println!("  incidents: {}", count(&con, "incidents")?);
    } else {
        println!("  incidents: -");
    }
    if has_table(&con, "amenities")? {
        let mut stmt =
            con.prepare("SELECT kind, COUNT(*) FROM amenities GROUP BY kind ORDER BY kind")?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
        for row in rows {
            let (kind, n) = row?;
            println!("  amenities.{kind}: {n}");
        }
    } else {
        println!("  amenities: -");
    }

    Ok(())
}

fn print_sync_age(con: &Connection) -> Result<()> {
    if let Some(ts) = meta_get(con, META_SYNCED_AT)?
        && let Ok(at) = chrono::DateTime::parse_from_rfc3339(&ts)
    {
        let age = chrono::Utc::now().signed_duration_since(at);
        println!("  synced_hours_ago: {}", age.num_hours());
    }
    Ok(())
}
