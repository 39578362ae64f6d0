//! Local copy of the open-data layers.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{Connection, params};

use crate::capability::{AmenitySource, IncidentSource};
use crate::db::core::{meta_upsert, open_db};
use crate::error::{PlannerError, Result};
use crate::model::{AmenityKind, AmenityPoint, IncidentPoint};

pub const META_SYNCED_AT: &str = "synced_at_utc";

pub fn replace_incidents(con: &mut Connection, points: &[IncidentPoint]) -> Result<usize> {
    let tx = con.transaction()?;
    tx.execute("DELETE FROM incidents", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO incidents(id, latitude, longitude, category, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for p in points {
            stmt.execute(params![
                p.id,
                p.latitude,
                p.longitude,
                p.category,
                p.occurred_at
            ])?;
        }
    }
    tx.commit()?;
    Ok(points.len())
}

pub fn replace_amenities(
    con: &mut Connection,
    kind: AmenityKind,
    points: &[AmenityPoint],
) -> Result<usize> {
    let tx = con.transaction()?;
    tx.execute("DELETE FROM amenities WHERE kind = ?1", [kind.as_str()])?;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO amenities(kind, id, latitude, longitude, name, address)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for p in points {
            stmt.execute(params![
                kind.as_str(),
                p.id,
                p.latitude,
                p.longitude,
                p.name,
                p.address
            ])?;
        }
    }
    tx.commit()?;
    Ok(points.len())
}

pub fn record_sync(con: &Connection) -> Result<()> {
    meta_upsert(con, META_SYNCED_AT, &chrono::Utc::now().to_rfc3339())
}

/// Most recent first; rows without a timestamp last.
pub fn load_incidents(con: &Connection, limit: usize) -> Result<Vec<IncidentPoint>> {
    let mut stmt = con.prepare(
        r#"
        SELECT id, latitude, longitude, category, occurred_at
        FROM incidents
        ORDER BY occurred_at IS NULL, occurred_at DESC, id
        LIMIT ?1
        "#,
    )?;
    let rows = stmt.query_map([limit as i64], |r| {
        Ok(IncidentPoint {
            id: r.get(0)?,
            latitude: r.get(1)?,
            longitude: r.get(2)?,
            category: r.get(3)?,
            occurred_at: r.get(4)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn load_amenities(con: &Connection, kind: AmenityKind, limit: usize) -> Result<Vec<AmenityPoint>> {
    let mut stmt = con.prepare(
        r#"
        SELECT id, latitude, longitude, name, address
        FROM amenities
        WHERE kind = ?1
        ORDER BY id
        LIMIT ?2
        "#,
    )?;
    let rows = stmt.query_map(params![kind.as_str(), limit as i64], |r| {
        Ok(AmenityPoint {
            id: r.get(0)?,
            latitude: r.get(1)?,
            longitude: r.get(2)?,
            name: r.get(3)?,
            address: r.get(4)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Incident and amenity source reading the SQLite cache.
#[derive(Debug, Clone)]
pub struct CachedDataSource {
    path: PathBuf,
}

impl CachedDataSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            if !path.exists() {
                return Err(PlannerError::Cache(format!(
                    "cache not found at {} (run `ranno data sync`)",
                    path.display()
                )));
            }
            let con = open_db(&path)?;
            f(&con)
        })
        .await
        .map_err(|e| PlannerError::Cache(format!("cache task failed: {e}")))?
    }
}

#[async_trait]
impl IncidentSource for CachedDataSource {
    async fn fetch_incidents(&self, limit: usize) -> Result<Vec<IncidentPoint>> {
        self.with_connection(move |con| load_incidents(con, limit)).await
    }
}

#[async_trait]
impl AmenitySource for CachedDataSource {
    async fn fetch_amenities(&self, kind: AmenityKind, limit: usize) -> Result<Vec<AmenityPoint>> {
        self.with_connection(move |con| load_amenities(con, kind, limit))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(id: &str, at: Option<&str>) -> IncidentPoint {
        IncidentPoint {
            id: id.into(),
            latitude: 37.78,
            longitude: -122.41,
            category: None,
            occurred_at: at.map(str::to_string),
        }
    }

    #[test]
    fn incidents_come_back_newest_first() {
        let mut con = Connection::open_in_memory().unwrap();
        crate::db::schema::run(&mut con).unwrap();
        replace_incidents(
            &mut con,
            &[
                incident("old", Some("2024-01-01T00:00:00")),
                incident("undated", None),
                incident("new", Some("2024-06-01T00:00:00")),
            ],
        )
        .unwrap();

        let ids: Vec<String> = load_incidents(&con, 10)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["new", "old", "undated"]);
        assert_eq!(load_incidents(&con, 1).unwrap().len(), 1);
    }

    #[test]
    fn amenity_kinds_are_replaced_independently() {
        let mut con = Connection::open_in_memory().unwrap();
        crate::db::schema::run(&mut con).unwrap();
        let p = AmenityPoint {
            id: "1".into(),
            latitude: 37.76,
            longitude: -122.42,
            name: Some("Dolores Park".into()),
            address: None,
        };
        replace_amenities(&mut con, AmenityKind::Water, &[p.clone()]).unwrap();
        replace_amenities(&mut con, AmenityKind::Restroom, &[p.clone()]).unwrap();
        replace_amenities(&mut con, AmenityKind::Water, &[]).unwrap();

        assert!(load_amenities(&con, AmenityKind::Water, 10).unwrap().is_empty());
        assert_eq!(load_amenities(&con, AmenityKind::Restroom, 10).unwrap(), vec![p]);
    }

    #[tokio::test]
    async fn cached_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite");
        {
            let mut con = open_db(&path).unwrap();
            replace_incidents(&mut con, &[incident("a", Some("2024-01-01"))]).unwrap();
            record_sync(&con).unwrap();
        }

        let src = CachedDataSource::new(&path);
        let got = src.fetch_incidents(5).await.unwrap();
        assert_eq!(got.len(), 1);

        let missing = CachedDataSource::new(dir.path().join("missing.sqlite"));
        assert!(matches!(
            missing.fetch_incidents(5).await,
            Err(PlannerError::Cache(_))
        ));
    }
}
