//! SQLite place store

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::types::{BackRef, Place, PlaceType};

pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open place store {}", path.display()))?;
    init_database(&conn)?;
    Ok(conn)
}

pub fn init_database(conn: &Connection) -> Result<()> {
    let schema = include_str!("../schema.sql");
    conn.execute_batch(schema)?;
    Ok(())
}

/// JSON column value, NULL for empty lists
fn to_json<T: Serialize>(items: &[T]) -> Result<Option<String>> {
    if items.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(items)?))
    }
}

fn from_json<T: DeserializeOwned>(column: &str, json: Option<String>) -> Result<Vec<T>> {
    match json {
        Some(s) if !s.is_empty() => {
            serde_json::from_str(&s).with_context(|| format!("Bad JSON in column {}", column))
        }
        _ => Ok(Vec::new()),
    }
}

pub fn insert_place(conn: &Connection, place: &Place) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO places (handle, gramps_id, name, place_type, latitude, longitude,
             code, enclosed_by, change_time, alt_names_json, notes_json, urls_json, media_json,
             citations_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            place.handle,
            place.gramps_id,
            place.name,
            place.place_type.as_str(),
            place.latitude,
            place.longitude,
            place.code,
            place.enclosed_by,
            place.change_time,
            to_json(&place.alt_names)?,
            to_json(&place.notes)?,
            to_json(&place.urls)?,
            to_json(&place.media)?,
            to_json(&place.citations)?,
        ],
    )
    .with_context(|| format!("Failed to store place {}", place.gramps_id))?;

    conn.execute(
        "DELETE FROM place_refs WHERE place_handle = ?1",
        [&place.handle],
    )?;
    for backref in &place.backrefs {
        insert_backref(conn, &place.handle, backref)?;
    }
    Ok(())
}

pub fn insert_backref(conn: &Connection, place_handle: &str, backref: &BackRef) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO place_refs (place_handle, kind, gramps_id, label)
         VALUES (?1, ?2, ?3, ?4)",
        params![place_handle, backref.kind, backref.gramps_id, backref.label],
    )?;
    Ok(())
}

/// Handle of the place with `gramps_id`, if stored
pub fn handle_for_id(conn: &Connection, gramps_id: &str) -> Result<Option<String>> {
    let handle = conn
        .query_row(
            "SELECT handle FROM places WHERE gramps_id = ?1",
            [gramps_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(handle)
}

struct PlaceRow {
    place: Place,
    alt_names: Option<String>,
    notes: Option<String>,
    urls: Option<String>,
    media: Option<String>,
    citations: Option<String>,
}

pub fn load_places(conn: &Connection) -> Result<Vec<Place>> {
    let mut stmt = conn.prepare(
        "SELECT handle, gramps_id, name, place_type, latitude, longitude, code, enclosed_by,
                change_time, alt_names_json, notes_json, urls_json, media_json, citations_json
         FROM places ORDER BY gramps_id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(PlaceRow {
            place: Place {
                handle: row.get(0)?,
                gramps_id: row.get(1)?,
                name: row.get(2)?,
                place_type: PlaceType::from_str(&row.get::<_, String>(3)?),
                latitude: row.get(4)?,
                longitude: row.get(5)?,
                code: row.get(6)?,
                enclosed_by: row.get(7)?,
                change_time: row.get(8)?,
                ..Default::default()
            },
            alt_names: row.get(9)?,
            notes: row.get(10)?,
            urls: row.get(11)?,
            media: row.get(12)?,
            citations: row.get(13)?,
        })
    })?;

    let mut places = Vec::new();
    for row in rows {
        let row = row?;
        let mut place = row.place;
        place.alt_names = from_json("alt_names_json", row.alt_names)?;
        place.notes = from_json("notes_json", row.notes)?;
        place.urls = from_json("urls_json", row.urls)?;
        place.media = from_json("media_json", row.media)?;
        place.citations = from_json("citations_json", row.citations)?;
        places.push(place);
    }

    let mut refs_stmt = conn.prepare(
        "SELECT place_handle, kind, gramps_id, label FROM place_refs
         ORDER BY place_handle, kind, gramps_id",
    )?;
    let refs = refs_stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            BackRef {
                kind: row.get(1)?,
                gramps_id: row.get(2)?,
                label: row.get(3)?,
            },
        ))
    })?;
    let mut by_place: BTreeMap<String, Vec<BackRef>> = BTreeMap::new();
    for r in refs {
        let (handle, backref) = r?;
        by_place.entry(handle).or_default().push(backref);
    }
    for place in &mut places {
        if let Some(backrefs) = by_place.remove(&place.handle) {
            place.backrefs = backrefs;
        }
    }

    Ok(places)
}

/// Display name -> handles of the places carrying that name, primary and
/// alternate names alike
pub fn name_source(places: &[Place]) -> BTreeMap<String, Vec<String>> {
    let mut names: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for place in places {
        let all = std::iter::once(&place.name).chain(place.alt_names.iter());
        for name in all {
            let handles = names.entry(name.clone()).or_default();
            if !handles.contains(&place.handle) {
                handles.push(place.handle.clone());
            }
        }
    }
    names
}
