//! Place import from Gramps-style CSV
//!
//! Expected headers (case-insensitive, any order):
//! `Place, Title, Name, Type, Latitude, Longitude, Code, Enclosed_by`,
//! plus an optional `Alt_names` column with `;`-separated names.
//! Place ids are written `[P0001]`; `Enclosed_by` refers to such an id.

use anyhow::{bail, Context, Result};
use csv::StringRecord;
use rusqlite::Connection;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::store;
use crate::types::{Place, PlaceType};

struct Columns {
    place: usize,
    name: Option<usize>,
    title: Option<usize>,
    place_type: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    code: Option<usize>,
    enclosed_by: Option<usize>,
    alt_names: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let Some(place) = find("place") else {
            bail!("CSV has no 'Place' column");
        };
        let columns = Columns {
            place,
            name: find("name"),
            title: find("title"),
            place_type: find("type"),
            latitude: find("latitude"),
            longitude: find("longitude"),
            code: find("code"),
            enclosed_by: find("enclosed_by"),
            alt_names: find("alt_names"),
        };
        if columns.name.is_none() && columns.title.is_none() {
            bail!("CSV needs a 'Name' or 'Title' column");
        }
        Ok(columns)
    }
}

fn field(record: &StringRecord, column: Option<usize>) -> Option<String> {
    let value = record.get(column?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// `[P0001]` -> `P0001`
fn strip_id(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .to_string()
}

fn handle_for(gramps_id: &str) -> String {
    format!("_{}", gramps_id.to_lowercase())
}

/// Parse CSV rows into places. `Enclosed_by` ids are resolved against the
/// file itself first, then `known` (ids already in the store).
pub fn read_places<R: Read>(reader: R, known: &HashMap<String, String>) -> Result<Vec<Place>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::from_headers(csv_reader.headers()?)?;
    let now = chrono::Utc::now().timestamp();

    let mut places = Vec::new();
    let mut parents: Vec<Option<String>> = Vec::new();
    let mut ids: HashMap<String, String> = known.clone();

    for (line, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("Bad CSV record {}", line + 2))?;
        let Some(raw_id) = field(&record, Some(columns.place)) else {
            tracing::warn!(line = line + 2, "skipping row without place id");
            continue;
        };
        let gramps_id = strip_id(&raw_id);
        let Some(name) = field(&record, columns.name).or_else(|| field(&record, columns.title))
        else {
            tracing::warn!(%gramps_id, "skipping place without a name");
            continue;
        };

        let handle = ids
            .get(&gramps_id)
            .cloned()
            .unwrap_or_else(|| handle_for(&gramps_id));
        ids.insert(gramps_id.clone(), handle.clone());

        let alt_names = field(&record, columns.alt_names)
            .map(|s| {
                s.split(';')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        parents.push(field(&record, columns.enclosed_by).map(|p| strip_id(&p)));
        places.push(Place {
            handle,
            gramps_id,
            name,
            alt_names,
            place_type: field(&record, columns.place_type)
                .map(|t| PlaceType::from_str(&t))
                .unwrap_or_default(),
            latitude: field(&record, columns.latitude),
            longitude: field(&record, columns.longitude),
            code: field(&record, columns.code),
            change_time: now,
            ..Default::default()
        });
    }

    for (place, parent) in places.iter_mut().zip(parents) {
        if let Some(parent_id) = parent {
            match ids.get(&parent_id) {
                Some(handle) => place.enclosed_by = Some(handle.clone()),
                None => {
                    tracing::warn!(
                        place = %place.gramps_id,
                        parent = %parent_id,
                        "unknown enclosing place"
                    )
                }
            }
        }
    }

    Ok(places)
}

/// Import a CSV file into the store, returns the number of places written
pub fn run_import(csv_path: &Path, conn: &Connection) -> Result<usize> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open {}", csv_path.display()))?;

    let known: HashMap<String, String> = store::load_places(conn)?
        .into_iter()
        .map(|p| (p.gramps_id, p.handle))
        .collect();

    let places = read_places(file, &known)?;
    for place in &places {
        store::insert_place(conn, place)?;
    }
    Ok(places.len())
}
