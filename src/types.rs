//! Place records as read from the place store

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Kind of place in the location hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum PlaceType {
    Country,
    State,
    County,
    City,
    Parish,
    Locality,
    Street,
    Province,
    Region,
    Department,
    Neighborhood,
    District,
    Borough,
    Municipality,
    Town,
    Village,
    Hamlet,
    Farm,
    Building,
    Number,
    #[default]
    Unknown,
    Custom(String),
}

impl PlaceType {
    pub fn as_str(&self) -> &str {
        match self {
            PlaceType::Country => "Country",
            PlaceType::State => "State",
            PlaceType::County => "County",
            PlaceType::City => "City",
            PlaceType::Parish => "Parish",
            PlaceType::Locality => "Locality",
            PlaceType::Street => "Street",
            PlaceType::Province => "Province",
            PlaceType::Region => "Region",
            PlaceType::Department => "Department",
            PlaceType::Neighborhood => "Neighborhood",
            PlaceType::District => "District",
            PlaceType::Borough => "Borough",
            PlaceType::Municipality => "Municipality",
            PlaceType::Town => "Town",
            PlaceType::Village => "Village",
            PlaceType::Hamlet => "Hamlet",
            PlaceType::Farm => "Farm",
            PlaceType::Building => "Building",
            PlaceType::Number => "Number",
            PlaceType::Unknown => "Unknown",
            PlaceType::Custom(name) => name,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "country" => PlaceType::Country,
            "state" => PlaceType::State,
            "county" => PlaceType::County,
            "city" => PlaceType::City,
            "parish" => PlaceType::Parish,
            "locality" => PlaceType::Locality,
            "street" => PlaceType::Street,
            "province" => PlaceType::Province,
            "region" => PlaceType::Region,
            "department" => PlaceType::Department,
            "neighborhood" => PlaceType::Neighborhood,
            "district" => PlaceType::District,
            "borough" => PlaceType::Borough,
            "municipality" => PlaceType::Municipality,
            "town" => PlaceType::Town,
            "village" => PlaceType::Village,
            "hamlet" => PlaceType::Hamlet,
            "farm" => PlaceType::Farm,
            "building" => PlaceType::Building,
            "number" => PlaceType::Number,
            "" | "unknown" => PlaceType::Unknown,
            _ => PlaceType::Custom(s.trim().to_string()),
        }
    }

    /// Types that fill the State/Province column of the index
    pub fn is_state_like(&self) -> bool {
        matches!(self, PlaceType::State | PlaceType::Province)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceUrl {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Source reference attached to a place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

/// Another record that refers to this place (an event, a person, a family)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackRef {
    pub kind: String,
    pub gramps_id: String,
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct Place {
    pub handle: String,
    pub gramps_id: String,
    pub name: String,
    pub alt_names: Vec<String>,
    pub place_type: PlaceType,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub code: Option<String>,
    /// Handle of the enclosing place
    pub enclosed_by: Option<String>,
    /// Unix seconds
    pub change_time: i64,
    pub notes: Vec<String>,
    pub urls: Vec<PlaceUrl>,
    pub media: Vec<String>,
    pub citations: Vec<Citation>,
    pub backrefs: Vec<BackRef>,
}

impl Place {
    pub fn has_coordinates(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.latitude) && filled(&self.longitude)
    }
}

/// Place type -> name along the enclosing chain, nearest place of each type first
pub type MainLocation = BTreeMap<PlaceType, String>;

/// Walk `enclosed_by` from `place` upwards. Cycles in the chain end the walk.
pub fn main_location(place: &Place, places: &HashMap<String, Place>) -> MainLocation {
    let mut location = MainLocation::new();
    let mut seen = vec![place.handle.as_str()];
    let mut current = Some(place);

    while let Some(p) = current {
        location
            .entry(p.place_type.clone())
            .or_insert_with(|| p.name.clone());
        current = match p.enclosed_by.as_deref() {
            Some(parent) if !seen.contains(&parent) => {
                seen.push(parent);
                places.get(parent)
            }
            _ => None,
        };
    }

    location
}

/// Enclosing chain as names, `place` first: "Paris, Île-de-France, France"
pub fn display_title(place: &Place, places: &HashMap<String, Place>) -> String {
    let mut parts = vec![place.name.as_str()];
    let mut seen = vec![place.handle.as_str()];
    let mut parent = place.enclosed_by.as_deref();

    while let Some(handle) = parent {
        if seen.contains(&handle) {
            break;
        }
        seen.push(handle);
        match places.get(handle) {
            Some(p) => {
                parts.push(p.name.as_str());
                parent = p.enclosed_by.as_deref();
            }
            None => break,
        }
    }

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(handle: &str, name: &str, place_type: PlaceType, parent: Option<&str>) -> Place {
        Place {
            handle: handle.to_string(),
            gramps_id: format!("P{}", handle),
            name: name.to_string(),
            place_type,
            enclosed_by: parent.map(String::from),
            ..Default::default()
        }
    }

    fn hierarchy() -> HashMap<String, Place> {
        [
            place("1", "France", PlaceType::Country, None),
            place("2", "Île-de-France", PlaceType::Region, Some("1")),
            place("3", "Paris", PlaceType::City, Some("2")),
            place("4", "Montmartre", PlaceType::Neighborhood, Some("3")),
        ]
        .into_iter()
        .map(|p| (p.handle.clone(), p))
        .collect()
    }

    #[test]
    fn test_place_type_round_trip() {
        assert_eq!(PlaceType::from_str("City"), PlaceType::City);
        assert_eq!(PlaceType::from_str(" parish "), PlaceType::Parish);
        assert_eq!(PlaceType::from_str(""), PlaceType::Unknown);
        assert_eq!(
            PlaceType::from_str("Kibbutz"),
            PlaceType::Custom("Kibbutz".to_string())
        );
        assert_eq!(PlaceType::Custom("Kibbutz".to_string()).as_str(), "Kibbutz");
    }

    #[test]
    fn test_main_location_walks_hierarchy() {
        let places = hierarchy();
        let location = main_location(&places["4"], &places);
        assert_eq!(location.get(&PlaceType::Country).map(String::as_str), Some("France"));
        assert_eq!(location.get(&PlaceType::City).map(String::as_str), Some("Paris"));
        assert_eq!(location.get(&PlaceType::State), None);
    }

    #[test]
    fn test_display_title_stops_on_cycle() {
        let mut places = hierarchy();
        places.get_mut("1").unwrap().enclosed_by = Some("3".to_string());
        assert_eq!(
            display_title(&places["3"], &places),
            "Paris, Île-de-France, France"
        );
    }
}
