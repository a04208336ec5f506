//! Alphabet index for place listings
//!
//! The index page shows a menu of letters and a table of names sorted by
//! the same [`Collation`]. Each letter in the menu must be the anchor of the
//! first row of its group, so the menu and the row letters are both derived
//! here from one collation.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::collate::Collation;

#[derive(Debug, Error)]
pub enum IndexError {
    /// The rows being rendered were not part of the set the index was built from
    #[error("index letter '{letter}' of '{name}' is not in the alphabet index")]
    MissingLetter { name: String, letter: String },
}

/// Navigation bucket of a name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexLetter {
    Letter(String),
    /// Name with no letters; rendered as a non-breaking space without anchor
    Placeholder,
}

impl IndexLetter {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            IndexLetter::Letter(letter) => Some(letter),
            IndexLetter::Placeholder => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, IndexLetter::Placeholder)
    }
}

impl fmt::Display for IndexLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexLetter::Letter(letter) => f.write_str(letter),
            IndexLetter::Placeholder => f.write_str("\u{a0}"),
        }
    }
}

/// Sorted letters with no two entries primary-equal. Built once per run
/// and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct IndexList {
    letters: Vec<String>,
}

impl IndexList {
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn letters(&self) -> impl Iterator<Item = &str> + '_ {
        self.letters.iter().map(String::as_str)
    }

    /// Entry with no primary difference from `letter`
    fn find(&self, letter: &str, collation: &Collation) -> Option<&str> {
        self.letters
            .binary_search_by(|entry| collation.compare_primary(entry, letter))
            .ok()
            .map(|i| self.letters[i].as_str())
    }
}

pub fn extract_index_letter(name: &str, collation: &Collation) -> IndexLetter {
    match collation.first_letter(name) {
        Some(letter) => IndexLetter::Letter(letter),
        None => IndexLetter::Placeholder,
    }
}

/// Menu letters for `names`: every name's first letter, sorted, keeping a
/// letter only when it differs at primary strength from the last one kept.
pub fn build_index_list<I, S>(names: I, collation: &Collation) -> IndexList
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut candidates: Vec<String> = names
        .into_iter()
        .filter_map(|name| match extract_index_letter(name.as_ref(), collation) {
            IndexLetter::Letter(letter) => Some(letter),
            IndexLetter::Placeholder => None,
        })
        .collect();
    candidates.sort_by(|a, b| collation.compare(a, b));

    let mut letters: Vec<String> = Vec::new();
    for candidate in candidates {
        let keep = match letters.last() {
            None => true,
            Some(prev) => collation.primary_difference(prev, &candidate),
        };
        if keep {
            letters.push(candidate);
        }
    }

    IndexList { letters }
}

/// Letter shown and anchored for the row of `name`
pub fn resolve_row_letter(
    name: &str,
    index_list: &IndexList,
    collation: &Collation,
) -> Result<IndexLetter, IndexError> {
    let letter = match extract_index_letter(name, collation) {
        IndexLetter::Letter(letter) => letter,
        IndexLetter::Placeholder => return Ok(IndexLetter::Placeholder),
    };
    match index_list.find(&letter, collation) {
        Some(found) => Ok(IndexLetter::Letter(found.to_string())),
        None => Err(IndexError::MissingLetter {
            name: name.to_string(),
            letter,
        }),
    }
}

pub fn starts_new_group(
    current: &IndexLetter,
    previous: &IndexLetter,
    collation: &Collation,
    is_first_row: bool,
) -> bool {
    if is_first_row {
        return true;
    }
    match (current, previous) {
        (IndexLetter::Letter(a), IndexLetter::Letter(b)) => collation.primary_difference(a, b),
        (IndexLetter::Placeholder, IndexLetter::Placeholder) => false,
        _ => true,
    }
}

/// Row order for the index table: distinct names by the index collation,
/// each with the first of its handles. Names without handles are skipped.
pub fn sort_places(
    names: &BTreeMap<String, Vec<String>>,
    collation: &Collation,
) -> Vec<(String, String)> {
    let mut rows: Vec<(&String, &String)> = names
        .iter()
        .filter_map(|(name, handles)| Some((name, handles.iter().min()?)))
        .collect();
    rows.sort_by(|a, b| collation.compare(a.0.trim(), b.0.trim()));
    rows.into_iter()
        .map(|(name, handle)| (name.clone(), handle.clone()))
        .collect()
}
