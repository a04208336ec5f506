//! Locale-aware collation for place names
//!
//! Ordering and primary equivalence come from the CLDR collation data
//! compiled into `icu_collator`. A [`Collation`] holds two collators for one
//! locale: the default strength for sorting, and primary strength for
//! deciding whether two strings start with the same letter.

use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::{Collator, CollatorBorrowed};
use icu_locale_core::Locale;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Carries the last primary weight in CLDR root; sorts after every letter
const LAST_PRIMARY: char = '\u{FFFF}';

/// Longest contraction that can open a name (Hungarian `dzs`)
const MAX_CONTRACTION: usize = 3;

#[derive(Debug, Error)]
pub enum CollateError {
    #[error("invalid locale '{tag}': {message}")]
    InvalidLocale { tag: String, message: String },

    #[error("no collation data for locale '{tag}': {message}")]
    Data { tag: String, message: String },
}

pub struct Collation {
    tag: String,
    full: CollatorBorrowed<'static>,
    primary: CollatorBorrowed<'static>,
}

impl fmt::Debug for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collation")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

impl Collation {
    /// Resolve a locale tag such as `sv`, `cs-CZ`, `da_DK.UTF-8` or
    /// `sr_RS@latin`. Languages without a tailoring get the root order.
    pub fn for_locale(tag: &str) -> Result<Self, CollateError> {
        let bcp47 = bcp47_tag(tag);
        let locale: Locale = bcp47.parse().map_err(|e| CollateError::InvalidLocale {
            tag: tag.to_string(),
            message: format!("{}", e),
        })?;

        let data_error = |e: &dyn fmt::Display| CollateError::Data {
            tag: tag.to_string(),
            message: e.to_string(),
        };

        let full = Collator::try_new(locale.clone().into(), CollatorOptions::default())
            .map_err(|e| data_error(&e))?;

        let mut options = CollatorOptions::default();
        options.strength = Some(Strength::Primary);
        let primary =
            Collator::try_new(locale.clone().into(), options).map_err(|e| data_error(&e))?;

        tracing::debug!(%tag, locale = %locale, "loaded collation");
        Ok(Collation {
            tag: locale.to_string(),
            full,
            primary,
        })
    }

    /// CLDR root order
    pub fn root() -> Result<Self, CollateError> {
        Self::for_locale("root")
    }

    /// Normalized BCP-47 tag, `und` for root
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Sort order for display: base letters, then accents, then case. Strings
    /// the collator considers equal are ordered by their code points.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.full.compare(a, b).then_with(|| a.cmp(b))
    }

    pub fn compare_primary(&self, a: &str, b: &str) -> Ordering {
        self.primary.compare(a, b)
    }

    /// True when `a` and `b` differ in their base letters, ignoring accents
    /// and case (unless the locale makes an accent a letter of its own)
    pub fn primary_difference(&self, a: &str, b: &str) -> bool {
        self.compare_primary(a, b) != Ordering::Equal
    }

    /// First letter of `text` as it should appear in an alphabet index.
    /// Returns `None` for empty or whitespace-only text.
    pub fn first_letter(&self, text: &str) -> Option<String> {
        let normalized: String = text.trim_start().nfkc().collect();
        if normalized.trim().is_empty() {
            return None;
        }
        let graphemes: Vec<&str> = normalized.graphemes(true).take(MAX_CONTRACTION).collect();

        let len = (2..=graphemes.len())
            .rev()
            .find(|&k| self.is_contraction(&graphemes[..k]))
            .unwrap_or(1);
        Some(self.display_letter(&graphemes[..len]))
    }

    /// `parts` collate as one letter when they sort after everything that
    /// merely continues their shorter prefix
    fn is_contraction(&self, parts: &[&str]) -> bool {
        let Some((_, prefix)) = parts.split_last() else {
            return false;
        };
        let whole = parts.concat();
        let mut bound = prefix.concat();
        bound.push(LAST_PRIMARY);
        self.compare_primary(&whole, &bound) == Ordering::Greater
    }

    /// Upper-case the first grapheme when that keeps both its length (`ß`
    /// would become `SS`) and its primary weight (Turkish `i` would become
    /// dotless `I`); lower-case the rest of a contraction
    fn display_letter(&self, parts: &[&str]) -> String {
        let Some((first, rest)) = parts.split_first() else {
            return String::new();
        };
        let upper = first.to_uppercase();
        let mut letter = if upper.chars().count() == first.chars().count()
            && !self.primary_difference(&upper, first)
        {
            upper
        } else {
            first.to_string()
        };
        for part in rest {
            letter.push_str(&part.to_lowercase());
        }
        letter
    }
}

/// `cs_CZ.UTF-8` -> `cs-CZ`, `sr_RS@latin` -> `sr-Latn-RS`, `C` -> `und`
fn bcp47_tag(tag: &str) -> String {
    let tag = tag.trim();
    let (base, modifier) = match tag.split_once('@') {
        Some((base, modifier)) => (base, Some(modifier)),
        None => (tag, None),
    };
    let base = base.split('.').next().unwrap_or("");
    if matches!(base, "" | "C" | "POSIX" | "root") {
        return "und".to_string();
    }

    let mut parts: Vec<&str> = base.split(['_', '-']).collect();
    let script = match modifier {
        Some("latin") => Some("Latn"),
        Some("cyrillic") => Some("Cyrl"),
        _ => None,
    };
    if let Some(script) = script {
        parts.insert(1.min(parts.len()), script);
    }
    parts.join("-")
}
