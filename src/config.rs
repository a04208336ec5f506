//! Report options loaded from a CONL file

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::collate::Collation;

pub const DEFAULT_CONFIG: &str = "report.conl";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_DB: &str = "places.db";

/// Options for one report run. Every key is optional:
///
/// ```text
/// title = Smith Family Places
/// locale = sv_SE
/// coordinates = true
/// place_map_pages = true
/// media_dir = media
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportOptions {
    pub title: String,
    /// Locale tag for sorting and index letters, BCP-47 or POSIX style
    pub locale: String,
    pub output_dir: PathBuf,
    /// Show latitude/longitude columns on the index page
    pub coordinates: bool,
    /// Embed a map marker on place pages with coordinates
    pub place_map_pages: bool,
    pub include_media: bool,
    /// Base directory for relative media paths
    pub media_dir: PathBuf,
    /// Letters per row of the alphabet menu
    pub nav_columns: usize,
    /// Number of threads rendering place pages
    pub render_threads: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            title: "Places".to_string(),
            locale: "en".to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            coordinates: false,
            place_map_pages: false,
            include_media: true,
            media_dir: PathBuf::from("."),
            nav_columns: 26,
            render_threads: 4,
        }
    }
}

impl ReportOptions {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read report options: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse report options: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let options: ReportOptions = serde_conl::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Options from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.nav_columns == 0 {
            anyhow::bail!("nav_columns must be at least 1");
        }
        if self.render_threads == 0 {
            anyhow::bail!("render_threads must be at least 1");
        }
        Ok(())
    }

    pub fn collation(&self) -> Result<Collation> {
        Collation::for_locale(&self.locale)
            .with_context(|| format!("Unusable locale '{}'", self.locale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_keys() {
        let options = ReportOptions::parse("title = Smith Family\ncoordinates = true\n").unwrap();
        assert_eq!(options.title, "Smith Family");
        assert!(options.coordinates);
        assert!(!options.place_map_pages);
        assert_eq!(options.locale, "en");
        assert_eq!(options.nav_columns, 26);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(ReportOptions::parse("mapservice = Google\n").is_err());
    }

    #[test]
    fn test_zero_columns_is_rejected() {
        assert!(ReportOptions::parse("nav_columns = 0\n").is_err());
    }

    #[test]
    fn test_locale_resolves_to_collation() {
        let options = ReportOptions::parse("locale = cs_CZ\n").unwrap();
        assert_eq!(options.collation().unwrap().tag(), "cs-CZ");

        let options = ReportOptions::parse("locale = uk_UA.UTF-8\n").unwrap();
        assert_eq!(options.collation().unwrap().tag(), "uk-UA");

        let options = ReportOptions::parse("locale = 12345678910\n").unwrap();
        assert!(options.collation().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let options = ReportOptions::load_or_default(&dir.path().join("absent.conl")).unwrap();
        assert_eq!(options.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }
}
