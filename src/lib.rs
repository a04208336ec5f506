//! Static HTML pages for genealogy places, with a locale-aware alphabet index

pub mod collate;
pub mod config;
pub mod coords;
pub mod html;
pub mod import;
pub mod index;
pub mod pages;
pub mod store;
pub mod types;
pub mod utils;

pub use collate::{CollateError, Collation};
pub use config::ReportOptions;
pub use index::{
    build_index_list, extract_index_letter, resolve_row_letter, sort_places, starts_new_group,
    IndexError, IndexLetter, IndexList,
};
pub use types::*;
