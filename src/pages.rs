//! Place index page and individual place pages

use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use crate::collate::Collation;
use crate::config::ReportOptions;
use crate::coords::{conv_lat_lon, parse_coordinate, Axis, CoordFormat};
use crate::html::{
    alphabet_navigation, html_escape, letter_anchor, page_footer, page_header, NBSP,
};
use crate::index::{
    build_index_list, resolve_row_letter, sort_places, starts_new_group, IndexLetter, IndexList,
};
use crate::store;
use crate::types::{display_title, main_location, Place, PlaceType};

const PLACES_DIR: &str = "places";
const IMAGES_DIR: &str = "images";
const MEDIA_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

/// Location rows of the place summary, outermost last
const LOCATION_ROWS: &[(PlaceType, &str)] = &[
    (PlaceType::Street, "Street"),
    (PlaceType::Locality, "Locality"),
    (PlaceType::City, "City"),
    (PlaceType::Parish, "Church Parish"),
    (PlaceType::County, "County"),
    (PlaceType::State, "State/ Province"),
    (PlaceType::Province, "State/ Province"),
    (PlaceType::Country, "Country"),
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub index_rows: usize,
    pub letters: usize,
    pub place_pages: usize,
}

/// Everything the renderers read. Built once, then shared read-only.
struct Site<'a> {
    options: &'a ReportOptions,
    collation: &'a Collation,
    places: HashMap<String, Place>,
    output_dir: &'a Path,
}

/// Directory-safe form of a place handle
fn page_slug(handle: &str) -> String {
    handle
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn place_url(handle: &str) -> String {
    format!("/{}/{}/", PLACES_DIR, page_slug(handle))
}

fn place_link(place: &Place, label: &str) -> String {
    format!(
        r#"<a href="{}" title="{}">{}</a>"#,
        place_url(&place.handle),
        html_escape(label),
        html_escape(label)
    )
}

/// Coordinates for display, `None` if missing or unreadable
fn display_coordinates(place: &Place, format: CoordFormat) -> Option<(String, String)> {
    let (lat, lon) = (place.latitude.as_deref()?, place.longitude.as_deref()?);
    match conv_lat_lon(lat, lon, format) {
        Ok(pair) => Some(pair),
        Err(e) => {
            tracing::warn!(place = %place.gramps_id, error = %e, "ignoring coordinates");
            None
        }
    }
}

impl<'a> Site<'a> {
    fn generate_index_page(
        &self,
        rows: &[(String, String)],
        index_list: &IndexList,
    ) -> Result<usize> {
        let page_dir = self.output_dir.join(PLACES_DIR);
        fs::create_dir_all(&page_dir)?;

        let mut html = page_header(&self.options.title, "Places", "/places/");
        html.push_str(r#"<div class="content" id="Places">"#);
        html.push_str(
            r#"<p id="description">This page contains an index of all the places in the database, sorted by their title. Clicking on a place&#8217;s title will take you to that place&#8217;s page.</p>"#,
        );

        if let Some(nav) = alphabet_navigation(index_list, self.options.nav_columns) {
            html.push_str(&nav);
        }

        html.push_str(r#"<table class="infolist primobjlist placelist"><thead><tr>"#);
        let mut headings = vec![
            ("Letter", "ColumnLetter"),
            ("Name", "ColumnName"),
            ("State/ Province", "ColumnState"),
            ("Country", "ColumnCountry"),
        ];
        if self.options.coordinates {
            headings.push(("Latitude", "ColumnLatitude"));
            headings.push(("Longitude", "ColumnLongitude"));
        }
        for (label, class) in headings {
            html.push_str(&format!(r#"<th class="{}">{}</th>"#, class, label));
        }
        html.push_str("</tr></thead><tbody>");

        let mut last_change = 0;
        let mut previous = IndexLetter::Placeholder;
        let mut first = true;
        let mut written = 0;

        for (name, handle) in rows {
            let Some(place) = self.places.get(handle) else {
                tracing::warn!(%name, %handle, "index row points at a missing place");
                continue;
            };
            last_change = last_change.max(place.change_time);

            let letter = resolve_row_letter(name, index_list, self.collation)
                .with_context(|| format!("Alphabet index is out of step with place '{}'", name))?;

            let letter_cell = if starts_new_group(&letter, &previous, self.collation, first) {
                first = false;
                html.push_str(r#"<tr class="BeginLetter">"#);
                match letter.as_str() {
                    Some(l) => format!(
                        r#"<a name="{}" id="{}" title="Places beginning with letter {}">{}</a>"#,
                        letter_anchor(l),
                        letter_anchor(l),
                        html_escape(l),
                        html_escape(l)
                    ),
                    None => NBSP.to_string(),
                }
            } else {
                html.push_str("<tr>");
                NBSP.to_string()
            };
            previous = letter;

            let location = main_location(place, &self.places);
            let state = location
                .iter()
                .find(|(t, _)| t.is_state_like())
                .map(|(_, n)| html_escape(n))
                .unwrap_or_else(|| NBSP.to_string());
            let country = location
                .get(&PlaceType::Country)
                .map(|n| html_escape(n))
                .unwrap_or_else(|| NBSP.to_string());

            html.push_str(&format!(
                r#"<td class="ColumnLetter">{}</td><td class="ColumnName">{}</td><td class="ColumnState">{}</td><td class="ColumnCountry">{}</td>"#,
                letter_cell,
                place_link(place, name),
                state,
                country
            ));

            if self.options.coordinates {
                let (lat, lon) = display_coordinates(place, CoordFormat::Deg)
                    .unwrap_or_else(|| (NBSP.to_string(), NBSP.to_string()));
                html.push_str(&format!(
                    r#"<td class="ColumnLatitude">{}</td><td class="ColumnLongitude">{}</td>"#,
                    lat, lon
                ));
            }
            html.push_str("</tr>\n");
            written += 1;
        }

        html.push_str("</tbody></table></div>");
        html.push_str(&page_footer(last_change));
        fs::write(page_dir.join("index.html"), html)?;

        Ok(written)
    }

    fn generate_place_page(&self, place: &Place) -> Result<()> {
        let page_dir = self.output_dir.join(PLACES_DIR).join(page_slug(&place.handle));
        fs::create_dir_all(&page_dir)?;

        let title = display_title(place, &self.places);
        let mut html = page_header(&self.options.title, &title, "");

        html.push_str(&format!(
            r#"<nav class="breadcrumb">
    <a href="/places/">Places</a> <span>/</span>
    <span>{}</span>
</nav>
"#,
            html_escape(&place.name)
        ));

        html.push_str(r#"<div class="content" id="PlaceDetail">"#);

        let media = if self.options.include_media {
            self.link_media(place)?
        } else {
            Vec::new()
        };
        if let Some(first) = media.first() {
            html.push_str(&format!(
                r#"<div class="thumbnail"><img src="{}" alt="{}"></div>"#,
                html_escape(first),
                html_escape(&place.name)
            ));
        }

        html.push_str(&format!("<h3>{}</h3>", html_escape(&place.name)));

        html.push_str(r#"<div id="summaryarea"><table class="infolist place"><tbody>"#);
        html.push_str(&self.summary_rows(place));
        html.push_str("</tbody></table></div>");

        if media.len() > 1 {
            html.push_str(r#"<div id="gallery"><h4>Media</h4><div class="gallery">"#);
            for url in &media[1..] {
                html.push_str(&format!(
                    r#"<a href="{}"><img src="{}" alt="{}"></a>"#,
                    html_escape(url),
                    html_escape(url),
                    html_escape(&place.name)
                ));
            }
            html.push_str("</div></div>");
        }

        if !place.notes.is_empty() {
            html.push_str(r#"<div id="notes"><h4>Notes</h4>"#);
            for note in &place.notes {
                for paragraph in note.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
                    html.push_str(&format!("<p>{}</p>", html_escape(paragraph)));
                }
            }
            html.push_str("</div>");
        }

        if !place.urls.is_empty() {
            html.push_str(r#"<div id="WebLinks"><h4>Web Links</h4><ul>"#);
            for url in &place.urls {
                let label = url.description.as_deref().unwrap_or(&url.path);
                html.push_str(&format!(
                    r#"<li><a href="{}">{}</a></li>"#,
                    html_escape(&url.path),
                    html_escape(label)
                ));
            }
            html.push_str("</ul></div>");
        }

        if self.options.place_map_pages {
            if let Some(markers) = map_markers(place, &title) {
                html.push_str("<h4>Place Map</h4>");
                html.push_str(r#"<div id="map_canvas"></div>"#);
                html.push_str(&format!(
                    r#"<script type="application/json" id="map-markers">{}</script>"#,
                    markers
                ));
            }
        }

        html.push_str(&source_references(place));
        html.push_str(&back_references(place));

        html.push_str("</div>");
        html.push_str(&page_footer(place.change_time));
        fs::write(page_dir.join("index.html"), html)?;

        Ok(())
    }

    fn summary_rows(&self, place: &Place) -> String {
        let mut rows: Vec<(&str, String)> = vec![("Gramps ID", html_escape(&place.gramps_id))];
        if place.place_type != PlaceType::Unknown {
            rows.push(("Type", html_escape(place.place_type.as_str())));
        }
        if let Some(code) = &place.code {
            rows.push(("Code", html_escape(code)));
        }
        if let Some((lat, lon)) = display_coordinates(place, CoordFormat::Deg) {
            rows.push(("Latitude", lat));
            rows.push(("Longitude", lon));
        }

        let location = main_location(place, &self.places);
        for (place_type, label) in LOCATION_ROWS {
            if *place_type == place.place_type {
                continue;
            }
            if let Some(name) = location.get(place_type) {
                rows.push((*label, html_escape(name)));
            }
        }

        for alt in &place.alt_names {
            rows.push(("Alternate Name", html_escape(alt)));
        }

        rows.iter()
            .map(|(label, value)| {
                format!(
                    r#"<tr><td class="ColumnAttribute">{}</td><td class="ColumnValue">{}</td></tr>"#,
                    label, value
                )
            })
            .collect()
    }

    /// Symlink the place's media into the output, returning their URLs.
    /// Link names carry the media's position so equal file names from
    /// different directories stay apart.
    fn link_media(&self, place: &Place) -> Result<Vec<String>> {
        let slug = page_slug(&place.handle);
        let images_dir = self.output_dir.join(IMAGES_DIR).join(&slug);
        let mut urls = Vec::new();

        for (position, media) in place.media.iter().enumerate() {
            let path = PathBuf::from(media);
            let source = if path.is_absolute() {
                path
            } else {
                self.options.media_dir.join(path)
            };

            let ext = source
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            if !MEDIA_EXTENSIONS.contains(&ext.as_str()) {
                tracing::debug!(place = %place.gramps_id, %media, "not an image, skipped");
                continue;
            }
            if !source.is_file() {
                tracing::warn!(
                    place = %place.gramps_id,
                    path = %source.display(),
                    "media file not found"
                );
                continue;
            }
            let Some(filename) = source.file_name() else {
                continue;
            };

            let link_name = format!("{}_{}", position + 1, filename.to_string_lossy());

            fs::create_dir_all(&images_dir)?;
            let link_path = images_dir.join(&link_name);
            if link_path.symlink_metadata().is_ok() {
                fs::remove_file(&link_path)
                    .with_context(|| format!("Failed to replace {}", link_path.display()))?;
            }
            let abs_source = fs::canonicalize(&source)
                .with_context(|| format!("Failed to resolve {}", source.display()))?;
            symlink(&abs_source, &link_path)
                .with_context(|| format!("Failed to link {}", link_path.display()))?;

            urls.push(format!("/{}/{}/{}", IMAGES_DIR, slug, link_name));
        }

        Ok(urls)
    }
}

/// JSON marker list for the map canvas, `None` without valid coordinates
fn map_markers(place: &Place, title: &str) -> Option<String> {
    if !place.has_coordinates() {
        return None;
    }
    let lat = parse_coordinate(place.latitude.as_deref()?, Axis::Latitude).ok()?;
    let lon = parse_coordinate(place.longitude.as_deref()?, Axis::Longitude).ok()?;
    let markers = serde_json::json!([{
        "title": title,
        "latitude": lat,
        "longitude": lon,
        "zoom": 10,
    }]);
    // Keep "</script>" inside titles from closing the element
    Some(markers.to_string().replace("</", "<\\/"))
}

/// Numbered source list; citations of the same source are grouped
fn source_references(place: &Place) -> String {
    if place.citations.is_empty() {
        return String::new();
    }

    let mut sources: Vec<(&str, Vec<&str>)> = Vec::new();
    for citation in &place.citations {
        let idx = match sources.iter().position(|(s, _)| *s == citation.source) {
            Some(i) => i,
            None => {
                sources.push((citation.source.as_str(), Vec::new()));
                sources.len() - 1
            }
        };
        if let Some(page) = citation.page.as_deref() {
            if !sources[idx].1.contains(&page) {
                sources[idx].1.push(page);
            }
        }
    }

    let mut html = String::from(r#"<div id="sourcerefs"><h4>Source References</h4><ol>"#);
    for (source, pages) in &sources {
        html.push_str(&format!("<li>{}", html_escape(source)));
        if !pages.is_empty() {
            html.push_str(r#"<ol type="a">"#);
            for page in pages {
                html.push_str(&format!("<li>Page: {}</li>", html_escape(page)));
            }
            html.push_str("</ol>");
        }
        html.push_str("</li>");
    }
    html.push_str("</ol></div>");
    html
}

fn back_references(place: &Place) -> String {
    if place.backrefs.is_empty() {
        return String::new();
    }
    let mut html = String::from(r#"<div id="references"><h4>References</h4><ol>"#);
    for backref in &place.backrefs {
        html.push_str(&format!(
            r#"<li><span class="reftype">{}</span> {} <span class="grampsid">[{}]</span></li>"#,
            html_escape(&backref.kind),
            html_escape(&backref.label),
            html_escape(&backref.gramps_id)
        ));
    }
    html.push_str("</ol></div>");
    html
}

/// Render the index page and one page per place into `output_dir`
pub fn generate_site(
    places: Vec<Place>,
    options: &ReportOptions,
    collation: &Collation,
    output_dir: &Path,
) -> Result<GenerateSummary> {
    let names = store::name_source(&places);
    for (name, handles) in &names {
        tracing::debug!(%name, ?handles, "place name");
    }

    let site = Site {
        options,
        collation,
        places: places.into_iter().map(|p| (p.handle.clone(), p)).collect(),
        output_dir,
    };

    let rows = sort_places(&names, collation);
    let index_list = build_index_list(rows.iter().map(|(name, _)| name), collation);
    tracing::info!(
        letters = index_list.len(),
        rows = rows.len(),
        locale = collation.tag(),
        "built alphabet index"
    );

    let index_rows = site.generate_index_page(&rows, &index_list)?;

    let mut ordered: Vec<&Place> = site.places.values().collect();
    ordered.sort_by(|a, b| a.gramps_id.cmp(&b.gramps_id));
    let chunk_size = ordered.len().div_ceil(options.render_threads.max(1)).max(1);

    std::thread::scope(|scope| -> Result<()> {
        let site = &site;
        let handles: Vec<_> = ordered
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || -> Result<()> {
                    for place in chunk {
                        tracing::debug!(place = %place.gramps_id, "rendering place page");
                        site.generate_place_page(place).with_context(|| {
                            format!("Failed to render place {}", place.gramps_id)
                        })?;
                    }
                    Ok(())
                })
            })
            .collect();

        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow!("Place page renderer panicked"))??;
        }
        Ok(())
    })?;

    Ok(GenerateSummary {
        index_rows,
        letters: index_list.len(),
        place_pages: ordered.len(),
    })
}

/// Main generation function
pub fn run_generate(db_path: &Path, options: &ReportOptions) -> Result<GenerateSummary> {
    let collation = options.collation()?;

    println!("Loading places...");
    let conn = store::open(db_path)?;
    let places = store::load_places(&conn)?;
    println!("Loaded {} places", places.len());

    if places.is_empty() {
        bail!("No places found in {}. Run 'place-pages import' first.", db_path.display());
    }

    let output_dir = &options.output_dir;
    if output_dir.exists() {
        fs::remove_dir_all(output_dir)?;
    }
    fs::create_dir_all(output_dir)?;

    println!("Generating place pages...");
    let summary = generate_site(places, options, &collation, output_dir)?;

    println!(
        "Done! {} index rows under {} letters, {} place pages in {}/",
        summary.index_rows,
        summary.letters,
        summary.place_pages,
        output_dir.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BackRef, Citation, PlaceUrl};
    use scraper::{Html, Selector};

    fn place(
        handle: &str,
        id: &str,
        name: &str,
        place_type: PlaceType,
        parent: Option<&str>,
    ) -> Place {
        Place {
            handle: handle.to_string(),
            gramps_id: id.to_string(),
            name: name.to_string(),
            place_type,
            enclosed_by: parent.map(String::from),
            change_time: 1_600_000_000,
            ..Default::default()
        }
    }

    fn places() -> Vec<Place> {
        let mut paris = place("h3", "P0003", "Paris", PlaceType::City, Some("h2"));
        paris.latitude = Some("48.8566".to_string());
        paris.longitude = Some("2.3522".to_string());
        paris.alt_names = vec!["Lutèce".to_string()];
        paris.notes = vec!["Capital.\n\nOn the Seine.".to_string()];
        paris.urls = vec![PlaceUrl {
            path: "https://paris.fr".to_string(),
            description: None,
        }];
        paris.citations = vec![
            Citation {
                source: "État civil".to_string(),
                page: Some("f. 3".to_string()),
            },
            Citation {
                source: "État civil".to_string(),
                page: Some("f. 9".to_string()),
            },
        ];
        paris.backrefs = vec![BackRef {
            kind: "Event".to_string(),
            gramps_id: "E0001".to_string(),
            label: "Birth of Jean <Dupont>".to_string(),
        }];
        paris.change_time = 1_700_000_000;

        vec![
            place("h1", "P0001", "France", PlaceType::Country, None),
            place("h2", "P0002", "Île-de-France", PlaceType::State, Some("h1")),
            paris,
            place("h4", "P0004", "Évreux", PlaceType::City, Some("h1")),
            place("h5", "P0005", "Lyon", PlaceType::City, Some("h1")),
        ]
    }

    fn texts(doc: &Html, selector: &str) -> Vec<String> {
        let selector = Selector::parse(selector).unwrap();
        doc.select(&selector)
            .map(|e| e.text().collect::<String>())
            .collect()
    }

    fn render(options: &ReportOptions) -> (tempfile::TempDir, GenerateSummary) {
        let dir = tempfile::tempdir().unwrap();
        let collation = options.collation().unwrap();
        let summary = generate_site(places(), options, &collation, dir.path()).unwrap();
        (dir, summary)
    }

    #[test]
    fn test_index_anchors_match_navigation() {
        let options = ReportOptions {
            coordinates: true,
            ..Default::default()
        };
        let (dir, summary) = render(&options);
        assert_eq!(
            summary,
            GenerateSummary {
                index_rows: 6,
                letters: 5,
                place_pages: 5,
            }
        );

        let html = fs::read_to_string(dir.path().join("places/index.html")).unwrap();
        let doc = Html::parse_document(&html);

        let nav = texts(&doc, "#alphanav a");
        assert_eq!(nav, vec!["É", "F", "Î", "L", "P"]);
        let anchors = texts(&doc, "td.ColumnLetter a");
        assert_eq!(anchors, nav);

        let names = texts(&doc, "td.ColumnName a");
        assert_eq!(
            names,
            vec!["Évreux", "France", "Île-de-France", "Lutèce", "Lyon", "Paris"]
        );
        assert_eq!(texts(&doc, "tr.BeginLetter").len(), 5);
        assert!(html.contains("48°51'23.76\"N"));
    }

    #[test]
    fn test_index_columns_without_coordinates() {
        let (dir, _) = render(&ReportOptions::default());
        let html = fs::read_to_string(dir.path().join("places/index.html")).unwrap();
        let doc = Html::parse_document(&html);
        assert!(texts(&doc, "th.ColumnLatitude").is_empty());

        let paris_row = Selector::parse("tbody tr").unwrap();
        let row = doc
            .select(&paris_row)
            .find(|r| r.text().any(|t| t == "Paris"))
            .unwrap();
        let cells: Vec<String> = row.text().map(str::to_string).collect();
        assert!(cells.contains(&"Île-de-France".to_string()));
        assert!(cells.contains(&"France".to_string()));
    }

    #[test]
    fn test_place_page_sections() {
        let options = ReportOptions {
            place_map_pages: true,
            ..Default::default()
        };
        let (dir, _) = render(&options);
        let html = fs::read_to_string(dir.path().join("places/h3/index.html")).unwrap();
        let doc = Html::parse_document(&html);

        assert_eq!(texts(&doc, "h3"), vec!["Paris"]);
        assert_eq!(texts(&doc, "title"), vec!["Paris, Île-de-France, France - Places"]);
        let summary = texts(&doc, "td.ColumnValue");
        assert!(summary.contains(&"P0003".to_string()));
        assert!(summary.contains(&"Lutèce".to_string()));
        assert!(summary.contains(&"France".to_string()));

        assert_eq!(texts(&doc, "#notes p"), vec!["Capital.", "On the Seine."]);
        assert_eq!(texts(&doc, "#WebLinks a"), vec!["https://paris.fr"]);
        assert_eq!(texts(&doc, "#sourcerefs > ol > li > ol > li").len(), 2);
        assert_eq!(
            texts(&doc, "#references li"),
            vec!["Event Birth of Jean <Dupont> [E0001]"]
        );

        let markers = texts(&doc, "#map-markers").join("");
        let json: serde_json::Value = serde_json::from_str(&markers).unwrap();
        assert_eq!(json[0]["title"], "Paris, Île-de-France, France");
        assert!((json[0]["latitude"].as_f64().unwrap() - 48.8566).abs() < 1e-9);
    }

    #[test]
    fn test_place_without_coordinates_has_no_map() {
        let options = ReportOptions {
            place_map_pages: true,
            ..Default::default()
        };
        let (dir, _) = render(&options);
        let html = fs::read_to_string(dir.path().join("places/h5/index.html")).unwrap();
        assert!(!html.contains("map_canvas\"></div>"));
        assert!(!html.contains("Source References"));
    }

    #[test]
    fn test_media_is_linked() {
        let media_dir = tempfile::tempdir().unwrap();
        fs::write(media_dir.path().join("lyon.jpg"), b"jpeg").unwrap();
        fs::write(media_dir.path().join("lyon2.png"), b"png").unwrap();

        let mut all = places();
        all[4].media = vec![
            "lyon.jpg".to_string(),
            "missing.jpg".to_string(),
            "lyon2.png".to_string(),
            "notes.txt".to_string(),
        ];

        let options = ReportOptions {
            media_dir: media_dir.path().to_path_buf(),
            ..Default::default()
        };
        let out = tempfile::tempdir().unwrap();
        let collation = options.collation().unwrap();
        generate_site(all, &options, &collation, out.path()).unwrap();

        assert!(out.path().join("images/h5/1_lyon.jpg").is_symlink());
        let html = fs::read_to_string(out.path().join("places/h5/index.html")).unwrap();
        assert!(html.contains(r#"<div class="thumbnail"><img src="/images/h5/1_lyon.jpg""#));
        assert!(html.contains(r#"<img src="/images/h5/3_lyon2.png""#));
        assert!(!html.contains("missing.jpg"));
    }

    #[test]
    fn test_media_with_same_file_name_kept_apart() {
        let media_dir = tempfile::tempdir().unwrap();
        for dir in ["old", "new"] {
            fs::create_dir(media_dir.path().join(dir)).unwrap();
            fs::write(media_dir.path().join(dir).join("church.jpg"), dir).unwrap();
        }

        let mut all = places();
        all[4].media = vec!["old/church.jpg".to_string(), "new/church.jpg".to_string()];
        let options = ReportOptions {
            media_dir: media_dir.path().to_path_buf(),
            ..Default::default()
        };
        let out = tempfile::tempdir().unwrap();
        let collation = options.collation().unwrap();
        generate_site(all.clone(), &options, &collation, out.path()).unwrap();
        // Rendering again over the same output replaces the links
        generate_site(all, &options, &collation, out.path()).unwrap();

        let images = out.path().join("images/h5");
        assert_eq!(fs::read_to_string(images.join("1_church.jpg")).unwrap(), "old");
        assert_eq!(fs::read_to_string(images.join("2_church.jpg")).unwrap(), "new");
    }

    #[test]
    fn test_zero_render_threads_still_renders() {
        let options = ReportOptions {
            render_threads: 0,
            ..Default::default()
        };
        let (dir, summary) = render(&options);
        assert_eq!(summary.place_pages, 5);
        assert!(dir.path().join("places/h1/index.html").is_file());
    }

    #[test]
    fn test_locale_changes_letter_groups() {
        let mut all = places();
        all.push(place("h6", "P0006", "Chartres", PlaceType::City, Some("h1")));
        all.push(place("h7", "P0007", "Cannes", PlaceType::City, Some("h1")));
        let options = ReportOptions {
            locale: "cs".to_string(),
            ..Default::default()
        };
        let out = tempfile::tempdir().unwrap();
        let collation = options.collation().unwrap();
        generate_site(all, &options, &collation, out.path()).unwrap();

        let html = fs::read_to_string(out.path().join("places/index.html")).unwrap();
        let doc = Html::parse_document(&html);
        assert_eq!(texts(&doc, "#alphanav a"), vec!["C", "É", "F", "Ch", "Î", "L", "P"]);
        assert_eq!(texts(&doc, "td.ColumnLetter a"), texts(&doc, "#alphanav a"));
    }

    #[test]
    fn test_page_slug() {
        assert_eq!(page_slug("_p0001"), "_p0001");
        assert_eq!(page_slug("a/b c"), "a-b-c");
        assert_eq!(place_url("a/b"), "/places/a-b/");
    }

    #[test]
    fn test_run_generate_requires_places() {
        let dir = tempfile::tempdir().unwrap();
        let options = ReportOptions {
            output_dir: dir.path().join("out"),
            ..Default::default()
        };
        assert!(run_generate(&dir.path().join("empty.db"), &options).is_err());
    }
}
