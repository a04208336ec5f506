//! HTML building helpers shared by the place pages

use chrono::DateTime;

use crate::index::IndexList;

pub const NBSP: &str = "&nbsp;";

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Fragment id for an index letter; letters are used as-is, as the
/// navigation menu and the row anchors both go through here
pub fn letter_anchor(letter: &str) -> String {
    html_escape(letter)
}

/// "2024-03-01 14:22:05" for a unix timestamp, empty for 0
pub fn format_change_time(timestamp: i64) -> String {
    if timestamp <= 0 {
        return String::new();
    }
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// CSS styles for the site
pub fn css_styles() -> &'static str {
    r#"
:root {
    --primary: #3b4d2f;
    --primary-light: #5a7247;
    --bg: #f8f7f2;
    --card-bg: #ffffff;
    --text: #1f2419;
    --text-muted: #6b705f;
    --border: #e0ddd0;
    --shadow: 0 2px 4px rgba(0, 0, 0, 0.08);
    --radius: 6px;
}

* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

body {
    font-family: Georgia, 'Times New Roman', serif;
    background: var(--bg);
    color: var(--text);
    line-height: 1.6;
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    padding: 0 24px;
}

header {
    background: var(--primary);
    color: white;
    padding: 20px 0;
}

header h1 a {
    color: white;
    text-decoration: none;
}

header nav a {
    color: rgba(255, 255, 255, 0.9);
    margin-right: 20px;
    text-decoration: none;
}

header nav a.active {
    text-decoration: underline;
}

main {
    padding: 32px 0;
}

h3, h4 {
    color: var(--primary);
    margin: 24px 0 12px;
}

#description {
    margin-bottom: 24px;
    color: var(--text-muted);
}

/* Alphabet navigation */
#alphanav ul {
    list-style: none;
    display: flex;
    flex-wrap: wrap;
    gap: 6px;
    margin-bottom: 8px;
}

#alphanav a {
    display: block;
    min-width: 32px;
    padding: 4px 8px;
    text-align: center;
    background: var(--card-bg);
    border-radius: 4px;
    box-shadow: var(--shadow);
    color: var(--primary);
    text-decoration: none;
}

#alphanav a:hover {
    background: var(--primary);
    color: white;
}

/* Tables */
table.infolist {
    width: 100%;
    border-collapse: collapse;
    background: var(--card-bg);
    box-shadow: var(--shadow);
    border-radius: var(--radius);
    margin-top: 16px;
}

table.infolist th, table.infolist td {
    padding: 6px 10px;
    text-align: left;
    border-bottom: 1px solid var(--border);
}

table.infolist tr.BeginLetter td {
    border-top: 2px solid var(--primary-light);
}

td.ColumnLetter a {
    font-weight: bold;
    color: var(--primary);
}

td.ColumnAttribute {
    font-weight: 600;
    color: var(--text-muted);
    width: 30%;
}

.breadcrumb {
    margin-bottom: 16px;
    font-size: 0.9rem;
    color: var(--text-muted);
}

.breadcrumb a {
    color: var(--primary);
}

.thumbnail img, .gallery img {
    max-width: 200px;
    max-height: 200px;
    object-fit: contain;
    background: var(--card-bg);
    padding: 6px;
    box-shadow: var(--shadow);
}

.gallery {
    display: flex;
    flex-wrap: wrap;
    gap: 12px;
}

#map_canvas {
    height: 360px;
    border-radius: var(--radius);
    box-shadow: var(--shadow);
    background: #dde3d5;
}

footer {
    border-top: 1px solid var(--border);
    color: var(--text-muted);
    padding: 24px 0;
    margin-top: 48px;
    font-size: 0.85rem;
    text-align: center;
}

.fullclear {
    clear: both;
}
"#
}

/// Generate page header HTML
pub fn page_header(report_title: &str, page_title: &str, current_path: &str) -> String {
    let nav_items = [("/places/", "Places")];

    let nav_html: String = nav_items
        .iter()
        .map(|(path, label)| {
            let active = if *path == current_path {
                " class=\"active\""
            } else {
                ""
            };
            format!("<a href=\"{}\"{}>{}</a>", path, active, label)
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - {}</title>
    <style>{}</style>
</head>
<body>
    <header>
        <div class="container">
            <h1><a href="/places/">{}</a></h1>
            <nav>{}</nav>
        </div>
    </header>
    <main>
        <div class="container">
"#,
        html_escape(page_title),
        html_escape(report_title),
        css_styles(),
        html_escape(report_title),
        nav_html
    )
}

/// Generate page footer HTML; `last_change` is the newest change time shown
pub fn page_footer(last_change: i64) -> String {
    let changed = format_change_time(last_change);
    let changed_html = if changed.is_empty() {
        String::new()
    } else {
        format!("<p id=\"createdate\">Last change was the {}</p>", changed)
    };
    format!(
        r#"
            <div class="fullclear"></div>
        </div>
    </main>
    <footer>
        <div class="container">
            {}
            <p>Generated by place-pages</p>
        </div>
    </footer>
</body>
</html>
"#,
        changed_html
    )
}

/// Alphabet menu linking to the letter anchors of the index table, split
/// into rows of `columns` letters. `None` when there are no letters.
pub fn alphabet_navigation(index_list: &IndexList, columns: usize) -> Option<String> {
    if index_list.is_empty() {
        return None;
    }
    let letters: Vec<&str> = index_list.letters().collect();
    let mut html = String::from(r#"<div id="alphanav">"#);
    for row in letters.chunks(columns.max(1)) {
        html.push_str("<ul>");
        for letter in row {
            let escaped = html_escape(letter);
            html.push_str(&format!(
                r##"<li><a href="#{}" title="Places beginning with letter {}">{}</a></li>"##,
                letter_anchor(letter),
                escaped,
                escaped
            ));
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");
    Some(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collate::Collation;
    use crate::index::build_index_list;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("Bar & Grill"), "Bar &amp; Grill");
        assert_eq!(html_escape("<b>\"x\"</b>"), "&lt;b&gt;&quot;x&quot;&lt;/b&gt;");
        assert_eq!(html_escape("L'Aquila"), "L&#39;Aquila");
    }

    #[test]
    fn test_format_change_time() {
        assert_eq!(format_change_time(0), "");
        assert_eq!(format_change_time(1_700_000_000), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_alphabet_navigation_rows() {
        let root = Collation::root().unwrap();
        let list = build_index_list(["Arles", "Brest", "Caen", "Dijon", "Évian"], &root);
        let html = alphabet_navigation(&list, 2).unwrap();
        assert_eq!(html.matches("<ul>").count(), 3);
        assert!(html.contains(r##"<a href="#É" title="Places beginning with letter É">É</a>"##));
        assert!(alphabet_navigation(&build_index_list(Vec::<&str>::new(), &root), 26).is_none());
    }
}
