//! Directory listing pages
//!
//! Renders the ordered entry sequence as a browsable HTML page or, for
//! clients asking for JSON, a machine-readable document. Pure string
//! building over a [`Listing`]; the filesystem work already happened.

use crate::share::{format_size, EntryKind, Listing};
use chrono::{DateTime, Local, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::time::SystemTime;

/// Characters percent-encoded inside href path segments.
const HREF_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'?')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'/')
    .add(b'\\');

const PAGE_STYLE: &str = "body{font-family:monospace;margin:2em auto;max-width:60em;padding:0 1em}\
h1{font-size:1.2em;word-break:break-all}\
table{border-collapse:collapse;width:100%}\
td,th{text-align:left;padding:.25em .8em .25em 0;border-bottom:1px solid #ddd}\
td.name{word-break:break-all}\
tfoot td{color:#666;border-bottom:none}\
a{text-decoration:none}a:hover{text-decoration:underline}";

/// Render the browsable HTML page for one directory.
#[must_use]
pub fn render_html(relative: &str, listing: &Listing) -> String {
    let title = html_escape(&display_path(relative));
    let mut rows = String::new();

    if !relative.is_empty() {
        rows.push_str("<tr><td class=\"name\"><a href=\"../\">../</a></td><td></td><td></td></tr>\n");
    }

    for entry in &listing.entries {
        let href = utf8_percent_encode(&entry.name, HREF_SEGMENT);
        let name = html_escape(&entry.name);
        let when = modified_display(entry.modified);
        match entry.kind {
            EntryKind::Directory => rows.push_str(&format!(
                "<tr><td class=\"name\"><a href=\"{href}/\">{name}/</a></td><td>-</td><td>{when}</td></tr>\n"
            )),
            EntryKind::File => rows.push_str(&format!(
                "<tr><td class=\"name\"><a href=\"{href}\">{name}</a></td><td>{}</td><td>{when}</td></tr>\n",
                format_size(entry.size)
            )),
        }
    }

    if listing.entries.is_empty() {
        rows.push_str("<tr><td colspan=\"3\">(empty directory)</td></tr>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<link rel=\"icon\" href=\"data:,\">\n\
<title>Index of {title}</title>\n<style>{PAGE_STYLE}</style>\n</head>\n<body>\n\
<h1>Index of {title}</h1>\n\
<table>\n<thead><tr><th>Name</th><th>Size</th><th>Modified</th></tr></thead>\n\
<tbody>\n{rows}</tbody>\n\
<tfoot><tr><td colspan=\"3\">{} file(s), {} folder(s), {} total</td></tr></tfoot>\n\
</table>\n</body>\n</html>\n",
        listing.file_count,
        listing.dir_count,
        format_size(listing.total_bytes),
    )
}

/// Render the JSON document for one directory.
#[must_use]
pub fn render_json(relative: &str, listing: &Listing) -> String {
    let entries: Vec<serde_json::Value> = listing
        .entries
        .iter()
        .map(|e| {
            serde_json::json!({
                "name": e.name,
                "kind": e.kind.as_str(),
                "size": e.size,
                "modified": e.modified.map(|t| DateTime::<Utc>::from(t).to_rfc3339()),
            })
        })
        .collect();

    serde_json::json!({
        "path": display_path(relative),
        "entries": entries,
        "file_count": listing.file_count,
        "dir_count": listing.dir_count,
        "total_bytes": listing.total_bytes,
    })
    .to_string()
}

/// `""` is the root; everything else displays slash-wrapped.
fn display_path(relative: &str) -> String {
    if relative.is_empty() {
        "/".to_string()
    } else {
        format!("/{relative}/")
    }
}

fn modified_display(modified: Option<SystemTime>) -> String {
    modified.map_or_else(
        || "-".to_string(),
        |t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
