//! Netscape bookmark HTML reader.
//!
//! # Responsibility
//! - Flatten a browser bookmark export into links tagged with the name of
//!   their nearest enclosing folder.
//!
//! # Invariants
//! - Browser root folders (toolbar, menu, "other") map to "General".
//! - `place:` and `javascript:` urls are skipped, as are empty urls.
//! - `ADD_DATE` seconds become epoch milliseconds.

use crate::model::entity::new_entity_id;
use crate::model::link::{LinkItem, GENERAL_CATEGORY};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<h3\b(?P<folder_attrs>[^>]*)>(?P<folder>.*?)</h3\s*>|<a\b(?P<link_attrs>[^>]*)>(?P<title>.*?)</a\s*>|(?P<open><dl\b[^>]*>)|(?P<close></dl\s*>)",
    )
    .expect("valid bookmark token regex")
});
static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)([a-z_][a-z0-9_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").expect("valid entity regex")
});

const ROOT_FOLDER_NAMES: &[&str] = &[
    "bookmarks bar",
    "bookmarks menu",
    "bookmarks toolbar",
    "other bookmarks",
    "mobile bookmarks",
    "favorites bar",
];
const ROOT_FOLDER_MARKERS: &[&str] = &["personal_toolbar_folder", "unfiled_bookmarks_folder"];
const SKIPPED_SCHEMES: &[&str] = &["place:", "javascript:"];

/// One bookmark found in the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkEntry {
    pub url: String,
    pub title: String,
    pub category: String,
    pub created_at: i64,
}

impl BookmarkEntry {
    /// Converts the entry into a new link with a fresh id.
    pub fn into_link(self) -> LinkItem {
        LinkItem {
            id: new_entity_id(),
            url: self.url,
            title: self.title,
            category: self.category,
            created_at: self.created_at,
            order: None,
        }
    }
}

/// Parses bookmark HTML into entries in document order.
///
/// `fallback_created_at` is used for anchors without `ADD_DATE`.
pub fn parse_bookmarks(html: &str, fallback_created_at: i64) -> Vec<BookmarkEntry> {
    let mut folders: Vec<String> = Vec::new();
    let mut pending_folder: Option<String> = None;
    let mut entries = Vec::new();

    for token in TOKEN_RE.captures_iter(html) {
        if let Some(name) = token.name("folder") {
            let attrs = token.name("folder_attrs").map_or("", |m| m.as_str());
            pending_folder = Some(folder_category(attrs, name.as_str()));
        } else if token.name("open").is_some() {
            let inherited = folders
                .last()
                .cloned()
                .unwrap_or_else(|| GENERAL_CATEGORY.to_string());
            folders.push(pending_folder.take().unwrap_or(inherited));
        } else if token.name("close").is_some() {
            folders.pop();
            pending_folder = None;
        } else if let Some(entry) = read_anchor(&token, folders.last(), fallback_created_at) {
            entries.push(entry);
        }
    }
    entries
}

fn read_anchor(
    token: &Captures<'_>,
    folder: Option<&String>,
    fallback_created_at: i64,
) -> Option<BookmarkEntry> {
    let attrs = token.name("link_attrs")?.as_str();
    let url = attribute(attrs, "href")?.trim().to_string();
    if url.is_empty() || is_skipped_url(&url) {
        return None;
    }

    let title = token
        .name("title")
        .map(|m| text_content(m.as_str()))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| url.clone());
    let created_at = attribute(attrs, "add_date")
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .map_or(fallback_created_at, |seconds| seconds.saturating_mul(1000));

    Some(BookmarkEntry {
        url,
        title,
        category: folder
            .cloned()
            .unwrap_or_else(|| GENERAL_CATEGORY.to_string()),
        created_at,
    })
}

fn folder_category(attrs: &str, raw_name: &str) -> String {
    let name = text_content(raw_name);
    let is_root_marker = ROOT_FOLDER_MARKERS
        .iter()
        .any(|marker| attribute(attrs, marker).is_some());
    let is_root_name = ROOT_FOLDER_NAMES
        .iter()
        .any(|root| name.eq_ignore_ascii_case(root));

    if name.is_empty() || is_root_marker || is_root_name {
        GENERAL_CATEGORY.to_string()
    } else {
        name
    }
}

fn is_skipped_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Returns the decoded value of attribute `name` (case-insensitive).
fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTRIBUTE_RE.captures_iter(attrs).find_map(|caps| {
        if !caps[1].eq_ignore_ascii_case(name) {
            return None;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        Some(decode_entities(value))
    })
}

/// Strips nested tags, decodes entities and collapses surrounding space.
fn text_content(fragment: &str) -> String {
    decode_entities(&TAG_RE.replace_all(fragment, ""))
        .trim()
        .to_string()
}

fn decode_entities(value: &str) -> String {
    ENTITY_RE
        .replace_all(value, |caps: &Captures<'_>| {
            let entity = &caps[1];
            decode_entity(entity).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<String> {
    let code = if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(decimal) = entity.strip_prefix('#') {
        decimal.parse::<u32>().ok()?
    } else {
        let named = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{a0}',
            _ => return None,
        };
        return Some(named.to_string());
    };
    char::from_u32(code).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::{decode_entities, parse_bookmarks};

    const EXPORT: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
<DL><p>
    <DT><H3 ADD_DATE="1700000000" PERSONAL_TOOLBAR_FOLDER="true">Bookmarks bar</H3>
    <DL><p>
        <DT><A HREF="https://docs.rs/" ADD_DATE="1700000100">Docs.rs</A>
        <DT><H3>Dev &amp; Ops</H3>
        <DL><p>
            <DT><A HREF="https://ci.test/?a=1&amp;b=2" ADD_DATE="1700000200">CI</A>
            <DT><A HREF="javascript:alert(1)">Bookmarklet</A>
            <DT><A HREF="https://status.test/"></A>
        </DL><p>
        <DT><A HREF="place:sort=8">Recent</A>
    </DL><p>
    <DT><H3>Reading</H3>
    <DL><p>
        <DT><A HREF="https://blog.test/">Blog</A>
    </DL><p>
</DL><p>
"#;

    #[test]
    fn folders_become_categories_with_roots_as_general() {
        let entries = parse_bookmarks(EXPORT, 5);
        let summary: Vec<_> = entries
            .iter()
            .map(|entry| (entry.title.as_str(), entry.category.as_str()))
            .collect();
        assert_eq!(
            summary,
            [
                ("Docs.rs", "General"),
                ("CI", "Dev & Ops"),
                ("https://status.test/", "Dev & Ops"),
                ("Blog", "Reading"),
            ]
        );
    }

    #[test]
    fn add_date_becomes_milliseconds_and_urls_are_decoded() {
        let entries = parse_bookmarks(EXPORT, 5);
        assert_eq!(entries[0].created_at, 1_700_000_100_000);
        assert_eq!(entries[1].url, "https://ci.test/?a=1&b=2");
        assert_eq!(entries[3].created_at, 5);
    }

    #[test]
    fn numeric_entities_decode() {
        assert_eq!(decode_entities("caf&#233; &#x2764; &bogus;"), "café ❤ &bogus;");
    }
}
