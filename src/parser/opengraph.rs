//! Lenient extraction of Open Graph tags and the document title.
//!
//! This is tag scanning, not a DOM parser. Broken markup never fails; it
//! just yields fewer matches.

use regex::Regex;
use std::sync::OnceLock;

/// Metadata found in a page. Missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub image: String,
}

struct HtmlRegex {
    meta: Regex,
    attribute: Regex,
    title: Regex,
}

impl HtmlRegex {
    fn get() -> Option<&'static Self> {
        static INSTANCE: OnceLock<Option<HtmlRegex>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                Some(Self {
                    meta: Regex::new(r"(?is)<meta\b([^>]*)>").ok()?,
                    attribute: Regex::new(
                        r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#,
                    )
                    .ok()?,
                    title: Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").ok()?,
                })
            })
            .as_ref()
    }
}

/// Reads `og:title`, `og:description` and `og:image` in that order. A
/// matching tag without `content` stops the scan, so it and every field
/// after it stay empty.
#[must_use]
pub fn parse_metadata(html: &str) -> PageMetadata {
    let mut page = PageMetadata::default();
    let Some(re) = HtmlRegex::get() else {
        return page;
    };

    page.title = match meta_property(re, html, "og:title") {
        MetaTag::Content(value) => value,
        MetaTag::Missing => document_title(re, html).unwrap_or_default(),
        MetaTag::NoContent => return page,
    };
    page.description = match meta_property(re, html, "og:description") {
        MetaTag::Content(value) => value,
        MetaTag::Missing => String::new(),
        MetaTag::NoContent => return page,
    };
    page.image = match meta_property(re, html, "og:image") {
        MetaTag::Content(value) => value,
        MetaTag::Missing => String::new(),
        MetaTag::NoContent => return page,
    };
    page
}

enum MetaTag {
    Missing,
    NoContent,
    Content(String),
}

/// Looks at the first `<meta property="...">` with the given name only.
fn meta_property(re: &HtmlRegex, html: &str, property: &str) -> MetaTag {
    let tag = re
        .meta
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|attrs| attributes(re, attrs.as_str()))
        .find(|attrs| {
            attrs
                .iter()
                .any(|(name, value)| name == "property" && value == property)
        });

    let Some(attrs) = tag else {
        return MetaTag::Missing;
    };
    attrs
        .into_iter()
        .find(|(name, _)| name == "content")
        .map_or(MetaTag::NoContent, |(_, value)| MetaTag::Content(value))
}

fn document_title(re: &HtmlRegex, html: &str) -> Option<String> {
    re.title
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| decode(m.as_str()).trim().to_string())
}

/// Attribute names are lower-cased; values are entity-decoded.
fn attributes(re: &HtmlRegex, tag: &str) -> Vec<(String, String)> {
    re.attribute
        .captures_iter(tag)
        .filter_map(|c| {
            let name = c.get(1)?.as_str().to_ascii_lowercase();
            let value = c.get(2).or_else(|| c.get(3)).or_else(|| c.get(4))?;
            Some((name, decode(value.as_str())))
        })
        .collect()
}

fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
