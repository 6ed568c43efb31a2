//! Parse `<sitemapindex>` and `<urlset>` documents.
//!
//! Elements are matched by local name, so `<url>`, `<sm:url>` and a `<url>`
//! in any default namespace are treated alike. Only direct children of the
//! root are entries, and only direct children of an entry are inspected.

use crate::error::{Result, SitemapError};
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// hreflang value that marks the language-neutral fallback.
pub const X_DEFAULT: &str = "x-default";

/// One localized variant advertised on a page entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HreflangAlternate {
    pub lang: String,
    pub href: String,
}

/// One `<url>` block of a leaf sitemap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    /// The `<loc>` child, if present and non-empty.
    pub loc: Option<String>,
    /// Every child carrying both `hreflang` and `href`, in document order.
    pub alternates: Vec<HreflangAlternate>,
}

impl PageEntry {
    /// The `x-default` alternate, if advertised.
    pub fn x_default(&self) -> Option<&str> {
        self.find_alternate(X_DEFAULT)
    }

    /// First alternate whose hreflang equals `lang` exactly.
    pub fn find_alternate(&self, lang: &str) -> Option<&str> {
        self.alternates
            .iter()
            .find(|a| a.lang == lang)
            .map(|a| a.href.as_str())
    }

    /// Pick the canonical URL for this entry.
    ///
    /// `<loc>` is the starting candidate, an `x-default` alternate replaces
    /// it, and the first tag in `preferred` that has a matching alternate
    /// replaces both. Preference order is the caller's, not the document's.
    pub fn canonical_url(&self, preferred: &[String]) -> Option<&str> {
        let mut candidate = self.loc.as_deref();

        if let Some(href) = self.x_default() {
            candidate = Some(href);
        }

        if let Some(href) = preferred.iter().find_map(|lang| self.find_alternate(lang)) {
            candidate = Some(href);
        }

        candidate
    }
}

/// Sitemap URLs referenced by a `<sitemapindex>`, deduplicated in document order.
pub fn parse_sitemap_index(url: &str, data: &[u8]) -> Result<Vec<String>> {
    let entries = read_entries(url, data, b"sitemap")?;
    let mut seen = HashSet::new();
    Ok(entries
        .into_iter()
        .flat_map(|e| e.locs)
        .filter(|loc| seen.insert(loc.clone()))
        .collect())
}

/// Page entries of a `<urlset>`.
pub fn parse_page_entries(url: &str, data: &[u8]) -> Result<Vec<PageEntry>> {
    let entries = read_entries(url, data, b"url")?;
    Ok(entries
        .into_iter()
        .map(|e| PageEntry {
            loc: e.locs.into_iter().next(),
            alternates: e.alternates,
        })
        .collect())
}

/// One canonical URL per page entry of a `<urlset>`.
pub fn extract_canonical_urls(
    url: &str,
    data: &[u8],
    preferred: &[String],
) -> Result<HashSet<String>> {
    let entries = parse_page_entries(url, data)?;
    Ok(entries
        .iter()
        .filter_map(|e| e.canonical_url(preferred))
        .map(str::to_string)
        .collect())
}

#[derive(Default)]
struct RawEntry {
    locs: Vec<String>,
    alternates: Vec<HreflangAlternate>,
}

/// Walk the document, collecting root children named `entry_name`.
fn read_entries(url: &str, data: &[u8], entry_name: &[u8]) -> Result<Vec<RawEntry>> {
    let parse_err = |reason: String| SitemapError::Parse {
        url: url.to_string(),
        reason,
    };

    let mut reader = quick_xml::Reader::from_reader(data);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut entries = Vec::new();
    let mut current: Option<RawEntry> = None;
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut in_loc = false;
    let mut loc_text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if depth == 0 {
                    if saw_root {
                        return Err(parse_err("multiple root elements".to_string()));
                    }
                    saw_root = true;
                }
                depth += 1;
                match depth {
                    2 if e.local_name().as_ref() == entry_name => {
                        current = Some(RawEntry::default());
                    }
                    3 => {
                        if let Some(entry) = current.as_mut() {
                            if e.local_name().as_ref() == b"loc" {
                                in_loc = true;
                                loc_text.clear();
                            } else if let Some(alt) = alternate_from(e) {
                                entry.alternates.push(alt);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 0 {
                    if saw_root {
                        return Err(parse_err("multiple root elements".to_string()));
                    }
                    saw_root = true;
                }
                if depth == 2 {
                    if let Some(entry) = current.as_mut() {
                        if let Some(alt) = alternate_from(e) {
                            entry.alternates.push(alt);
                        }
                    }
                }
            }
            Ok(Event::Text(ref t)) => {
                if depth == 0 {
                    return Err(parse_err("text outside the root element".to_string()));
                }
                if in_loc && depth == 3 {
                    let text = t.unescape().map_err(|e| parse_err(e.to_string()))?;
                    loc_text.push_str(&text);
                }
            }
            Ok(Event::CData(ref c)) => {
                if in_loc && depth == 3 {
                    loc_text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Ok(Event::End(_)) => {
                match depth {
                    3 if in_loc => {
                        in_loc = false;
                        let loc = loc_text.trim();
                        if let Some(entry) = current.as_mut() {
                            if !loc.is_empty() {
                                entry.locs.push(loc.to_string());
                            }
                        }
                    }
                    2 => {
                        if let Some(entry) = current.take() {
                            entries.push(entry);
                        }
                    }
                    _ => {}
                }
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| parse_err("unmatched closing tag".to_string()))?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(parse_err(format!(
                    "{e} at byte {}",
                    reader.error_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(parse_err("unexpected end of document".to_string()));
    }
    if !saw_root {
        return Err(parse_err("no root element".to_string()));
    }

    Ok(entries)
}

/// An `hreflang`/`href` pair from any element, regardless of its name.
fn alternate_from(e: &BytesStart<'_>) -> Option<HreflangAlternate> {
    let mut lang = None;
    let mut href = None;
    for attr in e.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"hreflang" => lang = attr.unescape_value().ok().map(|v| v.trim().to_string()),
            b"href" => href = attr.unescape_value().ok().map(|v| v.trim().to_string()),
            _ => {}
        }
    }
    Some(HreflangAlternate {
        lang: lang?,
        href: href.filter(|h| !h.is_empty())?,
    })
}
