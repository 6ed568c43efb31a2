//! Keyword matching against the path component of resolved URLs.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ops::Deref;

/// Keyword (folded if case-insensitive) to fraction of URLs containing it.
pub type KeywordResult = BTreeMap<String, f64>;

/// The path portion of a URL: everything after `scheme://host/`.
///
/// Produced by [`normalize_path`]. Normalizing a value that is already a
/// `NormalizedPath` returns it unchanged, even when the path itself looks
/// like a URL (`https://proxy.example/https://ex.com/page`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath<'a>(&'a str);

impl<'a> NormalizedPath<'a> {
    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

impl Deref for NormalizedPath<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        self.0
    }
}

impl AsRef<str> for NormalizedPath<'_> {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl fmt::Display for NormalizedPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl PartialEq<str> for NormalizedPath<'_> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NormalizedPath<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Input accepted by [`normalize_path`]: a raw URL or an already-normalized path.
pub trait PathSource<'a> {
    fn into_normalized(self) -> NormalizedPath<'a>;
}

impl<'a> PathSource<'a> for &'a str {
    fn into_normalized(self) -> NormalizedPath<'a> {
        // "scheme:" / "" / "host" / rest
        NormalizedPath(self.splitn(4, '/').nth(3).unwrap_or(""))
    }
}

impl<'a> PathSource<'a> for &'a String {
    fn into_normalized(self) -> NormalizedPath<'a> {
        self.as_str().into_normalized()
    }
}

impl<'a> PathSource<'a> for NormalizedPath<'a> {
    fn into_normalized(self) -> NormalizedPath<'a> {
        self
    }
}

/// Strip scheme and host from an absolute URL, keeping the rest.
///
/// `https://ex.com/en/docs?q=1` becomes `en/docs?q=1`, and a URL with no
/// path becomes the empty string.
pub fn normalize_path<'a>(input: impl PathSource<'a>) -> NormalizedPath<'a> {
    input.into_normalized()
}

/// Fraction of `urls` whose normalized path contains each keyword.
///
/// The denominator is the size of the whole set. Keywords that fold to the
/// same key collapse into one entry. An empty set maps every key to `0.0`.
pub fn match_keywords<S: AsRef<str>>(
    urls: &HashSet<String>,
    keywords: &[S],
    case_insensitive: bool,
) -> KeywordResult {
    let fold = |s: &str| {
        if case_insensitive {
            s.to_lowercase()
        } else {
            s.to_string()
        }
    };

    let mut counts: BTreeMap<String, usize> = keywords
        .iter()
        .map(|k| (fold(k.as_ref()), 0))
        .collect();

    if urls.is_empty() {
        return counts.into_keys().map(|k| (k, 0.0)).collect();
    }

    for url in urls {
        let url = fold(url);
        let path = normalize_path(&url);
        for (keyword, count) in counts.iter_mut() {
            if path.contains(keyword.as_str()) {
                *count += 1;
            }
        }
    }

    let total = urls.len() as f64;
    counts
        .into_iter()
        .map(|(k, count)| (k, count as f64 / total))
        .collect()
}
