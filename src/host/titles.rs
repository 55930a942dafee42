// src/host/titles.rs
// Page title normalization in db-key form

use std::fmt;

/// Longest accepted title, in bytes of the normalized form.
pub const MAX_TITLE_BYTES: usize = 255;

const RESERVED_TITLE_CHARS: &[char] = &['|', '{', '}', '#', '<', '>', '[', ']'];

/// A page title in db-key form: separators collapsed to underscores,
/// first letter uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageTitle(String);

impl PageTitle {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PageTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps raw request text to a canonical page title, or rejects it.
pub trait TitleResolver {
    fn resolve(&self, raw: &str) -> Option<PageTitle>;
}

/// Normalizes titles the way a wiki stores them: runs of whitespace and
/// underscores become one underscore, surrounding separators are trimmed,
/// and the first letter is uppercased. Rejects empty and oversized titles,
/// wikitext-reserved characters, and relative path segments.
pub struct DbKeyTitleResolver;

impl TitleResolver for DbKeyTitleResolver {
    fn resolve(&self, raw: &str) -> Option<PageTitle> {
        let mut key = String::with_capacity(raw.len());
        let mut pending_separator = false;

        for c in raw.chars() {
            if c.is_whitespace() || c == '_' {
                if !key.is_empty() {
                    pending_separator = true;
                }
                continue;
            }
            if c.is_control() || RESERVED_TITLE_CHARS.contains(&c) {
                return None;
            }
            if pending_separator {
                key.push('_');
                pending_separator = false;
            }
            key.push(c);
        }

        if key.is_empty() || key.starts_with(':') {
            return None;
        }
        if key.split('/').any(|segment| segment == "." || segment == "..") {
            return None;
        }

        let mut chars = key.chars();
        let first = chars.next()?;
        let key: String = first.to_uppercase().chain(chars).collect();

        if key.len() > MAX_TITLE_BYTES {
            return None;
        }

        Some(PageTitle(key))
    }
}
