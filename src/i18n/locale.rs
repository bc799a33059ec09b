//! Supported site locales and `Accept-Language` negotiation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A locale the site is published in.
///
/// Italian is the default (x-default) locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    It,
    En,
}

impl Locale {
    /// All published locales, default first.
    pub const ALL: [Locale; 2] = [Locale::It, Locale::En];

    /// Parse an exact locale code (`"it"`, `"en"`), case-insensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "it" => Some(Self::It),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    /// Parse a locale code, falling back to the default for anything unknown.
    pub fn resolve(code: &str) -> Self {
        Self::from_code(code).unwrap_or_default()
    }

    /// Pick the best supported locale from an `Accept-Language` header.
    ///
    /// Entries are ordered by their `q` weight (default 1.0); the first one
    /// whose base language is supported wins. Region subtags are ignored.
    pub fn negotiate(accept_language: Option<&str>) -> Self {
        let Some(header) = accept_language else {
            return Self::default();
        };

        let mut candidates: Vec<(&str, f32)> = header
            .split(',')
            .filter_map(|entry| {
                let mut parts = entry.trim().split(';');
                let tag = parts.next()?.trim();
                if tag.is_empty() {
                    return None;
                }
                let quality = parts
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((tag, quality))
            })
            .collect();

        // Stable sort keeps header order between equal weights.
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        candidates
            .into_iter()
            .filter(|(_, q)| *q > 0.0)
            .find_map(|(tag, _)| tag.split('-').next().and_then(Self::from_code))
            .unwrap_or_default()
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::It => "it",
            Self::En => "en",
        }
    }

    /// Native display name used by the language switcher.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::It => "Italiano",
            Self::En => "English",
        }
    }

    /// Language-region code for hreflang links.
    pub fn hreflang(self) -> &'static str {
        match self {
            Self::It => "it-IT",
            Self::En => "en-GB",
        }
    }

    /// Root path of the locale's rendered pages, e.g. `/it`.
    pub fn root_path(self) -> String {
        format!("/{}", self.code())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
