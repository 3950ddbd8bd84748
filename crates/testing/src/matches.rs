//! Text matchers
//!
//! A [`TextMatch`] is either a string (exact or normalized substring) or a
//! regular expression. Matchers are plain values, built per query.

use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Text normalization function applied before string matching
pub type NormalizerFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Debug, Clone)]
pub enum TextMatch {
    Str(String),
    Regex(Regex),
}

impl TextMatch {
    /// Compile `pattern` into a regex matcher
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(TextMatch::Regex(Regex::new(pattern)?))
    }
}

impl From<&str> for TextMatch {
    fn from(value: &str) -> Self {
        TextMatch::Str(value.to_string())
    }
}

impl From<String> for TextMatch {
    fn from(value: String) -> Self {
        TextMatch::Str(value)
    }
}

impl From<&String> for TextMatch {
    fn from(value: &String) -> Self {
        TextMatch::Str(value.clone())
    }
}

impl From<Regex> for TextMatch {
    fn from(value: Regex) -> Self {
        TextMatch::Regex(value)
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatch::Str(text) => f.write_str(text),
            TextMatch::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Switches for [`default_normalizer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerConfig {
    pub trim: bool,
    pub collapse_whitespace: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            trim: true,
            collapse_whitespace: true,
        }
    }
}

/// Trim and/or collapse whitespace runs into a single space
pub fn default_normalizer(config: NormalizerConfig) -> NormalizerFn {
    Arc::new(move |text: &str| normalize(text, config))
}

fn normalize(text: &str, config: NormalizerConfig) -> String {
    let text = if config.trim { text.trim() } else { text };
    if !config.collapse_whitespace {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

/// Match `text` against `matcher`.
///
/// Strings are normalized on both sides; `exact: false` turns the check
/// into a case-insensitive substring test. Regexes see the raw text.
pub fn matches(
    matcher: &TextMatch,
    text: &str,
    normalizer: Option<&NormalizerFn>,
    exact: bool,
) -> bool {
    match matcher {
        TextMatch::Str(expected) => {
            let (text, expected) = match normalizer {
                Some(normalizer) => (normalizer(text), normalizer(expected)),
                None => (
                    normalize(text, NormalizerConfig::default()),
                    normalize(expected, NormalizerConfig::default()),
                ),
            };
            if exact {
                text == expected
            } else {
                text.to_lowercase().contains(&expected.to_lowercase())
            }
        }
        TextMatch::Regex(regex) => regex.is_match(text),
    }
}

/// Exact, unnormalized match used for props like roles
pub fn match_string_prop(value: Option<&str>, matcher: &TextMatch) -> bool {
    let Some(value) = value else {
        return false;
    };
    match matcher {
        TextMatch::Str(expected) => value == expected,
        TextMatch::Regex(regex) => regex.is_match(value),
    }
}
