//! Glob-style path patterns

use globset::{GlobBuilder, GlobMatcher};
use std::borrow::Cow;
use std::fmt;

/// Marker that makes a pattern match a directory and everything beneath it
pub const RECURSIVE_MARKER: &str = "**";

const SEPARATOR: char = '/';

/// Rewrites every `\` to `/`. No other transformation is applied.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    }
}

/// The `**` part of a pattern, parsed once at compile time
#[derive(Debug, Clone, PartialEq, Eq)]
struct Recursive {
    /// The pattern with every marker removed, trailing separator stripped
    anchor: String,
    /// Text before the marker and text after it, separators stripped. Only
    /// present when the pattern splits into exactly two parts.
    split: Option<(String, String)>,
}

impl Recursive {
    fn parse(normalized: &str) -> Option<Self> {
        if !normalized.contains(RECURSIVE_MARKER) {
            return None;
        }

        let anchor = normalized.replace(RECURSIVE_MARKER, "");
        let parts: Vec<&str> = normalized.split(RECURSIVE_MARKER).collect();
        let split = match parts.as_slice() {
            [prefix, suffix] => Some((
                prefix.trim_end_matches(SEPARATOR).to_string(),
                suffix.trim_start_matches(SEPARATOR).to_string(),
            )),
            _ => None,
        };

        Some(Self {
            anchor: anchor.trim_end_matches(SEPARATOR).to_string(),
            split,
        })
    }

    fn matches(&self, path: &str) -> bool {
        // An empty anchor ("**") would otherwise swallow every path
        if !self.anchor.is_empty() && is_within(path, &self.anchor) {
            return true;
        }

        match &self.split {
            Some((prefix, suffix)) => {
                (prefix.is_empty() || is_within(path, prefix))
                    && path.ends_with(suffix.as_str())
            }
            None => false,
        }
    }
}

/// `path` is `dir` itself or lies beneath it
fn is_within(path: &str, dir: &str) -> bool {
    match path.strip_prefix(dir) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Rewrites shell-glob text into globset syntax.
///
/// Braces are literal, and a `[` without a closing `]` is a literal bracket
/// while the rest of the pattern keeps its wildcards. Complete `[...]`
/// classes are copied unchanged.
fn glob_source(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end + 1;
                    continue;
                }
                None => out.push_str("[[]"),
            },
            '{' => out.push_str("[{]"),
            '}' => out.push_str("[}]"),
            c => out.push(c),
        }
        i += 1;
    }

    out
}

/// Index of the `]` closing the class opened at `start`. A `]` directly after
/// `[` or `[!` belongs to the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if matches!(chars.get(j), Some('!') | Some('^')) {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    chars[j.min(chars.len())..]
        .iter()
        .position(|&c| c == ']')
        .map(|offset| j + offset)
}

/// A compiled glob-style pattern.
///
/// Supports `**` (a directory and all of its descendants), and single-level
/// shell globbing where `*` and `?` never cross a `/` and `[...]` classes are
/// honoured. Braces have no special meaning and an unclosed `[` matches
/// itself. Patterns the glob compiler still rejects, such as a reversed
/// range, fall back to a literal comparison so matching never fails.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    normalized: String,
    recursive: Option<Recursive>,
    glob: Option<GlobMatcher>,
}

impl Pattern {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize_path(&raw).into_owned();
        let recursive = Recursive::parse(&normalized);
        let glob = GlobBuilder::new(&glob_source(&normalized))
            .literal_separator(true)
            .backslash_escape(false)
            .build()
            .ok()
            .map(|glob| glob.compile_matcher());

        Self {
            raw,
            normalized,
            recursive,
            glob,
        }
    }

    /// The pattern as it was written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive.is_some()
    }

    pub fn matches(&self, path: &str) -> bool {
        let path = normalize_path(path);

        if let Some(recursive) = &self.recursive {
            if recursive.matches(path.trim_end_matches(SEPARATOR)) {
                return true;
            }
        }

        match &self.glob {
            Some(glob) => glob.is_match(path.as_ref()),
            None => path == self.normalized,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Pattern {}

impl From<&str> for Pattern {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Pattern {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Matches a single path against a single pattern.
///
/// Compiles the pattern on every call; use [`Pattern`] or
/// [`ChangeClassifier`](super::ChangeClassifier) when matching many paths.
pub fn matches(path: &str, pattern: &str) -> bool {
    Pattern::new(pattern).matches(path)
}
