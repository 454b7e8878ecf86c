// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compiled substitution patterns.
//!
//! A [`CompiledPattern`] couples a byte regular expression with the trim offsets
//! that turn a match into a lookup key, and with the function that produces the
//! replacement for a match. With the default placeholder syntax `${KEY}` the trim
//! offsets are 2 and 1, so `${HOME}` resolves the key `HOME`.
//!
//! A compiled pattern holds no mutable state and can be shared between any
//! number of transformers through an `Arc`.

use crate::domain::{ConfigError, Result};
use crate::ports::KeyLookup;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// The default placeholder syntax, `${KEY}`.
pub const DEFAULT_PLACEHOLDER: &str = r"(?s)\$\{.*?\}";

/// Bytes to strip from the start of a default placeholder match (`${`).
pub const DEFAULT_TRIM_LEFT: usize = 2;

/// Bytes to strip from the end of a default placeholder match (`}`).
pub const DEFAULT_TRIM_RIGHT: usize = 1;

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_PLACEHOLDER).expect("default placeholder pattern is a valid regex")
});

/// Computes the replacement for the match `span` within the full source span.
pub type SubstituteFn = dyn Fn(&[u8], Range<usize>) -> Vec<u8> + Send + Sync;

/// One match found in a span together with its replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Position of the match within the searched span
    pub span: Range<usize>,
    /// The bytes that replace the match
    pub replacement: Vec<u8>,
}

/// An immutable, shareable substitution pattern.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use streamcfg::transform::CompiledPattern;
///
/// let mut env = HashMap::new();
/// env.insert("PLACEHOLDER".to_string(), "test".to_string());
///
/// let pattern = CompiledPattern::with_lookup(r"(?s)\$\{.*?\}", 2, 1, env).unwrap();
/// let out = pattern.replace_all(br#"{"key":"val","pass":"${PLACEHOLDER}"}"#);
/// assert_eq!(out, br#"{"key":"val","pass":"test"}"#);
/// ```
#[derive(Clone)]
pub struct CompiledPattern {
    regex: Regex,
    trim_left: usize,
    trim_right: usize,
    substitute: Arc<SubstituteFn>,
}

impl CompiledPattern {
    /// Compiles `pattern` with a custom substitution function.
    ///
    /// The function receives the whole searched span and the match range and
    /// returns the replacement bytes. It must not fail; returning the matched
    /// bytes unchanged is the way to leave a match alone.
    pub fn new<F>(pattern: &str, trim_left: usize, trim_right: usize, substitute: F) -> Result<Self>
    where
        F: Fn(&[u8], Range<usize>) -> Vec<u8> + Send + Sync + 'static,
    {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source: e,
        })?;
        Ok(Self {
            regex,
            trim_left,
            trim_right,
            substitute: Arc::new(substitute),
        })
    }

    /// Compiles `pattern` so that each match is replaced by the value its trimmed
    /// key maps to in `lookup`.
    ///
    /// Matches whose key is not mapped, or is not valid UTF-8, are left unchanged.
    pub fn with_lookup<L>(pattern: &str, trim_left: usize, trim_right: usize, lookup: L) -> Result<Self>
    where
        L: KeyLookup + 'static,
    {
        Self::new(
            pattern,
            trim_left,
            trim_right,
            lookup_substitute(lookup, trim_left, trim_right),
        )
    }

    /// Returns the default `${KEY}` placeholder pattern resolved through `lookup`.
    pub fn placeholders<L>(lookup: L) -> Self
    where
        L: KeyLookup + 'static,
    {
        Self {
            regex: PLACEHOLDER_REGEX.clone(),
            trim_left: DEFAULT_TRIM_LEFT,
            trim_right: DEFAULT_TRIM_RIGHT,
            substitute: Arc::new(lookup_substitute(
                lookup,
                DEFAULT_TRIM_LEFT,
                DEFAULT_TRIM_RIGHT,
            )),
        }
    }

    /// Compiles `pattern` with keys resolved from the process environment.
    #[cfg(feature = "env")]
    pub fn env(pattern: &str, trim_left: usize, trim_right: usize) -> Result<Self> {
        Self::with_lookup(
            pattern,
            trim_left,
            trim_right,
            crate::adapters::EnvVarLookup::new(),
        )
    }

    /// Returns the pattern source text.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the number of bytes stripped from the start of a match to form its key.
    pub fn trim_left(&self) -> usize {
        self.trim_left
    }

    /// Returns the number of bytes stripped from the end of a match to form its key.
    pub fn trim_right(&self) -> usize {
        self.trim_right
    }

    /// Returns the lookup key of the match `span`, or `None` if the match is
    /// shorter than the trim offsets.
    pub fn key<'a>(&self, src: &'a [u8], span: Range<usize>) -> Option<&'a [u8]> {
        trim_span(src, span, self.trim_left, self.trim_right)
    }

    /// Returns the ranges of all non-empty, non-overlapping matches in `src`,
    /// left to right.
    pub fn find_iter<'a>(&'a self, src: &'a [u8]) -> impl Iterator<Item = Range<usize>> + 'a {
        self.regex
            .find_iter(src)
            .filter(|m| !m.range().is_empty())
            .map(|m| m.range())
    }

    /// Computes the replacement for the match `span` of `src`.
    pub fn replacement(&self, src: &[u8], span: Range<usize>) -> Vec<u8> {
        (self.substitute)(src, span)
    }

    /// Finds every match in `src` and computes its replacement.
    pub fn substitutions(&self, src: &[u8]) -> Vec<Substitution> {
        self.find_iter(src)
            .map(|span| Substitution {
                replacement: self.replacement(src, span.clone()),
                span,
            })
            .collect()
    }

    /// Returns `src` with every match replaced.
    pub fn replace_all(&self, src: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(src.len());
        let mut last = 0;
        for sub in self.substitutions(src) {
            out.extend_from_slice(&src[last..sub.span.start]);
            out.extend_from_slice(&sub.replacement);
            last = sub.span.end;
        }
        out.extend_from_slice(&src[last..]);
        out
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("pattern", &self.regex.as_str())
            .field("trim_left", &self.trim_left)
            .field("trim_right", &self.trim_right)
            .finish_non_exhaustive()
    }
}

fn trim_span(src: &[u8], span: Range<usize>, left: usize, right: usize) -> Option<&[u8]> {
    let start = span.start.checked_add(left)?;
    let end = span.end.checked_sub(right)?;
    if start > end {
        return None;
    }
    src.get(start..end)
}

fn lookup_substitute<L>(
    lookup: L,
    trim_left: usize,
    trim_right: usize,
) -> impl Fn(&[u8], Range<usize>) -> Vec<u8> + Send + Sync + 'static
where
    L: KeyLookup + 'static,
{
    move |src: &[u8], span: Range<usize>| {
        let resolved = trim_span(src, span.clone(), trim_left, trim_right)
            .and_then(|key| std::str::from_utf8(key).ok())
            .and_then(|key| lookup.lookup(key));

        match resolved {
            Some(value) => value.into_bytes(),
            None => {
                tracing::trace!(
                    "Leaving unresolved placeholder unchanged: {}",
                    String::from_utf8_lossy(&src[span.clone()])
                );
                src[span].to_vec()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_replace_known_placeholder() {
        let pattern = CompiledPattern::placeholders(env(&[("PLACEHOLDER", "test")]));
        let out = pattern.replace_all(br#"{"key":"val","pass":"${PLACEHOLDER}"}"#);
        assert_eq!(out, br#"{"key":"val","pass":"test"}"#.to_vec());
    }

    #[test]
    fn test_unresolved_placeholder_is_kept() {
        let pattern = CompiledPattern::placeholders(env(&[]));
        let input = br#"{"pass":"${MISSING}"}"#;
        assert_eq!(pattern.replace_all(input), input.to_vec());
    }

    #[test]
    fn test_multiple_matches_left_to_right() {
        let pattern = CompiledPattern::placeholders(env(&[("A", "1"), ("B", "22")]));
        let subs = pattern.substitutions(b"${A}-${B}-${C}");
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[0].span, 0..4);
        assert_eq!(subs[0].replacement, b"1");
        assert_eq!(subs[1].span, 5..9);
        assert_eq!(subs[1].replacement, b"22");
        assert_eq!(subs[2].replacement, b"${C}");
        assert_eq!(pattern.replace_all(b"${A}-${B}-${C}"), b"1-22-${C}");
    }

    #[test]
    fn test_lazy_match_spans_newlines() {
        let pattern = CompiledPattern::placeholders(env(&[("MULTI\nLINE", "ok")]));
        assert_eq!(pattern.replace_all(b"x ${MULTI\nLINE} y"), b"x ok y");
    }

    #[test]
    fn test_key_extraction() {
        let pattern = CompiledPattern::placeholders(env(&[]));
        let src = b"ab${KEY}cd";
        assert_eq!(pattern.key(src, 2..8), Some(&b"KEY"[..]));
        assert_eq!(pattern.key(src, 2..4), None);
    }

    #[test]
    fn test_custom_substitute_fn() {
        let pattern = CompiledPattern::new(r"\d+", 0, 0, |src: &[u8], span: Range<usize>| {
            let n: u64 = std::str::from_utf8(&src[span]).unwrap().parse().unwrap();
            (n * 2).to_string().into_bytes()
        })
        .unwrap();
        assert_eq!(pattern.replace_all(b"a1 b21"), b"a2 b42");
    }

    #[test]
    fn test_empty_matches_are_skipped() {
        let pattern = CompiledPattern::new("x*", 0, 0, |_: &[u8], _: Range<usize>| b"!".to_vec()).unwrap();
        assert_eq!(pattern.replace_all(b"abxxc"), b"ab!c");
    }

    #[test]
    fn test_invalid_pattern() {
        let result = CompiledPattern::with_lookup("(unclosed", 2, 1, env(&[]));
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_non_utf8_key_is_kept() {
        let pattern = CompiledPattern::placeholders(env(&[]));
        let input = b"${\xff\xfe}";
        assert_eq!(pattern.replace_all(input), input.to_vec());
    }
}
