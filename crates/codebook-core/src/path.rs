//! [`CodePath`] — the canonical, slash-delimited name of a code.
//!
//! The taxonomy has no explicit parent/child table. A code's place in the
//! tree is derived from its path alone: `/a/b` is the parent of `/a/b/c`, and
//! every code whose path starts with `/a/b/` belongs to the `/a/b` subtree.
//! Matching is always done on whole segments, so `/a/bc` is *not* beneath
//! `/a/b`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Segment separator.
pub const SEPARATOR: char = '/';

/// Most segments a path may have. Every prefix of a path is stored as its
/// own code, so depth bounds both row count and tree nesting.
pub const MAX_DEPTH: usize = 32;

/// Longest canonical path accepted, in bytes.
pub const MAX_LEN: usize = 1024;

/// A canonical code path: `/seg1/seg2/.../segN` with at least one segment,
/// no empty segments and no trailing separator.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct CodePath(String);

impl CodePath {
  /// Parse and canonicalise a raw path.
  ///
  /// Empty segments are discarded, so `a/b`, `/a/b/` and `//a//b` all parse
  /// to `/a/b`. Input with no segments, control characters, more than
  /// [`MAX_DEPTH`] segments or a canonical form longer than [`MAX_LEN`] bytes
  /// is rejected.
  pub fn parse(raw: &str) -> Result<Self> {
    let invalid = || Error::InvalidCodePath(truncated(raw));

    if raw.chars().any(char::is_control) {
      return Err(invalid());
    }

    let mut path = String::new();
    let mut depth = 0;
    for segment in raw.trim().split(SEPARATOR).filter(|s| !s.is_empty()) {
      depth += 1;
      if depth > MAX_DEPTH || path.len() + 1 + segment.len() > MAX_LEN {
        return Err(invalid());
      }
      path.push(SEPARATOR);
      path.push_str(segment);
    }

    if depth == 0 {
      return Err(invalid());
    }
    Ok(Self(path))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// The path's segments, root first.
  pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
    self.0.split(SEPARATOR).skip(1)
  }

  /// Number of segments; a top-level code has depth 1.
  pub fn depth(&self) -> usize { self.segments().count() }

  /// The last segment.
  pub fn name(&self) -> &str {
    self.0.rsplit(SEPARATOR).next().unwrap_or_default()
  }

  /// The immediate parent path, or `None` for a top-level code.
  pub fn parent(&self) -> Option<CodePath> {
    let (head, _) = self.0.rsplit_once(SEPARATOR)?;
    (!head.is_empty()).then(|| Self(head.to_owned()))
  }

  /// Every cumulative prefix of this path, root first and ending with the
  /// path itself: `/a/b/c` yields `/a`, `/a/b`, `/a/b/c`.
  pub fn prefixes(&self) -> Vec<CodePath> {
    let mut out: Vec<CodePath> = self
      .0
      .match_indices(SEPARATOR)
      .skip(1)
      .map(|(i, _)| Self(self.0[..i].to_owned()))
      .collect();
    out.push(self.clone());
    out
  }

  /// Whether `other` is this path or lies anywhere beneath it.
  pub fn covers(&self, other: &CodePath) -> bool {
    other
      .0
      .strip_prefix(&self.0)
      .is_some_and(|rest| rest.is_empty() || rest.starts_with(SEPARATOR))
  }

  /// Whether `other` lies strictly beneath this path.
  pub fn is_ancestor_of(&self, other: &CodePath) -> bool {
    self != other && self.covers(other)
  }

  /// Fails with [`Error::InvalidCodePath`] if this path exceeds
  /// [`MAX_DEPTH`] or [`MAX_LEN`]. Parsed paths always pass; rebased ones
  /// may not.
  pub fn check_bounds(&self) -> Result<()> {
    if self.depth() > MAX_DEPTH || self.0.len() > MAX_LEN {
      return Err(Error::InvalidCodePath(truncated(&self.0)));
    }
    Ok(())
  }

  /// Replace the `from` prefix of this path with `to`, keeping the suffix.
  ///
  /// Returns `None` when this path is not covered by `from`.
  pub fn rebase(&self, from: &CodePath, to: &CodePath) -> Option<CodePath> {
    if !from.covers(self) {
      return None;
    }
    let suffix = &self.0[from.0.len()..];
    Some(Self(format!("{}{suffix}", to.0)))
  }
}

/// Rejected input echoed back in errors, cut to a readable length.
fn truncated(raw: &str) -> String {
  const SHOWN: usize = 64;
  match raw.char_indices().nth(SHOWN) {
    Some((i, _)) => format!("{}...", &raw[..i]),
    None => raw.to_owned(),
  }
}

impl fmt::Display for CodePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for CodePath {
  fn as_ref(&self) -> &str { &self.0 }
}

impl FromStr for CodePath {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for CodePath {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<CodePath> for String {
  fn from(p: CodePath) -> Self { p.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn p(s: &str) -> CodePath { CodePath::parse(s).unwrap() }

  #[test]
  fn parse_canonicalises_separators() {
    assert_eq!(p("/a/b/c").as_str(), "/a/b/c");
    assert_eq!(p("a/b/c").as_str(), "/a/b/c");
    assert_eq!(p("//a//b/c/").as_str(), "/a/b/c");
    assert_eq!(p("  /topic ").as_str(), "/topic");
  }

  #[test]
  fn parse_rejects_paths_without_segments() {
    for raw in ["", "/", "///", "   "] {
      assert!(
        matches!(CodePath::parse(raw), Err(Error::InvalidCodePath(_))),
        "{raw:?} should be rejected"
      );
    }
  }

  #[test]
  fn parse_rejects_control_characters() {
    for raw in ["/a\0b", "/a/b\n", "/tab\there", "/bell\u{7}"] {
      assert!(
        matches!(CodePath::parse(raw), Err(Error::InvalidCodePath(_))),
        "{raw:?} should be rejected"
      );
    }
    // Surrounding whitespace is still trimmed rather than rejected.
    assert_eq!(p(" /a ").as_str(), "/a");
  }

  #[test]
  fn parse_bounds_depth_and_length() {
    let deepest = "/a".repeat(MAX_DEPTH);
    assert_eq!(p(&deepest).depth(), MAX_DEPTH);

    let too_deep = "/a".repeat(MAX_DEPTH + 1);
    assert!(matches!(CodePath::parse(&too_deep), Err(Error::InvalidCodePath(_))));

    let huge = "/a".repeat(8000);
    match CodePath::parse(&huge) {
      Err(Error::InvalidCodePath(shown)) => assert!(shown.len() < 100),
      other => panic!("expected InvalidCodePath, got {other:?}"),
    }

    let longest = format!("/{}", "x".repeat(MAX_LEN - 1));
    assert_eq!(p(&longest).as_str().len(), MAX_LEN);
    let too_long = format!("/{}", "x".repeat(MAX_LEN));
    assert!(matches!(CodePath::parse(&too_long), Err(Error::InvalidCodePath(_))));
  }

  #[test]
  fn rebase_can_exceed_bounds() {
    let deep = p(&"/a".repeat(MAX_DEPTH));
    let from = p("/a");
    let to = p("/x/y");
    let rebased = deep.rebase(&from, &to).unwrap();
    assert_eq!(rebased.depth(), MAX_DEPTH + 1);
    assert!(matches!(rebased.check_bounds(), Err(Error::InvalidCodePath(_))));
    assert!(deep.check_bounds().is_ok());
  }

  #[test]
  fn prefixes_walk_from_root() {
    let prefixes: Vec<String> =
      p("/a/b/c").prefixes().into_iter().map(String::from).collect();
    assert_eq!(prefixes, ["/a", "/a/b", "/a/b/c"]);
    assert_eq!(p("/solo").prefixes(), vec![p("/solo")]);
  }

  #[test]
  fn parent_name_and_depth() {
    let path = p("/feelings/fear/night");
    assert_eq!(path.name(), "night");
    assert_eq!(path.depth(), 3);
    assert_eq!(path.parent(), Some(p("/feelings/fear")));
    assert_eq!(p("/feelings").parent(), None);
  }

  #[test]
  fn covers_matches_whole_segments_only() {
    let ab = p("/a/b");
    assert!(ab.covers(&p("/a/b")));
    assert!(ab.covers(&p("/a/b/c")));
    assert!(!ab.covers(&p("/a/bc")));
    assert!(!ab.covers(&p("/x/a/by")));
    assert!(!ab.covers(&p("/a")));
    assert!(!ab.is_ancestor_of(&p("/a/b")));
    assert!(ab.is_ancestor_of(&p("/a/b/c/d")));
  }

  #[test]
  fn rebase_replaces_prefix_and_keeps_suffix() {
    let from = p("/a/b");
    let to = p("/x/y");
    assert_eq!(p("/a/b").rebase(&from, &to), Some(p("/x/y")));
    assert_eq!(p("/a/b/c/d").rebase(&from, &to), Some(p("/x/y/c/d")));
    assert_eq!(p("/a/bc").rebase(&from, &to), None);
    assert_eq!(p("/a").rebase(&from, &to), None);
  }

  #[test]
  fn serde_goes_through_parse() {
    let path: CodePath = serde_json::from_str("\"a//b/\"").unwrap();
    assert_eq!(path, p("/a/b"));
    assert_eq!(serde_json::to_string(&path).unwrap(), "\"/a/b\"");
    assert!(serde_json::from_str::<CodePath>("\"/\"").is_err());
  }
}
