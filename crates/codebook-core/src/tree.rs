//! Materialised view of the implicit code tree.
//!
//! The store only keeps flat paths; this module rebuilds the forest they
//! describe for clients that want to render the taxonomy.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{code::Code, path::CodePath};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeNode {
  pub id:       i64,
  pub code:     CodePath,
  /// Last path segment.
  pub name:     String,
  pub children: Vec<CodeNode>,
}

/// Build the forest implied by `codes`.
///
/// Each code hangs off its nearest stored ancestor, so a gap in the closure
/// invariant never drops a code. Siblings are ordered by path. Nesting is
/// bounded by [`crate::path::MAX_DEPTH`].
pub fn build_forest(codes: impl IntoIterator<Item = Code>) -> Vec<CodeNode> {
  let by_path: BTreeMap<CodePath, i64> =
    codes.into_iter().map(|c| (c.code, c.id)).collect();

  let mut children: HashMap<Option<CodePath>, Vec<CodePath>> = HashMap::new();
  for path in by_path.keys() {
    let mut parent = path.parent();
    while let Some(candidate) = &parent {
      if by_path.contains_key(candidate) {
        break;
      }
      parent = candidate.parent();
    }
    children.entry(parent).or_default().push(path.clone());
  }

  build_level(&None, &by_path, &mut children)
}

fn build_level(
  parent:   &Option<CodePath>,
  by_path:  &BTreeMap<CodePath, i64>,
  children: &mut HashMap<Option<CodePath>, Vec<CodePath>>,
) -> Vec<CodeNode> {
  let Some(level) = children.remove(parent) else {
    return Vec::new();
  };

  level
    .into_iter()
    .map(|path| {
      let nested = build_level(&Some(path.clone()), by_path, children);
      CodeNode {
        id:       by_path[&path],
        name:     path.name().to_owned(),
        code:     path,
        children: nested,
      }
    })
    .collect()
}
