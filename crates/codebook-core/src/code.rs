//! Codes and the rename planner for the implicit taxonomy.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, path::CodePath};

/// A classification code, addressed by its unique path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
  pub id:   i64,
  pub code: CodePath,
}

// ─── Rename planning ─────────────────────────────────────────────────────────

/// One row rewrite produced by [`plan_rename`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
  pub id:   i64,
  pub from: CodePath,
  pub to:   CodePath,
}

/// Compute the rewrites needed to move the subtree at `from` to `to`.
///
/// `snapshot` must be read before any row is written; every code it contains
/// that `from` covers is rebased, the rest are ignored. The planner rejects
/// moving a code beneath itself, a plan that would push a path past the
/// depth or length bounds, and a plan whose target paths are held by a code
/// in `snapshot` that is not itself moving.
pub fn plan_rename(
  snapshot: &[Code],
  from:     &CodePath,
  to:       &CodePath,
) -> Result<Vec<Rename>> {
  if from.is_ancestor_of(to) {
    return Err(Error::CodeBeneathItself {
      from: from.to_string(),
      to:   to.to_string(),
    });
  }

  let plan: Vec<Rename> = snapshot
    .iter()
    .filter_map(|c| {
      c.code.rebase(from, to).map(|target| Rename {
        id:   c.id,
        from: c.code.clone(),
        to:   target,
      })
    })
    .collect();

  for r in &plan {
    r.to.check_bounds()?;
  }

  let moving: HashSet<i64> = plan.iter().map(|r| r.id).collect();
  let targets: HashSet<&CodePath> = plan.iter().map(|r| &r.to).collect();

  if let Some(taken) = snapshot
    .iter()
    .find(|c| !moving.contains(&c.id) && targets.contains(&c.code))
  {
    return Err(Error::DuplicateCode(taken.code.to_string()));
  }

  Ok(plan)
}
