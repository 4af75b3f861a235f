//! Annotations — a span of a message's content classified by a code.
//!
//! The span is half-open: `[start_idx, end_idx)`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, path::CodePath};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
  pub id:         i64,
  pub message_id: i64,
  pub code_id:    i64,
  pub start_idx:  i64,
  pub end_idx:    i64,
}

/// An annotation together with the path of the code it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationWithCode {
  #[serde(flatten)]
  pub annotation: Annotation,
  pub code:       CodePath,
}

/// Input to [`CodebookStore::create_annotation`](crate::store::CodebookStore::create_annotation).
#[derive(Debug, Clone, Deserialize)]
pub struct NewAnnotation {
  pub message_id: i64,
  pub code_id:    i64,
  pub start_idx:  i64,
  pub end_idx:    i64,
}

impl NewAnnotation {
  pub fn validate(&self) -> Result<()> {
    validate_span(self.start_idx, self.end_idx)
  }
}

/// Partial update for an existing annotation. Absent fields are left as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationPatch {
  pub code_id:   Option<i64>,
  pub start_idx: Option<i64>,
  pub end_idx:   Option<i64>,
}

impl AnnotationPatch {
  /// Merge the patch over `current` and check the resulting span.
  pub fn apply(&self, current: &Annotation) -> Result<Annotation> {
    let updated = Annotation {
      id:         current.id,
      message_id: current.message_id,
      code_id:    self.code_id.unwrap_or(current.code_id),
      start_idx:  self.start_idx.unwrap_or(current.start_idx),
      end_idx:    self.end_idx.unwrap_or(current.end_idx),
    };
    validate_span(updated.start_idx, updated.end_idx)?;
    Ok(updated)
  }
}

/// A span is valid when `0 <= start <= end`.
pub fn validate_span(start: i64, end: i64) -> Result<()> {
  if start < 0 || end < start {
    return Err(Error::InvalidSpan { start, end });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn existing() -> Annotation {
    Annotation { id: 7, message_id: 1, code_id: 2, start_idx: 5, end_idx: 10 }
  }

  #[test]
  fn span_checks() {
    assert!(validate_span(0, 0).is_ok());
    assert!(validate_span(3, 9).is_ok());
    assert!(matches!(
      validate_span(6, 5),
      Err(Error::InvalidSpan { start: 6, end: 5 })
    ));
    assert!(validate_span(-1, 4).is_err());
  }

  #[test]
  fn patch_merges_only_given_fields() {
    let patch = AnnotationPatch { end_idx: Some(12), ..Default::default() };
    let updated = patch.apply(&existing()).unwrap();
    assert_eq!(updated.code_id, 2);
    assert_eq!(updated.start_idx, 5);
    assert_eq!(updated.end_idx, 12);
    assert_eq!(updated.message_id, 1);
  }

  #[test]
  fn patch_validates_merged_span() {
    // start moves past the untouched end.
    let patch = AnnotationPatch { start_idx: Some(11), ..Default::default() };
    assert!(patch.apply(&existing()).is_err());
  }

  #[test]
  fn annotation_with_code_serialises_flat() {
    let row = AnnotationWithCode {
      annotation: existing(),
      code:       CodePath::parse("/fear").unwrap(),
    };
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["code_id"], 2);
    assert_eq!(json["code"], "/fear");
  }
}
