//! Message — a chat-like piece of text that annotations point into.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub id:      i64,
  pub content: String,
}
