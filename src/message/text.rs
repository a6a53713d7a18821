/*!
 * Text Message
 * Generic accumulator: every merge appends the other body
 */

use super::traits::Mergeable;
use serde::{Deserialize, Serialize};

/// String payload that always merges by concatenation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    key: String,
    body: String,
    merge_count: usize,
}

impl TextMessage {
    pub fn new(key: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            body: body.into(),
            merge_count: 0,
        }
    }
}

impl Mergeable for TextMessage {
    type Key = String;
    type Body = str;

    #[inline]
    fn key(&self) -> &String {
        &self.key
    }

    #[inline]
    fn body(&self) -> &str {
        &self.body
    }

    #[inline]
    fn merge_count(&self) -> usize {
        self.merge_count
    }

    fn is_valid(&self) -> bool {
        !self.body.is_empty()
    }

    fn merge(&mut self, other: &Self) -> bool {
        self.body.push_str(&other.body);
        self.merge_count += 1;
        true
    }
}
