/*!
 * Sequential Character Message
 *
 * Payload whose body must be a cyclic ascending sequence modulo
 * `SEQUENCE_LENGTH`, e.g. "0123456789012". Used to detect reordering,
 * loss, or duplication under concurrent conflation.
 */

use super::traits::Mergeable;
use serde::{Deserialize, Serialize};

/// Length of the cyclic sequence ("0123456789" has length 10)
pub const SEQUENCE_LENGTH: u32 = 10;

/// Check that every character follows its predecessor modulo `SEQUENCE_LENGTH`
///
/// An empty body is never valid.
pub fn is_cyclic_sequence(body: &str) -> bool {
    let mut chars = body.chars().map(|c| c as u32 % SEQUENCE_LENGTH);
    let Some(mut last) = chars.next() else {
        return false;
    };

    for current in chars {
        if current != (last + 1) % SEQUENCE_LENGTH {
            return false;
        }
        last = current;
    }
    true
}

/// Message that merges only if the concatenated body stays sequential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialCharacterMessage {
    key: String,
    body: String,
    merge_count: usize,
}

impl SequentialCharacterMessage {
    pub fn new(key: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            body: body.into(),
            merge_count: 0,
        }
    }
}

impl Mergeable for SequentialCharacterMessage {
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
        is_cyclic_sequence(&self.body)
    }

    fn merge(&mut self, other: &Self) -> bool {
        if !follows(&self.body, &other.body) || !is_cyclic_sequence(&other.body) {
            return false;
        }
        // A body that already absorbed a merge was validated then
        if self.merge_count == 0 && !is_cyclic_sequence(&self.body) {
            return false;
        }

        self.body.push_str(&other.body);
        self.merge_count += 1;
        true
    }
}

/// Check the junction between two non-empty bodies
fn follows(head: &str, tail: &str) -> bool {
    match (head.chars().next_back(), tail.chars().next()) {
        (Some(last), Some(first)) => {
            first as u32 % SEQUENCE_LENGTH == (last as u32 % SEQUENCE_LENGTH + 1) % SEQUENCE_LENGTH
        }
        _ => false,
    }
}
