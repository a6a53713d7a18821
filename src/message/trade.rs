/*!
 * Trade Message
 * Executed quantity for a ticker; same-ticker trades aggregate
 */

use super::traits::Mergeable;
use serde::{Deserialize, Serialize};

/// Trade execution keyed by ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    ticker: String,
    initial_quantity: u64,
    current_quantity: u64,
    merge_count: usize,
}

impl Trade {
    pub fn new(ticker: impl Into<String>, quantity: u64) -> Self {
        Self {
            ticker: ticker.into(),
            initial_quantity: quantity,
            current_quantity: quantity,
            merge_count: 0,
        }
    }

    #[inline]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Quantity this trade was created with
    #[inline]
    pub fn initial_quantity(&self) -> u64 {
        self.initial_quantity
    }

    /// Quantity after all merges
    #[inline]
    pub fn current_quantity(&self) -> u64 {
        self.current_quantity
    }
}

impl Mergeable for Trade {
    type Key = String;
    type Body = u64;

    #[inline]
    fn key(&self) -> &String {
        &self.ticker
    }

    #[inline]
    fn body(&self) -> &u64 {
        &self.current_quantity
    }

    #[inline]
    fn merge_count(&self) -> usize {
        self.merge_count
    }

    /// Merged volume never drops below the opening quantity
    fn is_valid(&self) -> bool {
        !self.ticker.is_empty()
            && self.current_quantity >= self.initial_quantity
            && (self.merge_count > 0 || self.current_quantity == self.initial_quantity)
    }

    fn merge(&mut self, other: &Self) -> bool {
        if self.ticker != other.ticker {
            return false;
        }
        let Some(total) = self.current_quantity.checked_add(other.current_quantity) else {
            return false;
        };
        self.current_quantity = total;
        self.merge_count += 1;
        true
    }
}
