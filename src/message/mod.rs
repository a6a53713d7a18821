/*!
 * Message Module
 *
 * Merge-capable payloads accepted by the conflation engine:
 * - `Mergeable`: the contract every payload implements
 * - `TextMessage`: unconditional concatenation accumulator
 * - `SequentialCharacterMessage`: merges only while the body stays a cyclic ascending sequence
 * - `Trade`: aggregates quantities for one ticker
 */

mod sequential;
mod text;
mod trade;
mod traits;

pub use sequential::{is_cyclic_sequence, SequentialCharacterMessage, SEQUENCE_LENGTH};
pub use text::TextMessage;
pub use trade::Trade;
pub use traits::Mergeable;
