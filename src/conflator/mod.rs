/*!
 * Conflation Engine
 *
 * Accepts a high-rate stream of keyed values and hands consumers, per key,
 * one value that folds every compatible update pending at take time.
 *
 * # Components
 *
 * - `PendingStore`: key -> ordered pending values, one coarse lock
 * - `Ingress`: blocking FIFO of raw values (channel or lock-free)
 * - `CursorQueue`: blocking FIFO of ready keys, at most one token per key
 * - `merge_run`: maximal-prefix fold applied on every take
 * - `Conflator`: composes the above and owns the indexer lifecycle
 */

pub mod config;
mod engine;
mod merge;
mod stats;
mod store;
mod transport;
mod worker;

pub use config::{ConflatorConfig, IngressKind, Mode};
pub use engine::Conflator;
pub use merge::merge_run;
pub use stats::ConflatorStats;
pub use transport::{ChannelIngress, Ingress, LockFreeIngress};
