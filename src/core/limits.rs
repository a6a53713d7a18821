/*!
 * Engine Limits and Constants
 *
 * Centralized location for defaults, thresholds, and demo sizes.
 */

use std::time::Duration;

// =============================================================================
// CONFLATION DEFAULTS
// =============================================================================

/// Default daemon pause between indexing iterations (no throttle)
pub const DEFAULT_PAUSE: Duration = Duration::ZERO;

/// Upper bound for any daemon pause (1 hour); longer values are clamped
pub const MAX_PAUSE: Duration = Duration::from_secs(3600);

/// How long a consumer holding a cursor waits for its key's list before
/// treating the token as a protocol violation
pub const EMPTY_LIST_GRACE: Duration = Duration::from_secs(1);

/// Initial capacity of a fresh per-key pending list
/// [PERF] Most keys hold a handful of values between two takes
pub const PENDING_LIST_CAPACITY: usize = 4;

/// Doorbell capacity for the lock-free ingress
/// A single slot coalesces wakeups, the consumer re-checks the queue after each ring
pub const DOORBELL_CAPACITY: usize = 1;

// =============================================================================
// DEMO DRIVER
// =============================================================================

/// Number of producer threads (one key each)
pub const DEMO_PRODUCERS: usize = 10;

/// Repetitions of the cyclic sequence per producer
pub const DEMO_REPETITIONS: usize = 10_000;

/// Cyclic sequence emitted character by character
pub const DEMO_SEQUENCE: &str = "0123456789";
