/*!
 * Shared helpers for conflation tests
 */

use conflux_engine::{Conflator, Mergeable};
use std::thread;
use std::time::{Duration, Instant};

/// Poll `condition` until it holds or `timeout` elapses
pub fn wait_until<F: FnMut() -> bool>(timeout: Duration, mut condition: F) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// Wait until the daemon has indexed `count` values in total
pub fn wait_indexed<M: Mergeable>(conflator: &Conflator<M>, count: u64) {
    assert!(
        wait_until(Duration::from_secs(5), || conflator.stats().indexed >= count),
        "indexer did not reach {} values",
        count
    );
}
