/*!
 * Monitoring
 * Structured logging setup for binaries and test harnesses
 */

mod tracer;

pub use tracer::init_tracing;
