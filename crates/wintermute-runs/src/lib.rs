//! Run tracking and cancellation for the embedded generation runtime.
//!
//! `/stop` and `/compact` never kill anything directly: they signal a
//! cancellation token registered here and, for compaction, wait (bounded)
//! for the run loop to acknowledge the end before touching the transcript.

pub mod memory;
pub mod registry;
pub mod runtime;

pub use memory::AbortMemory;
pub use registry::{RunGuard, RunRegistry};
pub use runtime::{CompactOutcome, CompactRequest, CompactStats, RunRuntime};
