//! Bounded-buffer producer/consumer hand-off.
//!
//! N producer threads and one consumer thread share a fixed-capacity circular
//! buffer. Two counting semaphores (`empty_slots`, `filled_slots`) signal
//! space and data availability; a mutex guards the buffer body itself.
//! Producers block when the buffer is full, the consumer blocks when it is
//! empty — backpressure is the protocol, not an error.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use handoff::{PipelineConfig, run};
//!
//! let config = PipelineConfig {
//!     producers: 3,
//!     items_per_producer: 2,
//!     producer_interval: Duration::ZERO,
//!     consumer_interval: Duration::ZERO,
//!     echo: false,
//! };
//!
//! let report = run::<u64, 10, _>(config, |_, seq| seq as u64).unwrap();
//! assert_eq!(report.drained.len(), 6);
//! ```
//!
//! # Modules
//!
//! - [`sync`] - counting semaphore primitive
//! - [`buffer`] - the shared [`BoundedBuffer`]
//! - [`runtime`] - producer/consumer workers and the [`Pipeline`] coordinator
//! - [`latency`] - lock/semaphore latency probe instrument

pub mod buffer;
pub mod latency;
pub mod runtime;
pub mod sync;
pub mod trace;

pub use buffer::BoundedBuffer;
pub use runtime::pipeline::{Pipeline, PipelineConfig, PipelineError, RunReport, run};
pub use trace::init_tracing;

/// Default buffer capacity (`C`).
pub const DEFAULT_CAPACITY: usize = 10;
