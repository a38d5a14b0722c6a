//! Pipeline runtime: worker threads and their coordinator.
//!
//! # Architecture
//!
//! The [`pipeline::Pipeline`] spawns `N + 1` OS threads:
//! - **Consumer thread** (one): drains exactly `N × K` items from the shared
//!   buffer, pacing itself with a fixed interval.
//! - **Producer threads** (`N`): each emits `K` items into the buffer, pacing
//!   itself with a shorter interval.
//!
//! Workers communicate only through the shared [`BoundedBuffer`]: producers
//! block on free slots, the consumer blocks on stored items. The consumer's
//! deliberately longer interval saturates the buffer and exercises producer
//! backpressure.
//!
//! The run terminates by operation count, not wall clock: once the consumer
//! has performed its `N × K` takes, every producer has necessarily completed
//! its `K` puts, and the coordinator joins them all.
//!
//! [`BoundedBuffer`]: crate::buffer::BoundedBuffer

pub mod consumer;
pub mod pipeline;
pub mod producer;
