//! Synchronization primitives for coordinating worker threads.
//!
//! This module provides the blocking counting semaphore that signals slot
//! availability between producers and the consumer.

pub mod semaphore;

pub use semaphore::Semaphore;
