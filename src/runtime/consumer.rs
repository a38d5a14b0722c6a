//! Consumer worker: drains the full expected item count from the buffer.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::buffer::BoundedBuffer;

/// The single consumer worker.
///
/// Drains exactly `expected` items, then returns them in consumption order.
/// Its interval is deliberately longer than the producers' (3× by default),
/// so the buffer saturates and producers block on free slots — the
/// backpressure this pipeline exists to demonstrate.
pub struct Consumer<T: Send, const C: usize> {
    buffer: Arc<BoundedBuffer<T, C>>,
    expected: usize,
    interval: Duration,
    echo: bool,
}

impl<T: Send + fmt::Debug, const C: usize> Consumer<T, C> {
    pub fn new(
        buffer: Arc<BoundedBuffer<T, C>>,
        expected: usize,
        interval: Duration,
        echo: bool,
    ) -> Self {
        Self {
            buffer,
            expected,
            interval,
            echo,
        }
    }

    /// Performs `expected` takes and returns the drained items in order.
    /// Blocks inside `take` while the buffer is empty.
    pub fn run(self) -> Vec<T> {
        info!(expected = self.expected, "consumer started");

        let mut drained = Vec::with_capacity(self.expected);
        for _ in 0..self.expected {
            let (slot, item) = self.buffer.take();
            debug!(slot, taken = drained.len() + 1, "item taken");

            if self.echo {
                println!("CONSUMER\t\tBUFFER[{slot}]={item:?}");
            }
            drained.push(item);

            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }

        info!(drained = drained.len(), "consumer exiting");
        drained
    }
}
