//! Producer worker: emits a fixed-length sequence of items into the buffer.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::buffer::BoundedBuffer;

/// Factory building the item a producer emits at each sequence position.
///
/// Called with `(producer_id, seq)`. The demo pipeline emits the bare
/// sequence index, matching the classic exercise; tests tag items with the
/// producer id so losses and duplicates are distinguishable.
pub type ItemFn<T> = Arc<dyn Fn(usize, usize) -> T + Send + Sync>;

/// A single producer worker.
///
/// Runs on its own thread: `items` iterations of build → put → echo → sleep.
/// Never fails; a full buffer simply blocks the put.
pub struct Producer<T: Send, const C: usize> {
    id: usize,
    buffer: Arc<BoundedBuffer<T, C>>,
    items: usize,
    interval: Duration,
    echo: bool,
    make_item: ItemFn<T>,
}

impl<T: Send + fmt::Debug, const C: usize> Producer<T, C> {
    pub fn new(
        id: usize,
        buffer: Arc<BoundedBuffer<T, C>>,
        items: usize,
        interval: Duration,
        echo: bool,
        make_item: ItemFn<T>,
    ) -> Self {
        Self {
            id,
            buffer,
            items,
            interval,
            echo,
            make_item,
        }
    }

    /// Emits all `items` and returns. Blocks inside `put` while the buffer
    /// is full; the interval after each put simulates production latency.
    pub fn run(self) {
        info!(producer = self.id, items = self.items, "producer started");

        for seq in 0..self.items {
            let item = (self.make_item)(self.id, seq);
            // Render before the put moves the item into the buffer.
            let rendered = self.echo.then(|| format!("{item:?}"));

            let slot = self.buffer.put(item);
            debug!(producer = self.id, seq, slot, "item stored");

            if let Some(value) = rendered {
                println!("[PRODUCER ID={}][{}]\tBUFFER[{}]={}", self.id, seq, slot, value);
            }

            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }

        info!(producer = self.id, "producer exiting");
    }
}
