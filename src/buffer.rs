//! Fixed-capacity circular buffer with blocking hand-off.
//!
//! [`BoundedBuffer`] is the single shared resource between producer threads
//! and the consumer thread. Two counting semaphores track free slots and
//! stored items; a mutex guards the slot array and the read/write positions.
//!
//! # Deadlock freedom
//!
//! Both [`put`](BoundedBuffer::put) and [`take`](BoundedBuffer::take) acquire
//! their counting semaphore *before* the body mutex, and the mutex is held
//! only for the index update and value move — never while waiting on a
//! semaphore. Reversing that order would let a producer hold the lock while
//! waiting for space, blocking the consumer that needs the lock to free a
//! slot.
//!
//! # Example
//!
//! ```
//! use handoff::BoundedBuffer;
//!
//! let buffer: BoundedBuffer<u64, 4> = BoundedBuffer::new();
//!
//! let slot = buffer.put(7);
//! assert_eq!(buffer.take(), (slot, 7));
//! assert!(buffer.is_empty());
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::sync::Semaphore;

/// Mutex-guarded buffer body: the slot array and circular positions.
struct Slots<T, const C: usize> {
    /// Stored values. A slot is `Some` exactly while its value has been put
    /// but not yet taken.
    slots: [Option<T>; C],
    /// Next slot to write. Always in `[0, C)`.
    write_pos: usize,
    /// Next slot to read. Always in `[0, C)`.
    read_pos: usize,
    /// Occupancy, in `[0, C]`. Redundant with the semaphore counts; kept so
    /// the buffer can report its fill level without touching them.
    filled_count: usize,
}

struct CapacityCheck<const C: usize>;

impl<const C: usize> CapacityCheck<C> {
    /// Compile-time assertion that the buffer capacity is non-zero.
    const OK: () = assert!(C > 0, "Buffer capacity must be greater than 0");
}

/// Bounded circular buffer shared between producers and one consumer.
///
/// `put` blocks while the buffer is full, `take` blocks while it is empty.
/// Neither operation can fail. Slots are reused in FIFO order: a slot is
/// never overwritten before its previous value has been taken.
pub struct BoundedBuffer<T, const C: usize> {
    /// Free capacity. Starts at `C`; producers acquire, the consumer releases.
    empty_slots: Semaphore,
    /// Stored items. Starts at 0; the consumer acquires, producers release.
    filled_slots: Semaphore,
    body: Mutex<Slots<T, C>>,
}

impl<T, const C: usize> BoundedBuffer<T, C> {
    /// Creates an empty buffer.
    ///
    /// Fails to compile if `C == 0`.
    #[must_use]
    pub fn new() -> Self {
        let () = CapacityCheck::<C>::OK;

        Self {
            empty_slots: Semaphore::new(C),
            filled_slots: Semaphore::new(0),
            body: Mutex::new(Slots {
                slots: std::array::from_fn(|_| None),
                write_pos: 0,
                read_pos: 0,
                filled_count: 0,
            }),
        }
    }

    /// Advances a position to the next slot, wrapping to 0 at capacity.
    #[inline]
    const fn bump(pos: usize) -> usize {
        let next = pos + 1;
        if next == C { 0 } else { next }
    }

    /// Stores `item`, blocking while the buffer is full.
    ///
    /// Returns the index of the slot written. The value becomes visible to
    /// the consumer before this method returns.
    pub fn put(&self, item: T) -> usize {
        self.empty_slots.acquire();

        let slot = {
            let mut body = self.lock_body();
            let slot = body.write_pos;
            debug_assert!(body.slots[slot].is_none(), "slot overwritten before take");
            body.slots[slot] = Some(item);
            body.write_pos = Self::bump(slot);
            body.filled_count += 1;
            slot
        };

        self.filled_slots.release();
        slot
    }

    /// Removes the oldest stored value, blocking while the buffer is empty.
    ///
    /// Returns the slot index the value was read from along with the value.
    pub fn take(&self) -> (usize, T) {
        self.filled_slots.acquire();

        let (slot, item) = {
            let mut body = self.lock_body();
            let slot = body.read_pos;
            // A filled_slots permit is only released after the matching put
            // stored its value, so the slot cannot be empty here.
            let item = body.slots[slot]
                .take()
                .expect("filled_slots permit without a stored value");
            body.read_pos = Self::bump(slot);
            body.filled_count -= 1;
            (slot, item)
        };

        self.empty_slots.release();
        (slot, item)
    }

    /// Number of stored items, in `[0, C]`.
    ///
    /// Purely observational: concurrent puts and takes may change the
    /// occupancy before the caller can act on it.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_body().filled_count
    }

    /// Whether the buffer currently holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed capacity `C`.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        C
    }

    /// Locks the buffer body, absorbing poisoning.
    ///
    /// The body is only ever mutated between a semaphore acquire and the
    /// matching release; a panic inside that window cannot leave the slot
    /// array half-updated because the updates are plain stores.
    fn lock_body(&self) -> MutexGuard<'_, Slots<T, C>> {
        self.body.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, const C: usize> Default for BoundedBuffer<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_put_take_roundtrip() {
        let buffer: BoundedBuffer<u64, 4> = BoundedBuffer::new();

        assert_eq!(buffer.put(10), 0);
        assert_eq!(buffer.put(20), 1);
        assert_eq!(buffer.len(), 2);

        assert_eq!(buffer.take(), (0, 10));
        assert_eq!(buffer.take(), (1, 20));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_slots_wrap_around() {
        let buffer: BoundedBuffer<u64, 3> = BoundedBuffer::new();

        for round in 0..5u64 {
            for i in 0..3u64 {
                let value = round * 10 + i;
                let slot = buffer.put(value);
                assert_eq!(slot as u64, i, "write position should wrap at capacity");
            }
            for i in 0..3u64 {
                let (slot, value) = buffer.take();
                assert_eq!(slot as u64, i);
                assert_eq!(value, round * 10 + i);
            }
            assert!(buffer.is_empty());
        }
    }

    #[test]
    fn test_occupancy_stays_in_bounds() {
        let buffer: BoundedBuffer<u64, 4> = BoundedBuffer::new();

        for i in 0..4 {
            buffer.put(i);
            assert!(buffer.len() <= buffer.capacity());
        }
        assert_eq!(buffer.len(), 4);

        for _ in 0..4 {
            buffer.take();
        }
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_put_blocks_when_full() {
        let buffer: Arc<BoundedBuffer<u64, 2>> = Arc::new(BoundedBuffer::new());
        buffer.put(1);
        buffer.put(2);

        let stored = Arc::new(AtomicBool::new(false));
        let buffer_clone = Arc::clone(&buffer);
        let stored_clone = Arc::clone(&stored);
        let producer = thread::spawn(move || {
            buffer_clone.put(3);
            stored_clone.store(true, Ordering::Release);
        });

        // Full buffer: the third put must still be blocked.
        thread::sleep(Duration::from_millis(50));
        assert!(!stored.load(Ordering::Acquire));

        assert_eq!(buffer.take(), (0, 1));
        producer.join().unwrap();
        assert!(stored.load(Ordering::Acquire));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_take_blocks_when_empty() {
        let buffer: Arc<BoundedBuffer<u64, 2>> = Arc::new(BoundedBuffer::new());

        let taken = Arc::new(AtomicBool::new(false));
        let buffer_clone = Arc::clone(&buffer);
        let taken_clone = Arc::clone(&taken);
        let consumer = thread::spawn(move || {
            let (slot, value) = buffer_clone.take();
            taken_clone.store(true, Ordering::Release);
            (slot, value)
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!taken.load(Ordering::Acquire));

        buffer.put(42);
        assert_eq!(consumer.join().unwrap(), (0, 42));
    }

    #[test]
    fn test_slot_not_reused_before_taken() {
        // Capacity 1: every put must alternate with a take.
        let buffer: Arc<BoundedBuffer<u64, 1>> = Arc::new(BoundedBuffer::new());

        let buffer_clone = Arc::clone(&buffer);
        let producer = thread::spawn(move || {
            for i in 0..100u64 {
                let slot = buffer_clone.put(i);
                assert_eq!(slot, 0);
            }
        });

        for expected in 0..100u64 {
            let (slot, value) = buffer.take();
            assert_eq!(slot, 0);
            assert_eq!(value, expected);
        }

        producer.join().unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_concurrent_producers_lose_nothing() {
        let buffer: Arc<BoundedBuffer<(usize, u64), 8>> = Arc::new(BoundedBuffer::new());
        let producers = 4;
        let per_producer = 250u64;

        let mut handles = vec![];
        for id in 0..producers {
            let buffer = Arc::clone(&buffer);
            handles.push(thread::spawn(move || {
                for i in 0..per_producer {
                    buffer.put((id, i));
                }
            }));
        }

        let mut seen = std::collections::HashSet::new();
        for _ in 0..producers as u64 * per_producer {
            let (_, item) = buffer.take();
            assert!(seen.insert(item), "duplicate item {item:?}");
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(seen.len(), producers * per_producer as usize);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_non_copy_type() {
        let buffer: BoundedBuffer<String, 2> = BoundedBuffer::new();

        buffer.put("hello".to_string());
        buffer.put("world".to_string());

        assert_eq!(buffer.take().1, "hello");
        assert_eq!(buffer.take().1, "world");
    }
}
