//! Blocking counting semaphore.
//!
//! A semaphore holds a non-negative permit count. [`Semaphore::acquire`]
//! blocks the calling thread until the count is positive, then decrements it;
//! [`Semaphore::release`] increments the count and wakes at most one waiter.
//! No fairness or wakeup order is guaranteed — waiters may be woken in any
//! order the platform condvar chooses.
//!
//! # Example
//!
//! ```
//! use handoff::sync::Semaphore;
//!
//! let sem = Semaphore::new(2);
//! sem.acquire();
//! sem.acquire();
//! assert!(!sem.try_acquire()); // no permits left
//! sem.release();
//! assert!(sem.try_acquire());
//! ```

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Counting semaphore built on a mutex-guarded counter and a condvar.
///
/// Used as a pure signaling mechanism: the permit count tracks a resource
/// (free slots, stored items), never mutual exclusion of data.
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Creates a semaphore with the given initial permit count.
    #[must_use]
    pub fn new(initial: usize) -> Self {
        Self {
            permits: Mutex::new(initial),
            available: Condvar::new(),
        }
    }

    /// Blocks until a permit is available, then takes it.
    pub fn acquire(&self) {
        let mut permits = self.lock_permits();
        while *permits == 0 {
            permits = self
                .available
                .wait(permits)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *permits -= 1;
    }

    /// Takes a permit if one is available without blocking.
    ///
    /// Returns `true` if a permit was taken.
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        let mut permits = self.lock_permits();
        if *permits == 0 {
            return false;
        }
        *permits -= 1;
        true
    }

    /// Returns a permit and wakes at most one blocked waiter.
    pub fn release(&self) {
        let mut permits = self.lock_permits();
        *permits += 1;
        drop(permits);
        self.available.notify_one();
    }

    /// Snapshot of the current permit count.
    ///
    /// Purely observational: the count may change before the caller can act
    /// on it.
    #[must_use]
    pub fn permits(&self) -> usize {
        *self.lock_permits()
    }

    /// Locks the permit counter, absorbing poisoning.
    ///
    /// A thread that panics between acquire and release leaves the counter
    /// itself consistent (it is only touched under this lock), so poisoning
    /// carries no information here.
    fn lock_permits(&self) -> MutexGuard<'_, usize> {
        self.permits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
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
    fn test_initial_permits() {
        let sem = Semaphore::new(3);
        assert_eq!(sem.permits(), 3);

        sem.acquire();
        sem.acquire();
        assert_eq!(sem.permits(), 1);

        sem.release();
        assert_eq!(sem.permits(), 2);
    }

    #[test]
    fn test_try_acquire_exhaustion() {
        let sem = Semaphore::new(1);

        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());

        sem.release();
        assert!(sem.try_acquire());
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let sem = Arc::new(Semaphore::new(0));
        let acquired = Arc::new(AtomicBool::new(false));

        let sem_clone = Arc::clone(&sem);
        let acquired_clone = Arc::clone(&acquired);
        let waiter = thread::spawn(move || {
            sem_clone.acquire();
            acquired_clone.store(true, Ordering::Release);
        });

        // The waiter should still be blocked with zero permits.
        thread::sleep(Duration::from_millis(50));
        assert!(!acquired.load(Ordering::Acquire));

        sem.release();
        waiter.join().unwrap();
        assert!(acquired.load(Ordering::Acquire));
        assert_eq!(sem.permits(), 0);
    }

    #[test]
    fn test_release_wakes_one_waiter_at_a_time() {
        let sem = Arc::new(Semaphore::new(0));
        let woken = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let mut waiters = vec![];
        for _ in 0..4 {
            let sem = Arc::clone(&sem);
            let woken = Arc::clone(&woken);
            waiters.push(thread::spawn(move || {
                sem.acquire();
                woken.fetch_add(1, Ordering::AcqRel);
            }));
        }

        thread::sleep(Duration::from_millis(50));
        assert_eq!(woken.load(Ordering::Acquire), 0);

        for expected in 1..=4 {
            sem.release();
            // Wait for exactly one more waiter to get through.
            let deadline = std::time::Instant::now() + Duration::from_secs(5);
            while woken.load(Ordering::Acquire) < expected {
                assert!(std::time::Instant::now() < deadline, "waiter never woke");
                thread::yield_now();
            }
            assert_eq!(woken.load(Ordering::Acquire), expected);
        }

        for waiter in waiters {
            waiter.join().unwrap();
        }
    }

    #[test]
    fn test_permit_count_over_contention() {
        let sem = Arc::new(Semaphore::new(5));
        let mut handles = vec![];

        for _ in 0..8 {
            let sem = Arc::clone(&sem);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    sem.acquire();
                    sem.release();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // Every acquire was paired with a release.
        assert_eq!(sem.permits(), 5);
    }
}
