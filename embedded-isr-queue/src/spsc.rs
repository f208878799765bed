//! Overwrite-on-full single-producer/single-consumer ring.
//!
//! The ring has `N` slots, `N` a power of two, and holds at most `N - 1`
//! items: one slot always stays free so that `head == tail` means empty.
//!
//! # Concurrency
//!
//! `head` belongs to the producer and `tail` to the consumer, and both are
//! published with release stores and read with acquire loads. The producer
//! only ever writes the free slot at `head`, which a pop never reads.
//!
//! On overflow the producer also advances `tail`. That step and
//! [`Consumer::pop`] both run inside `critical_section::with`, so the oldest
//! entry is never dropped while a pop is reading it, whether the producer
//! is an interrupt handler or another thread. A push into a queue with room
//! touches no shared index but its own. Only plain atomic loads and stores
//! are used, so the queue also works on cores without compare-and-swap.

use core::cell::UnsafeCell;
use core::future::poll_fn;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use core::task::Poll;

use embassy_sync::waitqueue::AtomicWaker;

/// A fixed-capacity queue handing items from an interrupt to a task.
///
/// Create it once (in a `static`, a `StaticCell`, or on the stack of a task
/// that outlives both parties) and call [`IsrQueue::split`] to obtain the
/// single [`Producer`] and the single [`Consumer`].
pub struct IsrQueue<T, const N: usize> {
    buffer: [UnsafeCell<MaybeUninit<T>>; N],
    head: AtomicUsize,
    tail: AtomicUsize,
    overflow: AtomicU32,
    waker: AtomicWaker,
}

// Slots are only touched through the split handles. Every step that moves
// `tail` runs in a critical section, see the module docs.
unsafe impl<T: Send, const N: usize> Sync for IsrQueue<T, N> {}

impl<T: Copy, const N: usize> IsrQueue<T, N> {
    const MASK: usize = {
        assert!(
            N >= 2 && N.is_power_of_two(),
            "IsrQueue slot count must be a power of two of at least 2"
        );
        N - 1
    };

    /// Creates an empty queue.
    pub const fn new() -> Self {
        let _mask = Self::MASK;
        Self {
            buffer: [const { UnsafeCell::new(MaybeUninit::uninit()) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            overflow: AtomicU32::new(0),
            waker: AtomicWaker::new(),
        }
    }

    /// Splits the queue into its producer and consumer halves.
    ///
    /// Taking `&mut self` guarantees there is only ever one of each.
    pub fn split(&mut self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        let queue: &Self = self;
        (Producer { queue }, Consumer { queue })
    }

    /// The maximum number of items the queue holds before it starts
    /// dropping the oldest one.
    pub const fn capacity(&self) -> usize {
        Self::MASK
    }

    /// Returns `true` when nothing is waiting to be popped.
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail) & Self::MASK
    }

    /// How many items were dropped because the consumer fell behind.
    ///
    /// The counter only ever grows; it saturates at `u32::MAX`.
    pub fn overflow_count(&self) -> u32 {
        self.overflow.load(Ordering::Relaxed)
    }

    fn push(&self, item: T) {
        let head = self.head.load(Ordering::Relaxed);
        // SAFETY: slot `head` is the free slot; the consumer never reads it.
        unsafe { (*self.buffer[head].get()).write(item) };

        let next = (head + 1) & Self::MASK;
        if next == self.tail.load(Ordering::Acquire) {
            // Full: give up the oldest entry before publishing the new head.
            // `tail` is the consumer's index, so this must not overlap a pop.
            critical_section::with(|_| {
                let tail = self.tail.load(Ordering::Acquire);
                if next == tail {
                    self.tail.store((tail + 1) & Self::MASK, Ordering::Release);
                    let dropped = self.overflow.load(Ordering::Relaxed);
                    self.overflow
                        .store(dropped.saturating_add(1), Ordering::Relaxed);
                }
            });
        }
        self.head.store(next, Ordering::Release);
        self.waker.wake();
    }

    fn pop(&self) -> Option<T> {
        critical_section::with(|_| {
            let tail = self.tail.load(Ordering::Acquire);
            if tail == self.head.load(Ordering::Acquire) {
                return None;
            }
            // SAFETY: `tail != head`, so slot `tail` holds a published item.
            let item = unsafe { (*self.buffer[tail].get()).assume_init_read() };
            self.tail.store((tail + 1) & Self::MASK, Ordering::Release);
            Some(item)
        })
    }
}

impl<T: Copy, const N: usize> Default for IsrQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// The interrupt-side half of an [`IsrQueue`].
pub struct Producer<'a, T, const N: usize> {
    queue: &'a IsrQueue<T, N>,
}

impl<T: Copy, const N: usize> Producer<'_, T, N> {
    /// Appends an item, dropping the oldest unread one if the queue is full.
    ///
    /// Never waits for the consumer, so it is safe to call from an interrupt
    /// handler. It only enters brief critical sections: one to drop the
    /// oldest item when full, and one to wake a parked [`Consumer::next`].
    pub fn push(&mut self, item: T) {
        self.queue.push(item)
    }

    /// See [`IsrQueue::overflow_count`].
    pub fn overflow_count(&self) -> u32 {
        self.queue.overflow_count()
    }
}

/// The task-side half of an [`IsrQueue`].
pub struct Consumer<'a, T, const N: usize> {
    queue: &'a IsrQueue<T, N>,
}

impl<T: Copy, const N: usize> Consumer<'_, T, N> {
    /// Removes and returns the oldest queued item, or `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        self.queue.pop()
    }

    /// Waits until an item is available and returns it.
    pub async fn next(&mut self) -> T {
        poll_fn(|cx| {
            if let Some(item) = self.queue.pop() {
                return Poll::Ready(item);
            }
            self.queue.waker.register(cx.waker());
            // A push may have landed between the first pop and registering.
            match self.queue.pop() {
                Some(item) => Poll::Ready(item),
                None => Poll::Pending,
            }
        })
        .await
    }

    /// Returns `true` when nothing is waiting to be popped.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// See [`IsrQueue::capacity`].
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// See [`IsrQueue::overflow_count`].
    pub fn overflow_count(&self) -> u32 {
        self.queue.overflow_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[test]
    fn pop_on_empty_returns_none() {
        let mut queue: IsrQueue<u8, 4> = IsrQueue::new();
        let (_producer, mut consumer) = queue.split();

        assert!(consumer.is_empty());
        assert_eq!(consumer.pop(), None);
        assert_eq!(consumer.overflow_count(), 0);
    }

    #[test]
    fn items_come_out_in_push_order() {
        let mut queue: IsrQueue<u16, 8> = IsrQueue::new();
        let (mut producer, mut consumer) = queue.split();

        for i in 0..5 {
            producer.push(i);
        }
        assert_eq!(consumer.len(), 5);

        let drained: Vec<u16> = core::iter::from_fn(|| consumer.pop()).collect();
        assert_eq!(drained, [0, 1, 2, 3, 4]);
        assert!(consumer.is_empty());
    }

    #[test]
    fn capacity_leaves_one_slot_free() {
        let queue: IsrQueue<u8, 16> = IsrQueue::new();
        assert_eq!(queue.capacity(), 15);
    }

    #[test]
    fn overflow_drops_the_oldest_item() {
        let mut queue: IsrQueue<u32, 8> = IsrQueue::new();
        let capacity = queue.capacity() as u32;
        let (mut producer, mut consumer) = queue.split();

        for i in 0..capacity {
            producer.push(i);
        }
        assert_eq!(producer.overflow_count(), 0);

        producer.push(capacity);
        assert_eq!(producer.overflow_count(), 1);
        assert_eq!(consumer.len(), capacity as usize);

        let drained: Vec<u32> = core::iter::from_fn(|| consumer.pop()).collect();
        let expected: Vec<u32> = (1..=capacity).collect();
        assert_eq!(drained, expected);
    }

    #[test]
    fn overflow_keeps_the_most_recent_items_across_wraparound() {
        let mut queue: IsrQueue<u32, 4> = IsrQueue::new();
        let (mut producer, mut consumer) = queue.split();

        for i in 0..10 {
            producer.push(i);
        }
        // Three slots usable, so seven items were dropped.
        assert_eq!(consumer.overflow_count(), 7);
        assert_eq!(consumer.pop(), Some(7));
        assert_eq!(consumer.pop(), Some(8));
        assert_eq!(consumer.pop(), Some(9));
        assert_eq!(consumer.pop(), None);
        assert_eq!(consumer.overflow_count(), 7);
    }

    #[test]
    fn interleaved_push_and_pop_wraps_indices() {
        let mut queue: IsrQueue<u32, 4> = IsrQueue::new();
        let (mut producer, mut consumer) = queue.split();

        for round in 0..20 {
            producer.push(round * 2);
            producer.push(round * 2 + 1);
            assert_eq!(consumer.pop(), Some(round * 2));
            assert_eq!(consumer.pop(), Some(round * 2 + 1));
        }
        assert!(consumer.is_empty());
        assert_eq!(consumer.overflow_count(), 0);
    }

    #[test]
    fn next_returns_already_queued_item() {
        let mut queue: IsrQueue<u8, 4> = IsrQueue::new();
        let (mut producer, mut consumer) = queue.split();

        producer.push(42);
        let item = embassy_futures::block_on(consumer.next());
        assert_eq!(item, 42);
    }

    #[test]
    fn next_parks_until_the_producer_pushes() {
        use embassy_futures::join::join;
        use embassy_futures::yield_now;

        let mut queue: IsrQueue<u8, 4> = IsrQueue::new();
        let (mut producer, mut consumer) = queue.split();

        let (item, ()) = embassy_futures::block_on(join(consumer.next(), async {
            yield_now().await;
            producer.push(7);
        }));
        assert_eq!(item, 7);
    }

    #[test]
    fn overflowing_producer_on_another_thread_never_tears_items() {
        const PUSHES: u64 = 50_000;

        let mut queue: IsrQueue<[u64; 8], 4> = IsrQueue::new();
        let (mut producer, mut consumer) = queue.split();

        let popped = std::thread::scope(|scope| {
            scope.spawn(move || {
                for i in 1..=PUSHES {
                    producer.push([i; 8]);
                }
            });

            let mut last = 0;
            let mut popped = 0;
            // The newest item is never dropped, so the last push always arrives.
            while last != PUSHES {
                match consumer.pop() {
                    Some(item) => {
                        assert!(item.iter().all(|&word| word == item[0]), "torn item {item:?}");
                        assert!(item[0] > last, "{} popped after {last}", item[0]);
                        last = item[0];
                        popped += 1;
                    }
                    None => std::thread::yield_now(),
                }
            }
            popped
        });

        assert!(consumer.is_empty());
        assert_eq!(popped + u64::from(consumer.overflow_count()), PUSHES);
    }
}
