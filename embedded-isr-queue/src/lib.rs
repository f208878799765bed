#![no_std]
//! Interrupt-to-task handoff queue.
//!
//! [`IsrQueue`] is a fixed-capacity ring shared by exactly one producer,
//! running in an interrupt handler, and exactly one consumer, running in an
//! ordinary task. The producer never blocks and never fails: when the ring
//! is full the oldest unread entry is dropped and an overflow counter is
//! bumped. The consumer pops inside a short critical section and can also
//! park on an async waker until the producer publishes something.
//!
//! ```no_run
//! use embedded_isr_queue::IsrQueue;
//!
//! let mut queue: IsrQueue<u32, 8> = IsrQueue::new();
//! let (mut producer, mut consumer) = queue.split();
//!
//! producer.push(1);
//! producer.push(2);
//! assert_eq!(consumer.pop(), Some(1));
//! assert_eq!(consumer.pop(), Some(2));
//! assert_eq!(consumer.pop(), None);
//! ```

// Note: the producer side is kept free of locks so it can run inside an
// interrupt handler. The single-core interrupt model makes the consumer's
// critical section sufficient to keep both sides consistent.

#[cfg(test)]
extern crate std;

pub mod spsc;

pub use spsc::{Consumer, IsrQueue, Producer};
