//! Sketch of the interrupt-to-task handoff this crate is built for.
//!
//! The queue lives in a `StaticCell` so both halves get a `'static`
//! lifetime: the producer is moved into the interrupt handler's state, the
//! consumer into an async task.
#![allow(dead_code)]

use embedded_isr_queue::{Consumer, IsrQueue, Producer};
use static_cell::StaticCell;

#[derive(Debug, Clone, Copy)]
struct Sample {
    channel: u8,
    value: u16,
}

static QUEUE: StaticCell<IsrQueue<Sample, 16>> = StaticCell::new();

fn setup() -> (
    Producer<'static, Sample, 16>,
    Consumer<'static, Sample, 16>,
) {
    QUEUE.init(IsrQueue::new()).split()
}

/// Called from the interrupt handler.
fn on_interrupt(producer: &mut Producer<'static, Sample, 16>, raw: u16) {
    producer.push(Sample {
        channel: 0,
        value: raw,
    });
}

/// Runs as an ordinary task.
async fn consume(mut consumer: Consumer<'static, Sample, 16>) -> ! {
    loop {
        let sample = consumer.next().await;
        // A non-zero overflow count means only the newest samples survived.
        let _ = (sample.channel, sample.value, consumer.overflow_count());
    }
}

fn main() {}
