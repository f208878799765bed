//! An asynchronous, `no_std` driver for the Silead GSL1680 capacitive touch
//! controller.
//!
//! This driver provides a `TouchController` that brings the GSL1680 up from
//! power-on (wake strobe, register clears, firmware download, start), reads
//! and decodes its multi-finger touch reports, and pushes them into an
//! [`embedded_isr_queue::IsrQueue`] from the interrupt side. A task on the
//! other side of the queue forwards the frames to a [`sink::TouchSink`], for
//! example [`sink::FingerMarkers`] drawing on any `embedded-graphics`
//! display.
//!
//! # Usage
//!
//! You need an I2C peripheral implementing `embedded-hal-async::i2c::I2c`,
//! the wake output pin, the interrupt input pin and the vendor firmware
//! table for your panel.
//!
//! ```ignore
//! use embassy_time::Delay;
//! use embedded_isr_queue::IsrQueue;
//! use gsl1680_touch_async::{Config, I2cRegisterBus, TouchController, TouchFrame};
//! use static_cell::StaticCell;
//!
//! static QUEUE: StaticCell<IsrQueue<TouchFrame, 16>> = StaticCell::new();
//!
//! let config = Config::default();
//! let bus = I2cRegisterBus::new(i2c, &config);
//! let mut touch = TouchController::new(bus, wake, Delay, &GSL1680_FW, config);
//! touch.bring_up().await?;
//!
//! let (mut producer, consumer) = QUEUE.init(IsrQueue::new()).split();
//! spawner.spawn(render(consumer)).unwrap();
//! touch.run(&mut irq, &mut producer).await;
//! ```

#![no_std]

#[cfg(test)]
extern crate std;

pub mod conf;
pub mod firmware;
pub mod frame;
pub mod reg;
pub mod sink;
pub mod state;
pub mod touch;
pub mod transport;

#[cfg(test)]
mod mock;

pub use conf::{Config, TrailingBlock};
pub use firmware::{FirmwareRecord, LoadSummary};
pub use frame::{decode, DecodeError, TouchFrame, TouchPoint};
pub use state::ControllerState;
pub use touch::{BringUpError, BringUpErrorKind, BringUpStep, ReadError, TouchController, TouchStats};
pub use transport::{I2cRegisterBus, RegisterBus, TransportError};
