//! Recording fakes for the peripherals the driver consumes.

use core::convert::Infallible;
use std::vec::Vec;

use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;

use crate::frame::FRAME_LEN;
use crate::transport::RegisterBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

/// A bus that records every write and answers reads from a script.
#[derive(Default)]
pub struct FakeBus {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub reads: Vec<u8>,
    /// Zero-based index of the write attempt that fails.
    pub fail_write_at: Option<usize>,
    /// Reads that fail before `frames` is consulted again.
    pub failing_reads: usize,
    /// Reports handed out by consecutive data reads; the last one repeats.
    pub frames: Vec<[u8; FRAME_LEN]>,
    write_attempts: usize,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_write(index: usize) -> Self {
        Self {
            fail_write_at: Some(index),
            ..Self::default()
        }
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts
    }
}

impl RegisterBus for FakeBus {
    type Error = BusFault;

    async fn write_register(&mut self, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        let attempt = self.write_attempts;
        self.write_attempts += 1;
        if self.fail_write_at == Some(attempt) {
            return Err(BusFault);
        }
        self.writes.push((register, data.to_vec()));
        Ok(())
    }

    async fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.reads.push(register);
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(BusFault);
        }
        let frame = if self.frames.len() > 1 {
            self.frames.remove(0)
        } else {
            self.frames.first().copied().unwrap_or([0; FRAME_LEN])
        };
        let len = buf.len().min(FRAME_LEN);
        buf[..len].copy_from_slice(&frame[..len]);
        Ok(())
    }
}

/// An output pin that remembers every level it was driven to.
#[derive(Default)]
pub struct FakePin {
    pub levels: Vec<bool>,
}

impl ErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

/// A delay that returns immediately and logs the requested milliseconds.
#[derive(Default)]
pub struct FakeDelay {
    pub waits_ms: Vec<u32>,
}

impl FakeDelay {
    pub fn total_ms(&self) -> u32 {
        self.waits_ms.iter().sum()
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

/// An interrupt line that fires `edges` times and then reports an error.
pub struct FakeIrq {
    pub edges: usize,
}

#[derive(Debug)]
pub struct IrqFault;

impl embedded_hal::digital::Error for IrqFault {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl ErrorType for FakeIrq {
    type Error = IrqFault;
}

impl FakeIrq {
    fn edge(&mut self) -> Result<(), IrqFault> {
        if self.edges == 0 {
            return Err(IrqFault);
        }
        self.edges -= 1;
        Ok(())
    }
}

impl Wait for FakeIrq {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        self.edge()
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        self.edge()
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        self.edge()
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.edge()
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        self.edge()
    }
}
