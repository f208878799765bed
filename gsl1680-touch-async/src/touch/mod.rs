//! The GSL1680 controller: lifecycle, frame reads and the interrupt-side
//! producer.

mod bringup;

pub use bringup::{BringUpError, BringUpErrorKind, BringUpStep};

use embedded_hal_async::digital::Wait;
use embedded_isr_queue::Producer;

use crate::conf::Config;
use crate::firmware::FirmwareRecord;
use crate::frame::{DecodeError, RawFrame, TouchFrame, FRAME_LEN};
use crate::reg;
use crate::state::ControllerState;
use crate::transport::RegisterBus;

/// Why a frame could not be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError<BusError> {
    /// Frames are only readable once bring-up has completed.
    NotReady(ControllerState),
    /// The data register could not be read.
    Bus(BusError),
    /// The report was corrupt and has been dropped.
    Decode(DecodeError),
    /// The interrupt line could not be awaited.
    Interrupt,
}

impl<BusError> From<DecodeError> for ReadError<BusError> {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

/// Counters for the steady-state read path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchStats {
    /// Frames read and decoded successfully.
    pub frames: u32,
    /// Data register reads that failed.
    pub bus_errors: u32,
    /// Reports rejected by the decoder.
    pub corrupt_frames: u32,
}

/// A controller for the GSL1680 touch interface.
///
/// Owns the register bus, the wake line and a delay source. Call
/// [`TouchController::bring_up`] once before reading frames; after that,
/// drive [`TouchController::run`] (or [`TouchController::service_interrupt`]
/// from your own interrupt plumbing) to feed decoded frames into an
/// [`embedded_isr_queue::IsrQueue`].
pub struct TouchController<'a, BusType, WakePin, DelayType> {
    bus: BusType,
    wake: WakePin,
    delay: DelayType,
    firmware: &'a [FirmwareRecord],
    config: Config,
    state: ControllerState,
    stats: TouchStats,
    read_errors_in_row: u32,
}

impl<'a, BusType, WakePin, DelayType> TouchController<'a, BusType, WakePin, DelayType> {
    /// Creates a new `TouchController`.
    ///
    /// # Arguments
    ///
    /// * `bus` - Register access to the controller, usually an [`crate::I2cRegisterBus`].
    /// * `wake` - The wake output pin.
    /// * `delay` - Source of the settle delays between bring-up steps.
    /// * `firmware` - The vendor firmware table for this panel.
    /// * `config` - Timing and policy parameters.
    pub fn new(
        bus: BusType,
        wake: WakePin,
        delay: DelayType,
        firmware: &'a [FirmwareRecord],
        config: Config,
    ) -> Self {
        Self {
            bus,
            wake,
            delay,
            firmware,
            config,
            state: ControllerState::Uninitialized,
            stats: TouchStats::default(),
            read_errors_in_row: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Read-path counters since construction.
    pub fn stats(&self) -> TouchStats {
        self.stats
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gives back the peripherals.
    pub fn release(self) -> (BusType, WakePin, DelayType) {
        (self.bus, self.wake, self.delay)
    }
}

impl<BusType, WakePin, DelayType> TouchController<'_, BusType, WakePin, DelayType>
where
    BusType: RegisterBus,
{
    /// Reads and decodes the current touch report.
    ///
    /// Fails with [`ReadError::NotReady`] outside the `Ready` state. A bus
    /// error is counted and returned; only
    /// [`Config::fault_after_read_errors`] failures in a row move the
    /// controller to `Faulted` (zero disables that). Corrupt reports are
    /// counted and returned as [`ReadError::Decode`].
    pub async fn read_frame(&mut self) -> Result<TouchFrame, ReadError<BusType::Error>> {
        if !self.state.is_ready() {
            return Err(ReadError::NotReady(self.state));
        }

        let mut raw = RawFrame([0; FRAME_LEN]);
        if let Err(err) = self.bus.read_register(reg::DATA_REG, &mut raw.0).await {
            self.record_bus_error(&err);
            return Err(ReadError::Bus(err));
        }
        self.read_errors_in_row = 0;

        match raw.decode() {
            Ok(frame) => {
                self.stats.frames = self.stats.frames.saturating_add(1);
                Ok(frame)
            }
            Err(err) => {
                self.stats.corrupt_frames = self.stats.corrupt_frames.saturating_add(1);
                log::warn!("Dropping corrupt touch frame: {err:?}");
                Err(err.into())
            }
        }
    }

    fn record_bus_error(&mut self, err: &BusType::Error) {
        self.stats.bus_errors = self.stats.bus_errors.saturating_add(1);
        self.read_errors_in_row = self.read_errors_in_row.saturating_add(1);
        log::warn!("Error reading touch frame: {err:?}");

        let limit = self.config.fault_after_read_errors;
        if limit != 0 && self.read_errors_in_row >= limit {
            log::error!("{limit} touch reads failed in a row, controller faulted");
            self.state.fault();
        }
    }

    /// Reads the 4-byte chip status word.
    ///
    /// Needs a powered device, so it is refused before the first bring-up.
    pub async fn probe(&mut self) -> Result<u32, ReadError<BusType::Error>> {
        if self.state == ControllerState::Uninitialized {
            return Err(ReadError::NotReady(self.state));
        }
        let mut buf = [0u8; 4];
        self.bus
            .read_register(reg::CHIP_STATUS_REG, &mut buf)
            .await
            .map_err(ReadError::Bus)?;
        let status = u32::from_le_bytes(buf);
        log::debug!("touch chip status {status:#010x}");
        Ok(status)
    }

    /// Handles one touch interrupt: reads a frame and queues it.
    ///
    /// Only successfully decoded frames reach the queue.
    pub async fn service_interrupt<const N: usize>(
        &mut self,
        producer: &mut Producer<'_, TouchFrame, N>,
    ) -> Result<(), ReadError<BusType::Error>> {
        let frame = self.read_frame().await?;
        producer.push(frame);
        Ok(())
    }

    /// Services touch interrupts until the controller stops being ready or
    /// the interrupt line fails, and returns the reason.
    ///
    /// The controller raises its interrupt line when a new report is
    /// available. Read and decode failures are counted and skipped.
    pub async fn run<IrqPin, const N: usize>(
        &mut self,
        irq: &mut IrqPin,
        producer: &mut Producer<'_, TouchFrame, N>,
    ) -> ReadError<BusType::Error>
    where
        IrqPin: Wait,
    {
        loop {
            if !self.state.is_ready() {
                return ReadError::NotReady(self.state);
            }
            if let Err(err) = irq.wait_for_rising_edge().await {
                log::warn!("Error waiting for touch interrupt: {err:?}");
                return ReadError::Interrupt;
            }
            if let Err(ReadError::NotReady(state)) = self.service_interrupt(producer).await {
                return ReadError::NotReady(state);
            }
        }
    }
}
