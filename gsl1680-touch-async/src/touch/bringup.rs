//! Power-on bring-up: wake strobe, register clears, firmware download and
//! start of the touch engine.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use super::TouchController;
use crate::firmware;
use crate::reg;
use crate::transport::RegisterBus;

/// The stages of [`TouchController::bring_up`], in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUpStep {
    /// Low/high strobe of the wake line.
    WakeStrobe,
    /// Status clear, data-address reset and IRQ configuration.
    ClearRegisters,
    /// Zeroing the configuration block before the download.
    Reset,
    /// Firmware download.
    LoadFirmware,
    /// Zeroing the configuration block again after the download.
    PostLoadReset,
    /// Releasing the touch engine.
    Startup,
}

/// Underlying cause of a failed bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUpErrorKind<BusError, PinError> {
    /// A register write failed or timed out.
    Bus(BusError),
    /// The wake line could not be driven.
    Pin(PinError),
}

/// A bring-up attempt failed at `step`; later steps were not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BringUpError<BusError, PinError> {
    /// The step that failed.
    pub step: BringUpStep,
    /// What went wrong.
    pub kind: BringUpErrorKind<BusError, PinError>,
}

impl<BusError, PinError> BringUpError<BusError, PinError> {
    fn bus(step: BringUpStep) -> impl FnOnce(BusError) -> Self {
        move |err| Self {
            step,
            kind: BringUpErrorKind::Bus(err),
        }
    }

    fn pin(step: BringUpStep) -> impl FnOnce(PinError) -> Self {
        move |err| Self {
            step,
            kind: BringUpErrorKind::Pin(err),
        }
    }
}

impl<BusType, WakePin, DelayType> TouchController<'_, BusType, WakePin, DelayType>
where
    BusType: RegisterBus,
    WakePin: OutputPin,
    DelayType: DelayNs,
{
    /// Brings the controller from power-on to reporting touches.
    ///
    /// Runs the whole sequence every time it is called, so it doubles as the
    /// recovery path after a fault. Nothing is retried internally: the first
    /// failure aborts the remaining steps, leaves the controller `Faulted`
    /// and is returned to the caller, which owns the retry policy.
    pub async fn bring_up(
        &mut self,
    ) -> Result<(), BringUpError<BusType::Error, WakePin::Error>> {
        self.state.begin_bring_up();
        let result = self.bring_up_sequence().await;
        self.state.finish_bring_up(result.is_ok());

        match &result {
            Ok(()) => {
                self.read_errors_in_row = 0;
                log::info!("Touch controller ready");
            }
            Err(err) => log::warn!("Touch controller bring-up failed: {err:?}"),
        }
        result
    }

    async fn bring_up_sequence(
        &mut self,
    ) -> Result<(), BringUpError<BusType::Error, WakePin::Error>> {
        log::debug!("touch::bring_up wake strobe");
        self.wake_strobe()
            .await
            .map_err(BringUpError::pin(BringUpStep::WakeStrobe))?;

        log::debug!("touch::bring_up clear registers");
        self.clear_registers()
            .await
            .map_err(BringUpError::bus(BringUpStep::ClearRegisters))?;

        log::debug!("touch::bring_up reset");
        self.reset_chip()
            .await
            .map_err(BringUpError::bus(BringUpStep::Reset))?;

        log::debug!("touch::bring_up load firmware ({} records)", self.firmware.len());
        firmware::load(&mut self.bus, self.firmware, self.config.trailing_block)
            .await
            .map_err(BringUpError::bus(BringUpStep::LoadFirmware))?;

        log::debug!("touch::bring_up post-load reset");
        self.reset_chip()
            .await
            .map_err(BringUpError::bus(BringUpStep::PostLoadReset))?;

        log::debug!("touch::bring_up startup");
        self.bus
            .write_register(reg::STATUS_REG, &[reg::STATUS_RUN])
            .await
            .map_err(BringUpError::bus(BringUpStep::Startup))?;

        Ok(())
    }

    async fn wake_strobe(&mut self) -> Result<(), WakePin::Error> {
        let settle = self.config.wake_strobe_ms;

        self.wake.set_low()?;
        self.delay.delay_ms(settle * 2).await;
        self.wake.set_high()?;
        self.delay.delay_ms(settle).await;
        self.wake.set_low()?;
        self.delay.delay_ms(settle).await;
        self.wake.set_high()?;
        self.delay.delay_ms(settle).await;
        Ok(())
    }

    async fn clear_registers(&mut self) -> Result<(), BusType::Error> {
        let status_settle = self.config.status_settle_ms;
        let register_settle = self.config.register_settle_ms;

        self.write_and_settle(reg::STATUS_REG, &[reg::STATUS_CLEAR], status_settle)
            .await?;
        self.write_and_settle(reg::DATA_REG, &[reg::DATA_ADDRESS_RESET], register_settle)
            .await?;
        self.write_and_settle(reg::IRQ_CONFIG_REG, &[reg::IRQ_CONFIG], register_settle)
            .await?;
        self.write_and_settle(reg::STATUS_REG, &[reg::STATUS_RUN], status_settle)
            .await
    }

    async fn reset_chip(&mut self) -> Result<(), BusType::Error> {
        let status_settle = self.config.status_settle_ms;
        let reset_settle = self.config.reset_settle_ms;

        self.write_and_settle(reg::STATUS_REG, &[reg::STATUS_CLEAR], status_settle)
            .await?;
        self.write_and_settle(reg::IRQ_CONFIG_REG, &[reg::IRQ_CONFIG], reset_settle)
            .await?;
        self.write_and_settle(reg::CONFIG_BASE_REG, &[0; 4], reset_settle)
            .await
    }

    async fn write_and_settle(
        &mut self,
        register: u8,
        data: &[u8],
        settle_ms: u32,
    ) -> Result<(), BusType::Error> {
        self.bus.write_register(register, data).await?;
        self.delay.delay_ms(settle_ms).await;
        Ok(())
    }
}
