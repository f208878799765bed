//! Bring up a GSL1680 and paint a marker under every finger.
//!
//! Written against the generic `embedded-hal` traits: plug in your HAL's
//! I2C peripheral, wake and interrupt pins, and display.
#![allow(dead_code)]

use embassy_time::{Delay, Duration, Timer};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::DrawTarget;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};
use embedded_isr_queue::{Consumer, IsrQueue, Producer};
use gsl1680_touch_async::firmware::FirmwareRecord;
use gsl1680_touch_async::reg::PAGE_REG;
use gsl1680_touch_async::sink::{self, FingerMarkers};
use gsl1680_touch_async::{Config, I2cRegisterBus, TouchController, TouchFrame};
use static_cell::StaticCell;

// The real table comes from the panel vendor and runs to thousands of entries.
static GSL1680_FW: [FirmwareRecord; 3] = [
    FirmwareRecord::new(PAGE_REG, 0x0000_0000),
    FirmwareRecord::new(0x00, 0x3A00_00F0),
    FirmwareRecord::new(0x04, 0xA500_0000),
];

static QUEUE: StaticCell<IsrQueue<TouchFrame, 16>> = StaticCell::new();

fn queue() -> (
    Producer<'static, TouchFrame, 16>,
    Consumer<'static, TouchFrame, 16>,
) {
    QUEUE.init(IsrQueue::new()).split()
}

/// Interrupt side: bring the controller up, then feed the queue.
async fn touch_task<I2cType, WakePin, IrqPin>(
    i2c: I2cType,
    wake: WakePin,
    mut irq: IrqPin,
    mut producer: Producer<'static, TouchFrame, 16>,
) where
    I2cType: I2c<SevenBitAddress>,
    WakePin: OutputPin,
    IrqPin: Wait,
{
    let config = Config::default();
    let bus = I2cRegisterBus::new(i2c, &config);
    let mut touch = TouchController::new(bus, wake, Delay, &GSL1680_FW, config);

    loop {
        // Retry policy lives here, not in the driver.
        if let Err(err) = touch.bring_up().await {
            log::warn!("Touch bring-up failed at {:?}, retrying", err.step);
            Timer::after(Duration::from_millis(500)).await;
            continue;
        }
        if let Ok(status) = touch.probe().await {
            log::info!("GSL1680 status {status:#010x}");
        }

        let reason = touch.run(&mut irq, &mut producer).await;
        log::warn!("Touch loop stopped: {reason:?}, stats {:?}", touch.stats());
    }
}

/// Task side: draw what the controller reports.
async fn render_task<D>(display: D, mut consumer: Consumer<'static, TouchFrame, 16>)
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: core::fmt::Debug,
{
    let mut markers = FingerMarkers::new(display);
    sink::forward(&mut consumer, &mut markers).await;
}

fn main() {}
