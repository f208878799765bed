//! Register-level access to the controller.
//!
//! Everything above this module talks to the chip through [`RegisterBus`],
//! so the bring-up and decoding logic can be exercised without hardware.

use core::fmt::Debug;

use embassy_time::{with_timeout, Duration};
use embedded_hal_async::i2c::{I2c, SevenBitAddress};
use heapless::Vec;

use crate::conf::Config;

/// Largest payload accepted by a single register write.
pub const MAX_WRITE_LEN: usize = 32;

/// "Write N bytes to register R" / "read N bytes from register R".
///
/// Implementations must bound every call in time: a transaction that does
/// not complete fails instead of hanging.
#[allow(async_fn_in_trait)]
pub trait RegisterBus {
    /// Error reported when a transaction fails.
    type Error: Debug;

    /// Writes `data` starting at `register`.
    async fn write_register(&mut self, register: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Fills `buf` with bytes read starting at `register`.
    async fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// A failed bus transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError<E> {
    /// The I2C peripheral reported an error.
    I2c(E),
    /// The transaction did not finish within the configured timeout.
    Timeout,
    /// The payload does not fit in one write transaction.
    PayloadTooLong(usize),
}

/// [`RegisterBus`] over an `embedded-hal-async` I2C peripheral.
pub struct I2cRegisterBus<I2cType> {
    i2c: I2cType,
    address: SevenBitAddress,
    timeout: Duration,
}

impl<I2cType> I2cRegisterBus<I2cType>
where
    I2cType: I2c<SevenBitAddress>,
{
    /// Wraps `i2c`, taking the device address and timeout from `config`.
    pub fn new(i2c: I2cType, config: &Config) -> Self {
        Self {
            i2c,
            address: config.address,
            timeout: Duration::from_millis(config.bus_timeout_ms),
        }
    }

    /// Gives the peripheral back.
    pub fn release(self) -> I2cType {
        self.i2c
    }
}

impl<I2cType> RegisterBus for I2cRegisterBus<I2cType>
where
    I2cType: I2c<SevenBitAddress>,
{
    type Error = TransportError<I2cType::Error>;

    async fn write_register(&mut self, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        if data.len() > MAX_WRITE_LEN {
            return Err(TransportError::PayloadTooLong(data.len()));
        }
        let mut frame: Vec<u8, { MAX_WRITE_LEN + 1 }> = Vec::new();
        // Cannot fail: the length was checked above.
        let _ = frame.push(register);
        let _ = frame.extend_from_slice(data);

        match with_timeout(self.timeout, self.i2c.write(self.address, &frame)).await {
            Ok(result) => result.map_err(|err| {
                log::warn!("Error writing register {register:#04x}: {err:?}");
                TransportError::I2c(err)
            }),
            Err(_) => {
                log::warn!("Timeout writing register {register:#04x}");
                Err(TransportError::Timeout)
            }
        }
    }

    async fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        match with_timeout(self.timeout, self.i2c.write_read(self.address, &[register], buf)).await
        {
            Ok(result) => result.map_err(|err| {
                log::warn!("Error reading register {register:#04x}: {err:?}");
                TransportError::I2c(err)
            }),
            Err(_) => {
                log::warn!("Timeout reading register {register:#04x}");
                Err(TransportError::Timeout)
            }
        }
    }
}
