//! GSL1680 register map and command bytes.
//!
//! These values are fixed by the controller and its vendor bring-up
//! sequence; they are not meant to be tuned.

/// Default 7-bit I2C address.
pub const I2C_ADDRESS: u8 = 0x40;

/// Touch report: finger count followed by packed coordinates.
pub const DATA_REG: u8 = 0x80;
/// Chip status word, readable once the controller is powered.
pub const CHIP_STATUS_REG: u8 = 0xB0;
/// Base of the configuration block zeroed before and after firmware load.
pub const CONFIG_BASE_REG: u8 = 0xBC;
/// Status / run-control register.
pub const STATUS_REG: u8 = 0xE0;
/// Interrupt configuration.
pub const IRQ_CONFIG_REG: u8 = 0xE4;
/// Page window for firmware writes.
pub const PAGE_REG: u8 = 0xF0;

// --- Command bytes ---
/// Written to `STATUS_REG`: clear status and halt the core.
pub const STATUS_CLEAR: u8 = 0x88;
/// Written to `STATUS_REG`: release the core into normal operation.
pub const STATUS_RUN: u8 = 0x00;
/// Written to `DATA_REG`: reset the data address pointer.
pub const DATA_ADDRESS_RESET: u8 = 0x01;
/// Written to `IRQ_CONFIG_REG`.
pub const IRQ_CONFIG: u8 = 0x04;
