//! Driver configuration.

use crate::reg;

/// What the firmware loader does with a final block shorter than 32 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingBlock {
    /// Write the partial block like any other.
    Flush,
    /// Drop it, as the vendor reference loader does. The dropped bytes are
    /// reported in [`crate::firmware::LoadSummary::discarded_bytes`].
    Truncate,
}

/// Timing and policy parameters for a [`crate::TouchController`].
#[derive(Debug, Clone)]
pub struct Config {
    /// 7-bit I2C address of the controller.
    pub address: u8,
    /// Settle time after each edge of the wake strobe, in milliseconds.
    /// The line is held low for twice this long before the strobe starts.
    pub wake_strobe_ms: u32,
    /// Settle time after writes to the status register.
    pub status_settle_ms: u32,
    /// Settle time after the data-address and IRQ writes of the clear sequence.
    pub register_settle_ms: u32,
    /// Settle time after the IRQ and configuration writes of the reset sequence.
    pub reset_settle_ms: u32,
    /// Upper bound for a single bus transaction.
    pub bus_timeout_ms: u64,
    /// Handling of a trailing partial firmware block.
    pub trailing_block: TrailingBlock,
    /// Consecutive failed frame reads after which a ready controller is
    /// considered faulted. Single failures are only counted.
    pub fault_after_read_errors: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: reg::I2C_ADDRESS,
            wake_strobe_ms: 50,
            status_settle_ms: 20,
            register_settle_ms: 5,
            reset_settle_ms: 10,
            bus_timeout_ms: 1000,
            trailing_block: TrailingBlock::Flush,
            fault_after_read_errors: 16,
        }
    }
}
