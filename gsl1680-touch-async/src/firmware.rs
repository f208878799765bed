//! Firmware download.
//!
//! The vendor image is an ordered table of `(register, word)` pairs. A pair
//! addressed to [`reg::PAGE_REG`] moves the controller's page window; every
//! other pair is a data word for the current page. Data words are packed
//! little-endian into 32-byte blocks so the slow bus sees one transaction
//! per eight words instead of one per word.

use crate::conf::TrailingBlock;
use crate::reg;
use crate::transport::RegisterBus;

/// Bytes written per data transaction.
pub const BLOCK_LEN: usize = 32;

/// One entry of a firmware image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareRecord {
    /// Target register, or [`reg::PAGE_REG`] for a page switch.
    pub register: u8,
    /// Word to write, sent little-endian.
    pub value: u32,
}

impl FirmwareRecord {
    /// Builds a record; usable in `static` firmware tables.
    pub const fn new(register: u8, value: u32) -> Self {
        Self { register, value }
    }

    /// Returns `true` for a page-select control record.
    pub const fn is_page_select(&self) -> bool {
        self.register == reg::PAGE_REG
    }

    /// The value as it goes on the wire.
    pub const fn to_le_bytes(&self) -> [u8; 4] {
        self.value.to_le_bytes()
    }
}

/// What a download did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records processed, control records included.
    pub records: usize,
    /// Page-select writes issued.
    pub page_switches: usize,
    /// Data block writes issued.
    pub blocks: usize,
    /// Data bytes written.
    pub bytes: usize,
    /// Buffered data bytes that were never written, either because a page
    /// switch invalidated them or because the trailing block was truncated.
    pub discarded_bytes: usize,
}

struct BlockWriter {
    buf: [u8; BLOCK_LEN],
    len: usize,
    base: u8,
}

impl BlockWriter {
    fn new() -> Self {
        Self {
            buf: [0; BLOCK_LEN],
            len: 0,
            base: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_full(&self) -> bool {
        self.len == BLOCK_LEN
    }

    /// Appends a word; the first word after a reset anchors the block address.
    fn append(&mut self, record: &FirmwareRecord) {
        if self.is_empty() {
            self.base = record.register;
        }
        self.buf[self.len..self.len + 4].copy_from_slice(&record.to_le_bytes());
        self.len += 4;
    }

    /// Forgets the pending bytes and returns how many there were.
    fn discard(&mut self) -> usize {
        core::mem::replace(&mut self.len, 0)
    }

    async fn flush<B: RegisterBus>(
        &mut self,
        bus: &mut B,
        summary: &mut LoadSummary,
    ) -> Result<(), B::Error> {
        log::trace!("fw block {:#04x} ({} bytes)", self.base, self.len);
        bus.write_register(self.base, &self.buf[..self.len]).await?;
        summary.blocks += 1;
        summary.bytes += self.len;
        self.len = 0;
        Ok(())
    }
}

/// Downloads `image` to the controller.
///
/// Records are sent strictly in order. A page-select record is written on
/// its own as a 4-byte word and resets the pending block: bytes buffered for
/// the old page are dropped, matching the controller's page-window
/// semantics. Each flushed block is written as one contiguous transaction
/// starting at the register of its first word.
///
/// `trailing` decides the fate of a final block shorter than
/// [`BLOCK_LEN`]. The first bus error aborts the download.
pub async fn load<B: RegisterBus>(
    bus: &mut B,
    image: &[FirmwareRecord],
    trailing: TrailingBlock,
) -> Result<LoadSummary, B::Error> {
    let mut summary = LoadSummary::default();
    let mut block = BlockWriter::new();

    for record in image {
        summary.records += 1;

        if record.is_page_select() {
            summary.discarded_bytes += block.discard();
            bus.write_register(reg::PAGE_REG, &record.to_le_bytes())
                .await?;
            summary.page_switches += 1;
            continue;
        }

        block.append(record);
        if block.is_full() {
            block.flush(bus, &mut summary).await?;
        }
    }

    if !block.is_empty() {
        match trailing {
            TrailingBlock::Flush => block.flush(bus, &mut summary).await?,
            TrailingBlock::Truncate => {
                let dropped = block.discard();
                log::warn!("Dropping {dropped} trailing firmware bytes");
                summary.discarded_bytes += dropped;
            }
        }
    }

    log::debug!(
        "fw loaded: {} records, {} pages, {} blocks, {} bytes",
        summary.records,
        summary.page_switches,
        summary.blocks,
        summary.bytes
    );
    Ok(summary)
}
