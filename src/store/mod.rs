//! Program storage
//!
//! Layout of the non-volatile store:
//!
//! | address | content |
//! |---|---|
//! | 0 | channel count the store was written for |
//! | 1 | number of programs |
//! | 2 | source driving automatic program cycling |
//! | 8.. | program records, program `k` at `8 + (k - 1) * record size` |
//!
//! A store written for a different channel count is treated as empty.

pub mod schema;

use embedded_storage::Storage;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::MAX_CHANNELS;
use crate::mask::MaskPattern;
use crate::patch::Patch;
use crate::source::SourceId;
use schema::{Field, MaskBlock, OscillatorBlock, PatternDescriptor, record_size};

/// Address of the first program record
pub const RECORDS_START: u32 = 8;

/// Largest record the store handles
pub const MAX_RECORD_SIZE: usize = record_size(MAX_CHANNELS);

const TAG_ADDR: u32 = 0;
const COUNT_ADDR: u32 = 1;
const HEADER_LEN: usize = 3;

/// Errors returned by [`ProgramStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError<E> {
    /// The underlying storage failed
    Storage(E),
    /// Program index is 0 or past the last program
    ProgramOutOfRange(u8),
    /// Requested program count does not fit the storage
    CapacityExceeded,
}

/// Global settings at the start of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreHeader {
    /// Channel count the programs were written for
    pub channels: u8,
    pub program_count: u8,
    /// Source driving automatic program cycling
    pub cycle_rate: SourceId,
}

impl StoreHeader {
    const fn empty(channels: u8) -> Self {
        Self {
            channels,
            program_count: 0,
            cycle_rate: SourceId::OFF,
        }
    }

    const fn from_bytes(bytes: [u8; HEADER_LEN]) -> Self {
        Self {
            channels: bytes[0],
            program_count: bytes[1],
            cycle_rate: SourceId::from_raw(bytes[2]),
        }
    }

    const fn to_bytes(self) -> [u8; HEADER_LEN] {
        [self.channels, self.program_count, self.cycle_rate.raw()]
    }
}

/// One complete stored configuration for `N` channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramRecord<const N: usize> {
    pub oscillator_rate: SourceId,
    pub mask_rate: SourceId,
    pub mask_pattern: MaskPattern,
    /// Renderer pattern bytes per channel
    pub patterns: [[u8; 4]; N],
    pub patches: [Patch; N],
}

impl<const N: usize> Default for ProgramRecord<N> {
    fn default() -> Self {
        Self {
            oscillator_rate: SourceId::OFF,
            mask_rate: SourceId::OFF,
            mask_pattern: MaskPattern::DISABLED,
            patterns: [[0; 4]; N],
            patches: [Patch::default(); N],
        }
    }
}

impl<const N: usize> ProgramRecord<N> {
    /// Encoded size in bytes
    pub const SIZE: usize = record_size(N);

    /// Decode a record from the start of `buf`
    ///
    /// Fields are read in storage order: oscillator, mask, all patterns,
    /// all patches.
    pub fn decode(buf: &[u8]) -> Self {
        let mut record = Self::default();
        let (oscillator, addr) = OscillatorBlock::decode(buf, 0);
        let (mask, mut addr) = MaskBlock::decode(buf, addr);
        record.oscillator_rate = oscillator.rate;
        record.mask_rate = mask.rate;
        record.mask_pattern = mask.pattern;
        for pattern in &mut record.patterns {
            let (descriptor, next) = PatternDescriptor::decode(buf, addr);
            *pattern = descriptor.0;
            addr = next;
        }
        for patch in &mut record.patches {
            let (decoded, next) = Patch::decode(buf, addr);
            *patch = decoded;
            addr = next;
        }
        record
    }

    /// Encode the record to the start of `buf`, in the same order as
    /// [`ProgramRecord::decode`]
    pub fn encode(&self, buf: &mut [u8]) {
        let oscillator = OscillatorBlock {
            rate: self.oscillator_rate,
        };
        let mask = MaskBlock {
            rate: self.mask_rate,
            pattern: self.mask_pattern,
        };
        let mut addr = oscillator.encode(buf, 0);
        addr = mask.encode(buf, addr);
        for pattern in &self.patterns {
            addr = PatternDescriptor(*pattern).encode(buf, addr);
        }
        for patch in &self.patches {
            addr = patch.encode(buf, addr);
        }
    }
}

/// Program store on top of a byte addressable storage
pub struct ProgramStore<S: Storage, const N: usize> {
    storage: S,
    header: StoreHeader,
}

#[allow(clippy::cast_possible_truncation)]
impl<S: Storage, const N: usize> ProgramStore<S, N> {
    /// Wrap a storage, call [`ProgramStore::open`] before loading
    pub const fn new(storage: S) -> Self {
        const { assert!(N <= MAX_CHANNELS) };
        Self {
            storage,
            header: StoreHeader::empty(N as u8),
        }
    }

    pub const fn header(&self) -> StoreHeader {
        self.header
    }

    /// Release the underlying storage
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Number of programs the storage can hold
    pub fn max_programs(&self) -> u8 {
        let space = self
            .storage
            .capacity()
            .saturating_sub(RECORDS_START as usize);
        (space / ProgramRecord::<N>::SIZE).min(usize::from(u8::MAX)) as u8
    }

    /// Read and validate the header
    ///
    /// A store written for another channel count gets its program count
    /// zeroed and is reported as empty.
    pub fn open(&mut self) -> Result<StoreHeader, StoreError<S::Error>> {
        let mut bytes = [0; HEADER_LEN];
        self.storage
            .read(TAG_ADDR, &mut bytes)
            .map_err(StoreError::Storage)?;
        let mut header = StoreHeader::from_bytes(bytes);

        if usize::from(header.channels) != N {
            #[cfg(feature = "esp32-log")]
            println!(
                "store: written for {} channels, expected {}",
                header.channels, N
            );
            self.storage
                .write(COUNT_ADDR, &[0])
                .map_err(StoreError::Storage)?;
            header.program_count = 0;
        }
        header.program_count = header.program_count.min(self.max_programs());

        self.header = header;
        Ok(header)
    }

    /// Write a fresh header for `program_count` programs
    pub fn format(
        &mut self,
        program_count: u8,
        cycle_rate: SourceId,
    ) -> Result<StoreHeader, StoreError<S::Error>> {
        if program_count > self.max_programs() {
            return Err(StoreError::CapacityExceeded);
        }
        let header = StoreHeader {
            channels: N as u8,
            program_count,
            cycle_rate,
        };
        self.storage
            .write(TAG_ADDR, &header.to_bytes())
            .map_err(StoreError::Storage)?;
        self.header = header;
        Ok(header)
    }

    /// Byte address of program `index` (1-based)
    pub fn address(&self, index: u8) -> Result<u32, StoreError<S::Error>> {
        if index == 0 || index > self.max_programs() {
            return Err(StoreError::ProgramOutOfRange(index));
        }
        let offset = usize::from(index - 1) * ProgramRecord::<N>::SIZE;
        Ok(RECORDS_START + offset as u32)
    }

    /// Read program `index` (1-based)
    pub fn load(&mut self, index: u8) -> Result<ProgramRecord<N>, StoreError<S::Error>> {
        if index > self.header.program_count {
            return Err(StoreError::ProgramOutOfRange(index));
        }
        let address = self.address(index)?;
        let mut buf = [0; MAX_RECORD_SIZE];
        let bytes = &mut buf[..ProgramRecord::<N>::SIZE];
        self.storage
            .read(address, bytes)
            .map_err(StoreError::Storage)?;
        Ok(ProgramRecord::decode(bytes))
    }

    /// Write program `index` (1-based)
    ///
    /// The header is left untouched; programs past the stored count only
    /// become loadable after [`ProgramStore::format`].
    pub fn save(
        &mut self,
        index: u8,
        record: &ProgramRecord<N>,
    ) -> Result<(), StoreError<S::Error>> {
        let address = self.address(index)?;
        let mut buf = [0; MAX_RECORD_SIZE];
        let bytes = &mut buf[..ProgramRecord::<N>::SIZE];
        record.encode(bytes);
        self.storage
            .write(address, bytes)
            .map_err(StoreError::Storage)
    }
}
