//! Field schema of a stored program
//!
//! Every field has a fixed byte width. Decoding takes the field address and
//! returns the value plus the address of the next field, so the read and
//! write paths walk the exact same sequence.

use crate::mask::MaskPattern;
use crate::patch::Patch;
use crate::source::SourceId;

/// Width of every block in a record
pub const BLOCK: usize = 4;

/// A fixed width field of a program record
pub trait Field: Sized {
    const WIDTH: usize;

    /// Decode the field at `addr`, returning it and the next address
    fn decode(buf: &[u8], addr: usize) -> (Self, usize);

    /// Encode the field at `addr`, returning the next address
    fn encode(&self, buf: &mut [u8], addr: usize) -> usize;
}

fn block(buf: &[u8], addr: usize) -> [u8; BLOCK] {
    let mut bytes = [0; BLOCK];
    bytes.copy_from_slice(&buf[addr..addr + BLOCK]);
    bytes
}

/// Oscillator settings: `[rate, 0, 0, 0]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OscillatorBlock {
    pub rate: SourceId,
}

impl Field for OscillatorBlock {
    const WIDTH: usize = BLOCK;

    fn decode(buf: &[u8], addr: usize) -> (Self, usize) {
        let bytes = block(buf, addr);
        let rate = SourceId::from_raw(bytes[0]);
        (Self { rate }, addr + Self::WIDTH)
    }

    fn encode(&self, buf: &mut [u8], addr: usize) -> usize {
        buf[addr..addr + BLOCK].copy_from_slice(&[self.rate.raw(), 0, 0, 0]);
        addr + Self::WIDTH
    }
}

/// Gate mask settings: `[rate, pattern, 0, 0]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskBlock {
    pub rate: SourceId,
    pub pattern: MaskPattern,
}

impl Field for MaskBlock {
    const WIDTH: usize = BLOCK;

    fn decode(buf: &[u8], addr: usize) -> (Self, usize) {
        let bytes = block(buf, addr);
        let value = Self {
            rate: SourceId::from_raw(bytes[0]),
            pattern: MaskPattern::from_byte(bytes[1]),
        };
        (value, addr + Self::WIDTH)
    }

    fn encode(&self, buf: &mut [u8], addr: usize) -> usize {
        let bytes = [self.rate.raw(), self.pattern.to_byte(), 0, 0];
        buf[addr..addr + BLOCK].copy_from_slice(&bytes);
        addr + Self::WIDTH
    }
}

/// Renderer pattern bytes, stored as they are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternDescriptor(pub [u8; BLOCK]);

impl Field for PatternDescriptor {
    const WIDTH: usize = BLOCK;

    fn decode(buf: &[u8], addr: usize) -> (Self, usize) {
        (Self(block(buf, addr)), addr + Self::WIDTH)
    }

    fn encode(&self, buf: &mut [u8], addr: usize) -> usize {
        buf[addr..addr + BLOCK].copy_from_slice(&self.0);
        addr + Self::WIDTH
    }
}

/// Patch: `[rate, rate shift, scale, trigger]`
impl Field for Patch {
    const WIDTH: usize = BLOCK;

    #[allow(clippy::cast_possible_wrap)]
    fn decode(buf: &[u8], addr: usize) -> (Self, usize) {
        let bytes = block(buf, addr);
        let patch = Self {
            rate: SourceId::from_raw(bytes[0]),
            rate_shift: bytes[1] as i8,
            scale: SourceId::from_raw(bytes[2]),
            trigger: SourceId::from_raw(bytes[3]),
        };
        (patch, addr + Self::WIDTH)
    }

    #[allow(clippy::cast_sign_loss)]
    fn encode(&self, buf: &mut [u8], addr: usize) -> usize {
        let bytes = [
            self.rate.raw(),
            self.rate_shift as u8,
            self.scale.raw(),
            self.trigger.raw(),
        ];
        buf[addr..addr + BLOCK].copy_from_slice(&bytes);
        addr + Self::WIDTH
    }
}

/// Size in bytes of a record for `channels` channels
pub const fn record_size(channels: usize) -> usize {
    OscillatorBlock::WIDTH
        + MaskBlock::WIDTH
        + channels * (PatternDescriptor::WIDTH + <Patch as Field>::WIDTH)
}
