//! Trigger/gate mask generator
//!
//! Animates a bit mask across the channels. Each bit is published to the
//! channel's gate mask source as a hard 0/1023 value so it can gate or
//! trigger the channel's waveform.

use crate::patch::TRIPLE;
use crate::source::{LEVEL_MAX, SourceId, SourceTable};

const STEP_THRESHOLD: u16 = 2048;
const TRIPLIFY_FLAG: u8 = 0x80;
const KIND_MASK: u8 = 0x0F;

const KIND_DISABLED: u8 = 0;
const KIND_SINGLE: u8 = 1;
const KIND_GROW: u8 = 2;
const KIND_PASS: u8 = 3;
const KIND_DOUBLE: u8 = 4;

/// Movement of the mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MaskKind {
    /// No movement, slots are left as they are
    #[default]
    Disabled = KIND_DISABLED,
    /// One bit marching up, wrapping to the bottom
    Single = KIND_SINGLE,
    /// Bar growing to the top and shrinking back
    Grow = KIND_GROW,
    /// Bar growing, sliding out at the top and coming back the same way
    Pass = KIND_PASS,
    /// Two adjacent bits marching up, wrapping to the bottom
    Double = KIND_DOUBLE,
}

impl MaskKind {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            KIND_DISABLED => Self::Disabled,
            KIND_SINGLE => Self::Single,
            KIND_GROW => Self::Grow,
            KIND_PASS => Self::Pass,
            KIND_DOUBLE => Self::Double,
            _ => return None,
        })
    }
}

/// Mask movement plus the triplify modifier
///
/// Stored as one byte: the low nibble holds the kind, bit 7 the modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskPattern {
    pub kind: MaskKind,
    /// Run the pattern on 3 bits and repeat it over every RGB triple
    pub triplify: bool,
}

impl MaskPattern {
    pub const DISABLED: Self = Self::new(MaskKind::Disabled);

    pub const fn new(kind: MaskKind) -> Self {
        Self {
            kind,
            triplify: false,
        }
    }

    #[must_use]
    pub const fn triplified(mut self) -> Self {
        self.triplify = true;
        self
    }

    /// Decode a stored pattern byte, unknown kinds decode as disabled
    pub const fn from_byte(byte: u8) -> Self {
        let kind = match MaskKind::from_raw(byte & KIND_MASK) {
            Some(kind) => kind,
            None => MaskKind::Disabled,
        };
        Self {
            kind,
            triplify: byte & TRIPLIFY_FLAG != 0,
        }
    }

    pub const fn to_byte(self) -> u8 {
        let flag = if self.triplify { TRIPLIFY_FLAG } else { 0 };
        self.kind as u8 | flag
    }
}

/// Animated gate mask for `N` channels
#[derive(Debug, Clone)]
pub struct MaskGenerator<const N: usize> {
    rate: SourceId,
    pattern: MaskPattern,
    run_length: usize,
    limit: u16,
    mask: u16,
    counter: u16,
    rising: bool,
}

impl<const N: usize> MaskGenerator<N> {
    pub const fn new(rate: SourceId) -> Self {
        let mut generator = Self {
            rate,
            pattern: MaskPattern::DISABLED,
            run_length: N,
            limit: 0,
            mask: 1,
            counter: 0,
            rising: true,
        };
        generator.set_pattern(MaskPattern::DISABLED);
        generator
    }

    pub const fn rate(&self) -> SourceId {
        self.rate
    }

    pub fn set_rate(&mut self, rate: SourceId) {
        self.rate = rate;
    }

    pub const fn pattern(&self) -> MaskPattern {
        self.pattern
    }

    pub const fn mask(&self) -> u16 {
        self.mask
    }

    /// Number of bits the pattern runs over
    pub const fn run_length(&self) -> usize {
        self.run_length
    }

    /// Highest mask value for the current run length
    pub const fn limit(&self) -> u16 {
        self.limit
    }

    /// Switch pattern
    ///
    /// Run length and limit are derived here and the movement restarts from
    /// the bottom bit.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn set_pattern(&mut self, pattern: MaskPattern) {
        let run_length = if pattern.triplify && N >= TRIPLE {
            TRIPLE
        } else {
            N
        };
        self.pattern = pattern;
        self.run_length = run_length;
        self.limit = ((1u32 << run_length) - 1) as u16;
        self.mask = 1;
        self.counter = 0;
        self.rising = true;
    }

    /// Accumulate one tick of progress and step the mask when due
    ///
    /// Returns if the mask moved.
    pub fn tick(&mut self, sources: &mut SourceTable<N>) -> bool {
        if self.pattern.kind == MaskKind::Disabled {
            return false;
        }
        self.counter += sources.get(self.rate) >> 2;
        if self.counter < STEP_THRESHOLD {
            return false;
        }
        self.counter = 0;
        self.step();
        self.publish(sources);
        true
    }

    /// Apply exactly one transition of the current pattern
    pub fn step(&mut self) {
        if self.limit <= 1 {
            self.mask = 1;
            return;
        }
        let top = 1 << (self.run_length - 1);
        match self.pattern.kind {
            MaskKind::Disabled => {}
            MaskKind::Single => {
                self.mask <<= 1;
                if self.mask > self.limit {
                    self.mask = 1;
                }
            }
            MaskKind::Double => {
                self.mask <<= 1;
                if self.mask == 2 {
                    self.mask = 3;
                }
                if self.mask > self.limit {
                    self.mask = 1;
                }
            }
            MaskKind::Grow => {
                if self.rising {
                    self.mask = (self.mask << 1) | 1;
                    if self.mask >= self.limit {
                        self.rising = false;
                    }
                } else {
                    self.mask >>= 1;
                    if self.mask <= 1 {
                        self.rising = true;
                    }
                }
            }
            MaskKind::Pass => {
                let full = self.mask == self.limit;
                if self.rising {
                    self.mask = if self.mask & 1 != 0 && !full {
                        (self.mask << 1) | 1
                    } else {
                        (self.mask << 1) & self.limit
                    };
                    if self.mask == top {
                        self.rising = false;
                    }
                } else {
                    self.mask = if self.mask & top != 0 && !full {
                        (self.mask >> 1) | top
                    } else {
                        self.mask >> 1
                    };
                    if self.mask == 1 {
                        self.rising = true;
                    }
                }
            }
        }
    }

    /// Write the mask bits into the gate mask slots
    ///
    /// A disabled mask never writes, the slots keep whatever they hold.
    pub fn publish(&self, sources: &mut SourceTable<N>) {
        if self.pattern.kind == MaskKind::Disabled {
            return;
        }
        for channel in 0..N {
            let bit = if self.pattern.triplify {
                channel % TRIPLE
            } else {
                channel
            };
            let on = bit < self.run_length && self.mask & (1 << bit) != 0;
            sources.set(SourceId::mask(channel), if on { LEVEL_MAX } else { 0 });
        }
    }
}
