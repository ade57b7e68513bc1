//! Source table
//!
//! Every value that can drive a patch parameter lives in one fixed table of
//! 10-bit levels. Slot indices are stable: programs stored in non-volatile
//! memory refer to them by number.

use embassy_time::{Duration, Instant};

use crate::{AnalogInput, Peripherals, StepButton};

/// Highest value a source can hold
pub const LEVEL_MAX: u16 = 1023;

/// Number of slots before the gate mask slots
pub const FIXED_SLOTS: usize = 16;

/// Step applied to a step source by one button press or one remote adjustment
pub const STEP_COARSE: u16 = 128;

/// Refresh period of [`SourceId::RANDOM_FAST`]
pub const RANDOM_FAST_PERIOD: Duration = Duration::from_millis(1_000);

/// Refresh period of [`SourceId::RANDOM_SLOW`]
pub const RANDOM_SLOW_PERIOD: Duration = Duration::from_millis(10_000);

const CONSTANT_FLAG: u8 = 0x80;
const CONSTANT_MASK: u8 = 0x7F;

/// Index of a source
///
/// Ids with the top bit set are constant pseudo-sources: they resolve to
/// `(id & 0x7F) << 3` without touching the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SourceId(u8);

impl SourceId {
    /// Permanently off (0)
    pub const OFF: Self = Self(0);
    /// Permanently on (1023)
    pub const ON: Self = Self(1);
    /// Permanently at half level (512)
    pub const HALF: Self = Self(2);
    /// Audio level input
    pub const AUDIO: Self = Self(3);
    /// First potentiometer / sensor input
    pub const LEVEL1: Self = Self(4);
    pub const LEVEL2: Self = Self(5);
    pub const LEVEL3: Self = Self(6);
    /// First button-stepped value
    pub const STEP1: Self = Self(7);
    pub const STEP2: Self = Self(8);
    pub const STEP3: Self = Self(9);
    /// First remote-controlled fine value
    pub const REMOTE1: Self = Self(10);
    pub const REMOTE2: Self = Self(11);
    pub const REMOTE3: Self = Self(12);
    /// Triangle oscillator output
    pub const OSCILLATOR: Self = Self(13);
    /// Random value refreshed every second
    pub const RANDOM_FAST: Self = Self(14);
    /// Random value refreshed every ten seconds
    pub const RANDOM_SLOW: Self = Self(15);
    /// First gate mask slot, one per channel
    pub const MASK_BASE: Self = Self(16);

    /// Source from its raw stored byte
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Constant pseudo-source for `level`, only the low 7 bits are kept
    pub const fn constant(level: u8) -> Self {
        Self(CONSTANT_FLAG | (level & CONSTANT_MASK))
    }

    /// Gate mask slot of `channel`
    #[allow(clippy::cast_possible_truncation)]
    pub const fn mask(channel: usize) -> Self {
        Self(Self::MASK_BASE.0 + channel as u8)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn is_constant(self) -> bool {
        self.0 & CONSTANT_FLAG != 0
    }

    /// Value of a constant pseudo-source
    pub const fn constant_level(self) -> Option<u16> {
        if self.is_constant() {
            Some(((self.0 & CONSTANT_MASK) as u16) << 3)
        } else {
            None
        }
    }

    /// Returns if the source is one the remote can adjust
    pub const fn is_adjustable(self) -> bool {
        self.0 >= Self::STEP1.0 && self.0 <= Self::REMOTE3.0
    }

    /// Returns if the source is adjusted in coarse steps
    pub const fn is_stepped(self) -> bool {
        self.0 >= Self::STEP1.0 && self.0 <= Self::STEP3.0
    }
}

impl From<u8> for SourceId {
    fn from(raw: u8) -> Self {
        Self::from_raw(raw)
    }
}

impl From<SourceId> for u8 {
    fn from(id: SourceId) -> Self {
        id.raw()
    }
}

/// Small deterministic pseudo random generator
///
/// Hashes an incrementing counter with SplitMix64 mixing.
#[derive(Debug, Clone)]
pub struct Random {
    state: u64,
}

impl Random {
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next value in `0..=LEVEL_MAX`
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_level(&mut self) -> u16 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        ((z ^ (z >> 31)) as u16) & LEVEL_MAX
    }
}

/// Source table with `N` gate mask slots
#[derive(Debug, Clone)]
pub struct SourceTable<const N: usize> {
    fixed: [u16; FIXED_SLOTS],
    mask: [u16; N],
    random: Random,
    buttons: [bool; 3],
    last_fast: Option<Instant>,
    last_slow: Option<Instant>,
}

impl<const N: usize> SourceTable<N> {
    pub fn new(seed: u64) -> Self {
        let mut fixed = [0; FIXED_SLOTS];
        fixed[usize::from(SourceId::ON.0)] = LEVEL_MAX;
        fixed[usize::from(SourceId::HALF.0)] = 512;
        Self {
            fixed,
            mask: [0; N],
            random: Random::new(seed),
            buttons: [false; 3],
            last_fast: None,
            last_slow: None,
        }
    }

    /// Resolve a source
    ///
    /// # Panics
    ///
    /// Panics if `id` is neither a constant nor inside the table.
    pub fn get(&self, id: SourceId) -> u16 {
        if let Some(level) = id.constant_level() {
            return level;
        }
        let index = usize::from(id.0);
        if index < FIXED_SLOTS {
            self.fixed[index]
        } else {
            self.mask[index - FIXED_SLOTS]
        }
    }

    /// Write a source, clamping to [`LEVEL_MAX`]
    ///
    /// Constant slots and pseudo-sources are left untouched.
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the table.
    pub fn set(&mut self, id: SourceId, value: u16) {
        if id.is_constant() || id <= SourceId::HALF {
            return;
        }
        let value = value.min(LEVEL_MAX);
        let index = usize::from(id.0);
        if index < FIXED_SLOTS {
            self.fixed[index] = value;
        } else {
            self.mask[index - FIXED_SLOTS] = value;
        }
    }

    /// Sample external inputs and refresh time based slots
    pub fn refresh<P: Peripherals>(&mut self, inputs: &mut P, now: Instant) {
        self.set(SourceId::AUDIO, inputs.analog(AnalogInput::Audio));
        self.set(SourceId::LEVEL1, inputs.analog(AnalogInput::Level1));
        self.set(SourceId::LEVEL2, inputs.analog(AnalogInput::Level2));
        self.set(SourceId::LEVEL3, inputs.analog(AnalogInput::Level3));

        for (i, button) in StepButton::ALL.iter().enumerate() {
            let pressed = inputs.is_pressed(*button);
            if pressed && !self.buttons[i] {
                self.step(button.source());
            }
            self.buttons[i] = pressed;
        }

        if is_due(self.last_fast, now, RANDOM_FAST_PERIOD) {
            self.last_fast = Some(now);
            let level = self.random.next_level();
            self.set(SourceId::RANDOM_FAST, level);
        }
        if is_due(self.last_slow, now, RANDOM_SLOW_PERIOD) {
            self.last_slow = Some(now);
            let level = self.random.next_level();
            self.set(SourceId::RANDOM_SLOW, level);
        }
    }

    /// Advance a step source by one coarse step, wrapping to 0 past the top
    pub fn step(&mut self, id: SourceId) {
        let current = self.get(id);
        let next = if current >= LEVEL_MAX {
            0
        } else {
            current.saturating_add(STEP_COARSE)
        };
        self.set(id, next);
    }

    /// Gate mask slots
    pub fn mask_slots(&self) -> &[u16; N] {
        &self.mask
    }
}

fn is_due(last: Option<Instant>, now: Instant, period: Duration) -> bool {
    match last {
        Some(last) => now.saturating_duration_since(last) >= period,
        None => true,
    }
}
