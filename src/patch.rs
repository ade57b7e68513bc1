//! Patch matrix
//!
//! Routes sources to the three animation parameters of every channel.

use crate::BrightnessRenderer;
use crate::source::{SourceId, SourceTable};

/// Value width the rate shift truncates to
const VALUE_BITS: u8 = 16;

/// Channels per RGB group
pub const TRIPLE: usize = 3;

/// Source bindings of a single channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    /// Source for the waveform rate
    pub rate: SourceId,
    /// Power of two applied to the rate, positive shifts towards the MSB
    pub rate_shift: i8,
    /// Source for the brightness scale
    pub scale: SourceId,
    /// Source for the trigger/gate input
    pub trigger: SourceId,
}

impl Default for Patch {
    fn default() -> Self {
        Self {
            rate: SourceId::OFF,
            rate_shift: 0,
            scale: SourceId::ON,
            trigger: SourceId::ON,
        }
    }
}

impl Patch {
    pub const fn new(rate: SourceId, scale: SourceId, trigger: SourceId) -> Self {
        Self {
            rate,
            rate_shift: 0,
            scale,
            trigger,
        }
    }

    #[must_use]
    pub const fn with_rate_shift(mut self, rate_shift: i8) -> Self {
        self.rate_shift = rate_shift;
        self
    }

    /// Resolve the rate, applying the rate shift
    pub fn resolve_rate<const N: usize>(&self, sources: &SourceTable<N>) -> u16 {
        shift_rate(sources.get(self.rate), self.rate_shift)
    }
}

/// Shift a rate by a signed power of two, truncating to 16 bits
pub const fn shift_rate(rate: u16, shift: i8) -> u16 {
    let amount = shift.unsigned_abs();
    if amount >= VALUE_BITS {
        return 0;
    }
    if shift > 0 {
        rate << amount
    } else {
        rate >> amount
    }
}

/// Trigger binding used by the bulk programming helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// Same source for every channel
    Fixed(SourceId),
    /// Each channel uses its own gate mask slot
    OwnMask,
}

impl TriggerSource {
    const fn resolve(self, channel: usize) -> SourceId {
        match self {
            Self::Fixed(id) => id,
            Self::OwnMask => SourceId::mask(channel),
        }
    }
}

/// Patches of `N` channels
#[derive(Debug, Clone)]
pub struct PatchMatrix<const N: usize> {
    patches: [Patch; N],
}

impl<const N: usize> Default for PatchMatrix<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PatchMatrix<N> {
    pub fn new() -> Self {
        Self {
            patches: [Patch::default(); N],
        }
    }

    pub fn get(&self, channel: usize) -> Option<&Patch> {
        self.patches.get(channel)
    }

    pub fn patches(&self) -> &[Patch; N] {
        &self.patches
    }

    /// Replace the whole patch of a channel
    ///
    /// Returns `false` if the channel does not exist.
    pub fn set(&mut self, channel: usize, patch: Patch) -> bool {
        match self.patches.get_mut(channel) {
            Some(slot) => {
                *slot = patch;
                true
            }
            None => false,
        }
    }

    /// Replace every patch at once
    pub fn replace(&mut self, patches: [Patch; N]) {
        self.patches = patches;
    }

    /// Forward all resolved parameters, then advance the renderer once
    pub fn apply<R: BrightnessRenderer>(&self, sources: &SourceTable<N>, renderer: &mut R) {
        for (channel, patch) in self.patches.iter().enumerate() {
            renderer.set_rate(channel, patch.resolve_rate(sources));
            renderer.set_scale(channel, sources.get(patch.scale));
            renderer.set_trigger_input(channel, sources.get(patch.trigger));
        }
        renderer.tick();
    }

    /// Program every channel with the same shape and bindings
    pub fn program_all<R: BrightnessRenderer>(
        &mut self,
        renderer: &mut R,
        shape: u8,
        rate: SourceId,
        scale: SourceId,
        trigger: TriggerSource,
    ) {
        for channel in 0..N {
            renderer.set_pattern(channel, shape, 0);
            self.patches[channel] = Patch::new(rate, scale, trigger.resolve(channel));
        }
    }

    /// Program the three channels of RGB group `group`
    ///
    /// Channel `i` of the group gets phase `phase * i`. Returns `false` and
    /// leaves everything untouched if the group does not fit.
    #[allow(clippy::cast_possible_truncation, clippy::too_many_arguments)]
    pub fn program_triple<R: BrightnessRenderer>(
        &mut self,
        renderer: &mut R,
        group: usize,
        shape: u8,
        phase: u16,
        rate: SourceId,
        scale: SourceId,
        trigger: TriggerSource,
    ) -> bool {
        let first = group * TRIPLE;
        if first + TRIPLE > N {
            return false;
        }
        for i in 0..TRIPLE {
            let channel = first + i;
            renderer.set_pattern(channel, shape, phase.wrapping_mul(i as u16));
            self.patches[channel] = Patch::new(rate, scale, trigger.resolve(channel));
        }
        true
    }
}
