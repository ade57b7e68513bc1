use embassy_time::{Duration, Instant};

use crate::mask::{MaskGenerator, MaskPattern};
use crate::oscillator::Oscillator;
use crate::patch::{Patch, PatchMatrix, TriggerSource};
use crate::remote::{Keymap, ProgramRequest, RemoteInterpreter};
use crate::source::{SourceId, SourceTable};
use crate::store::ProgramRecord;
use crate::{BrightnessRenderer, Peripherals};

/// Default tick period (about 16 updates per second)
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(62);

/// Default length of the power-on blink
pub const DEFAULT_STARTUP_BLINK: Duration = Duration::from_millis(700);

/// Default length of the blink acknowledging a remote program change
pub const DEFAULT_ACK_BLINK: Duration = Duration::from_millis(100);

/// Configuration for the controller
#[derive(Clone)]
pub struct ControllerConfig<const N: usize> {
    /// Minimum time between two ticks
    pub tick_period: Duration,
    pub startup_blink: Duration,
    pub ack_blink: Duration,
    pub random_seed: u64,
    pub keymap: Keymap,
    /// Program applied when the store holds none, `None` keeps the
    /// renderer's own patterns and the built-in patches
    pub fallback: Option<ProgramRecord<N>>,
}

impl<const N: usize> Default for ControllerConfig<N> {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            startup_blink: DEFAULT_STARTUP_BLINK,
            ack_blink: DEFAULT_ACK_BLINK,
            random_seed: 0x5eed,
            keymap: Keymap::CAR_MP3,
            fallback: None,
        }
    }
}

/// All animated state of the controller
///
/// Owned by the control loop and passed by reference to every component.
#[derive(Debug, Clone)]
pub struct PatchEngine<const N: usize> {
    sources: SourceTable<N>,
    oscillator: Oscillator,
    mask: MaskGenerator<N>,
    patches: PatchMatrix<N>,
    remote: RemoteInterpreter,
}

impl<const N: usize> PatchEngine<N> {
    /// Create an engine with the built-in patches
    ///
    /// Channel `i` takes its rate from the level input `i % 3`, runs at full
    /// scale and is not gated.
    pub fn new(config: &ControllerConfig<N>) -> Self {
        const LEVELS: [SourceId; 3] = [SourceId::LEVEL1, SourceId::LEVEL2, SourceId::LEVEL3];

        let mut patches = PatchMatrix::new();
        for channel in 0..N {
            let patch = Patch::new(LEVELS[channel % 3], SourceId::ON, SourceId::ON);
            patches.set(channel, patch);
        }
        Self {
            sources: SourceTable::new(config.random_seed),
            oscillator: Oscillator::new(SourceId::OFF),
            mask: MaskGenerator::new(SourceId::OFF),
            patches,
            remote: RemoteInterpreter::new(config.keymap.clone()),
        }
    }

    pub fn sources(&self) -> &SourceTable<N> {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut SourceTable<N> {
        &mut self.sources
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    pub fn mask(&self) -> &MaskGenerator<N> {
        &self.mask
    }

    pub fn patches(&self) -> &PatchMatrix<N> {
        &self.patches
    }

    pub fn patches_mut(&mut self) -> &mut PatchMatrix<N> {
        &mut self.patches
    }

    pub fn remote(&self) -> &RemoteInterpreter {
        &self.remote
    }

    pub fn remote_mut(&mut self) -> &mut RemoteInterpreter {
        &mut self.remote
    }

    /// Sample inputs and refresh time based sources
    pub fn refresh<P: Peripherals>(&mut self, inputs: &mut P, now: Instant) {
        self.sources.refresh(inputs, now);
    }

    /// Feed one raw remote code
    pub fn handle_code(&mut self, code: u32) -> Option<ProgramRequest> {
        self.remote.handle(code, &mut self.sources)
    }

    /// Advance generators, forward every patch and tick the renderer
    ///
    /// Returns the program automatic cycling wants loaded.
    pub fn tick<R: BrightnessRenderer>(&mut self, renderer: &mut R) -> Option<ProgramRequest> {
        self.oscillator.tick(&mut self.sources);
        self.mask.tick(&mut self.sources);
        let request = self.remote.tick_auto_cycle(&self.sources);
        self.patches.apply(&self.sources, renderer);
        request
    }

    /// Switch to a stored program
    pub fn apply_program<R: BrightnessRenderer>(
        &mut self,
        record: &ProgramRecord<N>,
        renderer: &mut R,
    ) {
        self.oscillator.set_rate(record.oscillator_rate);
        self.mask.set_rate(record.mask_rate);
        self.mask.set_pattern(record.mask_pattern);
        self.mask.publish(&mut self.sources);
        for (channel, bytes) in record.patterns.iter().enumerate() {
            renderer.set_pattern_from_bytes(channel, *bytes);
        }
        self.patches.replace(record.patches);
    }

    /// Snapshot the current configuration as a program
    pub fn capture_program<R: BrightnessRenderer>(&self, renderer: &R) -> ProgramRecord<N> {
        let mut record = ProgramRecord {
            oscillator_rate: self.oscillator.rate(),
            mask_rate: self.mask.rate(),
            mask_pattern: self.mask.pattern(),
            patches: *self.patches.patches(),
            ..ProgramRecord::default()
        };
        for (channel, bytes) in record.patterns.iter_mut().enumerate() {
            *bytes = renderer.pattern_bytes(channel);
        }
        record
    }

    /// Program every channel alike, see [`PatchMatrix::program_all`]
    pub fn program_all<R: BrightnessRenderer>(
        &mut self,
        renderer: &mut R,
        shape: u8,
        rate: SourceId,
        scale: SourceId,
        trigger: TriggerSource,
    ) {
        self.patches
            .program_all(renderer, shape, rate, scale, trigger);
    }

    /// Program one RGB group, see [`PatchMatrix::program_triple`]
    #[allow(clippy::too_many_arguments)]
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
        self.patches
            .program_triple(renderer, group, shape, phase, rate, scale, trigger)
    }

    /// Switch the gate mask movement
    pub fn set_mask(&mut self, rate: SourceId, pattern: MaskPattern) {
        self.mask.set_rate(rate);
        self.mask.set_pattern(pattern);
        self.mask.publish(&mut self.sources);
    }

    /// Set the oscillator speed source
    pub fn set_oscillator_rate(&mut self, rate: SourceId) {
        self.oscillator.set_rate(rate);
    }
}
