#![no_std]

pub mod channel;
pub mod control_loop;
pub mod engine;
pub mod mask;
pub mod oscillator;
pub mod patch;
pub mod remote;
pub mod source;
pub mod store;

pub use channel::{RemoteChannel, RemoteReceiver, RemoteSender};
pub use control_loop::{ControlLoop, LoopResult};
pub use engine::{ControllerConfig, PatchEngine};
pub use mask::{MaskGenerator, MaskKind, MaskPattern};
pub use oscillator::Oscillator;
pub use patch::{Patch, PatchMatrix, TriggerSource};
pub use remote::{Keymap, ProgramRequest, RemoteInterpreter, RemoteKey};
pub use source::{SourceId, SourceTable};
pub use store::{ProgramRecord, ProgramStore, StoreError, StoreHeader};

pub use embassy_time::{Duration, Instant};

/// Highest channel count the program format and mask generator support
pub const MAX_CHANNELS: usize = 9;

/// Brightness waveform renderer
///
/// Implement this trait for the PWM waveform engine. The patch engine only
/// feeds it parameters and never looks at the waveforms themselves.
pub trait BrightnessRenderer {
    /// Select the waveform shape and phase of a channel
    fn set_pattern(&mut self, channel: usize, shape: u8, phase: u16);

    fn set_rate(&mut self, channel: usize, rate: u16);

    fn set_scale(&mut self, channel: usize, scale: u16);

    fn set_trigger_input(&mut self, channel: usize, value: u16);

    /// Advance all channels one step
    fn tick(&mut self);

    /// Opaque stored form of a channel's pattern
    fn pattern_bytes(&self, channel: usize) -> [u8; 4];

    /// Restore a channel's pattern from [`BrightnessRenderer::pattern_bytes`]
    fn set_pattern_from_bytes(&mut self, channel: usize, bytes: [u8; 4]);
}

/// Analog inputs sampled into the source table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogInput {
    Audio,
    Level1,
    Level2,
    Level3,
}

/// Buttons that step their source on every press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepButton {
    Step1,
    Step2,
    Step3,
}

impl StepButton {
    pub const ALL: [Self; 3] = [Self::Step1, Self::Step2, Self::Step3];

    /// Source the button steps
    pub const fn source(self) -> SourceId {
        match self {
            Self::Step1 => SourceId::STEP1,
            Self::Step2 => SourceId::STEP2,
            Self::Step3 => SourceId::STEP3,
        }
    }
}

/// Board peripherals
///
/// Implement this trait to support different hardware platforms.
pub trait Peripherals {
    /// Sample an analog input (0-1023)
    fn analog(&mut self, input: AnalogInput) -> u16;

    /// Returns if the button is currently held down
    fn is_pressed(&mut self, button: StepButton) -> bool;

    /// Drive the activity indicator
    fn set_activity(&mut self, on: bool);

    /// Block the whole loop for `duration`
    fn pause(&mut self, duration: Duration) {
        embassy_time::block_for(duration);
    }
}

/// Source of raw remote control codes
pub trait RemoteDecoder {
    /// Next decoded code, if any
    ///
    /// May return [`remote::REPEAT_CODE`] while a key is held.
    fn poll(&mut self) -> Option<u32>;
}
