#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use embassy_time::Duration;
use embedded_storage::{ReadStorage, Storage};
use light_patchbay::{AnalogInput, BrightnessRenderer, Peripherals, RemoteDecoder, StepButton};

pub const CAPACITY: usize = 2048;

/// Everything the patch engine told the renderer
#[derive(Debug)]
pub struct RecordingRenderer<const N: usize> {
    pub rates: [u16; N],
    pub scales: [u16; N],
    pub triggers: [u16; N],
    pub shapes: [(u8, u16); N],
    pub pattern_bytes: [[u8; 4]; N],
    pub ticks: usize,
    /// Channel updates received since the previous tick
    pub updates_since_tick: usize,
    /// Channel updates seen by each tick
    pub updates_per_tick: Vec<usize>,
}

impl<const N: usize> RecordingRenderer<N> {
    pub fn new() -> Self {
        Self {
            rates: [0; N],
            scales: [0; N],
            triggers: [0; N],
            shapes: [(0, 0); N],
            pattern_bytes: [[0; 4]; N],
            ticks: 0,
            updates_since_tick: 0,
            updates_per_tick: Vec::new(),
        }
    }
}

impl<const N: usize> BrightnessRenderer for RecordingRenderer<N> {
    fn set_pattern(&mut self, channel: usize, shape: u8, phase: u16) {
        self.shapes[channel] = (shape, phase);
        let [lo, hi] = phase.to_le_bytes();
        self.pattern_bytes[channel] = [shape, 0, lo, hi];
    }

    fn set_rate(&mut self, channel: usize, rate: u16) {
        self.rates[channel] = rate;
        self.updates_since_tick += 1;
    }

    fn set_scale(&mut self, channel: usize, scale: u16) {
        self.scales[channel] = scale;
    }

    fn set_trigger_input(&mut self, channel: usize, value: u16) {
        self.triggers[channel] = value;
    }

    fn tick(&mut self) {
        self.ticks += 1;
        self.updates_per_tick.push(self.updates_since_tick);
        self.updates_since_tick = 0;
    }

    fn pattern_bytes(&self, channel: usize) -> [u8; 4] {
        self.pattern_bytes[channel]
    }

    fn set_pattern_from_bytes(&mut self, channel: usize, bytes: [u8; 4]) {
        self.pattern_bytes[channel] = bytes;
    }
}

/// Board with scripted inputs
#[derive(Debug, Default)]
pub struct FakeBoard {
    pub audio: u16,
    pub levels: [u16; 3],
    pub buttons: [bool; 3],
    pub activity: bool,
    pub activity_changes: usize,
    pub pauses: Vec<Duration>,
}

impl Peripherals for FakeBoard {
    fn analog(&mut self, input: AnalogInput) -> u16 {
        match input {
            AnalogInput::Audio => self.audio,
            AnalogInput::Level1 => self.levels[0],
            AnalogInput::Level2 => self.levels[1],
            AnalogInput::Level3 => self.levels[2],
        }
    }

    fn is_pressed(&mut self, button: StepButton) -> bool {
        match button {
            StepButton::Step1 => self.buttons[0],
            StepButton::Step2 => self.buttons[1],
            StepButton::Step3 => self.buttons[2],
        }
    }

    fn set_activity(&mut self, on: bool) {
        self.activity = on;
        self.activity_changes += 1;
    }

    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

/// Decoder replaying a fixed list of codes
#[derive(Debug, Default)]
pub struct ScriptedDecoder {
    pub codes: VecDeque<u32>,
}

impl ScriptedDecoder {
    pub fn new(codes: &[u32]) -> Self {
        Self {
            codes: codes.iter().copied().collect(),
        }
    }
}

impl RemoteDecoder for ScriptedDecoder {
    fn poll(&mut self) -> Option<u32> {
        self.codes.pop_front()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds;

/// EEPROM stand-in
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    pub bytes: Vec<u8>,
    pub writes: usize,
    /// Shared switch making every read fail, kept by the test after the
    /// storage moved into a store
    pub fail_reads: Rc<Cell<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            bytes: vec![0xFF; CAPACITY],
            writes: 0,
            fail_reads: Rc::new(Cell::new(false)),
        }
    }
}

impl ReadStorage for MemoryStorage {
    type Error = OutOfBounds;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        if self.fail_reads.get() {
            return Err(OutOfBounds);
        }
        let start = offset as usize;
        let source = self
            .bytes
            .get(start..start + bytes.len())
            .ok_or(OutOfBounds)?;
        bytes.copy_from_slice(source);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.bytes.len()
    }
}

impl Storage for MemoryStorage {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let target = self
            .bytes
            .get_mut(start..start + bytes.len())
            .ok_or(OutOfBounds)?;
        target.copy_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}
