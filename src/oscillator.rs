use crate::source::{SourceId, SourceTable};

const PERIOD: u16 = 2048;
const HALF_PERIOD: u16 = PERIOD / 2;

/// Free running triangle oscillator
///
/// Its speed is taken from a source and its output is written to
/// [`SourceId::OSCILLATOR`] every tick.
#[derive(Debug, Clone)]
pub struct Oscillator {
    rate: SourceId,
    accumulator: u16,
}

impl Oscillator {
    pub const fn new(rate: SourceId) -> Self {
        Self {
            rate,
            accumulator: 0,
        }
    }

    pub const fn rate(&self) -> SourceId {
        self.rate
    }

    pub fn set_rate(&mut self, rate: SourceId) {
        self.rate = rate;
    }

    /// Current output level
    pub const fn output(&self) -> u16 {
        if self.accumulator < HALF_PERIOD {
            self.accumulator
        } else {
            PERIOD - self.accumulator
        }
    }

    /// Advance one tick and publish the output
    pub fn tick<const N: usize>(&mut self, sources: &mut SourceTable<N>) {
        let step = sources.get(self.rate) >> 4;
        self.accumulator = (self.accumulator + step) % PERIOD;
        sources.set(SourceId::OSCILLATOR, self.output());
    }
}
