//! Remote control command interpreter
//!
//! Turns raw decoder codes into source adjustments and program selections.
//! Multi-key program entry runs through the explicit machine in
//! [`sequence`].

mod keymap;
pub mod sequence;

#[cfg(feature = "esp32-log")]
use esp_println::println;

pub use keymap::{Keymap, REPEAT_CODE, RemoteKey};
pub use sequence::{DigitEntry, SequenceState, SequenceStep};

use crate::source::{LEVEL_MAX, STEP_COARSE, SourceId, SourceTable};

/// Step applied to the fine remote sources by one adjustment
pub const STEP_FINE: u16 = 16;

const CYCLE_THRESHOLD: u16 = 2048;

/// Request to load a program (1-based index)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramRequest(pub u8);

/// Active program and automatic cycling
#[derive(Debug, Clone)]
pub struct ProgramSelector {
    current: u8,
    count: u8,
    auto_cycle: bool,
    cycle_rate: SourceId,
    counter: u16,
}

impl ProgramSelector {
    const fn new() -> Self {
        Self {
            current: 0,
            count: 0,
            auto_cycle: false,
            cycle_rate: SourceId::OFF,
            counter: 0,
        }
    }

    const fn contains(&self, index: u8) -> bool {
        index >= 1 && index <= self.count
    }

    // The active program only changes once the load succeeded, see
    // `RemoteInterpreter::set_current_program`.
    const fn next(&self) -> Option<ProgramRequest> {
        if self.count == 0 {
            return None;
        }
        let index = if self.current >= self.count {
            1
        } else {
            self.current + 1
        };
        Some(ProgramRequest(index))
    }

    const fn previous(&self) -> Option<ProgramRequest> {
        if self.count == 0 {
            return None;
        }
        let index = if self.current <= 1 || self.current > self.count {
            self.count
        } else {
            self.current - 1
        };
        Some(ProgramRequest(index))
    }
}

/// Remote command interpreter
#[derive(Debug, Clone)]
pub struct RemoteInterpreter {
    keymap: Keymap,
    last_code: Option<u32>,
    state: SequenceState,
    pointer: SourceId,
    programs: ProgramSelector,
}

impl RemoteInterpreter {
    pub const fn new(keymap: Keymap) -> Self {
        Self {
            keymap,
            last_code: None,
            state: SequenceState::Idle,
            pointer: SourceId::STEP1,
            programs: ProgramSelector::new(),
        }
    }

    pub const fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub const fn state(&self) -> SequenceState {
        self.state
    }

    /// Last recognised code
    pub const fn last_code(&self) -> Option<u32> {
        self.last_code
    }

    /// Source the adjust keys act on
    pub const fn pointer(&self) -> SourceId {
        self.pointer
    }

    /// Active program, 0 when none is loaded
    pub const fn current_program(&self) -> u8 {
        self.programs.current
    }

    pub const fn program_count(&self) -> u8 {
        self.programs.count
    }

    pub const fn auto_cycle(&self) -> bool {
        self.programs.auto_cycle
    }

    pub fn set_auto_cycle(&mut self, enabled: bool) {
        self.programs.auto_cycle = enabled;
        self.programs.counter = 0;
    }

    /// Configure the available programs
    ///
    /// An empty store also switches auto-cycling off.
    pub fn set_programs(&mut self, count: u8, cycle_rate: SourceId) {
        self.programs.count = count;
        self.programs.cycle_rate = cycle_rate;
        self.programs.counter = 0;
        if count == 0 {
            self.programs.auto_cycle = false;
            self.programs.current = 0;
        } else if self.programs.current > count {
            self.programs.current = 0;
        }
    }

    /// Mark a program as active
    ///
    /// Requests returned by [`RemoteInterpreter::handle`] and
    /// [`RemoteInterpreter::tick_auto_cycle`] are not committed until the
    /// caller reports the load here.
    pub fn set_current_program(&mut self, index: u8) {
        self.programs.current = index;
    }

    /// Drop any pending sequence
    pub fn reset(&mut self) {
        self.state = SequenceState::Idle;
    }

    /// Handle one raw decoder code
    ///
    /// Returns the program to load, if the key selected one. The active
    /// program is left unchanged.
    pub fn handle<const N: usize>(
        &mut self,
        code: u32,
        sources: &mut SourceTable<N>,
    ) -> Option<ProgramRequest> {
        let key = self.keymap.decode(code)?;
        self.last_code = Some(code);
        self.handle_key(key, sources)
    }

    /// Handle an already decoded key
    pub fn handle_key<const N: usize>(
        &mut self,
        key: RemoteKey,
        sources: &mut SourceTable<N>,
    ) -> Option<ProgramRequest> {
        let (state, step) = self.state.advance(key);
        self.state = state;
        match step {
            SequenceStep::Entered(index) => {
                if self.programs.contains(index) {
                    Some(ProgramRequest(index))
                } else {
                    #[cfg(feature = "esp32-log")]
                    println!(
                        "remote: program {} out of range 1..={}",
                        index, self.programs.count
                    );
                    None
                }
            }
            SequenceStep::Forward => self.apply(key, sources),
            SequenceStep::Ignored
            | SequenceStep::Started
            | SequenceStep::Collected
            | SequenceStep::Cancelled => None,
        }
    }

    /// Keys that act immediately outside of a sequence
    fn apply<const N: usize>(
        &mut self,
        key: RemoteKey,
        sources: &mut SourceTable<N>,
    ) -> Option<ProgramRequest> {
        match key {
            RemoteKey::NextProgram => self.programs.next(),
            RemoteKey::PreviousProgram => self.programs.previous(),
            RemoteKey::ToggleAutoCycle => {
                // nothing to cycle through on an empty store
                if self.programs.count > 0 {
                    let enabled = !self.programs.auto_cycle;
                    self.set_auto_cycle(enabled);
                }
                None
            }
            RemoteKey::NextSource => {
                self.pointer = if self.pointer >= SourceId::REMOTE3 {
                    SourceId::STEP1
                } else {
                    SourceId::from_raw(self.pointer.raw() + 1)
                };
                None
            }
            RemoteKey::PreviousSource => {
                self.pointer = if self.pointer <= SourceId::STEP1 {
                    SourceId::REMOTE3
                } else {
                    SourceId::from_raw(self.pointer.raw() - 1)
                };
                None
            }
            RemoteKey::Increase => {
                let value = sources.get(self.pointer);
                sources.set(self.pointer, (value + self.step()).min(LEVEL_MAX));
                None
            }
            RemoteKey::Decrease => {
                let value = sources.get(self.pointer);
                sources.set(self.pointer, value.saturating_sub(self.step()));
                None
            }
            RemoteKey::Digit(_)
            | RemoteKey::BeginSelect
            | RemoteKey::Confirm
            | RemoteKey::Cancel => None,
        }
    }

    const fn step(&self) -> u16 {
        if self.pointer.is_stepped() {
            STEP_COARSE
        } else {
            STEP_FINE
        }
    }

    /// Advance automatic cycling by one tick
    ///
    /// Only runs while enabled, with programs available and no pending
    /// sequence.
    pub fn tick_auto_cycle<const N: usize>(
        &mut self,
        sources: &SourceTable<N>,
    ) -> Option<ProgramRequest> {
        if !self.programs.auto_cycle || self.programs.count == 0 || !self.state.is_idle() {
            return None;
        }
        self.programs.counter += sources.get(self.programs.cycle_rate) >> 5;
        if self.programs.counter < CYCLE_THRESHOLD {
            return None;
        }
        self.programs.counter = 0;
        self.programs.next()
    }
}

impl Default for RemoteInterpreter {
    fn default() -> Self {
        Self::new(Keymap::CAR_MP3)
    }
}
