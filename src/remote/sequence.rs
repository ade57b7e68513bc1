use super::RemoteKey;

/// Decimal digits collected during a program number entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigitEntry {
    #[default]
    Empty,
    One(u8),
    Two { tens: u8, units: u8 },
}

impl DigitEntry {
    /// Append a digit, extra digits past the second are dropped
    #[must_use]
    pub const fn push(self, digit: u8) -> Self {
        match self {
            Self::Empty => Self::One(digit),
            Self::One(tens) => Self::Two { tens, units: digit },
            Self::Two { .. } => self,
        }
    }

    /// Entered number, `None` if nothing was typed
    pub const fn value(self) -> Option<u8> {
        match self {
            Self::Empty => None,
            Self::One(units) => Some(units),
            Self::Two { tens, units } => Some(tens * 10 + units),
        }
    }
}

/// Multi-key sequence state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceState {
    #[default]
    Idle,
    AwaitingProgramDigits(DigitEntry),
}

/// Result of feeding a key to the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStep {
    /// Key has no meaning in this state
    Ignored,
    /// Program number entry started
    Started,
    /// Digit collected
    Collected,
    /// Entry confirmed with this number
    Entered(u8),
    /// Entry aborted or confirmed empty
    Cancelled,
    /// Key is not part of a sequence and should be applied directly
    Forward,
}

impl SequenceState {
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Transition table of the sequence machine
    pub const fn advance(self, key: RemoteKey) -> (Self, SequenceStep) {
        match (self, key) {
            (_, RemoteKey::BeginSelect) => {
                (Self::AwaitingProgramDigits(DigitEntry::Empty), SequenceStep::Started)
            }
            (
                _,
                RemoteKey::ToggleAutoCycle | RemoteKey::NextProgram | RemoteKey::PreviousProgram,
            ) => (Self::Idle, SequenceStep::Forward),
            (Self::AwaitingProgramDigits(entry), RemoteKey::Digit(digit)) => (
                Self::AwaitingProgramDigits(entry.push(digit)),
                SequenceStep::Collected,
            ),
            (Self::AwaitingProgramDigits(entry), RemoteKey::Confirm) => match entry.value() {
                Some(number) => (Self::Idle, SequenceStep::Entered(number)),
                None => (Self::Idle, SequenceStep::Cancelled),
            },
            (Self::AwaitingProgramDigits(_), RemoteKey::Cancel) => {
                (Self::Idle, SequenceStep::Cancelled)
            }
            (
                Self::AwaitingProgramDigits(_),
                RemoteKey::NextSource
                | RemoteKey::PreviousSource
                | RemoteKey::Increase
                | RemoteKey::Decrease,
            ) => (self, SequenceStep::Ignored),
            (Self::Idle, RemoteKey::Digit(_) | RemoteKey::Confirm | RemoteKey::Cancel) => {
                (Self::Idle, SequenceStep::Ignored)
            }
            (
                Self::Idle,
                RemoteKey::NextSource
                | RemoteKey::PreviousSource
                | RemoteKey::Increase
                | RemoteKey::Decrease,
            ) => (Self::Idle, SequenceStep::Forward),
        }
    }
}
