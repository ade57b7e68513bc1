/// Code sent by the decoder while a key is held
pub const REPEAT_CODE: u32 = 0xFFFF_FFFF;

/// Keys the interpreter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKey {
    /// Numeric key 0-9
    Digit(u8),
    /// Start a program number entry
    BeginSelect,
    /// Load the entered program number
    Confirm,
    /// Abort the pending entry
    Cancel,
    /// Switch automatic program cycling on/off
    ToggleAutoCycle,
    NextProgram,
    PreviousProgram,
    /// Point at the next adjustable source
    NextSource,
    /// Point at the previous adjustable source
    PreviousSource,
    /// Raise the pointed source
    Increase,
    /// Lower the pointed source
    Decrease,
}

/// Raw code of every key
///
/// Defaults to the common NEC "car MP3" remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    pub digits: [u32; 10],
    pub begin_select: u32,
    pub confirm: u32,
    pub cancel: u32,
    pub toggle_auto_cycle: u32,
    pub next_program: u32,
    pub previous_program: u32,
    pub next_source: u32,
    pub previous_source: u32,
    pub increase: u32,
    pub decrease: u32,
}

impl Keymap {
    /// Key layout of the NEC "car MP3" remote
    pub const CAR_MP3: Self = Self {
        digits: [
            0x00FF_6897,
            0x00FF_30CF,
            0x00FF_18E7,
            0x00FF_7A85,
            0x00FF_10EF,
            0x00FF_38C7,
            0x00FF_5AA5,
            0x00FF_42BD,
            0x00FF_4AB5,
            0x00FF_52AD,
        ],
        begin_select: 0x00FF_629D,      // CH
        confirm: 0x00FF_C23D,           // Play/Pause
        cancel: 0x00FF_9867,            // 100+
        toggle_auto_cycle: 0x00FF_906F, // EQ
        next_program: 0x00FF_02FD,      // NEXT
        previous_program: 0x00FF_22DD,  // PREV
        next_source: 0x00FF_E21D,       // CH+
        previous_source: 0x00FF_A25D,   // CH-
        increase: 0x00FF_A857,          // VOL+
        decrease: 0x00FF_E01F,          // VOL-
    };

    /// Translate a raw code, `None` for the repeat code and unknown codes
    #[allow(clippy::cast_possible_truncation)]
    pub fn decode(&self, code: u32) -> Option<RemoteKey> {
        if code == REPEAT_CODE {
            return None;
        }
        if let Some(digit) = self.digits.iter().position(|&c| c == code) {
            return Some(RemoteKey::Digit(digit as u8));
        }
        let key = match code {
            c if c == self.begin_select => RemoteKey::BeginSelect,
            c if c == self.confirm => RemoteKey::Confirm,
            c if c == self.cancel => RemoteKey::Cancel,
            c if c == self.toggle_auto_cycle => RemoteKey::ToggleAutoCycle,
            c if c == self.next_program => RemoteKey::NextProgram,
            c if c == self.previous_program => RemoteKey::PreviousProgram,
            c if c == self.next_source => RemoteKey::NextSource,
            c if c == self.previous_source => RemoteKey::PreviousSource,
            c if c == self.increase => RemoteKey::Increase,
            c if c == self.decrease => RemoteKey::Decrease,
            _ => return None,
        };
        Some(key)
    }

    /// Raw code of a key
    pub fn code(&self, key: RemoteKey) -> u32 {
        match key {
            RemoteKey::Digit(digit) => self.digits[usize::from(digit % 10)],
            RemoteKey::BeginSelect => self.begin_select,
            RemoteKey::Confirm => self.confirm,
            RemoteKey::Cancel => self.cancel,
            RemoteKey::ToggleAutoCycle => self.toggle_auto_cycle,
            RemoteKey::NextProgram => self.next_program,
            RemoteKey::PreviousProgram => self.previous_program,
            RemoteKey::NextSource => self.next_source,
            RemoteKey::PreviousSource => self.previous_source,
            RemoteKey::Increase => self.increase,
            RemoteKey::Decrease => self.decrease,
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::CAR_MP3
    }
}
