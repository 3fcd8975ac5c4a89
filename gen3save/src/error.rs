use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no section map could be built from either save slot")]
    CorruptSave,
    #[error("section {0} is missing from the active save slot")]
    MissingSection(u8),
    #[error("invalid box position: box {box_number}, slot {slot}")]
    InvalidBoxPosition { box_number: u8, slot: u8 },
    #[error("invalid party slot: {0}")]
    InvalidPartySlot(usize),
    #[error("expected {expected} bytes of record data, got {actual}")]
    InvalidRecordLength { expected: usize, actual: usize },
    #[error("box {box_number} slot {slot} is already occupied")]
    SlotOccupied { box_number: u8, slot: u8 },
    #[error("no free slot left in the {0} pocket")]
    PocketFull(&'static str),
    #[error("item {item_id} is not in the {pocket} pocket")]
    ItemNotFound { pocket: &'static str, item_id: u16 },
    #[error("{field} value {value} is out of range")]
    ValueOutOfRange { field: &'static str, value: u32 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SaveError>;

/// Why a field was replaced with a safe default instead of decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DefaultReason {
    /// The backing section was shorter than the field's declared location.
    TruncatedSection,
    /// The decoded value was outside its plausible range.
    OutOfRangeValue,
    /// The section holding the field is absent from the section map.
    MissingSection,
    /// Text decoded to nothing usable.
    InvalidText,
}

/// Outcome of decoding a single field: either the value read from the save, or
/// a documented default along with the reason it was substituted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Decoded<T> {
    Present(T),
    Defaulted { value: T, reason: DefaultReason },
}

impl<T> Decoded<T> {
    pub fn defaulted(value: T, reason: DefaultReason) -> Self {
        Decoded::Defaulted { value, reason }
    }

    pub fn value(&self) -> &T {
        match self {
            Decoded::Present(value) | Decoded::Defaulted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Decoded::Present(value) | Decoded::Defaulted { value, .. } => value,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Decoded::Defaulted { .. })
    }

    pub fn reason(&self) -> Option<DefaultReason> {
        match self {
            Decoded::Present(_) => None,
            Decoded::Defaulted { reason, .. } => Some(*reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Decoded::Present(value) => Decoded::Present(f(value)),
            Decoded::Defaulted { value, reason } => Decoded::Defaulted {
                value: f(value),
                reason,
            },
        }
    }
}

impl<T: Default> Decoded<T> {
    pub fn missing_section() -> Self {
        Decoded::defaulted(T::default(), DefaultReason::MissingSection)
    }
}
