//! Seen and owned flags, one bit per National Dex number.
//!
//! Section 0 holds the owned flags and the primary seen flags. The game keeps
//! two more copies of the seen flags in sections 1 and 4 and resets the
//! primary copy if they disagree, so all three are written together.
//!
//! The National Dex mode is a separate switch: a magic value in section 0 and
//! an event flag plus a variable in section 2.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::error::{Decoded, DefaultReason, Result, SaveError};
use crate::species::NATIONAL_DEX_SIZE;
use crate::trainer::GameCode;

pub const POKEDEX_FLAGS_SIZE: usize = 49;
pub const POKEDEX_OWNED_OFFSET: usize = 0x0028;
pub const POKEDEX_SEEN_OFFSET: usize = 0x005c;

impl GameCode {
    /// Second copy of the seen flags, in section 1.
    pub fn pokedex_seen_b(&self) -> usize {
        match self {
            GameCode::RubySapphire => 0x0938,
            GameCode::Emerald => 0x0988,
            GameCode::FireRedLeafGreen => 0x05f8,
        }
    }

    /// Third copy of the seen flags, in section 4.
    pub fn pokedex_seen_c(&self) -> usize {
        match self {
            GameCode::RubySapphire => 0x0c0c,
            GameCode::Emerald => 0x0ca4,
            GameCode::FireRedLeafGreen => 0x0b98,
        }
    }
}

const FRLG_NATIONAL_MAGIC_OFFSET: usize = 0x001b;
const FRLG_NATIONAL_MAGIC: u8 = 0xb9;
const FRLG_NATIONAL_FLAG_OFFSET: usize = 0x0068;
const FRLG_NATIONAL_FLAG_MASK: u8 = 0x01;
const FRLG_NATIONAL_VAR_OFFSET: usize = 0x011c;
const FRLG_NATIONAL_VAR: u16 = 0x6258;

const RSE_NATIONAL_MAGIC_OFFSET: usize = 0x0019;
const RSE_NATIONAL_MAGIC: u16 = 0x01da;
const RSE_NATIONAL_FLAG_MASK: u8 = 0x40;
const RSE_NATIONAL_VAR: u16 = 0x0302;

/// Number of species in the regional Pokedex shown before the National Dex
/// is unlocked.
pub fn regional_dex_size(game: GameCode) -> u16 {
    match game {
        GameCode::FireRedLeafGreen => 151,
        GameCode::RubySapphire | GameCode::Emerald => 202,
    }
}

impl GameCode {
    /// Offsets within section 2 of the National Dex event flag byte and of
    /// the National Dex variable.
    fn national_dex_flag_and_var(&self) -> (usize, usize) {
        match self {
            GameCode::RubySapphire => (0x03a6, 0x044c),
            GameCode::Emerald => (0x0402, 0x04a8),
            GameCode::FireRedLeafGreen => (FRLG_NATIONAL_FLAG_OFFSET, FRLG_NATIONAL_VAR_OFFSET),
        }
    }
}

fn truncated(offset: usize) -> SaveError {
    SaveError::ValueOutOfRange {
        field: "pokedex offset",
        value: offset as u32,
    }
}

/// Whether the National Dex magic is present in section 0.
pub fn is_national_dex_unlocked(section0: &[u8], game: GameCode) -> Decoded<bool> {
    let unlocked = match game {
        GameCode::FireRedLeafGreen => section0
            .get(FRLG_NATIONAL_MAGIC_OFFSET)
            .map(|magic| *magic == FRLG_NATIONAL_MAGIC),
        GameCode::RubySapphire | GameCode::Emerald => section0
            .get(RSE_NATIONAL_MAGIC_OFFSET..RSE_NATIONAL_MAGIC_OFFSET + 2)
            .map(|magic| LittleEndian::read_u16(magic) == RSE_NATIONAL_MAGIC),
    };
    match unlocked {
        Some(unlocked) => Decoded::Present(unlocked),
        None => Decoded::defaulted(false, DefaultReason::TruncatedSection),
    }
}

/// Writes the section 0 half of the National Dex unlock.
pub fn unlock_national_dex_magic(section0: &mut [u8], game: GameCode) -> Result<()> {
    match game {
        GameCode::FireRedLeafGreen => {
            let magic = section0
                .get_mut(FRLG_NATIONAL_MAGIC_OFFSET)
                .ok_or(truncated(FRLG_NATIONAL_MAGIC_OFFSET))?;
            *magic = FRLG_NATIONAL_MAGIC;
        }
        GameCode::RubySapphire | GameCode::Emerald => {
            let magic = section0
                .get_mut(RSE_NATIONAL_MAGIC_OFFSET..RSE_NATIONAL_MAGIC_OFFSET + 2)
                .ok_or(truncated(RSE_NATIONAL_MAGIC_OFFSET))?;
            LittleEndian::write_u16(magic, RSE_NATIONAL_MAGIC);
        }
    }
    Ok(())
}

/// Writes the section 2 half of the National Dex unlock: the event flag and
/// the variable the game checks when opening the Pokedex.
pub fn unlock_national_dex_flags(section2: &mut [u8], game: GameCode) -> Result<()> {
    let (flag_offset, var_offset) = game.national_dex_flag_and_var();
    let (mask, var) = match game {
        GameCode::FireRedLeafGreen => (FRLG_NATIONAL_FLAG_MASK, FRLG_NATIONAL_VAR),
        GameCode::RubySapphire | GameCode::Emerald => (RSE_NATIONAL_FLAG_MASK, RSE_NATIONAL_VAR),
    };
    let flag = section2.get_mut(flag_offset).ok_or(truncated(flag_offset))?;
    *flag |= mask;
    let var_bytes = section2
        .get_mut(var_offset..var_offset + 2)
        .ok_or(truncated(var_offset))?;
    LittleEndian::write_u16(var_bytes, var);
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PokedexBitfield {
    pub owned: Vec<u8>,
    pub seen: Vec<u8>,
}

impl Default for PokedexBitfield {
    fn default() -> Self {
        PokedexBitfield {
            owned: vec![0; POKEDEX_FLAGS_SIZE],
            seen: vec![0; POKEDEX_FLAGS_SIZE],
        }
    }
}

impl PokedexBitfield {
    pub fn is_owned(&self, national: u16) -> bool {
        is_flag_set(&self.owned, national)
    }

    pub fn is_seen(&self, national: u16) -> bool {
        is_flag_set(&self.seen, national)
    }

    pub fn owned_count(&self) -> usize {
        get_pokemon_from_bitfield(&self.owned).len()
    }

    pub fn seen_count(&self) -> usize {
        get_pokemon_from_bitfield(&self.seen).len()
    }
}

/// Byte index and mask of a National Dex number's flag.
fn dex_bit(national: u16) -> Option<(usize, u8)> {
    if !(1..=NATIONAL_DEX_SIZE).contains(&national) {
        return None;
    }
    let bit_position = (national - 1) as usize;
    Some((bit_position >> 3, 1 << (bit_position & 0b111)))
}

fn is_flag_set(bitfield: &[u8], national: u16) -> bool {
    dex_bit(national)
        .and_then(|(byte, mask)| bitfield.get(byte).map(|value| value & mask != 0))
        .unwrap_or(false)
}

pub fn count_bits_set(bitfield: &[u8]) -> usize {
    bitfield.iter().map(|byte| byte.count_ones() as usize).sum()
}

/// National Dex numbers flagged in `bitfield`. Padding bits past #386 are
/// ignored.
pub fn get_pokemon_from_bitfield(bitfield: &[u8]) -> Vec<u16> {
    (1..=NATIONAL_DEX_SIZE)
        .filter(|national| is_flag_set(bitfield, *national))
        .collect()
}

pub fn parse_pokedex(section0: &[u8]) -> Decoded<PokedexBitfield> {
    let owned = section0.get(POKEDEX_OWNED_OFFSET..POKEDEX_OWNED_OFFSET + POKEDEX_FLAGS_SIZE);
    let seen = section0.get(POKEDEX_SEEN_OFFSET..POKEDEX_SEEN_OFFSET + POKEDEX_FLAGS_SIZE);
    match (owned, seen) {
        (Some(owned), Some(seen)) => Decoded::Present(PokedexBitfield {
            owned: owned.to_vec(),
            seen: seen.to_vec(),
        }),
        _ => {
            log::warn!("Pokedex flags lie past the end of section 0");
            Decoded::defaulted(PokedexBitfield::default(), DefaultReason::TruncatedSection)
        }
    }
}

/// Sets the flag for `national` in the bitfield starting at `offset`.
pub fn set_flag(section: &mut [u8], offset: usize, national: u16) -> Result<()> {
    let (byte, mask) = dex_bit(national).ok_or(SaveError::ValueOutOfRange {
        field: "national dex number",
        value: national as u32,
    })?;
    let value = section.get_mut(offset + byte).ok_or(truncated(offset + byte))?;
    *value |= mask;
    Ok(())
}
