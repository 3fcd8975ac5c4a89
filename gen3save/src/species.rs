//! Species numbering, natures and abilities.
//!
//! Records store species by the cartridge's internal index. Kanto and Johto
//! species share their National Dex number, while the Hoenn species sit after a
//! block of 25 unused placeholders and follow Hoenn Dex order.

use std::collections::HashMap;

use lazy_static::lazy_static;

pub const NATIONAL_DEX_SIZE: u16 = 386;
const LAST_SHARED_SPECIES: u16 = 251;
const FIRST_HOENN_INTERNAL_ID: u16 = 277;

/// National Dex numbers of internal ids 277..=411.
const HOENN_INTERNAL_TO_NATIONAL: [u16; 135] = [
    252, 253, 254, 255, 256, 257, 258, 259, 260, 261, 262, 263, 264, 265, 266, 267, 268, 269, 270,
    271, 272, 273, 274, 275, 290, 291, 292, 276, 277, 285, 286, 327, 278, 279, 283, 284, 320, 321,
    300, 301, 352, 343, 344, 299, 324, 302, 339, 340, 370, 341, 342, 349, 350, 318, 319, 328, 329,
    330, 296, 297, 309, 310, 322, 323, 363, 364, 365, 331, 332, 361, 362, 337, 338, 298, 325, 326,
    311, 312, 303, 307, 308, 333, 334, 360, 355, 356, 315, 287, 288, 289, 316, 317, 357, 293, 294,
    295, 366, 367, 368, 359, 353, 354, 336, 335, 369, 304, 305, 306, 351, 313, 314, 345, 346, 347,
    348, 280, 281, 282, 371, 372, 373, 374, 375, 376, 377, 378, 379, 382, 383, 384, 380, 381, 385,
    386, 358,
];

pub const NATURE_NAMES: [&str; 25] = [
    "Hardy", "Lonely", "Brave", "Adamant", "Naughty", "Bold", "Docile", "Relaxed", "Impish",
    "Lax", "Timid", "Hasty", "Serious", "Jolly", "Naive", "Modest", "Mild", "Quiet", "Bashful",
    "Rash", "Calm", "Gentle", "Sassy", "Careful", "Quirky",
];

/// The two ability slots a species can roll; the second is absent for species
/// with a single ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeciesAbilities {
    pub primary: u8,
    pub secondary: Option<u8>,
}

lazy_static! {
    static ref ABILITY_NAMES: HashMap<u8, &'static str> =
        parse_ability_names(include_str!("../data/ability_names.csv"));
    static ref SPECIES_ABILITIES: HashMap<u16, SpeciesAbilities> =
        parse_species_abilities(include_str!("../data/species_abilities.csv"));
}

pub(crate) fn csv_rows(data: &str) -> impl Iterator<Item = Vec<&str>> {
    data.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(str::trim).collect())
}

fn parse_ability_names(data: &'static str) -> HashMap<u8, &'static str> {
    csv_rows(data)
        .filter_map(|row| match row.as_slice() {
            [id, name] => Some((id.parse().ok()?, *name)),
            _ => None,
        })
        .collect()
}

fn parse_species_abilities(data: &str) -> HashMap<u16, SpeciesAbilities> {
    csv_rows(data)
        .filter_map(|row| match row.as_slice() {
            [national, primary, secondary] => Some((
                national.parse().ok()?,
                SpeciesAbilities {
                    primary: primary.parse().ok()?,
                    secondary: secondary.parse().ok(),
                },
            )),
            _ => None,
        })
        .collect()
}

/// Converts an internal species id to its National Dex number. Ids 252-276
/// are unused placeholders and map to nothing.
pub fn national_dex_number(internal_id: u16) -> Option<u16> {
    match internal_id {
        1..=LAST_SHARED_SPECIES => Some(internal_id),
        FIRST_HOENN_INTERNAL_ID.. => HOENN_INTERNAL_TO_NATIONAL
            .get((internal_id - FIRST_HOENN_INTERNAL_ID) as usize)
            .copied(),
        _ => None,
    }
}

pub fn internal_species_id(national: u16) -> Option<u16> {
    match national {
        1..=LAST_SHARED_SPECIES => Some(national),
        _ => HOENN_INTERNAL_TO_NATIONAL
            .iter()
            .position(|entry| *entry == national)
            .map(|idx| FIRST_HOENN_INTERNAL_ID + idx as u16),
    }
}

pub fn nature_name(personality_value: u32) -> &'static str {
    NATURE_NAMES[(personality_value % 25) as usize]
}

pub fn species_abilities(national: u16) -> Option<SpeciesAbilities> {
    SPECIES_ABILITIES.get(&national).copied()
}

/// Resolves the ability bit of a record to an ability id. A set bit on a
/// species with only one ability falls back to its first ability.
pub fn ability_for(national: u16, ability_bit: u8) -> Option<u8> {
    let abilities = species_abilities(national)?;
    match (ability_bit, abilities.secondary) {
        (1, Some(secondary)) => Some(secondary),
        _ => Some(abilities.primary),
    }
}

pub fn ability_name(ability_id: u8) -> Option<&'static str> {
    ABILITY_NAMES.get(&ability_id).copied()
}
