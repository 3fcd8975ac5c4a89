//! Party and PC box decoding.
//!
//! The party lives in section 1. The PC is read from the buffer assembled out
//! of sections 5 through 13 (see [`crate::section::assemble_pc_buffer`]).

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Decoded, DefaultReason, Result, SaveError};
use crate::pokemon::{self, PartyPokemon, Pokemon, PK3_SIZE_BOX, PK3_SIZE_PARTY};
use crate::text::Charset;
use crate::trainer::GameCode;

pub const PARTY_SIZE: usize = 6;
pub const BOX_COUNT: u8 = 14;
pub const SLOTS_PER_BOX: u8 = 30;
pub const BOX_NAME_LENGTH: usize = 9;

const CURRENT_BOX_OFFSET: usize = 0x0000;
const BOX_DATA_OFFSET: usize = 0x0004;
const BOX_NAMES_OFFSET: usize = 0x8344;
const BOX_WALLPAPERS_OFFSET: usize = 0x83c2;

pub(crate) fn check_box_position(box_number: u8, slot: u8) -> Result<()> {
    if !(1..=BOX_COUNT).contains(&box_number) || !(1..=SLOTS_PER_BOX).contains(&slot) {
        log::error!("Invalid box entry: {slot} in box number: {box_number}");
        return Err(SaveError::InvalidBoxPosition { box_number, slot });
    }
    Ok(())
}

/// Offset in the PC buffer of the record at `box_number`, `slot` (both
/// 1-based).
pub fn box_record_offset(box_number: u8, slot: u8) -> Result<usize> {
    check_box_position(box_number, slot)?;
    let absolute_entry =
        (box_number as usize - 1) * SLOTS_PER_BOX as usize + (slot as usize - 1);
    Ok(BOX_DATA_OFFSET + absolute_entry * PK3_SIZE_BOX)
}

/// Offset in section 1 of the party record at `index` (0-based).
pub fn party_record_offset(game: GameCode, index: usize) -> usize {
    game.team_size_offset() + 4 + index * PK3_SIZE_PARTY
}

/// Language byte of the first party record, read without decrypting anything.
pub fn lead_language_byte(section1: &[u8], game: GameCode) -> Option<u8> {
    let team_size = section1
        .get(game.team_size_offset()..game.team_size_offset() + 4)
        .map(LittleEndian::read_u32)?;
    if team_size == 0 {
        return None;
    }
    section1.get(party_record_offset(game, 0) + 18).copied()
}

/// Decodes the party, stopping at the first vacant record.
pub fn parse_party(section1: &[u8], game: GameCode) -> Decoded<Vec<PartyPokemon>> {
    let team_size_offset = game.team_size_offset();
    let Some(team_size) = section1
        .get(team_size_offset..team_size_offset + 4)
        .map(LittleEndian::read_u32)
    else {
        return Decoded::defaulted(Vec::new(), DefaultReason::TruncatedSection);
    };
    if team_size as usize > PARTY_SIZE {
        log::warn!("Team size {team_size} exceeds {PARTY_SIZE}, clamping");
    }
    let team_size = (team_size as usize).min(PARTY_SIZE);

    let mut party = Vec::with_capacity(team_size);
    for index in 0..team_size {
        let offset = party_record_offset(game, index);
        let Some(pk3) = section1.get(offset..offset + PK3_SIZE_PARTY) else {
            log::warn!("Party record {index} lies past the end of section 1");
            return Decoded::defaulted(party, DefaultReason::TruncatedSection);
        };
        if pokemon::is_empty_record(pk3) {
            break;
        }
        match PartyPokemon::from_party_pk3(pk3) {
            Ok(pkmn) => party.push(pkmn),
            Err(e) => {
                log::warn!("Failed to decode party record {index}: {e}");
                break;
            }
        }
    }
    Decoded::Present(party)
}

/// Serialises the party back into section 1, clearing unused records.
pub fn write_party(section1: &mut [u8], game: GameCode, party: &[PartyPokemon]) -> Result<()> {
    if party.len() > PARTY_SIZE {
        return Err(SaveError::InvalidPartySlot(party.len()));
    }
    let team_size_offset = game.team_size_offset();
    LittleEndian::write_u32(
        &mut section1[team_size_offset..team_size_offset + 4],
        party.len() as u32,
    );
    for index in 0..PARTY_SIZE {
        let offset = party_record_offset(game, index);
        let record = &mut section1[offset..offset + PK3_SIZE_PARTY];
        match party.get(index) {
            Some(pkmn) => record.copy_from_slice(&pkmn.to_party_pk3()),
            None => record.fill(0),
        }
    }
    Ok(())
}

/// The 30 slots of a box; vacant slots and slots past the end of a truncated
/// PC buffer are `None`.
pub fn parse_box(pc_buffer: &[u8], box_number: u8) -> Result<Vec<Option<Pokemon>>> {
    let mut slots = Vec::with_capacity(SLOTS_PER_BOX as usize);
    for slot in 1..=SLOTS_PER_BOX {
        let offset = box_record_offset(box_number, slot)?;
        let pkmn = match pc_buffer.get(offset..offset + PK3_SIZE_BOX) {
            Some(pk3) if !pokemon::is_empty_record(pk3) => match Pokemon::from_pk3(pk3) {
                Ok(pkmn) => Some(pkmn),
                Err(e) => {
                    log::warn!("Failed to decode box {box_number} slot {slot}: {e}");
                    None
                }
            },
            _ => None,
        };
        slots.push(pkmn);
    }
    Ok(slots)
}

fn default_box_name(box_index: usize) -> String {
    format!("BOX {}", box_index + 1)
}

/// The 14 box names. Names that are blank or fall outside the buffer come
/// back as `"BOX n"`.
pub fn parse_box_names(pc_buffer: &[u8], charset: Charset) -> Vec<Decoded<String>> {
    (0..BOX_COUNT as usize)
        .map(|box_index| {
            let offset = BOX_NAMES_OFFSET + box_index * BOX_NAME_LENGTH;
            match pc_buffer.get(offset..offset + BOX_NAME_LENGTH) {
                Some(name_data) => {
                    let name = charset.decode(name_data);
                    if name.trim().is_empty() {
                        Decoded::defaulted(default_box_name(box_index), DefaultReason::InvalidText)
                    } else {
                        Decoded::Present(name)
                    }
                }
                None => Decoded::defaulted(
                    default_box_name(box_index),
                    DefaultReason::TruncatedSection,
                ),
            }
        })
        .collect()
}

/// Encoded name field for box `box_number`, along with its PC buffer offset.
pub fn encode_box_name(box_number: u8, name: &str, charset: Charset) -> Result<(usize, Vec<u8>)> {
    check_box_position(box_number, 1)?;
    let offset = BOX_NAMES_OFFSET + (box_number as usize - 1) * BOX_NAME_LENGTH;
    // The last byte is always a terminator.
    let mut encoded = charset.encode(name, BOX_NAME_LENGTH - 1);
    encoded.push(crate::text::TERMINATOR);
    Ok((offset, encoded))
}

pub fn parse_box_wallpapers(pc_buffer: &[u8]) -> Decoded<Vec<u8>> {
    let end = BOX_WALLPAPERS_OFFSET + BOX_COUNT as usize;
    match pc_buffer.get(BOX_WALLPAPERS_OFFSET..end) {
        Some(wallpapers) => Decoded::Present(wallpapers.to_vec()),
        None => Decoded::defaulted(vec![0; BOX_COUNT as usize], DefaultReason::TruncatedSection),
    }
}

/// Box shown when the PC is opened, 1-based.
pub fn current_box(pc_buffer: &[u8]) -> Decoded<u8> {
    match pc_buffer.get(CURRENT_BOX_OFFSET) {
        Some(index) if *index < BOX_COUNT => Decoded::Present(index + 1),
        Some(index) => {
            log::warn!("Current box index {index} is out of range");
            Decoded::defaulted(1, DefaultReason::OutOfRangeValue)
        }
        None => Decoded::defaulted(1, DefaultReason::TruncatedSection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokemon::BattleStats;
    use crate::section::PC_BUFFER_SIZE;
    use crate::TrainerId;

    const TRAINER: TrainerId = TrainerId {
        public_id: 1,
        secret_id: 2,
    };

    fn party_member(pid: u32, species: u16, level: u8) -> PartyPokemon {
        PartyPokemon {
            pokemon: Pokemon::new(pid, TRAINER, species).unwrap(),
            stats: BattleStats {
                level,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_box_record_offsets() {
        assert_eq!(box_record_offset(1, 1).unwrap(), 4);
        assert_eq!(box_record_offset(1, 2).unwrap(), 84);
        assert_eq!(box_record_offset(2, 1).unwrap(), 4 + 30 * 80);
        assert_eq!(box_record_offset(14, 30).unwrap(), 4 + 419 * 80);
        assert!(box_record_offset(0, 1).is_err());
        assert!(box_record_offset(15, 1).is_err());
        assert!(box_record_offset(1, 31).is_err());
    }

    #[test]
    fn test_party_round_trip() {
        for game in [GameCode::Emerald, GameCode::FireRedLeafGreen] {
            let mut section1 = vec![0u8; 0x1000];
            let party = vec![party_member(10, 1, 5), party_member(11, 4, 7)];
            write_party(&mut section1, game, &party).unwrap();
            assert_eq!(section1[game.team_size_offset()], 2);

            let decoded = parse_party(&section1, game).into_value();
            assert_eq!(decoded, party);
            assert_eq!(decoded[1].level(), 7);
            assert_eq!(lead_language_byte(&section1, game), Some(2));
        }
    }

    #[test]
    fn test_party_count_is_clamped() {
        let game = GameCode::RubySapphire;
        let mut section1 = vec![0u8; 0x1000];
        let party = (0..6)
            .map(|idx| party_member(idx, 1 + idx as u16, 10))
            .collect::<Vec<_>>();
        write_party(&mut section1, game, &party).unwrap();
        section1[game.team_size_offset()] = 200;
        assert_eq!(parse_party(&section1, game).value().len(), 6);
    }

    #[test]
    fn test_party_stops_at_empty_record() {
        let game = GameCode::Emerald;
        let mut section1 = vec![0u8; 0x1000];
        write_party(&mut section1, game, &[party_member(1, 1, 1)]).unwrap();
        section1[game.team_size_offset()] = 3;
        assert_eq!(parse_party(&section1, game).value().len(), 1);
    }

    #[test]
    fn test_box_decoding() {
        let mut pc_buffer = vec![0u8; PC_BUFFER_SIZE];
        let pkmn = Pokemon::new(77, TRAINER, 25).unwrap();
        let offset = box_record_offset(3, 5).unwrap();
        pc_buffer[offset..offset + PK3_SIZE_BOX].copy_from_slice(&pkmn.to_pk3());

        let slots = parse_box(&pc_buffer, 3).unwrap();
        assert_eq!(slots.len(), 30);
        assert_eq!(slots[4].as_ref().map(|p| p.species), Some(25));
        assert_eq!(slots.iter().flatten().count(), 1);
        assert!(parse_box(&pc_buffer, 15).is_err());
    }

    #[test]
    fn test_truncated_pc_buffer_yields_vacant_slots() {
        let pc_buffer = vec![0xaau8; 100];
        let slots = parse_box(&pc_buffer, 1).unwrap();
        assert_eq!(slots.len(), 30);
        // Only the first record fits
        assert!(slots[0].is_some());
        assert!(slots[1..].iter().all(Option::is_none));
    }

    #[test]
    fn test_box_names() {
        let mut pc_buffer = vec![0u8; PC_BUFFER_SIZE];
        let (offset, encoded) = encode_box_name(2, "FAVES", Charset::Western).unwrap();
        pc_buffer[offset..offset + BOX_NAME_LENGTH].copy_from_slice(&encoded);
        let names = parse_box_names(&pc_buffer, Charset::Western);
        assert_eq!(names.len(), 14);
        assert_eq!(names[1], Decoded::Present("FAVES".to_string()));
        // Blank names fall back to the default
        assert_eq!(names[0].value(), "BOX 1");
        assert_eq!(names[0].reason(), Some(DefaultReason::InvalidText));
    }

    #[test]
    fn test_box_names_on_short_buffer() {
        let names = parse_box_names(&[0xbbu8; 0x8344 + 9 * 3], Charset::Western);
        assert_eq!(names[2].value(), "AAAAAAAAA");
        assert_eq!(names[3].value(), "BOX 4");
        assert_eq!(names[13].value(), "BOX 14");
        assert_eq!(names[13].reason(), Some(DefaultReason::TruncatedSection));
        assert!(parse_box_names(&[], Charset::Western)
            .iter()
            .all(|name| name.is_defaulted()));
    }

    #[test]
    fn test_current_box_and_wallpapers() {
        let mut pc_buffer = vec![0u8; PC_BUFFER_SIZE];
        pc_buffer[0] = 4;
        pc_buffer[BOX_WALLPAPERS_OFFSET + 13] = 15;
        assert_eq!(current_box(&pc_buffer), Decoded::Present(5));
        assert_eq!(parse_box_wallpapers(&pc_buffer).value()[13], 15);

        pc_buffer[0] = 14;
        assert!(current_box(&pc_buffer).is_defaulted());
        assert!(parse_box_wallpapers(&pc_buffer[..100]).is_defaulted());
    }
}
