use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::Serialize;
use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::checksum::pokemon_checksum;
use crate::contest::{self, ContestStats, Ribbons};
use crate::error::{Result, SaveError};
use crate::growth;
use crate::species;
use crate::text::Charset;
use crate::trainer::PlayerGender;
use crate::TrainerId;

pub const PK3_SIZE_PARTY: usize = 100;
pub const PK3_SIZE_BOX: usize = 80;
pub const SUBSTRUCTURE_SIZE: usize = 48;
const SUBSTRUCTURE_OFFSET: usize = 32;
const BLOCK_SIZE: usize = 12;
const NICKNAME_OFFSET: usize = 8;
const NICKNAME_LENGTH: usize = 10;
const OT_NAME_OFFSET: usize = 20;
const OT_NAME_LENGTH: usize = 7;
const LANGUAGE_OFFSET: usize = 18;
const CHECKSUM_OFFSET: usize = 28;

/// Physical position of each block type (Growth, Attacks, EVs, Misc) for
/// every value of `pid % 24`.
pub const PERMUTATIONS: [[u8; 4]; 24] = [
    [0, 1, 2, 3],
    [0, 1, 3, 2],
    [0, 2, 1, 3],
    [0, 3, 1, 2],
    [0, 2, 3, 1],
    [0, 3, 2, 1],
    [1, 0, 2, 3],
    [1, 0, 3, 2],
    [2, 0, 1, 3],
    [3, 0, 1, 2],
    [2, 0, 3, 1],
    [3, 0, 2, 1],
    [1, 2, 0, 3],
    [1, 3, 0, 2],
    [2, 1, 0, 3],
    [3, 1, 0, 2],
    [2, 3, 0, 1],
    [3, 2, 0, 1],
    [1, 2, 3, 0],
    [1, 3, 2, 0],
    [2, 1, 3, 0],
    [3, 1, 2, 0],
    [2, 3, 1, 0],
    [3, 2, 1, 0],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, Serialize)]
pub enum Language {
    Japanese = 1,
    English = 2,
    French = 3,
    Italian = 4,
    German = 5,
    Spanish = 7,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockType {
    Growth = 0,
    Attacks = 1,
    EvsConditions = 2,
    Miscellaneous = 3,
}

pub fn get_block_order(personality_value: u32) -> [u8; 4] {
    PERMUTATIONS[(personality_value % 24) as usize]
}

/// Index (0-3) of the 12-byte block holding `block` inside the substructure.
pub fn get_block_position(personality_value: u32, block: BlockType) -> usize {
    get_block_order(personality_value)[block as usize] as usize
}

fn block_offset(personality_value: u32, block: BlockType) -> usize {
    get_block_position(personality_value, block) * BLOCK_SIZE
}

/// XORs every little-endian word of the substructure with `pid ^ otid`.
pub fn decrypt(
    data: &[u8; SUBSTRUCTURE_SIZE],
    personality_value: u32,
    original_trainer_id: u32,
) -> [u8; SUBSTRUCTURE_SIZE] {
    let key = personality_value ^ original_trainer_id;
    let mut out = [0u8; SUBSTRUCTURE_SIZE];
    for (plain, word) in out.chunks_exact_mut(4).zip(data.chunks_exact(4)) {
        LittleEndian::write_u32(plain, LittleEndian::read_u32(word) ^ key);
    }
    out
}

/// The cipher is its own inverse.
pub fn encrypt(
    data: &[u8; SUBSTRUCTURE_SIZE],
    personality_value: u32,
    original_trainer_id: u32,
) -> [u8; SUBSTRUCTURE_SIZE] {
    decrypt(data, personality_value, original_trainer_id)
}

fn crypt_record(record: &mut [u8; PK3_SIZE_BOX]) {
    let personality_value = LittleEndian::read_u32(&record[0..4]);
    let original_trainer_id = LittleEndian::read_u32(&record[4..8]);
    let mut substructure = [0u8; SUBSTRUCTURE_SIZE];
    substructure.copy_from_slice(&record[SUBSTRUCTURE_OFFSET..PK3_SIZE_BOX]);
    let crypted = decrypt(&substructure, personality_value, original_trainer_id);
    record[SUBSTRUCTURE_OFFSET..PK3_SIZE_BOX].copy_from_slice(&crypted);
}

/// A record slot is vacant when every byte of the box portion is zero.
pub fn is_empty_record(pk3: &[u8]) -> bool {
    pk3.iter().take(PK3_SIZE_BOX).all(|byte| *byte == 0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EggData {
    pub is_bad_egg: bool,
    pub has_species: bool,
    pub use_egg_name: bool,
}

impl From<u8> for EggData {
    fn from(value: u8) -> Self {
        EggData {
            is_bad_egg: (value & 0b1) != 0,
            has_species: (value & 0b10) != 0,
            use_egg_name: (value & 0b100) != 0,
        }
    }
}

/// Packed origin word of the Misc block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct OriginInfo {
    pub met_level: u8,
    pub game_of_origin: u8,
    pub ball: u8,
    pub trainer_gender: PlayerGender,
}

impl From<u16> for OriginInfo {
    fn from(value: u16) -> Self {
        OriginInfo {
            met_level: (value & 0x7f) as u8,
            game_of_origin: ((value >> 7) & 0xf) as u8,
            ball: ((value >> 11) & 0xf) as u8,
            trainer_gender: if (value >> 15) & 0b1 != 0 {
                PlayerGender::Female
            } else {
                PlayerGender::Male
            },
        }
    }
}

/// The 80-byte record shared by box and party storage.
///
/// The public fields are a decoded view of `source_data`, which holds the
/// record with its substructure decrypted. Changes go through the setters so
/// that both stay in step and unknown bytes survive a round trip.
#[derive(Clone, Debug, Serialize)]
pub struct Pokemon {
    #[serde(skip)]
    source_data: [u8; PK3_SIZE_BOX],
    pub personality_value: u32,
    pub original_trainer_id: TrainerId,
    pub nickname: String,
    pub origin_language: Option<Language>,
    pub egg_data: EggData,
    pub original_trainer_name: String,
    pub markings: u8,
    pub checksum_valid: bool,
    pub species: u16,
    pub held_item: u16,
    pub experience: u32,
    pub pp_bonuses: u8,
    pub friendship: u8,
    pub moves: [u16; 4],
    pub pp: [u8; 4],
    pub evs: [u8; 6],
    pub contest_stats: ContestStats,
    pub pokerus_status: u8,
    pub met_location: u8,
    pub origin_info: OriginInfo,
    pub ivs: [u8; 6],
    pub is_egg: bool,
    pub ability: u8,
    pub ribbons: Ribbons,
    pub fateful_encounter: bool,
}

impl PartialEq for Pokemon {
    fn eq(&self, other: &Self) -> bool {
        self.source_data == other.source_data
    }
}

impl Pokemon {
    /// Decodes the first 80 bytes of an encrypted box or party record.
    pub fn from_pk3(pk3: &[u8]) -> Result<Self> {
        if pk3.len() < PK3_SIZE_BOX {
            return Err(SaveError::InvalidRecordLength {
                expected: PK3_SIZE_BOX,
                actual: pk3.len(),
            });
        }
        let mut source_data = [0u8; PK3_SIZE_BOX];
        source_data.copy_from_slice(&pk3[..PK3_SIZE_BOX]);
        crypt_record(&mut source_data);
        Self::from_decrypted(source_data)
    }

    /// Builds a fresh record with a valid checksum, English origin and
    /// everything else zeroed.
    pub fn new(personality_value: u32, original_trainer_id: TrainerId, species: u16) -> Result<Self> {
        let mut source_data = [0u8; PK3_SIZE_BOX];
        LittleEndian::write_u32(&mut source_data[0..4], personality_value);
        LittleEndian::write_u32(&mut source_data[4..8], original_trainer_id.as_u32());
        source_data[NICKNAME_OFFSET..NICKNAME_OFFSET + NICKNAME_LENGTH].fill(0xff);
        source_data[OT_NAME_OFFSET..OT_NAME_OFFSET + OT_NAME_LENGTH].fill(0xff);
        source_data[LANGUAGE_OFFSET] = Language::English as u8;
        let growth = SUBSTRUCTURE_OFFSET + block_offset(personality_value, BlockType::Growth);
        LittleEndian::write_u16(&mut source_data[growth..growth + 2], species);
        let mut pkmn = Self::parse_fields(source_data)?;
        pkmn.update_checksum();
        Ok(pkmn)
    }

    fn from_decrypted(source_data: [u8; PK3_SIZE_BOX]) -> Result<Self> {
        let pkmn = Self::parse_fields(source_data)?;
        if !pkmn.checksum_valid {
            log::warn!(
                "Checksum mismatch on record with PID 0x{:08x}",
                pkmn.personality_value
            );
        }
        Ok(pkmn)
    }

    fn parse_fields(source_data: [u8; PK3_SIZE_BOX]) -> Result<Self> {
        let mut cursor = Cursor::new(&source_data[..]);
        let personality_value = cursor.read_u32::<LittleEndian>()?;
        let original_trainer_id = TrainerId::from(cursor.read_u32::<LittleEndian>()?);
        let mut nickname = [0u8; NICKNAME_LENGTH];
        cursor.read_exact(&mut nickname)?;
        let origin_language = Language::from_u8(cursor.read_u8()?);
        let egg_data = EggData::from(cursor.read_u8()?);
        let mut original_trainer_name = [0u8; OT_NAME_LENGTH];
        cursor.read_exact(&mut original_trainer_name)?;
        let markings = cursor.read_u8()?;
        let stored_checksum = cursor.read_u16::<LittleEndian>()?;

        let charset = Charset::for_language(origin_language);
        let nickname = charset.decode(&nickname);
        let original_trainer_name = charset.decode(&original_trainer_name);

        let substructure = &source_data[SUBSTRUCTURE_OFFSET..];
        let checksum_valid = pokemon_checksum(substructure) == stored_checksum;

        let offset = block_offset(personality_value, BlockType::Growth) + SUBSTRUCTURE_OFFSET;
        cursor.seek(SeekFrom::Start(offset as u64))?;
        let species = cursor.read_u16::<LittleEndian>()?;
        let held_item = cursor.read_u16::<LittleEndian>()?;
        let experience = cursor.read_u32::<LittleEndian>()?;
        let pp_bonuses = cursor.read_u8()?;
        let friendship = cursor.read_u8()?;

        let offset = block_offset(personality_value, BlockType::Attacks) + SUBSTRUCTURE_OFFSET;
        cursor.seek(SeekFrom::Start(offset as u64))?;
        let mut moves = [0u16; 4];
        for mv in moves.iter_mut() {
            *mv = cursor.read_u16::<LittleEndian>()?;
        }
        let mut pp = [0u8; 4];
        cursor.read_exact(&mut pp)?;

        let evs_offset = block_offset(personality_value, BlockType::EvsConditions);
        cursor.seek(SeekFrom::Start((evs_offset + SUBSTRUCTURE_OFFSET) as u64))?;
        let mut evs = [0u8; 6];
        cursor.read_exact(&mut evs)?;
        let contest_stats = contest::parse_contest_stats(substructure, evs_offset);

        let misc_offset = block_offset(personality_value, BlockType::Miscellaneous);
        cursor.seek(SeekFrom::Start((misc_offset + SUBSTRUCTURE_OFFSET) as u64))?;
        let pokerus_status = cursor.read_u8()?;
        let met_location = cursor.read_u8()?;
        let origin_info = OriginInfo::from(cursor.read_u16::<LittleEndian>()?);
        let ivs_egg_ability_blob = cursor.read_u32::<LittleEndian>()?;
        let mut ivs = [0u8; 6];
        for (idx, iv) in ivs.iter_mut().enumerate() {
            *iv = ((ivs_egg_ability_blob >> (5 * idx)) & 0b11111) as u8;
        }
        let is_egg = ((ivs_egg_ability_blob >> 30) & 0b1) != 0;
        let ability = ((ivs_egg_ability_blob >> 31) & 0b1) as u8;
        let ribbons_obedience_data = cursor.read_u32::<LittleEndian>()?;
        let ribbons = contest::parse_ribbons(substructure, misc_offset);
        let fateful_encounter = (ribbons_obedience_data >> 31) & 0b1 != 0;

        Ok(Pokemon {
            source_data,
            personality_value,
            original_trainer_id,
            nickname,
            origin_language,
            egg_data,
            original_trainer_name,
            markings,
            checksum_valid,
            species,
            held_item,
            experience,
            pp_bonuses,
            friendship,
            moves,
            pp,
            evs,
            contest_stats,
            pokerus_status,
            met_location,
            origin_info,
            ivs,
            is_egg,
            ability,
            ribbons,
            fateful_encounter,
        })
    }

    /// Re-encrypts the record with a freshly computed checksum.
    pub fn to_pk3(&self) -> Vec<u8> {
        let mut record = self.source_data;
        let checksum = pokemon_checksum(&record[SUBSTRUCTURE_OFFSET..]);
        LittleEndian::write_u16(&mut record[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2], checksum);
        crypt_record(&mut record);
        record.to_vec()
    }

    fn substructure_mut(&mut self) -> &mut [u8] {
        &mut self.source_data[SUBSTRUCTURE_OFFSET..]
    }

    fn update_checksum(&mut self) {
        let checksum = pokemon_checksum(&self.source_data[SUBSTRUCTURE_OFFSET..]);
        LittleEndian::write_u16(
            &mut self.source_data[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2],
            checksum,
        );
        self.checksum_valid = true;
    }

    fn charset(&self) -> Charset {
        Charset::for_language(self.origin_language)
    }

    pub fn set_nickname(&mut self, nickname: &str) {
        let charset = self.charset();
        let encoded = charset.encode(nickname, NICKNAME_LENGTH);
        self.source_data[NICKNAME_OFFSET..NICKNAME_OFFSET + NICKNAME_LENGTH]
            .copy_from_slice(&encoded);
        self.nickname = charset.decode(&encoded);
    }

    pub fn set_original_trainer_name(&mut self, name: &str) {
        let charset = self.charset();
        let encoded = charset.encode(name, OT_NAME_LENGTH);
        self.source_data[OT_NAME_OFFSET..OT_NAME_OFFSET + OT_NAME_LENGTH]
            .copy_from_slice(&encoded);
        self.original_trainer_name = charset.decode(&encoded);
    }

    pub fn set_held_item(&mut self, item_id: u16) {
        let offset = block_offset(self.personality_value, BlockType::Growth) + 2;
        LittleEndian::write_u16(&mut self.substructure_mut()[offset..offset + 2], item_id);
        self.held_item = item_id;
        self.update_checksum();
    }

    pub fn set_experience(&mut self, experience: u32) {
        let offset = block_offset(self.personality_value, BlockType::Growth) + 4;
        LittleEndian::write_u32(&mut self.substructure_mut()[offset..offset + 4], experience);
        self.experience = experience;
        self.update_checksum();
    }

    pub fn set_evs(&mut self, evs: [u8; 6]) {
        let offset = block_offset(self.personality_value, BlockType::EvsConditions);
        self.substructure_mut()[offset..offset + 6].copy_from_slice(&evs);
        self.evs = evs;
        self.update_checksum();
    }

    pub fn clear_evs(&mut self) {
        self.set_evs([0u8; 6]);
    }

    pub fn set_contest_stats(&mut self, stats: ContestStats) {
        let offset = block_offset(self.personality_value, BlockType::EvsConditions);
        contest::write_contest_stats(self.substructure_mut(), offset, &stats);
        self.contest_stats = stats;
        self.update_checksum();
    }

    /// Replaces the contest and achievement ribbons. Event ribbons and the
    /// fateful-encounter flag are kept.
    pub fn set_ribbons(&mut self, ribbons: Ribbons) {
        let offset = block_offset(self.personality_value, BlockType::Miscellaneous);
        contest::write_ribbons(self.substructure_mut(), offset, &ribbons);
        self.ribbons = ribbons;
        self.update_checksum();
    }

    pub fn nature(&self) -> &'static str {
        species::nature_name(self.personality_value)
    }

    pub fn is_shiny(&self) -> bool {
        let pid_high = (self.personality_value >> 16) as u16;
        let pid_low = (self.personality_value & 0xffff) as u16;
        let value = self.original_trainer_id.public_id
            ^ self.original_trainer_id.secret_id
            ^ pid_high
            ^ pid_low;
        value < 8
    }

    pub fn national_dex_number(&self) -> Option<u16> {
        species::national_dex_number(self.species)
    }

    /// Level implied by the stored experience and the species' growth rate.
    pub fn level(&self) -> Option<u8> {
        let rate = growth::growth_rate(self.national_dex_number()?)?;
        Some(rate.level_from_experience(self.experience))
    }

    pub fn ability_id(&self) -> Option<u8> {
        species::ability_for(self.national_dex_number()?, self.ability)
    }
}

/// Unencrypted battle state appended to party records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BattleStats {
    pub status_condition: u32,
    pub level: u8,
    pub pokerus_remaining: u8,
    pub current_hp: u16,
    pub max_hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub speed: u16,
    pub special_attack: u16,
    pub special_defense: u16,
}

impl BattleStats {
    fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        Ok(BattleStats {
            status_condition: cursor.read_u32::<LittleEndian>()?,
            level: cursor.read_u8()?,
            pokerus_remaining: cursor.read_u8()?,
            current_hp: cursor.read_u16::<LittleEndian>()?,
            max_hp: cursor.read_u16::<LittleEndian>()?,
            attack: cursor.read_u16::<LittleEndian>()?,
            defense: cursor.read_u16::<LittleEndian>()?,
            speed: cursor.read_u16::<LittleEndian>()?,
            special_attack: cursor.read_u16::<LittleEndian>()?,
            special_defense: cursor.read_u16::<LittleEndian>()?,
        })
    }

    fn to_bytes(self) -> [u8; PK3_SIZE_PARTY - PK3_SIZE_BOX] {
        let mut out = [0u8; PK3_SIZE_PARTY - PK3_SIZE_BOX];
        LittleEndian::write_u32(&mut out[0..4], self.status_condition);
        out[4] = self.level;
        out[5] = self.pokerus_remaining;
        let stats = [
            self.current_hp,
            self.max_hp,
            self.attack,
            self.defense,
            self.speed,
            self.special_attack,
            self.special_defense,
        ];
        LittleEndian::write_u16_into(&stats, &mut out[6..]);
        out
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PartyPokemon {
    pub pokemon: Pokemon,
    pub stats: BattleStats,
}

impl PartyPokemon {
    pub fn from_party_pk3(pk3: &[u8]) -> Result<Self> {
        if pk3.len() < PK3_SIZE_PARTY {
            return Err(SaveError::InvalidRecordLength {
                expected: PK3_SIZE_PARTY,
                actual: pk3.len(),
            });
        }
        Ok(PartyPokemon {
            pokemon: Pokemon::from_pk3(&pk3[..PK3_SIZE_BOX])?,
            stats: BattleStats::parse(&pk3[PK3_SIZE_BOX..PK3_SIZE_PARTY])?,
        })
    }

    pub fn to_party_pk3(&self) -> Vec<u8> {
        let mut pk3 = self.pokemon.to_pk3();
        pk3.extend_from_slice(&self.stats.to_bytes());
        pk3
    }

    pub fn level(&self) -> u8 {
        self.stats.level
    }

    /// Drops the battle state; box storage only keeps the first 80 bytes.
    pub fn into_box(self) -> Pokemon {
        self.pokemon
    }
}
