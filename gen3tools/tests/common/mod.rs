use gen3save::section::{NUMBER_OF_SECTIONS, SECTION_CHECKSUM_OFFSET, SECTION_SIZE};
use gen3save::{BattleStats, PartyPokemon, Pokemon, TrainerId};
use std::io::Write;
use tempfile::NamedTempFile;

const SAVE_FILE_SIZE: usize = 0x20000;
const GAME_CODE_OFFSET: usize = 0xac;
const EMERALD_TEAM_SIZE_OFFSET: usize = 0x234;
const EMERALD_MONEY_OFFSET: usize = 0x490;
const SECURITY_KEY: u32 = 0x2d1c_3b9a;

pub const TRAINER: TrainerId = TrainerId {
    public_id: 12345,
    secret_id: 54321,
};

/// A blank Emerald save: slot A written at index 1, slot B left erased.
pub struct EmeraldSave {
    data: Vec<u8>,
}

impl EmeraldSave {
    pub fn new() -> Self {
        let mut data = vec![0xff; SAVE_FILE_SIZE];
        data[..SECTION_SIZE * NUMBER_OF_SECTIONS as usize].fill(0);
        let mut save = EmeraldSave { data };
        for section_id in 0..NUMBER_OF_SECTIONS {
            let section = save.section_mut(section_id);
            section[0xff4..0xff6].copy_from_slice(&(section_id as u16).to_le_bytes());
            section[0xff8..0xffc].copy_from_slice(&0x0801_2025u32.to_le_bytes());
            section[0xffc..0x1000].copy_from_slice(&1u32.to_le_bytes());
        }
        save.section_mut(0)[GAME_CODE_OFFSET..GAME_CODE_OFFSET + 4]
            .copy_from_slice(&SECURITY_KEY.to_le_bytes());
        save.section_mut(1)[EMERALD_MONEY_OFFSET..EMERALD_MONEY_OFFSET + 4]
            .copy_from_slice(&SECURITY_KEY.to_le_bytes());
        save
    }

    fn section_mut(&mut self, section_id: u8) -> &mut [u8] {
        let offset = section_id as usize * SECTION_SIZE;
        &mut self.data[offset..offset + SECTION_SIZE]
    }

    pub fn with_party(mut self, party: &[PartyPokemon]) -> Self {
        let section1 = self.section_mut(1);
        section1[EMERALD_TEAM_SIZE_OFFSET..EMERALD_TEAM_SIZE_OFFSET + 4]
            .copy_from_slice(&(party.len() as u32).to_le_bytes());
        for (idx, member) in party.iter().enumerate() {
            let offset = EMERALD_TEAM_SIZE_OFFSET + 4 + idx * 100;
            section1[offset..offset + 100].copy_from_slice(&member.to_party_pk3());
        }
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        for section_id in 0..NUMBER_OF_SECTIONS {
            let section = self.section_mut(section_id);
            let value = gen3save::checksum::section_checksum(section, section_id);
            section[SECTION_CHECKSUM_OFFSET..SECTION_CHECKSUM_OFFSET + 2]
                .copy_from_slice(&value.to_le_bytes());
        }
        self.data
    }
}

pub fn pokemon(personality_value: u32, species: u16) -> Pokemon {
    let mut pkmn = Pokemon::new(personality_value, TRAINER, species).unwrap();
    pkmn.set_nickname("TESTMON");
    pkmn
}

pub fn party_pokemon(personality_value: u32, species: u16, level: u8) -> PartyPokemon {
    PartyPokemon {
        pokemon: pokemon(personality_value, species),
        stats: BattleStats {
            level,
            current_hp: 20,
            max_hp: 20,
            ..Default::default()
        },
    }
}

pub fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}
