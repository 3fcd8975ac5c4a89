use std::collections::BTreeSet;

use byteorder::{ByteOrder, LittleEndian};
use num_traits::FromPrimitive;
use serde::Serialize;

use crate::checksum;
use crate::error::{Decoded, Result, SaveError};
use crate::items::{self, Bag, GameFamily, ItemCipher, Pocket};
use crate::pokedex::{self, PokedexBitfield, POKEDEX_OWNED_OFFSET, POKEDEX_SEEN_OFFSET};
use crate::pokemon::{Language, PartyPokemon, Pokemon, PK3_SIZE_BOX};
use crate::section::{
    self, ActiveSlot, SaveSlot, NUMBER_OF_SECTIONS, SECTION_CHECKSUM_OFFSET, SECTION_SIZE,
};
use crate::storage::{self, BOX_COUNT, PARTY_SIZE};
use crate::text::Charset;
use crate::trainer::{self, GameCode, TrainerInfo, NUMBER_OF_BADGES};

/// Overrides for values that are normally detected from the save itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub game: Option<GameCode>,
    pub charset: Option<Charset>,
}

/// Outcome of re-checking every section of the active slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    pub missing: Vec<u8>,
    pub bad_checksum: Vec<u8>,
}

impl SectionReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.bad_checksum.is_empty()
    }
}

/// A decoded save image.
///
/// Entities are decoded from the owned buffer on every call. Mutators write
/// into the buffer, fix the checksum of each section they touch and remember
/// it so that [`crate::encode`] can patch only those sections.
#[derive(Clone, Debug)]
pub struct SaveFile {
    full_contents: Vec<u8>,
    active: ActiveSlot,
    game_code: GameCode,
    charset: Charset,
    changed_sections: BTreeSet<u8>,
}

impl SaveFile {
    pub fn from_bytes(full_contents: Vec<u8>) -> Result<Self> {
        Self::with_options(full_contents, DecodeOptions::default())
    }

    pub fn with_options(full_contents: Vec<u8>, options: DecodeOptions) -> Result<Self> {
        let active = section::locate_active_slot(&full_contents)?;
        let mut save = SaveFile {
            full_contents,
            active,
            game_code: GameCode::FireRedLeafGreen,
            charset: Charset::Western,
            changed_sections: BTreeSet::new(),
        };
        save.game_code = match options.game {
            Some(game) => game,
            None => save.detect_game_code()?,
        };
        save.charset = match options.charset {
            Some(charset) => charset,
            None => save.detect_charset(),
        };
        log::debug!(
            "Loaded {:?} save from slot {:?} (index {}), charset {:?}",
            save.game_code,
            save.active.slot,
            save.active.save_index,
            save.charset
        );
        Ok(save)
    }

    fn detect_game_code(&self) -> Result<GameCode> {
        if let Some(section0) = self.section(0) {
            return trainer::read_game_code(section0, self.section(1));
        }
        // Without section 0 the bag layout is the only remaining hint.
        let game = match self.section(1).map(items::detect_game_type) {
            Some(GameFamily::RubySapphireEmerald) => GameCode::Emerald,
            _ => GameCode::FireRedLeafGreen,
        };
        log::warn!("Section 0 is missing, assuming {game:?}");
        Ok(game)
    }

    fn detect_charset(&self) -> Charset {
        let language = self
            .section(1)
            .and_then(|section1| storage::lead_language_byte(section1, self.game_code))
            .and_then(Language::from_u8);
        Charset::for_language(language)
    }

    fn section(&self, section_id: u8) -> Option<&[u8]> {
        self.active.sections.section(&self.full_contents, section_id)
    }

    /// Runs `write` over the full 4096 bytes of a section, then refreshes the
    /// section checksum and records the section as changed.
    fn modify_section<T>(
        &mut self,
        section_id: u8,
        write: impl FnOnce(&mut [u8]) -> Result<T>,
    ) -> Result<T> {
        let offset = self
            .active
            .sections
            .get(section_id)
            .ok_or(SaveError::MissingSection(section_id))?;
        let section_data = &mut self.full_contents[offset..offset + SECTION_SIZE];
        let result = write(section_data)?;
        let value = checksum::section_checksum(section_data, section_id);
        LittleEndian::write_u16(
            &mut section_data[SECTION_CHECKSUM_OFFSET..SECTION_CHECKSUM_OFFSET + 2],
            value,
        );
        self.changed_sections.insert(section_id);
        log::trace!("Section {section_id} rewritten, checksum 0x{value:04x}");
        Ok(result)
    }

    fn require_sections(&self, section_ids: &[u8]) -> Result<()> {
        match section_ids
            .iter()
            .find(|section_id| !self.active.sections.contains(**section_id))
        {
            Some(missing) => Err(SaveError::MissingSection(*missing)),
            None => Ok(()),
        }
    }

    /// Writes `data` at `pc_offset` of the PC buffer, splitting it across
    /// section boundaries where a record straddles two sections. Nothing is
    /// written unless every section the data lands in is present.
    fn write_pc_bytes(&mut self, pc_offset: usize, data: &[u8]) -> Result<()> {
        let mut chunks = Vec::new();
        let mut planned = 0;
        while planned < data.len() {
            let (section_id, section_offset) = section::pc_location(pc_offset + planned)
                .ok_or(SaveError::ValueOutOfRange {
                    field: "pc offset",
                    value: (pc_offset + planned) as u32,
                })?;
            let span = checksum::checksum_span(section_id);
            let len = (span - section_offset).min(data.len() - planned);
            chunks.push((section_id, section_offset, planned..planned + len));
            planned += len;
        }
        let section_ids = chunks.iter().map(|(id, _, _)| *id).collect::<Vec<_>>();
        self.require_sections(&section_ids)?;

        for (section_id, section_offset, range) in chunks {
            let bytes = &data[range];
            self.modify_section(section_id, |section_data| {
                section_data[section_offset..section_offset + bytes.len()].copy_from_slice(bytes);
                Ok(())
            })?;
        }
        Ok(())
    }

    pub fn game_code(&self) -> GameCode {
        self.game_code
    }

    pub fn game_family(&self) -> GameFamily {
        self.game_code.family()
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn active_slot(&self) -> SaveSlot {
        self.active.slot
    }

    pub fn save_index(&self) -> u32 {
        self.active.save_index
    }

    /// True when neither slot validated and the data comes from a fallback.
    pub fn is_degraded(&self) -> bool {
        self.active.degraded
    }

    pub fn verify_sections(&self) -> SectionReport {
        let mut report = SectionReport::default();
        for section_id in 0..NUMBER_OF_SECTIONS {
            match self.active.sections.get(section_id) {
                Some(offset) if section::verify_section(&self.full_contents, offset) => {}
                Some(_) => report.bad_checksum.push(section_id),
                None => report.missing.push(section_id),
            }
        }
        report
    }

    pub fn trainer_info(&self) -> Result<TrainerInfo> {
        let section0 = self.section(0).ok_or(SaveError::MissingSection(0))?;
        trainer::parse_trainer(section0, self.charset)
    }

    pub fn badges(&self) -> Decoded<[bool; NUMBER_OF_BADGES]> {
        match self.section(2) {
            Some(section2) => trainer::parse_badges(section2, self.game_code),
            None => Decoded::missing_section(),
        }
    }

    pub fn badge_count(&self) -> usize {
        trainer::badge_count(self.badges().value())
    }

    /// Whether a Pokemon of `level` obeys this trainer, and the highest level
    /// that does.
    pub fn check_obedience(&self, level: u8) -> (bool, u8) {
        trainer::check_obedience(level, self.badge_count(), self.game_family())
    }

    pub fn party(&self) -> Decoded<Vec<PartyPokemon>> {
        match self.section(1) {
            Some(section1) => storage::parse_party(section1, self.game_code),
            None => Decoded::missing_section(),
        }
    }

    fn pc_buffer(&self) -> Decoded<Vec<u8>> {
        section::assemble_pc_buffer(&self.full_contents, &self.active.sections)
    }

    /// The 30 slots of box `box_number` (1-14).
    pub fn get_box(&self, box_number: u8) -> Result<Vec<Option<Pokemon>>> {
        storage::parse_box(self.pc_buffer().value(), box_number)
    }

    pub fn get_pokemon_from_box(&self, box_number: u8, slot: u8) -> Result<Option<Pokemon>> {
        storage::check_box_position(box_number, slot)?;
        let mut slots = self.get_box(box_number)?;
        Ok(slots.swap_remove(slot as usize - 1))
    }

    /// First vacant box slot, scanning box 1 slot 1 onwards.
    pub fn first_empty_box_slot(&self) -> Option<(u8, u8)> {
        (1..=BOX_COUNT).find_map(|box_number| {
            let slots = self.get_box(box_number).ok()?;
            slots
                .iter()
                .position(Option::is_none)
                .map(|idx| (box_number, idx as u8 + 1))
        })
    }

    pub fn box_names(&self) -> Vec<Decoded<String>> {
        storage::parse_box_names(self.pc_buffer().value(), self.charset)
    }

    pub fn box_wallpapers(&self) -> Decoded<Vec<u8>> {
        storage::parse_box_wallpapers(self.pc_buffer().value())
    }

    pub fn current_box(&self) -> Decoded<u8> {
        storage::current_box(self.pc_buffer().value())
    }

    fn item_cipher(&self, section1: &[u8]) -> Decoded<ItemCipher> {
        ItemCipher::for_game(self.game_code, self.section(0), section1)
    }

    pub fn bag(&self) -> Decoded<Bag> {
        match self.section(1) {
            Some(section1) => self
                .item_cipher(section1)
                .map(|cipher| items::parse_bag(section1, self.game_family(), &cipher)),
            None => Decoded::missing_section(),
        }
    }

    pub fn money(&self) -> Decoded<u32> {
        let Some(section1) = self.section(1) else {
            return Decoded::missing_section();
        };
        match self.item_cipher(section1) {
            Decoded::Present(cipher) => items::get_money(section1, &cipher),
            Decoded::Defaulted { reason, .. } => Decoded::defaulted(0, reason),
        }
    }

    pub fn pokedex(&self) -> Decoded<PokedexBitfield> {
        match self.section(0) {
            Some(section0) => pokedex::parse_pokedex(section0),
            None => Decoded::missing_section(),
        }
    }

    pub fn is_national_dex_unlocked(&self) -> Decoded<bool> {
        match self.section(0) {
            Some(section0) => pokedex::is_national_dex_unlocked(section0, self.game_code),
            None => Decoded::missing_section(),
        }
    }

    /// Overwrites a box slot, or clears it when `pokemon` is `None`.
    pub fn set_box_slot(&mut self, box_number: u8, slot: u8, pokemon: Option<&Pokemon>) -> Result<()> {
        let offset = storage::box_record_offset(box_number, slot)?;
        let record = match pokemon {
            Some(pkmn) => pkmn.to_pk3(),
            None => vec![0u8; PK3_SIZE_BOX],
        };
        self.write_pc_bytes(offset, &record)
    }

    /// Places a Pokemon in an empty box slot and registers it in the Pokedex.
    pub fn put_pokemon_in_box(&mut self, box_number: u8, slot: u8, pokemon: &Pokemon) -> Result<()> {
        if self.get_pokemon_from_box(box_number, slot)?.is_some() {
            log::error!("Box {box_number} slot {slot} is already occupied");
            return Err(SaveError::SlotOccupied { box_number, slot });
        }
        self.set_box_slot(box_number, slot, Some(pokemon))?;
        log::info!(
            "Placed {} (species {}) in box {box_number} slot {slot}",
            pokemon.nickname,
            pokemon.species
        );
        if pokemon.is_egg {
            return Ok(());
        }
        match pokemon.national_dex_number() {
            Some(national) => {
                if national > pokedex::regional_dex_size(self.game_code)
                    && !self.is_national_dex_unlocked().into_value()
                {
                    log::warn!("#{national} stays hidden until the National Dex is unlocked");
                }
                self.mark_pokemon_owned_in_dex(national)
            }
            None => {
                log::warn!("Species {} has no National Dex number", pokemon.species);
                Ok(())
            }
        }
    }

    pub fn take_pokemon_from_box(&mut self, box_number: u8, slot: u8) -> Result<Option<Pokemon>> {
        let pokemon = self.get_pokemon_from_box(box_number, slot)?;
        if pokemon.is_some() {
            self.set_box_slot(box_number, slot, None)?;
        }
        Ok(pokemon)
    }

    fn write_party(&mut self, party: &[PartyPokemon]) -> Result<()> {
        let game = self.game_code;
        self.modify_section(1, |section1| storage::write_party(section1, game, party))
    }

    /// Replaces party member `index` (0-based), appends when `index` equals
    /// the party size, or removes the member when `pokemon` is `None`.
    pub fn set_party_slot(&mut self, index: usize, pokemon: Option<&PartyPokemon>) -> Result<()> {
        let mut party = self.party().into_value();
        match pokemon {
            Some(pkmn) if index < party.len() => party[index] = pkmn.clone(),
            Some(pkmn) if index == party.len() && index < PARTY_SIZE => party.push(pkmn.clone()),
            None if index < party.len() => {
                party.remove(index);
            }
            _ => return Err(SaveError::InvalidPartySlot(index)),
        }
        self.write_party(&party)
    }

    /// Moves party member `index` into a box slot, dropping its battle state.
    pub fn deposit_party_pokemon(&mut self, index: usize, box_number: u8, slot: u8) -> Result<()> {
        let party = self.party().into_value();
        let pokemon = party
            .get(index)
            .cloned()
            .ok_or(SaveError::InvalidPartySlot(index))?;
        self.put_pokemon_in_box(box_number, slot, &pokemon.into_box())?;
        self.set_party_slot(index, None)
    }

    /// The cipher for writes. An Emerald save without section 0 has no key
    /// to write with.
    fn write_cipher(&self) -> Result<ItemCipher> {
        let section1 = self.section(1).ok_or(SaveError::MissingSection(1))?;
        match self.item_cipher(section1) {
            Decoded::Present(cipher) => Ok(cipher),
            Decoded::Defaulted { .. } => Err(SaveError::MissingSection(0)),
        }
    }

    pub fn deposit_item(&mut self, pocket: Pocket, item_id: u16, quantity: u16) -> Result<()> {
        let family = self.game_family();
        let cipher = self.write_cipher()?;
        self.modify_section(1, |section1| {
            items::deposit_item(section1, family, pocket, item_id, quantity, &cipher)
        })
    }

    pub fn withdraw_item(&mut self, pocket: Pocket, item_id: u16, quantity: u16) -> Result<()> {
        let family = self.game_family();
        let cipher = self.write_cipher()?;
        self.modify_section(1, |section1| {
            items::withdraw_item(section1, family, pocket, item_id, quantity, &cipher)
        })
    }

    pub fn set_money(&mut self, money: u32) -> Result<()> {
        let cipher = self.write_cipher()?;
        self.modify_section(1, |section1| items::set_money(section1, money, &cipher))
    }

    pub fn set_box_name(&mut self, box_number: u8, name: &str) -> Result<()> {
        let (offset, encoded) = storage::encode_box_name(box_number, name, self.charset)?;
        self.write_pc_bytes(offset, &encoded)
    }

    /// Sets or clears badge `badge` (0-based, gym order).
    pub fn set_badge(&mut self, badge: usize, earned: bool) -> Result<()> {
        let game = self.game_code;
        self.modify_section(2, |section2| {
            trainer::write_badge(section2, game, badge, earned)
        })
    }

    /// Switches the Pokedex to National mode.
    pub fn unlock_national_dex(&mut self) -> Result<()> {
        self.require_sections(&[0, 2])?;
        let game = self.game_code;
        self.modify_section(0, |section0| pokedex::unlock_national_dex_magic(section0, game))?;
        self.modify_section(2, |section2| pokedex::unlock_national_dex_flags(section2, game))?;
        log::info!("National Dex unlocked");
        Ok(())
    }

    /// Sets the owned flag and all three copies of the seen flag.
    pub fn mark_pokemon_owned_in_dex(&mut self, national: u16) -> Result<()> {
        self.require_sections(&[0, 1, 4])?;
        let game = self.game_code;
        self.modify_section(0, |section0| {
            pokedex::set_flag(section0, POKEDEX_OWNED_OFFSET, national)?;
            pokedex::set_flag(section0, POKEDEX_SEEN_OFFSET, national)
        })?;
        self.modify_section(1, |section1| {
            pokedex::set_flag(section1, game.pokedex_seen_b(), national)
        })?;
        self.modify_section(4, |section4| {
            pokedex::set_flag(section4, game.pokedex_seen_c(), national)
        })?;
        log::debug!("Marked #{national} as owned");
        Ok(())
    }

    /// Ids of the sections rewritten since load.
    pub fn changed_sections(&self) -> impl Iterator<Item = u8> + '_ {
        self.changed_sections.iter().copied()
    }

    /// The whole image with every change applied.
    pub fn encode(&self) -> Vec<u8> {
        self.full_contents.clone()
    }

    /// Copies only the changed sections over `original`, which is extended if
    /// it is too short to hold them.
    pub fn write_changes_into(&self, original: &[u8]) -> Vec<u8> {
        let mut out = original.to_vec();
        for section_id in self.changed_sections() {
            let Some(offset) = self.active.sections.get(section_id) else {
                continue;
            };
            if out.len() < offset + SECTION_SIZE {
                out.resize(offset + SECTION_SIZE, 0xff);
            }
            out[offset..offset + SECTION_SIZE]
                .copy_from_slice(&self.full_contents[offset..offset + SECTION_SIZE]);
        }
        out
    }
}
