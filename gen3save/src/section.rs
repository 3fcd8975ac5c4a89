//! Locating the active save slot and the sections inside it.
//!
//! A save holds two copies of the game (slot A and slot B), each 14 sections of
//! 4 KiB. The game alternates between them and rotates the physical order of the
//! sections on every save, so nothing can be read before the footer of every
//! section has been inspected.

use std::io::{Cursor, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;

use crate::checksum::{self, LAST_PC_SECTION_DATA_SIZE, SECTION_DATA_SIZE};
use crate::error::{Decoded, DefaultReason, Result, SaveError};

pub const SECTION_SIZE: usize = 0x1000;
pub const NUMBER_OF_SECTIONS: u8 = 14;
pub const SAVE_A_OFFSET: usize = 0x0000;
pub const SAVE_B_OFFSET: usize = 0xE000;
pub const SLOT_SIZE: usize = SECTION_SIZE * NUMBER_OF_SECTIONS as usize;

const SECTION_ID_OFFSET: u64 = 0x0ff4;
pub const SECTION_CHECKSUM_OFFSET: usize = 0x0ff6;

pub const FIRST_PC_SECTION: u8 = 5;
pub const LAST_PC_SECTION: u8 = 13;
pub const PC_BUFFER_SIZE: usize =
    SECTION_DATA_SIZE * (LAST_PC_SECTION - FIRST_PC_SECTION) as usize + LAST_PC_SECTION_DATA_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SaveSlot {
    A,
    B,
}

impl SaveSlot {
    pub fn offset(&self) -> usize {
        match self {
            SaveSlot::A => SAVE_A_OFFSET,
            SaveSlot::B => SAVE_B_OFFSET,
        }
    }
}

/// The trailing 12 bytes of every section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionHeader {
    pub id: u16,
    pub checksum: u16,
    pub signature: u32,
    pub save_index: u32,
}

/// Absolute buffer offset of each section id within one slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionMap {
    offsets: [Option<usize>; NUMBER_OF_SECTIONS as usize],
}

impl SectionMap {
    pub fn get(&self, section_id: u8) -> Option<usize> {
        self.offsets.get(section_id as usize).copied().flatten()
    }

    pub fn contains(&self, section_id: u8) -> bool {
        self.get(section_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.offsets.iter().filter(|offset| offset.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_complete(&self) -> bool {
        self.len() == NUMBER_OF_SECTIONS as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.offsets
            .iter()
            .enumerate()
            .filter_map(|(id, offset)| offset.map(|offset| (id as u8, offset)))
    }

    /// The full 4096 bytes of a section, footer included.
    pub fn section<'a>(&self, buffer: &'a [u8], section_id: u8) -> Option<&'a [u8]> {
        let offset = self.get(section_id)?;
        buffer.get(offset..offset + SECTION_SIZE)
    }

    fn insert(&mut self, section_id: u8, offset: usize) -> bool {
        match self.offsets.get_mut(section_id as usize) {
            Some(entry) if entry.is_none() => {
                *entry = Some(offset);
                true
            }
            _ => false,
        }
    }
}

/// The slot chosen for this load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveSlot {
    pub slot: SaveSlot,
    pub save_index: u32,
    /// Set when neither slot validated and this one is a best-effort fallback.
    pub degraded: bool,
    pub sections: SectionMap,
}

struct SlotSurvey {
    slot: SaveSlot,
    sections: SectionMap,
    valid: bool,
    save_index: u32,
}

pub fn read_section_header(buffer: &[u8], offset: usize) -> Option<SectionHeader> {
    let section_data = buffer.get(offset..offset + SECTION_SIZE)?;
    let mut cursor = Cursor::new(section_data);
    cursor.seek(SeekFrom::Start(SECTION_ID_OFFSET)).ok()?;
    Some(SectionHeader {
        id: cursor.read_u16::<LittleEndian>().ok()?,
        checksum: cursor.read_u16::<LittleEndian>().ok()?,
        signature: cursor.read_u32::<LittleEndian>().ok()?,
        save_index: cursor.read_u32::<LittleEndian>().ok()?,
    })
}

/// Whether the checksum stored in a section footer matches its payload.
pub fn verify_section(buffer: &[u8], offset: usize) -> bool {
    let Some(header) = read_section_header(buffer, offset) else {
        return false;
    };
    if header.id >= NUMBER_OF_SECTIONS as u16 {
        return false;
    }
    let section_data = &buffer[offset..offset + SECTION_SIZE];
    let computed = checksum::section_checksum(section_data, header.id as u8);
    if computed != header.checksum {
        log::error!(
            "Computed checksum 0x{computed:x} for section {} at 0x{offset:x}, but checksum was 0x{:x}",
            header.id,
            header.checksum
        );
        return false;
    }
    true
}

/// Maps every section id found in `slot` to its absolute offset. Sections that
/// are cut off by the end of the buffer, carry an id outside 0..=13, or repeat an
/// id already seen are left out.
pub fn build_section_map(buffer: &[u8], slot: SaveSlot) -> SectionMap {
    let mut map = SectionMap::default();
    for position in 0..NUMBER_OF_SECTIONS as usize {
        let offset = slot.offset() + position * SECTION_SIZE;
        let Some(header) = read_section_header(buffer, offset) else {
            log::debug!("Slot {slot:?} truncated at section position {position}");
            break;
        };
        if header.id >= NUMBER_OF_SECTIONS as u16 {
            log::trace!(
                "Ignoring unknown section id {} at 0x{offset:x} in slot {slot:?}",
                header.id
            );
            continue;
        }
        if !map.insert(header.id as u8, offset) {
            log::warn!(
                "Duplicate section id {} at 0x{offset:x} in slot {slot:?}",
                header.id
            );
        }
    }
    map
}

fn survey_slot(buffer: &[u8], slot: SaveSlot) -> SlotSurvey {
    let sections = build_section_map(buffer, slot);
    let all_checksums_valid = sections
        .iter()
        .all(|(_, offset)| verify_section(buffer, offset));
    let save_index = sections
        .iter()
        .filter_map(|(_, offset)| read_section_header(buffer, offset))
        .map(|header| header.save_index)
        .max()
        .unwrap_or(0);
    let valid = sections.is_complete() && all_checksums_valid;
    log::debug!(
        "Slot {slot:?}: {} sections, save index {save_index}, valid: {valid}",
        sections.len()
    );

    SlotSurvey {
        slot,
        sections,
        valid,
        save_index,
    }
}

/// Picks the slot the game considers current: the higher save index among the
/// slots whose sections are all present and checksum-valid. When neither slot
/// validates, slot A (or slot B if A holds nothing recognisable) is used and the
/// result is flagged as degraded.
pub fn locate_active_slot(buffer: &[u8]) -> Result<ActiveSlot> {
    let slot_a = survey_slot(buffer, SaveSlot::A);
    let slot_b = survey_slot(buffer, SaveSlot::B);

    let (chosen, degraded) = match (slot_a.valid, slot_b.valid) {
        (true, true) if slot_b.save_index > slot_a.save_index => (slot_b, false),
        (true, _) => (slot_a, false),
        (false, true) => (slot_b, false),
        (false, false) if !slot_a.sections.is_empty() => (slot_a, true),
        (false, false) if !slot_b.sections.is_empty() => (slot_b, true),
        (false, false) => {
            log::error!("Neither save slot contains a recognisable section");
            return Err(SaveError::CorruptSave);
        }
    };

    if degraded {
        log::warn!(
            "No save slot passed validation, falling back to slot {:?}",
            chosen.slot
        );
    } else {
        log::debug!(
            "Active slot is {:?} with save index {}",
            chosen.slot,
            chosen.save_index
        );
    }

    Ok(ActiveSlot {
        slot: chosen.slot,
        save_index: chosen.save_index,
        degraded,
        sections: chosen.sections,
    })
}

/// Concatenates the payloads of sections 5 through 13 into the logical PC
/// buffer. A missing section ends the buffer early so that every offset that is
/// present still lines up.
pub fn assemble_pc_buffer(buffer: &[u8], sections: &SectionMap) -> Decoded<Vec<u8>> {
    let mut pc_buffer = Vec::with_capacity(PC_BUFFER_SIZE);
    for section_id in FIRST_PC_SECTION..=LAST_PC_SECTION {
        let Some(offset) = sections.get(section_id) else {
            log::warn!(
                "PC buffer truncated at section {section_id} ({} bytes)",
                pc_buffer.len()
            );
            return Decoded::defaulted(pc_buffer, DefaultReason::TruncatedSection);
        };
        let size = checksum::checksum_span(section_id);
        pc_buffer.extend_from_slice(&buffer[offset..offset + size]);
    }
    Decoded::Present(pc_buffer)
}

/// Maps an offset in the PC buffer back to its section id and the offset within
/// that section's payload.
pub fn pc_location(pc_offset: usize) -> Option<(u8, usize)> {
    if pc_offset >= PC_BUFFER_SIZE {
        return None;
    }
    let section_id = FIRST_PC_SECTION + (pc_offset / SECTION_DATA_SIZE) as u8;
    let section_offset = pc_offset % SECTION_DATA_SIZE;
    Some((section_id, section_offset))
}
