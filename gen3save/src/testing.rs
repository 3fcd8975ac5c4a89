//! Synthetic save images for unit tests.

use byteorder::{ByteOrder, LittleEndian};

use crate::checksum;
use crate::section::{SaveSlot, NUMBER_OF_SECTIONS, SECTION_CHECKSUM_OFFSET, SECTION_SIZE};

pub const SAVE_FILE_SIZE: usize = 0x20000;
const SECTION_SIGNATURE: u32 = 0x0801_2025;

pub struct SaveBuilder {
    data: Vec<u8>,
    slots: Vec<(SaveSlot, u8)>,
}

impl SaveBuilder {
    /// An erased flash image: every byte 0xFF, no slot written yet.
    pub fn new() -> Self {
        SaveBuilder {
            data: vec![0xff; SAVE_FILE_SIZE],
            slots: Vec::new(),
        }
    }

    /// Lays out all 14 sections of `slot`, with section 0 at physical position
    /// `rotation`.
    pub fn with_slot(mut self, slot: SaveSlot, save_index: u32, rotation: u8) -> Self {
        let start = slot.offset();
        self.data[start..start + SECTION_SIZE * NUMBER_OF_SECTIONS as usize].fill(0);
        self.slots.retain(|(existing, _)| *existing != slot);
        self.slots.push((slot, rotation));
        for section_id in 0..NUMBER_OF_SECTIONS {
            let section = self.section_mut(slot, section_id);
            LittleEndian::write_u16(&mut section[0xff4..0xff6], section_id as u16);
            LittleEndian::write_u32(&mut section[0xff8..0xffc], SECTION_SIGNATURE);
            LittleEndian::write_u32(&mut section[0xffc..0x1000], save_index);
        }
        self
    }

    pub fn section_mut(&mut self, slot: SaveSlot, section_id: u8) -> &mut [u8] {
        let offset = self.section_offset(slot, section_id);
        &mut self.data[offset..offset + SECTION_SIZE]
    }

    pub fn section_offset(&self, slot: SaveSlot, section_id: u8) -> usize {
        let rotation = self
            .slots
            .iter()
            .find(|(existing, _)| *existing == slot)
            .map(|(_, rotation)| *rotation)
            .expect("slot must be laid out before its sections are used");
        let position = (section_id + rotation) % NUMBER_OF_SECTIONS;
        slot.offset() + position as usize * SECTION_SIZE
    }

    /// Finalises every laid-out section with a correct checksum.
    pub fn build(mut self) -> Vec<u8> {
        for (slot, _) in self.slots.clone() {
            for section_id in 0..NUMBER_OF_SECTIONS {
                let section = self.section_mut(slot, section_id);
                let value = checksum::section_checksum(section, section_id);
                LittleEndian::write_u16(
                    &mut section[SECTION_CHECKSUM_OFFSET..SECTION_CHECKSUM_OFFSET + 2],
                    value,
                );
            }
        }
        self.data
    }
}
