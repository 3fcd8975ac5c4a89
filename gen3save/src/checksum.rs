use byteorder::{ByteOrder, LittleEndian};

/// Bytes of payload carried by every section except the last PC chunk.
pub const SECTION_DATA_SIZE: usize = 3968;
/// Payload of section 13, the tail of the PC buffer.
pub const LAST_PC_SECTION_DATA_SIZE: usize = 2000;

/// Number of payload bytes covered by the checksum of the given section.
pub fn checksum_span(section_id: u8) -> usize {
    if section_id == 13 {
        LAST_PC_SECTION_DATA_SIZE
    } else {
        SECTION_DATA_SIZE
    }
}

/// Sums the data as little-endian u32 words and folds the result into 16 bits.
pub fn compute_section_checksum(data: &[u8]) -> u16 {
    let checksum = data
        .chunks_exact(4)
        .fold(0u32, |sum, word| sum.wrapping_add(LittleEndian::read_u32(word)));

    let checksum_lower = (checksum & 0xffff) as u16;
    let checksum_upper = (checksum >> 16) as u16;
    checksum_upper.wrapping_add(checksum_lower)
}

/// Checksum of a full 4096-byte section, using the span for its id.
pub fn section_checksum(section_data: &[u8], section_id: u8) -> u16 {
    let span = checksum_span(section_id).min(section_data.len());
    compute_section_checksum(&section_data[..span])
}

/// Checksum stored at offset 28 of a Pokemon record: a wrapping sum of the
/// decrypted 48-byte substructure as u16 words.
pub fn pokemon_checksum(decrypted_substructure: &[u8]) -> u16 {
    decrypted_substructure
        .chunks_exact(2)
        .fold(0u16, |sum, half| sum.wrapping_add(LittleEndian::read_u16(half)))
}
