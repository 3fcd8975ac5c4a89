use byteorder::{ByteOrder, LittleEndian};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::Serialize;

const CONTEST_STATS_OFFSET: usize = 6;
const RIBBONS_OFFSET: usize = 8;
const RANK_BITS: u32 = 3;
const RANK_MASK: u32 = 0b111;
const CHAMPION_BIT: u32 = 15;
const WINNING_BIT: u32 = 16;
const VICTORY_BIT: u32 = 17;
const ARTIST_BIT: u32 = 18;
const EFFORT_BIT: u32 = 19;
const DECODED_BITS_MASK: u32 = 0x000f_ffff;

/// Condition values kept in the EVs & Contest block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContestStats {
    pub cool: u8,
    pub beauty: u8,
    pub cute: u8,
    pub smart: u8,
    pub tough: u8,
    pub sheen: u8,
}

impl ContestStats {
    pub fn to_bytes(&self) -> [u8; 6] {
        [
            self.cool,
            self.beauty,
            self.cute,
            self.smart,
            self.tough,
            self.sheen,
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, Serialize)]
pub enum RibbonRank {
    #[default]
    None = 0,
    Normal = 1,
    Super = 2,
    Hyper = 3,
    Master = 4,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Ribbons {
    pub cool: RibbonRank,
    pub beauty: RibbonRank,
    pub cute: RibbonRank,
    pub smart: RibbonRank,
    pub tough: RibbonRank,
    pub champion: bool,
    pub winning: bool,
    pub victory: bool,
    pub artist: bool,
    pub effort: bool,
}

impl Ribbons {
    pub fn from_bits(ribbon_data: u32) -> Self {
        let rank = |shift: u32| {
            RibbonRank::from_u32((ribbon_data >> shift) & RANK_MASK).unwrap_or_default()
        };
        let flag = |bit: u32| (ribbon_data >> bit) & 0b1 != 0;
        Ribbons {
            cool: rank(0),
            beauty: rank(RANK_BITS),
            cute: rank(RANK_BITS * 2),
            smart: rank(RANK_BITS * 3),
            tough: rank(RANK_BITS * 4),
            champion: flag(CHAMPION_BIT),
            winning: flag(WINNING_BIT),
            victory: flag(VICTORY_BIT),
            artist: flag(ARTIST_BIT),
            effort: flag(EFFORT_BIT),
        }
    }

    /// Packs the ribbons back into `existing`, leaving bits 20-31 (event
    /// ribbons and the obedience flag) untouched.
    pub fn to_bits(&self, existing: u32) -> u32 {
        let ranks = [self.cool, self.beauty, self.cute, self.smart, self.tough];
        let mut bits = ranks
            .iter()
            .enumerate()
            .fold(0u32, |bits, (idx, rank)| {
                bits | ((*rank as u32) << (RANK_BITS * idx as u32))
            });
        for (set, bit) in [
            (self.champion, CHAMPION_BIT),
            (self.winning, WINNING_BIT),
            (self.victory, VICTORY_BIT),
            (self.artist, ARTIST_BIT),
            (self.effort, EFFORT_BIT),
        ] {
            if set {
                bits |= 1 << bit;
            }
        }
        (existing & !DECODED_BITS_MASK) | bits
    }

    pub fn count(&self) -> usize {
        let ranks = [self.cool, self.beauty, self.cute, self.smart, self.tough]
            .iter()
            .map(|rank| *rank as usize)
            .sum::<usize>();
        let flags = [
            self.champion,
            self.winning,
            self.victory,
            self.artist,
            self.effort,
        ]
        .iter()
        .filter(|flag| **flag)
        .count();
        ranks + flags
    }
}

/// Reads the six condition bytes at offsets 6-11 of the EVs block. Bytes that
/// fall outside `decrypted` read as 0.
pub fn parse_contest_stats(decrypted: &[u8], evs_block_offset: usize) -> ContestStats {
    let stat = |idx: usize| {
        decrypted
            .get(evs_block_offset + CONTEST_STATS_OFFSET + idx)
            .copied()
            .unwrap_or(0)
    };
    ContestStats {
        cool: stat(0),
        beauty: stat(1),
        cute: stat(2),
        smart: stat(3),
        tough: stat(4),
        sheen: stat(5),
    }
}

/// Reads the ribbon word at offset 8 of the Misc block; a block cut short yields
/// no ribbons.
pub fn parse_ribbons(decrypted: &[u8], misc_block_offset: usize) -> Ribbons {
    ribbon_word(decrypted, misc_block_offset)
        .map(Ribbons::from_bits)
        .unwrap_or_default()
}

pub(crate) fn ribbon_word(decrypted: &[u8], misc_block_offset: usize) -> Option<u32> {
    let start = misc_block_offset + RIBBONS_OFFSET;
    decrypted.get(start..start + 4).map(LittleEndian::read_u32)
}

pub(crate) fn write_contest_stats(decrypted: &mut [u8], evs_block_offset: usize, stats: &ContestStats) {
    let start = evs_block_offset + CONTEST_STATS_OFFSET;
    decrypted[start..start + 6].copy_from_slice(&stats.to_bytes());
}

pub(crate) fn write_ribbons(decrypted: &mut [u8], misc_block_offset: usize, ribbons: &Ribbons) {
    let start = misc_block_offset + RIBBONS_OFFSET;
    let existing = LittleEndian::read_u32(&decrypted[start..start + 4]);
    LittleEndian::write_u32(&mut decrypted[start..start + 4], ribbons.to_bits(existing));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contest_stats_offsets() {
        let mut decrypted = [0u8; 48];
        // EVs block in the second position
        decrypted[12 + 6..12 + 12].copy_from_slice(&[10, 20, 30, 40, 50, 60]);
        let stats = parse_contest_stats(&decrypted, 12);
        assert_eq!(
            stats,
            ContestStats {
                cool: 10,
                beauty: 20,
                cute: 30,
                smart: 40,
                tough: 50,
                sheen: 60,
            }
        );
    }

    #[test]
    fn test_contest_stats_past_end_default_to_zero() {
        let decrypted = [7u8; 40];
        let stats = parse_contest_stats(&decrypted, 30);
        // bytes 36..40 exist, 40 and 41 do not
        assert_eq!(stats.cool, 7);
        assert_eq!(stats.smart, 7);
        assert_eq!(stats.tough, 0);
        assert_eq!(stats.sheen, 0);
    }

    #[test]
    fn test_ribbon_bits() {
        // cool master (4), beauty normal (1), tough hyper (3), champion, effort
        let bits = 4 | (1 << 3) | (3 << 12) | (1 << 15) | (1 << 19);
        let mut decrypted = [0u8; 48];
        LittleEndian::write_u32(&mut decrypted[36 + 8..36 + 12], bits);
        let ribbons = parse_ribbons(&decrypted, 36);
        assert_eq!(ribbons.cool, RibbonRank::Master);
        assert_eq!(ribbons.beauty, RibbonRank::Normal);
        assert_eq!(ribbons.cute, RibbonRank::None);
        assert_eq!(ribbons.tough, RibbonRank::Hyper);
        assert!(ribbons.champion);
        assert!(!ribbons.winning);
        assert!(ribbons.effort);
        assert_eq!(ribbons.count(), 4 + 1 + 3 + 2);
    }

    #[test]
    fn test_invalid_rank_reads_as_none() {
        let ribbons = Ribbons::from_bits(0b111);
        assert_eq!(ribbons.cool, RibbonRank::None);
    }

    #[test]
    fn test_ribbons_preserve_upper_bits() {
        let existing = 0x8000_0000 | (1 << 22) | 0b010;
        let ribbons = Ribbons {
            smart: RibbonRank::Super,
            artist: true,
            ..Default::default()
        };
        let packed = ribbons.to_bits(existing);
        assert_eq!(packed & 0xfff0_0000, 0x8000_0000 | (1 << 22));
        assert_eq!(Ribbons::from_bits(packed), ribbons);
    }

    #[test]
    fn test_short_misc_block_has_no_ribbons() {
        let decrypted = [0xffu8; 40];
        assert_eq!(parse_ribbons(&decrypted, 36), Ribbons::default());
    }
}
