use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::Serialize;

use crate::error::{Decoded, DefaultReason, Result, SaveError};
use crate::items::{GameFamily, MAX_MONEY, RSE_MONEY_OFFSET};
use crate::text::Charset;
use crate::TrainerId;

const PLAYER_NAME_LENGTH: usize = 7;
const GAME_CODE_OFFSET: u64 = 0xac;
pub const NUMBER_OF_BADGES: usize = 8;

/// Highest level that obeys the player for 0 through 8 badges.
const OBEDIENCE_LEVELS: [u8; NUMBER_OF_BADGES + 1] = [10, 20, 30, 40, 50, 60, 70, 80, 100];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GameCode {
    RubySapphire,
    FireRedLeafGreen,
    Emerald,
}

impl GameCode {
    pub fn family(&self) -> GameFamily {
        match self {
            GameCode::RubySapphire | GameCode::Emerald => GameFamily::RubySapphireEmerald,
            GameCode::FireRedLeafGreen => GameFamily::FireRedLeafGreen,
        }
    }

    pub fn team_size_offset(&self) -> usize {
        match self {
            GameCode::RubySapphire | GameCode::Emerald => 0x0234,
            GameCode::FireRedLeafGreen => 0x0034,
        }
    }

    fn badge_offset(&self) -> usize {
        match self {
            GameCode::RubySapphire => 0x03a0,
            GameCode::Emerald => 0x03fd,
            GameCode::FireRedLeafGreen => 0x0064,
        }
    }

    /// Byte offset within section 2 and bit mask of badge `badge` (0-based).
    fn badge_bit(&self, badge: usize) -> (usize, u8) {
        let base = self.badge_offset();
        match self {
            GameCode::Emerald => (base, 0x80 >> badge),
            GameCode::RubySapphire if badge == 0 => (base, 0x80),
            GameCode::RubySapphire => (base + 1, 1 << (badge - 1)),
            GameCode::FireRedLeafGreen => (base, 1 << badge),
        }
    }
}

/// The word at section 0 + 0xAC is 0 on Ruby/Sapphire and 1 on
/// FireRed/LeafGreen. Emerald keeps its security key there, but Ruby/Sapphire
/// saves can carry leftover data in the same place. Emerald is only accepted
/// when the money at section 1 + 0x490 decrypts to a plausible amount with
/// that word as the key.
pub fn determine_game_code(data: u32, section1: Option<&[u8]>) -> GameCode {
    match data {
        0x00 => GameCode::RubySapphire,
        0x01 => GameCode::FireRedLeafGreen,
        key => {
            let money = section1
                .and_then(|section1| section1.get(RSE_MONEY_OFFSET..RSE_MONEY_OFFSET + 4))
                .map(|word| LittleEndian::read_u32(word) ^ key);
            match money {
                Some(money) if money <= MAX_MONEY => GameCode::Emerald,
                Some(money) => {
                    log::debug!("Money decrypts to {money} with key 0x{key:08x}, not Emerald");
                    GameCode::RubySapphire
                }
                None => {
                    log::warn!("Section 1 unavailable, assuming Ruby/Sapphire");
                    GameCode::RubySapphire
                }
            }
        }
    }
}

/// The word at section 0 + 0xAC: the game code, or Emerald's security key.
pub fn read_game_code_word(section0: &[u8]) -> Result<u32> {
    let mut cursor = Cursor::new(section0);
    cursor.seek(SeekFrom::Start(GAME_CODE_OFFSET))?;
    Ok(cursor.read_u32::<LittleEndian>()?)
}

pub fn read_game_code(section0: &[u8], section1: Option<&[u8]>) -> Result<GameCode> {
    Ok(determine_game_code(read_game_code_word(section0)?, section1))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, FromPrimitive, Serialize)]
pub enum PlayerGender {
    #[default]
    Male = 0,
    Female = 1,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TimePlayed {
    pub hours: u16,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrainerInfo {
    pub player_name: Decoded<String>,
    pub player_gender: Decoded<PlayerGender>,
    pub id: TrainerId,
    pub time_played: TimePlayed,
}

fn determine_player_gender(data: u8) -> Decoded<PlayerGender> {
    match PlayerGender::from_u8(data) {
        Some(gender) => Decoded::Present(gender),
        None => {
            log::warn!("Invalid player gender: 0x{data:x}");
            Decoded::defaulted(PlayerGender::Male, DefaultReason::OutOfRangeValue)
        }
    }
}

pub fn parse_trainer(section0: &[u8], charset: Charset) -> Result<TrainerInfo> {
    let mut cursor = Cursor::new(section0);

    let mut player_name = [0u8; PLAYER_NAME_LENGTH];
    cursor.read_exact(&mut player_name)?;
    let _ = cursor.read_u8()?;
    let player_gender = determine_player_gender(cursor.read_u8()?);
    let _ = cursor.read_u8()?;
    let trainer_id = TrainerId::from(cursor.read_u32::<LittleEndian>()?);
    let time_played = TimePlayed {
        hours: cursor.read_u16::<LittleEndian>()?,
        minutes: cursor.read_u8()?,
        seconds: cursor.read_u8()?,
        frames: cursor.read_u8()?,
    };

    let player_name = match charset.decode(&player_name) {
        name if name.trim().is_empty() => {
            log::warn!("Player name is empty");
            Decoded::defaulted(String::new(), DefaultReason::InvalidText)
        }
        name => Decoded::Present(name),
    };

    Ok(TrainerInfo {
        player_name,
        player_gender,
        id: trainer_id,
        time_played,
    })
}

/// Earned state of each of the eight badges, in gym order.
pub fn parse_badges(section2: &[u8], game: GameCode) -> Decoded<[bool; NUMBER_OF_BADGES]> {
    let mut badges = [false; NUMBER_OF_BADGES];
    for (badge, earned) in badges.iter_mut().enumerate() {
        let (offset, mask) = game.badge_bit(badge);
        let Some(byte) = section2.get(offset) else {
            log::warn!("Badge flags at 0x{offset:x} lie past the end of section 2");
            return Decoded::defaulted([false; NUMBER_OF_BADGES], DefaultReason::TruncatedSection);
        };
        *earned = byte & mask != 0;
    }
    Decoded::Present(badges)
}

pub fn write_badge(section2: &mut [u8], game: GameCode, badge: usize, earned: bool) -> Result<()> {
    if badge >= NUMBER_OF_BADGES {
        return Err(SaveError::ValueOutOfRange {
            field: "badge",
            value: badge as u32,
        });
    }
    let (offset, mask) = game.badge_bit(badge);
    let byte = section2.get_mut(offset).ok_or(SaveError::MissingSection(2))?;
    if earned {
        *byte |= mask;
    } else {
        *byte &= !mask;
    }
    Ok(())
}

pub fn badge_count(badges: &[bool; NUMBER_OF_BADGES]) -> usize {
    badges.iter().filter(|earned| **earned).count()
}

fn obedience_table(family: GameFamily) -> &'static [u8; NUMBER_OF_BADGES + 1] {
    match family {
        GameFamily::FireRedLeafGreen | GameFamily::RubySapphireEmerald => &OBEDIENCE_LEVELS,
    }
}

/// Highest level that obeys a trainer holding `badge_count` badges. Counts
/// outside 0-8 fall back to the no-badge limit.
pub fn get_obedience_level(badge_count: usize, family: GameFamily) -> u8 {
    let table = obedience_table(family);
    table.get(badge_count).copied().unwrap_or(table[0])
}

pub fn check_obedience(level: u8, badge_count: usize, family: GameFamily) -> (bool, u8) {
    let max_level = get_obedience_level(badge_count, family);
    (level <= max_level, max_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_code() {
        let section1 = vec![0u8; 0x1000];
        assert_eq!(determine_game_code(0, Some(&section1)), GameCode::RubySapphire);
        assert_eq!(determine_game_code(1, Some(&section1)), GameCode::FireRedLeafGreen);
        assert_eq!(GameCode::Emerald.family(), GameFamily::RubySapphireEmerald);
    }

    #[test]
    fn test_emerald_needs_plausible_money() {
        let key = 0x9a3b_1c2d;
        let mut section1 = vec![0u8; 0x1000];
        LittleEndian::write_u32(&mut section1[0x490..0x494], 3000 ^ key);
        assert_eq!(determine_game_code(key, Some(&section1)), GameCode::Emerald);

        let mut section0 = vec![0u8; 0x1000];
        LittleEndian::write_u32(&mut section0[0xac..0xb0], key);
        assert_eq!(read_game_code_word(&section0).unwrap(), key);
        assert_eq!(
            read_game_code(&section0, Some(&section1)).unwrap(),
            GameCode::Emerald
        );
    }

    #[test]
    fn test_ruby_sapphire_with_leftover_code_word() {
        let mut section1 = vec![0u8; 0x1000];
        LittleEndian::write_u32(&mut section1[0x490..0x494], 3000);
        assert_eq!(
            determine_game_code(0xdead_beef, Some(&section1)),
            GameCode::RubySapphire
        );
        assert_eq!(determine_game_code(0xdead_beef, None), GameCode::RubySapphire);
        assert_eq!(determine_game_code(0xdead_beef, Some(&[0u8; 0x100])), GameCode::RubySapphire);
    }

    #[test]
    fn test_parse_trainer() {
        let mut section0 = vec![0u8; 0x1000];
        section0[0..7].copy_from_slice(&[0xcc, 0xbb, 0xc3, 0xc8, 0xff, 0xff, 0xff]);
        section0[8] = 1;
        section0[0x0a..0x0e].copy_from_slice(&[0x39, 0x30, 0x31, 0xd4]);
        section0[0x0e..0x13].copy_from_slice(&[0x0c, 0x00, 0x22, 0x05, 0x3b]);

        let info = parse_trainer(&section0, Charset::Western).unwrap();
        assert_eq!(info.player_name, Decoded::Present("RAIN".to_string()));
        assert_eq!(info.player_gender, Decoded::Present(PlayerGender::Female));
        assert_eq!(info.id.public_id, 12345);
        assert_eq!(info.id.secret_id, 54321);
        assert_eq!(
            info.time_played,
            TimePlayed {
                hours: 12,
                minutes: 34,
                seconds: 5,
                frames: 59,
            }
        );
    }

    #[test]
    fn test_bad_gender_defaults() {
        let mut section0 = vec![0u8; 0x20];
        section0[8] = 7;
        let info = parse_trainer(&section0, Charset::Western).unwrap();
        assert!(info.player_gender.is_defaulted());
        assert_eq!(*info.player_gender.value(), PlayerGender::Male);
        assert!(info.player_name.is_defaulted());
    }

    #[test]
    fn test_firered_badges() {
        let mut section2 = vec![0u8; 0x1000];
        section2[0x64] = 0b0000_0111;
        let badges = parse_badges(&section2, GameCode::FireRedLeafGreen).into_value();
        assert_eq!(badges, [true, true, true, false, false, false, false, false]);
        assert_eq!(badge_count(&badges), 3);
    }

    #[test]
    fn test_emerald_badges() {
        let mut section2 = vec![0u8; 0x1000];
        section2[0x3fd] = 0b1000_0001;
        let badges = parse_badges(&section2, GameCode::Emerald).into_value();
        assert!(badges[0]);
        assert!(badges[7]);
        assert_eq!(badge_count(&badges), 2);
    }

    #[test]
    fn test_ruby_sapphire_badges_span_two_bytes() {
        let mut section2 = vec![0u8; 0x1000];
        section2[0x3a0] = 0x80;
        section2[0x3a1] = 0b0100_0001;
        let badges = parse_badges(&section2, GameCode::RubySapphire).into_value();
        assert_eq!(badges, [true, true, false, false, false, false, false, true]);
    }

    #[test]
    fn test_badges_on_short_section() {
        let badges = parse_badges(&[0xffu8; 0x100], GameCode::Emerald);
        assert_eq!(badges.reason(), Some(DefaultReason::TruncatedSection));
    }

    #[test]
    fn test_write_badge() {
        for game in [
            GameCode::RubySapphire,
            GameCode::Emerald,
            GameCode::FireRedLeafGreen,
        ] {
            let mut section2 = vec![0u8; 0x1000];
            write_badge(&mut section2, game, 3, true).unwrap();
            write_badge(&mut section2, game, 0, true).unwrap();
            write_badge(&mut section2, game, 0, false).unwrap();
            let badges = parse_badges(&section2, game).into_value();
            assert_eq!(badge_count(&badges), 1, "{game:?}");
            assert!(badges[3], "{game:?}");
        }
        let mut section2 = vec![0u8; 0x1000];
        assert!(write_badge(&mut section2, GameCode::Emerald, 8, true).is_err());
    }

    #[test]
    fn test_obedience() {
        let family = GameFamily::RubySapphireEmerald;
        assert_eq!(check_obedience(50, 8, family), (true, 100));
        assert_eq!(check_obedience(50, 0, family), (false, 10));
        assert_eq!(check_obedience(30, 2, family), (true, 30));
        assert_eq!(get_obedience_level(9, GameFamily::FireRedLeafGreen), 10);
    }
}
