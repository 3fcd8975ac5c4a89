//! Reading and editing Generation 3 Pokemon save files (Ruby, Sapphire,
//! Emerald, FireRed and LeafGreen).
//!
//! ```no_run
//! let bytes = std::fs::read("emerald.sav").unwrap();
//! let mut save = gen3save::decode(bytes.clone()).unwrap();
//! println!("{:?}", save.trainer_info().unwrap().player_name.value());
//! save.set_money(5000).unwrap();
//! std::fs::write("emerald.sav", gen3save::encode(&save, &bytes)).unwrap();
//! ```

use serde::Serialize;

pub mod checksum;
pub mod contest;
pub mod error;
pub mod growth;
pub mod items;
pub mod pokedex;
pub mod pokemon;
pub mod save;
pub mod section;
pub mod species;
pub mod storage;
pub mod text;
pub mod trainer;

#[cfg(test)]
mod testing;

pub use error::{Decoded, DefaultReason, Result, SaveError};
pub use items::{Bag, BagItem, GameFamily, ItemCipher, Pocket};
pub use pokemon::{BattleStats, PartyPokemon, Pokemon};
pub use save::{DecodeOptions, SaveFile, SectionReport};
pub use text::Charset;
pub use trainer::{GameCode, PlayerGender, TrainerInfo};

/// Trainer id as stored in saves and records: the visible id in the low half,
/// the secret id in the high half.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TrainerId {
    pub public_id: u16,
    pub secret_id: u16,
}

impl TrainerId {
    pub fn as_u32(&self) -> u32 {
        (self.secret_id as u32) << 16 | self.public_id as u32
    }
}

impl From<u32> for TrainerId {
    fn from(value: u32) -> Self {
        TrainerId {
            public_id: (value & 0xffff) as u16,
            secret_id: (value >> 16) as u16,
        }
    }
}

/// Decodes a raw save image.
pub fn decode(bytes: Vec<u8>) -> Result<SaveFile> {
    SaveFile::from_bytes(bytes)
}

/// Applies the sections changed in `save` on top of `original`; every other
/// byte of `original` is kept.
pub fn encode(save: &SaveFile, original: &[u8]) -> Vec<u8> {
    save.write_changes_into(original)
}
