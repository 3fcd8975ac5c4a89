use clap::{Args, ValueEnum};
use gen3save::{Charset, DecodeOptions, GameCode, SaveFile};
use std::path::{Path, PathBuf};

pub mod deposit;
pub mod edit;
pub mod extract;
pub mod insert;
pub mod inspect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GameArg {
    RubySapphire,
    Emerald,
    FireredLeafgreen,
}

impl From<GameArg> for GameCode {
    fn from(game: GameArg) -> Self {
        match game {
            GameArg::RubySapphire => GameCode::RubySapphire,
            GameArg::Emerald => GameCode::Emerald,
            GameArg::FireredLeafgreen => GameCode::FireRedLeafGreen,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CharsetArg {
    Western,
    Japanese,
}

impl From<CharsetArg> for Charset {
    fn from(charset: CharsetArg) -> Self {
        match charset {
            CharsetArg::Western => Charset::Western,
            CharsetArg::Japanese => Charset::Japanese,
        }
    }
}

/// Options shared by every tool that opens a save file.
#[derive(Debug, Args)]
pub struct SaveArgs {
    #[arg(short, long)]
    pub sav: PathBuf,
    /// Skip game detection
    #[arg(long, value_enum)]
    pub game: Option<GameArg>,
    /// Skip text encoding detection
    #[arg(long, value_enum)]
    pub charset: Option<CharsetArg>,
}

impl SaveArgs {
    pub fn for_path(sav: impl Into<PathBuf>) -> Self {
        SaveArgs {
            sav: sav.into(),
            game: None,
            charset: None,
        }
    }

    fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            game: self.game.map(GameCode::from),
            charset: self.charset.map(Charset::from),
        }
    }
}

/// A save opened from disk together with the bytes it was read from.
pub struct LoadedSave {
    pub save: SaveFile,
    original: Vec<u8>,
}

pub fn load_save(args: &SaveArgs) -> anyhow::Result<LoadedSave> {
    let original = std::fs::read(&args.sav)?;
    let save = SaveFile::with_options(original.clone(), args.decode_options())?;
    let report = save.verify_sections();
    if !report.is_ok() {
        log::warn!(
            "{}: missing sections {:?}, bad checksums {:?}",
            args.sav.display(),
            report.missing,
            report.bad_checksum
        );
    }
    if save.is_degraded() {
        log::warn!("{}: no save slot validated, data may be stale", args.sav.display());
    }
    Ok(LoadedSave { save, original })
}

impl LoadedSave {
    /// Writes the changed sections back over the original file contents.
    pub fn write_to_file(&self, filepath: impl AsRef<Path>) -> anyhow::Result<()> {
        let contents = gen3save::encode(&self.save, &self.original);
        std::fs::write(filepath, contents)?;
        Ok(())
    }
}
