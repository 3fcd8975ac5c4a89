use crate::{load_save, SaveArgs};
use clap::Args;
use gen3save::{Pokemon, SaveError};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct Opts {
    #[command(flatten)]
    pub save: SaveArgs,
    #[arg(long)]
    pub box_number: u8,
    #[arg(long)]
    pub slot: u8,
    /// Record to insert, either a box (80 byte) or party (100 byte) pk3
    #[arg(long)]
    pub pk3: PathBuf,
    /// Overwrite whatever occupies the slot
    #[arg(short, long)]
    pub force: bool,
}

pub fn run(opts: Opts) -> anyhow::Result<()> {
    let mut loaded = load_save(&opts.save)?;

    let pk3_data = std::fs::read(&opts.pk3)?;
    let pokemon = Pokemon::from_pk3(&pk3_data)?;
    if !pokemon.checksum_valid {
        log::warn!("{} has a bad record checksum", opts.pk3.display());
    }

    let result = if opts.force {
        loaded
            .save
            .set_box_slot(opts.box_number, opts.slot, Some(&pokemon))
    } else {
        loaded
            .save
            .put_pokemon_in_box(opts.box_number, opts.slot, &pokemon)
    };

    match result {
        Ok(()) => {
            loaded.write_to_file(&opts.save.sav)?;
            println!("Wrote Pokemon into save file");
        }
        Err(SaveError::SlotOccupied { .. }) => {
            eprintln!("That box position is occupied!");
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
