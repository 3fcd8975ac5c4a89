use crate::{load_save, SaveArgs};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct Opts {
    #[command(flatten)]
    pub save: SaveArgs,
    #[arg(long)]
    pub box_number: u8,
    #[arg(long)]
    pub slot: u8,
    #[arg(long)]
    pub dest: PathBuf,
}

pub fn run(opts: Opts) -> anyhow::Result<()> {
    let mut loaded = load_save(&opts.save)?;

    match loaded
        .save
        .take_pokemon_from_box(opts.box_number, opts.slot)?
    {
        Some(pokemon) => {
            let pk3_data = pokemon.to_pk3();
            println!("Saving to {}", opts.dest.display());
            std::fs::write(&opts.dest, pk3_data)?;
            loaded.write_to_file(&opts.save.sav)?;
        }
        None => {
            println!("No Pokemon in that location!");
        }
    }

    Ok(())
}
