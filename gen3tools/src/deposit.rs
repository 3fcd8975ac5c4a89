use crate::{load_save, SaveArgs};
use clap::Args;

#[derive(Debug, Args)]
pub struct Opts {
    #[command(flatten)]
    pub save: SaveArgs,
    /// Party position, starting at 1
    #[arg(long)]
    pub party_slot: usize,
    #[arg(long)]
    pub box_number: u8,
    /// Box slot to fill; the first empty slot is used when omitted
    #[arg(long)]
    pub slot: Option<u8>,
}

pub fn run(opts: Opts) -> anyhow::Result<()> {
    let mut loaded = load_save(&opts.save)?;

    let party_size = loaded.save.party().value().len();
    if opts.party_slot == 0 || opts.party_slot > party_size {
        anyhow::bail!(
            "Party slot {} is empty, the party holds {party_size}",
            opts.party_slot
        );
    }

    let slot = match opts.slot {
        Some(slot) => slot,
        None => loaded
            .save
            .get_box(opts.box_number)?
            .iter()
            .position(Option::is_none)
            .map(|idx| idx as u8 + 1)
            .ok_or_else(|| anyhow::anyhow!("Box {} is full", opts.box_number))?,
    };

    loaded
        .save
        .deposit_party_pokemon(opts.party_slot - 1, opts.box_number, slot)?;
    loaded.write_to_file(&opts.save.sav)?;
    println!(
        "Moved party Pokemon {} to box {} slot {slot}",
        opts.party_slot, opts.box_number
    );

    Ok(())
}
