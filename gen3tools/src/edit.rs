use crate::{load_save, SaveArgs};
use clap::{Args, ValueEnum};
use gen3save::Pocket;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PocketArg {
    Items,
    KeyItems,
    Pokeballs,
    TmsHms,
    Berries,
}

impl From<PocketArg> for Pocket {
    fn from(pocket: PocketArg) -> Self {
        match pocket {
            PocketArg::Items => Pocket::Items,
            PocketArg::KeyItems => Pocket::KeyItems,
            PocketArg::Pokeballs => Pocket::PokeBalls,
            PocketArg::TmsHms => Pocket::TmsHms,
            PocketArg::Berries => Pocket::Berries,
        }
    }
}

#[derive(Debug, Args)]
pub struct Opts {
    #[command(flatten)]
    pub save: SaveArgs,
    #[arg(long)]
    pub money: Option<u32>,
    /// Item id to add to the bag
    #[arg(long, requires = "pocket")]
    pub give_item: Option<u16>,
    /// Item id to remove from the bag
    #[arg(long, requires = "pocket")]
    pub take_item: Option<u16>,
    #[arg(long, value_enum)]
    pub pocket: Option<PocketArg>,
    #[arg(long, default_value_t = 1)]
    pub quantity: u16,
    /// Badge to award, 1 through 8
    #[arg(long)]
    pub badge: Option<usize>,
    /// Rename a box, given as NUMBER:NAME
    #[arg(long)]
    pub box_name: Option<String>,
    #[arg(long)]
    pub unlock_national_dex: bool,
}

pub fn run(opts: Opts) -> anyhow::Result<()> {
    let mut loaded = load_save(&opts.save)?;
    let save = &mut loaded.save;

    if let Some(money) = opts.money {
        save.set_money(money)?;
        println!("Money set to {money}");
    }

    if let Some(pocket) = opts.pocket.map(Pocket::from) {
        if let Some(item_id) = opts.give_item {
            save.deposit_item(pocket, item_id, opts.quantity)?;
            println!("Added {} of item {item_id} to {}", opts.quantity, pocket.name());
        }
        if let Some(item_id) = opts.take_item {
            save.withdraw_item(pocket, item_id, opts.quantity)?;
            println!("Removed {} of item {item_id} from {}", opts.quantity, pocket.name());
        }
    }

    if let Some(badge) = opts.badge {
        if !(1..=8).contains(&badge) {
            anyhow::bail!("Badge must be between 1 and 8, got {badge}");
        }
        save.set_badge(badge - 1, true)?;
        println!("Awarded badge {badge}");
    }

    if let Some(box_name) = &opts.box_name {
        let (box_number, name) = box_name
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("Expected NUMBER:NAME, got {box_name}"))?;
        let box_number = box_number.parse::<u8>()?;
        save.set_box_name(box_number, name)?;
        println!("Box {box_number} renamed to {name}");
    }

    if opts.unlock_national_dex {
        if *save.is_national_dex_unlocked().value() {
            println!("National Dex already unlocked");
        } else {
            save.unlock_national_dex()?;
            println!("National Dex unlocked");
        }
    }

    if save.changed_sections().next().is_none() {
        println!("Nothing to change");
        return Ok(());
    }
    loaded.write_to_file(&opts.save.sav)?;

    Ok(())
}
