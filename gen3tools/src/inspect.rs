use crate::{load_save, SaveArgs};
use clap::Args;
use gen3save::{species, Decoded, Pocket, Pokemon, SaveFile};
use prettytable::{format, row, Table};
use serde_json::json;

#[derive(Debug, Args)]
pub struct Opts {
    #[command(flatten)]
    pub save: SaveArgs,
    /// One of: summary, trainer, party, box<N>, bag, pokedex
    #[arg(short, long, default_value = "summary")]
    pub location: String,
    /// Print JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

enum Location {
    Summary,
    Trainer,
    Party,
    Box(u8),
    Bag,
    Pokedex,
}

fn parse_location(location: &str) -> anyhow::Result<Location> {
    Ok(match location {
        "summary" => Location::Summary,
        "trainer" => Location::Trainer,
        "party" => Location::Party,
        "bag" => Location::Bag,
        "pokedex" => Location::Pokedex,
        _ if location.starts_with("box") => Location::Box(location[3..].parse::<u8>()?),
        _ => anyhow::bail!("Unknown location: {location}"),
    })
}

fn marker<T>(decoded: &Decoded<T>) -> &'static str {
    if decoded.is_defaulted() {
        " (default)"
    } else {
        ""
    }
}

fn species_label(pkmn: &Pokemon) -> String {
    match pkmn.national_dex_number() {
        Some(national) => format!("#{national:03}"),
        None => format!("?{}", pkmn.species),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table
}

pub fn run(opts: Opts) -> anyhow::Result<()> {
    let loaded = load_save(&opts.save)?;
    let save = &loaded.save;
    let location = parse_location(&opts.location)?;

    if opts.json {
        let value = match location {
            Location::Summary => json!({
                "game": save.game_code(),
                "slot": save.active_slot(),
                "save_index": save.save_index(),
                "degraded": save.is_degraded(),
                "sections": save.verify_sections(),
                "trainer": save.trainer_info().ok(),
                "badges": save.badges(),
                "money": save.money(),
                "national_dex": save.is_national_dex_unlocked(),
            }),
            Location::Trainer => json!(save.trainer_info()?),
            Location::Party => json!(save.party()),
            Location::Box(box_number) => {
                let slots = save.get_box(box_number)?;
                let levels = slots
                    .iter()
                    .map(|slot| slot.as_ref().and_then(Pokemon::level))
                    .collect::<Vec<_>>();
                json!({
                    "name": save.box_names().get(box_number as usize - 1),
                    "slots": slots,
                    "levels": levels,
                })
            }
            Location::Bag => json!({ "bag": save.bag(), "money": save.money() }),
            Location::Pokedex => json!({
                "flags": save.pokedex(),
                "national_dex": save.is_national_dex_unlocked(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match location {
        Location::Summary => print_summary(save)?,
        Location::Trainer => print_trainer(save)?,
        Location::Party => print_party(save),
        Location::Box(box_number) => print_box(save, box_number)?,
        Location::Bag => print_bag(save),
        Location::Pokedex => print_pokedex(save),
    }

    Ok(())
}

fn print_trainer(save: &SaveFile) -> anyhow::Result<()> {
    let info = save.trainer_info()?;
    let mut table = new_table();
    table.add_row(row![
        "NAME",
        format!("{}{}", info.player_name.value(), marker(&info.player_name))
    ]);
    table.add_row(row!["GENDER", format!("{:?}", info.player_gender.value())]);
    table.add_row(row!["TID", info.id.public_id]);
    table.add_row(row!["SID", info.id.secret_id]);
    table.add_row(row![
        "PLAYTIME",
        format!(
            "{}:{:02}:{:02}",
            info.time_played.hours, info.time_played.minutes, info.time_played.seconds
        )
    ]);
    table.printstd();
    Ok(())
}

fn print_summary(save: &SaveFile) -> anyhow::Result<()> {
    let report = save.verify_sections();
    println!(
        "{:?} save, slot {:?} (index {}){}",
        save.game_code(),
        save.active_slot(),
        save.save_index(),
        if save.is_degraded() { ", DEGRADED" } else { "" }
    );
    if !report.is_ok() {
        println!(
            "Missing sections: {:?}, bad checksums: {:?}",
            report.missing, report.bad_checksum
        );
    }
    print_trainer(save)?;

    let badges = save.badges();
    let money = save.money();
    let pokedex = save.pokedex();
    let national_dex = save.is_national_dex_unlocked();
    println!("Badges: {}{}", save.badge_count(), marker(&badges));
    println!("Money: {}{}", money.value(), marker(&money));
    println!(
        "Pokedex: {} seen, {} owned{}",
        pokedex.value().seen_count(),
        pokedex.value().owned_count(),
        marker(&pokedex)
    );
    println!(
        "National Dex: {}{}",
        if *national_dex.value() { "unlocked" } else { "locked" },
        marker(&national_dex)
    );
    Ok(())
}

fn print_party(save: &SaveFile) {
    let mut table = new_table();
    table.add_row(row!["SLOT", "SPECIES", "NICKNAME", "LEVEL", "NATURE", "OBEYS"]);
    for (idx, member) in save.party().value().iter().enumerate() {
        let (obeys, _) = save.check_obedience(member.level());
        table.add_row(row![
            idx + 1,
            species_label(&member.pokemon),
            member.pokemon.nickname,
            member.level(),
            member.pokemon.nature(),
            if obeys { "yes" } else { "no" }
        ]);
    }
    table.printstd();
}

fn print_box(save: &SaveFile, box_number: u8) -> anyhow::Result<()> {
    let slots = save.get_box(box_number)?;
    if let Some(name) = save.box_names().get(box_number as usize - 1) {
        println!("{}{}", name.value(), marker(name));
    }
    let mut table = new_table();
    table.add_row(row![
        "SLOT", "SPECIES", "NICKNAME", "LEVEL", "OT", "ABILITY", "SHINY", "OBEYS"
    ]);
    for (idx, pkmn) in slots.iter().enumerate() {
        let Some(pkmn) = pkmn else {
            continue;
        };
        let ability = pkmn
            .ability_id()
            .and_then(species::ability_name)
            .unwrap_or("?");
        let (level, obeys) = match pkmn.level() {
            Some(level) => (level.to_string(), save.check_obedience(level).0),
            None => ("?".to_string(), false),
        };
        table.add_row(row![
            idx + 1,
            species_label(pkmn),
            pkmn.nickname,
            level,
            pkmn.original_trainer_name,
            ability,
            if pkmn.is_shiny() { "*" } else { "" },
            if obeys { "yes" } else { "no" }
        ]);
    }
    table.printstd();
    Ok(())
}

fn print_bag(save: &SaveFile) {
    let bag = save.bag();
    let mut table = new_table();
    table.add_row(row!["POCKET", "ITEM", "QTY"]);
    for pocket in Pocket::ALL {
        for item in bag.value().pocket(pocket) {
            table.add_row(row![pocket.name(), item.item_id, item.quantity]);
        }
    }
    table.printstd();
    let money = save.money();
    println!("Money: {}{}", money.value(), marker(&money));
}

fn print_pokedex(save: &SaveFile) {
    let pokedex = save.pokedex();
    let owned = gen3save::pokedex::get_pokemon_from_bitfield(&pokedex.value().owned);
    println!(
        "Seen {}, owned {}{}",
        pokedex.value().seen_count(),
        owned.len(),
        marker(&pokedex)
    );
    let owned = owned
        .iter()
        .map(|national| format!("#{national:03}"))
        .collect::<Vec<_>>();
    for line in owned.chunks(10) {
        println!("{}", line.join(" "));
    }
}
