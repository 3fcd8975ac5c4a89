use clap::{Parser, Subcommand};
use gen3tools::{deposit, edit, extract, insert, inspect};

#[derive(Parser)]
#[command(about = "Inspect and edit Generation 3 Pokemon save files")]
struct Opts {
    #[command(subcommand)]
    tool: ToolOpts,
}

#[derive(Subcommand)]
enum ToolOpts {
    /// Move a Pokemon out of a box into a pk3 file
    Extract(extract::Opts),
    /// Put a pk3 file into a box slot
    Insert(insert::Opts),
    Inspect(inspect::Opts),
    /// Move a party Pokemon into a box
    Deposit(deposit::Opts),
    /// Change money, items, badges or box names
    Edit(edit::Opts),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opts = Opts::parse();
    match opts.tool {
        ToolOpts::Extract(opts) => extract::run(opts),
        ToolOpts::Insert(opts) => insert::run(opts),
        ToolOpts::Inspect(opts) => inspect::run(opts),
        ToolOpts::Deposit(opts) => deposit::run(opts),
        ToolOpts::Edit(opts) => edit::run(opts),
    }
}
