use clap::Parser;
use mapsnap::cli::{Cli, Commands};
use mapsnap::output::Printer;
use miette::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Export(args) => mapsnap::cli::export::run(args, &printer)?,
        Commands::List(args) => mapsnap::cli::list::run(args, &printer)?,
        Commands::Completions(args) => mapsnap::cli::completions::run(args)?,
    }

    Ok(())
}
