use clap::Parser;
use miette::Result;
use defont::cli::{Cli, Commands};
use defont::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new().quiet(cli.quiet);

    match cli.command {
        Commands::Build(args) => defont::cli::build::run(args, &printer)?,
        Commands::Validate(args) => defont::cli::validate::run(args, &printer)?,
        Commands::Data(args) => defont::cli::data::run(args, &printer)?,
        Commands::Palette(args) => defont::cli::palette::run(args, &printer)?,
        Commands::Completions(args) => defont::cli::completions::run(args)?,
    }

    Ok(())
}
