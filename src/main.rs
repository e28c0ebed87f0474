use clap::Parser;
use std::time;
use varrecode::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{merge_vcf, recode},
    utils::util::{handle_error_and_exit, Result},
};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    log::trace!("CLI options set: {:?}", cli);

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        &**FULL_VERSION,
        cli.command.name()
    );

    let start_timer = time::Instant::now();
    match cli.command {
        Command::Recode(args) => {
            log::trace!("Recode arguments: {:#?}", args);
            recode(args)?
        }
        Command::MergeVcf(args) => {
            log::trace!("Merge VCF arguments: {:#?}", args);
            merge_vcf(args)?
        }
    }
    log::info!("Total execution time: {:.2?}", start_timer.elapsed());
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
