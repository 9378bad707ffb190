use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use venue_seeder::config::DEFAULT_CSV_PATH;
use venue_seeder::{Config, SeedError, SeedOptions};

#[derive(Parser, Debug)]
#[command(name = "seed-venues")]
#[command(about = "Seed venues into Postgres (with PostGIS)", long_about = None)]
struct Args {
    /// CSV file path (columns: name,address,time_zone,lon,lat)
    #[arg(long, default_value = DEFAULT_CSV_PATH)]
    file: PathBuf,

    /// If a venue with same (name,address) exists, update its location/time_zone
    #[arg(long)]
    update_existing: bool,

    /// Validate and show operations without committing
    #[arg(long)]
    dry_run: bool,
}

impl From<Args> for SeedOptions {
    fn from(args: Args) -> Self {
        SeedOptions {
            file: args.file,
            update_existing: args.update_existing,
            dry_run: args.dry_run,
        }
    }
}

fn with_kind(err: SeedError) -> anyhow::Error {
    let kind = err.kind();
    anyhow::Error::new(err).context(kind)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = Args::parse();

    // Resolved before touching the input file
    let config = Config::from_env().map_err(with_kind)?;
    let options = SeedOptions::from(args);

    tracing::info!("Input file: {}", options.file.display());
    if options.dry_run {
        tracing::info!("Dry run: nothing will be committed");
    }

    let outcome = venue_seeder::importer::run(&config, &options)
        .await
        .map_err(with_kind)?;

    println!("{}", outcome);

    Ok(())
}
