mod commands;
#[cfg(test)]
mod commands_tests;
mod env_utils;
mod logging;
mod report;

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_utils::ImageConfig;
use logging::Logger;

#[derive(Debug, Parser)]
#[command(name = "fat12ls")]
#[command(about = "Inspect FAT12 volume images read-only")]
struct Cli {
    /// Path to the raw volume image (boot sector at offset 0).
    image: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List root directory entries (default).
    Ls(LsArgs),
    /// Show boot sector fields and derived layout.
    Info,
    /// Show one root directory entry.
    Stat(NameArgs),
    /// Copy a file's contents to stdout or a path.
    Cat(CatArgs),
    /// Print the cluster chain of a file.
    Chain(NameArgs),
}

#[derive(Debug, Args)]
struct LsArgs {
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct NameArgs {
    /// Exact `NAME.EXT` as stored, case-sensitive.
    name: String,
}

#[derive(Debug, Args)]
struct CatArgs {
    name: String,
    #[arg(long)]
    output: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<()> {
    let mut logger = Logger::from_env()?;
    let config = ImageConfig::from_env()?;
    let mut volume = commands::open_volume(&mut logger, &cli.image, config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Commands::Ls(LsArgs { json: false })) {
        Commands::Ls(args) => commands::run_ls(&mut volume, args.json, &mut out),
        Commands::Info => commands::run_info(&mut volume, &mut out),
        Commands::Stat(args) => commands::run_stat(&mut volume, &args.name, &mut out),
        Commands::Cat(args) => commands::run_cat(
            &mut logger,
            &mut volume,
            &args.name,
            config.max_file_bytes,
            args.output,
            &mut out,
        ),
        Commands::Chain(args) => commands::run_chain(&mut volume, &args.name, &mut out),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
