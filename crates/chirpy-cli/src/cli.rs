use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chirpy", about = "Chirpy: a tiny social posting service", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Create the database file if it does not exist
    Init(DbArgs),
    /// List stored chirps
    Chirps(DbArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<String>,
    #[arg(long)]
    pub db: Option<PathBuf>,
    #[arg(long)]
    pub static_root: Option<PathBuf>,
}

#[derive(Args)]
pub struct DbArgs {
    #[arg(long, default_value = "database.json")]
    pub db: PathBuf,
}
