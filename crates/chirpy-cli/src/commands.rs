use anyhow::Context;
use colored::Colorize;

use chirpy_server::{ChirpyServer, ServerConfig};
use chirpy_store::{JsonFileStore, RecordStore};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Init(args) => cmd_init(args),
        Command::Chirps(args) => cmd_chirps(args),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_toml_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind}"))?;
    }
    if let Some(db) = args.db {
        config.database_path = db;
    }
    if let Some(root) = args.static_root {
        config.static_root = root;
    }
    let config = config.apply_env();

    let server = ChirpyServer::new(config)?;
    println!(
        "{} Chirpy on {} (db: {})",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold(),
        server.config().database_path.display()
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_init(args: DbArgs) -> anyhow::Result<()> {
    let existed = args.db.exists();
    let store = JsonFileStore::open(&args.db)?;
    let snapshot = store.snapshot()?;
    let verb = if existed { "Found" } else { "Created" };
    println!(
        "{} {} database at {}",
        "✓".green().bold(),
        verb,
        args.db.display().to_string().bold()
    );
    println!("  Posts: {}", snapshot.posts.len().to_string().yellow());
    println!("  Users: {}", snapshot.users.len().to_string().yellow());
    Ok(())
}

fn cmd_chirps(args: DbArgs) -> anyhow::Result<()> {
    if !args.db.exists() {
        anyhow::bail!("no database at {}", args.db.display());
    }
    let store = JsonFileStore::open(&args.db)?;
    let posts = store.list_posts()?;
    if posts.is_empty() {
        println!("No chirps.");
        return Ok(());
    }
    for post in posts {
        println!("{} {}", format!("#{}", post.id).yellow(), post.body);
    }
    Ok(())
}
