mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use pokedex_core::config::Config;

fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load_or_default(path).with_context(|| match path {
        Some(p) => format!("loading config {}", p.display()),
        None => "loading default config".to_string(),
    })
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Pokédex server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    pokedex_server::start(config).await?;
    Ok(())
}

fn seed(file: Option<&Path>, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;
    config.database.seed_on_start = false;

    let records = match file {
        Some(path) => pokedex_db::seed::load_seed_file(path)
            .with_context(|| format!("reading seed file {}", path.display()))?,
        None => pokedex_db::seed::builtin_records(),
    };

    let db = pokedex_server::open_store(&config)?;
    let conn = pokedex_db::pool::get_conn(&db)?;
    let report = pokedex_db::seed::seed_pokemon(&conn, &records)?;

    println!("Seeded {}", config.server.db_path.display());
    println!("  Pokémon created: {}", report.pokemon_created);
    println!("  Pokémon updated: {}", report.pokemon_updated);
    println!("  Types created:   {}", report.types_created);
    println!("  Links created:   {}", report.links_created);
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            let config = Config::load(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    println!("  Pool size: {}", config.database.pool_size);
    println!("  Seed on start: {}", config.database.seed_on_start);

    for warning in config.validate() {
        println!("  warning: {warning}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise pick defaults based on the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "pokedex=trace,pokedex_server=debug,pokedex_db=debug,tower_http=debug".to_string()
        } else {
            "pokedex=info,pokedex_server=info,pokedex_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Seed { file } => seed(file.as_deref(), cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("pokedex {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
