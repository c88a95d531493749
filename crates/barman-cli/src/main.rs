//! Barman - browse drink recipes from the command line.
//!
//! Lists the remote drink catalog together with drinks you have added
//! yourself, shows recipes, and fetches drink images through the local
//! image cache.

mod render;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use barman_core::cache::ImageCache;
use barman_core::{
    Config, Drink, DrinkFetcher, DrinkRepository, LocalStore, RepositoryEvent, ReqwestTransport,
};

#[derive(Debug, Parser)]
#[command(name = "barman", version, about = "Browse and collect drink recipes")]
struct Cli {
    /// Skip the catalog download and use only drinks stored on this device
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every drink, catalog first, then your own
    List {
        /// Also download missing images in the background
        #[arg(long)]
        images: bool,
    },
    /// Show the recipe at a list position
    Show { index: usize },
    /// Save a new drink of your own
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        ingredients: String,
        #[arg(long)]
        directions: String,
        /// Image file name on the drinks server
        #[arg(long, default_value = "")]
        img: String,
    },
    /// Fetch the image for the drink at a list position
    Image {
        index: usize,
        /// Write the image here instead of printing its cache location
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_config() -> Config {
    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    config.apply_env(|key| std::env::var(key).ok());
    config
}

/// Wire the repository together from configuration.
async fn open_repository(config: &Config) -> Result<DrinkRepository> {
    let data_dir = config.data_dir()?;
    info!(?data_dir, "Data directory configured");

    let transport = Arc::new(
        ReqwestTransport::new(config.request_timeout()).context("Failed to create HTTP client")?,
    );
    let endpoints = config.endpoints();

    let fetcher = DrinkFetcher::new(transport.clone(), endpoints.clone());
    // Without the store there is nowhere to keep user drinks
    let store = LocalStore::open(config.store_path()?)
        .await
        .context("Failed to open drink storage")?;
    let images = ImageCache::new(config.images_dir()?, transport, endpoints);

    let repo = DrinkRepository::new(fetcher, store, images).await;
    if let Some(warning) = repo.load_warning() {
        eprintln!("Warning: your saved drinks could not be loaded: {}", warning);
    }
    Ok(repo)
}

/// Refresh the catalog unless offline. A failed refresh keeps whatever is
/// already available and is reported as a warning.
async fn refresh(repo: &mut DrinkRepository, offline: bool) {
    if offline {
        return;
    }
    if let Err(e) = repo.refresh_remote().await {
        eprintln!("Warning: could not update the drink catalog: {}", e);
    }
}

fn drink_at(repo: &DrinkRepository, index: usize) -> Result<Drink> {
    repo.get(index).with_context(|| {
        format!(
            "No drink at position {} (there are {} drinks)",
            index,
            repo.len()
        )
    })
}

async fn prefetch_images(repo: &mut DrinkRepository) {
    let pending: Vec<Drink> = repo.all().into_iter().filter(|d| d.has_image()).collect();
    for drink in &pending {
        repo.request_image_background(drink);
    }

    for _ in 0..pending.len() {
        if let Some(RepositoryEvent::ImageLoaded {
            image_id, result, ..
        }) = repo.next_event().await
        {
            match result {
                Ok(bytes) => println!("{}", render::image_status(&image_id, Ok(bytes.len()))),
                Err(e) => println!("{}", render::image_status(&image_id, Err(&e))),
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config();
    let mut repo = open_repository(&config).await?;

    match cli.command {
        Command::List { images } => {
            refresh(&mut repo, cli.offline).await;
            print!("{}", render::drink_list(&repo));
            if images && !cli.offline {
                prefetch_images(&mut repo).await;
            }
        }
        Command::Show { index } => {
            refresh(&mut repo, cli.offline).await;
            let drink = drink_at(&repo, index)?;
            let cached = repo.images().contains(&drink.img).await;
            print!("{}", render::drink_detail(&drink, cached));
        }
        Command::Add {
            name,
            ingredients,
            directions,
            img,
        } => {
            let drink = Drink::new(name, ingredients, directions, img);
            drink.validate_user_entry()?;
            repo.add_user_drink(drink.clone())
                .await
                .context("Failed to save drink")?;
            println!("Saved \"{}\" ({})", drink.name, drink.id());
        }
        Command::Image { index, out } => {
            refresh(&mut repo, cli.offline).await;
            let drink = drink_at(&repo, index)?;
            let bytes = repo
                .image_for(&drink)
                .await
                .with_context(|| format!("No image available for \"{}\"", drink.name))?;

            match out {
                Some(path) => {
                    tokio::fs::write(&path, &bytes)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {} to {}", render::size(bytes.len()), path.display());
                }
                None => {
                    let path = repo.images().path_for(&drink.img)?;
                    println!("{} ({})", path.display(), render::size(bytes.len()));
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing();
    info!("Barman starting");

    run(cli).await
}
