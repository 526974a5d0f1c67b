use clap::{Parser, Subcommand};
use cli::WardrobeConfig;
use color_eyre::eyre::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};
use wardrobe::{Wardrobe, WardrobeCommand};
use wardrobe_common::Category;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Store root, overriding the configuration
    #[arg(long, global = true)]
    static_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate both renditions of an image and file them by category
    Process {
        /// Path to the garment photograph
        image: PathBuf,
    },
    /// Delete an image by its opaque url, with its catalog rows
    Delete {
        url: String,
    },
    /// Record an item in the catalog
    Add {
        url: String,
        category: String,
        color: String,
    },
    /// List catalogued items
    Items {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Pair an item with every item of another category
    Suggest {
        base_url: String,
        pair_category: String,
    },
    /// Save a top and bottom under a named outfit
    SaveOutfit {
        name: String,
        top: String,
        bottom: String,
    },
    /// List saved outfits
    Outfits,
    /// Delete a saved outfit
    DeleteOutfit {
        name: String,
    },
    /// Run a JSON list of commands in order
    Run {
        #[arg(short, long)]
        script: PathBuf,
    },
    /// Print the command and configuration JSON schemas
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => WardrobeConfig::from_file(path)?,
        None => WardrobeConfig::default(),
    };
    if let Some(static_dir) = cli.static_dir {
        config.static_dir = static_dir;
    }

    let command = match cli.command {
        Commands::Schema => {
            return print_json(&serde_json::json!({
                "commands": WardrobeCommand::schema(),
                "config": WardrobeConfig::schema(),
                "categories": Category::KNOWN,
            }));
        }
        Commands::Run { script } => {
            let wardrobe = config.build_wardrobe();
            return run_script(&wardrobe, &script).await;
        }
        Commands::Process { image } => WardrobeCommand::ProcessImage {
            path: image.to_string_lossy().into_owned(),
        },
        Commands::Delete { url } => WardrobeCommand::DeleteImage { image_url: url },
        Commands::Add { url, category, color } => WardrobeCommand::AddItem {
            image_url: url,
            category,
            color,
        },
        Commands::Items { category, color } => WardrobeCommand::ListItems { category, color },
        Commands::Suggest {
            base_url,
            pair_category,
        } => WardrobeCommand::SuggestOutfits {
            base_url,
            pair_category,
        },
        Commands::SaveOutfit { name, top, bottom } => WardrobeCommand::SaveOutfit {
            name,
            top_url: top,
            bottom_url: bottom,
        },
        Commands::Outfits => WardrobeCommand::ListOutfits,
        Commands::DeleteOutfit { name } => WardrobeCommand::DeleteOutfit { name },
    };

    let wardrobe = config.build_wardrobe();
    info!(root = %config.static_dir.display(), command = %command, "starting");

    match wardrobe.execute(command).await {
        Ok(output) => print_json(&output),
        Err(e) => {
            error!(kind = %e.kind(), status = e.kind().status_code(), "{}", e);
            print_json(&e.payload())?;
            Err(e.into())
        }
    }
}

async fn run_script(wardrobe: &Wardrobe, script: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(script).await?;
    let commands: Vec<WardrobeCommand> = serde_json::from_str(&content)?;
    info!("Running {} commands from {:?}", commands.len(), script);

    let mut outputs = Vec::with_capacity(commands.len());
    for (i, command) in commands.into_iter().enumerate() {
        let name = command.to_string();
        match wardrobe.execute(command).await {
            Ok(output) => outputs.push(output),
            Err(e) => {
                error!(index = i, command = %name, "{}", e);
                print_json(&outputs)?;
                return Err(e.into());
            }
        }
    }

    print_json(&outputs)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
