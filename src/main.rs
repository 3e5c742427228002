//! # Cardpress CLI
//!
//! Command-line interface for rendering cards.
//!
//! ## Usage
//!
//! ```bash
//! # Front-page preview
//! cardpress preview card.json -o preview.png
//!
//! # Print-ready PDF with every populated page
//! cardpress print card.json -o print.pdf
//!
//! # Render and store under an order number (previews/, print_files/)
//! cardpress generate card.json --storage storage --pdf
//!
//! # Assets (fonts/, images) resolved from a directory, custom profiles
//! cardpress --assets public --config render.json print card.json -o print.pdf
//! ```
//!
//! Set `RUST_LOG=debug` for per-page and per-element logs.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cardpress::{
    CardDescription, CardRenderer, CardpressError, RenderConfig,
    assets::PublicDir,
    storage::{CardGenerator, FsArtifactStore},
};

/// Cardpress - card preview and print file renderer
#[derive(Parser, Debug)]
#[command(name = "cardpress")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory that fonts (fonts/{family}.ttf) and image references resolve against
    #[arg(long, global = true, default_value = "public")]
    assets: PathBuf,

    /// Render configuration (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the front page as a low-resolution raster
    Preview {
        /// Card description (JSON)
        card: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,
    },

    /// Render every populated page into a print document
    Print {
        /// Card description (JSON)
        card: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "print.pdf")]
        output: PathBuf,
    },

    /// Render and store artifacts under an order number
    Generate {
        /// Card description (JSON)
        card: PathBuf,

        /// Storage root (previews/ and print_files/ are created inside)
        #[arg(long, default_value = "storage")]
        storage: PathBuf,

        /// Also produce the print document
        #[arg(long)]
        pdf: bool,

        /// Order number (generated when omitted)
        #[arg(long)]
        order: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CardpressError> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RenderConfig::from_file(path)?,
        None => RenderConfig::default(),
    };
    let renderer = CardRenderer::new(Arc::new(PublicDir::new(&cli.assets)), config);

    match cli.command {
        Commands::Preview { card, output } => {
            let card = load_card(&card)?;
            let bytes = renderer.render_preview(&card)?;
            std::fs::write(&output, &bytes)?;
            println!("Saved preview to {} ({} bytes)", output.display(), bytes.len());
        }
        Commands::Print { card, output } => {
            let card = load_card(&card)?;
            let pages = card.populated_pages().len();
            let bytes = renderer.render_print(&card)?;
            std::fs::write(&output, &bytes)?;
            println!(
                "Saved {} page(s) to {} ({} bytes)",
                pages,
                output.display(),
                bytes.len()
            );
        }
        Commands::Generate {
            card,
            storage,
            pdf,
            order,
        } => {
            let card = load_card(&card)?;
            let generator = CardGenerator::new(renderer, FsArtifactStore::new(storage));
            let generated = generator.generate(&card, order.as_deref(), pdf)?;
            println!("{}", serde_json::to_string_pretty(&generated)?);
        }
    }

    Ok(())
}

/// Read and validate a card description file.
fn load_card(path: &Path) -> Result<CardDescription, CardpressError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        CardpressError::InvalidCard(format!("Failed to read {}: {}", path.display(), e))
    })?;
    CardDescription::from_json(&json)
}
