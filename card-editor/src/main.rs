//! # cardsmith
//!
//! Command-line access to the template catalog, PNG export and the card
//! store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use card_core::{find_template, list_templates, CardDocument, Scene};
use card_editor::{
    write_image, AuthProvider, Card, CardId, CardStore, EditorConfig, HttpCardStore, TokenAuth,
};
use card_renderer::export::{
    export_filename, ExportConfig, ExportedImage, SceneExporter, THUMBNAIL_SIZE,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "cardsmith", version, about = "Greeting card templates, export and storage")]
struct Cli {
    /// Card store API root.
    #[arg(long, env = "CARD_STORE_URL", global = true)]
    store_url: Option<String>,

    /// Bearer token of the signed-in account.
    #[arg(long, env = "CARD_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the template catalog.
    Templates {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Rasterize a template or a card document to PNG.
    Export(ExportArgs),
    /// Work with cards in the card store.
    Cards(CardsCommand),
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Template id.
    #[arg(long, conflicts_with = "card", required_unless_present = "card")]
    template: Option<String>,

    /// Card document (`{"bgColor": ..., "objects": [...]}`).
    #[arg(long)]
    card: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output file or directory (defaults to a dated file name).
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Pixels per logical unit.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Render a small preview thumbnail instead.
    #[arg(long)]
    thumbnail: bool,
}

#[derive(Args, Debug)]
struct CardsCommand {
    #[command(subcommand)]
    command: CardsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CardsSubcommand {
    /// List cards, most recently updated first.
    List,
    /// Export a stored card to PNG.
    Export {
        /// Card id.
        id: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Delete a stored card.
    Delete {
        /// Card id.
        id: String,
    },
}

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,card_editor=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,card_editor=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = EditorConfig::from_env();
    if let Some(url) = cli.store_url {
        config.store_url = url;
    }

    match cli.command {
        Command::Templates { json } => print_templates(json)?,
        Command::Export(args) => {
            let scene = match (&args.template, &args.card) {
                (Some(id), _) => find_template(id)?.instantiate(),
                (None, Some(path)) => read_card_file(path)?,
                (None, None) => anyhow::bail!("pass --template or --card"),
            };
            export_scene(&scene, &args.output)?;
        }
        Command::Cards(cards) => {
            let auth: Arc<dyn AuthProvider> = Arc::new(match cli.token {
                Some(token) => TokenAuth::new(token),
                None => TokenAuth::anonymous(),
            });
            if !auth.is_session_active() {
                anyhow::bail!("not signed in; pass --token or set CARD_TOKEN");
            }
            let store = HttpCardStore::new(&config.store_url, auth)?;
            run_cards(&store, cards.command).await?;
        }
    }

    Ok(())
}

fn print_templates(json: bool) -> anyhow::Result<()> {
    let templates = list_templates();
    if json {
        println!("{}", serde_json::to_string_pretty(templates)?);
        return Ok(());
    }
    for template in templates {
        println!(
            "{:<12} {:<22} {:>2} objects  {}",
            template.id,
            template.name,
            template.objects.len(),
            template.description
        );
    }
    Ok(())
}

fn read_card_file(path: &Path) -> anyhow::Result<Scene> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(CardDocument::from_json(&json)?.into_scene())
}

fn export_scene(scene: &Scene, output: &OutputArgs) -> anyhow::Result<()> {
    let exporter = SceneExporter::new(ExportConfig {
        device_pixel_ratio: output.scale,
        ..ExportConfig::default()
    });
    let today = chrono::Local::now().date_naive();

    let image = if output.thumbnail {
        let (width, height) = THUMBNAIL_SIZE;
        ExportedImage {
            filename: export_filename(today).replace(".png", "_thumb.png"),
            bytes: exporter.thumbnail_png(scene)?,
            width,
            height,
        }
    } else {
        exporter.export(scene, None, today)?
    };

    let path = write_image(&image, output.out.as_deref())?;
    println!("{} ({}x{})", path.display(), image.width, image.height);
    Ok(())
}

async fn run_cards(store: &HttpCardStore, command: CardsSubcommand) -> anyhow::Result<()> {
    match command {
        CardsSubcommand::List => {
            let cards = store.list().await?;
            if cards.is_empty() {
                println!("No saved cards yet. Save one from the editor to see it here.");
            }
            for card in &cards {
                print_card(card);
            }
        }
        CardsSubcommand::Export { id, output } => {
            let card = store.get(&CardId::from(id)).await?;
            let scene = card.scene().context("card data is not a card document")?;
            export_scene(&scene, &output)?;
        }
        CardsSubcommand::Delete { id } => {
            let id = CardId::from(id);
            if store.delete(&id).await? {
                println!("Deleted card {id}");
            } else {
                anyhow::bail!("store refused to delete card {id}");
            }
        }
    }
    Ok(())
}

fn print_card(card: &Card) {
    let objects = card.document().map_or(0, |d| d.objects.len());
    println!(
        "{:<8} {:<28} {:>3} objects  updated {}",
        card.id,
        card.title,
        objects,
        card.updated_at.format("%Y-%m-%d %H:%M")
    );
}
