//! stylesnap - wardrobe catalog command-line client
//!
//! Captures a garment from an image file, lets the predicted attributes be
//! corrected, and manages the catalog through the StyleSnap service.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use stylesnap_client::services::{recommend, FileImageSource, DEFAULT_RECOMMENDATION_COUNT};
use stylesnap_client::{
    CaptureSource, CapturePipeline, GarmentRecord, HttpCatalogClient, Occasion, WardrobeSynchronizer,
};
use stylesnap_common::api::{AttributeField, GarmentAttributes};
use stylesnap_common::config::{self, ClientConfig};
use stylesnap_common::events::EventBus;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for stylesnap
#[derive(Parser, Debug)]
#[command(name = "stylesnap")]
#[command(about = "Catalog and manage your wardrobe with StyleSnap")]
#[command(version)]
struct Args {
    /// Catalog service base URL (overrides STYLESNAP_API_URL and the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Config file (default: <config dir>/stylesnap/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a garment photo, apply corrections, and save it to the catalog
    Add {
        /// Image file to upload
        path: PathBuf,

        /// Treat the image as picked from the photo library
        #[arg(long)]
        library: bool,

        /// Correct a predicted attribute, e.g. --set baseColour=Navy
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_correction)]
        corrections: Vec<(AttributeField, String)>,
    },

    /// List every garment in the catalog
    List,

    /// Delete a garment by catalog id
    Delete {
        id: String,
    },

    /// Ask for outfit suggestions
    Recommend {
        /// Casual, Semi-Formal, Formal or Athletic
        occasion: Occasion,

        /// Number of suggestions
        #[arg(short, long, default_value_t = DEFAULT_RECOMMENDATION_COUNT)]
        n: u32,
    },
}

fn parse_correction(raw: &str) -> Result<(AttributeField, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))?;
    Ok((field.parse()?, value.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging comes up before the config file is read so that load
    // warnings are visible; the configured level is applied afterwards.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let level_from_env = env_filter.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|| EnvFilter::new(config::log_directives(config::DEFAULT_LOG_LEVEL))),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let toml_config = config::load_or_default(args.config.as_deref());

    if !level_from_env {
        match EnvFilter::try_new(config::log_directives(&toml_config.logging.level)) {
            Ok(configured) => filter_handle
                .reload(configured)
                .context("Failed to apply configured log level")?,
            Err(e) => warn!(
                level = %toml_config.logging.level,
                error = %e,
                "Invalid logging.level in config; keeping {}",
                config::DEFAULT_LOG_LEVEL
            ),
        }
    }

    let config = ClientConfig::resolve(args.api_url.as_deref(), &toml_config)
        .context("Invalid client configuration")?;
    info!(api_url = %config.api_url, "Using catalog service");

    let api = HttpCatalogClient::from_config(&config).context("Failed to build HTTP client")?;
    let event_bus = EventBus::new(config.event_capacity);

    match args.command {
        Command::Add {
            path,
            library,
            corrections,
        } => add_garment(api, event_bus, path, library, corrections).await,
        Command::List => {
            let sync = WardrobeSynchronizer::new(api, event_bus);
            let count = sync.fetch_all().await.context("Failed to load wardrobe")?;
            if count == 0 {
                println!("Your wardrobe is empty.");
            }
            for record in sync.items().await {
                println!("{}", record.summary());
            }
            Ok(())
        }
        Command::Delete { id } => {
            let sync = WardrobeSynchronizer::new(api, event_bus);
            sync.fetch_all().await.context("Failed to load wardrobe")?;

            let Some(record) = find_record(sync.items().await, &id) else {
                bail!("No garment with id '{}' in the catalog", id);
            };
            sync.delete_item(&record)
                .await
                .with_context(|| format!("Failed to delete garment {}", id))?;
            println!("Deleted {} ({} remaining)", id, sync.len().await);
            Ok(())
        }
        Command::Recommend { occasion, n } => {
            let suggestions = recommend(&api, occasion, n)
                .await
                .context("Failed to get recommendations")?;
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
            Ok(())
        }
    }
}

async fn add_garment(
    api: HttpCatalogClient,
    event_bus: EventBus,
    path: PathBuf,
    library: bool,
    corrections: Vec<(AttributeField, String)>,
) -> Result<()> {
    let source = FileImageSource::new(&path)
        .with_context(|| format!("Cannot use {} as a garment photo", path.display()))?;
    let mut pipeline = CapturePipeline::new(api, source, event_bus);

    let capture_source = if library {
        CaptureSource::Library
    } else {
        CaptureSource::Camera
    };
    let draft = pipeline
        .acquire_image(capture_source)
        .await
        .context("Could not classify the garment")?;
    if let Some(predicted) = draft.predicted() {
        println!("Predicted:");
        print_attributes(predicted);
    }

    for (field, value) in corrections {
        pipeline
            .edit_field(field, value)
            .with_context(|| format!("Failed to set {}", field))?;
    }

    let committed = pipeline.commit().await.context("Failed to save the garment")?;
    println!("Saved as {}:", committed.id);
    print_attributes(&committed.attributes);
    Ok(())
}

fn find_record(items: Vec<GarmentRecord>, id: &str) -> Option<GarmentRecord> {
    items.into_iter().find(|record| record.id == id)
}

fn print_attributes(attributes: &GarmentAttributes) {
    for field in AttributeField::ALL {
        println!("  {:<12} {}", field.as_str(), attributes.get(field));
    }
}
