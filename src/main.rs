use anyhow::{Context, Result};
use clap::Parser;
use nutrients::document_store::{DocumentStore, InMemoryDocumentStore, PgDocumentStore};
use nutrients::generative_client::generator_from_config;
use nutrients::logging::init_logging;
use nutrients::nutrient_service::NutrientResolutionService;
use nutrients::nutrient_store::StandardNutrientStore;
use nutrients::nutrition_config::NutritionConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Resolve nutrient values for a food entry
#[derive(Debug, Parser)]
#[command(name = "nutrients", version, about)]
struct Args {
    /// User the nutrient cache belongs to
    #[arg(long, env = "NUTRIENTS_USER_ID")]
    user: String,

    /// Food name, used verbatim as the cache key
    #[arg(long)]
    food: String,

    /// Consumed quantity
    #[arg(long)]
    quantity: f64,

    /// Unit of the quantity: grams, milliliters, pieces or pack
    #[arg(long, default_value = "grams")]
    unit: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config = NutritionConfig::from_env()?;
    init_logging(config.log_format)?;

    info!("Starting nutrient resolution for '{}'", args.food);

    let documents: Arc<dyn DocumentStore> = match &config.database_url {
        Some(database_url) => {
            let store = PgDocumentStore::connect(database_url).await?;
            store.init_schema().await?;
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set, nutrient cache will not outlive this process");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    let generator = generator_from_config(config.generation.clone())?;
    let service = NutrientResolutionService::new(StandardNutrientStore::new(documents), generator);

    let resolution = service
        .resolve_unit_str(&args.user, &args.food, args.quantity, &args.unit)
        .await
        .context("Invalid nutrient request")?;

    println!("{}", serde_json::to_string_pretty(&resolution)?);

    Ok(())
}
