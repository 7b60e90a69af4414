use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use storefront_catalog::{Category, CatalogQuery, PriceBracket, ProductId, SortOption};
use storefront_cli::{CartOp, StorefrontConfig, commands};

/// Storefront core: catalog queries and cart sessions
#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Catalog JSON file; overrides STOREFRONT_CATALOG_PATH (defaults to the bundled sample)
    #[arg(long, global = true)]
    catalog: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter and sort the catalog
    List(ListArgs),

    /// Show one product with its related products
    Product {
        id: ProductId,
    },

    /// Replay cart operations (add:<id>[x<qty>], remove:<id>, set:<id>=<qty>, clear)
    Cart {
        #[arg(required = true)]
        ops: Vec<CartOp>,
    },
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    category: Option<Category>,

    /// Subcategory within --category ("all" for every one)
    #[arg(long)]
    subcategory: Option<String>,

    /// Case-insensitive name search
    #[arg(long)]
    search: Option<String>,

    /// Multi-select categories, comma separated
    #[arg(long, value_delimiter = ',')]
    categories: Vec<Category>,

    /// Price brackets, comma separated (under-50, 50-100, over-100)
    #[arg(long = "price", value_delimiter = ',')]
    price_brackets: Vec<PriceBracket>,

    /// featured, price-low-high, price-high-low, newest, best-sellers
    #[arg(long, default_value = "featured")]
    sort: String,
}

impl ListArgs {
    fn into_query(self) -> CatalogQuery {
        CatalogQuery {
            category: self.category,
            subcategory: self.subcategory,
            search_text: self.search,
            categories: self.categories.into_iter().collect(),
            price_brackets: self.price_brackets.into_iter().collect(),
            sort: SortOption::parse_lenient(&self.sort),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, warnings) = StorefrontConfig::from_env();
    storefront_observability::init_with(config.log_format);
    for warning in &warnings {
        tracing::warn!("{warning}");
    }
    let config = config.with_catalog_override(cli.catalog);

    let catalog = commands::load_catalog(&config)?;

    let output = match cli.command {
        Commands::List(args) => commands::list(&catalog, &args.into_query()),
        Commands::Product { id } => commands::product(&catalog, id)?,
        Commands::Cart { ops } => commands::cart(&catalog, &config, &ops)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
