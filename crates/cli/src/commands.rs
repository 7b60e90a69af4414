//! Command handlers. Each returns a JSON document for stdout.

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use serde_json::{Value, json};

use storefront_cart::{Cart, OrderSummary};
use storefront_catalog::{Catalog, CatalogQuery, ProductId, RELATED_PRODUCTS_LIMIT};

use crate::config::StorefrontConfig;
use crate::ops::CartOp;

const SAMPLE_CATALOG: &str = include_str!("../data/catalog.json");

/// Load the configured catalog, or the bundled sample.
pub fn load_catalog(config: &StorefrontConfig) -> Result<Catalog> {
    let catalog = match &config.catalog_path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open catalog {}", path.display()))?;
            Catalog::from_json_reader(BufReader::new(file))
                .with_context(|| format!("failed to load catalog {}", path.display()))?
        }
        None => Catalog::from_json_str(SAMPLE_CATALOG).context("bundled sample catalog is invalid")?,
    };

    let source = config
        .catalog_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "bundled".to_string());
    tracing::info!(products = catalog.len(), %source, "catalog ready");
    Ok(catalog)
}

pub fn list(catalog: &Catalog, spec: &CatalogQuery) -> Value {
    let result = catalog.query(spec);
    json!({
        "count": result.len(),
        "sort": spec.sort.as_str(),
        "products": result.as_slice(),
    })
}

pub fn product(catalog: &Catalog, id: ProductId) -> Result<Value> {
    let product = catalog
        .get(id)
        .with_context(|| format!("product {id} not found"))?;
    Ok(json!({
        "product": product,
        "discounted": product.is_discounted(),
        "discountPercent": product.discount_percent(),
        "related": catalog.related(id, RELATED_PRODUCTS_LIMIT),
    }))
}

/// Replay `ops` against a fresh session cart and report the final state.
pub fn cart(catalog: &Catalog, config: &StorefrontConfig, ops: &[CartOp]) -> Result<Value> {
    let mut cart = Cart::new();
    let span = tracing::info_span!("cart_session", cart_id = %cart.id_typed());
    let _guard = span.enter();

    for (step, op) in ops.iter().enumerate() {
        op.apply(&mut cart, catalog)
            .with_context(|| format!("cart operation #{} ({op:?}) failed", step + 1))?;
    }

    let summary = OrderSummary::for_cart(&cart, catalog, &config.pricing);
    Ok(json!({
        "cartId": cart.id_typed(),
        "lines": cart.line_views(catalog),
        "summary": summary,
    }))
}
