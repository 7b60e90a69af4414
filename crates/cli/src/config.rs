//! Runtime configuration from environment variables.

use std::path::PathBuf;

use storefront_cart::{DEFAULT_TAX_RATE_BPS, PricingPolicy};
use storefront_core::Money;
use storefront_observability::LogFormat;

pub const CATALOG_PATH_VAR: &str = "STOREFRONT_CATALOG_PATH";
pub const TAX_RATE_VAR: &str = "STOREFRONT_TAX_RATE_BPS";
pub const SHIPPING_VAR: &str = "STOREFRONT_SHIPPING_CENTS";
pub const LOG_FORMAT_VAR: &str = "STOREFRONT_LOG_FORMAT";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// JSON catalog to load; `None` uses the bundled sample catalog.
    pub catalog_path: Option<PathBuf>,
    pub pricing: PricingPolicy,
    pub log_format: LogFormat,
}

impl StorefrontConfig {
    /// Read the process environment. Returns one message per rejected value
    /// so the caller can log them once tracing is initialized.
    pub fn from_env() -> (Self, Vec<String>) {
        Self::from_lookup_with_warnings(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Malformed values fall back to the
    /// default and produce one message each.
    pub fn from_lookup_with_warnings<F>(lookup: F) -> (Self, Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        let mut config = Self::default();

        config.catalog_path = lookup(CATALOG_PATH_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        if let Some(raw) = lookup(TAX_RATE_VAR) {
            match raw.trim().parse::<u32>() {
                Ok(bps) if bps <= 10_000 => config.pricing.tax_rate_bps = bps,
                _ => warnings.push(format!(
                    "{TAX_RATE_VAR}='{raw}' is not a rate in 0..=10000 bps; using {DEFAULT_TAX_RATE_BPS}"
                )),
            }
        }

        if let Some(raw) = lookup(SHIPPING_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(cents) => config.pricing.shipping = Money::from_cents(cents),
                Err(_) => warnings.push(format!(
                    "{SHIPPING_VAR}='{raw}' is not a whole number of cents; using free shipping"
                )),
            }
        }

        if let Some(raw) = lookup(LOG_FORMAT_VAR) {
            match raw.parse::<LogFormat>() {
                Ok(format) => config.log_format = format,
                Err(e) => warnings.push(format!("{LOG_FORMAT_VAR}: {e}; using json")),
            }
        }

        (config, warnings)
    }

    /// Apply a `--catalog` flag, which wins over the environment.
    pub fn with_catalog_override(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.catalog_path = path;
        }
        self
    }
}
