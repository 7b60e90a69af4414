use core::str::FromStr;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, Money};

/// Catalog product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl ProductId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|e| DomainError::invalid_id(format!("ProductId: {e}")))
    }
}

/// Top-level catalog department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Men,
    Women,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Men, Category::Women];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Men => "men",
            Category::Women => "women",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "men" => Ok(Category::Men),
            "women" => Ok(Category::Women),
            other => Err(DomainError::validation(format!("unknown category '{other}'"))),
        }
    }
}

/// A catalog product record.
///
/// Records are supplied by the catalog source and never mutated afterwards;
/// the `Catalog` owns them and hands out shared references only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Category,
    pub subcategory: String,
    /// List price.
    pub price: Money,
    /// Sale price; strictly below `price` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<Money>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub rating: f32,
    pub reviews: u32,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_best_seller: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub care_instructions: Option<String>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Product {
    /// Minimal record with a single size and color; handy for fixtures and
    /// programmatic catalogs.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        category: Category,
        subcategory: impl Into<String>,
        price: Money,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            subcategory: subcategory.into(),
            price,
            discount_price: None,
            sizes: vec!["One Size".to_string()],
            colors: vec!["Default".to_string()],
            rating: 0.0,
            reviews: 0,
            is_new: false,
            is_best_seller: false,
            image: None,
            description: None,
            detailed_description: None,
            material: None,
            dimensions: None,
            care_instructions: None,
        }
    }

    pub fn with_discount(mut self, discount_price: Money) -> Self {
        self.discount_price = Some(discount_price);
        self
    }

    pub fn with_flags(mut self, is_new: bool, is_best_seller: bool) -> Self {
        self.is_new = is_new;
        self.is_best_seller = is_best_seller;
        self
    }

    /// Price used for totals, sorting and price-bracket filtering.
    pub fn effective_price(&self) -> Money {
        self.discount_price.unwrap_or(self.price)
    }

    pub fn is_discounted(&self) -> bool {
        self.discount_price.is_some()
    }

    /// Whole-number "% OFF" for discounted products.
    pub fn discount_percent(&self) -> Option<u32> {
        let discount = self.discount_price?;
        let saved = self.price.checked_sub(discount)?;
        if self.price.is_zero() {
            return None;
        }
        let percent = (saved.cents() as f64 / self.price.cents() as f64 * 100.0).round();
        Some(percent as u32)
    }

    /// Featured products are either best sellers or new arrivals.
    pub fn is_featured(&self) -> bool {
        self.is_best_seller || self.is_new
    }

    /// Check the record invariants the rest of the core relies on.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation(format!("product {}: name cannot be empty", self.id)));
        }
        if self.price.is_zero() {
            return Err(DomainError::validation(format!("product {}: price must be positive", self.id)));
        }
        if let Some(discount) = self.discount_price {
            if discount.is_zero() || discount >= self.price {
                return Err(DomainError::validation(format!(
                    "product {}: discount price {discount} must be positive and below {}",
                    self.id, self.price
                )));
            }
        }
        if self.sizes.is_empty() {
            return Err(DomainError::validation(format!("product {}: sizes cannot be empty", self.id)));
        }
        if self.colors.is_empty() {
            return Err(DomainError::validation(format!("product {}: colors cannot be empty", self.id)));
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(DomainError::validation(format!(
                "product {}: rating {} is outside [0, 5]",
                self.id, self.rating
            )));
        }
        Ok(())
    }
}
