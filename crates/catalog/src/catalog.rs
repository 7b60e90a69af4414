use std::collections::HashMap;
use std::collections::HashSet;
use std::io::Read;

use storefront_core::{DomainError, DomainResult};

use crate::product::{Category, Product, ProductId};
use crate::query::{self, CatalogQuery, QueryResult};

/// How many products the detail page shows under "you may also like".
pub const RELATED_PRODUCTS_LIMIT: usize = 4;

/// How many products each home page rail shows.
pub const HOME_RAIL_LIMIT: usize = 4;

/// Read-only access to products by id.
///
/// The cart holds only product ids and resolves prices through this trait, so
/// it never owns product records.
pub trait ProductLookup {
    fn product(&self, id: ProductId) -> Option<&Product>;
}

impl ProductLookup for HashMap<ProductId, Product> {
    fn product(&self, id: ProductId) -> Option<&Product> {
        self.get(&id)
    }
}

impl<T: ProductLookup + ?Sized> ProductLookup for &T {
    fn product(&self, id: ProductId) -> Option<&Product> {
        (**self).product(id)
    }
}

/// Immutable, ordered product snapshot for the lifetime of a session.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog, validating every record and id uniqueness.
    pub fn new(products: Vec<Product>) -> DomainResult<Self> {
        let mut index = HashMap::with_capacity(products.len());
        for (pos, product) in products.iter().enumerate() {
            product.validate()?;
            if index.insert(product.id, pos).is_some() {
                return Err(DomainError::validation(format!(
                    "duplicate product id {}",
                    product.id
                )));
            }
        }

        tracing::debug!(products = products.len(), "catalog loaded");
        Ok(Self { products, index })
    }

    /// Parse a JSON array of product records.
    pub fn from_json_str(json: &str) -> DomainResult<Self> {
        let products: Vec<Product> = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("malformed catalog: {e}")))?;
        Self::new(products)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> DomainResult<Self> {
        let products: Vec<Product> = serde_json::from_reader(reader)
            .map_err(|e| DomainError::validation(format!("malformed catalog: {e}")))?;
        Self::new(products)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Product detail lookup. `None` renders as "product not found".
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.index.get(&id).map(|&pos| &self.products[pos])
    }

    pub fn query(&self, spec: &CatalogQuery) -> QueryResult<'_> {
        query::query(&self.products, spec)
    }

    /// Distinct subcategories of `category`, in first-seen catalog order.
    pub fn subcategories(&self, category: Category) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.products
            .iter()
            .filter(|p| p.category == category)
            .map(|p| p.subcategory.as_str())
            .filter(|sub| seen.insert(*sub))
            .collect()
    }

    /// Other products of the same category, in catalog order.
    ///
    /// Unknown ids have no related products.
    pub fn related(&self, id: ProductId, limit: usize) -> Vec<&Product> {
        let Some(product) = self.get(id) else {
            return Vec::new();
        };
        self.products
            .iter()
            .filter(|p| p.category == product.category && p.id != id)
            .take(limit)
            .collect()
    }

    pub fn best_sellers(&self, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.is_best_seller)
            .take(limit)
            .collect()
    }

    pub fn in_category(&self, category: Category, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category == category)
            .take(limit)
            .collect()
    }
}

impl ProductLookup for Catalog {
    fn product(&self, id: ProductId) -> Option<&Product> {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortOption;
    use storefront_core::Money;

    fn product(id: u32, category: Category, sub: &str) -> Product {
        Product::new(
            ProductId::new(id),
            format!("Item {id}"),
            category,
            sub,
            Money::from_cents(1000 * u64::from(id)),
        )
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            product(1, Category::Men, "shirts").with_flags(false, true),
            product(2, Category::Men, "pants"),
            product(3, Category::Women, "dresses").with_flags(true, true),
            product(4, Category::Men, "shirts"),
            product(5, Category::Men, "outerwear"),
            product(6, Category::Men, "shirts").with_flags(false, true),
            product(7, Category::Men, "pants"),
        ])
        .unwrap()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::new(vec![
            product(1, Category::Men, "shirts"),
            product(1, Category::Women, "tops"),
        ])
        .unwrap_err();
        assert_eq!(err, DomainError::validation("duplicate product id 1"));
    }

    #[test]
    fn invalid_records_are_rejected() {
        let bad = product(1, Category::Men, "shirts").with_discount(Money::from_cents(5000));
        assert!(matches!(Catalog::new(vec![bad]), Err(DomainError::Validation(_))));
    }

    #[test]
    fn get_finds_products_by_id() {
        let catalog = catalog();
        assert_eq!(catalog.get(ProductId::new(3)).map(|p| p.category), Some(Category::Women));
        assert!(catalog.get(ProductId::new(99)).is_none());
    }

    #[test]
    fn subcategories_are_distinct_in_first_seen_order() {
        let catalog = catalog();
        assert_eq!(catalog.subcategories(Category::Men), vec!["shirts", "pants", "outerwear"]);
        assert_eq!(catalog.subcategories(Category::Women), vec!["dresses"]);
    }

    #[test]
    fn related_excludes_self_and_other_categories() {
        let catalog = catalog();
        let related: Vec<u32> = catalog
            .related(ProductId::new(2), RELATED_PRODUCTS_LIMIT)
            .iter()
            .map(|p| p.id.get())
            .collect();
        assert_eq!(related, vec![1, 4, 5, 6]);
        assert!(catalog.related(ProductId::new(3), RELATED_PRODUCTS_LIMIT).is_empty());
        assert!(catalog.related(ProductId::new(42), RELATED_PRODUCTS_LIMIT).is_empty());
    }

    #[test]
    fn home_rails_take_the_first_matches() {
        let catalog = catalog();
        let best: Vec<u32> = catalog.best_sellers(2).iter().map(|p| p.id.get()).collect();
        assert_eq!(best, vec![1, 3]);
        assert_eq!(catalog.in_category(Category::Men, HOME_RAIL_LIMIT).len(), 4);
    }

    #[test]
    fn query_runs_over_the_snapshot() {
        let catalog = catalog();
        let result = catalog.query(&CatalogQuery::new().category(Category::Men).sort(SortOption::Featured));
        assert_eq!(result.ids().first(), Some(&ProductId::new(1)));
        assert_eq!(result.len(), 6);
    }

    #[test]
    fn loads_from_json() {
        let json = r#"[
            {"id": 1, "name": "Oxford Shirt", "category": "men", "subcategory": "shirts",
             "price": 59.99, "sizes": ["M"], "colors": ["White"], "rating": 4.2, "reviews": 3},
            {"id": 2, "name": "Wrap Skirt", "category": "women", "subcategory": "skirts",
             "price": 45.0, "discountPrice": 39.5, "sizes": ["S"], "colors": ["Red"],
             "rating": 3.9, "reviews": 8, "isBestSeller": true}
        ]"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get(ProductId::new(2)).map(Product::effective_price),
            Some(Money::from_cents(3950))
        );
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        assert!(matches!(Catalog::from_json_str("{"), Err(DomainError::Validation(_))));
        let unknown_category = r#"[{"id": 1, "name": "X", "category": "kids", "subcategory": "a",
            "price": 1.0, "sizes": ["S"], "colors": ["R"], "rating": 1.0, "reviews": 0}]"#;
        assert!(Catalog::from_json_str(unknown_category).is_err());
    }
}
