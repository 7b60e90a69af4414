//! Product catalog and catalog query engine.
//!
//! The catalog is an immutable snapshot supplied from outside (a JSON file or
//! an in-memory list); everything here is deterministic and side-effect free.

pub mod catalog;
pub mod product;
pub mod query;

pub use catalog::{Catalog, HOME_RAIL_LIMIT, ProductLookup, RELATED_PRODUCTS_LIMIT};
pub use product::{Category, Product, ProductId};
pub use query::{ALL_SUBCATEGORIES, CatalogQuery, PriceBracket, QueryResult, SortOption, query};
