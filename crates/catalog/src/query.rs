//! Catalog query engine: filter + sort over a product sequence.
//!
//! Pure functions only. Both listing views (category page and all-products
//! page) run through [`query`], parameterized by a [`CatalogQuery`].

use core::str::FromStr;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, Money};

use crate::product::{Category, Product, ProductId};

/// Subcategory value meaning "no restriction".
pub const ALL_SUBCATEGORIES: &str = "all";

const FIFTY: Money = Money::from_cents(5_000);
const ONE_HUNDRED: Money = Money::from_cents(10_000);

/// Named effective-price range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceBracket {
    /// `price < 50`
    #[serde(rename = "under-50")]
    Under50,
    /// `50 <= price <= 100`
    #[serde(rename = "50-100")]
    From50To100,
    /// `price > 100`
    #[serde(rename = "over-100")]
    Over100,
}

impl PriceBracket {
    pub fn contains(self, price: Money) -> bool {
        match self {
            PriceBracket::Under50 => price < FIFTY,
            PriceBracket::From50To100 => (FIFTY..=ONE_HUNDRED).contains(&price),
            PriceBracket::Over100 => price > ONE_HUNDRED,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PriceBracket::Under50 => "under-50",
            PriceBracket::From50To100 => "50-100",
            PriceBracket::Over100 => "over-100",
        }
    }
}

impl FromStr for PriceBracket {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "under-50" => Ok(PriceBracket::Under50),
            "50-100" => Ok(PriceBracket::From50To100),
            "over-100" => Ok(PriceBracket::Over100),
            other => Err(DomainError::validation(format!("unknown price bracket '{other}'"))),
        }
    }
}

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// Best sellers and new arrivals first, then the rest.
    #[default]
    Featured,
    PriceLowHigh,
    PriceHighLow,
    /// New arrivals first.
    Newest,
    /// Best sellers first.
    BestSellers,
}

impl SortOption {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::Featured => "featured",
            SortOption::PriceLowHigh => "price-low-high",
            SortOption::PriceHighLow => "price-high-low",
            SortOption::Newest => "newest",
            SortOption::BestSellers => "best-sellers",
        }
    }

    /// Like `from_str`, but any unrecognized key falls back to `Featured`,
    /// which is what listing views do with a stale or hand-edited sort key.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for SortOption {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "featured" => Ok(SortOption::Featured),
            "price-low-high" => Ok(SortOption::PriceLowHigh),
            "price-high-low" => Ok(SortOption::PriceHighLow),
            "newest" => Ok(SortOption::Newest),
            "best-sellers" => Ok(SortOption::BestSellers),
            other => Err(DomainError::validation(format!("unknown sort option '{other}'"))),
        }
    }
}

/// Filter + sort specification. Every dimension is optional and they combine
/// with AND; an empty set means "no restriction" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CatalogQuery {
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub search_text: Option<String>,
    pub categories: BTreeSet<Category>,
    pub price_brackets: BTreeSet<PriceBracket>,
    pub sort: SortOption,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories.extend(categories);
        self
    }

    pub fn price_brackets(mut self, brackets: impl IntoIterator<Item = PriceBracket>) -> Self {
        self.price_brackets.extend(brackets);
        self
    }

    pub fn sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Whether `product` passes every active filter dimension.
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_with(product, self.normalized_search().as_deref())
    }

    fn normalized_search(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn matches_with(&self, product: &Product, needle: Option<&str>) -> bool {
        if let Some(category) = self.category {
            if product.category != category {
                return false;
            }
        }

        if let Some(sub) = self.subcategory.as_deref() {
            if sub != ALL_SUBCATEGORIES && product.subcategory != sub {
                return false;
            }
        }

        if let Some(needle) = needle {
            if !product.name.to_lowercase().contains(needle) {
                return false;
            }
        }

        if !self.categories.is_empty() && !self.categories.contains(&product.category) {
            return false;
        }

        if !self.price_brackets.is_empty() {
            let price = product.effective_price();
            if !self.price_brackets.iter().any(|b| b.contains(price)) {
                return false;
            }
        }

        true
    }
}

/// Ordered, filtered view over a product sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<'a> {
    products: Vec<&'a Product>,
}

impl<'a> QueryResult<'a> {
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// "No products found" is a normal outcome, not an error.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Product> + '_ {
        self.products.iter().copied()
    }

    pub fn as_slice(&self) -> &[&'a Product] {
        &self.products
    }

    pub fn ids(&self) -> Vec<ProductId> {
        self.products.iter().map(|p| p.id).collect()
    }

}

impl<'a> IntoIterator for QueryResult<'a> {
    type Item = &'a Product;
    type IntoIter = std::vec::IntoIter<&'a Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.into_iter()
    }
}

/// Filter `products` (preserving source order) and then order the survivors.
pub fn query<'a>(products: &'a [Product], spec: &CatalogQuery) -> QueryResult<'a> {
    let needle = spec.normalized_search();
    let mut matched: Vec<&Product> = products
        .iter()
        .filter(|p| spec.matches_with(p, needle.as_deref()))
        .collect();

    sort_products(&mut matched, spec.sort);

    tracing::debug!(
        sort = spec.sort.as_str(),
        candidates = products.len(),
        matched = matched.len(),
        "catalog query executed"
    );

    QueryResult { products: matched }
}

/// Reorder in place. Every ordering is stable: ties keep their relative order.
pub fn sort_products(products: &mut Vec<&Product>, sort: SortOption) {
    match sort {
        SortOption::PriceLowHigh => products.sort_by_key(|p| p.effective_price()),
        SortOption::PriceHighLow => {
            products.sort_by(|a, b| b.effective_price().cmp(&a.effective_price()))
        }
        SortOption::Newest => stable_partition(products, |p| p.is_new),
        SortOption::BestSellers => stable_partition(products, |p| p.is_best_seller),
        SortOption::Featured => stable_partition(products, Product::is_featured),
    }
}

/// Move every element satisfying `pred` ahead of the others, keeping relative
/// order within both groups.
fn stable_partition<F>(products: &mut Vec<&Product>, pred: F)
where
    F: Fn(&Product) -> bool,
{
    let (mut head, tail): (Vec<&Product>, Vec<&Product>) =
        products.drain(..).partition(|p| pred(p));
    head.extend(tail);
    *products = head;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u32, name: &str, category: Category, sub: &str, cents: u64) -> Product {
        Product::new(ProductId::new(id), name, category, sub, Money::from_cents(cents))
    }

    fn flagged(id: u32, is_new: bool, is_best_seller: bool) -> Product {
        product(id, &format!("Item {id}"), Category::Men, "shirts", 1000)
            .with_flags(is_new, is_best_seller)
    }

    fn ids(result: &QueryResult<'_>) -> Vec<u32> {
        result.iter().map(|p| p.id.get()).collect()
    }

    fn sample() -> Vec<Product> {
        vec![
            product(1, "Blue Shirt", Category::Men, "shirts", 2999),
            product(2, "Slim Jeans", Category::Men, "pants", 7999)
                .with_discount(Money::from_cents(4500)),
            product(3, "Wool Coat", Category::Men, "outerwear", 18999),
            product(4, "Silk Blouse", Category::Women, "tops", 6500),
            product(5, "Summer Dress", Category::Women, "dresses", 10000),
            product(6, "Linen Shirt", Category::Women, "tops", 12000)
                .with_discount(Money::from_cents(9900)),
        ]
    }

    #[test]
    fn featured_is_a_single_partition_on_either_flag() {
        // A(new=false,best=true), B(new=true,best=false), C(none), D(both)
        let products = vec![
            flagged(1, false, true),
            flagged(2, true, false),
            flagged(3, false, false),
            flagged(4, true, true),
        ];
        let result = query(&products, &CatalogQuery::new());
        assert_eq!(ids(&result), vec![1, 2, 4, 3]);
    }

    #[test]
    fn newest_and_best_sellers_partition_on_their_own_flag() {
        let products = vec![
            flagged(1, false, true),
            flagged(2, true, false),
            flagged(3, false, false),
            flagged(4, true, true),
        ];
        let newest = query(&products, &CatalogQuery::new().sort(SortOption::Newest));
        assert_eq!(ids(&newest), vec![2, 4, 1, 3]);

        let best = query(&products, &CatalogQuery::new().sort(SortOption::BestSellers));
        assert_eq!(ids(&best), vec![1, 4, 2, 3]);
    }

    #[test]
    fn price_sorts_use_effective_price_and_are_stable() {
        let products = vec![
            product(1, "A", Category::Men, "x", 5000),
            product(2, "B", Category::Men, "x", 9000).with_discount(Money::from_cents(2000)),
            product(3, "C", Category::Men, "x", 5000),
            product(4, "D", Category::Men, "x", 7000),
        ];
        let low = query(&products, &CatalogQuery::new().sort(SortOption::PriceLowHigh));
        assert_eq!(ids(&low), vec![2, 1, 3, 4]);

        let high = query(&products, &CatalogQuery::new().sort(SortOption::PriceHighLow));
        assert_eq!(ids(&high), vec![4, 1, 3, 2]);
    }

    #[test]
    fn search_is_case_insensitive_substring_on_name() {
        let products = sample();
        let result = query(&products, &CatalogQuery::new().search("shirt"));
        assert_eq!(ids(&result), vec![1, 6]);

        let result = query(&products, &CatalogQuery::new().search("SILK"));
        assert_eq!(ids(&result), vec![4]);
    }

    #[test]
    fn empty_search_is_no_restriction() {
        let products = sample();
        assert_eq!(query(&products, &CatalogQuery::new().search("")).len(), 6);
    }

    #[test]
    fn search_text_is_matched_verbatim_including_whitespace() {
        let products = vec![
            product(1, "Blue Shirt", Category::Men, "shirts", 3000),
            product(2, "Shirt Dress", Category::Women, "dresses", 6000),
        ];
        let result = query(&products, &CatalogQuery::new().search("shirt "));
        assert_eq!(ids(&result), vec![2]);

        assert!(query(&products, &CatalogQuery::new().search("   ")).is_empty());
    }

    #[test]
    fn category_and_bracket_filters_are_a_conjunction() {
        let products = sample();
        let spec = CatalogQuery::new()
            .category(Category::Men)
            .price_brackets([PriceBracket::Under50]);
        let result = query(&products, &spec);
        assert_eq!(ids(&result), vec![1, 2]);
        for p in result.iter() {
            assert_eq!(p.category, Category::Men);
            assert!(p.effective_price() < Money::from_cents(5000));
        }
    }

    #[test]
    fn price_brackets_are_or_ed_and_inclusive_in_the_middle() {
        let products = sample();
        let spec = CatalogQuery::new().price_brackets([PriceBracket::From50To100]);
        // 4 = 65.00, 5 = 100.00 (inclusive), 6 = 99.00 discounted
        assert_eq!(ids(&query(&products, &spec)), vec![4, 5, 6]);

        let spec = CatalogQuery::new().price_brackets([PriceBracket::Under50, PriceBracket::Over100]);
        assert_eq!(ids(&query(&products, &spec)), vec![1, 2, 3]);
    }

    #[test]
    fn fifty_dollars_exactly_belongs_to_the_middle_bracket() {
        let products = vec![
            product(1, "List", Category::Men, "x", 5000),
            product(2, "Marked down", Category::Men, "x", 8000).with_discount(Money::from_cents(5000)),
            product(3, "Just under", Category::Men, "x", 4999),
        ];
        let under = CatalogQuery::new().price_brackets([PriceBracket::Under50]);
        assert_eq!(ids(&query(&products, &under)), vec![3]);

        let middle = CatalogQuery::new().price_brackets([PriceBracket::From50To100]);
        assert_eq!(ids(&query(&products, &middle)), vec![1, 2]);
    }

    #[test]
    fn subcategory_all_means_no_restriction() {
        let products = sample();
        let all = CatalogQuery::new().category(Category::Women).subcategory(ALL_SUBCATEGORIES);
        assert_eq!(ids(&query(&products, &all)), vec![4, 5, 6]);

        let tops = CatalogQuery::new().category(Category::Women).subcategory("tops");
        assert_eq!(ids(&query(&products, &tops)), vec![4, 6]);
    }

    #[test]
    fn multi_select_categories_with_empty_set_means_everything() {
        let products = sample();
        assert_eq!(query(&products, &CatalogQuery::new().categories([])).len(), 6);
        let women = CatalogQuery::new().categories([Category::Women]);
        assert_eq!(ids(&query(&products, &women)), vec![4, 5, 6]);
    }

    #[test]
    fn no_match_is_an_empty_result() {
        let products = sample();
        let result = query(&products, &CatalogQuery::new().search("tuxedo"));
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
    }

    #[test]
    fn empty_query_without_flags_returns_catalog_order() {
        let products = sample();
        let result = query(&products, &CatalogQuery::new());
        assert_eq!(ids(&result), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn query_does_not_mutate_input() {
        let products = sample();
        let before = products.clone();
        let _ = query(&products, &CatalogQuery::new().sort(SortOption::PriceHighLow));
        assert_eq!(products, before);
    }

    #[test]
    fn unknown_sort_key_falls_back_to_featured() {
        assert_eq!(SortOption::parse_lenient("popularity"), SortOption::Featured);
        assert_eq!(SortOption::parse_lenient("newest"), SortOption::Newest);
        assert!("popularity".parse::<SortOption>().is_err());
    }

    #[test]
    fn query_deserializes_from_kebab_case_parameters() {
        let json = r#"{
            "category": "men",
            "search-text": "shirt",
            "price-brackets": ["under-50", "over-100"],
            "sort": "price-high-low"
        }"#;
        let spec: CatalogQuery = serde_json::from_str(json).unwrap();
        assert_eq!(spec.category, Some(Category::Men));
        assert_eq!(spec.search_text.as_deref(), Some("shirt"));
        assert!(spec.price_brackets.contains(&PriceBracket::Over100));
        assert_eq!(spec.sort, SortOption::PriceHighLow);
        assert!(spec.categories.is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_product(id: u32) -> impl Strategy<Value = Product> {
            (
                prop_oneof![Just(Category::Men), Just(Category::Women)],
                prop_oneof![Just("shirts"), Just("pants"), Just("tops")],
                1u64..30_000,
                proptest::option::of(1u64..100),
                any::<bool>(),
                any::<bool>(),
            )
                .prop_map(move |(category, sub, cents, discount_pct, is_new, best)| {
                    let mut p = product(id, &format!("Item {id}"), category, sub, cents)
                        .with_flags(is_new, best);
                    if let Some(pct) = discount_pct {
                        let discounted = cents * pct / 100;
                        if discounted > 0 && discounted < cents {
                            p = p.with_discount(Money::from_cents(discounted));
                        }
                    }
                    p
                })
        }

        fn arb_catalog() -> impl Strategy<Value = Vec<Product>> {
            (0usize..40).prop_flat_map(|n| {
                (0..n as u32).map(arb_product).collect::<Vec<_>>()
            })
        }

        fn arb_sort() -> impl Strategy<Value = SortOption> {
            prop_oneof![
                Just(SortOption::Featured),
                Just(SortOption::PriceLowHigh),
                Just(SortOption::PriceHighLow),
                Just(SortOption::Newest),
                Just(SortOption::BestSellers),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: every result satisfies the men + under-50 conjunction.
            #[test]
            fn filter_conjunction_holds(catalog in arb_catalog(), sort in arb_sort()) {
                let spec = CatalogQuery::new()
                    .category(Category::Men)
                    .price_brackets([PriceBracket::Under50])
                    .sort(sort);
                let result = query(&catalog, &spec);
                for p in result.iter() {
                    prop_assert_eq!(p.category, Category::Men);
                    prop_assert!(p.effective_price() < Money::from_cents(5000));
                }
                let expected = catalog
                    .iter()
                    .filter(|p| p.category == Category::Men && p.effective_price() < Money::from_cents(5000))
                    .count();
                prop_assert_eq!(result.len(), expected);
            }

            /// Property: sorting is a permutation of the filtered set.
            #[test]
            fn sorting_is_a_permutation(catalog in arb_catalog(), sort in arb_sort()) {
                let result = query(&catalog, &CatalogQuery::new().sort(sort));
                let mut got = result.ids();
                got.sort();
                let mut expected: Vec<ProductId> = catalog.iter().map(|p| p.id).collect();
                expected.sort();
                prop_assert_eq!(got, expected);
            }

            /// Property: featured keeps catalog order inside both groups.
            #[test]
            fn featured_partition_is_stable(catalog in arb_catalog()) {
                let result = query(&catalog, &CatalogQuery::new());
                let expected: Vec<ProductId> = catalog
                    .iter()
                    .filter(|p| p.is_featured())
                    .chain(catalog.iter().filter(|p| !p.is_featured()))
                    .map(|p| p.id)
                    .collect();
                prop_assert_eq!(result.ids(), expected);
            }

            /// Property: ascending price sort is ordered and ties keep catalog order.
            #[test]
            fn price_sort_is_stable(catalog in arb_catalog()) {
                let result = query(&catalog, &CatalogQuery::new().sort(SortOption::PriceLowHigh));
                for pair in result.as_slice().windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    prop_assert!(a.effective_price() <= b.effective_price());
                    if a.effective_price() == b.effective_price() {
                        prop_assert!(a.id < b.id);
                    }
                }
            }
        }
    }
}
