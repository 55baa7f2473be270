pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MenuError {
    /// A menu record was missing a name or price, or violated catalog invariants
    #[error("Invalid menu data: {0}")]
    InvalidMenuData(String),

    /// The remote menu could not be fetched or parsed
    #[error("Menu unavailable: {0}")]
    MenuUnavailable(String),

    /// No catalog entry matched the query
    #[error("Item not found on the menu: {0}")]
    ItemNotFound(String),
}

/// Drink/side sizes understood by the ordering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSize {
    Small,
    Medium,
    Large,
}

impl ItemSize {
    /// Parses a size from free text. Unknown strings return `None` so the
    /// caller can surface an `InvalidSize` clarification.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "small" | "sm" => Some(ItemSize::Small),
            "medium" | "med" => Some(ItemSize::Medium),
            "large" | "lg" => Some(ItemSize::Large),
            _ => None,
        }
    }
}

impl fmt::Display for ItemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemSize::Small => write!(f, "small"),
            ItemSize::Medium => write!(f, "medium"),
            ItemSize::Large => write!(f, "large"),
        }
    }
}

/// A size variant and its price delta in cents over the item's base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeOption {
    pub size: ItemSize,
    #[serde(default)]
    pub delta: u32,
}

/// A purchasable catalog entry. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Base price in cents
    pub price: u32,
    /// Empty for items sold in a single size
    pub sizes: Vec<SizeOption>,
}

impl MenuItem {
    pub fn has_sizes(&self) -> bool {
        !self.sizes.is_empty()
    }

    pub fn size_option(&self, size: ItemSize) -> Option<&SizeOption> {
        self.sizes.iter().find(|opt| opt.size == size)
    }

    /// Size applied when the customer names none: medium if offered,
    /// otherwise the first listed size.
    pub fn default_size(&self) -> Option<ItemSize> {
        if self.size_option(ItemSize::Medium).is_some() {
            Some(ItemSize::Medium)
        } else {
            self.sizes.first().map(|opt| opt.size)
        }
    }

    /// Price in cents for the given size; the size must already have been
    /// validated against `sizes`.
    pub fn price_for(&self, size: Option<ItemSize>) -> u32 {
        let delta = size
            .and_then(|s| self.size_option(s))
            .map(|opt| opt.delta)
            .unwrap_or(0);
        self.price + delta
    }
}

/// Raw menu entry as produced by the loader or the bundled static menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMenuRecord {
    pub name: String,
    pub category: String,
    /// Price in cents
    pub price: u32,
    #[serde(default)]
    pub sizes: Vec<SizeOption>,
}

/// Result of a free-text menu lookup. Ambiguity is reported to the caller
/// instead of being silently resolved.
#[derive(Debug)]
pub enum Lookup<'a> {
    Match(&'a MenuItem),
    Ambiguous(Vec<&'a MenuItem>),
    NotFound,
}

#[derive(Debug, Clone)]
struct Category {
    name: String,
    items: Vec<MenuItem>,
}

/// Categorized menu, built once at startup from scraped or static records.
#[derive(Debug, Clone, Default)]
pub struct MenuCatalog {
    categories: Vec<Category>,
}

impl MenuCatalog {
    /// Builds the catalog, assigning ids and grouping records by category
    /// in order of first appearance. Records lacking a name or price, and
    /// duplicate item names, are rejected.
    pub fn from_records(records: Vec<RawMenuRecord>) -> Result<Self, MenuError> {
        let mut catalog = MenuCatalog::default();
        let mut seen = HashSet::new();
        let mut count = 0usize;

        for record in records {
            let name = record.name.trim();
            if name.is_empty() {
                return Err(MenuError::InvalidMenuData(
                    "menu entry with an empty name".to_string(),
                ));
            }
            if record.price == 0 {
                return Err(MenuError::InvalidMenuData(format!(
                    "menu entry '{}' has no price",
                    name
                )));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(MenuError::InvalidMenuData(format!(
                    "duplicate menu entry '{}'",
                    name
                )));
            }

            count += 1;
            let prefix: String = record.category.chars().take(3).collect();
            let item = MenuItem {
                id: format!("{}_{}", prefix.to_lowercase(), count),
                name: name.to_string(),
                category: record.category.clone(),
                price: record.price,
                sizes: record.sizes,
            };

            match catalog
                .categories
                .iter_mut()
                .find(|c| c.name == record.category)
            {
                Some(category) => category.items.push(item),
                None => catalog.categories.push(Category {
                    name: record.category,
                    items: vec![item],
                }),
            }
        }

        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    /// Finds the best match for a free-text query.
    ///
    /// An exact match on the normalized name wins outright. Otherwise
    /// candidates whose normalized name contains the query (or vice versa)
    /// are scored by shared words; a single top scorer is a match, several
    /// top scorers are reported as ambiguous.
    pub fn find(&self, query: &str) -> Lookup<'_> {
        let needle = normalize(query);
        if needle.is_empty() {
            return Lookup::NotFound;
        }

        let mut best_score = 0usize;
        let mut best: Vec<&MenuItem> = Vec::new();

        for item in self.items() {
            let candidate = normalize(&item.name);
            if candidate == needle {
                return Lookup::Match(item);
            }
            if !candidate.contains(&needle) && !needle.contains(&candidate) {
                continue;
            }

            let needle_words: HashSet<&str> = needle.split_whitespace().collect();
            let score = candidate
                .split_whitespace()
                .filter(|w| needle_words.contains(w))
                .count()
                .max(1);

            if score > best_score {
                best_score = score;
                best = vec![item];
            } else if score == best_score {
                best.push(item);
            }
        }

        match best.len() {
            0 => Lookup::NotFound,
            1 => Lookup::Match(best[0]),
            _ => Lookup::Ambiguous(best),
        }
    }

    /// `find` with ambiguity and absence collapsed into `ItemNotFound`,
    /// for callers that need a single item or an error.
    pub fn require(&self, query: &str) -> Result<&MenuItem, MenuError> {
        match self.find(query) {
            Lookup::Match(item) => Ok(item),
            Lookup::Ambiguous(candidates) => {
                let names: Vec<&str> = candidates.iter().map(|i| i.name.as_str()).collect();
                Err(MenuError::ItemNotFound(format!(
                    "'{}' is ambiguous ({})",
                    query,
                    names.join(", ")
                )))
            }
            Lookup::NotFound => Err(MenuError::ItemNotFound(query.to_string())),
        }
    }

    /// Lazy sequence of formatted menu lines, category by category.
    /// Restartable: each call yields a fresh iterator.
    pub fn describe(&self) -> impl Iterator<Item = String> + '_ {
        self.categories.iter().flat_map(|category| {
            std::iter::once(format!("{}:", category.name.to_uppercase())).chain(
                category.items.iter().map(|item| {
                    let mut line = format!("  {} - {}", item.name, format_price(item.price));
                    if item.has_sizes() {
                        let sizes: Vec<String> = item
                            .sizes
                            .iter()
                            .map(|opt| {
                                if opt.delta == 0 {
                                    opt.size.to_string()
                                } else {
                                    format!("{} +{}", opt.size, format_price(opt.delta))
                                }
                            })
                            .collect();
                        line.push_str(&format!(" ({})", sizes.join(", ")));
                    }
                    line
                }),
            )
        })
    }
}

/// Formats a price in cents as dollars, e.g. 599 -> "$5.99".
pub fn format_price(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Normalization applied to both queries and item names before matching:
/// lowercase, "and"/"with" abbreviations unified, "meal" suffix dropped.
fn normalize(s: &str) -> String {
    s.to_lowercase()
        .replace(" and ", " & ")
        .replace(" with ", " w/ ")
        .replace(" meal", "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, category: &str, price: u32, sizes: Vec<SizeOption>) -> RawMenuRecord {
        RawMenuRecord {
            name: name.to_string(),
            category: category.to_string(),
            price,
            sizes,
        }
    }

    fn drink_sizes() -> Vec<SizeOption> {
        vec![
            SizeOption {
                size: ItemSize::Small,
                delta: 0,
            },
            SizeOption {
                size: ItemSize::Medium,
                delta: 20,
            },
            SizeOption {
                size: ItemSize::Large,
                delta: 40,
            },
        ]
    }

    fn sample_catalog() -> MenuCatalog {
        MenuCatalog::from_records(vec![
            record("Big Mac", "Burgers", 599, vec![]),
            record("Quarter Pounder with Cheese", "Burgers", 649, vec![]),
            record("World Famous Fries", "Fries & Sides", 289, drink_sizes()),
            record("Coca-Cola", "Beverages", 199, drink_sizes()),
            record("Sprite", "Beverages", 199, drink_sizes()),
        ])
        .unwrap()
    }

    #[test]
    fn load_rejects_empty_name() {
        let err = MenuCatalog::from_records(vec![record("  ", "Burgers", 599, vec![])])
            .unwrap_err();
        assert!(matches!(err, MenuError::InvalidMenuData(_)));
    }

    #[test]
    fn load_rejects_zero_price() {
        let err =
            MenuCatalog::from_records(vec![record("Big Mac", "Burgers", 0, vec![])]).unwrap_err();
        assert!(matches!(err, MenuError::InvalidMenuData(_)));
    }

    #[test]
    fn load_rejects_duplicate_names() {
        let err = MenuCatalog::from_records(vec![
            record("Big Mac", "Burgers", 599, vec![]),
            record("big mac", "Featured Favorites", 629, vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, MenuError::InvalidMenuData(_)));
    }

    #[test]
    fn find_exact_match() {
        let catalog = sample_catalog();
        match catalog.find("big mac") {
            Lookup::Match(item) => assert_eq!(item.name, "Big Mac"),
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn find_normalizes_with_abbreviation() {
        let catalog = sample_catalog();
        match catalog.find("quarter pounder w/ cheese") {
            Lookup::Match(item) => assert_eq!(item.name, "Quarter Pounder with Cheese"),
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn find_substring_match() {
        let catalog = sample_catalog();
        match catalog.find("fries") {
            Lookup::Match(item) => assert_eq!(item.name, "World Famous Fries"),
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn require_turns_misses_into_errors() {
        let catalog = sample_catalog();
        assert!(catalog.require("big mac").is_ok());
        assert!(matches!(
            catalog.require("pizza").unwrap_err(),
            MenuError::ItemNotFound(_)
        ));

        let ambiguous = MenuCatalog::from_records(vec![
            record("1% Low Fat Milk Jug", "Beverages", 129, vec![]),
            record("Chocolate Low Fat Milk Jug", "Beverages", 149, vec![]),
        ])
        .unwrap();
        assert!(matches!(
            ambiguous.require("milk jug").unwrap_err(),
            MenuError::ItemNotFound(_)
        ));
    }

    #[test]
    fn find_reports_not_found() {
        let catalog = sample_catalog();
        assert!(matches!(catalog.find("pizza"), Lookup::NotFound));
        assert!(matches!(catalog.find("   "), Lookup::NotFound));
    }

    #[test]
    fn find_surfaces_ambiguity() {
        let catalog = MenuCatalog::from_records(vec![
            record("1% Low Fat Milk Jug", "Beverages", 129, vec![]),
            record("Chocolate Low Fat Milk Jug", "Beverages", 149, vec![]),
        ])
        .unwrap();

        match catalog.find("milk jug") {
            Lookup::Ambiguous(candidates) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn price_for_adds_size_delta() {
        let catalog = sample_catalog();
        let fries = match catalog.find("fries") {
            Lookup::Match(item) => item,
            other => panic!("expected match, got {:?}", other),
        };
        assert_eq!(fries.price_for(None), 289);
        assert_eq!(fries.price_for(Some(ItemSize::Large)), 329);
    }

    #[test]
    fn default_size_prefers_medium() {
        let catalog = sample_catalog();
        let coke = match catalog.find("coca-cola") {
            Lookup::Match(item) => item,
            other => panic!("expected match, got {:?}", other),
        };
        assert_eq!(coke.default_size(), Some(ItemSize::Medium));

        let big_mac = match catalog.find("big mac") {
            Lookup::Match(item) => item,
            other => panic!("expected match, got {:?}", other),
        };
        assert_eq!(big_mac.default_size(), None);
    }

    #[test]
    fn describe_is_restartable() {
        let catalog = sample_catalog();
        let first: Vec<String> = catalog.describe().collect();
        let second: Vec<String> = catalog.describe().collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "BURGERS:");
        assert!(first.iter().any(|l| l.contains("$5.99")));
    }

    #[test]
    fn format_price_pads_cents() {
        assert_eq!(format_price(599), "$5.99");
        assert_eq!(format_price(40), "$0.40");
        assert_eq!(format_price(1200), "$12.00");
    }
}
