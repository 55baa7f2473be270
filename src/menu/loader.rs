use crate::menu::{ItemSize, MenuError, RawMenuRecord, SizeOption};
use rand::Rng;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

const DEFAULT_MENU_URL: &str = "https://www.mcdonalds.com/us/en-us/full-menu.html";

/// Menu categories recognized on the remote page, with their base price in
/// cents. The page carries no prices, so each item gets the category base
/// plus a small spread, as the original kiosk did.
const CATEGORIES: &[(&str, u32)] = &[
    ("Featured Favorites", 599),
    ("Breakfast", 499),
    ("Burgers", 549),
    ("Chicken & Fish Sandwiches", 599),
    ("McNuggets", 499),
    ("Fries & Sides", 299),
    ("Happy Meal", 449),
    ("McCafé Coffees", 399),
    ("Sweets & Treats", 299),
    ("Beverages", 199),
];

/// Categories sold in small/medium/large.
const SIZED_CATEGORIES: &[&str] = &["Beverages", "McCafé Coffees", "Fries & Sides"];

fn category_sizes(category: &str) -> Vec<SizeOption> {
    if SIZED_CATEGORIES.contains(&category) {
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
    } else {
        Vec::new()
    }
}

/// Fetches and parses the remote menu page into raw menu records.
pub struct MenuLoader {
    url: String,
    client: reqwest::Client,
}

impl MenuLoader {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url: url.unwrap_or_else(|| DEFAULT_MENU_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    pub async fn fetch(&self) -> Result<Vec<RawMenuRecord>, MenuError> {
        debug!(url = %self.url, "fetching menu page");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| MenuError::MenuUnavailable(format!("fetch {}: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(MenuError::MenuUnavailable(format!(
                "{} returned {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MenuError::MenuUnavailable(format!("read menu page: {}", e)))?;

        let records = parse_menu_html(&body);
        if records.is_empty() {
            return Err(MenuError::MenuUnavailable(
                "no menu items found on the page".to_string(),
            ));
        }

        debug!(items = records.len(), "parsed remote menu");
        Ok(records)
    }
}

/// Extracts menu records from the page markup. Each known category is an
/// `<h2>` heading followed by a `<ul>` of item names.
pub fn parse_menu_html(html: &str) -> Vec<RawMenuRecord> {
    let document = Html::parse_document(html);
    let heading = Selector::parse("h2").expect("static selector");
    let list_item = Selector::parse("li").expect("static selector");

    let mut rng = rand::rng();
    let mut records = Vec::new();

    for (category, base_price) in CATEGORIES {
        let Some(section) = document
            .select(&heading)
            .find(|h| h.text().collect::<String>().trim() == *category)
        else {
            continue;
        };

        // First <ul> after the heading holds the category's items
        let Some(list) = section
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "ul")
        else {
            warn!(category, "heading without an item list");
            continue;
        };

        for li in list.select(&list_item) {
            let name = li.text().collect::<String>().trim().to_string();
            if name.is_empty() {
                continue;
            }
            records.push(RawMenuRecord {
                name,
                category: category.to_string(),
                price: base_price + rng.random_range(0..200),
                sizes: category_sizes(category),
            });
        }
    }

    records
}

/// Bundled fallback menu, used when the remote page cannot be reached.
pub fn static_menu() -> Result<Vec<RawMenuRecord>, MenuError> {
    serde_yml::from_str(include_str!("static_menu.yaml"))
        .map_err(|e| MenuError::InvalidMenuData(format!("bundled menu: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
          <h2>Burgers</h2>
          <ul>
            <li>Big Mac</li>
            <li>Quarter Pounder with Cheese</li>
            <li>  </li>
          </ul>
          <h2>Beverages</h2>
          <p>Ice cold.</p>
          <ul>
            <li>Coca-Cola</li>
          </ul>
          <h2>Seasonal Specials</h2>
          <ul><li>Ignored Item</li></ul>
        </body></html>
    "#;

    #[test]
    fn parses_known_categories() {
        let records = parse_menu_html(FIXTURE);

        let burgers: Vec<&RawMenuRecord> =
            records.iter().filter(|r| r.category == "Burgers").collect();
        assert_eq!(burgers.len(), 2);
        assert_eq!(burgers[0].name, "Big Mac");

        // unknown headings are skipped
        assert!(records.iter().all(|r| r.category != "Seasonal Specials"));
    }

    #[test]
    fn skips_list_separated_from_heading() {
        // the <ul> is found even with a <p> between heading and list
        let records = parse_menu_html(FIXTURE);
        let coke = records
            .iter()
            .find(|r| r.name == "Coca-Cola")
            .expect("beverage parsed");
        assert_eq!(coke.category, "Beverages");
        assert_eq!(coke.sizes.len(), 3);
    }

    #[test]
    fn prices_stay_within_category_spread() {
        let records = parse_menu_html(FIXTURE);
        for record in records.iter().filter(|r| r.category == "Burgers") {
            assert!((549..749).contains(&record.price));
        }
    }

    #[test]
    fn empty_page_yields_no_records() {
        assert!(parse_menu_html("<html><body></body></html>").is_empty());
    }

    #[test]
    fn static_menu_parses() {
        let records = static_menu().expect("bundled menu parses");
        assert!(!records.is_empty());
        assert!(records.iter().any(|r| r.name == "Big Mac"));
        let fries = records
            .iter()
            .find(|r| r.name == "World Famous Fries")
            .expect("fries present");
        assert!(!fries.sizes.is_empty());
    }

    #[test]
    fn static_menu_builds_a_catalog() {
        let catalog = crate::menu::MenuCatalog::from_records(static_menu().unwrap())
            .expect("bundled menu satisfies catalog invariants");
        assert!(!catalog.is_empty());
    }
}
