//! Catalog
//!
//! The fixed set of products a shopper can add, loaded from YAML:
//!
//! ```yaml
//! products:
//!   apples:
//!     name: Apples
//!     category: grocery
//!     price: "1.20 GBP"
//! rules:
//!   bulk_min_quantity: 10
//!   category_windows:
//!     - { category: grocery, from: 8, to: 20, percent: "5%" }
//! ```
//!
//! `rules` is optional, as is every key inside it; missing values fall back to
//! [`DiscountRules::default`].

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};
use serde::Deserialize;
use slotmap::SlotMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    discounts::{CategoryWindow, DiscountRules},
    hours::{Hour, HourError, HourWindow},
    products::{Product, ProductKey},
};

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Invalid hour in a category window
    #[error("Invalid discount window: {0}")]
    InvalidHour(#[from] HourError),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Two products share a name, so they would share a cart line
    #[error("Duplicate product name: {0}")]
    DuplicateName(String),

    /// No products defined
    #[error("Catalog has no products")]
    Empty,
}

/// Wrapper for the catalog in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,

    /// Discount rule overrides
    #[serde(default)]
    pub rules: Option<RulesFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product category
    pub category: String,

    /// Product price (e.g., "2.99 GBP")
    pub price: String,
}

/// Discount rule overrides in YAML
#[derive(Debug, Default, Deserialize)]
pub struct RulesFixture {
    /// Minimum line quantity for the bulk discount
    pub bulk_min_quantity: Option<u32>,

    /// Bulk discount (e.g., "10%")
    pub bulk_percent: Option<String>,

    /// Minimum units in the cart for a `BULK` coupon
    pub bulk_coupon_min_items: Option<u64>,

    /// Time-of-day category discounts, replacing the defaults when present
    pub category_windows: Option<Vec<CategoryWindowFixture>>,
}

/// Category window in YAML
#[derive(Debug, Deserialize)]
pub struct CategoryWindowFixture {
    /// Category name
    pub category: String,

    /// First hour of the window
    pub from: u8,

    /// Last hour of the window, inclusive
    pub to: u8,

    /// Discount (e.g., "5%")
    pub percent: String,
}

impl<'a> TryFrom<ProductFixture> for Product<'a> {
    type Error = CatalogError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Product::new(
            fixture.name,
            fixture.category,
            Money::from_minor(minor_units, currency),
        ))
    }
}

impl TryFrom<CategoryWindowFixture> for CategoryWindow {
    type Error = CatalogError;

    fn try_from(fixture: CategoryWindowFixture) -> Result<Self, Self::Error> {
        let window = HourWindow::new(Hour::new(fixture.from)?, Hour::new(fixture.to)?);

        Ok(CategoryWindow::new(
            fixture.category,
            window,
            parse_percentage(&fixture.percent)?,
        ))
    }
}

impl TryFrom<RulesFixture> for DiscountRules {
    type Error = CatalogError;

    fn try_from(fixture: RulesFixture) -> Result<Self, Self::Error> {
        let defaults = DiscountRules::default();

        let bulk_percent = match fixture.bulk_percent {
            Some(percent) => parse_percentage(&percent)?,
            None => defaults.bulk_percent,
        };

        let category_windows = match fixture.category_windows {
            Some(windows) => windows
                .into_iter()
                .map(CategoryWindow::try_from)
                .collect::<Result<_, _>>()?,
            None => defaults.category_windows,
        };

        Ok(DiscountRules {
            bulk_min_quantity: fixture
                .bulk_min_quantity
                .unwrap_or(defaults.bulk_min_quantity),
            bulk_percent,
            bulk_coupon_min_items: fixture
                .bulk_coupon_min_items
                .unwrap_or(defaults.bulk_coupon_min_items),
            category_windows,
        })
    }
}

/// Products available to add to a cart, plus the discount rules that go with them.
#[derive(Debug)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    keys: FxHashMap<String, ProductKey>,
    rules: DiscountRules,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or isn't a valid catalog.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        debug!(path = %path.display(), "loading catalog");

        Self::from_yaml_str(&contents)
    }

    /// Parse a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed, a price or percentage is
    /// malformed, products use different currencies, or two products share a
    /// name.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

        let rules = match fixture.rules {
            Some(rules) => DiscountRules::try_from(rules)?,
            None => DiscountRules::default(),
        };

        let mut products = SlotMap::with_key();
        let mut keys = FxHashMap::default();
        let mut currency: Option<&'static Currency> = None;

        for (key, product_fixture) in fixture.products {
            let (_minor_units, product_currency) = parse_price(&product_fixture.price)?;

            // Validate currency consistency
            match currency {
                Some(existing) if existing != product_currency => {
                    return Err(CatalogError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        product_currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => currency = Some(product_currency),
            }

            let product: Product<'a> = product_fixture.try_into()?;

            if products
                .values()
                .any(|existing: &Product<'a>| existing.name == product.name)
            {
                return Err(CatalogError::DuplicateName(product.name));
            }

            keys.insert(key, products.insert(product));
        }

        let currency = currency.ok_or(CatalogError::Empty)?;

        debug!(
            products = products.len(),
            currency = currency.iso_alpha_code,
            "catalog loaded"
        );

        Ok(Self {
            products,
            keys,
            rules,
            currency,
        })
    }

    /// Look up a product by its catalog key.
    pub fn product(&self, key: &str) -> Option<&Product<'a>> {
        self.keys
            .get(key)
            .and_then(|product_key| self.products.get(*product_key))
    }

    /// Catalog keys and their products, sorted by key.
    pub fn products(&self) -> Vec<(&str, &Product<'a>)> {
        let mut products: Vec<_> = self
            .keys
            .iter()
            .filter_map(|(key, product_key)| {
                self.products
                    .get(*product_key)
                    .map(|product| (key.as_str(), product))
            })
            .collect();

        products.sort_unstable_by_key(|(key, _)| *key);

        products
    }

    /// Discount rules that apply to carts built from this catalog.
    pub fn rules(&self) -> &DiscountRules {
        &self.rules
    }

    /// Currency shared by every product.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn currency_from_code(code: &str) -> Result<&'static Currency, CatalogError> {
    match code {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        "INR" => Ok(INR),
        other => Err(CatalogError::UnknownCurrency(other.to_string())),
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a non-negative decimal, or if the
/// currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), CatalogError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(CatalogError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(CatalogError::InvalidPrice(s.to_string()));
    }

    let minor_units = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency_from_code(currency_code)?))
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or is negative.
pub fn parse_percentage(s: &str) -> Result<Percentage, CatalogError> {
    let trimmed = s.trim();

    let (number, divisor) = match trimmed.strip_suffix('%') {
        Some(points) => (points.trim(), Decimal::ONE_HUNDRED),
        None => (trimmed, Decimal::ONE),
    };

    let value = number
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPercentage(s.to_string()))?;

    if value.is_sign_negative() {
        return Err(CatalogError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(value / divisor))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use testresult::TestResult;

    use crate::discounts::percent_points;

    use super::*;

    const SHOP: &str = r#"
products:
  apples:
    name: Apples
    category: grocery
    price: "1.20 GBP"
  scarf:
    name: Wool Scarf
    category: fashion
    price: "15.00 GBP"
"#;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99GBP");

        assert!(matches!(result, Err(CatalogError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_negative_amounts() {
        let result = parse_price("-1.00 GBP");

        assert!(matches!(result, Err(CatalogError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(CatalogError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_accepts_supported_currencies() -> TestResult {
        let (usd_minor, usd) = parse_price("1.00 USD")?;
        let (eur_minor, eur) = parse_price("2.50 EUR")?;
        let (inr_minor, inr) = parse_price("499 INR")?;

        assert_eq!(usd_minor, 100);
        assert_eq!(usd, USD);
        assert_eq!(eur_minor, 250);
        assert_eq!(eur, EUR);
        assert_eq!(inr_minor, 49_900);
        assert_eq!(inr, INR);

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> TestResult {
        assert_eq!(parse_percentage("15%")?, percent_points(15));
        assert_eq!(parse_percentage(" 15 % ")?, percent_points(15));
        assert_eq!(parse_percentage("0.15")?, percent_points(15));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_garbage_and_negatives() {
        assert!(matches!(
            parse_percentage("invalid"),
            Err(CatalogError::InvalidPercentage(_))
        ));
        assert!(matches!(
            parse_percentage("-5%"),
            Err(CatalogError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn from_yaml_str_loads_products_by_key() -> TestResult {
        let catalog = Catalog::from_yaml_str(SHOP)?;

        let scarf = catalog.product("scarf").ok_or("missing scarf")?;

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.currency(), GBP);
        assert_eq!(scarf.name, "Wool Scarf");
        assert_eq!(scarf.category, "fashion");
        assert_eq!(scarf.price, Money::from_minor(1_500, GBP));
        assert!(catalog.product("socks").is_none());

        Ok(())
    }

    #[test]
    fn products_are_sorted_by_key() -> TestResult {
        let catalog = Catalog::from_yaml_str(SHOP)?;

        let keys: Vec<&str> = catalog.products().into_iter().map(|(key, _)| key).collect();

        assert_eq!(keys, ["apples", "scarf"]);

        Ok(())
    }

    #[test]
    fn missing_rules_use_defaults() -> TestResult {
        let catalog = Catalog::from_yaml_str(SHOP)?;

        assert_eq!(catalog.rules(), &DiscountRules::default());

        Ok(())
    }

    #[test]
    fn rules_can_be_overridden() -> TestResult {
        let yaml = format!(
            "{SHOP}{}",
            r#"
rules:
  bulk_min_quantity: 5
  bulk_percent: "20%"
  category_windows:
    - { category: toys, from: 9, to: 17, percent: "3%" }
"#
        );

        let catalog = Catalog::from_yaml_str(&yaml)?;
        let rules = catalog.rules();

        assert_eq!(rules.bulk_min_quantity, 5);
        assert_eq!(rules.bulk_percent, percent_points(20));
        assert_eq!(rules.bulk_coupon_min_items, 10);
        assert_eq!(
            rules.category_windows,
            [CategoryWindow::new(
                "toys",
                HourWindow::new(Hour::new(9)?, Hour::new(17)?),
                percent_points(3),
            )]
        );

        Ok(())
    }

    #[test]
    fn invalid_window_hours_error() {
        let yaml = format!(
            "{SHOP}{}",
            r#"
rules:
  category_windows:
    - { category: toys, from: 9, to: 24, percent: "3%" }
"#
        );

        let result = Catalog::from_yaml_str(&yaml);

        assert!(matches!(
            result,
            Err(CatalogError::InvalidHour(HourError::OutOfRange(24)))
        ));
    }

    #[test]
    fn mixed_currencies_error() {
        let yaml = r#"
products:
  apples:
    name: Apples
    category: grocery
    price: "1.20 GBP"
  socks:
    name: Socks
    category: fashion
    price: "5.00 USD"
"#;

        let result = Catalog::from_yaml_str(yaml);

        assert!(matches!(result, Err(CatalogError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn duplicate_names_error() {
        let yaml = r#"
products:
  apples:
    name: Apples
    category: grocery
    price: "1.20 GBP"
  more-apples:
    name: Apples
    category: grocery
    price: "1.50 GBP"
"#;

        let result = Catalog::from_yaml_str(yaml);

        assert!(matches!(result, Err(CatalogError::DuplicateName(name)) if name == "Apples"));
    }

    #[test]
    fn empty_catalog_errors() {
        let result = Catalog::from_yaml_str("products: {}\n");

        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[test]
    fn load_reads_from_disk() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;

        file.write_all(SHOP.as_bytes())?;

        let catalog = Catalog::load(file.path())?;

        assert_eq!(catalog.len(), 2);

        Ok(())
    }

    #[test]
    fn load_missing_file_errors() {
        let result = Catalog::load("/definitely/not/a/catalog.yml");

        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}
