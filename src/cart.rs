//! Cart

use std::slice;

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::debug;

use crate::{lines::CartLine, products::Product};

/// Errors related to cart changes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A product's currency differs from the cart currency (product name, product currency, cart currency).
    #[error("Product {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),

    /// A line's quantity would no longer fit in a `u32`.
    #[error("Quantity of {0} is out of range")]
    QuantityOverflow(String),
}

/// What happened to a line after a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now holds this many units.
    Updated(u32),

    /// The quantity fell to zero or below, so the line was removed.
    Removed,

    /// No line has that name; nothing changed.
    Missing,
}

/// An ordered cart holding at most one line per product name.
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new, empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Add one unit of a product.
    ///
    /// Repeat adds bump the existing line; new products are appended, so the
    /// first add decides a line's position.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the product's currency differs from the cart's, or
    /// if the line's quantity would overflow.
    pub fn add_to_cart(&mut self, product: &Product<'a>) -> Result<u32, CartError> {
        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                product.name.clone(),
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if let Some(line) = self.line_mut(&product.name) {
            let quantity = line
                .quantity()
                .checked_add(1)
                .ok_or_else(|| CartError::QuantityOverflow(product.name.clone()))?;

            line.set_quantity(quantity);

            debug!(name = %product.name, quantity, "incremented cart line");

            return Ok(quantity);
        }

        self.lines.push(CartLine::new(product));

        debug!(name = %product.name, "added cart line");

        Ok(1)
    }

    /// Remove the named line, returning it if it was present.
    pub fn remove_from_cart(&mut self, name: &str) -> Option<CartLine<'a>> {
        let position = self.lines.iter().position(|line| line.name() == name)?;
        let removed = self.lines.remove(position);

        debug!(name, "removed cart line");

        Some(removed)
    }

    /// Add `delta` units to the named line, removing it if nothing is left.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityOverflow`] if the new quantity does not fit in a `u32`.
    pub fn change_quantity(&mut self, name: &str, delta: i64) -> Result<QuantityChange, CartError> {
        let Some(line) = self.line_mut(name) else {
            return Ok(QuantityChange::Missing);
        };

        let quantity = i64::from(line.quantity()).saturating_add(delta);

        if quantity <= 0 {
            self.remove_from_cart(name);

            return Ok(QuantityChange::Removed);
        }

        let quantity =
            u32::try_from(quantity).map_err(|_err| CartError::QuantityOverflow(name.to_string()))?;

        line.set_quantity(quantity);

        debug!(name, quantity, delta, "changed cart line quantity");

        Ok(QuantityChange::Updated(quantity))
    }

    /// Look up a line by product name.
    pub fn line(&self, name: &str) -> Option<&CartLine<'a>> {
        self.lines.iter().find(|line| line.name() == name)
    }

    fn line_mut(&mut self, name: &str) -> Option<&mut CartLine<'a>> {
        self.lines.iter_mut().find(|line| line.name() == name)
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, CartLine<'a>> {
        self.lines.iter()
    }

    /// Units across every line.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

impl<'c, 'a> IntoIterator for &'c Cart<'a> {
    type Item = &'c CartLine<'a>;
    type IntoIter = slice::Iter<'c, CartLine<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use super::*;

    fn apples<'a>() -> Product<'a> {
        Product::new("Apples", "grocery", Money::from_minor(120, iso::GBP))
    }

    fn scarf<'a>() -> Product<'a> {
        Product::new("Scarf", "fashion", Money::from_minor(1500, iso::GBP))
    }

    fn names(cart: &Cart<'_>) -> Vec<String> {
        cart.iter().map(|line| line.name().to_string()).collect()
    }

    #[test]
    fn new_with_currency() {
        let cart = Cart::new(iso::GBP);

        assert_eq!(cart.currency(), iso::GBP);
        assert!(cart.is_empty());
    }

    #[test]
    fn add_appends_new_lines_in_order() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_to_cart(&scarf())?;
        cart.add_to_cart(&apples())?;

        assert_eq!(names(&cart), ["Scarf", "Apples"]);

        Ok(())
    }

    #[test]
    fn repeat_add_increments_without_moving_the_line() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_to_cart(&apples())?;
        cart.add_to_cart(&scarf())?;
        let quantity = cart.add_to_cart(&apples())?;

        assert_eq!(quantity, 2);
        assert_eq!(cart.len(), 2);
        assert_eq!(names(&cart), ["Apples", "Scarf"]);
        assert_eq!(cart.total_quantity(), 3);

        Ok(())
    }

    #[test]
    fn add_currency_mismatch_errors() {
        let mut cart = Cart::new(iso::GBP);
        let product = Product::new("Socks", "fashion", Money::from_minor(500, iso::USD));

        let result = cart.add_to_cart(&product);

        match result {
            Err(CartError::CurrencyMismatch(name, product_currency, cart_currency)) => {
                assert_eq!(name, "Socks");
                assert_eq!(product_currency, iso::USD.iso_alpha_code);
                assert_eq!(cart_currency, iso::GBP.iso_alpha_code);
            }
            other => panic!("expected CurrencyMismatch error, got {other:?}"),
        }

        assert!(cart.is_empty());
    }

    #[test]
    fn iterating_a_borrowed_cart_visits_lines_in_order() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_to_cart(&scarf())?;
        cart.add_to_cart(&apples())?;

        let mut seen = Vec::new();

        for line in &cart {
            seen.push(line.name());
        }

        assert_eq!(seen, ["Scarf", "Apples"]);

        Ok(())
    }

    #[test]
    fn remove_deletes_the_named_line() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_to_cart(&apples())?;
        cart.add_to_cart(&scarf())?;

        let removed = cart.remove_from_cart("Apples");

        assert_eq!(removed.as_ref().map(CartLine::quantity), Some(1));
        assert_eq!(names(&cart), ["Scarf"]);

        Ok(())
    }

    #[test]
    fn remove_missing_line_is_a_no_op() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_to_cart(&apples())?;

        assert!(cart.remove_from_cart("Bananas").is_none());
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn change_quantity_updates_the_line() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_to_cart(&apples())?;

        assert_eq!(cart.change_quantity("Apples", 4)?, QuantityChange::Updated(5));
        assert_eq!(cart.change_quantity("Apples", -2)?, QuantityChange::Updated(3));
        assert_eq!(cart.line("Apples").map(CartLine::quantity), Some(3));

        Ok(())
    }

    #[test]
    fn change_quantity_to_zero_removes_the_line() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_to_cart(&apples())?;
        cart.change_quantity("Apples", 11)?;

        assert_eq!(cart.change_quantity("Apples", -12)?, QuantityChange::Removed);
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn change_quantity_below_zero_removes_the_line() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_to_cart(&apples())?;

        assert_eq!(cart.change_quantity("Apples", -5)?, QuantityChange::Removed);
        assert!(cart.line("Apples").is_none());

        Ok(())
    }

    #[test]
    fn change_quantity_of_missing_line_is_a_no_op() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        assert_eq!(cart.change_quantity("Apples", 1)?, QuantityChange::Missing);
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn change_quantity_overflow_errors() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_to_cart(&apples())?;

        let result = cart.change_quantity("Apples", i64::from(u32::MAX));

        assert_eq!(result, Err(CartError::QuantityOverflow("Apples".to_string())));
        assert_eq!(cart.line("Apples").map(CartLine::quantity), Some(1));

        Ok(())
    }
}
