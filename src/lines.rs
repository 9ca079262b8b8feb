//! Cart lines

use rusty_money::{Money, iso::Currency};

use crate::{pricing::PricingError, products::Product};

/// One distinct product in the cart.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine<'a> {
    name: String,
    category: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Creates a line holding a single unit of the product.
    pub fn new(product: &Product<'a>) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            unit_price: product.price,
            quantity: 1,
        }
    }

    /// Product name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Product category
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Price of a single unit, fixed when the line was created
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Number of units, always at least one
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        debug_assert!(quantity > 0, "cart lines must hold at least one unit");

        self.quantity = quantity;
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the subtotal does not fit in minor units.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        self.unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .map(|minor| Money::from_minor(minor, self.unit_price.currency()))
            .ok_or(PricingError::Overflow)
    }
}
