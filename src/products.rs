//! Products

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// A product that can be added to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product name, unique within a cart
    pub name: String,

    /// Product category (e.g. "grocery", "fashion")
    pub category: String,

    /// Unit price
    pub price: Money<'a, Currency>,
}

impl<'a> Product<'a> {
    /// Create a new product.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price: Money<'a, Currency>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
        }
    }
}
