//! Session
//!
//! A shopping session owns the cart and the coupon text. Each [`CartAction`]
//! runs to completion and then the whole cart is priced again; nothing is
//! updated incrementally.

use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    cart::{Cart, CartError},
    catalog::Catalog,
    hours::Hour,
    pricing::{PricingError, price_cart},
    products::Product,
    receipt::Receipt,
};

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// The catalog has no product with this key.
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// Wrapped cart error
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped pricing error
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Something the shopper did.
///
/// Products are referred to by catalog key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit of a product.
    Add(String),

    /// Add one more unit to an existing line.
    Increment(String),

    /// Take one unit off a line, removing it at zero.
    Decrement(String),

    /// Drop a line entirely.
    Remove(String),

    /// The coupon text changed.
    SetCoupon(String),

    /// Re-evaluate the current coupon text.
    ApplyCoupon,
}

/// A shopper's cart and coupon text, priced against a catalog.
#[derive(Debug)]
pub struct CartSession<'a> {
    catalog: &'a Catalog<'a>,
    cart: Cart<'a>,
    coupon: String,
}

impl<'a> CartSession<'a> {
    /// Start an empty session.
    pub fn new(catalog: &'a Catalog<'a>) -> Self {
        Self {
            catalog,
            cart: Cart::new(catalog.currency()),
            coupon: String::new(),
        }
    }

    /// Start with some coupon text already entered.
    #[must_use]
    pub fn with_coupon(mut self, coupon: impl Into<String>) -> Self {
        self.coupon = coupon.into();
        self
    }

    /// Apply an action, then price the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the product key is unknown, the cart rejects
    /// the change, or pricing fails. A failed action leaves the cart unchanged.
    #[instrument(skip(self), err(level = "debug"))]
    pub fn dispatch(&mut self, action: CartAction, hour: Hour) -> Result<Receipt<'a>, SessionError> {
        match action {
            CartAction::Add(key) => {
                let product = self.product(&key)?;

                self.cart.add_to_cart(product)?;
            }
            CartAction::Increment(key) => {
                let name = self.product(&key)?.name.clone();

                self.cart.change_quantity(&name, 1)?;
            }
            CartAction::Decrement(key) => {
                let name = self.product(&key)?.name.clone();

                self.cart.change_quantity(&name, -1)?;
            }
            CartAction::Remove(key) => {
                let name = self.product(&key)?.name.clone();

                self.cart.remove_from_cart(&name);
            }
            CartAction::SetCoupon(coupon) => {
                debug!(coupon, "coupon text changed");

                self.coupon = coupon;
            }
            CartAction::ApplyCoupon => {}
        }

        Ok(self.render(hour)?)
    }

    /// Price the cart as it stands.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if an amount overflows.
    pub fn render(&self, hour: Hour) -> Result<Receipt<'a>, PricingError> {
        price_cart(&self.cart, &self.coupon, hour, self.catalog.rules())
    }

    /// The cart.
    pub fn cart(&self) -> &Cart<'a> {
        &self.cart
    }

    /// The catalog products come from.
    pub fn catalog(&self) -> &'a Catalog<'a> {
        self.catalog
    }

    /// Current coupon text, as entered.
    pub fn coupon(&self) -> &str {
        &self.coupon
    }

    fn product(&self, key: &str) -> Result<&'a Product<'a>, SessionError> {
        self.catalog
            .product(key)
            .ok_or_else(|| SessionError::UnknownProduct(key.to_string()))
    }
}
