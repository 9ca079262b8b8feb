//! Cartwright prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, QuantityChange},
    catalog::{Catalog, CatalogError},
    coupons::{Coupon, CouponError, CouponRejection},
    discounts::{CategoryWindow, DiscountError, DiscountRules},
    hours::{Clock, Hour, HourError, HourWindow},
    lines::CartLine,
    pricing::{PricingError, Totals, price_cart},
    products::{Product, ProductKey},
    receipt::{Receipt, ReceiptError, ReceiptLine},
    session::{CartAction, CartSession, SessionError},
};
