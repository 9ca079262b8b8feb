//! Cartwright
//!
//! A shopping cart pricing engine. Every change to the cart re-prices it from
//! scratch: bulk discounts on large lines, time-of-day discounts per category,
//! then at most one coupon on the discounted total.

pub mod cart;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod coupons;
pub mod discounts;
pub mod hours;
pub mod lines;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod session;
