//! Pricing
//!
//! Prices a cart from scratch: line subtotals, rule discounts, then at most
//! one coupon. The result depends only on the arguments, so pricing the same
//! cart with the same coupon text at the same hour always gives the same
//! receipt.
//!
//! Discounts are carried exactly. Only the combined discount is rounded to
//! whole minor units, so the final total is always a payable amount.

use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::Cart,
    coupons::{Coupon, CouponRejection},
    discounts::{DiscountError, DiscountRules, round_to_minor},
    hours::Hour,
    receipt::{Receipt, ReceiptLine},
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error)]
pub enum PricingError {
    /// An amount no longer fits in minor units.
    #[error("amount overflowed while pricing the cart")]
    Overflow,

    /// Wrapped discount calculation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// The summary figures of a priced cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals<'a> {
    /// Sum of line subtotals before any discount
    pub base_total: Money<'a, Currency>,

    /// Bulk and category discounts across all lines, unrounded
    pub rule_discount: Money<'a, Currency>,

    /// Discount from the coupon, unrounded, zero if none applied
    pub coupon_discount: Money<'a, Currency>,

    /// Rule and coupon discounts together, rounded half away from zero to minor units
    pub total_discount: Money<'a, Currency>,

    /// Amount payable, never below zero
    pub final_total: Money<'a, Currency>,
}

/// Price the cart.
///
/// # Errors
///
/// Returns a [`PricingError`] if an amount overflows or a percentage can't be
/// applied. Coupon problems are not errors; they show up as the receipt's
/// coupon message.
pub fn price_cart<'a>(
    cart: &Cart<'a>,
    coupon_input: &str,
    hour: Hour,
    rules: &DiscountRules,
) -> Result<Receipt<'a>, PricingError> {
    let zero = Money::from_minor(0, cart.currency());

    let mut lines: SmallVec<[ReceiptLine<'a>; 8]> = SmallVec::with_capacity(cart.len());
    let mut category_totals: FxHashMap<String, Money<'a, Currency>> = FxHashMap::default();
    let mut base_total = zero;
    let mut rule_discount = zero;

    for line in cart {
        let subtotal = line.subtotal()?;
        let bulk_discount = rules.bulk_discount(line, &subtotal)?;
        let category_discount = rules.category_discount(line, &subtotal, hour)?;

        base_total = base_total.add(subtotal)?;
        rule_discount = rule_discount.add(bulk_discount)?.add(category_discount)?;

        let category_total = category_totals
            .entry(line.category().to_string())
            .or_insert(zero);

        *category_total = category_total.add(subtotal)?;

        lines.push(ReceiptLine::new(
            line,
            subtotal,
            bulk_discount,
            category_discount,
        ));
    }

    let post_rule_total = base_total.sub(rule_discount)?;

    let (coupon_discount, coupon_message) = apply_coupon(
        coupon_input,
        &post_rule_total,
        &category_totals,
        cart.total_quantity(),
        rules,
    )?;

    let total_discount = round_to_minor(&rule_discount.add(coupon_discount)?);
    let remaining = base_total.sub(total_discount)?;
    let final_total = if remaining.is_negative() {
        zero
    } else {
        remaining
    };

    debug!(
        %hour,
        lines = lines.len(),
        base_total = %base_total,
        total_discount = %total_discount,
        final_total = %final_total,
        "priced cart"
    );

    Ok(Receipt::new(
        lines,
        category_totals,
        Totals {
            base_total,
            rule_discount,
            coupon_discount,
            total_discount,
            final_total,
        },
        coupon_message,
        hour,
        cart.currency(),
    ))
}

/// Evaluate the coupon text, returning the discount and the shopper message.
fn apply_coupon<'a>(
    coupon_input: &str,
    post_rule_total: &Money<'a, Currency>,
    category_totals: &FxHashMap<String, Money<'a, Currency>>,
    total_quantity: u64,
    rules: &DiscountRules,
) -> Result<(Money<'a, Currency>, Option<String>), PricingError> {
    let zero = Money::from_minor(0, post_rule_total.currency());

    let coupon = match Coupon::parse(coupon_input) {
        Ok(Some(coupon)) => coupon,
        Ok(None) => return Ok((zero, None)),
        Err(err) => {
            debug!(input = coupon_input, %err, "coupon not recognised");

            return Ok((zero, Some(err.to_string())));
        }
    };

    let categories = category_totals
        .iter()
        .map(|(category, subtotal)| (category.as_str(), *subtotal));

    match coupon.discount(
        post_rule_total,
        categories,
        total_quantity,
        rules.bulk_coupon_min_items,
    ) {
        Ok(discount) => {
            debug!(%coupon, discount = %discount, "coupon applied");

            Ok((discount, Some(coupon.applied_message())))
        }
        Err(CouponRejection::Coupon(err)) => {
            debug!(%coupon, %err, "coupon rejected");

            Ok((zero, Some(err.to_string())))
        }
        Err(CouponRejection::Discount(err)) => Err(err.into()),
    }
}
