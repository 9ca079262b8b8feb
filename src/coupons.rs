//! Coupons
//!
//! A coupon is parsed fresh from the coupon text every time the cart is priced.
//! Two shapes are understood:
//!
//! - `BULK<percent>`: `percent`% off the total after rule discounts, if the cart
//!   holds enough units.
//! - `CAT-<CATEGORY>-<percent>`: `percent`% off the raw subtotal of one category.
//!
//! Problems never stop pricing; they become a zero discount and a message for
//! the shopper.

use std::fmt;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::discounts::{DiscountError, discount_on, percent_points};

/// Reasons a coupon gives no discount.
///
/// The display text is the message shown to the shopper.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponError {
    /// `BULK` was not followed by a whole number that fits in a `u64`.
    #[error("Invalid BULK coupon format.")]
    InvalidBulkFormat,

    /// The cart holds fewer units than a bulk coupon needs.
    #[error("Bulk coupon requires at least {0} total items.")]
    BulkThresholdNotMet(u64),

    /// `CAT-` was not followed by exactly a category and a percentage.
    #[error("Invalid category coupon format.")]
    InvalidCategoryFormat,

    /// The category isn't in the cart, or the percentage isn't a number.
    #[error("Invalid category or percentage in coupon.")]
    InvalidCategoryOrPercent,

    /// Not a coupon shape we recognise.
    #[error("Unknown coupon code.")]
    Unknown,

    /// The percentage is too large to apply to this cart.
    #[error("Coupon discount is out of range.")]
    OutOfRange,
}

/// A parsed coupon code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coupon {
    /// `BULK<percent>`
    Bulk {
        /// Whole percent points off the post-rule total
        percent: u64,
    },

    /// `CAT-<CATEGORY>-<percent>`
    Category {
        /// Category, lower-cased
        category: String,

        /// Percent points off the category subtotal, if it was numeric
        percent: Option<Decimal>,
    },
}

impl Coupon {
    /// Parse coupon text.
    ///
    /// Input is trimmed and upper-cased first. Blank input is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] describing why the text isn't a usable coupon.
    pub fn parse(input: &str) -> Result<Option<Self>, CouponError> {
        let code = input.trim().to_uppercase();

        if code.is_empty() {
            return Ok(None);
        }

        if let Some(percent) = code.strip_prefix("BULK") {
            let percent = parse_whole_percent(percent).ok_or(CouponError::InvalidBulkFormat)?;

            return Ok(Some(Coupon::Bulk { percent }));
        }

        if code.starts_with("CAT-") {
            let mut parts = code.split('-').skip(1);

            let (Some(category), Some(percent), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(CouponError::InvalidCategoryFormat);
            };

            return Ok(Some(Coupon::Category {
                category: category.to_lowercase(),
                percent: parse_decimal_percent(percent),
            }));
        }

        Err(CouponError::Unknown)
    }

    /// Work out the discount this coupon gives.
    ///
    /// `post_rule_total` is the cart total after rule discounts; `category_totals`
    /// holds raw subtotals per category; `total_quantity` counts units across
    /// the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponRejection`] if the coupon doesn't apply to this cart, or
    /// if the discount can't be represented.
    pub fn discount<'a, 'c>(
        &self,
        post_rule_total: &Money<'a, Currency>,
        category_totals: impl IntoIterator<Item = (&'c str, Money<'a, Currency>)>,
        total_quantity: u64,
        bulk_min_items: u64,
    ) -> Result<Money<'a, Currency>, CouponRejection> {
        match self {
            Coupon::Bulk { percent } => {
                if total_quantity < bulk_min_items {
                    return Err(CouponError::BulkThresholdNotMet(bulk_min_items).into());
                }

                coupon_discount(post_rule_total, *percent)
            }
            Coupon::Category { category, percent } => {
                let mut subtotal = Money::from_minor(0, post_rule_total.currency());

                for (name, amount) in category_totals {
                    if name.to_lowercase() == *category {
                        subtotal = subtotal.add(amount).map_err(DiscountError::from)?;
                    }
                }

                let Some(percent) = percent.filter(|_| subtotal.is_positive()) else {
                    return Err(CouponError::InvalidCategoryOrPercent.into());
                };

                coupon_discount(&subtotal, percent)
            }
        }
    }

    /// Message shown when the coupon applies.
    pub fn applied_message(&self) -> String {
        match self {
            Coupon::Bulk { percent } => format!("Bulk coupon applied: {percent}% off on total."),
            Coupon::Category { category, percent } => format!(
                "Category coupon applied: {}% off on {category}.",
                percent.unwrap_or_default().normalize()
            ),
        }
    }
}

impl fmt::Display for Coupon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coupon::Bulk { percent } => write!(f, "BULK{percent}"),
            Coupon::Category {
                category,
                percent: Some(percent),
            } => write!(
                f,
                "CAT-{}-{}",
                category.to_uppercase(),
                percent.normalize()
            ),
            Coupon::Category {
                category,
                percent: None,
            } => write!(f, "CAT-{}-?", category.to_uppercase()),
        }
    }
}

/// Why a parsed coupon did not produce a discount.
#[derive(Debug, Error)]
pub enum CouponRejection {
    /// The coupon doesn't apply; shown to the shopper.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// The discount couldn't be computed.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Whole, non-negative percent points: digits only.
fn parse_whole_percent(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    text.parse().ok()
}

/// Non-negative percent points, fractions allowed: `5`, `2.5`.
fn parse_decimal_percent(text: &str) -> Option<Decimal> {
    if !text.bytes().any(|byte| byte.is_ascii_digit())
        || !text.bytes().all(|byte| byte.is_ascii_digit() || byte == b'.')
    {
        return None;
    }

    text.parse().ok()
}

/// `percent` points of `amount`; too large a percentage is a rejection, not a failure.
fn coupon_discount<'a>(
    amount: &Money<'a, Currency>,
    percent: impl Into<Decimal>,
) -> Result<Money<'a, Currency>, CouponRejection> {
    discount_on(amount, &percent_points(percent)).map_err(|err| match err {
        DiscountError::PercentConversion => CouponError::OutOfRange.into(),
        err @ DiscountError::Money(_) => err.into(),
    })
}
