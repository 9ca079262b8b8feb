//! Discounts
//!
//! Rule-based discounts applied line by line before any coupon: a bulk
//! discount for large quantities and category discounts that only run during
//! certain hours of the day.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, Round, iso::Currency};
use thiserror::Error;

use crate::{
    hours::{Hour, HourWindow},
    lines::CartLine,
};

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A percentage discount for one category, active during a window of hours.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWindow {
    /// Category the discount applies to, matched exactly
    pub category: String,

    /// Hours during which the discount is active
    pub window: HourWindow,

    /// Discount as a fraction of the line subtotal
    pub percent: Percentage,
}

impl CategoryWindow {
    /// Create a new category window.
    pub fn new(category: impl Into<String>, window: HourWindow, percent: Percentage) -> Self {
        Self {
            category: category.into(),
            window,
            percent,
        }
    }

    /// Does this window discount the given category at the given hour?
    pub fn applies(&self, category: &str, hour: Hour) -> bool {
        self.category == category && self.window.contains(hour)
    }
}

/// Thresholds and windows for the rule-based discounts.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountRules {
    /// Minimum line quantity for the bulk discount
    pub bulk_min_quantity: u32,

    /// Bulk discount as a fraction of the line subtotal
    pub bulk_percent: Percentage,

    /// Minimum units across the whole cart for a `BULK` coupon
    pub bulk_coupon_min_items: u64,

    /// Time-of-day category discounts, checked in order
    pub category_windows: Vec<CategoryWindow>,
}

impl Default for DiscountRules {
    /// 10% off lines of ten or more, 5% off groceries from 08:00 to 20:59 and
    /// 15% off fashion from 18:00 to 05:59.
    fn default() -> Self {
        Self {
            bulk_min_quantity: 10,
            bulk_percent: percent_points(10),
            bulk_coupon_min_items: 10,
            category_windows: vec![
                CategoryWindow::new(
                    "grocery",
                    HourWindow::new(Hour::wrapping(8), Hour::wrapping(20)),
                    percent_points(5),
                ),
                CategoryWindow::new(
                    "fashion",
                    HourWindow::new(Hour::wrapping(18), Hour::wrapping(5)),
                    percent_points(15),
                ),
            ],
        }
    }
}

impl DiscountRules {
    /// Bulk discount owed on a line, zero below the quantity threshold.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage cannot be applied in minor units.
    pub fn bulk_discount<'a>(
        &self,
        line: &CartLine<'a>,
        subtotal: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        if line.quantity() < self.bulk_min_quantity {
            return Ok(Money::from_minor(0, subtotal.currency()));
        }

        discount_on(subtotal, &self.bulk_percent)
    }

    /// Time-of-day category discount owed on a line.
    ///
    /// Only the first window matching the line's category and the hour counts.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage cannot be applied in minor units.
    pub fn category_discount<'a>(
        &self,
        line: &CartLine<'a>,
        subtotal: &Money<'a, Currency>,
        hour: Hour,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        match self
            .category_windows
            .iter()
            .find(|window| window.applies(line.category(), hour))
        {
            Some(window) => discount_on(subtotal, &window.percent),
            None => Ok(Money::from_minor(0, subtotal.currency())),
        }
    }
}

/// A percentage from percent points, so `percent_points(15)` is 15%.
pub fn percent_points(points: impl Into<Decimal>) -> Percentage {
    Percentage::from(points.into() / Decimal::ONE_HUNDRED)
}

/// Calculate the discount amount on a price for a percentage.
///
/// The result is exact; it is not rounded to minor units.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result overflows.
pub fn discount_on<'a>(
    price: &Money<'a, Currency>,
    percent: &Percentage,
) -> Result<Money<'a, Currency>, DiscountError> {
    let discount = percent_of(percent, *price.amount())?;

    Ok(Money::from_decimal(discount, price.currency()))
}

/// Apply a percentage to an amount without rounding.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the product does not fit in a `Decimal`.
pub fn percent_of(percent: &Percentage, amount: Decimal) -> Result<Decimal, DiscountError> {
    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(amount)
        .ok_or(DiscountError::PercentConversion)
}

/// Round an amount to whole minor units, half away from zero.
pub fn round_to_minor<'a>(money: &Money<'a, Currency>) -> Money<'a, Currency> {
    money.round(money.currency().exponent, Round::HalfUp)
}
