//! Receipt

use std::io;

use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{discounts::round_to_minor, hours::Hour, lines::CartLine, pricing::Totals};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One priced cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    name: String,
    category: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    subtotal: Money<'a, Currency>,
    bulk_discount: Money<'a, Currency>,
    category_discount: Money<'a, Currency>,
}

impl<'a> ReceiptLine<'a> {
    /// Create a receipt line from a cart line and its computed amounts.
    pub fn new(
        line: &CartLine<'a>,
        subtotal: Money<'a, Currency>,
        bulk_discount: Money<'a, Currency>,
        category_discount: Money<'a, Currency>,
    ) -> Self {
        Self {
            name: line.name().to_string(),
            category: line.category().to_string(),
            unit_price: *line.unit_price(),
            quantity: line.quantity(),
            subtotal,
            bulk_discount,
            category_discount,
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

    /// Price of one unit
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }

    /// Units on the line
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Bulk quantity discount on this line
    pub fn bulk_discount(&self) -> Money<'a, Currency> {
        self.bulk_discount
    }

    /// Time-of-day category discount on this line
    pub fn category_discount(&self) -> Money<'a, Currency> {
        self.category_discount
    }

    /// Rule discounts on this line combined.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the addition fails.
    pub fn discount(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.bulk_discount.add(self.category_discount)
    }
}

/// A fully priced cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt<'a> {
    /// Lines in cart order
    lines: SmallVec<[ReceiptLine<'a>; 8]>,

    /// Raw subtotals keyed by category
    category_totals: FxHashMap<String, Money<'a, Currency>>,

    /// Summary figures
    totals: Totals<'a>,

    /// Outcome of the coupon, if any text was entered
    coupon_message: Option<String>,

    /// Hour the time-of-day discounts were evaluated at
    hour: Hour,

    /// Currency used for all monetary values
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Create a new receipt with the given details.
    #[must_use]
    pub fn new(
        lines: SmallVec<[ReceiptLine<'a>; 8]>,
        category_totals: FxHashMap<String, Money<'a, Currency>>,
        totals: Totals<'a>,
        coupon_message: Option<String>,
        hour: Hour,
        currency: &'static Currency,
    ) -> Self {
        Self {
            lines,
            category_totals,
            totals,
            coupon_message,
            hour,
            currency,
        }
    }

    /// Priced lines in cart order.
    #[must_use]
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Summary figures.
    #[must_use]
    pub fn totals(&self) -> &Totals<'a> {
        &self.totals
    }

    /// Raw subtotal of a category, before any discount.
    #[must_use]
    pub fn category_total(&self, category: &str) -> Option<Money<'a, Currency>> {
        self.category_totals.get(category).copied()
    }

    /// Message describing the coupon outcome, `None` when no coupon was entered.
    #[must_use]
    pub fn coupon_message(&self) -> Option<&str> {
        self.coupon_message.as_deref()
    }

    /// Hour used for time-of-day discounts.
    #[must_use]
    pub fn hour(&self) -> Hour {
        self.hour
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if self.lines.is_empty() {
            writeln!(out, "\nYour cart is empty.").map_err(|_err| ReceiptError::IO)?;
        } else {
            write_receipt_table(&mut out, self)?;
        }

        write_receipt_summary(&mut out, self)
    }
}

/// Format an amount to two decimal places, without a currency symbol.
///
/// Fractions of a minor unit are rounded half away from zero.
pub fn format_amount(money: &Money<'_, Currency>) -> String {
    format!("{:.2}", round_to_minor(money).amount())
}

fn write_receipt_table(out: &mut impl io::Write, receipt: &Receipt<'_>) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record([
        "Item",
        "Category",
        "Unit Price",
        "Qty",
        "Subtotal",
        "Discount",
    ]);

    for line in &receipt.lines {
        let discount = round_to_minor(&line.discount()?);

        builder.push_record([
            line.name.clone(),
            line.category.clone(),
            format_amount(&line.unit_price),
            line.quantity.to_string(),
            format_amount(&line.subtotal),
            if discount.is_zero() {
                String::new()
            } else {
                format!("-{}", format_amount(&discount))
            },
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..6), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
) -> Result<(), ReceiptError> {
    let totals = receipt.totals();

    let rows = [
        ("Base Total:", format_amount(&totals.base_total)),
        ("Discount:", format_amount(&totals.total_discount)),
        ("Final Total:", format_amount(&totals.final_total)),
    ];

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    for (label, value) in &rows {
        writeln!(out, " {label:>label_width$}  {value:>value_width$}")
            .map_err(|_err| ReceiptError::IO)?;
    }

    if let Some(message) = receipt.coupon_message() {
        writeln!(out, "\n Coupon: {message}").map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}
