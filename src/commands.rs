//! Commands
//!
//! The interactive front end: one command per line, each followed by the
//! re-priced receipt.

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    hours::{Clock, HourError},
    receipt::{ReceiptError, format_amount},
    session::{CartAction, CartSession, SessionError},
};

/// Errors that end the command loop.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Reading input or writing output failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Writing a receipt failed.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// The clock reported an impossible hour.
    #[error(transparent)]
    Hour(#[from] HourError),
}

/// A single line of input.
#[derive(Debug, Parser)]
#[command(multicall = true)]
pub struct CommandLine {
    /// The command
    #[command(subcommand)]
    pub command: Command,
}

/// Commands understood by the shell.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Add one unit of a product
    Add {
        /// Catalog key
        product: String,
    },

    /// Add another unit to a line
    #[command(alias = "+")]
    Inc {
        /// Catalog key
        product: String,
    },

    /// Take a unit off a line
    #[command(alias = "-")]
    Dec {
        /// Catalog key
        product: String,
    },

    /// Remove a line
    #[command(alias = "rm")]
    Remove {
        /// Catalog key
        product: String,
    },

    /// Set the coupon text; leave empty to clear it
    Coupon {
        /// Coupon code, e.g. BULK10 or CAT-FASHION-5
        code: Vec<String>,
    },

    /// Re-apply the current coupon
    Apply,

    /// Show the cart
    Show,

    /// List the catalog
    Products,

    /// Leave
    #[command(alias = "exit")]
    Quit,
}

impl Command {
    /// The session action this command performs, if any.
    pub fn action(&self) -> Option<CartAction> {
        match self {
            Command::Add { product } => Some(CartAction::Add(product.clone())),
            Command::Inc { product } => Some(CartAction::Increment(product.clone())),
            Command::Dec { product } => Some(CartAction::Decrement(product.clone())),
            Command::Remove { product } => Some(CartAction::Remove(product.clone())),
            Command::Coupon { code } => Some(CartAction::SetCoupon(code.join(" "))),
            Command::Apply => Some(CartAction::ApplyCoupon),
            Command::Show | Command::Products | Command::Quit => None,
        }
    }
}

/// Parse a line of input. Blank lines are `Ok(None)`.
///
/// # Errors
///
/// Returns a [`clap::Error`] describing the problem, or carrying help text when
/// the line asked for help.
pub fn parse_command(line: &str) -> Result<Option<Command>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();

    if words.is_empty() {
        return Ok(None);
    }

    CommandLine::try_parse_from(words).map(|line| Some(line.command))
}

/// Read commands from `input` until it ends or the shopper quits.
///
/// Mistakes (bad commands, unknown products) are reported on `output` and the
/// loop carries on.
///
/// # Errors
///
/// Returns a [`CommandError`] if reading or writing fails.
pub fn run(
    session: &mut CartSession<'_>,
    clock: Clock,
    mut input: impl BufRead,
    mut output: impl Write,
) -> Result<(), CommandError> {
    write_receipt(session, clock, &mut output)?;

    let mut line = String::new();

    loop {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();

        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                write!(output, "{err}")?;
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Products => write_products(session, &mut output)?,
            Command::Show => write_receipt(session, clock, &mut output)?,
            command => {
                let Some(action) = command.action() else {
                    continue;
                };

                match session.dispatch(action, clock.hour()?) {
                    Ok(receipt) => receipt.write_to(&mut output)?,
                    Err(err @ SessionError::UnknownProduct(_)) => {
                        warn!(%err, "rejected command");
                        writeln!(output, "{err}. Type `products` to list the catalog.")?;
                    }
                    Err(err) => {
                        warn!(%err, "rejected command");
                        writeln!(output, "{err}")?;
                    }
                }
            }
        }
    }

    info!(lines = session.cart().len(), "session ended");

    Ok(())
}

fn write_receipt(
    session: &CartSession<'_>,
    clock: Clock,
    output: &mut impl Write,
) -> Result<(), CommandError> {
    match session.render(clock.hour()?) {
        Ok(receipt) => receipt.write_to(output)?,
        Err(err) => writeln!(output, "{err}")?,
    }

    Ok(())
}

fn write_products(session: &CartSession<'_>, output: &mut impl Write) -> Result<(), CommandError> {
    for (key, product) in session.catalog().products() {
        writeln!(
            output,
            "  {key:<12} {:<20} {:<12} {:>8}",
            product.name,
            product.category,
            format_amount(&product.price)
        )?;
    }

    Ok(())
}
