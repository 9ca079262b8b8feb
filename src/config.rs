//! Config

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::hours::{Clock, Hour, HourError};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Interactive shopping cart with bulk, time-of-day and coupon discounts.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct CartConfig {
    /// Catalog YAML file; the bundled catalog is used if unset
    #[arg(short, long, env = "CART_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Pin the hour used for time-of-day discounts (0-23) instead of reading the clock
    #[arg(long, env = "CART_HOUR", value_parser = clap::value_parser!(u8).range(0..=23))]
    pub hour: Option<u8>,

    /// Coupon text to start with
    #[arg(long, default_value = "")]
    pub coupon: String,

    /// Logging
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl CartConfig {
    /// The clock pricing should read.
    ///
    /// # Errors
    ///
    /// Returns [`HourError::OutOfRange`] if the pinned hour is invalid.
    pub fn clock(&self) -> Result<Clock, HourError> {
        match self.hour {
            Some(hour) => Ok(Clock::Fixed(Hour::new(hour)?)),
            None => Ok(Clock::Local),
        }
    }
}
