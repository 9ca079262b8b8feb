//! Cartwright shopping cart shell

use std::io;

use anyhow::Context;
use cartwright::{
    catalog::Catalog, commands, config::CartConfig, observability, session::CartSession,
};
use clap::Parser;
use tracing::info;

const DEFAULT_CATALOG_YAML: &str = include_str!("../fixtures/catalog.yml");

fn main() -> anyhow::Result<()> {
    let config = CartConfig::parse();

    observability::init_logging(&config.logging)?;

    let catalog = match &config.catalog {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("failed to load catalog from {}", path.display()))?,
        None => Catalog::from_yaml_str(DEFAULT_CATALOG_YAML)?,
    };

    let clock = config.clock()?;

    info!(
        products = catalog.len(),
        currency = catalog.currency().iso_alpha_code,
        ?clock,
        "starting session"
    );

    let mut session = CartSession::new(&catalog).with_coupon(config.coupon.as_str());

    commands::run(&mut session, clock, io::stdin().lock(), io::stdout().lock())?;

    Ok(())
}
