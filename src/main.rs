use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;
mod config;
mod core;
mod display;
mod input;
mod menu;
mod order;
mod providers;
mod tools;

use crate::app::Application;
use crate::cli::Args;
use crate::commands::create_command_registry;
use crate::config::Config;
use crate::core::error::DriveThruError;
use crate::menu::loader::{MenuLoader, static_menu};
use crate::menu::{MenuCatalog, MenuError};
use crate::providers::factory::ProviderFactory;
use crate::tools::drive_thru::SessionState;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::display_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(mut args: Args) -> Result<(), DriveThruError> {
    let config = Config::load()?;

    let provider_kind = match args.provider.as_deref() {
        Some(name) => config::Provider::from_str(name)
            .ok_or_else(|| DriveThruError::Config(format!("Unsupported provider: {}", name)))?,
        None => config.active_provider.unwrap_or_default(),
    };

    let mut provider_config = config.resolve_provider(provider_kind)?;
    if args.model.is_some() {
        provider_config.model = args.model.clone();
    }
    let provider = ProviderFactory::new().create(&provider_kind, &provider_config)?;
    if args.model.is_none() {
        args.model = provider_config.model.clone();
    }

    let (catalog, menu_source) = load_menu(&args, &config).await?;
    if catalog.is_empty() {
        return Err(MenuError::InvalidMenuData("the menu is empty".to_string()).into());
    }

    let session = SessionState::new(Arc::new(catalog));
    let mut application =
        Application::new(args, provider, create_command_registry(), session, menu_source);
    application.run().await
}

/// Scrapes the remote menu unless --static-menu is set, falling back to
/// the bundled menu when the page is unreachable. A catalog that cannot
/// be built at all is fatal.
async fn load_menu(args: &Args, config: &Config) -> Result<(MenuCatalog, &'static str), DriveThruError> {
    if args.static_menu {
        return Ok((MenuCatalog::from_records(static_menu()?)?, "bundled menu"));
    }

    let loader = MenuLoader::new(args.menu_url.clone().or_else(|| config.menu_url.clone()));
    match loader.fetch().await {
        Ok(records) => Ok((MenuCatalog::from_records(records)?, "live menu")),
        Err(MenuError::MenuUnavailable(reason)) => {
            warn!(%reason, "menu page unavailable, using the bundled menu");
            Ok((MenuCatalog::from_records(static_menu()?)?, "bundled menu"))
        }
        Err(e) => Err(e.into()),
    }
}
