//! Config inspection command.

use crate::config::{self, Config, Credentials, DEFAULT_PROFILE};
use crate::error::ResultExt;

use super::Cli;

/// Report the config file, its profiles and the resolved settings.
///
/// Secrets are never printed.
pub fn cmd_check_config(cli: &Cli, init: bool) -> anyhow::Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => config::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?,
    };

    if init {
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            let mut template = Config::default();
            template
                .credentials
                .insert(DEFAULT_PROFILE.to_string(), Credentials::default());
            config::save(&template, &path).with_context("Writing template config")?;
            println!("✓ Wrote template config to {}", path.display());
            println!(
                "  Fill in client_id and client_secret under [credentials.{}]",
                DEFAULT_PROFILE
            );
        }
        println!();
    }

    let config = if path.exists() {
        println!("✓ Config file: {}", path.display());
        config::load_from(&path).with_context("Checking config")?
    } else {
        println!("✗ Config file: {} (not found, using defaults)", path.display());
        Config::default()
    };

    println!();
    println!("Profiles:");
    if config.credentials.is_empty() {
        println!("  (none)");
    }
    for (name, credentials) in &config.credentials {
        let mark = if credentials.is_complete() { "✓" } else { "✗" };
        println!("  {} {}", mark, name);
    }

    println!();
    println!("Environment:");
    for var in ["SPOTIFY_CLIENT_ID", "SPOTIFY_CLIENT_SECRET"] {
        if std::env::var(var).is_ok() {
            println!("  ✓ {}: set", var);
        } else {
            println!("  ✗ {}: not set", var);
        }
    }

    println!();
    match config.resolve_credentials(
        &cli.profile,
        cli.client_id.as_deref(),
        cli.client_secret.as_deref(),
    ) {
        Ok(_) => println!("✓ Profile '{}' has usable credentials", cli.profile),
        Err(e) => println!("✗ {}", e),
    }

    println!();
    println!(
        "Source:   {} (page size {}, timeout {}s)",
        config.source.api_base_url, config.source.page_size, config.source.timeout_secs
    );
    println!(
        "Pipeline: checkpoint every {} rows, merge policy {:?}",
        config.pipeline.checkpoint_every, config.pipeline.merge_policy
    );

    Ok(())
}
