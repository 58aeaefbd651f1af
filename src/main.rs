mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use rh_core::config::Config;
use rh_media::{sniff, SNIFF_LEN};
use tokio::io::AsyncReadExt;

async fn start_server(host: Option<String>, port: Option<u16>, config_path: Option<&Path>) -> Result<()> {
    let mut config = Config::load_or_default(config_path);

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting reelhouse server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    rh_server::start(config).await?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the level depends on --verbose.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelhouse=trace,rh_server=trace,rh_media=debug,rh_av=debug,rh_db=debug,tower_http=debug"
                .to_string()
        } else {
            "reelhouse=debug,rh_server=debug,rh_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Probe { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&file, cli.config.as_deref(), json))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("reelhouse {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = Config::load_or_default(config_path);

    let mut handle = tokio::fs::File::open(file)
        .await
        .with_context(|| format!("cannot open {}", file.display()))?;
    let size = handle.metadata().await?.len();
    let mut prefix = Vec::with_capacity(SNIFF_LEN);
    (&mut handle)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut prefix)
        .await?;
    let mime = sniff(&prefix);

    let probe = rh_server::discover_probe(&config);
    let duration = match probe.probe_duration(file).await {
        Ok(0) => None,
        Ok(secs) => Some(secs),
        Err(e) => {
            tracing::warn!("Duration probe failed: {e}");
            None
        }
    };

    if json {
        let out = serde_json::json!({
            "file": file.display().to_string(),
            "size_bytes": size,
            "content_type": mime,
            "duration": duration,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("File: {}", file.display());
        println!("Size: {size} bytes");
        println!("Content type: {mime}");
        match duration {
            Some(secs) => println!("Duration: {secs}s"),
            None => println!("Duration: unknown"),
        }
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        println!("No config file given; defaults are valid.");
        return Ok(());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let config = Config::from_json(&contents)?;

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("Configuration is valid.");
    } else {
        println!("Configuration is valid with {} warning(s):", warnings.len());
        for w in &warnings {
            println!("  - {w}");
        }
    }
    Ok(())
}
