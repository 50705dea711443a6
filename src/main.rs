use std::{path::Path, sync::Arc};

use clap::{Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use tracing::Instrument;
use xds_forge::{
    adapters::{AppState, FileSnapshotSink, http_api},
    config::{ControlPlaneConfig, ControlPlaneConfigValidator, loader::load_config},
    core::{SnapshotAssembler, SynthesisPolicy},
    ports::snapshot_sink::SnapshotSink,
    tracing_setup,
};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(short, long, default_value = "xds-forge.toml")]
    config: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        #[clap(short, long, default_value = "xds-forge.toml")]
        config: String,
    },
    /// Initialize a new configuration file
    Init {
        /// Output path for the new config file
        #[clap(short, long, default_value = "xds-forge.toml")]
        config: String,
    },
    /// Apply the configured intents once and emit the resulting snapshot
    Render {
        /// Configuration file to use
        #[clap(short, long, default_value = "xds-forge.toml")]
        config: String,
        /// Write clusters.json / routes.json / snapshot.json here instead of stdout
        #[clap(short, long)]
        output_dir: Option<String>,
    },
    /// Start the intent intake server (default)
    Serve {
        /// Configuration file to use
        #[clap(short, long, default_value = "xds-forge.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    match args.command {
        Some(Commands::Validate { config }) => validate_config_command(&config).await,
        Some(Commands::Init { config }) => init_config_command(&config).await,
        Some(Commands::Render { config, output_dir }) => {
            render_command(&config, output_dir.as_deref()).await
        }
        Some(Commands::Serve { config }) => serve_command(&config).await,
        None => serve_command(&args.config).await,
    }
}

/// Load and validate a configuration file
async fn load_validated(config_path: &str) -> Result<ControlPlaneConfig> {
    let config = load_config(config_path)
        .await
        .with_context(|| format!("Failed to load config from {config_path}"))?;

    ControlPlaneConfigValidator::validate(&config)
        .map_err(|e| eyre!("Invalid configuration in {config_path}: {e}"))?;

    Ok(config)
}

/// Build an assembler from the configured policy and apply the seed intents in order
fn seed_assembler(config: &ControlPlaneConfig) -> Result<SnapshotAssembler> {
    let policy = SynthesisPolicy::try_from(&config.xds).context("Invalid [xds] settings")?;
    let mut assembler =
        SnapshotAssembler::with_policy(policy).context("Failed to create snapshot assembler")?;

    for (index, intent) in config.intents.iter().enumerate() {
        assembler.submit_intent(intent).with_context(|| {
            format!(
                "Failed to apply intent #{} ({} -> {})",
                index + 1,
                intent.prefix,
                intent.origin
            )
        })?;
    }

    Ok(assembler)
}

async fn serve_command(config_path: &str) -> Result<()> {
    let config = load_validated(config_path).await?;

    tracing_setup::init_tracing_with_config(&config.logging.level, config.logging.json)
        .map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;

    let assembler = seed_assembler(&config)?;
    tracing::info!(
        "Applied {} seed intents from {config_path}",
        config.intents.len()
    );

    let mut state = AppState::new(assembler);

    if let Some(dir) = &config.delivery.output_dir {
        let sink: Arc<dyn SnapshotSink> = Arc::new(FileSnapshotSink::new(dir));
        let initial = state.assembler().lock().await.build()?;
        sink.publish(&initial)
            .await
            .with_context(|| format!("Failed to publish initial snapshot to {dir}"))?;
        tracing::info!("File delivery enabled, writing snapshots to {dir}");
        state = state.with_sink(sink);
    }

    let app = http_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;

    tracing::info!("xds-forge listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future()
        .instrument(tracing_setup::configure_component_tracing("http_api"))
        .await
        .context("HTTP server error")?;

    tracing::info!("xds-forge shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT (Ctrl+C), shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}

async fn render_command(config_path: &str, output_dir: Option<&str>) -> Result<()> {
    let config = load_validated(config_path).await?;
    let assembler = seed_assembler(&config)?;
    let snapshot = assembler.build()?;

    match output_dir.or(config.delivery.output_dir.as_deref()) {
        Some(dir) => {
            FileSnapshotSink::new(dir)
                .publish(&snapshot)
                .await
                .with_context(|| format!("Failed to write snapshot to {dir}"))?;
            println!(
                "✅ Wrote {} clusters and {} routes to {dir}",
                assembler.clusters().len(),
                assembler.routes().len()
            );
        }
        None => println!("{}", snapshot.to_json()?),
    }
    Ok(())
}

async fn validate_config_command(config_path: &str) -> Result<()> {
    println!("🔍 Validating configuration file: {config_path}");

    if !Path::new(config_path).exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' not found");
        std::process::exit(1);
    }

    let config = match load_config(config_path).await {
        Ok(config) => {
            println!("✅ Configuration parsing: OK");
            config
        }
        Err(e) => {
            eprintln!("❌ Configuration parsing failed:");
            eprintln!("   {e:#}");
            std::process::exit(1);
        }
    };

    match ControlPlaneConfigValidator::validate(&config) {
        Ok(()) => {
            println!("✅ Configuration validation: OK");
            println!();
            println!("📋 Configuration Summary:");
            println!("   • Listen Address: {}", config.listen_addr);
            println!("   • Seed Intents: {}", config.intents.len());
            println!("   • Timeout: {}", config.xds.timeout);
            println!(
                "   • Versions: clusters={} routes={}",
                config.xds.cluster_version, config.xds.route_version
            );
            println!(
                "   • File Delivery: {}",
                config.delivery.output_dir.as_deref().unwrap_or("disabled")
            );
            println!();
            println!("🎉 Configuration is valid and ready to use!");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed:");
            eprintln!("{e}");
            println!();
            println!("💡 Common fixes:");
            println!("   • Ensure every origin includes a scheme (http:// or https://)");
            println!("   • Only http, https, ws and wss origins are supported");
            println!("   • Verify listen address format (e.g., '127.0.0.1:18000')");
            println!("   • Use humantime units for the timeout (e.g., '25s', '1m')");
            std::process::exit(1);
        }
    }
}

/// Initialize a new configuration file
async fn init_config_command(config_path: &str) -> Result<()> {
    let path = Path::new(config_path);
    if path.exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' already exists");
        std::process::exit(1);
    }

    let default_config = r#"# xds-forge configuration

# Address of the intent intake API
listen_addr = "127.0.0.1:18000"

[logging]
level = "info"
json = false

# Values stamped into every synthesized resource
[xds]
timeout = "25s"
cluster_version = "1"
route_version = "1"
route_config_name = "ENVOY_ROUTES"
virtual_host_name = "MY_SERVER"
virtual_host_domains = ["*"]
duplicate_clusters = "allow"
pretty = false

# Write clusters.json / routes.json for path based discovery
# [delivery]
# output_dir = "./xds"

# Seed intents, applied in order at startup
[[intents]]
origin = "https://api.example.com"
prefix = "/v1/"

# [[intents]]
# origin = "http://legacy.internal:8080"
# prefix = "/legacy/"
# prefix_rewrite = "/"
# host_rewrite_literal = "legacy.example.com"
"#;

    tokio::fs::write(path, default_config)
        .await
        .context("Failed to write config file")?;
    println!("✅ Created default configuration at: {config_path}");
    println!("   Run 'xds-forge serve --config {config_path}' to start the server");
    Ok(())
}
