//! calcsrv entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
#[cfg(feature = "swagger-ui")]
use utoipa::OpenApi;
#[cfg(feature = "swagger-ui")]
use utoipa_swagger_ui::SwaggerUi;

use calcsrv::config::CalcsrvConfig;
use calcsrv::routes::create_routes;
use calcsrv::AppState;
use common::logging::{self, LogConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "calcsrv - scientific calculator service")]
struct Args {
    /// Configuration file (default: config/calcsrv.yaml when present)
    #[arg(short, long, value_name = "FILE", env = "CALCSRV_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP service (default)
    Serve,
    /// Validate the configuration and print the effective values
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = CalcsrvConfig::load(args.config.as_deref()).context("configuration")?;

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Check => check_config(&config),
        Commands::Serve => run_service(config).await,
    }
}

fn check_config(config: &CalcsrvConfig) -> anyhow::Result<()> {
    let rendered = serde_yaml::to_string(config).context("render configuration")?;
    println!("{}", rendered);
    println!("Configuration OK");
    Ok(())
}

async fn run_service(config: CalcsrvConfig) -> anyhow::Result<()> {
    logging::init_with_config(LogConfig {
        service_name: config.service_name.clone(),
        level: config.log.level.clone(),
        json: config.log.json,
        log_dir: config.log.dir.clone(),
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting {} v{}", config.service_name, env!("CARGO_PKG_VERSION"));

    let addr = config.api.bind_address();
    let app = create_routes(Arc::new(AppState::new(config)));

    #[cfg(feature = "swagger-ui")]
    let app = {
        info!("Swagger UI at /docs");
        app.merge(SwaggerUi::new("/docs").url("/openapi.json", calcsrv::routes::CalcsrvApiDoc::openapi()))
    };

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("API server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown::wait_for_shutdown())
        .await
        .context("server error")?;

    info!("Service stopped");
    Ok(())
}
