use anyhow::{Context, Result};
use fuel_sales_dashboard::config::{DashboardConfig, DEFAULT_CONFIG_PATH};
use fuel_sales_dashboard::fetcher::{BoundarySource, GeoJsonFetcher};
use fuel_sales_dashboard::loader::load_sales;
use fuel_sales_dashboard::models::DashboardOutputs;
use fuel_sales_dashboard::{Dashboard, HostSession};
use std::env;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries one JSON document per render
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Load environment variables
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let interactive = args.iter().any(|arg| arg == "--interactive" || arg == "-i");
    let config_path = arg_value(&args, "--config").unwrap_or(DEFAULT_CONFIG_PATH);

    let mut config = DashboardConfig::load(config_path)
        .with_context(|| format!("Failed to load dashboard configuration from {}", config_path))?;

    if args.iter().any(|arg| arg == "--no-geo") {
        config.geo_enabled = false;
    }

    info!("🚀 Starting sales dashboard for {}", config.data_path);

    let ctx = load_sales(&config.data_path, config.sheet.as_deref())
        .map_err(|e| {
            if e.is_load_error() {
                error!("❌ Sales data rejected, nothing to render: {}", e);
            } else {
                error!("❌ Failed to build the sales table: {}", e);
            }
            e
        })
        .with_context(|| format!("Failed to load sales data from {}", config.data_path))?;

    info!("📊 Loaded {} sales records", ctx.len());

    let dashboard = Dashboard::new(&config.feature_id_key);

    let fetcher = if config.geo_enabled {
        Some(GeoJsonFetcher::from_config(&config))
    } else {
        info!("Geo boundaries disabled");
        None
    };

    let source = fetcher.as_ref().map(|f| f as &dyn BoundarySource);
    let mut session = HostSession::new(&dashboard, &ctx, source);

    let outputs = session.render().await?;
    print_outputs(&outputs)?;

    if !interactive {
        return Ok(());
    }

    info!("Waiting for filter events on stdin (one JSON object per line)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(outputs) = session.handle_line(&line).await {
            print_outputs(&outputs)?;
        }
    }

    info!("✅ Input closed, shutting down");

    Ok(())
}

fn print_outputs(outputs: &DashboardOutputs) -> Result<()> {
    println!("{}", serde_json::to_string(outputs)?);
    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|idx| args.get(idx + 1))
        .map(|value| value.as_str())
}
