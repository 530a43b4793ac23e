//! Field analytics service entry point.

mod app;

use anyhow::Result;
use app::App;
use clap::Parser;
use field_analytics_common::{config::AppConfig, telemetry};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "field-analytics")]
#[command(author, version, about = "Field-service analytics and reporting", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "FIELD_ANALYTICS_CONFIG")]
    config: Option<String>,

    /// Listen port override
    #[arg(short, long, env = "FIELD_ANALYTICS_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    telemetry::init(&config.log)?;
    info!(port = config.server.port, "starting field analytics service");

    let app = App::init(config).await?;
    app.run().await
}
