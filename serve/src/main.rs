//! Webhook context-enrichment pipeline server binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use clients::PipelineConfig;
use pipeline::Pipeline;

#[derive(Parser, Debug)]
#[command(name = "webhook-pipeline")]
#[command(about = "Webhook-driven context enrichment pipeline")]
struct Args {
    /// Listen address (default 127.0.0.1:8088, or $BIND_ADDR)
    #[arg(long, value_name = "ADDR")]
    addr: Option<String>,

    /// Directory to look for a `.env` file in (default: current directory)
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    config::load_and_apply("webhook-pipeline", args.config_dir.as_deref()).ok();
    serve::logging::init();

    let pipeline_config = match PipelineConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("webhook-pipeline: configuration error: {e}");
            std::process::exit(1);
        }
    };

    let pipeline = match Pipeline::from_config(&pipeline_config) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            eprintln!("webhook-pipeline: failed to build clients: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = serve::run_serve(args.addr.as_deref(), pipeline).await {
        eprintln!("webhook-pipeline: serve error: {e}");
        std::process::exit(1);
    }
    Ok(())
}
