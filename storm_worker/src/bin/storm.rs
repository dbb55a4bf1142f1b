use clap::Parser;
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use storm_worker::eonet::{EonetClient, FetchError};
use storm_worker::storm::StormRenderer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Render the Philippine storm track map without going through Discord
#[derive(Parser, Debug)]
#[command(name = "storm")]
struct Args {
    /// EONET response saved to disk, either the whole document or its
    /// `events` array. Fetches the live feed when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory the PNG is written to
    #[arg(short, long, default_value = "cache")]
    output_dir: PathBuf,

    #[arg(long, default_value_t = 300.)]
    dpi: f64,

    /// TrueType font for labels, system fonts are searched otherwise
    #[arg(long)]
    font: Option<PathBuf>,

    /// EONET API key, falls back to NASA_API_KEY
    #[arg(long)]
    api_key: Option<String>,

    /// Route the request through this proxy, falls back to PROXY_URL
    #[arg(long)]
    proxy: Option<Url>,
}

fn read_events(path: &PathBuf) -> Result<Vec<Value>, Box<dyn Error + Send + Sync>> {
    let document: Value = serde_json::from_slice(&fs::read(path)?)?;
    let events = match document {
        Value::Array(events) => events,
        Value::Object(mut document) => match document.remove("events") {
            Some(Value::Array(events)) => events,
            _ => return Err(format!("{} has no events array", path.display()).into()),
        },
        _ => return Err(format!("{} is not an EONET document", path.display()).into()),
    };
    Ok(events)
}

async fn fetch_events(args: &Args) -> Result<Vec<Value>, FetchError> {
    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("NASA_API_KEY").ok())
        .unwrap_or_default();
    let proxy = args
        .proxy
        .clone()
        .or_else(|| std::env::var("PROXY_URL").ok().and_then(|p| Url::parse(&p).ok()));

    let client = EonetClient::builder(api_key)
        .proxy(proxy)
        .timeout_duration(Duration::from_secs(20))
        .build();
    client.fetch_severe_storms().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let events = match &args.input {
        Some(path) => read_events(path)?,
        None => fetch_events(&args).await?,
    };
    info!(events = events.len(), "storm events loaded");

    let renderer = StormRenderer::builder(args.output_dir.clone())
        .dpi(args.dpi)
        .font_path(args.font.clone())
        .build()?;

    match renderer.plot_storm_path(events).await {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => {
            warn!("nothing was rendered");
            Err("no storm map was produced".into())
        }
    }
}
