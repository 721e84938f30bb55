use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use url::Url;

use nanopac::adapters::{load_pac_source, PacProxyResolver};
use nanopac::config::EngineConfig;
use nanopac::domain::ProxyChain;
use nanopac::ports::ProxyResolverPort;

#[derive(Parser, Debug)]
#[clap(version = env!("NANOPAC_VERSION"), author = env!("CARGO_PKG_AUTHORS"))]
pub struct Opts {
    /// PAC file path, file:// or http(s):// URL
    #[clap(long, short = 'p')]
    pac: String,

    /// Configuration file (defaults to the user configuration directory)
    #[clap(long, short = 'c')]
    config: Option<PathBuf>,

    /// URLs to resolve
    #[clap(required = true)]
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nanopac=info")))
        .init();

    let opts = Opts::parse();
    let config = match &opts.config {
        Some(path) => EngineConfig::load_path(path)?,
        None => EngineConfig::load()?,
    };
    info!("nanopac {} starting", env!("NANOPAC_VERSION"));

    let resolver = PacProxyResolver::new(Arc::new(nanopac::system_evaluator(&config)));
    let source = load_pac_source(&opts.pac).await?;
    resolver.update_script(Some(source)).await?;

    let lookups = opts.urls.iter().map(|raw| {
        let resolver = resolver.clone();
        async move {
            let chain = match raw.parse::<Url>() {
                Ok(url) => resolver.resolve_all_routes(&url).await,
                Err(e) => Err(nanopac::domain::PacError::InvalidUri(format!("{}: {}", raw, e))),
            };
            (raw, chain)
        }
    });

    for (raw, chain) in futures::future::join_all(lookups).await {
        match chain {
            Ok(chain) => println!("{} -> {}", raw, chain),
            Err(e) => {
                error!("{}: {}", raw, e);
                println!("{} -> {}", raw, ProxyChain::direct());
            }
        }
    }
    Ok(())
}
