use pitr_config::PitrConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

fn main() -> pitr_config::Result<()> {
    Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("INFO")))
        .init();

    // Pass a path, or let discovery look for config.{yaml,yml,json}
    let config = match std::env::args().nth(1) {
        Some(path) => PitrConfig::load(path)?,
        None => PitrConfig::discover("config")?,
    };

    println!("database:  {}", config.database_url()?);
    println!("blobstore: {}", config.blobstore_url()?);

    if let Some(version) = config.db_version()? {
        println!("postgres:  {}", version);
    }
    if let Ok(stanza) = config.stanza() {
        println!("stanza:    {}", stanza);
    }

    Ok(())
}
