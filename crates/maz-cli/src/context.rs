use anyhow::Context;
use maz_config::MazConfig;
use maz_sync::{CacheStore, HttpTransport, StaticCredentials, TcpProbe};

/// The store every command runs against.
pub type Store = CacheStore<HttpTransport<StaticCredentials>, TcpProbe>;

pub fn load_config() -> anyhow::Result<MazConfig> {
    let config = MazConfig::load_with_dotenv().context("failed to load maz configuration")?;
    if !config.credentials.is_configured() {
        tracing::warn!(
            "no API tokens configured; set MAZ_CREDENTIALS__GRAPH_TOKEN and \
             MAZ_CREDENTIALS__ARM_TOKEN to refresh from upstream"
        );
    }
    Ok(config)
}

pub fn open_store(config: &MazConfig) -> anyhow::Result<Store> {
    let transport = HttpTransport::new(
        &config.http,
        config.endpoints.resolve(),
        StaticCredentials::from(&config.credentials),
    )
    .context("failed to build HTTP client")?;
    let probe = TcpProbe::from_config(&config.http);
    CacheStore::from_config(config, transport, probe).context("cache is not configured")
}
