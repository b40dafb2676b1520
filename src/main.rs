use clustore::{FactoryConfig, LocalCluster, Store, StoreFactory};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (DEBUG level to trace store operations)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::DEBUG.into()),
        )
        .init();

    let config = FactoryConfig::from_env()?;
    info!("Clustore starting with prefix '{}'", config.prefix);

    let cluster = match config.shards {
        Some(shards) => LocalCluster::with_shards(shards),
        None => LocalCluster::new(),
    };
    info!("Local cluster using {} shards", cluster.num_shards());

    let factory: StoreFactory<LocalCluster, String> =
        StoreFactory::new(Arc::new(cluster), config)?;
    if factory.timeout().is_none() {
        factory.set_timeout(Some(Duration::from_millis(1000)));
    }

    let jobs = factory.open("jobs").await?;
    let ttl = jobs.timeout().unwrap_or_default();

    jobs.store("a", "v1".to_string()).await?;
    let generated = jobs.store_generated("v0".to_string()).await?;
    info!("Stored 'a' and generated id '{}', waiting past the timeout", generated);

    tokio::time::sleep(ttl + Duration::from_millis(100)).await;
    jobs.store("b", "v2".to_string()).await?;

    let loaded = jobs.load("b").await?;
    info!("load(\"b\") -> {:?}", loaded);

    match jobs.peek("a").await? {
        None => info!("peek(\"a\") -> None (evicted)"),
        Some(value) => warn!("peek(\"a\") still returned {:?}", value),
    }

    factory.close("jobs").await?;
    Ok(())
}
