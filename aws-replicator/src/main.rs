use anyhow::{bail, Context, Result};
use aws_replicator::utils::{env_list, env_or};
use aws_replicator::{
    build_router, AwsClientFactory, EmulatorBackends, InjectionState, Registry, ReplicationTarget,
    Replicator, ReplicatorConfig,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: aws-replicator serve | aws-replicator replicate <kind:name>[,<kind:name>...]";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ReplicatorConfig::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("serve") => serve(config).await,
        Some("replicate") => {
            let raw = args
                .get(1)
                .cloned()
                .unwrap_or_else(|| env_or("REPLICATOR_RESOURCES", ""));
            replicate(config, &raw).await
        }
        _ => bail!(USAGE),
    }
}

async fn replicate(config: ReplicatorConfig, raw_targets: &str) -> Result<()> {
    let targets = ReplicationTarget::parse_list(raw_targets);
    if targets.is_empty() {
        bail!(USAGE);
    }

    let remote = AwsClientFactory::load(config.enumeration.region.clone()).await;
    let replicator = Replicator::new(Arc::new(Registry::standard()), Arc::new(remote), config)?;

    let outcomes = replicator.replicate_all(&targets).await;
    let mut failed = 0;
    for (target, res) in &outcomes {
        match res {
            Ok(report) => println!("{target} -> {} ({} bytes)", report.physical_id, report.bytes),
            Err(e) => {
                failed += 1;
                eprintln!("{target} failed: {e}");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} resources failed to replicate", outcomes.len());
    }
    Ok(())
}

/// Receiving endpoint over an in-memory store, seeded from the environment
/// because injection only fills resources that already exist.
async fn serve(config: ReplicatorConfig) -> Result<()> {
    let region = env_or("REPLICATOR_LOCAL_REGION", "us-east-1");
    let backends = Arc::new(EmulatorBackends::new());

    for name in env_list("REPLICATOR_LOCAL_QUEUES") {
        backends.create_queue(&region, &name).await;
    }
    for spec in env_list("REPLICATOR_LOCAL_TABLES") {
        let mut parts = spec.split(':');
        let name = parts.next().unwrap_or_default();
        let keys: Vec<&str> = parts.collect();
        if name.is_empty() || keys.is_empty() {
            bail!("REPLICATOR_LOCAL_TABLES entry '{spec}' must be name:hashKey[:rangeKey]");
        }
        backends.create_table(&region, name, &keys).await;
    }
    for name in env_list("REPLICATOR_LOCAL_BUCKETS") {
        backends.create_bucket(&region, &name).await;
    }

    let state = Arc::new(InjectionState::new(Arc::new(Registry::standard()), backends));
    let app = build_router(
        state,
        &config.transport.handler_path,
        config.server.max_body_bytes,
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.server.bind_addr))?;
    info!(
        addr = %config.server.bind_addr,
        path = %config.transport.handler_path,
        "serving replication endpoint"
    );
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server stopped");
        return Err(e.into());
    }
    Ok(())
}
