//! Application startup and server initialization.
//!
//! Connects to the cluster, starts the stores and serves the metrics and
//! telemetry listeners until interrupted.

use std::error::Error;
use std::future::{Future, IntoFuture};
use std::io;
use std::sync::Arc;

use kube::config::{KubeConfigOptions, Kubeconfig};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::builder::{Builder, BuiltStores};
use crate::config::ConfigV1;
use crate::filter::{AllowDenyList, NamespaceScope};
use crate::handler::MetricsHandler;
use crate::resources::Registry;
use crate::routes;
use crate::state::AppState;
use crate::telemetry::Telemetry;

/// Builds a client from the configured kubeconfig and context, falling back
/// to the in-cluster or `$KUBECONFIG` configuration.
pub async fn create_client(config: &ConfigV1) -> Result<kube::Client, Box<dyn Error>> {
    let options = KubeConfigOptions {
        context: config.kube_context.clone(),
        ..Default::default()
    };
    let kube_config = match config.kubeconfig.as_deref() {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &options).await?
        }
        None if config.kube_context.is_some() => kube::Config::from_kubeconfig(&options).await?,
        None => kube::Config::infer().await?,
    };
    info!(
        event_name = "startup.client.configured",
        event_domain = "startup",
        cluster_url = %kube_config.cluster_url,
        "Kubernetes client configured"
    );
    Ok(kube::Client::try_from(kube_config)?)
}

/// Creates the store builder from the configuration.
pub fn create_builder(
    config: &ConfigV1,
    client: Arc<dyn crate::store::WatchClient>,
    telemetry: Telemetry,
) -> Result<Builder, Box<dyn Error>> {
    let allow_deny = AllowDenyList::new(&config.metric_allowlist, &config.metric_denylist)?;
    info!("Metric allow-denylisting: {}", allow_deny.status());

    let namespaces = NamespaceScope::from_list(&config.namespaces)?;
    let builder = Builder::new(Arc::new(Registry::default()), client)
        .with_enabled_resources(&config.resources)?
        .with_namespaces(namespaces, &config.namespaces_denylist)
        .with_allow_deny_list(allow_deny)
        .with_allow_labels(config.metric_labels_allowlist.clone())
        .with_allow_annotations(config.metric_annotations_allowlist.clone())
        .with_apiserver_cache(config.use_apiserver_cache)
        .with_telemetry(telemetry);
    Ok(builder)
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    // A dropped sender also means shutdown.
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Runs one server to completion, then signals shutdown so the rest of the
/// process stops with it.
async fn supervise<F>(name: &str, server: F, shutdown: &watch::Sender<bool>) -> io::Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    let result = server.await;
    if let Err(e) = &result {
        error!(
            event_name = "startup.server.failed",
            event_domain = "startup",
            server = name,
            "Server failed: {}",
            e
        );
    }
    shutdown.send_replace(true);
    result
}

/// Resolves on the interrupt signal or once shutdown was requested elsewhere,
/// and makes sure every listener of `shutdown` sees it.
async fn wait_for_interrupt(shutdown: &watch::Sender<bool>) {
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!("Failed to listen for the interrupt signal: {}", e);
            }
        }
        _ = wait_for_shutdown(shutdown.subscribe()) => {}
    }
    info!(
        event_name = "startup.shutdown",
        event_domain = "startup",
        "Shutting down"
    );
    shutdown.send_replace(true);
}

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the cluster cannot be
/// reached, a listener fails to bind or a server fails while running.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn Error>> {
    let client = create_client(&config).await?;
    let telemetry = Telemetry::new();
    let builder = create_builder(&config, Arc::new(client), telemetry.clone())?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let BuiltStores { writers, mut tasks } = builder.build(shutdown_rx.clone())?;

    let state = AppState {
        handler: Arc::new(MetricsHandler::new(writers, config.enable_gzip_encoding)),
        telemetry,
    };

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Starting metrics server on {}", config.bind_address);
    let metrics_app = routes::create_router(state.clone());
    let metrics_server = supervise(
        "metrics",
        axum::serve(listener, metrics_app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown_rx.clone()))
            .into_future(),
        &shutdown_tx,
    );

    let telemetry_listener = match config.telemetry_address.as_deref() {
        Some(address) => {
            let listener = TcpListener::bind(address).await?;
            info!("Starting telemetry server on {}", address);
            Some(listener)
        }
        None => None,
    };
    let telemetry_app = routes::create_telemetry_router(state);
    let telemetry_server = async {
        match telemetry_listener {
            Some(listener) => {
                let server = axum::serve(listener, telemetry_app)
                    .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
                    .into_future();
                supervise("telemetry", server, &shutdown_tx).await
            }
            None => Ok(()),
        }
    };

    let (metrics_result, telemetry_result, ()) = tokio::join!(
        metrics_server,
        telemetry_server,
        wait_for_interrupt(&shutdown_tx)
    );

    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            warn!("Watch task did not stop cleanly: {}", e);
        }
    }

    metrics_result?;
    telemetry_result?;
    Ok(())
}
