use anyhow::Result;
use argocd_syncer::config::SyncerConfig;
use argocd_syncer::crd::Application;
use argocd_syncer::reconciler::Reconciler;
use argocd_syncer::{metrics, server};
use futures::StreamExt;
use kube::{Api, Client};
use kube_runtime::{controller::Action, watcher, Controller};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = SyncerConfig::from_env();

    init_tracing(&config);

    info!(
        "Starting Argo CD Application Syncer (build {} / {})",
        env!("BUILD_GIT_HASH"),
        env!("BUILD_DATETIME"),
    );
    info!("Target namespace: {}", config.application_namespace);

    metrics::register_metrics()?;

    // Start HTTP server for metrics and probes
    let server_state = Arc::new(server::ServerState {
        is_ready: Arc::new(std::sync::atomic::AtomicBool::new(false)),
    });
    let server_state_clone = Arc::clone(&server_state);
    let server_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = server::start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });

    let client = Client::try_default().await?;

    // Watch Applications in every namespace; tenants may create them anywhere.
    // The reconciler's guard skips the target namespace.
    let applications: Api<Application> = Api::all(client.clone());

    let reconciler = Arc::new(Reconciler::for_cluster(
        client,
        config.application_namespace.clone(),
    ));

    server_state
        .is_ready
        .store(true, std::sync::atomic::Ordering::Relaxed);

    let requeue_after = config.error_requeue_duration();
    Controller::new(applications, watcher::Config::default())
        .shutdown_on_signal()
        .run(
            Reconciler::reconcile,
            move |app, err, _ctx| {
                error!(
                    "Reconciliation error for {}/{}: {err:?}",
                    app.metadata.namespace.as_deref().unwrap_or_default(),
                    app.metadata.name.as_deref().unwrap_or("unknown"),
                );
                metrics::increment_reconciliation_errors();
                Action::requeue(requeue_after)
            },
            Arc::clone(&reconciler),
        )
        .for_each(|_| std::future::ready(()))
        .await;

    info!("Controller stopped");
    Ok(())
}

fn init_tracing(config: &SyncerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "argocd_syncer={}",
            config.log_level.to_lowercase()
        ))
    });

    if config.log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
