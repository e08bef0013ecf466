//! # Reconciler
//!
//! Core reconciliation logic for `Application` resources.
//!
//! The reconciler:
//! - Watches Argo CD `Application` resources across all namespaces
//! - Ignores resources already living in the target namespace
//! - Manages the controller finalizer on source Applications
//! - Mirrors each valid source Application into the target namespace
//! - Tears the mirror down when the source is deleted
//!
//! ## Reconciliation Flow
//!
//! 1. Guard: skip resources in the target namespace (the controller's own
//!    output must never be re-read as input)
//! 2. Fetch the source Application; absence means a deletion already
//!    completed and the cycle ends quietly
//! 3. Deletion branch: run finalization (delete mirror, drop finalizers)
//! 4. Live branch: ensure the controller finalizer, validate the
//!    destination namespace, then create or update the mirror
//!
//! Every branch is re-entrant. A cycle abandoned at any point resumes
//! safely on the next event because each write either happened (and the
//! next cycle observes it) or did not (and the next cycle redoes it).

pub mod finalizer;
pub mod sync;
pub mod validation;

use crate::crd::Application;
use crate::metrics;
use crate::store::{ApplicationStore, KubeStore, StoreError};
use kube::Client;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reconciliation context shared across cycles
///
/// Holds the store capability and the target namespace. No other state:
/// each cycle carries everything else as call parameters, so concurrent
/// cycles for different Applications never interfere.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn ApplicationStore>,
    target_namespace: String,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("target_namespace", &self.target_namespace)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(store: Arc<dyn ApplicationStore>, target_namespace: impl Into<String>) -> Self {
        Self {
            store,
            target_namespace: target_namespace.into(),
        }
    }

    /// Build a reconciler backed by the Kubernetes API
    pub fn for_cluster(client: Client, target_namespace: impl Into<String>) -> Self {
        Self::new(Arc::new(KubeStore::new(client)), target_namespace)
    }

    pub fn target_namespace(&self) -> &str {
        &self.target_namespace
    }

    pub(crate) fn store(&self) -> &dyn ApplicationStore {
        self.store.as_ref()
    }

    /// Entry point invoked by the controller runtime
    ///
    /// The watch event only pins down which Application to look at; the
    /// current state is always re-fetched through the store so the cycle is
    /// level-triggered, not edge-triggered.
    pub async fn reconcile(
        app: Arc<Application>,
        ctx: Arc<Reconciler>,
    ) -> Result<Action, ReconcilerError> {
        let start = Instant::now();
        let namespace = app.metadata.namespace.as_deref().unwrap_or_default();
        let name = app.metadata.name.as_deref().unwrap_or_default();

        metrics::increment_reconciliations();

        ctx.reconcile_application(namespace, name).await?;

        metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());
        Ok(Action::await_change())
    }

    /// Run one reconcile cycle for a namespaced name
    pub async fn reconcile_application(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<(), ReconcilerError> {
        // The controller writes into the target namespace; reconciling its
        // own output would loop forever
        if namespace == self.target_namespace {
            debug!("Ignoring Application {namespace}/{name} in target namespace");
            return Ok(());
        }

        let Some(app) = self.store.get(namespace, name).await? else {
            debug!("Application {namespace}/{name} already deleted");
            return Ok(());
        };

        info!("Reconciling Application {namespace}/{name}");

        if app.metadata.deletion_timestamp.is_some() {
            finalizer::finalize(self, &app).await?;
            return Ok(());
        }

        if !finalizer::has_finalizer(&app, finalizer::SYNCER_FINALIZER) {
            // The finalizer write itself triggers the next event, which
            // picks up mirroring; never inject and mirror in one cycle
            finalizer::inject(self, &app).await?;
            return Ok(());
        }

        if let Err(reason) = validation::validate_destination(&app) {
            warn!("Rejecting Application {namespace}/{name}: {reason}");
            metrics::increment_validation_failures();
            // Retrying cannot change the outcome until the user edits the
            // spec, which produces a new event; no fault is returned
            return Ok(());
        }

        sync::create_or_update(self, &app).await?;

        Ok(())
    }
}
