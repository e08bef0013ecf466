//! # Finalizer Management
//!
//! Lifecycle markers on Application resources.
//!
//! Two finalizers are in play. The syncer finalizer belongs to this
//! controller: it is added to every live source Application so that a later
//! deletion is held back until the mirror has been cleaned up. The Argo CD
//! resources finalizer belongs to the downstream engine: this controller
//! never adds it to a source, but reads its presence there to decide whether
//! to propagate it onto the mirror, and removes it from the source during
//! teardown once its own finalizer is gone.

use crate::crd::Application;
use crate::metrics;
use crate::reconciler::{Reconciler, ReconcilerError};
use tracing::info;

/// Finalizer owned by this controller
pub const SYNCER_FINALIZER: &str = "argoproj.io/finalizer";

/// Finalizer owned by Argo CD's own Application controller
pub const ARGO_FINALIZER: &str = "resources-finalizer.argocd.argoproj.io";

/// Whether the given finalizer is present on the resource
pub fn has_finalizer(app: &Application, finalizer: &str) -> bool {
    app.metadata
        .finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|e| e == finalizer))
}

fn add_finalizer(app: &mut Application, finalizer: &str) {
    let finalizers = app.metadata.finalizers.get_or_insert_with(Vec::new);
    if !finalizers.iter().any(|e| e == finalizer) {
        finalizers.push(finalizer.to_string());
    }
}

fn remove_finalizer(app: &mut Application, finalizer: &str) {
    if let Some(finalizers) = app.metadata.finalizers.as_mut() {
        finalizers.retain(|e| e != finalizer);
    }
}

/// Add the syncer finalizer to a live source Application and persist it
///
/// The cycle ends here: the update generates a fresh watch event, and the
/// follow-up cycle does the mirroring.
pub async fn inject(ctx: &Reconciler, app: &Application) -> Result<(), ReconcilerError> {
    let namespace = app.metadata.namespace.as_deref().unwrap_or_default();
    let name = app.metadata.name.as_deref().unwrap_or_default();

    let mut updated = app.clone();
    add_finalizer(&mut updated, SYNCER_FINALIZER);
    ctx.store().update(&updated).await?;

    metrics::increment_finalizers_injected();
    info!("Added finalizer {SYNCER_FINALIZER} to Application {namespace}/{name}");
    Ok(())
}

/// Tear down a source Application whose deletion has been requested
///
/// Order is load-bearing: the mirror is deleted before the syncer finalizer
/// comes off. Once that finalizer is gone no further reconcile fires for
/// this deletion, so a mirror still alive at that point would be orphaned.
/// The Argo finalizer, if present, is removed in a second write after the
/// syncer finalizer.
///
/// Re-entrant: with the syncer finalizer already absent the whole teardown
/// is a success no-op, so duplicate deletion events are harmless.
pub async fn finalize(ctx: &Reconciler, app: &Application) -> Result<(), ReconcilerError> {
    let namespace = app.metadata.namespace.as_deref().unwrap_or_default();
    let name = app.metadata.name.as_deref().unwrap_or_default();

    if !has_finalizer(app, SYNCER_FINALIZER) {
        info!("Application {namespace}/{name} already finalized");
        return Ok(());
    }

    info!(
        "Deleting mirror Application {}/{name}",
        ctx.target_namespace()
    );
    ctx.store().delete(ctx.target_namespace(), name).await?;
    metrics::increment_applications_deleted();

    let mut updated = app.clone();
    remove_finalizer(&mut updated, SYNCER_FINALIZER);
    let persisted = ctx.store().update(&updated).await?;
    info!("Removed finalizer {SYNCER_FINALIZER} from Application {namespace}/{name}");

    if has_finalizer(&persisted, ARGO_FINALIZER) {
        let mut updated = persisted;
        remove_finalizer(&mut updated, ARGO_FINALIZER);
        ctx.store().update(&updated).await?;
        info!("Removed finalizer {ARGO_FINALIZER} from Application {namespace}/{name}");
    }

    info!("Finalized Application {namespace}/{name}");
    Ok(())
}
