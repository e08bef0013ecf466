//! # Mirror Synchronization
//!
//! Computes the desired mirror Application and converges the target
//! namespace onto it.
//!
//! The desired mirror is a deterministic projection of the source: same
//! name, kind and API version, namespace swapped to the target namespace,
//! spec, labels and annotations copied verbatim. If the source carries the
//! Argo resources finalizer, the mirror carries it too, so that a mirror
//! deletion cascades to the deployed workload.

use crate::crd::Application;
use crate::metrics;
use crate::reconciler::finalizer::{has_finalizer, ARGO_FINALIZER};
use crate::reconciler::{Reconciler, ReconcilerError};
use tracing::info;

/// Project a source Application into the target namespace
pub fn desired_mirror(source: &Application, target_namespace: &str) -> Application {
    let name = source.metadata.name.as_deref().unwrap_or_default();

    let mut mirror = Application::new(name, source.spec.clone());
    mirror.metadata.namespace = Some(target_namespace.to_string());
    mirror.metadata.labels = source.metadata.labels.clone();
    mirror.metadata.annotations = source.metadata.annotations.clone();

    if has_finalizer(source, ARGO_FINALIZER) {
        mirror.metadata.finalizers = Some(vec![ARGO_FINALIZER.to_string()]);
    }

    mirror
}

/// Create the mirror if absent, update it if its spec drifted
///
/// Specs are compared with full structural equality; matching specs make
/// the cycle a no-op, which is the steady state. On update the existing
/// mirror's resourceVersion is copied over (the write is an optimistic
/// replace) and so is its finalizer set: a finalizer granted to the mirror
/// after creation, by Argo CD rather than by this controller, must survive
/// a spec-only update. The reverse direction is knowingly stale: a
/// finalizer that appears on the source after the mirror was created is
/// not retrofitted onto the mirror by the update path.
pub async fn create_or_update(ctx: &Reconciler, source: &Application) -> Result<(), ReconcilerError> {
    let target_namespace = ctx.target_namespace();
    let name = source.metadata.name.as_deref().unwrap_or_default();

    let desired = desired_mirror(source, target_namespace);

    match ctx.store().get(target_namespace, name).await? {
        None => {
            ctx.store().create(&desired).await?;
            metrics::increment_applications_created();
            info!("Created mirror Application {target_namespace}/{name}");
        }
        Some(existing) => {
            if existing.spec == desired.spec {
                return Ok(());
            }

            let mut desired = desired;
            desired.metadata.resource_version = existing.metadata.resource_version.clone();
            desired.metadata.finalizers = existing.metadata.finalizers.clone();
            ctx.store().update(&desired).await?;
            metrics::increment_applications_updated();
            info!("Updated mirror Application {target_namespace}/{name}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{ApplicationDestination, ApplicationSpec};
    use crate::reconciler::finalizer::SYNCER_FINALIZER;
    use std::collections::BTreeMap;

    fn source(finalizers: &[&str]) -> Application {
        let mut app = Application::new(
            "payments",
            ApplicationSpec {
                destination: ApplicationDestination {
                    namespace: Some("team-a".to_string()),
                    ..Default::default()
                },
                rest: BTreeMap::from([(
                    "project".to_string(),
                    serde_json::json!("default"),
                )]),
            },
        );
        app.metadata.namespace = Some("team-a".to_string());
        app.metadata.labels = Some(BTreeMap::from([(
            "team".to_string(),
            "a".to_string(),
        )]));
        app.metadata.annotations = Some(BTreeMap::from([(
            "notes".to_string(),
            "hello".to_string(),
        )]));
        app.metadata.resource_version = Some("41".to_string());
        if !finalizers.is_empty() {
            app.metadata.finalizers = Some(finalizers.iter().map(ToString::to_string).collect());
        }
        app
    }

    #[test]
    fn mirror_swaps_namespace_and_copies_payload() {
        let src = source(&[SYNCER_FINALIZER]);
        let mirror = desired_mirror(&src, "argocd");

        assert_eq!(mirror.metadata.name.as_deref(), Some("payments"));
        assert_eq!(mirror.metadata.namespace.as_deref(), Some("argocd"));
        assert_eq!(mirror.spec, src.spec);
        assert_eq!(mirror.metadata.labels, src.metadata.labels);
        assert_eq!(mirror.metadata.annotations, src.metadata.annotations);
        // the source's resourceVersion never leaks into the mirror
        assert_eq!(mirror.metadata.resource_version, None);
    }

    #[test]
    fn syncer_finalizer_never_propagates() {
        let src = source(&[SYNCER_FINALIZER]);
        let mirror = desired_mirror(&src, "argocd");
        assert_eq!(mirror.metadata.finalizers, None);
    }

    #[test]
    fn argo_finalizer_propagates() {
        let src = source(&[SYNCER_FINALIZER, ARGO_FINALIZER]);
        let mirror = desired_mirror(&src, "argocd");
        assert_eq!(
            mirror.metadata.finalizers.as_deref(),
            Some(&[ARGO_FINALIZER.to_string()][..])
        );
    }
}
