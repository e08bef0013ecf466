//! # Argo CD Application Syncer
//!
//! A Kubernetes controller that mirrors Argo CD `Application` resources from
//! tenant namespaces into the privileged `argocd` namespace, where Argo CD
//! itself picks them up. This lets teams declare Applications next to their
//! own workloads without write access to the Argo CD namespace.
//!
//! ## Overview
//!
//! For every `Application` observed outside the target namespace the
//! controller:
//!
//! 1. **Adds a finalizer** - so deleting the source later cleans up the mirror
//! 2. **Validates colocation** - the Application's destination namespace must
//!    equal the namespace it lives in
//! 3. **Mirrors the resource** - creates a copy in the target namespace with
//!    an identical spec, or updates the copy when the spec drifts
//! 4. **Tears down on delete** - removes the mirror, then its own finalizer,
//!    then the Argo CD resources finalizer if the source carried one
//!
//! Resources already living in the target namespace are ignored so the
//! controller never reconciles its own output.
//!
//! ## Features
//!
//! - **Level-triggered**: every cycle re-reads current state; retries are safe
//! - **Optimistic concurrency**: stale writes fail with a conflict and are
//!   retried by the controller runtime, never overwritten silently
//! - **Prometheus metrics**: exposes reconciliation metrics for monitoring
//! - **Health probes**: HTTP endpoints for liveness and readiness checks

pub mod config;
pub mod crd;
pub mod metrics;
pub mod reconciler;
pub mod server;
pub mod store;

pub use config::SyncerConfig;
pub use crd::{Application, ApplicationDestination, ApplicationSpec};
pub use reconciler::{Reconciler, ReconcilerError};
pub use store::{ApplicationStore, KubeStore, StoreError};
