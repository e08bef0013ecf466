//! # Application Store
//!
//! Capability interface over the cluster's Application objects.
//!
//! The reconciler only ever talks to this trait, never to `kube::Api`
//! directly. That keeps the reconciliation core synchronous-looking and
//! testable against an in-memory implementation, while the production
//! [`KubeStore`] maps the calls onto the Kubernetes API with its optimistic
//! concurrency semantics (a write carrying a stale `resourceVersion` fails
//! with a conflict and is surfaced for retry, never swallowed).

use crate::crd::Application;
use async_trait::async_trait;
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client};
use thiserror::Error;

/// Faults surfaced by the store
///
/// `Conflict` is the optimistic-concurrency failure (stale resourceVersion
/// on a write, or a create racing an existing object). Everything else is an
/// opaque transport fault. Both are transient: the caller propagates them to
/// the controller runtime, which owns retry and backoff.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("write conflict for {namespace}/{name}: stale resource version")]
    Conflict { namespace: String, name: String },
    #[error("api request failed: {0}")]
    Api(#[source] anyhow::Error),
}

/// Read/write access to Application objects by namespaced name
///
/// Absence on `get` is a result, not an error: a missing object usually
/// means a deletion already completed. `delete` likewise tolerates an
/// already-absent object.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Fetch an Application, returning `None` when it does not exist
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Application>, StoreError>;

    /// Create an Application, returning the stored object
    async fn create(&self, app: &Application) -> Result<Application, StoreError>;

    /// Replace an Application; the caller-supplied object must carry the
    /// current resourceVersion. Returns the stored object so follow-up
    /// writes can chain on the fresh version token.
    async fn update(&self, app: &Application) -> Result<Application, StoreError>;

    /// Delete an Application; an already-absent object is a success
    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError>;
}

/// Production store backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore").finish_non_exhaustive()
    }
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Application> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ApplicationStore for KubeStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Application>, StoreError> {
        self.api(namespace)
            .get_opt(name)
            .await
            .map_err(|e| classify(e, namespace, name))
    }

    async fn create(&self, app: &Application) -> Result<Application, StoreError> {
        let (namespace, name) = identity(app);
        self.api(&namespace)
            .create(&PostParams::default(), app)
            .await
            .map_err(|e| classify(e, &namespace, &name))
    }

    async fn update(&self, app: &Application) -> Result<Application, StoreError> {
        let (namespace, name) = identity(app);
        self.api(&namespace)
            .replace(&name, &PostParams::default(), app)
            .await
            .map_err(|e| classify(e, &namespace, &name))
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        match self.api(namespace).delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(()),
            Err(e) => Err(classify(e, namespace, name)),
        }
    }
}

fn identity(app: &Application) -> (String, String) {
    (
        app.metadata.namespace.clone().unwrap_or_default(),
        app.metadata.name.clone().unwrap_or_default(),
    )
}

fn classify(err: kube::Error, namespace: &str, name: &str) -> StoreError {
    match err {
        kube::Error::Api(ae) if ae.code == 409 => StoreError::Conflict {
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        other => StoreError::Api(other.into()),
    }
}
