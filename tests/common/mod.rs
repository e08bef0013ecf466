//! Shared helpers for reconciler integration tests: an in-memory
//! `ApplicationStore` with resourceVersion bookkeeping and an operation
//! log, plus builders for Application fixtures.

use argocd_syncer::crd::{Application, ApplicationDestination, ApplicationSpec};
use argocd_syncer::store::{ApplicationStore, StoreError};
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// One store call, in invocation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Get {
        namespace: String,
        name: String,
    },
    Create {
        namespace: String,
        name: String,
    },
    Update {
        namespace: String,
        name: String,
        finalizers: Vec<String>,
    },
    Delete {
        namespace: String,
        name: String,
        existed: bool,
    },
}

impl StoreOp {
    pub fn is_write(&self) -> bool {
        !matches!(self, StoreOp::Get { .. })
    }
}

#[derive(Default)]
struct Inner {
    objects: HashMap<(String, String), Application>,
    next_version: u64,
    ops: Vec<StoreOp>,
    conflict_on_next_update: bool,
}

/// In-memory Application store with Kubernetes-style optimistic concurrency
///
/// Every call is recorded in an operation log so tests can assert on call
/// ordering, not just final state. `inject_conflict_on_next_update` makes
/// the next update fail with a stale-version conflict without touching the
/// stored object, simulating a concurrent writer.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object directly, bypassing the op log
    pub fn seed(&self, mut app: Application) {
        let mut inner = self.inner.lock().unwrap();
        inner.next_version += 1;
        app.metadata.resource_version = Some(inner.next_version.to_string());
        let key = key_of(&app);
        inner.objects.insert(key, app);
    }

    pub fn stored(&self, namespace: &str, name: &str) -> Option<Application> {
        let inner = self.inner.lock().unwrap();
        inner
            .objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.inner.lock().unwrap().ops.clone()
    }

    pub fn write_ops(&self) -> Vec<StoreOp> {
        self.ops().into_iter().filter(StoreOp::is_write).collect()
    }

    pub fn clear_ops(&self) {
        self.inner.lock().unwrap().ops.clear();
    }

    pub fn inject_conflict_on_next_update(&self) {
        self.inner.lock().unwrap().conflict_on_next_update = true;
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Application>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.ops.push(StoreOp::Get {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        Ok(inner
            .objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create(&self, app: &Application) -> Result<Application, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let (namespace, name) = key_of(app);
        inner.ops.push(StoreOp::Create {
            namespace: namespace.clone(),
            name: name.clone(),
        });
        if inner.objects.contains_key(&(namespace.clone(), name.clone())) {
            return Err(StoreError::Conflict { namespace, name });
        }
        inner.next_version += 1;
        let mut stored = app.clone();
        stored.metadata.resource_version = Some(inner.next_version.to_string());
        inner
            .objects
            .insert((namespace, name), stored.clone());
        Ok(stored)
    }

    async fn update(&self, app: &Application) -> Result<Application, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let (namespace, name) = key_of(app);
        inner.ops.push(StoreOp::Update {
            namespace: namespace.clone(),
            name: name.clone(),
            finalizers: app.metadata.finalizers.clone().unwrap_or_default(),
        });
        if inner.conflict_on_next_update {
            inner.conflict_on_next_update = false;
            return Err(StoreError::Conflict { namespace, name });
        }
        let Some(current) = inner
            .objects
            .get(&(namespace.clone(), name.clone()))
            .cloned()
        else {
            return Err(StoreError::Api(anyhow::anyhow!(
                "update of missing object {namespace}/{name}"
            )));
        };
        if app.metadata.resource_version != current.metadata.resource_version {
            return Err(StoreError::Conflict { namespace, name });
        }
        inner.next_version += 1;
        let mut stored = app.clone();
        stored.metadata.resource_version = Some(inner.next_version.to_string());
        inner
            .objects
            .insert((namespace, name), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let existed = inner
            .objects
            .remove(&(namespace.to_string(), name.to_string()))
            .is_some();
        inner.ops.push(StoreOp::Delete {
            namespace: namespace.to_string(),
            name: name.to_string(),
            existed,
        });
        Ok(())
    }
}

fn key_of(app: &Application) -> (String, String) {
    (
        app.metadata.namespace.clone().unwrap_or_default(),
        app.metadata.name.clone().unwrap_or_default(),
    )
}

/// Fixture builder for source Applications
#[derive(Debug, Clone)]
pub struct ApplicationBuilder {
    name: String,
    namespace: String,
    destination_namespace: Option<String>,
    finalizers: Vec<String>,
    deleted: bool,
    labels: BTreeMap<String, String>,
    extra_spec: BTreeMap<String, serde_json::Value>,
}

impl ApplicationBuilder {
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            destination_namespace: Some(namespace.to_string()),
            finalizers: Vec::new(),
            deleted: false,
            labels: BTreeMap::new(),
            extra_spec: BTreeMap::new(),
        }
    }

    pub fn destination_namespace(mut self, namespace: &str) -> Self {
        self.destination_namespace = Some(namespace.to_string());
        self
    }

    pub fn finalizer(mut self, finalizer: &str) -> Self {
        self.finalizers.push(finalizer.to_string());
        self
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    pub fn spec_field(mut self, key: &str, value: serde_json::Value) -> Self {
        self.extra_spec.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> Application {
        let mut app = Application::new(
            &self.name,
            ApplicationSpec {
                destination: ApplicationDestination {
                    namespace: self.destination_namespace,
                    ..Default::default()
                },
                rest: self.extra_spec,
            },
        );
        app.metadata.namespace = Some(self.namespace);
        if !self.finalizers.is_empty() {
            app.metadata.finalizers = Some(self.finalizers);
        }
        if self.deleted {
            app.metadata.deletion_timestamp = Some(Time(chrono::Utc::now()));
        }
        if !self.labels.is_empty() {
            app.metadata.labels = Some(self.labels);
        }
        app
    }
}
