//! # Application Resource
//!
//! Typed definition of the Argo CD `Application` custom resource
//! (`argoproj.io/v1alpha1`). The CRD itself is owned and installed by Argo CD;
//! this controller only needs a typed client view of it.
//!
//! The spec models the `destination` block explicitly because the colocation
//! check and the mirroring logic depend on it. Everything else in the spec
//! (`source`, `project`, `syncPolicy`, ...) is carried verbatim through the
//! flattened remainder, so the mirror's spec is always a field-for-field copy
//! of the source's spec regardless of which Argo CD features it uses.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Argo CD Application spec
///
/// `PartialEq` is derived so the synchronizer can compare the existing
/// mirror's spec against the desired spec with full structural equality,
/// including the opaque flattened fields.
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "argoproj.io",
    version = "v1alpha1",
    kind = "Application",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    /// Deployment destination of the application
    #[serde(default)]
    pub destination: ApplicationDestination,
    /// Remaining Argo CD Application fields (source, project, syncPolicy, ...)
    ///
    /// Kept opaque: the controller copies them without interpreting them.
    #[serde(flatten)]
    pub rest: BTreeMap<String, serde_json::Value>,
}

/// Destination cluster and namespace of an Application
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDestination {
    /// API server URL of the target cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Name of the target cluster (alternative to `server`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Target namespace for the application's resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}
