//! # Application Validation
//!
//! Namespace-colocation check for source Applications.
//!
//! A tenant's Application must deploy into the namespace it lives in;
//! otherwise a resource in namespace A could cause cluster-wide side
//! effects scoped to namespace B. Validation failures end the cycle
//! without mirroring and without a fault: nothing changes until the user
//! edits the spec, and that edit produces its own event.

use crate::crd::Application;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "destination namespace {destination:?} does not match resource namespace {namespace:?}"
    )]
    DestinationNamespaceMismatch {
        namespace: String,
        destination: Option<String>,
    },
}

/// Check that the Application deploys into its own namespace
pub fn validate_destination(app: &Application) -> Result<(), ValidationError> {
    let namespace = app.metadata.namespace.as_deref().unwrap_or_default();
    let destination = app.spec.destination.namespace.as_deref();

    if destination != Some(namespace) {
        return Err(ValidationError::DestinationNamespaceMismatch {
            namespace: namespace.to_string(),
            destination: destination.map(ToString::to_string),
        });
    }

    Ok(())
}
