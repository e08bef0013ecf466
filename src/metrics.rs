//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `argocd_syncer_reconciliations_total` - Total number of reconciliations
//! - `argocd_syncer_reconciliation_errors_total` - Total number of reconciliation errors
//! - `argocd_syncer_reconciliation_duration_seconds` - Duration of reconciliation cycles
//! - `argocd_syncer_finalizers_injected_total` - Total number of finalizers added to source Applications
//! - `argocd_syncer_validation_failures_total` - Total number of Applications rejected by validation
//! - `argocd_syncer_applications_created_total` - Total number of mirror Applications created
//! - `argocd_syncer_applications_updated_total` - Total number of mirror Applications updated
//! - `argocd_syncer_applications_deleted_total` - Total number of mirror Applications deleted

use anyhow::Result;
use prometheus::{Histogram, IntCounter, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "argocd_syncer_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "argocd_syncer_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "argocd_syncer_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static FINALIZERS_INJECTED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "argocd_syncer_finalizers_injected_total",
        "Total number of finalizers added to source Applications",
    )
    .expect("Failed to create FINALIZERS_INJECTED_TOTAL metric - this should never happen")
});

static VALIDATION_FAILURES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "argocd_syncer_validation_failures_total",
        "Total number of Applications rejected by validation",
    )
    .expect("Failed to create VALIDATION_FAILURES_TOTAL metric - this should never happen")
});

static APPLICATIONS_CREATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "argocd_syncer_applications_created_total",
        "Total number of mirror Applications created",
    )
    .expect("Failed to create APPLICATIONS_CREATED_TOTAL metric - this should never happen")
});

static APPLICATIONS_UPDATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "argocd_syncer_applications_updated_total",
        "Total number of mirror Applications updated",
    )
    .expect("Failed to create APPLICATIONS_UPDATED_TOTAL metric - this should never happen")
});

static APPLICATIONS_DELETED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "argocd_syncer_applications_deleted_total",
        "Total number of mirror Applications deleted",
    )
    .expect("Failed to create APPLICATIONS_DELETED_TOTAL metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(FINALIZERS_INJECTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(VALIDATION_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(APPLICATIONS_CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(APPLICATIONS_UPDATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(APPLICATIONS_DELETED_TOTAL.clone()))?;

    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_finalizers_injected() {
    FINALIZERS_INJECTED_TOTAL.inc();
}

pub fn increment_validation_failures() {
    VALIDATION_FAILURES_TOTAL.inc();
}

pub fn increment_applications_created() {
    APPLICATIONS_CREATED_TOTAL.inc();
}

pub fn increment_applications_updated() {
    APPLICATIONS_UPDATED_TOTAL.inc();
}

pub fn increment_applications_deleted() {
    APPLICATIONS_DELETED_TOTAL.inc();
}
