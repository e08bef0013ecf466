//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.
//!
//! The target namespace is read here once and handed to the reconciler's
//! constructor; the reconciliation core never reads the environment itself,
//! which keeps it unit-testable with injected configuration.

use std::time::Duration;

/// Namespace the mirrored Applications are written to when nothing is
/// configured. Matches the default Argo CD installation namespace.
pub const DEFAULT_APPLICATION_NAMESPACE: &str = "argocd";

const DEFAULT_ERROR_REQUEUE_SECS: u64 = 60;
const DEFAULT_METRICS_PORT: u16 = 8080;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment
/// variables. Environment variables are populated from a ConfigMap using
/// `envFrom` in the deployment.
#[derive(Debug, Clone)]
pub struct SyncerConfig {
    /// Namespace the mirrored Application resources are written to
    /// Resources already living in this namespace are never reconciled
    pub application_namespace: String,
    /// Global log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
    /// Port for the metrics and probe HTTP server
    pub metrics_port: u16,
    /// How long to wait before retrying a failed reconciliation (seconds)
    pub error_requeue_secs: u64,
}

impl Default for SyncerConfig {
    fn default() -> Self {
        Self {
            application_namespace: DEFAULT_APPLICATION_NAMESPACE.to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            metrics_port: DEFAULT_METRICS_PORT,
            error_requeue_secs: DEFAULT_ERROR_REQUEUE_SECS,
        }
    }
}

impl SyncerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            application_namespace: env_var_or_default_str(
                "APP_APPLICATION_NAMESPACE",
                DEFAULT_APPLICATION_NAMESPACE,
            ),
            log_level: env_var_or_default_str("APP_LOG_LEVEL", "info"),
            log_format: env_var_or_default_str("APP_LOG_FORMAT", "text"),
            metrics_port: env_var_or_default("METRICS_PORT", DEFAULT_METRICS_PORT),
            error_requeue_secs: env_var_or_default(
                "RECONCILIATION_ERROR_REQUEUE_SECS",
                DEFAULT_ERROR_REQUEUE_SECS,
            ),
        }
    }

    /// Get reconciliation error requeue duration
    pub fn error_requeue_duration(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
