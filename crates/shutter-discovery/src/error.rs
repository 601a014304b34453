//! Error types for the discovery engine

use thiserror::Error;

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Errors that can occur during device discovery
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// mDNS service daemon failed to initialize
    #[error("Failed to initialize mDNS daemon: {0}")]
    MdnsInitFailed(String),

    /// Failed to browse for a service type
    #[error("Failed to browse for service type '{service_type}': {reason}")]
    BrowseFailed { service_type: String, reason: String },

    /// A single enumeration pass failed; retried on the next scan cycle
    #[error("Device enumeration failed: {0}")]
    EnumerationFailed(String),

    /// Invalid engine configuration
    #[error("Invalid discovery configuration: {0}")]
    InvalidConfig(String),

    /// Internal error
    #[error("Internal discovery error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}
