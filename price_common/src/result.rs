//! Result type alias shared across the workspace.
//!
//! Functions return `Result<T>` and get `PriceError` as the default error.
use crate::error::PriceError;

/// Workspace-wide `Result` alias with `PriceError` as the default error.
pub type Result<T, E = PriceError> = std::result::Result<T, E>;
