//! Shared types for the Moda store backend
//!
//! Cross-tier contract used by the server and frontend: unified error
//! codes, the application error type, and the API response envelope.

pub mod error;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode, ResponseStatus};
pub use serde::{Deserialize, Serialize};
