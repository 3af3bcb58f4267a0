//! ncbench Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Filesystem
//! - Runtime specifics
//!
//! All types here represent the core domain of the NoCode-bench
//! evaluation client: task requests, identifiers, status codes, and
//! the origin/URL helpers shared by submission and polling.

pub mod error;
pub mod ids;
pub mod origin;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use error::CoreError;
pub use ids::{BenchId, TaskId};
pub use origin::{is_valid_http_url, normalize_origin, DEFAULT_ORIGIN};
pub use status::TaskStatus;
pub use task::{TaskRequest, TaskSnapshot};
