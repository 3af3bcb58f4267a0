//! Client library for the ncbench evaluation backend.
//!
//! Implements the asynchronous task-submission and polling-until-ready
//! protocol: validate input, POST a task, then GET its status on a fixed
//! interval until a result is available, a terminal failure is reported,
//! the configured timeout passes, or the caller cancels.

pub mod error;
pub mod http;
pub mod poll;
pub mod store;

pub use error::ClientError;
pub use http::ApiClient;
pub use poll::{PollConfig, PollOutcome, PollProgress, Poller};
pub use store::{FileTaskStore, MemoryTaskStore, TaskStore};
