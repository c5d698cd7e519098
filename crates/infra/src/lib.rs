//! # FlowCal Infrastructure
//!
//! Infrastructure implementations of the core integration ports.
//!
//! This crate contains:
//! - The reqwest-based task backend client (standalone callbacks)
//! - The host platform persistence client (upstream config push)
//! - Config cache implementations (in-memory and file-backed)
//!
//! ## Architecture
//! - Implements traits defined in `flowcal-core`
//! - Contains all "impure" code (HTTP, filesystem)

pub mod cache;
pub mod errors;
pub mod http;
pub mod platform;
pub mod tasks;

// Re-export commonly used items
pub use cache::{FileConfigCache, MemoryConfigCache};
pub use http::{HttpClient, HttpClientBuilder};
pub use platform::{PlatformApiClient, PlatformClientFactory};
pub use tasks::{StandaloneTaskFactory, TaskApiClient};
