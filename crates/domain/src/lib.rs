//! # FlowCal Domain
//!
//! Business domain types and models for the FlowCal widget integration
//! layer.
//!
//! This crate contains:
//! - Widget configuration types (`WidgetConfig`, `FlowNode`, `CalendarWidgetData`)
//! - The partial-update merge contract (`NodeUpdate::apply_to`)
//! - Domain error types and Result definitions
//! - Runtime configuration defaults
//!
//! ## Architecture
//! - No dependencies on other FlowCal crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::RuntimeConfig;
pub use errors::{Result, WidgetError};
pub use types::*;
