//! # FlowCal Core
//!
//! Pure integration logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The process-local event bus shared by mounted widget instances
//! - Port/adapter interfaces (traits) for persistence and transport
//! - The default platform adapter (`saveConfig` semantics)
//! - The integration resolver producing the runtime data bag
//!
//! ## Architecture Principles
//! - Only depends on `flowcal-domain`
//! - No HTTP or storage code; all I/O via traits
//! - Pure, testable integration logic

pub mod bus;
pub mod integration;
pub mod platform;
pub mod ports;
pub mod stats;

// Re-export specific items to avoid ambiguity
pub use bus::{EventBus, Subscription};
pub use integration::{CalendarNodeData, IntegrationResolver};
pub use platform::{PlatformAdapter, SaveOutcome};
pub use ports::{
    ConfigCache, PlatformPush, PlatformPushFactory, TaskGateway, TaskGatewayFactory,
};
pub use stats::{LogStatSink, StatBatch, StatRecorder, StatSink};
