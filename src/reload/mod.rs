//! Live reload subsystem.
//!
//! # Data Flow
//! ```text
//! notify watcher thread
//!     → unbounded channel (never blocks the watcher)
//!     → notifier.rs dispatch loop (policy.rs filter)
//!     → registry.rs broadcast
//!     → each ReloadSink (one per browser tab, see http::websocket)
//! ```
//!
//! # Design Decisions
//! - Best effort: a missed reload is acceptable, a crash is not
//! - Broadcast is decoupled from transport via the `ReloadSink` trait
//! - No debouncing; N qualifying events produce up to N broadcasts

pub mod notifier;
pub mod policy;
pub mod registry;

pub use notifier::ChangeNotifier;
pub use policy::ReloadTrigger;
pub use registry::{
    BroadcastReport, ChannelSink, ClientId, ClientRegistry, Registration, ReloadSink, SinkClosed,
};
