//! Request-to-file routing.
//!
//! # Data Flow
//! ```text
//! request target ("/docs/a%20b.html?v=2")
//!     → resolver.rs (strip, decode, confine)
//!     → /abs/root/docs/a b.html   or   Rejection (→ 403)
//! ```

pub mod resolver;

pub use resolver::{PathResolver, Rejection};
